//! Async driver that runs a [`Session`] on tokio.
//!
//! The session stays single-owner: one task holds it, applies commands in
//! arrival order and sleeps until the next deadline in between. Exiting (or
//! dropping every command sender) stops the task and consumes the session,
//! so no timer can touch it afterwards.

use crate::error::{InsufficientOptions, Result, StudyError};
use crate::keyboard::Key;
use crate::session::{Session, SessionEvent, SessionReport};
use crate::types::{Difficulty, QuizMark};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Command applied to the running session.
#[derive(Debug)]
pub enum SessionCommand {
    Key(Key),
    Flip,
    Next,
    Previous,
    Confidence(QuizMark),
    Difficulty(Difficulty),
    /// Build options for the current card; replies with them or the reason
    /// the card degrades to skip.
    RenderChoices(oneshot::Sender<std::result::Result<Option<Vec<String>>, InsufficientOptions>>),
    SelectChoice(usize),
    Type(String),
    SubmitTyped,
    MarkCorrect,
    Skip,
}

enum Control {
    Apply(SessionCommand),
    Exit(oneshot::Sender<SessionReport>),
}

/// Handle to a session task.
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Control>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    task: JoinHandle<Option<SessionReport>>,
}

/// Spawn a task driving `session` with an OS-seeded RNG for option shuffling.
pub fn spawn(session: Session) -> SessionHandle {
    spawn_with_rng(session, StdRng::from_os_rng())
}

/// Spawn a task driving `session`.
pub fn spawn_with_rng(session: Session, rng: StdRng) -> SessionHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(drive(session, rng, command_rx, event_tx));
    SessionHandle {
        commands: command_tx,
        events: event_rx,
        task,
    }
}

impl SessionHandle {
    /// Queue a command. Fails once the session has ended.
    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(Control::Apply(command))
            .map_err(|_| StudyError::SessionClosed)
    }

    /// Wait for the next session event. `None` once the session has ended.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Build options for the current card.
    pub async fn render_choices(&self) -> Result<Option<Vec<String>>> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::RenderChoices(tx))?;
        let choices = rx.await.map_err(|_| StudyError::SessionClosed)?;
        Ok(choices?)
    }

    /// End the session and collect its report.
    pub async fn exit(self) -> Result<SessionReport> {
        let (tx, rx) = oneshot::channel();
        if self.commands.send(Control::Exit(tx)).is_ok() {
            if let Ok(report) = rx.await {
                return Ok(report);
            }
        }
        match self.task.await {
            Ok(Some(report)) => Ok(report),
            _ => Err(StudyError::SessionClosed),
        }
    }
}

async fn drive(
    mut session: Session,
    mut rng: StdRng,
    mut commands: mpsc::UnboundedReceiver<Control>,
    events: mpsc::UnboundedSender<SessionEvent>,
) -> Option<SessionReport> {
    loop {
        let deadline = session.next_deadline().map(Instant::from_std);
        let timer = async {
            match deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            control = commands.recv() => match control {
                Some(Control::Apply(command)) => {
                    let now = Instant::now().into_std();
                    apply(&mut session, command, now, &mut rng);
                }
                Some(Control::Exit(reply)) => {
                    let report = session.exit();
                    let _ = reply.send(report);
                    return None;
                }
                None => {
                    debug!(session = %session.id(), "all handles dropped");
                    return Some(session.exit());
                }
            },
            _ = timer => {}
        }

        // Commands can complete the session immediately; deadlines fire here.
        for event in session.poll(Instant::now().into_std()) {
            if events.send(event).is_err() {
                debug!(session = %session.id(), "event receiver dropped");
            }
        }
    }
}

fn apply(session: &mut Session, command: SessionCommand, now: std::time::Instant, rng: &mut StdRng) {
    match command {
        SessionCommand::Key(key) => {
            session.handle_key(key, now);
        }
        SessionCommand::Flip => {
            session.flip();
        }
        SessionCommand::Next => {
            session.next(now);
        }
        SessionCommand::Previous => {
            session.previous(now);
        }
        SessionCommand::Confidence(mark) => {
            session.submit_confidence(mark, now);
        }
        SessionCommand::Difficulty(difficulty) => {
            session.submit_difficulty(difficulty, now);
        }
        SessionCommand::RenderChoices(reply) => {
            let choices = session
                .render_choices(rng)
                .map(|set| set.map(|set| set.options.clone()));
            let _ = reply.send(choices);
        }
        SessionCommand::SelectChoice(index) => {
            session.select_choice(index, now);
        }
        SessionCommand::Type(text) => {
            session.type_text(&text);
        }
        SessionCommand::SubmitTyped => {
            session.submit_typed(now);
        }
        SessionCommand::MarkCorrect => {
            session.mark_correct();
        }
        SessionCommand::Skip => {
            session.skip(now);
        }
    }
}
