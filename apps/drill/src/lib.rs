//! Terminal driver for study sessions.
//!
//! Reads an item list from a JSON file, runs one session and takes input as
//! one command per stdin line: key codes (`Space`, `ArrowRight`, `Digit2`,
//! ...) or words (`render`, `type <text>`, `submit`, `correct`, `skip`,
//! `known`, `unknown`, `again`..`easy`, `exit`). Events and the final report
//! go to stdout as JSON lines.

pub mod config;
pub mod kana;

use anyhow::Context;
use serde::Serialize;
use study_engine::{
    runtime, Difficulty, Key, QuizMark, RawItem, Session, SessionCommand, StudyError,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::DrillConfig;
use crate::kana::KanaTransliterator;

/// One parsed line of user input.
#[derive(Debug)]
pub enum Input {
    Command(SessionCommand),
    Render,
    Exit,
}

/// Parse one stdin line.
pub fn parse_line(line: &str) -> Option<Input> {
    let line = line.trim();
    if let Some(text) = line.strip_prefix("type ") {
        return Some(Input::Command(SessionCommand::Type(text.to_string())));
    }

    let command = match line {
        "" => return None,
        "exit" | "quit" => return Some(Input::Exit),
        "render" => return Some(Input::Render),
        "flip" => SessionCommand::Flip,
        "next" => SessionCommand::Next,
        "prev" | "previous" => SessionCommand::Previous,
        "submit" => SessionCommand::SubmitTyped,
        "correct" => SessionCommand::MarkCorrect,
        "skip" => SessionCommand::Skip,
        "known" => SessionCommand::Confidence(QuizMark::Known),
        "unknown" => SessionCommand::Confidence(QuizMark::Unknown),
        "again" => SessionCommand::Difficulty(Difficulty::Again),
        "hard" => SessionCommand::Difficulty(Difficulty::Hard),
        "good" => SessionCommand::Difficulty(Difficulty::Good),
        "easy" => SessionCommand::Difficulty(Difficulty::Easy),
        code => SessionCommand::Key(Key::from_code(code)?),
    };
    Some(Input::Command(command))
}

fn emit<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

#[derive(Serialize)]
struct ChoicesLine<'a> {
    choices: &'a [String],
}

#[derive(Serialize)]
struct SkipOnlyLine {
    skip_only: String,
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = DrillConfig::load()?;

    let raw = tokio::fs::read_to_string(&config.items_path)
        .await
        .with_context(|| format!("reading {}", config.items_path.display()))?;
    let items: Vec<RawItem> = serde_json::from_str(&raw).context("parsing item list")?;

    let session = Session::start(&items, config.mode, config.settings.clone())?
        .with_transliterator(KanaTransliterator);
    tracing::info!(
        "Loaded {} cards from {}",
        session.cards().len(),
        config.items_path.display()
    );

    let mut handle = runtime::spawn(session);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Some(Input::Exit) => break,
                    Some(Input::Render) => match handle.render_choices().await {
                        Ok(Some(choices)) => emit(&ChoicesLine { choices: &choices })?,
                        Ok(None) => {}
                        Err(StudyError::InsufficientOptions(err)) => {
                            emit(&SkipOnlyLine { skip_only: err.to_string() })?
                        }
                        Err(err) => return Err(err.into()),
                    },
                    Some(Input::Command(command)) => handle.send(command)?,
                    None => tracing::debug!("unrecognized input {:?}", line),
                }
            }
            Some(event) = handle.next_event() => emit(&event)?,
        }
    }

    let report = handle.exit().await?;
    emit(&report)?;
    Ok(())
}
