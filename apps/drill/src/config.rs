//! Drill configuration from command-line arguments and environment.

use anyhow::{anyhow, bail, Context};
use std::path::PathBuf;
use study_engine::{EngineSettings, MatchingMode, QuizFormat, StudyMode};

const USAGE: &str = "usage: drill <items.json> [plain|quiz|interval]";

#[derive(Debug, Clone)]
pub struct DrillConfig {
    pub items_path: PathBuf,
    pub mode: StudyMode,
    pub settings: EngineSettings,
}

impl DrillConfig {
    /// Load from process arguments and environment (`.env` included).
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_sources(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Build from explicit argument and environment sources.
    pub fn from_sources<I, E>(args: I, env: E) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let mut args = args.into_iter();
        let items_path = args.next().map(PathBuf::from).ok_or_else(|| anyhow!(USAGE))?;

        let mode_name = args
            .next()
            .or_else(|| env("DRILL_MODE"))
            .unwrap_or_else(|| "plain".to_string());
        let mode = StudyMode::from_str(&mode_name)
            .ok_or_else(|| anyhow!("unknown study mode {mode_name:?}\n{USAGE}"))?;

        let mut settings = EngineSettings::default();
        if let Some(value) = env("DRILL_PHASE_DELAY_MS") {
            settings.phase_delay_ms = value.parse().context("DRILL_PHASE_DELAY_MS")?;
        }
        if let Some(value) = env("DRILL_ADVANCE_DELAY_MS") {
            settings.advance_delay_ms = value.parse().context("DRILL_ADVANCE_DELAY_MS")?;
        }
        if let Some(value) = env("DRILL_OPTION_COUNT") {
            settings.option_count = value.parse().context("DRILL_OPTION_COUNT")?;
        }
        if let Some(value) = env("DRILL_QUIZ_FORMAT") {
            settings.quiz_format = QuizFormat::from_str(&value)
                .ok_or_else(|| anyhow!("unknown DRILL_QUIZ_FORMAT {value:?}"))?;
        }
        if let Some(value) = env("DRILL_MATCHING_MODE") {
            settings.matching_mode = MatchingMode::from_str(&value)
                .ok_or_else(|| anyhow!("unknown DRILL_MATCHING_MODE {value:?}"))?;
        }
        if let Some(value) = env("DRILL_FUZZY_THRESHOLD") {
            settings.fuzzy_threshold = value.parse().context("DRILL_FUZZY_THRESHOLD")?;
        }
        if !(0.0..=1.0).contains(&settings.fuzzy_threshold) {
            bail!("DRILL_FUZZY_THRESHOLD must be between 0 and 1");
        }

        Ok(Self {
            items_path,
            mode,
            settings,
        })
    }
}
