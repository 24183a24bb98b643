use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::TypingError;
use crate::model::{Mode, TypingRequest};

pub const WPM_RANGE: RangeInclusive<i64> = 10..=500;
pub const PERCENT_RANGE: RangeInclusive<f64> = 0.0..=20.0;

pub const DEFAULT_PREFS_FILE: &str = "typing_config.json";

/// User-facing run settings, as entered: integer WPM and seconds, probabilities in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub target_wpm: i64,
    pub start_delay_secs: i64,
    pub typo_percent: f64,
    pub synonym_percent: f64,
    pub mode: Mode,
}

impl Default for RunSettings {
    fn default() -> Self {
        Preferences::default().settings()
    }
}

fn validate_percent(field: &'static str, value: f64) -> Result<(), TypingError> {
    if !value.is_finite() || !PERCENT_RANGE.contains(&value) {
        return Err(TypingError::validation(
            field,
            format!(
                "{value} is outside {}-{} percent",
                PERCENT_RANGE.start(),
                PERCENT_RANGE.end()
            ),
        ));
    }
    Ok(())
}

impl RunSettings {
    pub fn validate(&self) -> Result<(), TypingError> {
        if !WPM_RANGE.contains(&self.target_wpm) {
            return Err(TypingError::validation(
                "target_wpm",
                format!(
                    "{} is outside {}-{}",
                    self.target_wpm,
                    WPM_RANGE.start(),
                    WPM_RANGE.end()
                ),
            ));
        }

        if self.start_delay_secs < 0 {
            return Err(TypingError::validation(
                "start_delay_secs",
                format!("{} must not be negative", self.start_delay_secs),
            ));
        }

        // Competition mode ignores both probabilities, so they are not checked there.
        if self.mode == Mode::Natural {
            validate_percent("typo_percent", self.typo_percent)?;
            validate_percent("synonym_percent", self.synonym_percent)?;
        }

        Ok(())
    }

    /// Validate and build the request for `text`. Surrounding whitespace is trimmed and an
    /// empty result is rejected.
    pub fn into_request(self, text: &str) -> Result<TypingRequest, TypingError> {
        self.validate()?;

        let text = text.trim();
        if text.is_empty() {
            return Err(TypingError::validation("text", "nothing to type"));
        }

        let (typo, synonym) = match self.mode {
            Mode::Natural => (self.typo_percent / 100.0, self.synonym_percent / 100.0),
            Mode::Competition => (0.0, 0.0),
        };

        Ok(TypingRequest::new(text, self.target_wpm as f64, self.mode)
            .with_start_delay(self.start_delay_secs as f64)
            .with_typo_probability(typo)
            .with_synonym_probability(synonym))
    }
}

/// Persisted defaults, compatible with the `typing_config.json` layout.
///
/// Keys this crate does not understand (for example a `shortcuts` table) are kept and
/// written back on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub default_wpm: i64,
    pub default_delay: i64,
    pub default_typo_prob: f64,
    pub default_synonym_prob: f64,
    pub default_mode: Mode,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_wpm: 50,
            default_delay: 3,
            default_typo_prob: 3.0,
            default_synonym_prob: 2.0,
            default_mode: Mode::Natural,
            extra: serde_json::Map::new(),
        }
    }
}

impl Preferences {
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("failed to parse preferences {}", path.display()))
    }

    /// Load preferences, falling back to defaults when the file is missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(prefs) => prefs,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "using default preferences");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self).context("failed to serialize preferences")?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn settings(&self) -> RunSettings {
        RunSettings {
            target_wpm: self.default_wpm,
            start_delay_secs: self.default_delay,
            typo_percent: self.default_typo_prob,
            synonym_percent: self.default_synonym_prob,
            mode: self.default_mode,
        }
    }

    pub fn apply(&mut self, settings: &RunSettings) {
        self.default_wpm = settings.target_wpm;
        self.default_delay = settings.start_delay_secs;
        self.default_typo_prob = settings.typo_percent;
        self.default_synonym_prob = settings.synonym_percent;
        self.default_mode = settings.mode;
    }
}
