use serde::{Deserialize, Serialize};

pub const TRANSCRIPT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Variable cadence with corrected typos and transient synonym swaps.
    #[default]
    Natural,
    /// Fixed interval per character, no variation of any kind.
    Competition,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Natural => "natural",
            Mode::Competition => "competition",
        }
    }
}

/// Everything a single run needs, fixed at start.
///
/// Probabilities are fractions in `[0, 1]`; out-of-range inputs are clamped. In competition
/// mode both probabilities always read as zero.
#[derive(Debug, Clone)]
pub struct TypingRequest {
    text: Vec<char>,
    target_wpm: f64,
    start_delay_secs: f64,
    typo_probability: f64,
    synonym_probability: f64,
    mode: Mode,
}

impl TypingRequest {
    pub fn new(text: &str, target_wpm: f64, mode: Mode) -> Self {
        Self {
            text: text.chars().collect(),
            target_wpm,
            start_delay_secs: 0.0,
            typo_probability: 0.0,
            synonym_probability: 0.0,
            mode,
        }
    }

    pub fn with_start_delay(mut self, secs: f64) -> Self {
        self.start_delay_secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
        self
    }

    pub fn with_typo_probability(mut self, p: f64) -> Self {
        self.typo_probability = clamp_probability(p);
        self
    }

    pub fn with_synonym_probability(mut self, p: f64) -> Self {
        self.synonym_probability = clamp_probability(p);
        self
    }

    pub fn text(&self) -> &[char] {
        &self.text
    }

    pub fn target_wpm(&self) -> f64 {
        self.target_wpm
    }

    pub fn start_delay_secs(&self) -> f64 {
        self.start_delay_secs
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn typo_probability(&self) -> f64 {
        match self.mode {
            Mode::Natural => self.typo_probability,
            Mode::Competition => 0.0,
        }
    }

    pub fn synonym_probability(&self) -> f64 {
        match self.mode {
            Mode::Natural => self.synonym_probability,
            Mode::Competition => 0.0,
        }
    }
}

fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Recorded output of a run: what reached the sink and how long the engine waited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub version: u32,
    pub config: TranscriptConfig,
    pub events: Vec<Keystroke>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptConfig {
    pub target_wpm: f64,
    pub mode: Mode,
    pub typo_probability: f64,
    pub synonym_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Keystroke {
    Char { ch: char },
    Backspace,
    Wait { secs: f64 },
}

impl Transcript {
    pub fn new(request: &TypingRequest, events: Vec<Keystroke>) -> Self {
        Self {
            version: TRANSCRIPT_VERSION,
            config: TranscriptConfig {
                target_wpm: request.target_wpm(),
                mode: request.mode(),
                typo_probability: request.typo_probability(),
                synonym_probability: request.synonym_probability(),
            },
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn competition_mode_forces_zero_probabilities() {
        let req = TypingRequest::new("abc", 60.0, Mode::Competition)
            .with_typo_probability(0.2)
            .with_synonym_probability(0.2);
        assert_eq!(req.typo_probability(), 0.0);
        assert_eq!(req.synonym_probability(), 0.0);
    }

    #[test]
    fn probabilities_are_clamped() {
        let req = TypingRequest::new("abc", 60.0, Mode::Natural)
            .with_typo_probability(3.0)
            .with_synonym_probability(f64::NAN)
            .with_start_delay(-1.0);
        assert_eq!(req.typo_probability(), 1.0);
        assert_eq!(req.synonym_probability(), 0.0);
        assert_eq!(req.start_delay_secs(), 0.0);
    }

    #[test]
    fn keystrokes_serialize_as_tagged_json() {
        let events = vec![
            Keystroke::Char { ch: 'a' },
            Keystroke::Backspace,
            Keystroke::Wait { secs: 0.5 },
        ];
        let json = serde_json::to_string(&events).expect("serialize");
        assert_eq!(
            json,
            r#"[{"type":"char","ch":"a"},{"type":"backspace"},{"type":"wait","secs":0.5}]"#
        );
    }
}
