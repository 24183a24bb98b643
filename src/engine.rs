use std::sync::Arc;

use rand::Rng;

use crate::cadence::{words_per_minute, CadenceModel};
use crate::error::TypingError;
use crate::keyboard::mistype;
use crate::lexicon::Lexicon;
use crate::model::{Mode, TypingRequest};
use crate::progress::{ProgressEvent, ProgressSink, RunState};
use crate::sink::{Clock, KeystrokeSink};

/// Characters between two progress reports.
pub const PROGRESS_EVERY: usize = 10;

/// Only words longer than this are considered for a synonym swap.
pub const MIN_SWAP_WORD_LEN: usize = 3;

// Pace of the substitute-then-correct sequence, in base intervals.
const SWAP_TYPE_PACE: f64 = 0.1;
const SWAP_NOTICE_PAUSE: f64 = 0.3;
const SWAP_ERASE_PACE: f64 = 0.05;
const SWAP_RETYPE_PACE: f64 = 1.0;

// Pace of a corrected typo, in base intervals.
const TYPO_NOTICE_PAUSE: f64 = 0.3;
const TYPO_ERASE_PAUSE: f64 = 0.2;
const TYPO_RETYPE_PACE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Delaying,
    Scanning,
    Emitting,
    Completed,
    Cancelled,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunOutcome {
    Completed { characters: usize, final_wpm: f64 },
    Cancelled { characters: usize },
}

impl RunOutcome {
    pub fn characters(&self) -> usize {
        match *self {
            RunOutcome::Completed { characters, .. } | RunOutcome::Cancelled { characters } => {
                characters
            }
        }
    }
}

fn emit(sink: &mut impl KeystrokeSink, c: char) -> Result<(), TypingError> {
    sink.emit(c).map_err(TypingError::sink)
}

fn backspace(sink: &mut impl KeystrokeSink) -> Result<(), TypingError> {
    sink.backspace().map_err(TypingError::sink)
}

fn is_word_char(c: char) -> bool {
    c.is_alphabetic() || c == '\''
}

/// Walks the text of one request and turns it into keystrokes and waits.
///
/// The run is strictly sequential. Cancellation is polled during the start delay and before
/// each character; a typo or synonym sequence, once begun, always finishes.
pub struct TypingEngine<R: Rng> {
    request: TypingRequest,
    cadence: CadenceModel,
    lexicon: Arc<Lexicon>,
    rng: R,
    phase: RunPhase,
}

impl<R: Rng> TypingEngine<R> {
    pub fn new(request: TypingRequest, lexicon: Arc<Lexicon>, rng: R) -> Self {
        let cadence = CadenceModel::new(request.target_wpm(), request.mode());
        Self {
            request,
            cadence,
            lexicon,
            rng,
            phase: RunPhase::Idle,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn request(&self) -> &TypingRequest {
        &self.request
    }

    pub fn base_interval(&self) -> f64 {
        self.cadence.base_interval()
    }

    pub fn run(
        &mut self,
        sink: &mut impl KeystrokeSink,
        clock: &mut impl Clock,
        progress: &mut impl ProgressSink,
        state: &RunState,
    ) -> Result<RunOutcome, TypingError> {
        let result = self.run_inner(sink, clock, progress, state);
        if let Err(err) = &result {
            self.phase = RunPhase::Failed;
            let reason = match err {
                TypingError::Sink { reason } => reason.clone(),
                other => other.to_string(),
            };
            tracing::warn!(%reason, "typing run failed");
            progress.report(ProgressEvent::Failed { reason });
        }
        result
    }

    fn run_inner(
        &mut self,
        sink: &mut impl KeystrokeSink,
        clock: &mut impl Clock,
        progress: &mut impl ProgressSink,
        state: &RunState,
    ) -> Result<RunOutcome, TypingError> {
        self.phase = RunPhase::Delaying;
        let delay = self.request.start_delay_secs();
        tracing::debug!(delay_secs = delay, "waiting before first keystroke");
        if !clock.sleep_interruptible(delay, &|| state.is_cancelled()) {
            return Ok(self.cancel(progress, 0));
        }

        let len = self.request.text().len();
        tracing::info!(
            characters = len,
            mode = self.request.mode().as_str(),
            target_wpm = self.request.target_wpm(),
            "typing started"
        );
        progress.report(ProgressEvent::Started);

        let origin = clock.elapsed();
        let mut emitted = 0usize;
        let mut i = 0usize;

        while i < len {
            if state.is_cancelled() {
                return Ok(self.cancel(progress, emitted));
            }

            let advanced = self.step(i, sink, clock)?;
            let before = emitted;
            emitted += advanced;
            i += advanced;

            let elapsed = clock.elapsed() - origin;
            state.record(emitted, elapsed);

            if emitted / PROGRESS_EVERY != before / PROGRESS_EVERY || i == len {
                self.report_progress(progress, i, len, emitted, elapsed);
            }
        }

        let elapsed = clock.elapsed() - origin;
        let final_wpm = words_per_minute(emitted, elapsed);
        self.phase = RunPhase::Completed;
        tracing::info!(characters = emitted, final_wpm, "typing completed");
        progress.report(ProgressEvent::Completed { final_wpm });

        Ok(RunOutcome::Completed {
            characters: emitted,
            final_wpm,
        })
    }

    fn cancel(&mut self, progress: &mut impl ProgressSink, characters: usize) -> RunOutcome {
        self.phase = RunPhase::Cancelled;
        tracing::info!(characters, "typing cancelled");
        progress.report(ProgressEvent::Cancelled);
        RunOutcome::Cancelled { characters }
    }

    fn report_progress(
        &self,
        progress: &mut impl ProgressSink,
        i: usize,
        len: usize,
        emitted: usize,
        elapsed: f64,
    ) {
        if elapsed <= 0.0 {
            return;
        }

        let percent = ((i as f64 / len as f64) * 100.0).clamp(0.0, 100.0) as u8;
        let rate_label = match self.request.mode() {
            Mode::Natural => format!(
                "Current: {} WPM",
                words_per_minute(emitted, elapsed).trunc() as i64
            ),
            Mode::Competition => format!("Target: {} WPM", self.request.target_wpm()),
        };
        progress.report(ProgressEvent::Progress {
            percent,
            rate_label,
        });
    }

    /// Handle the character at `i`, returning how many characters of the text were consumed.
    fn step(
        &mut self,
        i: usize,
        sink: &mut impl KeystrokeSink,
        clock: &mut impl Clock,
    ) -> Result<usize, TypingError> {
        let c = self.request.text()[i];
        let natural = self.request.mode() == Mode::Natural;

        if natural && c.is_alphabetic() && self.request.synonym_probability() > 0.0 {
            self.phase = RunPhase::Scanning;
            let word: String = self.request.text()[i..]
                .iter()
                .copied()
                .take_while(|&ch| is_word_char(ch))
                .collect();

            if let Some(synonym) = self.pick_synonym(&word) {
                self.phase = RunPhase::Emitting;
                tracing::debug!(%word, %synonym, "swapping in a synonym");
                self.substitute_then_correct(&word, &synonym, sink, clock)?;
                return Ok(word.chars().count());
            }
        }

        self.phase = RunPhase::Emitting;
        let typo_eligible = c.is_alphabetic() || c == ' ';
        if natural && typo_eligible && self.rng.gen::<f64>() < self.request.typo_probability() {
            self.typo_then_correct(c, sink, clock)?;
        } else {
            emit(sink, c)?;
            let delay = self.cadence.delay(c, &mut self.rng);
            clock.sleep(delay);
        }

        Ok(1)
    }

    fn pick_synonym(&mut self, word: &str) -> Option<String> {
        if word.chars().count() <= MIN_SWAP_WORD_LEN || !self.lexicon.contains(word) {
            return None;
        }
        if self.rng.gen::<f64>() >= self.request.synonym_probability() {
            return None;
        }
        self.lexicon
            .choose_synonym(word, &mut self.rng)
            .map(str::to_string)
    }

    fn substitute_then_correct(
        &mut self,
        word: &str,
        synonym: &str,
        sink: &mut impl KeystrokeSink,
        clock: &mut impl Clock,
    ) -> Result<(), TypingError> {
        let base = self.cadence.base_interval();

        for c in synonym.chars() {
            emit(sink, c)?;
            clock.sleep(base * SWAP_TYPE_PACE);
        }

        clock.sleep(base * SWAP_NOTICE_PAUSE);
        for _ in synonym.chars() {
            backspace(sink)?;
            clock.sleep(base * SWAP_ERASE_PACE);
        }

        for c in word.chars() {
            emit(sink, c)?;
            clock.sleep(base * SWAP_RETYPE_PACE);
        }

        Ok(())
    }

    fn typo_then_correct(
        &mut self,
        c: char,
        sink: &mut impl KeystrokeSink,
        clock: &mut impl Clock,
    ) -> Result<(), TypingError> {
        let base = self.cadence.base_interval();
        let wrong = mistype(c, &mut self.rng);
        tracing::debug!(intended = ?c, typed = ?wrong, "typo");

        emit(sink, wrong)?;
        clock.sleep(base * TYPO_NOTICE_PAUSE);
        backspace(sink)?;
        clock.sleep(base * TYPO_ERASE_PAUSE);
        emit(sink, c)?;
        clock.sleep(base * TYPO_RETYPE_PACE);

        Ok(())
    }
}
