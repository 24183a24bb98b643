use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc;

/// Status updates from a run, delivered in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Started,
    Progress { percent: u8, rate_label: String },
    Completed { final_wpm: f64 },
    Cancelled,
    Failed { reason: String },
}

impl ProgressEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Completed { .. } | ProgressEvent::Cancelled | ProgressEvent::Failed { .. }
        )
    }

    /// One-line status text for display.
    pub fn status_line(&self) -> String {
        match self {
            ProgressEvent::Started => "Typing in progress...".to_string(),
            ProgressEvent::Progress {
                percent,
                rate_label,
            } => format!("Typing... {percent}% complete - {rate_label}"),
            ProgressEvent::Completed { final_wpm } => {
                format!("Typing completed! Final WPM: {}", final_wpm.trunc() as i64)
            }
            ProgressEvent::Cancelled => "Typing stopped.".to_string(),
            ProgressEvent::Failed { reason } => format!("Typing failed: {reason}"),
        }
    }
}

pub trait ProgressSink {
    fn report(&mut self, event: ProgressEvent);
}

impl ProgressSink for mpsc::Sender<ProgressEvent> {
    fn report(&mut self, event: ProgressEvent) {
        if self.send(event).is_err() {
            tracing::trace!("progress receiver dropped");
        }
    }
}

impl ProgressSink for Vec<ProgressEvent> {
    fn report(&mut self, event: ProgressEvent) {
        self.push(event);
    }
}

/// Live state shared between a controller and its engine thread.
///
/// Only the controller sets `cancelled`; only the engine writes the counters.
#[derive(Debug, Default)]
pub struct RunState {
    cancelled: AtomicBool,
    characters_emitted: AtomicUsize,
    elapsed_bits: AtomicU64,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn characters_emitted(&self) -> usize {
        self.characters_emitted.load(Ordering::SeqCst)
    }

    pub fn elapsed_secs(&self) -> f64 {
        f64::from_bits(self.elapsed_bits.load(Ordering::SeqCst))
    }

    pub(crate) fn record(&self, characters: usize, elapsed_secs: f64) {
        self.characters_emitted.store(characters, Ordering::SeqCst);
        self.elapsed_bits.store(elapsed_secs.to_bits(), Ordering::SeqCst);
    }

    pub(crate) fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
        self.record(0, 0.0);
    }
}
