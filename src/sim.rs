use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;

use crate::model::{Keystroke, Transcript, TypingRequest};
use crate::sink::{Clock, KeystrokeSink};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TranscriptStats {
    pub events: usize,
    pub characters: usize,
    pub backspaces: usize,
    pub total_wait_secs: f64,
}

pub fn stats(events: &[Keystroke]) -> TranscriptStats {
    let mut out = TranscriptStats {
        events: events.len(),
        ..Default::default()
    };

    for event in events {
        match event {
            Keystroke::Char { .. } => out.characters += 1,
            Keystroke::Backspace => out.backspaces += 1,
            Keystroke::Wait { secs } => out.total_wait_secs += secs,
        }
    }

    out
}

/// The text left in an editor after replaying `events` at the end of the buffer.
pub fn simulate_typed_text(events: &[Keystroke]) -> String {
    let mut buf: Vec<char> = Vec::new();
    for event in events {
        match event {
            Keystroke::Char { ch } => buf.push(*ch),
            Keystroke::Backspace => {
                buf.pop();
            }
            Keystroke::Wait { .. } => {}
        }
    }
    buf.into_iter().collect()
}

#[derive(Debug, Default)]
struct TimelineState {
    events: Vec<Keystroke>,
    now: f64,
}

/// In-memory sink and virtual clock sharing one event log.
///
/// Clone it once for the sink side and once for the clock side; sleeping records a wait and
/// advances virtual time without blocking.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    state: Arc<Mutex<TimelineState>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TimelineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn events(&self) -> Vec<Keystroke> {
        self.lock().events.clone()
    }

    pub fn now(&self) -> f64 {
        self.lock().now
    }

    /// Every wait recorded, in order.
    pub fn waits(&self) -> Vec<f64> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                Keystroke::Wait { secs } => Some(*secs),
                _ => None,
            })
            .collect()
    }

    pub fn typed_text(&self) -> String {
        simulate_typed_text(&self.lock().events)
    }

    pub fn transcript(&self, request: &TypingRequest) -> Transcript {
        Transcript::new(request, self.events())
    }
}

impl KeystrokeSink for Timeline {
    fn emit(&mut self, c: char) -> Result<()> {
        self.lock().events.push(Keystroke::Char { ch: c });
        Ok(())
    }

    fn backspace(&mut self) -> Result<()> {
        self.lock().events.push(Keystroke::Backspace);
        Ok(())
    }
}

impl Clock for Timeline {
    fn sleep(&mut self, secs: f64) {
        if !(secs.is_finite() && secs > 0.0) {
            return;
        }
        let mut state = self.lock();
        state.events.push(Keystroke::Wait { secs });
        state.now += secs;
    }

    fn elapsed(&self) -> f64 {
        self.now()
    }

    // Virtual time cannot be interrupted mid-wait, so the whole delay is one event.
    fn sleep_interruptible(&mut self, secs: f64, stop: &dyn Fn() -> bool) -> bool {
        if stop() {
            return false;
        }
        self.sleep(secs);
        !stop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn backspace_on_empty_buffer_is_ignored() {
        let events = vec![
            Keystroke::Backspace,
            Keystroke::Char { ch: 'a' },
            Keystroke::Backspace,
            Keystroke::Backspace,
            Keystroke::Char { ch: 'b' },
        ];
        assert_eq!(simulate_typed_text(&events), "b");
    }

    #[test]
    fn timeline_clones_share_one_log() {
        let timeline = Timeline::new();
        let mut sink = timeline.clone();
        let mut clock = timeline.clone();

        sink.emit('x').expect("emit");
        clock.sleep(0.25);
        clock.sleep(0.0);
        sink.backspace().expect("backspace");
        clock.sleep(0.5);

        assert_eq!(
            timeline.events(),
            vec![
                Keystroke::Char { ch: 'x' },
                Keystroke::Wait { secs: 0.25 },
                Keystroke::Backspace,
                Keystroke::Wait { secs: 0.5 },
            ]
        );
        assert_eq!(timeline.now(), 0.75);
        assert_eq!(clock.elapsed(), 0.75);
        assert_eq!(timeline.typed_text(), "");
    }

    #[test]
    fn stats_count_each_kind() {
        let events = vec![
            Keystroke::Char { ch: 'a' },
            Keystroke::Wait { secs: 1.0 },
            Keystroke::Backspace,
            Keystroke::Wait { secs: 0.5 },
        ];
        assert_eq!(
            stats(&events),
            TranscriptStats {
                events: 4,
                characters: 1,
                backspaces: 1,
                total_wait_secs: 1.5,
            }
        );
    }

    #[test]
    fn interrupted_virtual_sleep_records_nothing() {
        let mut timeline = Timeline::new();
        assert!(!timeline.sleep_interruptible(3.0, &|| true));
        assert!(timeline.events().is_empty());
        assert!(timeline.sleep_interruptible(3.0, &|| false));
        assert_eq!(timeline.waits(), vec![3.0]);
    }
}
