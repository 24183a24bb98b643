use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

/// Where keystrokes go. Both calls are treated as synchronous: the engine waits its own
/// delay after each one returns.
pub trait KeystrokeSink {
    fn emit(&mut self, c: char) -> Result<()>;
    fn backspace(&mut self) -> Result<()>;
}

/// Time source for the engine. Seconds are `f64` so computed intervals are slept exactly.
pub trait Clock {
    fn sleep(&mut self, secs: f64);

    /// Seconds since the clock was created.
    fn elapsed(&self) -> f64;

    /// Sleep for `secs` in short slices, giving up as soon as `stop` returns true.
    /// Returns false if the wait was cut short.
    fn sleep_interruptible(&mut self, secs: f64, stop: &dyn Fn() -> bool) -> bool {
        let mut remaining = secs;
        while remaining > 0.0 {
            if stop() {
                return false;
            }
            let step = remaining.min(SLEEP_SLICE_SECS);
            self.sleep(step);
            remaining -= step;
        }
        !stop()
    }
}

const SLEEP_SLICE_SECS: f64 = 0.05;

impl<K: KeystrokeSink + ?Sized> KeystrokeSink for Box<K> {
    fn emit(&mut self, c: char) -> Result<()> {
        (**self).emit(c)
    }

    fn backspace(&mut self) -> Result<()> {
        (**self).backspace()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn sleep(&mut self, secs: f64) {
        (**self).sleep(secs)
    }

    fn elapsed(&self) -> f64 {
        (**self).elapsed()
    }

    fn sleep_interruptible(&mut self, secs: f64, stop: &dyn Fn() -> bool) -> bool {
        (**self).sleep_interruptible(secs, stop)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn sleep(&mut self, secs: f64) {
        if secs.is_finite() && secs > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(secs));
        }
    }

    fn elapsed(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Renders keystrokes onto a terminal-like writer. A backspace erases the previous cell.
#[derive(Debug)]
pub struct TerminalSink<W: Write> {
    out: W,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> KeystrokeSink for TerminalSink<W> {
    fn emit(&mut self, c: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.out
            .write_all(c.encode_utf8(&mut buf).as_bytes())
            .context("failed to write keystroke")?;
        self.out.flush().context("failed to flush keystroke")
    }

    fn backspace(&mut self) -> Result<()> {
        self.out
            .write_all(b"\x08 \x08")
            .context("failed to write backspace")?;
        self.out.flush().context("failed to flush backspace")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_sink_erases_on_backspace() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.emit('h').expect("emit");
        sink.emit('é').expect("emit");
        sink.backspace().expect("backspace");
        assert_eq!(sink.into_inner(), "hé\x08 \x08".as_bytes());
    }

    #[test]
    fn system_clock_ignores_non_positive_sleeps() {
        let mut clock = SystemClock::new();
        clock.sleep(-1.0);
        clock.sleep(f64::NAN);
        assert!(clock.elapsed() < 1.0);
    }

    #[test]
    fn interruptible_sleep_stops_early() {
        let mut clock = SystemClock::new();
        assert!(!clock.sleep_interruptible(30.0, &|| true));
        assert!(clock.elapsed() < 1.0);
        assert!(clock.sleep_interruptible(0.01, &|| false));
    }
}
