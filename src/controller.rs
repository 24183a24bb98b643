use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use rand::Rng;

use crate::engine::{RunOutcome, TypingEngine};
use crate::error::TypingError;
use crate::lexicon::Lexicon;
use crate::model::TypingRequest;
use crate::progress::{ProgressEvent, RunState};
use crate::sink::{Clock, KeystrokeSink};

// Clears the running flag when the engine thread ends, however it ends.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Starts and stops background typing runs, one at a time.
#[derive(Debug, Clone)]
pub struct RunController {
    state: Arc<RunState>,
    running: Arc<AtomicBool>,
    // Held while `start` claims the run and resets its state, and while `stop` cancels.
    gate: Arc<Mutex<()>>,
    lexicon: Arc<Lexicon>,
}

impl RunController {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            state: Arc::new(RunState::new()),
            running: Arc::new(AtomicBool::new(false)),
            gate: Arc::new(Mutex::new(())),
            lexicon,
        }
    }

    fn lock_gate(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> Arc<RunState> {
        self.state.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask the active run to stop at the next character boundary. Does nothing when idle.
    pub fn stop(&self) {
        let _gate = self.lock_gate();
        if self.is_running() {
            tracing::debug!("stop requested");
            self.state.cancel();
        }
    }

    /// Launch `request` on its own thread and return immediately.
    ///
    /// Rejected with [`TypingError::AlreadyRunning`] while another run is active; the active
    /// run is not touched.
    pub fn start<S, C, R>(
        &self,
        request: TypingRequest,
        sink: S,
        clock: C,
        rng: R,
    ) -> Result<RunHandle, TypingError>
    where
        S: KeystrokeSink + Send + 'static,
        C: Clock + Send + 'static,
        R: Rng + Send + 'static,
    {
        let gate = self.lock_gate();
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("start rejected: a run is already active");
            return Err(TypingError::AlreadyRunning);
        }

        let guard = RunningGuard(self.running.clone());
        self.state.reset();
        drop(gate);

        let (tx, rx) = mpsc::channel();
        let state = self.state.clone();
        let lexicon = self.lexicon.clone();

        let join = thread::Builder::new()
            .name("typewright-engine".to_string())
            .spawn(move || {
                let _guard = guard;
                let mut sink = sink;
                let mut clock = clock;
                let mut progress = tx;
                let mut engine = TypingEngine::new(request, lexicon, rng);
                engine.run(&mut sink, &mut clock, &mut progress, &state)
            })
            .map_err(|err| TypingError::Worker {
                reason: err.to_string(),
            })?;

        Ok(RunHandle { events: rx, join })
    }
}

/// The caller's end of a run: its progress events and its result.
#[derive(Debug)]
pub struct RunHandle {
    events: Receiver<ProgressEvent>,
    join: JoinHandle<Result<RunOutcome, TypingError>>,
}

impl RunHandle {
    /// Blocking iterator over progress events; ends when the run's thread finishes.
    pub fn events(&self) -> mpsc::Iter<'_, ProgressEvent> {
        self.events.iter()
    }

    /// Events already delivered, without blocking.
    pub fn try_events(&self) -> Vec<ProgressEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub fn join(self) -> Result<RunOutcome, TypingError> {
        self.join.join().map_err(|_| TypingError::Worker {
            reason: "engine thread panicked".to_string(),
        })?
    }
}
