//! # Scan Controller
//!
//! Owns one [`SessionState`] and drives it on the clock. The pure
//! transitions in `bioscan_core::session` decide what is allowed; this
//! module runs the timed connect/scan sequences and publishes events.
//!
//! ## Controller Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ScanController                                   │
//! │                                                                         │
//! │  Mutex<Inner> { state, generation, sequence }                          │
//! │       ▲                 ▲                                               │
//! │       │ short sync      │ step / completion callbacks                   │
//! │       │ sections        │ (tokio task from ScheduledSequence)           │
//! │  user actions ──────────┘                                               │
//! │                                                                         │
//! │  reset() / switch_mode():                                              │
//! │    generation += 1, cancel sequence, state = Idle                       │
//! │                                                                         │
//! │  Every callback compares its captured generation with the current one  │
//! │  and discards itself when they differ. A stale scan never lands.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The mutex is a `std::sync::Mutex`; it is never held across an await.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use bioscan_core::session::Transition;
use bioscan_core::{
    Refusal, SampleReference, ScanMode, SessionState, SessionView, StatusSequence, StatusStep,
    Synthesizer,
};

use crate::config::ScannerConfig;
use crate::error::SessionResult;
use crate::events::{NoOpEmitter, SessionEventEmitter};
use crate::scheduler::{ScheduledSequence, SequenceHandle};

// =============================================================================
// Ack
// =============================================================================

/// Outcome of a user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    Accepted,
    /// Precondition not met; nothing changed.
    Ignored(Refusal),
}

impl Ack {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Ack::Accepted)
    }
}

// =============================================================================
// Shared State
// =============================================================================

struct Inner {
    state: SessionState,
    generation: u64,
    sequence: Option<SequenceHandle>,
}

impl Inner {
    /// Invalidates and cancels whatever sequence is in flight.
    fn invalidate(&mut self) {
        self.generation += 1;
        if let Some(sequence) = self.sequence.take() {
            sequence.cancel();
        }
    }
}

struct Shared {
    inner: Mutex<Inner>,
    rng: Mutex<StdRng>,
    synthesizer: Synthesizer,
    emitter: Arc<dyn SessionEventEmitter>,
    connect_step: Duration,
    scan_step: Duration,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Shows a sequence label if `generation` is still current.
    fn show_step(&self, generation: u64, step: &StatusStep) -> bool {
        let view = {
            let mut inner = self.lock();
            if inner.generation != generation {
                return false;
            }
            match inner.state.show_status(step.label) {
                Ok(next) => inner.state = next,
                Err(_) => return false,
            }
            inner.state.view()
        };

        self.emitter.emit_status(Some(step.label));
        self.emitter.emit_view(&view);
        true
    }

    fn finish_connect(&self, generation: u64) {
        let view = {
            let mut inner = self.lock();
            if inner.generation != generation {
                debug!(generation, "Discarding stale connect completion");
                return;
            }
            match inner.state.finish_connect() {
                Ok(next) => inner.state = next,
                Err(refusal) => {
                    debug!(%refusal, "Connect completion ignored");
                    return;
                }
            }
            inner.sequence = None;
            inner.state.view()
        };

        info!("Scanner connected");
        self.emitter.emit_status(None);
        self.emitter.emit_view(&view);
    }

    fn finish_scan(&self, generation: u64, tag: &str, mode: ScanMode) {
        let (result, view) = {
            let mut inner = self.lock();
            if inner.generation != generation {
                debug!(generation, tag, "Discarding stale scan completion");
                return;
            }

            let result = {
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                self.synthesizer
                    .synthesize_with(tag, mode, &mut *rng, Utc::now())
            };

            match inner.state.finish_scan(result.clone()) {
                Ok(next) => inner.state = next,
                Err(refusal) => {
                    debug!(%refusal, "Scan completion ignored");
                    return;
                }
            }
            inner.sequence = None;
            (result, inner.state.view())
        };

        info!(tag, verdict = ?result.overall, "Scan finished");
        self.emitter.emit_status(None);
        self.emitter.emit_result(&result);
        self.emitter.emit_view(&view);
    }
}

// =============================================================================
// Scan Controller
// =============================================================================

/// Drives one scan session. Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct ScanController {
    shared: Arc<Shared>,
}

impl ScanController {
    /// Creates a controller in Visual mode with no event sink.
    pub fn new(config: &ScannerConfig) -> SessionResult<Self> {
        Self::with_emitter(config, Arc::new(NoOpEmitter))
    }

    /// Creates a controller in Visual mode with a custom event emitter.
    pub fn with_emitter(
        config: &ScannerConfig,
        emitter: Arc<dyn SessionEventEmitter>,
    ) -> SessionResult<Self> {
        config.validate()?;
        let synthesizer = Synthesizer::new(config.synthesis_policy())?;

        let rng = match config.synthesis.seed {
            Some(seed) => {
                debug!(seed, "Using seeded synthesizer");
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };

        Ok(ScanController {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: SessionState::default(),
                    generation: 0,
                    sequence: None,
                }),
                rng: Mutex::new(rng),
                synthesizer,
                emitter,
                connect_step: config.connect_step(),
                scan_step: config.scan_step(),
            }),
        })
    }

    /// Snapshot of the session.
    pub fn state(&self) -> SessionState {
        self.shared.lock().state.clone()
    }

    pub fn view(&self) -> SessionView {
        self.shared.lock().state.view()
    }

    // =========================================================================
    // User Actions
    // =========================================================================

    /// Attaches a sample. Ignored while busy or with a result on screen.
    pub fn select_sample(&self, sample: SampleReference) -> Ack {
        self.apply("select_sample", |state| state.select_sample(sample))
    }

    /// Sensor-mode shorthand for a loaded sensor sample.
    pub fn load_sensor_sample(&self) -> Ack {
        self.apply("load_sensor_sample", SessionState::load_sensor_sample)
    }

    /// Starts the connect sequence.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&self) -> Ack {
        let shared = &self.shared;
        let view = {
            let mut inner = shared.lock();
            let next = match inner.state.begin_connect() {
                Ok(next) => next,
                Err(refusal) => return ignored("connect", refusal),
            };
            inner.state = next;

            let generation = inner.generation;
            let on_step = {
                let shared = shared.clone();
                move |step: &StatusStep| shared.show_step(generation, step)
            };
            let on_complete = {
                let shared = shared.clone();
                move || shared.finish_connect(generation)
            };

            inner.sequence = Some(ScheduledSequence::spawn(
                StatusSequence::connect(shared.connect_step),
                on_step,
                on_complete,
            ));
            inner.state.view()
        };

        info!("Connecting to scanner");
        shared.emitter.emit_view(&view);
        Ack::Accepted
    }

    /// Starts the scan sequence; the result arrives when it ends.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_scan(&self) -> Ack {
        let shared = &self.shared;
        let view = {
            let mut inner = shared.lock();
            let next = match inner.state.begin_scan() {
                Ok(next) => next,
                Err(refusal) => return ignored("start_scan", refusal),
            };
            let mode = next.mode();
            let Some(tag) = next.scan_tag() else {
                return ignored("start_scan", Refusal::NoSample { mode });
            };
            inner.state = next;

            let generation = inner.generation;
            let on_step = {
                let shared = shared.clone();
                move |step: &StatusStep| shared.show_step(generation, step)
            };
            let on_complete = {
                let shared = shared.clone();
                let tag = tag.clone();
                move || shared.finish_scan(generation, &tag, mode)
            };

            inner.sequence = Some(ScheduledSequence::spawn(
                StatusSequence::scan(mode, shared.scan_step),
                on_step,
                on_complete,
            ));
            debug!(tag = %tag, %mode, "Scan started");
            inner.state.view()
        };

        shared.emitter.emit_view(&view);
        Ack::Accepted
    }

    /// Back to Idle, keeping the mode. Always accepted.
    pub fn reset(&self) -> Ack {
        let view = {
            let mut inner = self.shared.lock();
            inner.invalidate();
            inner.state = inner.state.reset();
            inner.state.view()
        };

        debug!("Session reset");
        self.shared.emitter.emit_status(None);
        self.shared.emitter.emit_view(&view);
        Ack::Accepted
    }

    /// Resets into another mode. Ignored if the mode is unchanged.
    pub fn switch_mode(&self, mode: ScanMode) -> Ack {
        let view = {
            let mut inner = self.shared.lock();
            let next = match inner.state.switch_mode(mode) {
                Ok(next) => next,
                Err(refusal) => return ignored("switch_mode", refusal),
            };
            inner.invalidate();
            inner.state = next;
            inner.state.view()
        };

        info!(%mode, "Scan mode switched");
        self.shared.emitter.emit_status(None);
        self.shared.emitter.emit_view(&view);
        Ack::Accepted
    }

    /// Applies a transition that needs no timer.
    fn apply<F>(&self, action: &'static str, transition: F) -> Ack
    where
        F: FnOnce(&SessionState) -> Transition,
    {
        let view = {
            let mut inner = self.shared.lock();
            match transition(&inner.state) {
                Ok(next) => inner.state = next,
                Err(refusal) => return ignored(action, refusal),
            }
            inner.state.view()
        };

        self.shared.emitter.emit_view(&view);
        Ack::Accepted
    }
}

fn ignored(action: &'static str, refusal: Refusal) -> Ack {
    debug!(action, %refusal, "Action ignored");
    Ack::Ignored(refusal)
}
