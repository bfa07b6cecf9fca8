//! # bioscan-session: Async Session Runtime for BioScan
//!
//! Runs scan sessions on the tokio clock: timed connect and scan sequences,
//! cancellation on reset, camera capture leases and display events.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Runtime Architecture                       │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                   ScanController (controller.rs)                 │  │
//! │  │                                                                  │  │
//! │  │  select_sample / connect / start_scan / reset / switch_mode     │  │
//! │  │  Every action returns an Ack; refusals change nothing            │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ScheduledSeq.   │  │ SessionEvent   │  │  CaptureModal          │    │
//! │  │(scheduler.rs)  │  │ Emitter        │  │  (capture.rs)          │    │
//! │  │                │  │ (events.rs)    │  │                        │    │
//! │  │ 600ms steps,   │  │ status, view,  │  │ acquire → frame →      │    │
//! │  │ cancellable    │  │ result, error  │  │ release exactly once   │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  ScannerConfig (config.rs): scanner.toml + BIOSCAN_* environment       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bioscan_core::SampleReference;
//! use bioscan_session::{ScanController, ScannerConfig, TracingEmitter};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScannerConfig::load_or_default(None);
//! let controller = ScanController::with_emitter(&config, Arc::new(TracingEmitter))?;
//!
//! controller.select_sample(SampleReference::library("apple")?);
//! controller.connect();
//! tokio::time::sleep(config.connect_step() * 5).await;
//! controller.start_scan();
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod capture;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod scheduler;

// =============================================================================
// Re-exports
// =============================================================================

pub use capture::{CaptureDevice, CaptureLease, CaptureModal, CaptureStream};
pub use config::{DeviceConfig, ScannerConfig, SynthesisSettings, TimingSettings};
pub use controller::{Ack, ScanController};
pub use error::{SessionError, SessionResult};
pub use events::{ChannelEmitter, NoOpEmitter, SessionEvent, SessionEventEmitter, TracingEmitter};
pub use scheduler::{ScheduledSequence, SequenceHandle, SequenceOutcome};
