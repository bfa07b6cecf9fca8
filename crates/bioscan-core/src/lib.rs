//! # bioscan-core: Pure Logic for the BioScan Food Scanner
//!
//! This crate holds everything about a food scan that does not need a clock,
//! a device or a screen: the session state machine, the result synthesizer,
//! the scripted status texts and the advice shown next to a result.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BioScan Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Display layer (any UI)                       │   │
//! │  │    Sample picker ──► Connect ──► Scan ──► Result cards         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ SessionEvent stream                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 bioscan-session (tokio runtime)                 │   │
//! │  │    ScanController, timed sequences, capture lease, config      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bioscan-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌─────────────┐  ┌───────────┐  ┌──────────┐  │   │
//! │  │   │   types   │  │ synthesizer │  │  session  │  │ sequence │  │   │
//! │  │   │ScanResult │  │   Finding   │  │SessionSt. │  │  labels  │  │   │
//! │  │   │ Sample    │  │   Policy    │  │SessionView│  │  cadence │  │   │
//! │  │   └───────────┘  └─────────────┘  └───────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO TIMERS • NO DEVICES • RANDOMNESS IS INJECTED     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Scan modes, sample references, result blocks
//! - [`session`] - Session state machine and its display projection
//! - [`synthesizer`] - Plausible result generation
//! - [`sequence`] - Connect and scan status scripts
//! - [`recommendations`] - Advice text for a result
//! - [`library`] - Built-in sample catalogue
//! - [`validation`] - Input checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use bioscan_core::{SampleReference, ScanMode, SessionPhase, SessionState, Verdict};
//! use bioscan_core::synthesize;
//!
//! let state = SessionState::new(ScanMode::Visual)
//!     .select_sample(SampleReference::library("apple").unwrap())
//!     .and_then(|s| s.begin_connect())
//!     .and_then(|s| s.finish_connect())
//!     .and_then(|s| s.begin_scan())
//!     .unwrap();
//!
//! let tag = state.scan_tag().unwrap();
//! let done = state.finish_scan(synthesize(&tag, state.mode())).unwrap();
//!
//! assert_eq!(done.phase(), SessionPhase::Complete);
//! assert_eq!(done.result().unwrap().overall, Verdict::Safe);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod library;
pub mod recommendations;
pub mod sequence;
pub mod session;
pub mod synthesizer;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, Refusal, ValidationError};
pub use recommendations::Recommendations;
pub use sequence::{StatusSequence, StatusStep};
pub use session::{SessionPhase, SessionState, SessionView};
pub use synthesizer::{synthesize, Finding, SynthesisPolicy, Synthesizer};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Synthesizer tag for a loaded bacteria sensor.
pub const SENSOR_SAMPLE_TAG: &str = "bacteria_sensor";

/// Synthesizer tag for a still taken with the camera.
pub const CAMERA_SAMPLE_TAG: &str = "camera";

/// Synthesizer tag for an uploaded picture.
pub const UPLOAD_SAMPLE_TAG: &str = "uploaded";

/// Largest accepted uploaded image (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Longest accepted status step.
///
/// Anything slower makes the demo look frozen.
pub const MAX_STEP_MS: u64 = 10_000;
