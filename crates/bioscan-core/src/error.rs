//! # Error Types
//!
//! Domain-specific error types for bioscan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bioscan-core errors (this file)                                        │
//! │  ├── Refusal          - Action not allowed in the current phase        │
//! │  ├── ValidationError  - Rejected sample / settings input               │
//! │  └── CoreError        - Validation, lookup and encoding failures       │
//! │                                                                         │
//! │  bioscan-session errors (separate crate)                                │
//! │  └── SessionError     - Config load/save, capture device failures      │
//! │                                                                         │
//! │  Flow: Refusal ──► Ack::Ignored (never an error for the display)       │
//! │        ValidationError → CoreError → SessionError → user message       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (phase, sample id, etc.)
//! 3. Errors are enum variants, never String
//! 4. A `Refusal` is a precondition violation: the caller keeps its state

use thiserror::Error;

use crate::session::SessionPhase;
use crate::types::ScanMode;

// =============================================================================
// Refusal (Precondition Violation)
// =============================================================================

/// Why a session transition was refused.
///
/// A refusal never mutates state. The controller turns it into
/// `Ack::Ignored` and logs it; nothing is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Refusal {
    /// A status sequence is in flight (connecting or scanning).
    #[error("session is busy ({phase:?})")]
    Busy { phase: SessionPhase },

    /// A result is on screen; the session must be reset first.
    #[error("scan already complete, reset required")]
    AlreadyComplete,

    /// `connect()` while connected or connecting.
    #[error("scanner already connected")]
    AlreadyConnected,

    /// `start_scan()` without a connected scanner.
    #[error("scanner not connected")]
    NotConnected,

    /// `start_scan()` without a usable sample for the current mode.
    #[error("no sample loaded for {mode} mode")]
    NoSample { mode: ScanMode },

    /// Sample kind does not belong to the current mode.
    #[error("{sample} sample cannot be used in {mode} mode")]
    WrongMode { sample: &'static str, mode: ScanMode },

    /// A sequence step or completion arrived with nothing in flight.
    #[error("no {0} in progress")]
    NotInProgress(&'static str),

    /// `switch_mode()` to the mode already active.
    #[error("already in {0} mode")]
    SameMode(ScanMode),
}

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Library id that is not in the sample catalogue.
    #[error("Unknown library sample: {0}")]
    UnknownSample(String),

    /// Result could not be encoded for the display layer.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a sample or a tuning value doesn't meet requirements.
/// Used for early validation before any session transition runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Payload is larger than allowed.
    #[error("{field} must be at most {max} bytes")]
    TooLarge { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Invalid format (e.g., URI without a scheme).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refusal_messages() {
        let refusal = Refusal::NoSample {
            mode: ScanMode::SensorBased,
        };
        assert_eq!(refusal.to_string(), "no sample loaded for sensor mode");

        let refusal = Refusal::WrongMode {
            sample: "sensor",
            mode: ScanMode::Visual,
        };
        assert_eq!(
            refusal.to_string(),
            "sensor sample cannot be used in visual mode"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "image".to_string(),
        };
        assert_eq!(err.to_string(), "image is required");

        let err = ValidationError::TooLarge {
            field: "image".to_string(),
            max: 16,
        };
        assert_eq!(err.to_string(), "image must be at most 16 bytes");
    }

    #[test]
    fn test_conversions_into_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "sample".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
