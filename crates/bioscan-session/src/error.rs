//! # Session Error Types
//!
//! Error types for the session runtime.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Capture      │  │     Core / Runtime      │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  CaptureUnavail.│  │  Core (CoreError)       │ │
//! │  │  ConfigLoad     │  │  CaptureFailed  │  │  ChannelClosed          │ │
//! │  │  ConfigSave     │  │  NotOpen        │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Refusals are NOT here: an ignored action is an `Ack`, not an error.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bioscan_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session runtime error.
#[derive(Debug, Error)]
pub enum SessionError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid scanner configuration.
    #[error("Invalid scanner configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Capture Errors
    // =========================================================================
    /// Camera could not be acquired (missing, busy, permission denied).
    #[error("Camera unavailable: {0}")]
    CaptureUnavailable(String),

    /// A frame could not be grabbed from an open stream.
    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    /// `capture()` on a modal with no live stream.
    #[error("Capture modal is not open")]
    CaptureNotOpen,

    // =========================================================================
    // Core / Runtime Errors
    // =========================================================================
    /// Error from the core crate (validation, serialization).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Event receiver was dropped.
    #[error("Event channel closed")]
    ChannelClosed,
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        SessionError::Core(CoreError::Validation(err))
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SessionError {
    fn from(err: toml::de::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SessionError {
    fn from(err: toml::ser::Error) -> Self {
        SessionError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SessionError {
    /// Returns true if the user can simply try again (or reset).
    ///
    /// ## Recoverable
    /// - Camera busy or missing
    /// - A single failed frame
    /// - Rejected input
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SessionError::CaptureUnavailable(_)
                | SessionError::CaptureFailed(_)
                | SessionError::CaptureNotOpen
                | SessionError::Core(CoreError::Validation(_))
                | SessionError::Core(CoreError::UnknownSample(_))
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidConfig(_)
                | SessionError::ConfigLoadFailed(_)
                | SessionError::ConfigSaveFailed(_)
        )
    }
}
