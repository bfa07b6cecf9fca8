//! # Session Events
//!
//! Everything the display layer hears from a running session.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ScanController ──► SessionEventEmitter                                │
//! │                     ├── emit_status  "Calibrating sensor array..."     │
//! │                     ├── emit_view    phase + button flags              │
//! │                     ├── emit_result  completed ScanResult              │
//! │                     └── emit_error   camera unavailable, etc.          │
//! │                                                                         │
//! │  Implementations:                                                       │
//! │  • NoOpEmitter     - tests, headless use                               │
//! │  • TracingEmitter  - log lines only                                    │
//! │  • ChannelEmitter  - SessionEvent stream for a UI task                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use bioscan_core::{ScanResult, SessionView};

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Trait for emitting session events to the display layer.
///
/// Called from timer tasks; implementations must not block.
pub trait SessionEventEmitter: Send + Sync {
    /// The status label changed. `None` clears it.
    fn emit_status(&self, label: Option<&str>);

    /// The session changed phase or flags.
    fn emit_view(&self, view: &SessionView);

    /// A scan finished.
    fn emit_result(&self, result: &ScanResult);

    /// Something the user should be told about.
    fn emit_error(&self, message: &str, recoverable: bool);
}

/// No-op event emitter for testing.
pub struct NoOpEmitter;

impl SessionEventEmitter for NoOpEmitter {
    fn emit_status(&self, _label: Option<&str>) {}
    fn emit_view(&self, _view: &SessionView) {}
    fn emit_result(&self, _result: &ScanResult) {}
    fn emit_error(&self, _message: &str, _recoverable: bool) {}
}

/// Emitter that only logs.
pub struct TracingEmitter;

impl SessionEventEmitter for TracingEmitter {
    fn emit_status(&self, label: Option<&str>) {
        if let Some(label) = label {
            info!(status = label, "Scanner status");
        }
    }

    fn emit_view(&self, view: &SessionView) {
        debug!(phase = ?view.phase, mode = %view.mode, "Session view changed");
    }

    fn emit_result(&self, result: &ScanResult) {
        info!(
            id = %result.id,
            sample = %result.sample_tag,
            verdict = ?result.overall,
            confidence = result.confidence,
            "Scan complete"
        );
    }

    fn emit_error(&self, message: &str, recoverable: bool) {
        warn!(recoverable, "{}", message);
    }
}

// =============================================================================
// Channel Emitter
// =============================================================================

/// One display-layer event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum SessionEvent {
    Status(Option<String>),
    View(SessionView),
    Result(ScanResult),
    Error { message: String, recoverable: bool },
}

/// Emitter that forwards every event into a tokio channel.
#[derive(Clone)]
pub struct ChannelEmitter {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelEmitter {
    /// Creates the emitter and the receiving end for the UI task.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelEmitter { tx }, rx)
    }

    fn send(&self, event: SessionEvent) {
        if self.tx.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    }
}

impl SessionEventEmitter for ChannelEmitter {
    fn emit_status(&self, label: Option<&str>) {
        self.send(SessionEvent::Status(label.map(str::to_string)));
    }

    fn emit_view(&self, view: &SessionView) {
        self.send(SessionEvent::View(view.clone()));
    }

    fn emit_result(&self, result: &ScanResult) {
        self.send(SessionEvent::Result(result.clone()));
    }

    fn emit_error(&self, message: &str, recoverable: bool) {
        self.send(SessionEvent::Error {
            message: message.to_string(),
            recoverable,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bioscan_core::SessionState;

    #[test]
    fn test_channel_emitter_forwards_in_order() {
        let (emitter, mut rx) = ChannelEmitter::new();
        let view = SessionState::default().view();

        emitter.emit_status(Some("Calibrating sensor array..."));
        emitter.emit_view(&view);
        emitter.emit_status(None);

        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Status(Some("Calibrating sensor array...".into()))
        );
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::View(view));
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Status(None));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (emitter, rx) = ChannelEmitter::new();
        drop(rx);
        emitter.emit_error("Camera unavailable", true);
    }

    #[test]
    fn test_event_json_shape() {
        let event = SessionEvent::Error {
            message: "Camera unavailable".into(),
            recoverable: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "error");
        assert_eq!(json["data"]["recoverable"], true);
    }
}
