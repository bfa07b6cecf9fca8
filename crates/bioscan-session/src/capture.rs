//! # Camera Capture
//!
//! Acquire, grab one frame, release. The release is tied to a lease value so
//! it happens exactly once, whichever way the capture dialog ends.
//!
//! ## Lease Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      CaptureModal                                       │
//! │                                                                         │
//! │  open() ──► device.acquire() ──┬── Ok  ──► CaptureLease held           │
//! │                                └── Err ──► emit_error, no lease        │
//! │                                                                         │
//! │  capture() ──► grab_frame ──► release ──► SampleReference::Captured    │
//! │  close()   ──► release                                                 │
//! │  cancel()  ──► release                                                 │
//! │  drop      ──► release (CaptureLease::drop)                            │
//! │                                                                         │
//! │  stream.stop() runs once per successful acquire, never twice.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use tracing::{debug, info, warn};

use bioscan_core::SampleReference;

use crate::error::{SessionError, SessionResult};
use crate::events::SessionEventEmitter;

// =============================================================================
// Device Traits
// =============================================================================

/// A camera that can hand out a live stream.
pub trait CaptureDevice: Send + Sync {
    /// Name for logs.
    fn name(&self) -> &str;

    /// Acquires the device. Fails when it is missing, busy or denied.
    fn acquire(&self) -> SessionResult<Box<dyn CaptureStream>>;
}

/// A live camera stream.
pub trait CaptureStream: Send {
    /// Returns one still image, encoded.
    fn grab_frame(&mut self) -> SessionResult<Vec<u8>>;

    /// Releases the hardware.
    fn stop(&mut self);
}

// =============================================================================
// Capture Lease
// =============================================================================

/// Owns an acquired stream and stops it exactly once.
pub struct CaptureLease {
    stream: Option<Box<dyn CaptureStream>>,
}

impl CaptureLease {
    pub fn new(stream: Box<dyn CaptureStream>) -> Self {
        CaptureLease {
            stream: Some(stream),
        }
    }

    pub fn grab_frame(&mut self) -> SessionResult<Vec<u8>> {
        match self.stream.as_mut() {
            Some(stream) => stream.grab_frame(),
            None => Err(SessionError::CaptureNotOpen),
        }
    }

    /// Stops the stream now instead of at drop.
    pub fn release(mut self) {
        self.stop_stream();
    }

    fn stop_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
    }
}

impl Drop for CaptureLease {
    fn drop(&mut self) {
        self.stop_stream();
    }
}

// =============================================================================
// Capture Modal
// =============================================================================

/// The "take a photo" dialog.
pub struct CaptureModal {
    device: Arc<dyn CaptureDevice>,
    emitter: Arc<dyn SessionEventEmitter>,
    lease: Option<CaptureLease>,
}

impl CaptureModal {
    pub fn new(device: Arc<dyn CaptureDevice>, emitter: Arc<dyn SessionEventEmitter>) -> Self {
        CaptureModal {
            device,
            emitter,
            lease: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.lease.is_some()
    }

    /// Acquires the camera. Opening an open modal does nothing.
    ///
    /// Failure is reported through the emitter and returned; the modal
    /// stays closed and the session is unaffected.
    pub fn open(&mut self) -> SessionResult<()> {
        if self.lease.is_some() {
            return Ok(());
        }

        match self.device.acquire() {
            Ok(stream) => {
                info!(device = self.device.name(), "Camera acquired");
                self.lease = Some(CaptureLease::new(stream));
                Ok(())
            }
            Err(e) => {
                warn!(device = self.device.name(), error = %e, "Camera acquisition failed");
                self.emitter
                    .emit_error("Unable to access camera. Please check permissions.", true);
                Err(e)
            }
        }
    }

    /// Grabs a still and closes the modal.
    ///
    /// A failed grab keeps the camera open so the user can retry.
    pub fn capture(&mut self) -> SessionResult<SampleReference> {
        let lease = self.lease.as_mut().ok_or(SessionError::CaptureNotOpen)?;

        let frame = match lease.grab_frame() {
            Ok(frame) => frame,
            Err(e) => {
                self.emitter.emit_error(&e.to_string(), e.is_recoverable());
                return Err(e);
            }
        };

        self.close();
        Ok(SampleReference::captured_bytes(frame)?)
    }

    /// Closes the modal, releasing the camera.
    pub fn close(&mut self) {
        if let Some(lease) = self.lease.take() {
            lease.release();
            debug!(device = self.device.name(), "Camera released");
        }
    }

    /// Dismissed without a capture.
    pub fn cancel(&mut self) {
        if self.lease.is_some() {
            debug!(device = self.device.name(), "Capture cancelled");
        }
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ChannelEmitter, NoOpEmitter, SessionEvent};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counters {
        acquired: AtomicUsize,
        stopped: AtomicUsize,
    }

    struct MockCamera {
        counters: Arc<Counters>,
        busy: AtomicBool,
        frame: Vec<u8>,
    }

    impl MockCamera {
        fn new(frame: &[u8]) -> (Arc<Self>, Arc<Counters>) {
            let counters = Arc::new(Counters::default());
            let camera = Arc::new(MockCamera {
                counters: counters.clone(),
                busy: AtomicBool::new(false),
                frame: frame.to_vec(),
            });
            (camera, counters)
        }
    }

    struct MockStream {
        counters: Arc<Counters>,
        frame: Vec<u8>,
    }

    impl CaptureDevice for MockCamera {
        fn name(&self) -> &str {
            "mock"
        }

        fn acquire(&self) -> SessionResult<Box<dyn CaptureStream>> {
            if self.busy.load(Ordering::SeqCst) {
                return Err(SessionError::CaptureUnavailable("device busy".into()));
            }
            self.counters.acquired.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(MockStream {
                counters: self.counters.clone(),
                frame: self.frame.clone(),
            }))
        }
    }

    impl CaptureStream for MockStream {
        fn grab_frame(&mut self) -> SessionResult<Vec<u8>> {
            Ok(self.frame.clone())
        }

        fn stop(&mut self) {
            self.counters.stopped.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn modal(camera: Arc<MockCamera>) -> CaptureModal {
        CaptureModal::new(camera, Arc::new(NoOpEmitter))
    }

    #[test]
    fn test_open_then_close_releases_once() {
        let (camera, counters) = MockCamera::new(b"jpeg");
        let mut modal = modal(camera);

        modal.open().unwrap();
        modal.open().unwrap();
        assert!(modal.is_open());
        modal.close();
        modal.close();

        assert_eq!(counters.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_capture_releases_and_returns_sample() {
        let (camera, counters) = MockCamera::new(b"jpeg");
        let mut modal = modal(camera);

        modal.open().unwrap();
        let sample = modal.capture().unwrap();

        assert_eq!(sample.kind(), "captured");
        assert!(!modal.is_open());
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_and_drop_release() {
        let (camera, counters) = MockCamera::new(b"jpeg");

        let mut first = modal(camera.clone());
        first.open().unwrap();
        first.cancel();

        let mut second = modal(camera);
        second.open().unwrap();
        drop(second);

        assert_eq!(counters.acquired.load(Ordering::SeqCst), 2);
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_busy_camera_reports_error() {
        let (camera, counters) = MockCamera::new(b"jpeg");
        camera.busy.store(true, Ordering::SeqCst);
        let (emitter, mut rx) = ChannelEmitter::new();
        let mut modal = CaptureModal::new(camera, Arc::new(emitter));

        let err = modal.open().unwrap_err();
        assert!(matches!(err, SessionError::CaptureUnavailable(_)));
        assert!(!modal.is_open());
        assert!(matches!(
            rx.try_recv().unwrap(),
            SessionEvent::Error {
                recoverable: true,
                ..
            }
        ));

        modal.close();
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_capture_requires_open() {
        let (camera, _) = MockCamera::new(b"jpeg");
        let mut modal = modal(camera);
        assert!(matches!(modal.capture(), Err(SessionError::CaptureNotOpen)));
    }

    #[test]
    fn test_empty_frame_is_rejected_but_released() {
        let (camera, counters) = MockCamera::new(b"");
        let mut modal = modal(camera);

        modal.open().unwrap();
        assert!(modal.capture().is_err());
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 1);
    }
}
