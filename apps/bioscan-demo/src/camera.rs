//! Simulated camera for the demo.

use bioscan_session::{CaptureDevice, CaptureStream, SessionError, SessionResult};
use tracing::debug;

/// JPEG start-of-image marker; enough for a plausible frame.
const SOI: [u8; 2] = [0xFF, 0xD8];

/// A camera that works, never works, or drops its first few frames.
pub struct SimulatedCamera {
    name: String,
    frame_len: usize,
    available: bool,
    dropped_frames: u32,
}

impl SimulatedCamera {
    pub fn new(name: impl Into<String>) -> Self {
        SimulatedCamera {
            name: name.into(),
            frame_len: 4096,
            available: true,
            dropped_frames: 0,
        }
    }

    /// A camera whose acquisition always fails (permission denied).
    pub fn unavailable(name: impl Into<String>) -> Self {
        SimulatedCamera {
            available: false,
            ..Self::new(name)
        }
    }

    /// Each stream fails its first `count` grabs.
    pub fn with_dropped_frames(mut self, count: u32) -> Self {
        self.dropped_frames = count;
        self
    }
}

impl CaptureDevice for SimulatedCamera {
    fn name(&self) -> &str {
        &self.name
    }

    fn acquire(&self) -> SessionResult<Box<dyn CaptureStream>> {
        if !self.available {
            return Err(SessionError::CaptureUnavailable(format!(
                "{}: permission denied",
                self.name
            )));
        }

        Ok(Box::new(SimulatedStream {
            frame_len: self.frame_len,
            frames: 0,
            dropped: self.dropped_frames,
        }))
    }
}

struct SimulatedStream {
    frame_len: usize,
    frames: u32,
    dropped: u32,
}

impl CaptureStream for SimulatedStream {
    fn grab_frame(&mut self) -> SessionResult<Vec<u8>> {
        self.frames += 1;
        if self.frames <= self.dropped {
            return Err(SessionError::CaptureFailed(format!(
                "frame {} dropped",
                self.frames
            )));
        }

        let mut frame = Vec::with_capacity(self.frame_len);
        frame.extend_from_slice(&SOI);
        frame.extend((0..self.frame_len.saturating_sub(SOI.len())).map(|i| (i % 251) as u8));
        Ok(frame)
    }

    fn stop(&mut self) {
        debug!(frames = self.frames, "Simulated camera stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bioscan_session::{CaptureModal, NoOpEmitter};
    use std::sync::Arc;

    #[test]
    fn test_capture_produces_jpeg_like_frame() {
        let mut modal = CaptureModal::new(
            Arc::new(SimulatedCamera::new("Front camera")),
            Arc::new(NoOpEmitter),
        );

        modal.open().unwrap();
        let sample = modal.capture().unwrap();
        assert_eq!(sample.kind(), "captured");
        assert!(!modal.is_open());
    }

    #[test]
    fn test_dropped_frame_keeps_camera_open() {
        let mut modal = CaptureModal::new(
            Arc::new(SimulatedCamera::new("Front camera").with_dropped_frames(1)),
            Arc::new(NoOpEmitter),
        );

        modal.open().unwrap();
        assert!(matches!(
            modal.capture(),
            Err(SessionError::CaptureFailed(_))
        ));
        assert!(modal.is_open());

        assert_eq!(modal.capture().unwrap().kind(), "captured");
        assert!(!modal.is_open());
    }

    #[test]
    fn test_unavailable_camera() {
        let camera = SimulatedCamera::unavailable("Front camera");
        assert!(matches!(
            camera.acquire(),
            Err(SessionError::CaptureUnavailable(_))
        ));
    }
}
