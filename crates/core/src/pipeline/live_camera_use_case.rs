use crate::pipeline::frame_redaction::FrameRedaction;
use crate::shared::error::RedactError;
use crate::shared::frame::Frame;
use crate::video::domain::camera_source::CameraSource;

/// Live pipeline: capture → redact → hand back for display.
///
/// The display loop belongs to the caller, which pulls frames with
/// [`next_frame`](Self::next_frame) until it gets `None` or the user quits.
pub struct LiveCameraUseCase {
    camera: Box<dyn CameraSource>,
    redaction: FrameRedaction,
    running: bool,
    frames_shown: usize,
}

impl LiveCameraUseCase {
    pub fn new(camera: Box<dyn CameraSource>, redaction: FrameRedaction) -> Self {
        Self {
            camera,
            redaction,
            running: false,
            frames_shown: 0,
        }
    }

    /// Opens the camera. An unavailable camera is logged and reported as
    /// `Ok(false)`.
    pub fn start(&mut self) -> Result<bool, RedactError> {
        match self.camera.open() {
            Ok(()) => {
                self.running = true;
                self.frames_shown = 0;
                Ok(true)
            }
            Err(e) => {
                log::error!("Could not open camera: {e}");
                self.running = false;
                Ok(false)
            }
        }
    }

    /// Captures and redacts one frame.
    ///
    /// Returns `Ok(None)` once the session is over; a capture failure ends
    /// the session and releases the camera.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, RedactError> {
        if !self.running {
            return Ok(None);
        }

        let mut frame = match self.camera.read() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Camera read failed, ending session: {e}");
                self.stop();
                return Ok(None);
            }
        };

        self.redaction.apply(&mut frame)?;
        self.frames_shown += 1;
        Ok(Some(frame))
    }

    /// Releases the camera. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Camera session ended after {} frame(s)", self.frames_shown);
        }
        self.running = false;
        self.camera.release();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames_shown(&self) -> usize {
        self.frames_shown
    }
}

impl Drop for LiveCameraUseCase {
    fn drop(&mut self) {
        self.stop();
    }
}
