use crate::shared::frame::Frame;

/// A live capture device delivering frames one at a time.
pub trait CameraSource: Send {
    /// Acquires the device. Fails if it is missing or busy.
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error>>;

    /// Blocks until the next frame is captured.
    fn read(&mut self) -> Result<Frame, Box<dyn std::error::Error>>;

    /// Releases the device. Safe to call repeatedly.
    fn release(&mut self);
}
