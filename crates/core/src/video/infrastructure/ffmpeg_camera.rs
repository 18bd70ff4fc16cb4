use super::ffmpeg_decode::DecodeState;
use crate::shared::frame::Frame;
use crate::video::domain::camera_source::CameraSource;

#[cfg(target_os = "linux")]
const CAPTURE_FORMAT: &str = "v4l2";
#[cfg(target_os = "macos")]
const CAPTURE_FORMAT: &str = "avfoundation";
#[cfg(target_os = "windows")]
const CAPTURE_FORMAT: &str = "dshow";
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const CAPTURE_FORMAT: &str = "";

/// Captures frames from a local camera through libavdevice.
///
/// With no explicit device, the first `/dev/videoN` node is used on Linux
/// and camera index `0` on macOS. DirectShow has no default, so Windows
/// needs a device such as `video=Integrated Camera`.
pub struct FfmpegCamera {
    device: Option<String>,
    state: Option<DecodeState>,
}

// Safety: FfmpegCamera is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegCamera {}

impl FfmpegCamera {
    pub fn new() -> Self {
        Self {
            device: None,
            state: None,
        }
    }

    pub fn with_device(device: impl Into<String>) -> Self {
        Self {
            device: Some(device.into()),
            state: None,
        }
    }

    /// The device that `open` will use, if one can be determined.
    pub fn device(&self) -> Option<String> {
        self.device.clone().or_else(default_device)
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }
}

impl Default for FfmpegCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "linux")]
fn default_device() -> Option<String> {
    (0..16u32)
        .map(|idx| format!("/dev/video{idx}"))
        .find(|path| std::path::Path::new(path).exists())
}

#[cfg(target_os = "macos")]
fn default_device() -> Option<String> {
    Some("0".to_string())
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn default_device() -> Option<String> {
    None
}

impl CameraSource for FfmpegCamera {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.release();
        ffmpeg_next::init()?;
        ffmpeg_next::device::register_all();

        let device = self
            .device()
            .ok_or("No camera device found; pass one explicitly")?;

        let format = ffmpeg_next::device::input::video()
            .find(|f| f.name() == CAPTURE_FORMAT)
            .ok_or_else(|| format!("Capture backend '{CAPTURE_FORMAT}' is not available"))?;

        let mut options = ffmpeg_next::Dictionary::new();
        if CAPTURE_FORMAT == "avfoundation" {
            options.set("framerate", "30");
        }

        let ictx = ffmpeg_next::format::open_with(&device, &format, options)?.input();

        let state = DecodeState::new(ictx)?;
        log::info!(
            "Opened camera {device} ({}x{} via {CAPTURE_FORMAT})",
            state.width(),
            state.height()
        );
        self.state = Some(state);
        Ok(())
    }

    fn read(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
        let state = self.state.as_mut().ok_or("FfmpegCamera: not opened")?;
        state.next_frame().ok_or("Camera stream ended")?
    }

    fn release(&mut self) {
        if self.state.take().is_some() {
            log::debug!("Released camera");
        }
    }
}

impl Drop for FfmpegCamera {
    fn drop(&mut self) {
        self.release();
    }
}
