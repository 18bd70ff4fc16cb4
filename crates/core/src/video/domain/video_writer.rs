use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_codec::VideoCodec;

/// Abstracts video encoding so the pipeline can write output without
/// depending on a specific codec library.
pub trait VideoWriter: Send {
    /// Opens the sink at `metadata.width × metadata.height`, encoding at
    /// `metadata.fps` with `codec`.
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
        codec: VideoCodec,
    ) -> Result<(), Box<dyn std::error::Error>>;

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Flushes and finalises the output. Safe to call repeatedly.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}
