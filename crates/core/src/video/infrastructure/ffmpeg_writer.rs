use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_codec::{Encoder, VideoCodec};
use crate::video::domain::video_writer::VideoWriter;

/// Encodes RGB frames to a video file via ffmpeg-next.
///
/// The encoder follows the requested [`VideoCodec`]: `mp4v`/`XVID` use the
/// MPEG-4 Part 2 encoder, `avc1`/`X264` use H.264 when the linked ffmpeg
/// provides one (MPEG-4 otherwise), and `WMV1` uses the native WMV encoder.
/// Only the video stream is written.
pub struct FfmpegWriter {
    output_path: Option<PathBuf>,
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    width: u32,
    height: u32,
    fps: i32,
    frame_count: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self {
            output_path: None,
            octx: None,
            encoder: None,
            scaler: None,
            width: 0,
            height: 0,
            fps: 0,
            frame_count: 0,
        }
    }

    /// Number of frames accepted since the last `open`.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Flushes the encoder and writes the container trailer.
    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.send_eof()?;
        }
        self.drain_packets()?;
        if let Some(octx) = self.octx.as_mut() {
            octx.write_trailer()?;
        }
        Ok(())
    }

    fn drain_packets(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(encoder), Some(octx)) = (self.encoder.as_mut(), self.octx.as_mut()) else {
            return Ok(());
        };
        let ost_time_base = octx
            .stream(0)
            .ok_or("FfmpegWriter: output stream missing")?
            .time_base();

        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            encoded.rescale_ts(ffmpeg_next::Rational(1, self.fps), ost_time_base);
            encoded.write_interleaved(octx)?;
        }
        Ok(())
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Picks the ffmpeg encoder for `codec`, plus the container tag to force.
fn find_encoder(codec: VideoCodec) -> Result<(ffmpeg_next::Codec, Option<u32>), Box<dyn std::error::Error>> {
    use ffmpeg_next::codec::Id;

    let mpeg4 = || ffmpeg_next::encoder::find(Id::MPEG4).ok_or("MPEG4 encoder not found");
    let tag = codec.needs_codec_tag().then(|| codec.fourcc_tag());

    match codec.encoder() {
        Encoder::Mpeg4 => Ok((mpeg4()?, tag)),
        Encoder::H264 => match ffmpeg_next::encoder::find(Id::H264) {
            Some(h264) => Ok((h264, tag)),
            None => {
                log::warn!(
                    "No H.264 encoder available for {}, falling back to MPEG-4",
                    codec.fourcc()
                );
                Ok((mpeg4()?, None))
            }
        },
        Encoder::Wmv1 => {
            let wmv = ffmpeg_next::encoder::find(Id::WMV1).ok_or("WMV1 encoder not found")?;
            Ok((wmv, tag))
        }
    }
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
        codec: VideoCodec,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        self.close()?;

        if metadata.width == 0 || metadata.height == 0 {
            return Err(format!(
                "cannot encode a {}x{} video",
                metadata.width, metadata.height
            )
            .into());
        }

        let fps = metadata.effective_fps().round() as i32;
        let fps = fps.max(1);

        let mut octx = ffmpeg_next::format::output(path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let (encoder_codec, codec_tag) = find_encoder(codec)?;
        let mut ost = octx.add_stream(Some(encoder_codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(encoder_codec)
            .encoder()
            .video()?;

        encoder_ctx.set_width(metadata.width);
        encoder_ctx.set_height(metadata.height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }
        if let Some(tag) = codec_tag {
            unsafe {
                (*encoder_ctx.as_mut_ptr()).codec_tag = tag;
            }
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);

        octx.write_header()?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::YUV420P,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::debug!(
            "Writing {} ({}x{} @ {} fps, {})",
            path.display(),
            metadata.width,
            metadata.height,
            fps,
            codec.fourcc()
        );

        self.output_path = Some(path.to_path_buf());
        self.width = metadata.width;
        self.height = metadata.height;
        self.fps = fps;
        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.frame_count = 0;

        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if self.encoder.is_none() {
            return Err("FfmpegWriter: not opened".into());
        }
        if frame.width() != self.width || frame.height() != self.height || frame.channels() != 3 {
            return Err(format!(
                "frame is {}x{}x{}, writer expects {}x{}x3",
                frame.width(),
                frame.height(),
                frame.channels(),
                self.width,
                self.height
            )
            .into());
        }

        let rgb = frame.to_rgb();
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            self.width,
            self.height,
        );

        let row_bytes = self.width as usize * 3;
        let stride = rgb_frame.stride(0);
        let data = rgb_frame.data_mut(0);
        for (row, src_row) in rgb.data().chunks_exact(row_bytes).enumerate() {
            let dst_start = row * stride;
            data[dst_start..dst_start + row_bytes].copy_from_slice(src_row);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(&rgb_frame, &mut yuv_frame)?;
        }
        yuv_frame.set_pts(Some(self.frame_count as i64));

        if let Some(encoder) = self.encoder.as_mut() {
            encoder.send_frame(&yuv_frame)?;
        }
        self.drain_packets()?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut result = Ok(());

        if self.encoder.is_some() {
            result = self.finish();
            if let Some(path) = self.output_path.as_ref() {
                log::debug!("Closed {} after {} frames", path.display(), self.frame_count);
            }
        }

        self.octx = None;
        self.encoder = None;
        self.scaler = None;
        self.output_path = None;

        result
    }
}

impl Drop for FfmpegWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Failed to finalise video output: {e}");
        }
    }
}
