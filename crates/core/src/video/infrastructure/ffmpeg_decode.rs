use crate::shared::frame::{Frame, PixelFormat};

/// An opened ffmpeg input with its best video stream's decoder and a
/// packed 24-bit scaler, shared by the file, image and camera readers.
///
/// Sources that decode to BGR24 keep that ordering and yield
/// [`PixelFormat::Bgr`] frames; everything else is converted to RGB24.
pub struct DecodeState {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    pixel_format: PixelFormat,
    video_stream_index: usize,
    width: u32,
    height: u32,
    fps: f64,
    total_frames: usize,
    codec_name: String,
    frame_index: usize,
    flushing: bool,
    done: bool,
}

impl DecodeState {
    pub fn new(ictx: ffmpeg_next::format::context::Input) -> Result<Self, Box<dyn std::error::Error>> {
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let video_stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };
        let total_frames = stream.frames().max(0) as usize;

        let width = decoder.width();
        let height = decoder.height();
        if width == 0 || height == 0 {
            return Err("Video stream has no dimensions".into());
        }

        let (target, pixel_format) = packed_target(decoder.format());
        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            target,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let codec_name = decoder
            .codec()
            .map(|c| c.name().to_string())
            .unwrap_or_default();

        Ok(Self {
            ictx,
            decoder,
            scaler,
            pixel_format,
            video_stream_index,
            width,
            height,
            fps,
            total_frames,
            codec_name,
            frame_index: 0,
            flushing: false,
            done: false,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub fn codec_name(&self) -> &str {
        &self.codec_name
    }

    /// Decodes the next frame, or `None` once the input is exhausted.
    pub fn next_frame(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        if self.done {
            return None;
        }

        if let Some(result) = self.try_receive() {
            return Some(result);
        }

        if self.flushing {
            self.done = true;
            return None;
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                let _ = self.decoder.send_eof();
                self.flushing = true;
                if let Some(result) = self.try_receive() {
                    return Some(result);
                }
                self.done = true;
                return None;
            };

            if stream.index() != self.video_stream_index {
                continue;
            }

            if let Err(e) = self.decoder.send_packet(&packet) {
                log::debug!("Skipping undecodable packet: {e}");
                continue;
            }

            if let Some(result) = self.try_receive() {
                return Some(result);
            }
        }
    }

    fn try_receive(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return None;
        }

        let mut packed = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = self.scaler.run(&decoded, &mut packed) {
            return Some(Err(Box::new(e)));
        }

        let pixels = extract_packed_pixels(&packed, self.width, self.height);
        let frame = Frame::new(pixels, self.width, self.height, 3, self.frame_index)
            .with_pixel_format(self.pixel_format);
        self.frame_index += 1;
        Some(Ok(frame))
    }
}

/// Output layout for a decoder format: BGR24 passes through, anything else
/// becomes RGB24.
fn packed_target(source: ffmpeg_next::format::Pixel) -> (ffmpeg_next::format::Pixel, PixelFormat) {
    match source {
        ffmpeg_next::format::Pixel::BGR24 => (ffmpeg_next::format::Pixel::BGR24, PixelFormat::Bgr),
        _ => (ffmpeg_next::format::Pixel::RGB24, PixelFormat::Rgb),
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous 3-channel buffer.
///
/// ffmpeg frames may have padding bytes at the end of each row (stride > width*3).
/// This strips that padding to produce a tightly-packed pixel buffer.
fn extract_packed_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}

/// Iterator adapter over a borrowed [`DecodeState`].
pub struct DecodeIter<'a> {
    state: &'a mut DecodeState,
}

impl<'a> DecodeIter<'a> {
    pub fn new(state: &'a mut DecodeState) -> Self {
        Self { state }
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = Result<Frame, Box<dyn std::error::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.state.next_frame()
    }
}
