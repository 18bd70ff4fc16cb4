use std::borrow::Cow;

use ndarray::ArrayView3;

/// Channel ordering of a frame's pixel bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb,
    Bgr,
}

/// A single video/image frame: contiguous 3-channel bytes in row-major order.
///
/// Readers in this crate decode to RGB. Sources that hand over BGR data tag
/// the frame accordingly, and consumers that care about ordering (the face
/// detector) normalise via [`Frame::to_rgb`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
    pixel_format: PixelFormat,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
            pixel_format: PixelFormat::Rgb,
        }
    }

    pub fn with_pixel_format(mut self, pixel_format: PixelFormat) -> Self {
        self.pixel_format = pixel_format;
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// Returns this frame in RGB ordering, borrowing when no swap is needed.
    pub fn to_rgb(&self) -> Cow<'_, Frame> {
        match self.pixel_format {
            PixelFormat::Rgb => Cow::Borrowed(self),
            PixelFormat::Bgr => {
                let mut swapped = self.clone();
                let channels = self.channels as usize;
                if channels >= 3 {
                    for px in swapped.data.chunks_exact_mut(channels) {
                        px.swap(0, 2);
                    }
                }
                swapped.pixel_format = PixelFormat::Rgb;
                Cow::Owned(swapped)
            }
        }
    }

    /// Returns the top-left `width × height` window of this frame.
    ///
    /// Requested dimensions larger than the frame are clamped.
    pub fn cropped(&self, width: u32, height: u32) -> Frame {
        let w = width.min(self.width) as usize;
        let h = height.min(self.height) as usize;
        if w == self.width as usize && h == self.height as usize {
            return self.clone();
        }

        let channels = self.channels as usize;
        let src_row = self.width as usize * channels;
        let dst_row = w * channels;
        let mut data = Vec::with_capacity(dst_row * h);
        for row in 0..h {
            let start = row * src_row;
            data.extend_from_slice(&self.data[start..start + dst_row]);
        }

        Frame::new(data, w as u32, h as u32, self.channels, self.index)
            .with_pixel_format(self.pixel_format)
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
