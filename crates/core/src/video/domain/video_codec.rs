use std::path::Path;

/// Output video codec, chosen from the output file's extension.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VideoCodec {
    #[default]
    Mp4v,
    Xvid,
    Avc1,
    X264,
    Wmv1,
}

/// Encoder family a codec is produced with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoder {
    Mpeg4,
    H264,
    Wmv1,
}

impl VideoCodec {
    /// Maps a file extension (with or without the leading dot, any case)
    /// to its codec. Unknown extensions use `mp4v`.
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "mp4" => VideoCodec::Mp4v,
            "avi" => VideoCodec::Xvid,
            "mov" => VideoCodec::Avc1,
            "mkv" => VideoCodec::X264,
            "wmv" => VideoCodec::Wmv1,
            _ => VideoCodec::Mp4v,
        }
    }

    pub fn for_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(VideoCodec::Mp4v)
    }

    pub fn fourcc(&self) -> &'static str {
        match self {
            VideoCodec::Mp4v => "mp4v",
            VideoCodec::Xvid => "XVID",
            VideoCodec::Avc1 => "avc1",
            VideoCodec::X264 => "X264",
            VideoCodec::Wmv1 => "WMV1",
        }
    }

    pub fn encoder(&self) -> Encoder {
        match self {
            VideoCodec::Mp4v | VideoCodec::Xvid => Encoder::Mpeg4,
            VideoCodec::Avc1 | VideoCodec::X264 => Encoder::H264,
            VideoCodec::Wmv1 => Encoder::Wmv1,
        }
    }

    /// Whether the container must carry the fourcc as an explicit codec tag.
    pub fn needs_codec_tag(&self) -> bool {
        matches!(self, VideoCodec::Xvid)
    }

    /// The fourcc packed little-endian, as stored in container codec tags.
    pub fn fourcc_tag(&self) -> u32 {
        let b = self.fourcc().as_bytes();
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }
}
