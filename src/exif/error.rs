use thiserror::Error;

/// Reasons the GPS masker left a buffer untouched.
///
/// None of these are surfaced to callers as failures: the boundary in
/// [`mask_gps_in_place`](super::mask_gps_in_place) turns every variant into
/// an `Unchanged` outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaskError {
    #[error("media type {0:?} is not JPEG")]
    NotJpeg(String),

    #[error("malformed JPEG at offset {offset}: {reason}")]
    MalformedJpeg { offset: usize, reason: &'static str },

    #[error("no Exif APP1 segment before start of scan")]
    NoExifSegment,

    #[error("malformed TIFF header at offset {offset}")]
    MalformedTiff { offset: usize },

    #[error("IFD at offset {offset} with {count} entries runs past the buffer end")]
    TruncatedIfd { offset: usize, count: u16 },

    #[error("IFD0 has no GPS-Info tag")]
    GpsInfoNotFound,

    #[error("GPS sub-IFD at offset {offset} has no entries")]
    EmptyGpsIfd { offset: usize },

    #[error("GPS tag 0x{tag:04x} value ({len} bytes at offset {offset}) runs past the buffer end")]
    UnsupportedGpsValueLayout { tag: u16, offset: usize, len: usize },
}

impl MaskError {
    /// `true` for outcomes that describe an ordinary file rather than a damaged one.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            MaskError::NotJpeg(_)
                | MaskError::NoExifSegment
                | MaskError::GpsInfoNotFound
                | MaskError::EmptyGpsIfd { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MaskError>;
