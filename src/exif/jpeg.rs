// Marker layout references:
// https://www.media.mit.edu/pia/Research/deepview/exif.html
// http://dev.exiv2.org/projects/exiv2/wiki/The_Metadata_in_JPEG_files

use super::buffer::{range, read_u16_be};
use super::error::{MaskError, Result};

/// Start of image.
pub const SOI: u16 = 0xFFD8;
/// Start of scan; entropy-coded data follows, no more metadata markers.
pub const SOS: u16 = 0xFFDA;
/// APP1, conventionally used for Exif (and XMP).
pub const APP1: u16 = 0xFFE1;

pub const EXIF_ID: &[u8; 4] = b"Exif";
/// "Exif\0\0" between the APP1 length field and the TIFF header.
pub const EXIF_HEADER_LEN: usize = 6;

/// One length-prefixed JPEG marker segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSegment {
    pub marker: u16,
    /// Big-endian length field; counts itself but not the marker.
    pub length: u16,
    /// Absolute offset of the 0xFF marker byte.
    pub start: usize,
}

impl MarkerSegment {
    /// Offset of the marker that follows this segment.
    pub fn next_offset(&self) -> usize {
        self.start + 2 + self.length as usize
    }

    /// Offset of the first byte after the length field.
    pub fn payload_offset(&self) -> usize {
        self.start + 4
    }

    /// Absolute offset of the TIFF header inside an Exif APP1 segment.
    pub fn tiff_offset(&self) -> usize {
        self.payload_offset() + EXIF_HEADER_LEN
    }
}

/// Fail with `MalformedJpeg` unless the buffer opens with a start-of-image marker.
pub fn check_soi(buf: &[u8]) -> Result<()> {
    match read_u16_be(buf, 0) {
        Some(SOI) => Ok(()),
        _ => Err(MaskError::MalformedJpeg {
            offset: 0,
            reason: "start of image marker not found",
        }),
    }
}

/// Read the marker segment starting at `offset`.
///
/// Returns `Ok(None)` for start-of-scan, which carries no usable length for
/// our purposes. Every other marker must have a length that keeps the next
/// marker inside the buffer.
pub fn read_segment(buf: &[u8], offset: usize) -> Result<Option<MarkerSegment>> {
    let marker = read_u16_be(buf, offset).ok_or(MaskError::MalformedJpeg {
        offset,
        reason: "truncated marker",
    })?;
    if marker == SOS {
        return Ok(None);
    }

    let length = read_u16_be(buf, offset + 2).ok_or(MaskError::MalformedJpeg {
        offset,
        reason: "truncated segment length",
    })?;
    let seg = MarkerSegment {
        marker,
        length,
        start: offset,
    };
    if seg.next_offset() > buf.len() {
        return Err(MaskError::MalformedJpeg {
            offset,
            reason: "segment length runs past the buffer end",
        });
    }
    Ok(Some(seg))
}

/// `true` if `seg` is an APP1 whose payload starts with `Exif`.
pub fn is_exif(buf: &[u8], seg: &MarkerSegment) -> bool {
    seg.marker == APP1 && range(buf, seg.payload_offset(), EXIF_ID.len()) == Some(&EXIF_ID[..])
}

/// Find the first Exif APP1 segment at or after `from`.
///
/// `Ok(None)` means start-of-scan or the buffer end was reached first.
/// Non-Exif APP1 segments (XMP and friends) are stepped over like any other
/// marker.
pub fn find_exif_segment(buf: &[u8], from: usize) -> Result<Option<MarkerSegment>> {
    let mut offset = from;
    while offset < buf.len() {
        let seg = match read_segment(buf, offset)? {
            Some(seg) => seg,
            None => return Ok(None),
        };
        if is_exif(buf, &seg) {
            return Ok(Some(seg));
        }
        offset = seg.next_offset();
    }
    Ok(None)
}

/// All Exif APP1 segments before start-of-scan, in file order.
pub fn exif_segments(buf: &[u8]) -> Result<Vec<MarkerSegment>> {
    check_soi(buf)?;

    let mut segments = Vec::new();
    let mut offset = 2;
    while let Some(seg) = find_exif_segment(buf, offset)? {
        log::debug!("Exif APP1 segment at offset {} ({} bytes)", seg.start, seg.length);
        offset = seg.next_offset();
        segments.push(seg);
    }
    Ok(segments)
}
