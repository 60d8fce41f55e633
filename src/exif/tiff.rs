//! TIFF header and IFD navigation inside an Exif APP1 segment.
//!
//! Every offset stored in the TIFF block is relative to the TIFF header; the
//! functions here take and return absolute buffer offsets so that the masker
//! can write without further translation.

use super::buffer::{Endian, read_u16_be};
use super::error::{MaskError, Result};

pub const BYTE_ORDER_BIG: u16 = 0x4D4D;
pub const BYTE_ORDER_LITTLE: u16 = 0x4949;

/// Tag in IFD0 whose value is the offset of the GPS sub-IFD.
pub const TAG_GPS_INFO: u16 = 0x8825;

pub const IFD_ENTRY_LEN: usize = 12;
const TIFF_HEADER_LEN: usize = 8;

/// TIFF data types that matter for GPS masking.
pub mod format {
    pub const BYTE: u16 = 1;
    pub const ASCII: u16 = 2;
    pub const SHORT: u16 = 3;
    pub const LONG: u16 = 4;
    pub const RATIONAL: u16 = 5;
    pub const SRATIONAL: u16 = 10;

    /// Bytes per component, `None` for unknown types.
    pub fn component_size(kind: u16) -> Option<usize> {
        match kind {
            1 | 2 | 6 | 7 => Some(1),
            3 | 8 => Some(2),
            4 | 9 | 11 => Some(4),
            5 | 10 | 12 => Some(8),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    pub order: Endian,
    /// Absolute offset of the `MM`/`II` bytes; base for all TIFF offsets.
    pub start: usize,
    pub ifd0_offset: u32,
}

impl TiffHeader {
    /// Translate a TIFF-relative offset to an absolute buffer offset.
    pub fn absolute(&self, offset: u32) -> Option<usize> {
        self.start.checked_add(offset as usize)
    }
}

/// A 12-byte IFD record: `TTFFCCCCVVVV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfdEntry {
    /// Absolute offset of the record itself.
    pub offset: usize,
    pub tag: u16,
    pub kind: u16,
    pub count: u32,
    pub value_or_offset: u32,
}

impl IfdEntry {
    /// Absolute offset of the 4-byte value field.
    pub fn value_field(&self) -> usize {
        self.offset + 8
    }

    /// Total value size in bytes, `None` for unknown types or overflow.
    pub fn value_len(&self) -> Option<usize> {
        format::component_size(self.kind)?.checked_mul(self.count as usize)
    }

    pub fn is_inline(&self) -> bool {
        matches!(self.value_len(), Some(n) if n <= 4)
    }
}

/// A directory: its absolute position and its entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ifd {
    pub offset: usize,
    pub entries: Vec<IfdEntry>,
}

/// Parse the TIFF header at absolute offset `start`.
/// Returns the header and the absolute offset of IFD0.
pub fn read_header(buf: &[u8], start: usize) -> Result<(TiffHeader, usize)> {
    let malformed = MaskError::MalformedTiff { offset: start };

    let order = match read_u16_be(buf, start) {
        Some(BYTE_ORDER_BIG) => Endian::Big,
        Some(BYTE_ORDER_LITTLE) => Endian::Little,
        _ => return Err(malformed),
    };
    // version constant (42) at start + 2 is skipped, only its presence matters
    if start.checked_add(TIFF_HEADER_LEN).is_none_or(|end| end > buf.len()) {
        return Err(malformed);
    }
    let ifd0_offset = order.read_u32(buf, start + 4).ok_or(malformed.clone())?;

    let header = TiffHeader {
        order,
        start,
        ifd0_offset,
    };
    let ifd0 = header.absolute(ifd0_offset).ok_or(malformed)?;
    log::debug!("TIFF header at {start}: {order}, IFD0 at {ifd0}");
    Ok((header, ifd0))
}

/// Parse the IFD at absolute `offset`.
/// Returns the directory and the offset just past its last entry.
pub fn read_ifd(buf: &[u8], header: &TiffHeader, offset: usize) -> Result<(Ifd, usize)> {
    let order = header.order;
    let count = order
        .read_u16(buf, offset)
        .ok_or(MaskError::TruncatedIfd { offset, count: 0 })?;
    let truncated = MaskError::TruncatedIfd { offset, count };

    let first = offset + 2;
    let end = (count as usize)
        .checked_mul(IFD_ENTRY_LEN)
        .and_then(|n| first.checked_add(n))
        .filter(|&end| end <= buf.len())
        .ok_or(truncated.clone())?;

    let entries = (0..count as usize)
        .map(|i| {
            let at = first + i * IFD_ENTRY_LEN;
            read_entry(buf, order, at).ok_or(truncated.clone())
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((Ifd { offset, entries }, end))
}

fn read_entry(buf: &[u8], order: Endian, at: usize) -> Option<IfdEntry> {
    Some(IfdEntry {
        offset: at,
        tag: order.read_u16(buf, at)?,
        kind: order.read_u16(buf, at + 2)?,
        count: order.read_u32(buf, at + 4)?,
        value_or_offset: order.read_u32(buf, at + 8)?,
    })
}

/// Locate every GPS sub-IFD referenced from IFD0 of the TIFF block at `tiff_start`.
///
/// The GPS-Info value is always an offset, never inline data. All IFD0
/// entries are inspected; a directory without the tag yields an empty list.
pub fn find_gps_ifds(buf: &[u8], tiff_start: usize) -> Result<(TiffHeader, Vec<Ifd>)> {
    let (header, ifd0_at) = read_header(buf, tiff_start)?;
    let (ifd0, _) = read_ifd(buf, &header, ifd0_at)?;

    let mut gps = Vec::new();
    for entry in ifd0.entries.iter().filter(|e| e.tag == TAG_GPS_INFO) {
        let at = header
            .absolute(entry.value_or_offset)
            .ok_or(MaskError::TruncatedIfd {
                offset: entry.offset,
                count: 0,
            })?;
        let (ifd, _) = read_ifd(buf, &header, at)?;
        log::debug!("GPS sub-IFD at {at} with {} entries", ifd.entries.len());
        gps.push(ifd);
    }
    Ok((header, gps))
}
