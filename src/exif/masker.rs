use super::buffer::{ByteBuffer, range};
use super::error::{MaskError, Result};
use super::tiff::{Ifd, IfdEntry, TiffHeader, format};

/// Inline BYTE placeholder. 0 and 1 are meaningful GPS byte values
/// (e.g. GPSAltitudeRef), 2 is not.
pub const INLINE_BYTE_PLACEHOLDER: u32 = 0x0000_0002;
/// Inline ASCII placeholder: an empty, NUL-terminated string.
pub const INLINE_ASCII_PLACEHOLDER: u32 = 0x0000_0000;
/// Fill byte for indirect BYTE/ASCII values, ASCII `'0'`.
pub const INDIRECT_FILL: u8 = b'0';

/// A single overwrite of existing bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub offset: usize,
    pub bytes: Vec<u8>,
}

/// Work out the bytes that neutralise one GPS entry.
///
/// `Ok(None)` for types that carry no coordinates (left untouched) and for
/// rationals with a zero count.
pub fn plan_entry(buf: &[u8], header: &TiffHeader, entry: &IfdEntry) -> Result<Option<Patch>> {
    let order = header.order;
    match entry.kind {
        format::BYTE | format::ASCII if entry.is_inline() => {
            let placeholder = if entry.kind == format::BYTE {
                INLINE_BYTE_PLACEHOLDER
            } else {
                INLINE_ASCII_PLACEHOLDER
            };
            Ok(Some(Patch {
                offset: entry.value_field(),
                bytes: order.u32_bytes(placeholder).to_vec(),
            }))
        }
        format::BYTE | format::ASCII => {
            let (offset, len) = indirect_range(buf, header, entry)?;
            Ok(Some(Patch {
                offset,
                bytes: vec![INDIRECT_FILL; len],
            }))
        }
        format::RATIONAL | format::SRATIONAL => {
            let (offset, len) = indirect_range(buf, header, entry)?;
            if len == 0 {
                return Ok(None);
            }
            // numerator 0, denominator 1: never divide by zero downstream
            let component = if entry.kind == format::RATIONAL {
                [order.u32_bytes(0), order.u32_bytes(1)].concat()
            } else {
                [order.i32_bytes(0), order.i32_bytes(1)].concat()
            };
            Ok(Some(Patch {
                offset,
                bytes: component.repeat(entry.count as usize),
            }))
        }
        _ => {
            log::debug!(
                "GPS tag 0x{:04x}: type {} left untouched",
                entry.tag,
                entry.kind
            );
            Ok(None)
        }
    }
}

/// Absolute range of an entry's out-of-line value, checked against the buffer.
fn indirect_range(buf: &[u8], header: &TiffHeader, entry: &IfdEntry) -> Result<(usize, usize)> {
    let offset = header.absolute(entry.value_or_offset);
    let len = entry.value_len();
    match (offset, len) {
        (Some(offset), Some(len)) if range(buf, offset, len).is_some() => Ok((offset, len)),
        _ => Err(MaskError::UnsupportedGpsValueLayout {
            tag: entry.tag,
            offset: offset.unwrap_or(usize::MAX),
            len: len.unwrap_or(usize::MAX),
        }),
    }
}

/// Plan patches for every entry of a GPS sub-IFD.
pub fn plan_gps_ifd(buf: &[u8], header: &TiffHeader, ifd: &Ifd) -> Result<Vec<Patch>> {
    let mut patches = Vec::with_capacity(ifd.entries.len());
    for entry in &ifd.entries {
        if let Some(patch) = plan_entry(buf, header, entry)? {
            patches.push(patch);
        }
    }
    Ok(patches)
}

/// Overwrite planned ranges. Patches are bounds-checked during planning, so
/// a failed write here means the buffer changed underneath us.
pub fn apply<B: ByteBuffer + ?Sized>(buf: &mut B, patches: &[Patch]) -> usize {
    let mut written = 0;
    for p in patches {
        if buf.write_at(p.offset, &p.bytes) {
            written += p.bytes.len();
        } else {
            log::warn!("patch at {} ({} bytes) out of range, skipped", p.offset, p.bytes.len());
        }
    }
    written
}
