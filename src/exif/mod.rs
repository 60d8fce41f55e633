//! GPS redaction for JPEG Exif metadata.
//!
//! The masker walks JPEG marker segments to each Exif APP1 block, follows
//! IFD0's GPS-Info pointer into the GPS sub-IFD, and overwrites the value of
//! every GPS entry with a neutral placeholder of the same size. The file length
//! never changes.
//!
//! - [`try_mask_gps`]: typed pipeline, reports why nothing was masked
//! - [`mask_gps_in_place`]: fail-open boundary over any [`ByteBuffer`]
//! - [`mask_gps_bytes`]: in-memory adapter returning the (possibly) masked bytes
//! - [`read_gps`]: read GPS coordinates through `nom-exif`, for reporting

pub mod buffer;
pub mod error;
pub mod jpeg;
pub mod masker;
mod reader;
pub mod tiff;

pub use buffer::{ByteBuffer, Endian};
pub use error::MaskError;
pub use reader::{GpsData, read_gps};

use masker::Patch;

/// Media types accepted as JPEG.
const JPEG_MEDIA_TYPES: &[&str] = &["image/jpeg", "image/jpg"];

/// What a masking pass changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskSummary {
    pub exif_segments: usize,
    pub gps_ifds: usize,
    /// GPS entries visited, including types that were left untouched.
    pub entries: usize,
    pub bytes_rewritten: usize,
    pub byte_order: Endian,
}

/// Outcome of the fail-open boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskStatus {
    Masked(MaskSummary),
    /// The buffer was not touched; the error is diagnostic only.
    Unchanged(MaskError),
}

impl MaskStatus {
    pub fn is_masked(&self) -> bool {
        matches!(self, MaskStatus::Masked(_))
    }
}

/// Outcome of [`mask_gps_bytes`]: the bytes to keep using either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskOutcome {
    /// Same length as the input, GPS values neutralised.
    Masked(Vec<u8>),
    /// Byte-identical to the input.
    Unchanged(Vec<u8>),
}

impl MaskOutcome {
    pub fn is_masked(&self) -> bool {
        matches!(self, MaskOutcome::Masked(_))
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            MaskOutcome::Masked(b) | MaskOutcome::Unchanged(b) => b,
        }
    }
}

/// All rewrites for one buffer, computed before anything is written.
#[derive(Debug, Clone)]
struct MaskPlan {
    patches: Vec<Patch>,
    exif_segments: usize,
    gps_ifds: usize,
    entries: usize,
    byte_order: Option<Endian>,
}

fn build_plan(buf: &[u8]) -> Result<MaskPlan, MaskError> {
    let segments = jpeg::exif_segments(buf)?;
    if segments.is_empty() {
        return Err(MaskError::NoExifSegment);
    }

    let mut plan = MaskPlan {
        patches: Vec::new(),
        exif_segments: segments.len(),
        gps_ifds: 0,
        entries: 0,
        byte_order: None,
    };
    let mut empty_ifd = None;

    for seg in &segments {
        let (header, gps_ifds) = tiff::find_gps_ifds(buf, seg.tiff_offset())?;
        for ifd in &gps_ifds {
            if ifd.entries.is_empty() {
                empty_ifd.get_or_insert(ifd.offset);
                continue;
            }
            plan.patches
                .extend(masker::plan_gps_ifd(buf, &header, ifd)?);
            plan.gps_ifds += 1;
            plan.entries += ifd.entries.len();
            plan.byte_order.get_or_insert(header.order);
        }
    }

    if plan.entries == 0 {
        return Err(match empty_ifd {
            Some(offset) => MaskError::EmptyGpsIfd { offset },
            None => MaskError::GpsInfoNotFound,
        });
    }
    Ok(plan)
}

/// Mask every GPS sub-IFD in a JPEG buffer.
///
/// The buffer is only written once every Exif segment has been planned
/// successfully; on `Err` it is untouched.
pub fn try_mask_gps<B: ByteBuffer + ?Sized>(buf: &mut B) -> Result<MaskSummary, MaskError> {
    let plan = build_plan(buf.as_bytes())?;
    let bytes_rewritten = masker::apply(buf, &plan.patches);

    Ok(MaskSummary {
        exif_segments: plan.exif_segments,
        gps_ifds: plan.gps_ifds,
        entries: plan.entries,
        bytes_rewritten,
        // entries > 0 implies at least one GPS IFD recorded its order
        byte_order: plan.byte_order.unwrap_or(Endian::Big),
    })
}

/// Check a declared media type against the JPEG types.
pub fn is_jpeg_media_type(media_type: &str) -> bool {
    JPEG_MEDIA_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(media_type.trim()))
}

/// Best-effort GPS masking. Never fails: anything that prevents masking is
/// reported as [`MaskStatus::Unchanged`] and the buffer is left as it was.
pub fn mask_gps_in_place<B: ByteBuffer + ?Sized>(buf: &mut B, media_type: &str) -> MaskStatus {
    if !is_jpeg_media_type(media_type) {
        return MaskStatus::Unchanged(MaskError::NotJpeg(media_type.to_string()));
    }

    let len_before = buf.len();
    match try_mask_gps(buf) {
        Ok(summary) => {
            debug_assert_eq!(buf.len(), len_before);
            log::debug!(
                "Masked {} GPS entries ({} bytes, {})",
                summary.entries,
                summary.bytes_rewritten,
                summary.byte_order
            );
            MaskStatus::Masked(summary)
        }
        Err(e) => {
            if e.is_benign() {
                log::debug!("GPS masking skipped: {e}");
            } else {
                log::warn!("GPS masking error, keeping original bytes: {e}");
            }
            MaskStatus::Unchanged(e)
        }
    }
}

/// In-memory adapter: take the file bytes, hand back the bytes to keep.
pub fn mask_gps_bytes(mut bytes: Vec<u8>, media_type: &str) -> MaskOutcome {
    match mask_gps_in_place(&mut bytes, media_type) {
        MaskStatus::Masked(_) => MaskOutcome::Masked(bytes),
        MaskStatus::Unchanged(_) => MaskOutcome::Unchanged(bytes),
    }
}
