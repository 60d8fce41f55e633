//! Filesystem byte source and sink around the in-memory masker.
//!
//! The masked bytes go to a sibling file (`new_<name>` by default). The sink
//! compares the on-disk size of that file with the original before anything
//! else happens; a mismatch removes the new file and is reported as an error.
//! The original is deleted only on request and only after that check.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

use crate::exif::{self, MaskError, MaskStatus};

/// Options for [`mask_file`].
#[derive(Debug, Clone)]
pub struct FileMaskOptions {
    /// Prefix for the masked copy's file name.
    pub output_prefix: String,
    /// Remove the original after a successful, size-verified write.
    pub delete_original: bool,
    /// Mask in memory only, write nothing.
    pub dry_run: bool,
}

impl Default for FileMaskOptions {
    fn default() -> Self {
        Self {
            output_prefix: "new_".to_string(),
            delete_original: false,
            dry_run: false,
        }
    }
}

/// Result of masking one file.
#[derive(Debug, Default)]
pub struct FileMaskResult {
    pub masked: bool,
    pub new_file_name: Option<String>,
    pub new_file_path: Option<PathBuf>,
    pub original_deleted: bool,
    /// GPS entries neutralised (or that would be, in a dry run).
    pub entries: usize,
    /// Why the file was left alone, when it was.
    pub reason: Option<MaskError>,
}

/// Mask the GPS data of `dir/file_name`.
///
/// Masking problems are not errors: they come back as `masked == false` with
/// a `reason`. Errors are reserved for I/O and the size check.
pub fn mask_file(
    dir: &Path,
    file_name: &str,
    media_type: &str,
    options: &FileMaskOptions,
) -> Result<FileMaskResult> {
    let old_path = dir.join(file_name);
    let mut bytes = fs::read(&old_path)
        .with_context(|| format!("Failed to read {}", old_path.display()))?;
    let original_len = bytes.len();

    let summary = match exif::mask_gps_in_place(&mut bytes, media_type) {
        MaskStatus::Masked(summary) => summary,
        MaskStatus::Unchanged(reason) => {
            return Ok(FileMaskResult {
                reason: Some(reason),
                ..Default::default()
            });
        }
    };

    let new_file_name = format!("{}{file_name}", options.output_prefix);
    let new_path = dir.join(&new_file_name);

    if options.dry_run {
        log::debug!("Dry run: would write {}", new_path.display());
        return Ok(FileMaskResult {
            masked: true,
            new_file_name: Some(new_file_name),
            new_file_path: Some(new_path),
            entries: summary.entries,
            ..Default::default()
        });
    }

    if bytes.len() != original_len {
        bail!(
            "masked buffer size mismatch: {} bytes, original {original_len}",
            bytes.len()
        );
    }

    fs::write(&new_path, &bytes)
        .with_context(|| format!("Failed to write {}", new_path.display()))?;
    verify_same_size(&old_path, &new_path)?;

    let original_deleted = if options.delete_original {
        fs::remove_file(&old_path)
            .with_context(|| format!("Failed to delete {}", old_path.display()))?;
        log::debug!("Deleted original {}", old_path.display());
        true
    } else {
        false
    };

    Ok(FileMaskResult {
        masked: true,
        new_file_name: Some(new_file_name),
        new_file_path: Some(new_path),
        original_deleted,
        entries: summary.entries,
        reason: None,
    })
}

/// Compare on-disk sizes. On mismatch the new file is removed.
pub fn verify_same_size(original: &Path, written: &Path) -> Result<()> {
    let old_len = fs::metadata(original)
        .with_context(|| format!("Failed to stat {}", original.display()))?
        .len();
    let new_len = fs::metadata(written)
        .with_context(|| format!("Failed to stat {}", written.display()))?
        .len();

    if old_len != new_len {
        if let Err(e) = fs::remove_file(written) {
            log::warn!("Failed to remove {}: {e}", written.display());
        }
        bail!(
            "bytes size mismatch: {} is {new_len} bytes, {} is {old_len} bytes",
            written.display(),
            original.display()
        );
    }
    Ok(())
}
