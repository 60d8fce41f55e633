use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::io::{self, FileMaskResult};

/// Extensions treated as JPEG.
const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg", "jpe", "jfif"];

/// Media type declared for a file, judged by its extension.
///
/// # Example
///
/// ```rust
/// use gps_mask::pipeline::media_type;
/// use std::path::Path;
///
/// assert_eq!(media_type(Path::new("IMG_0001.JPG")), "image/jpeg");
/// assert_eq!(media_type(Path::new("scan.png")), "image/png");
/// ```
pub fn media_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        e if JPEG_EXTENSIONS.contains(&e) => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

/// The result of processing a single image.
#[derive(Debug, Default)]
pub struct ProcessResult {
    pub path: PathBuf,
    pub media_type: &'static str,
    pub masked: bool,
    /// GPS entries neutralised.
    pub entries: usize,
    /// Where the masked copy was (or, in a dry run, would be) written.
    pub output_path: Option<PathBuf>,
    pub original_deleted: bool,
    /// Why the file was left unchanged; informational, not a failure.
    pub reason: Option<String>,
    /// I/O or size-check failure.
    pub error: Option<String>,
}

/// Collect JPEG files from the given paths.
///
/// Accepts a mix of file paths and directory paths. Directories are walked
/// recursively. Files that are not JPEGs are skipped.
///
/// # Example
///
/// ```rust,no_run
/// use gps_mask::pipeline::collect_images;
/// use std::path::PathBuf;
///
/// let images = collect_images(&[
///     PathBuf::from("photo.jpg"),       // single file
///     PathBuf::from("./photos/"),        // entire directory
/// ], true);
/// println!("Found {} images", images.len());
/// ```
pub fn collect_images(paths: &[PathBuf], follow_links: bool) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported_image(path) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(follow_links)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && is_supported_image(p) {
                    images.push(p.to_path_buf());
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Check if a file has a JPEG extension.
fn is_supported_image(path: &Path) -> bool {
    media_type(path) == "image/jpeg"
}

/// Mask the GPS data of one image according to `config`.
///
/// Never panics and never returns early with an error: problems end up in
/// [`ProcessResult::error`], reasons for leaving a file alone in
/// [`ProcessResult::reason`].
pub fn process_image(path: &Path, config: &Config) -> ProcessResult {
    let media_type = media_type(path);
    let mut result = ProcessResult {
        path: path.to_path_buf(),
        media_type,
        ..Default::default()
    };

    let (dir, file_name) = match (path.parent(), path.file_name().and_then(|n| n.to_str())) {
        (Some(dir), Some(name)) => (dir, name),
        _ => {
            result.error = Some(format!("Not a file path: {}", path.display()));
            return result;
        }
    };

    match io::mask_file(dir, file_name, media_type, &config.mask_options()) {
        Ok(FileMaskResult {
            masked,
            new_file_path,
            original_deleted,
            entries,
            reason,
            ..
        }) => {
            result.masked = masked;
            result.entries = entries;
            result.output_path = new_file_path;
            result.original_deleted = original_deleted;
            result.reason = reason.map(|r| r.to_string());
        }
        Err(e) => {
            result.error = Some(format!("{e:#}"));
        }
    }

    result
}
