//! # gps-mask
//!
//! Strip geolocation from JPEG photos before they are shared or stored. The
//! GPS sub-IFD of the Exif APP1 segment is located and every GPS value is
//! overwritten with a neutral placeholder of the same size, so the file keeps
//! its exact length and stays readable by any Exif reader. Pixel data and all
//! other metadata are left untouched.
//!
//! ## Quick Start
//!
//! Mask bytes you already hold in memory (an upload, a file-picker read):
//!
//! ```rust,no_run
//! use gps_mask::exif::{MaskOutcome, mask_gps_bytes};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! match mask_gps_bytes(bytes, "image/jpeg") {
//!     MaskOutcome::Masked(clean) => std::fs::write("photo-clean.jpg", clean).unwrap(),
//!     MaskOutcome::Unchanged(_) => println!("no GPS data to remove"),
//! }
//! ```
//!
//! Or let the filesystem adapter write `new_photo.jpg` next to the original,
//! verify its size and optionally delete the original:
//!
//! ```rust,no_run
//! use gps_mask::io::{FileMaskOptions, mask_file};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let opts = FileMaskOptions { delete_original: true, ..Default::default() };
//! let result = mask_file(Path::new("uploads"), "photo.jpg", "image/jpeg", &opts)?;
//! if result.masked {
//!     println!("written {:?}", result.new_file_path);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Masking is best-effort: malformed or unsupported input is reported as
//! unchanged, never as an error, and the original bytes stay authoritative.
//!
//! ## Modules
//!
//! - [`exif`]: marker scanner, TIFF/IFD navigation, GPS value masking
//! - [`io`]: filesystem source/sink with size verification
//! - [`config`]: configuration types and loading/saving
//! - [`pipeline`]: image collection, media types, per-file processing

pub mod config;
pub mod exif;
pub mod io;
pub mod pipeline;
