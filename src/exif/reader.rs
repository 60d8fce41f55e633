use anyhow::{Context, Result};
use nom_exif::*;
use std::path::Path;

/// GPS position as seen by a standards-compliant Exif reader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpsData {
    pub has_gps: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl GpsData {
    /// `true` when no position is present or it decodes to 0°, 0°.
    pub fn is_neutral(&self) -> bool {
        !self.has_gps
            || (self.latitude.unwrap_or(0.0) == 0.0 && self.longitude.unwrap_or(0.0) == 0.0)
    }
}

/// Read the GPS position of an image file.
///
/// Files without Exif, or whose GPS block does not parse, yield the default
/// (no GPS) instead of an error.
pub fn read_gps(path: &Path) -> Result<GpsData> {
    let mut parser = MediaParser::new();
    let ms = MediaSource::file_path(path).context("Failed to open image file")?;

    let iter: ExifIter = match parser.parse(ms) {
        Ok(iter) => iter,
        Err(_) => {
            log::debug!("No EXIF data found in {}", path.display());
            return Ok(GpsData::default());
        }
    };

    let gps = match iter.parse_gps_info() {
        Ok(Some(gps)) => gps,
        Ok(None) => return Ok(GpsData::default()),
        Err(e) => {
            log::debug!("Unreadable GPS info in {}: {e}", path.display());
            return Ok(GpsData::default());
        }
    };

    Ok(GpsData {
        has_gps: true,
        latitude: Some(latlng_to_decimal(&gps.latitude, gps.latitude_ref)),
        longitude: Some(latlng_to_decimal(&gps.longitude, gps.longitude_ref)),
    })
}

/// Convert a nom-exif LatLng (3 URationals: deg, min, sec) to decimal degrees.
fn latlng_to_decimal(latlng: &LatLng, reference: char) -> f64 {
    let part = |num: u32, den: u32| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let degrees = part(latlng.0.0, latlng.0.1);
    let minutes = part(latlng.1.0, latlng.1.1);
    let seconds = part(latlng.2.0, latlng.2.1);

    let mut coord = degrees + minutes / 60.0 + seconds / 3600.0;

    if reference == 'S' || reference == 'W' {
        coord = -coord;
    }

    coord
}
