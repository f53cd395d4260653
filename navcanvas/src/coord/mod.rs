//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator tile coordinates used by raster map providers.
//!
//! All functions are pure and deterministic: the same floating-point inputs
//! always produce the same outputs. The projection is undefined above
//! ±85.05112878° latitude (the standard Mercator singularity); coordinates
//! outside that range are rejected rather than clamped.

mod types;

pub use types::{
    CoordError, GeoPoint, TileKey, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Converts geographic coordinates to fractional tile coordinates.
///
/// Identical to [`to_tile_coords`] but without truncation to an integer
/// grid cell. The fractional part is what places a camera (or marker)
/// *within* its tile, which is required for sub-tile screen offsets.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 18)
#[inline]
pub fn to_fractional_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<(f64, f64), CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    // Number of tiles along each axis at this zoom level
    let n = 2.0_f64.powi(zoom as i32);

    let fx = (lon + 180.0) / 360.0 * n;

    // Web Mercator: y from the north edge, asinh(tan φ) == ln(tan φ + sec φ)
    let lat_rad = lat * PI / 180.0;
    let fy = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n;

    Ok((fx, fy))
}

/// Converts geographic coordinates to integer tile coordinates.
///
/// The result is the grid cell containing the point. Delegates to
/// [`to_fractional_tile_coords`] so that the integer and fractional views
/// of the same point can never disagree.
///
/// # Returns
///
/// A `Result` containing the tile key or an error if inputs are invalid.
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileKey, CoordError> {
    let (fx, fy) = to_fractional_tile_coords(lat, lon, zoom)?;

    // The east and south edges of the world (lon == 180, lat == MIN_LAT)
    // land exactly on n; fold them into the last tile.
    let max_index = (1u32 << zoom) - 1;
    let x = (fx.floor() as u32).min(max_index);
    let y = (fy.floor() as u32).min(max_index);

    Ok(TileKey::new(x, y, zoom))
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner. The
/// northwest corner is the reference-point convention used throughout the
/// crate (cache geo origins, tests).
#[inline]
pub fn tile_to_lat_lon(tile: &TileKey) -> (f64, f64) {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let lon = tile.x as f64 / n * 360.0 - 180.0;

    // Inverse Web Mercator
    let y = tile.y as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    (lat, lon)
}
