//! Camera state and visible-tile windowing.
//!
//! Given a camera position, zoom and viewport, computes which tiles should
//! be on screen and where. The screen-projection half lives in [`screen`];
//! tiles, the position marker and the route polyline all project through
//! the same functions there so the three layers stay pixel-aligned as the
//! camera pans.

mod screen;

pub use screen::{
    fractional_tile_to_screen_px, geo_to_screen_px, screen_px_to_ndc, tile_origin_screen_px,
    DEFAULT_TILE_SIZE_PX,
};

use crate::coord::{to_tile_coords, CoordError, TileKey};

/// Tile zoom bounds for the visible window. Zoom 0 is a single world tile
/// and is never useful for a moving camera, so the floor is 1.
const MIN_TILE_ZOOM: u8 = 1;
const MAX_TILE_ZOOM: u8 = 18;

/// Camera over the map.
///
/// `bearing` and `tilt` are accepted and stored but do not affect the
/// projection; the view is always north-up 2D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub lat: f64,
    pub lon: f64,
    pub zoom: f64,
    /// Heading in degrees, 0 = north
    pub bearing: f64,
    /// Accepted but unused for projection
    pub tilt: f64,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Camera {
    /// Camera at a position with a default 1024×768 viewport.
    pub fn new(lat: f64, lon: f64, zoom: f64) -> Self {
        Self {
            lat,
            lon,
            zoom,
            bearing: 0.0,
            tilt: 0.0,
            viewport_width: 1024,
            viewport_height: 768,
        }
    }

    /// Integer zoom used for the tile grid, clamped to [1, 18].
    pub fn tile_zoom(&self) -> u8 {
        (self.zoom as i32).clamp(MIN_TILE_ZOOM as i32, MAX_TILE_ZOOM as i32) as u8
    }
}

/// Enumerate the tiles within `radius` of the camera's tile.
///
/// The window is a square of Chebyshev radius `radius` (side
/// `2 * radius + 1`) around the camera's integer tile at
/// [`Camera::tile_zoom`]. Keys outside the world grid at that zoom are
/// skipped — no wraparound across the antimeridian — so the result can be
/// smaller than the full square near the world's edges.
///
/// Keys are returned in row-major order (north to south, west to east).
pub fn visible_tiles(camera: &Camera, radius: u32) -> Result<Vec<TileKey>, CoordError> {
    let zoom = camera.tile_zoom();
    let center = to_tile_coords(camera.lat, camera.lon, zoom)?;

    let tiles_per_axis = 1i64 << zoom;
    let radius = radius as i64;
    let mut keys = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);

    for dy in -radius..=radius {
        let y = center.y as i64 + dy;
        if !(0..tiles_per_axis).contains(&y) {
            continue;
        }
        for dx in -radius..=radius {
            let x = center.x as i64 + dx;
            if !(0..tiles_per_axis).contains(&x) {
                continue;
            }
            keys.push(TileKey::new(x as u32, y as u32, zoom));
        }
    }

    Ok(keys)
}
