//! Fractional-tile screen projection.
//!
//! Everything drawn over the map — tiles, the position marker, route
//! vertices — goes through [`fractional_tile_to_screen_px`]. The camera's
//! *fractional* tile position sits at the exact center of the viewport;
//! a whole-tile step in the grid is exactly `tile_size_px` on screen.
//! Because all three layers share this one function, they cannot drift
//! apart by a sub-tile offset while panning.
//!
//! Screen pixel coordinates grow rightward and downward from the top-left
//! viewport corner (matching tile-grid y, which grows southward).
//! [`screen_px_to_ndc`] converts to normalized device coordinates, where Y
//! grows upward, by inverting the Y axis.

use super::Camera;
use crate::coord::{to_fractional_tile_coords, CoordError, TileKey};

/// Raster tile edge length on screen, in pixels.
pub const DEFAULT_TILE_SIZE_PX: f32 = 256.0;

/// Project a fractional tile-grid position to viewport pixels.
///
/// The camera's own fractional position maps to the viewport center;
/// everything else is offset by whole-and-partial tile deltas times
/// `tile_size_px`.
pub fn fractional_tile_to_screen_px(
    fx: f64,
    fy: f64,
    camera: &Camera,
    tile_size_px: f32,
) -> Result<(f32, f32), CoordError> {
    let (camera_fx, camera_fy) =
        to_fractional_tile_coords(camera.lat, camera.lon, camera.tile_zoom())?;

    let tile_size = tile_size_px as f64;
    let x = camera.viewport_width as f64 / 2.0 + (fx - camera_fx) * tile_size;
    let y = camera.viewport_height as f64 / 2.0 + (fy - camera_fy) * tile_size;

    Ok((x as f32, y as f32))
}

/// Screen position of a tile's northwest corner.
///
/// The tile's pixels then span `tile_size_px` rightward and downward from
/// the returned point.
pub fn tile_origin_screen_px(
    key: &TileKey,
    camera: &Camera,
    tile_size_px: f32,
) -> Result<(f32, f32), CoordError> {
    fractional_tile_to_screen_px(key.x as f64, key.y as f64, camera, tile_size_px)
}

/// Screen position of a geographic point (marker, route vertex).
pub fn geo_to_screen_px(
    lat: f64,
    lon: f64,
    camera: &Camera,
    tile_size_px: f32,
) -> Result<(f32, f32), CoordError> {
    let (fx, fy) = to_fractional_tile_coords(lat, lon, camera.tile_zoom())?;
    fractional_tile_to_screen_px(fx, fy, camera, tile_size_px)
}

/// Convert viewport pixels to normalized device coordinates.
///
/// NDC X and Y are in [-1, 1]; Y is inverted because screen pixels grow
/// downward while NDC Y grows upward.
pub fn screen_px_to_ndc(x: f32, y: f32, viewport_width: u32, viewport_height: u32) -> (f32, f32) {
    let ndc_x = (x / viewport_width as f32) * 2.0 - 1.0;
    let ndc_y = -((y / viewport_height as f32) * 2.0 - 1.0);
    (ndc_x, ndc_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::tile_to_lat_lon;

    fn camera() -> Camera {
        let mut camera = Camera::new(59.804538, 30.162479, 13.0);
        camera.viewport_width = 1024;
        camera.viewport_height = 768;
        camera
    }

    #[test]
    fn test_camera_position_is_viewport_center() {
        let camera = camera();
        let (x, y) =
            geo_to_screen_px(camera.lat, camera.lon, &camera, DEFAULT_TILE_SIZE_PX).unwrap();

        assert!((x - 512.0).abs() < 1e-3);
        assert!((y - 384.0).abs() < 1e-3);
    }

    #[test]
    fn test_one_tile_step_is_tile_size_pixels() {
        let camera = camera();
        let (fx, fy) = to_fractional_tile_coords(camera.lat, camera.lon, 13).unwrap();

        let (x0, y0) =
            fractional_tile_to_screen_px(fx, fy, &camera, DEFAULT_TILE_SIZE_PX).unwrap();
        let (x1, y1) =
            fractional_tile_to_screen_px(fx + 1.0, fy + 1.0, &camera, DEFAULT_TILE_SIZE_PX)
                .unwrap();

        assert!((x1 - x0 - 256.0).abs() < 1e-3);
        assert!((y1 - y0 - 256.0).abs() < 1e-3);
    }

    #[test]
    fn test_marker_at_tile_corner_matches_tile_origin() {
        // The alignment property: projecting a tile's NW corner as a
        // geographic point must land exactly where the tile itself is
        // placed.
        let camera = camera();
        let key = crate::coord::to_tile_coords(camera.lat, camera.lon, 13).unwrap();
        let (corner_lat, corner_lon) = tile_to_lat_lon(&key);

        let (tile_x, tile_y) =
            tile_origin_screen_px(&key, &camera, DEFAULT_TILE_SIZE_PX).unwrap();
        let (geo_x, geo_y) =
            geo_to_screen_px(corner_lat, corner_lon, &camera, DEFAULT_TILE_SIZE_PX).unwrap();

        assert!((tile_x - geo_x).abs() < 1e-3, "{} vs {}", tile_x, geo_x);
        assert!((tile_y - geo_y).abs() < 1e-3, "{} vs {}", tile_y, geo_y);
    }

    #[test]
    fn test_point_east_of_camera_lands_right_of_center() {
        let camera = camera();
        let (x, _) =
            geo_to_screen_px(camera.lat, camera.lon + 0.01, &camera, DEFAULT_TILE_SIZE_PX)
                .unwrap();
        assert!(x > 512.0);
    }

    #[test]
    fn test_point_north_of_camera_lands_above_center() {
        // Screen Y grows downward, so north means a smaller y.
        let camera = camera();
        let (_, y) =
            geo_to_screen_px(camera.lat + 0.01, camera.lon, &camera, DEFAULT_TILE_SIZE_PX)
                .unwrap();
        assert!(y < 384.0);
    }

    #[test]
    fn test_ndc_conversion_inverts_y() {
        // Viewport center maps to the NDC origin.
        let (x, y) = screen_px_to_ndc(512.0, 384.0, 1024, 768);
        assert!(x.abs() < 1e-6);
        assert!(y.abs() < 1e-6);

        // Top-left corner of the screen is (-1, +1) in NDC.
        let (x, y) = screen_px_to_ndc(0.0, 0.0, 1024, 768);
        assert_eq!((x, y), (-1.0, 1.0));

        // Bottom-right corner is (+1, -1).
        let (x, y) = screen_px_to_ndc(1024.0, 768.0, 1024, 768);
        assert_eq!((x, y), (1.0, -1.0));
    }

    #[test]
    fn test_projection_rejects_out_of_range_point() {
        let camera = camera();
        let result = geo_to_screen_px(88.0, 0.0, &camera, DEFAULT_TILE_SIZE_PX);
        assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
    }
}
