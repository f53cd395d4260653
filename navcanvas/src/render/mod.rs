//! Per-frame draw-list construction.
//!
//! The renderer proper (shaders, vertex buffers, swapchain) lives outside
//! this crate; what it consumes each frame is a [`MapFrame`]: an ordered
//! list of textured tile quads plus marker and route positions, all in
//! viewport pixels and all projected through the shared camera math in
//! [`crate::camera`].

use tracing::trace;

use crate::cache::TileCache;
use crate::camera::{geo_to_screen_px, screen_px_to_ndc, tile_origin_screen_px, Camera};
use crate::coord::GeoPoint;
use crate::engine::PositionFix;
use crate::texture::TextureHandle;

/// One textured tile quad.
///
/// `screen_x`/`screen_y` is the tile's northwest corner in viewport
/// pixels; the quad spans `size_px` rightward and downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileDraw {
    pub texture: TextureHandle,
    pub screen_x: f32,
    pub screen_y: f32,
    pub size_px: f32,
}

impl TileDraw {
    /// The quad's NW corner in normalized device coordinates.
    pub fn ndc_origin(&self, camera: &Camera) -> (f32, f32) {
        screen_px_to_ndc(
            self.screen_x,
            self.screen_y,
            camera.viewport_width,
            camera.viewport_height,
        )
    }
}

/// The user-position marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerDraw {
    pub screen_x: f32,
    pub screen_y: f32,
    /// Heading in degrees for the direction arrow, 0 = north
    pub bearing: f32,
}

/// Everything the renderer draws for one frame of one view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapFrame {
    /// Visible, loaded tiles in deterministic row-major order
    pub tiles: Vec<TileDraw>,
    /// Present only when a position fix exists and projects on the map
    pub marker: Option<MarkerDraw>,
    /// Route polyline vertices in viewport pixels, in route order
    pub route: Vec<(f32, f32)>,
}

impl MapFrame {
    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty() && self.marker.is_none() && self.route.is_empty()
    }
}

/// Build the draw list for one view.
///
/// Only tiles that are visible *and* loaded are included; tiles still
/// waiting on data are simply absent (they render as transparent). Route
/// vertices that fall outside the projection's valid latitude range are
/// skipped.
pub fn build_frame(
    cache: &TileCache,
    camera: &Camera,
    position: Option<&PositionFix>,
    route: &[GeoPoint],
    tile_size_px: f32,
) -> MapFrame {
    let mut drawable = cache.visible_loaded();
    drawable.sort_by_key(|(key, _)| (key.y, key.x));

    let mut tiles = Vec::with_capacity(drawable.len());
    for (key, texture) in drawable {
        match tile_origin_screen_px(&key, camera, tile_size_px) {
            Ok((screen_x, screen_y)) => tiles.push(TileDraw {
                texture,
                screen_x,
                screen_y,
                size_px: tile_size_px,
            }),
            Err(error) => {
                // Only possible with a camera outside the Mercator range.
                trace!(tile = %key, %error, "skipping unprojectable tile");
            }
        }
    }

    let marker = position.and_then(|fix| {
        geo_to_screen_px(fix.lat, fix.lon, camera, tile_size_px)
            .ok()
            .map(|(screen_x, screen_y)| MarkerDraw {
                screen_x,
                screen_y,
                bearing: fix.bearing,
            })
    });

    let route = route
        .iter()
        .filter_map(|point| geo_to_screen_px(point.lat, point.lon, camera, tile_size_px).ok())
        .collect();

    MapFrame {
        tiles,
        marker,
        route,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::DEFAULT_TILE_SIZE_PX;
    use crate::cache::TilePayload;
    use crate::coord::{to_tile_coords, TileKey};
    use crate::texture::{process_pending, SoftwareTextureBackend};

    fn camera() -> Camera {
        Camera::new(59.804538, 30.162479, 13.0)
    }

    fn load_tile(cache: &TileCache, backend: &mut SoftwareTextureBackend, key: TileKey) {
        cache.ensure(key);
        cache.begin_request(&key);
        cache
            .stage_payload(&key, TilePayload::new(vec![0x40; 16], 2, 2).unwrap())
            .unwrap();
        process_pending(cache, backend);
    }

    #[test]
    fn test_frame_contains_only_visible_loaded_tiles() {
        let cache = TileCache::new(8);
        let mut backend = SoftwareTextureBackend::new();
        let camera = camera();
        let center = to_tile_coords(camera.lat, camera.lon, 13).unwrap();
        let east = TileKey::new(center.x + 1, center.y, 13);

        load_tile(&cache, &mut backend, center);
        cache.ensure(east); // visible but never loaded
        cache.set_visible_window(&[center, east]);

        let frame = build_frame(&cache, &camera, None, &[], DEFAULT_TILE_SIZE_PX);

        assert_eq!(frame.tiles.len(), 1);
        assert!(frame.marker.is_none());
        assert!(frame.route.is_empty());
    }

    #[test]
    fn test_out_of_window_tile_is_excluded_but_stays_cached() {
        let cache = TileCache::new(8);
        let mut backend = SoftwareTextureBackend::new();
        let camera = camera();
        let old = TileKey::new(5, 5, 10);

        load_tile(&cache, &mut backend, old);
        cache.set_visible_window(&[old]);
        assert_eq!(
            build_frame(&cache, &camera, None, &[], DEFAULT_TILE_SIZE_PX)
                .tiles
                .len(),
            1
        );

        // Camera moved; the tile leaves the window but not the cache.
        let center = to_tile_coords(camera.lat, camera.lon, 13).unwrap();
        cache.set_visible_window(&[center]);

        let frame = build_frame(&cache, &camera, None, &[], DEFAULT_TILE_SIZE_PX);
        assert!(frame.tiles.is_empty());
        assert!(cache.lookup(&old).is_some(), "still cached, just not visible");
    }

    #[test]
    fn test_tiles_are_ordered_row_major() {
        let cache = TileCache::new(16);
        let mut backend = SoftwareTextureBackend::new();
        let camera = camera();
        let center = to_tile_coords(camera.lat, camera.lon, 13).unwrap();

        // Load in scrambled order.
        let keys = [
            TileKey::new(center.x + 1, center.y + 1, 13),
            TileKey::new(center.x, center.y, 13),
            TileKey::new(center.x + 1, center.y, 13),
            TileKey::new(center.x, center.y + 1, 13),
        ];
        for key in keys {
            load_tile(&cache, &mut backend, key);
        }
        cache.set_visible_window(&keys);

        let frame = build_frame(&cache, &camera, None, &[], DEFAULT_TILE_SIZE_PX);

        assert_eq!(frame.tiles.len(), 4);
        let positions: Vec<(f32, f32)> = frame
            .tiles
            .iter()
            .map(|t| (t.screen_y, t.screen_x))
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_adjacent_tiles_abut_exactly() {
        let cache = TileCache::new(8);
        let mut backend = SoftwareTextureBackend::new();
        let camera = camera();
        let center = to_tile_coords(camera.lat, camera.lon, 13).unwrap();
        let east = TileKey::new(center.x + 1, center.y, 13);

        load_tile(&cache, &mut backend, center);
        load_tile(&cache, &mut backend, east);
        cache.set_visible_window(&[center, east]);

        let frame = build_frame(&cache, &camera, None, &[], DEFAULT_TILE_SIZE_PX);
        assert_eq!(frame.tiles.len(), 2);
        let left = &frame.tiles[0];
        let right = &frame.tiles[1];
        assert!((left.screen_x + left.size_px - right.screen_x).abs() < 1e-3);
        assert_eq!(left.screen_y, right.screen_y);
    }

    #[test]
    fn test_marker_and_route_are_projected() {
        let cache = TileCache::new(8);
        let camera = camera();
        let fix = PositionFix {
            lat: camera.lat,
            lon: camera.lon,
            bearing: 90.0,
            speed_kmh: 40.0,
        };
        let route = [
            GeoPoint::new(camera.lat, camera.lon),
            GeoPoint::new(camera.lat + 0.01, camera.lon + 0.01),
        ];

        let frame = build_frame(&cache, &camera, Some(&fix), &route, DEFAULT_TILE_SIZE_PX);

        let marker = frame.marker.unwrap();
        assert!((marker.screen_x - 512.0).abs() < 1e-3);
        assert!((marker.screen_y - 384.0).abs() < 1e-3);
        assert_eq!(marker.bearing, 90.0);
        assert_eq!(frame.route.len(), 2);
        // First route vertex coincides with the marker: same shared math.
        assert_eq!(frame.route[0], (marker.screen_x, marker.screen_y));
    }

    #[test]
    fn test_unprojectable_route_vertices_are_skipped() {
        let cache = TileCache::new(8);
        let camera = camera();
        let route = [
            GeoPoint::new(camera.lat, camera.lon),
            GeoPoint::new(89.9, 0.0), // beyond the Mercator limit
        ];

        let frame = build_frame(&cache, &camera, None, &route, DEFAULT_TILE_SIZE_PX);
        assert_eq!(frame.route.len(), 1);
    }

    #[test]
    fn test_empty_frame() {
        let cache = TileCache::new(8);
        let frame = build_frame(&cache, &camera(), None, &[], DEFAULT_TILE_SIZE_PX);
        assert!(frame.is_empty());
    }
}
