//! Engine facade.
//!
//! [`MapEngine`] owns the named map views — each with its own tile cache
//! and camera — plus the shared route and position state, and wires the
//! camera updates, the inbound tile data and the per-frame draw-list
//! construction together. Ownership is explicit: callers hold the engine
//! (typically in an `Arc`) and pass it around instead of reading
//! process-wide state.
//!
//! Thread roles:
//! - `update_camera`, `on_tile_data`, `update_position`, `set_route` may be
//!   called from any thread; they only touch CPU-side state.
//! - `prepare_frame` and `shutdown` take `&mut impl TextureBackend` and
//!   belong to the thread that owns the rendering context.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::cache::{TileCache, TilePayload};
use crate::camera::{visible_tiles, Camera};
use crate::config::{EngineConfig, ViewConfig};
use crate::coord::{CoordError, GeoPoint, TileKey};
use crate::provider::{MapDataProvider, TileSink};
use crate::render::{build_frame, MapFrame};
use crate::request::RequestGate;
use crate::texture::{process_pending, TextureBackend};

/// The rendering surfaces an engine can drive.
///
/// `Primary` is the full-detail main display; `Secondary` is the
/// simplified companion display (e.g. an instrument cluster) with a
/// smaller cache and window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Primary,
    Secondary,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKind::Primary => write!(f, "primary"),
            ViewKind::Secondary => write!(f, "secondary"),
        }
    }
}

/// Latest position fix from the location source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub lat: f64,
    pub lon: f64,
    /// Heading in degrees, 0 = north
    pub bearing: f32,
    pub speed_kmh: f32,
}

/// Engine-level errors.
#[derive(Debug, PartialEq)]
pub enum EngineError {
    /// The engine was not configured with this view
    UnknownView(ViewKind),
    /// Camera or geometry outside the projection's valid range
    Coord(CoordError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::UnknownView(kind) => write!(f, "view '{}' is not configured", kind),
            EngineError::Coord(error) => write!(f, "coordinate error: {}", error),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<CoordError> for EngineError {
    fn from(error: CoordError) -> Self {
        EngineError::Coord(error)
    }
}

/// One rendering surface: its cache, camera and configuration.
struct MapView {
    cache: TileCache,
    camera: Mutex<Camera>,
    config: ViewConfig,
}

impl MapView {
    fn new(config: ViewConfig) -> Self {
        Self {
            cache: TileCache::new(config.cache_capacity),
            // Position is meaningless until the first camera update; zoom 13
            // keeps the first visible window a sane size either way.
            camera: Mutex::new(Camera::new(0.0, 0.0, 13.0)),
            config,
        }
    }
}

/// Facade over the tile pipeline for one or two map views.
pub struct MapEngine {
    primary: MapView,
    secondary: Option<MapView>,
    gate: RequestGate,
    position: Mutex<Option<PositionFix>>,
    route: Mutex<Vec<GeoPoint>>,
}

impl MapEngine {
    /// Create an engine from the given configuration. No provider is
    /// attached yet; tiles stay unrequested until [`attach_provider`].
    ///
    /// [`attach_provider`]: MapEngine::attach_provider
    pub fn new(config: EngineConfig) -> Self {
        info!(
            primary_capacity = config.primary.cache_capacity,
            has_secondary = config.secondary.is_some(),
            "map engine created"
        );
        Self {
            primary: MapView::new(config.primary),
            secondary: config.secondary.map(MapView::new),
            gate: RequestGate::new(),
            position: Mutex::new(None),
            route: Mutex::new(Vec::new()),
        }
    }

    /// Attach the outbound map-data provider. The first attachment wins.
    pub fn attach_provider(&self, provider: Arc<dyn MapDataProvider>) -> bool {
        self.gate.attach(provider)
    }

    fn view(&self, kind: ViewKind) -> Result<&MapView, EngineError> {
        match kind {
            ViewKind::Primary => Ok(&self.primary),
            ViewKind::Secondary => self
                .secondary
                .as_ref()
                .ok_or(EngineError::UnknownView(kind)),
        }
    }

    fn views(&self) -> impl Iterator<Item = &MapView> {
        std::iter::once(&self.primary).chain(self.secondary.as_ref())
    }

    /// Move the camera of one view.
    ///
    /// Recomputes the visible tile window, creates slots for newly visible
    /// tiles (evicting the oldest ones under capacity pressure) and issues
    /// a fetch for every tile that has never been requested.
    ///
    /// Returns the number of fetches issued.
    pub fn update_camera(
        &self,
        kind: ViewKind,
        lat: f64,
        lon: f64,
        zoom: f64,
        bearing: f64,
        tilt: f64,
    ) -> Result<usize, EngineError> {
        let view = self.view(kind)?;

        let window = {
            let mut camera = view.camera.lock().unwrap();
            camera.lat = lat;
            camera.lon = lon;
            camera.zoom = zoom;
            camera.bearing = bearing;
            camera.tilt = tilt;
            visible_tiles(&camera, view.config.tile_radius)?
        };

        for key in &window {
            view.cache.ensure(*key);
        }
        view.cache.set_visible_window(&window);

        let issued = self.gate.request_missing(&view.cache, &window);
        debug!(view = %kind, window = window.len(), issued, "camera updated");
        Ok(issued)
    }

    /// Resize the viewport of one view.
    pub fn resize_viewport(
        &self,
        kind: ViewKind,
        width: u32,
        height: u32,
    ) -> Result<(), EngineError> {
        let view = self.view(kind)?;
        let mut camera = view.camera.lock().unwrap();
        camera.viewport_width = width;
        camera.viewport_height = height;
        Ok(())
    }

    /// Current camera of one view.
    pub fn camera(&self, kind: ViewKind) -> Result<Camera, EngineError> {
        Ok(*self.view(kind)?.camera.lock().unwrap())
    }

    /// Tile cache of one view, mainly for inspection and tests.
    pub fn cache(&self, kind: ViewKind) -> Result<&TileCache, EngineError> {
        Ok(&self.view(kind)?.cache)
    }

    /// Record a position fix (drives the marker on both views).
    pub fn update_position(&self, lat: f64, lon: f64, bearing: f32, speed_kmh: f32) {
        *self.position.lock().unwrap() = Some(PositionFix {
            lat,
            lon,
            bearing,
            speed_kmh,
        });
    }

    /// Forget the position fix; the marker disappears.
    pub fn clear_position(&self) {
        *self.position.lock().unwrap() = None;
    }

    /// Latest position fix, if any.
    pub fn position(&self) -> Option<PositionFix> {
        *self.position.lock().unwrap()
    }

    /// Replace the route polyline.
    pub fn set_route(&self, points: Vec<GeoPoint>) {
        debug!(points = points.len(), "route set");
        *self.route.lock().unwrap() = points;
    }

    /// Drop the route polyline.
    pub fn clear_route(&self) {
        self.route.lock().unwrap().clear();
    }

    /// Drop every cached tile of one view, queueing its textures for
    /// destruction on the next `prepare_frame`/`shutdown`. For drastic
    /// scene changes.
    pub fn clear_tiles(&self, kind: ViewKind) -> Result<(), EngineError> {
        self.view(kind)?.cache.clear();
        Ok(())
    }

    /// Upload pending tile data and build the draw list for one view.
    ///
    /// Render-context only: `backend` is the GPU capability token.
    pub fn prepare_frame(
        &self,
        kind: ViewKind,
        backend: &mut dyn TextureBackend,
    ) -> Result<MapFrame, EngineError> {
        let view = self.view(kind)?;

        process_pending(&view.cache, backend);

        let camera = *view.camera.lock().unwrap();
        let position = self.position();
        let route = self.route.lock().unwrap().clone();
        Ok(build_frame(
            &view.cache,
            &camera,
            position.as_ref(),
            &route,
            view.config.tile_size_px,
        ))
    }

    /// Tear down all views, destroying every texture exactly once.
    ///
    /// Render-context only. The engine is reusable afterwards (caches are
    /// simply empty), which also covers surface-recreate cycles.
    pub fn shutdown(&self, backend: &mut dyn TextureBackend) {
        for view in self.views() {
            view.cache.clear();
            for handle in view.cache.drain_retired() {
                backend.destroy_texture(handle);
            }
        }
        info!("map engine shut down, all textures released");
    }
}

impl TileSink for MapEngine {
    /// Inbound boundary from the map-data provider.
    ///
    /// Validates the payload once, then offers it to every view; each view
    /// independently drops it if the key is no longer resident there.
    /// Producer-context safe.
    fn on_tile_data(&self, key: TileKey, pixels: Vec<u8>, width: u32, height: u32) {
        let payload = match TilePayload::new(pixels, width, height) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::warn!(tile = %key, %error, "rejecting invalid tile payload");
                return;
            }
        };

        for view in self.views() {
            // Each cache takes its own copy; staleness is per view.
            let _ = view.cache.stage_payload(&key, payload.clone());
        }
    }
}
