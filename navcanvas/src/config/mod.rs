//! Configuration types for map views.
//!
//! Groups the knobs for one rendering surface into a [`ViewConfig`] and the
//! whole engine into an [`EngineConfig`], instead of threading raw numbers
//! through constructors.
//!
//! # Example
//!
//! ```
//! use navcanvas::config::{EngineConfig, ViewConfig};
//!
//! // Primary display plus a trimmed-down secondary (cluster) display.
//! let config = EngineConfig::default();
//!
//! // A single custom view.
//! let config = EngineConfig::primary_only(
//!     ViewConfig::primary().with_cache_capacity(512).with_tile_radius(3),
//! );
//! # let _ = config;
//! ```

use crate::camera::DEFAULT_TILE_SIZE_PX;

/// Configuration of one map view (one rendering surface).
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    /// Maximum number of cached tiles (FIFO-evicted beyond this)
    pub cache_capacity: usize,
    /// Chebyshev radius of the visible tile window
    pub tile_radius: u32,
    /// Tile edge length on screen, in pixels
    pub tile_size_px: f32,
}

impl ViewConfig {
    /// Defaults for the primary (full-detail) display: 256 cached tiles,
    /// a 5×5 visible window.
    pub fn primary() -> Self {
        Self {
            cache_capacity: 256,
            tile_radius: 2,
            tile_size_px: DEFAULT_TILE_SIZE_PX,
        }
    }

    /// Defaults for a simplified secondary display (instrument cluster):
    /// 64 cached tiles, a 3×3 visible window.
    pub fn secondary() -> Self {
        Self {
            cache_capacity: 64,
            tile_radius: 1,
            tile_size_px: DEFAULT_TILE_SIZE_PX,
        }
    }

    /// Set the tile cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set the visible-window radius.
    pub fn with_tile_radius(mut self, radius: u32) -> Self {
        self.tile_radius = radius;
        self
    }

    /// Set the on-screen tile size in pixels.
    pub fn with_tile_size_px(mut self, size: f32) -> Self {
        self.tile_size_px = size;
        self
    }
}

/// Configuration of the whole engine: a primary view and an optional
/// secondary view.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub primary: ViewConfig,
    pub secondary: Option<ViewConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            primary: ViewConfig::primary(),
            secondary: Some(ViewConfig::secondary()),
        }
    }
}

impl EngineConfig {
    /// An engine with only the primary view.
    pub fn primary_only(primary: ViewConfig) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }
}
