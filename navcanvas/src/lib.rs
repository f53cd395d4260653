//! NavCanvas - tile cache and camera-projection engine for scrolling maps
//!
//! This library implements the core of a raster map display: tiles keyed by
//! (x, y, zoom) are fetched from a map-data provider, cached in GPU-ready
//! form with bounded FIFO eviction, uploaded to renderer-owned textures on
//! the rendering thread, and projected onto screen space relative to a
//! moving camera. The user-position marker and the route polyline project
//! through the same camera math as the tiles, keeping all three layers
//! pixel-aligned while panning.
//!
//! # High-Level API
//!
//! The [`engine`] module provides the facade most hosts want:
//!
//! ```ignore
//! use std::sync::Arc;
//! use navcanvas::config::EngineConfig;
//! use navcanvas::engine::{MapEngine, ViewKind};
//! use navcanvas::provider::HttpTileProvider;
//! use navcanvas::texture::WgpuTextureBackend;
//!
//! let engine = Arc::new(MapEngine::new(EngineConfig::default()));
//! let provider = HttpTileProvider::new(url_template, engine.clone())?;
//! engine.attach_provider(Arc::new(provider));
//!
//! // Any thread:
//! engine.update_camera(ViewKind::Primary, 59.80, 30.16, 13.0, 0.0, 0.0)?;
//!
//! // Render thread, every frame:
//! let frame = engine.prepare_frame(ViewKind::Primary, &mut backend)?;
//! ```

pub mod cache;
pub mod camera;
pub mod config;
pub mod coord;
pub mod engine;
pub mod logging;
pub mod provider;
pub mod render;
pub mod request;
pub mod texture;

/// Version of the NavCanvas library and CLI.
///
/// Synchronized across the workspace; injected from `Cargo.toml` at
/// compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
