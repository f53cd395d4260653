//! Tile cache.
//!
//! Owns the bounded set of known tiles for one rendering surface: lookup,
//! insert-with-FIFO-eviction, per-tile request state, and the staging area
//! where decoded pixel payloads wait for the render context to turn them
//! into textures.
//!
//! The cache is the single piece of state shared between the producer
//! context (tile bytes arriving) and the render context (texture upload and
//! drawing); see [`TileCache`] for the locking contract.

mod stats;
mod tiles;
mod types;

pub use stats::CacheStats;
pub use tiles::TileCache;
pub use types::{CacheError, RequestState, TilePayload, TileView, UploadCompletion};
