//! Map-data provider abstraction.
//!
//! The core never fetches tile bytes itself: it asks a [`MapDataProvider`]
//! for a tile (fire-and-forget) and reacts when the provider pushes decoded
//! pixels back through a [`TileSink`]. [`HttpTileProvider`] is the shipped
//! implementation for slippy-map HTTP endpoints; tests substitute
//! recording doubles behind the same traits.

mod http;
mod types;

pub use http::HttpTileProvider;
pub use types::{MapDataProvider, ProviderError, TileSink};
