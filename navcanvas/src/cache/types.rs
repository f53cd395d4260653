//! Core types for the tile cache.

use thiserror::Error;

use crate::coord::TileKey;
use crate::texture::TextureHandle;

/// Request lifecycle of a cached tile.
///
/// Transitions are forward-only: `NotRequested → Requested → Loaded`.
/// A slot only leaves this progression by being evicted, after which a
/// fresh slot for the same key starts over at `NotRequested`. The single
/// exception is a failed texture upload, which demotes a textureless tile
/// back to `NotRequested` so it can be fetched again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// No fetch has been issued for this tile
    NotRequested,
    /// Exactly one fetch is in flight (or was lost; there are no timeouts)
    Requested,
    /// Pixel data was uploaded; the tile has a texture
    Loaded,
}

/// Decoded RGBA pixels waiting to be uploaded to a texture.
///
/// Exists only between "data received" and "uploaded"; ownership moves out
/// of the cache when the uploader drains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilePayload {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TilePayload {
    /// Validate and wrap an RGBA pixel buffer.
    ///
    /// The boundary contract is fixed: 4 bytes per pixel, RGBA order,
    /// row-major, stride == width * 4.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self, CacheError> {
        if width == 0 || height == 0 {
            return Err(CacheError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(CacheError::PayloadLengthMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }
}

/// Read-only snapshot of one cache slot.
///
/// The cache hands out copies rather than references so that no lock is
/// held while callers inspect a tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileView {
    pub key: TileKey,
    /// Northwest corner of the tile, derived once from the key
    pub geo_origin: (f64, f64),
    pub state: RequestState,
    pub texture: Option<TextureHandle>,
    pub visible: bool,
    pub has_pending: bool,
}

/// Result of [`crate::cache::TileCache::complete_upload`].
#[derive(Debug, PartialEq, Eq)]
pub enum UploadCompletion {
    /// The tile is now `Loaded`. `replaced` is a previous texture that the
    /// caller must destroy, if the upload overwrote one.
    Loaded { replaced: Option<TextureHandle> },
    /// The slot was evicted while the upload ran; the freshly created
    /// texture is handed back for destruction.
    TileEvicted { orphan: TextureHandle },
}

/// Cache-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    /// Zero or degenerate payload dimensions
    #[error("invalid payload dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel buffer length does not match the RGBA contract
    #[error("payload length {actual} does not match {width}x{height} RGBA ({expected})")]
    PayloadLengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}
