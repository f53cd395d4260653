//! Provider types and traits

use std::fmt;

use crate::coord::TileKey;

/// Errors that can occur during provider operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed
    HttpError(String),
    /// Response bytes could not be decoded into an RGBA image
    DecodeError(String),
    /// URL template is missing a required placeholder
    InvalidUrlTemplate(String),
    /// No async runtime available to issue requests on
    NoRuntime,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::DecodeError(msg) => write!(f, "Decode error: {}", msg),
            ProviderError::InvalidUrlTemplate(template) => {
                write!(
                    f,
                    "Invalid URL template '{}' (must contain {{x}}, {{y}} and {{z}})",
                    template
                )
            }
            ProviderError::NoRuntime => {
                write!(f, "No tokio runtime available for tile requests")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Outbound boundary to the map-data source.
///
/// `request_tile` is fire-and-forget: the provider delivers the decoded
/// pixels later through a [`TileSink`], with no ordering or delivery
/// guarantee. Duplicate suppression is the caller's job (the request gate),
/// not the provider's.
pub trait MapDataProvider: Send + Sync {
    /// Ask the data source for one tile.
    fn request_tile(&self, key: TileKey);

    /// Provider name for logging and identification.
    fn name(&self) -> &str;
}

/// Inbound boundary from the map-data source.
///
/// Called from whatever context the provider's bytes arrive on (the
/// producer context); implementations must only copy CPU-side state and
/// must never touch a rendering resource.
pub trait TileSink: Send + Sync {
    /// Deliver decoded RGBA pixels for one tile.
    ///
    /// `pixels` is row-major RGBA with stride == `width * 4`.
    fn on_tile_data(&self, key: TileKey, pixels: Vec<u8>, width: u32, height: u32);
}
