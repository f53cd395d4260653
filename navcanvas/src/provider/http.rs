//! HTTP tile provider.
//!
//! Fetches raster tiles from a slippy-map style HTTP endpoint, decodes
//! them to RGBA and delivers them through a [`TileSink`]. Each request is
//! an independent async task: failures are logged and the tile simply
//! never arrives (the core enforces no timeouts and performs no retries).

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::types::{MapDataProvider, ProviderError, TileSink};
use crate::coord::TileKey;

const USER_AGENT: &str = concat!("navcanvas/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// [`MapDataProvider`] over an HTTP tile endpoint.
///
/// The URL template uses `{x}`, `{y}` and `{z}` placeholders, e.g.
/// `https://tile.example.org/{z}/{x}/{y}.png`. Responses may be PNG or
/// JPEG; both decode to RGBA before delivery.
pub struct HttpTileProvider {
    client: reqwest::Client,
    url_template: String,
    sink: Arc<dyn TileSink>,
    runtime: tokio::runtime::Handle,
}

impl HttpTileProvider {
    /// Create a provider delivering into `sink`.
    ///
    /// Must be called from within a tokio runtime; request tasks are
    /// spawned onto it.
    pub fn new(url_template: impl Into<String>, sink: Arc<dyn TileSink>) -> Result<Self, ProviderError> {
        let url_template = url_template.into();
        for placeholder in ["{x}", "{y}", "{z}"] {
            if !url_template.contains(placeholder) {
                return Err(ProviderError::InvalidUrlTemplate(url_template));
            }
        }

        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| ProviderError::NoRuntime)?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            url_template,
            sink,
            runtime,
        })
    }

    fn tile_url(&self, key: &TileKey) -> String {
        self.url_template
            .replace("{x}", &key.x.to_string())
            .replace("{y}", &key.y.to_string())
            .replace("{z}", &key.zoom.to_string())
    }

    async fn fetch(client: reqwest::Client, url: String) -> Result<Vec<u8>, ProviderError> {
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::HttpError(e.to_string()))?
            .error_for_status()
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

impl MapDataProvider for HttpTileProvider {
    fn request_tile(&self, key: TileKey) {
        let client = self.client.clone();
        let url = self.tile_url(&key);
        let sink = Arc::clone(&self.sink);

        self.runtime.spawn(async move {
            let bytes = match HttpTileProvider::fetch(client, url).await {
                Ok(bytes) => bytes,
                Err(error) => {
                    warn!(tile = %key, %error, "tile fetch failed");
                    return;
                }
            };

            // Decode on the producer context so the render thread only
            // ever sees ready-to-upload RGBA.
            let image = match image::load_from_memory(&bytes) {
                Ok(image) => image.to_rgba8(),
                Err(error) => {
                    warn!(tile = %key, %error, "tile decode failed");
                    return;
                }
            };

            let (width, height) = image.dimensions();
            debug!(tile = %key, width, height, "tile fetched");
            sink.on_tile_data(key, image.into_raw(), width, height);
        });
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullSink;

    impl TileSink for NullSink {
        fn on_tile_data(&self, _key: TileKey, _pixels: Vec<u8>, _width: u32, _height: u32) {}
    }

    #[tokio::test]
    async fn test_rejects_template_without_placeholders() {
        let result = HttpTileProvider::new("https://example.org/tiles", Arc::new(NullSink));
        assert!(matches!(
            result.err(),
            Some(ProviderError::InvalidUrlTemplate(_))
        ));
    }

    #[tokio::test]
    async fn test_builds_tile_url_from_template() {
        let provider = HttpTileProvider::new(
            "https://example.org/{z}/{x}/{y}.png",
            Arc::new(NullSink),
        )
        .unwrap();

        let url = provider.tile_url(&TileKey::new(1000, 600, 13));
        assert_eq!(url, "https://example.org/13/1000/600.png");
    }

    #[test]
    fn test_requires_a_runtime() {
        let result = HttpTileProvider::new("https://example.org/{z}/{x}/{y}.png", Arc::new(NullSink));
        assert_eq!(result.err(), Some(ProviderError::NoRuntime));
    }
}
