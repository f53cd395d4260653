//! Pending-payload texture uploader.
//!
//! The single place where staged pixel data becomes renderer-owned
//! textures. Must run on the thread that owns the rendering context; the
//! `&mut dyn TextureBackend` argument is that thread's capability token.

use tracing::{trace, warn};

use super::backend::TextureBackend;
use crate::cache::{TileCache, UploadCompletion};

/// Upload every staged payload in `cache` and destroy retired textures.
///
/// Payloads are drained under the cache lock but uploaded outside it, so
/// producers are never blocked on GPU work. A failed upload discards that
/// tile's payload and demotes the tile (it renders as transparent and may
/// be requested again); the rest of the batch continues. After this
/// returns, no tile is left holding both a pending payload and the
/// `Loaded` state.
///
/// Returns the number of tiles that became `Loaded`.
pub fn process_pending(cache: &TileCache, backend: &mut dyn TextureBackend) -> usize {
    // Textures orphaned by eviction or clear() since the last frame.
    for handle in cache.drain_retired() {
        backend.destroy_texture(handle);
    }

    let mut uploaded = 0;
    for (key, payload) in cache.take_pending() {
        match backend.create_texture(&payload.pixels, payload.width, payload.height) {
            Ok(handle) => match cache.complete_upload(&key, handle) {
                UploadCompletion::Loaded { replaced } => {
                    trace!(tile = %key, handle = handle.raw(), "tile texture uploaded");
                    if let Some(stale) = replaced {
                        backend.destroy_texture(stale);
                    }
                    uploaded += 1;
                }
                UploadCompletion::TileEvicted { orphan } => {
                    backend.destroy_texture(orphan);
                }
            },
            Err(error) => {
                warn!(tile = %key, %error, "tile texture upload failed, dropping payload");
                cache.fail_upload(&key);
            }
        }
    }

    uploaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{RequestState, TilePayload};
    use crate::coord::TileKey;
    use crate::texture::backend::{TextureError, TextureHandle};
    use crate::texture::SoftwareTextureBackend;

    fn key(x: u32, y: u32) -> TileKey {
        TileKey::new(x, y, 13)
    }

    fn stage(cache: &TileCache, key: &TileKey, width: u32, height: u32) {
        cache.ensure(*key);
        cache.begin_request(key);
        let payload =
            TilePayload::new(vec![0x55; width as usize * height as usize * 4], width, height)
                .unwrap();
        cache.stage_payload(key, payload).unwrap();
    }

    #[test]
    fn test_staged_tile_becomes_loaded() {
        let cache = TileCache::new(8);
        let mut backend = SoftwareTextureBackend::new();
        stage(&cache, &key(1000, 600), 256, 256);

        let uploaded = process_pending(&cache, &mut backend);

        assert_eq!(uploaded, 1);
        let view = cache.lookup(&key(1000, 600)).unwrap();
        assert_eq!(view.state, RequestState::Loaded);
        assert!(view.texture.is_some());
        assert!(!view.has_pending);
        assert_eq!(backend.live_count(), 1);
    }

    #[test]
    fn test_second_staging_wins_before_upload() {
        let cache = TileCache::new(8);
        let mut backend = SoftwareTextureBackend::new();
        cache.ensure(key(1, 1));

        cache
            .stage_payload(&key(1, 1), TilePayload::new(vec![0x11; 16], 2, 2).unwrap())
            .unwrap();
        cache
            .stage_payload(&key(1, 1), TilePayload::new(vec![0x22; 16], 2, 2).unwrap())
            .unwrap();

        assert_eq!(process_pending(&cache, &mut backend), 1);

        let view = cache.lookup(&key(1, 1)).unwrap();
        let texture = backend.texture(view.texture.unwrap()).unwrap();
        assert_eq!(texture.pixels, vec![0x22; 16]);
        assert_eq!(backend.created_count(), 1, "only the second payload uploads");
    }

    #[test]
    fn test_reupload_destroys_replaced_texture() {
        let cache = TileCache::new(8);
        let mut backend = SoftwareTextureBackend::new();
        stage(&cache, &key(2, 2), 2, 2);
        process_pending(&cache, &mut backend);

        // A refreshed payload arrives for an already-loaded tile.
        cache
            .stage_payload(&key(2, 2), TilePayload::new(vec![0x99; 16], 2, 2).unwrap())
            .unwrap();
        process_pending(&cache, &mut backend);

        assert_eq!(backend.created_count(), 2);
        assert_eq!(backend.destroyed_count(), 1);
        assert_eq!(backend.live_count(), 1);
    }

    #[test]
    fn test_evicted_texture_destroyed_exactly_once() {
        let cache = TileCache::new(1);
        let mut backend = SoftwareTextureBackend::new();
        stage(&cache, &key(1, 0), 2, 2);
        process_pending(&cache, &mut backend);

        cache.ensure(key(2, 0)); // evicts the loaded tile

        process_pending(&cache, &mut backend);
        process_pending(&cache, &mut backend); // second pass must not double-free

        assert_eq!(backend.destroyed_count(), 1);
        assert_eq!(backend.live_count(), 0);
    }

    #[test]
    fn test_failed_upload_is_isolated_per_tile() {
        /// Backend that rejects a specific tile size.
        struct FlakyBackend {
            inner: SoftwareTextureBackend,
            reject_width: u32,
        }

        impl TextureBackend for FlakyBackend {
            fn create_texture(
                &mut self,
                pixels: &[u8],
                width: u32,
                height: u32,
            ) -> Result<TextureHandle, TextureError> {
                if width == self.reject_width {
                    return Err(TextureError::Backend("simulated device loss".into()));
                }
                self.inner.create_texture(pixels, width, height)
            }

            fn destroy_texture(&mut self, handle: TextureHandle) {
                self.inner.destroy_texture(handle);
            }
        }

        let cache = TileCache::new(8);
        let mut backend = FlakyBackend {
            inner: SoftwareTextureBackend::new(),
            reject_width: 4,
        };
        stage(&cache, &key(1, 0), 2, 2);
        stage(&cache, &key(2, 0), 4, 4); // this one fails
        stage(&cache, &key(3, 0), 2, 2);

        let uploaded = process_pending(&cache, &mut backend);

        assert_eq!(uploaded, 2, "failure must not abort the batch");
        assert_eq!(
            cache.lookup(&key(1, 0)).unwrap().state,
            RequestState::Loaded
        );
        let failed = cache.lookup(&key(2, 0)).unwrap();
        assert_eq!(failed.state, RequestState::NotRequested);
        assert_eq!(failed.texture, None);
        assert!(!failed.has_pending, "failed payload is discarded");
        assert_eq!(
            cache.lookup(&key(3, 0)).unwrap().state,
            RequestState::Loaded
        );
        assert_eq!(cache.stats().upload_failures, 1);
    }

    #[test]
    fn test_late_upload_for_evicted_tile_destroys_orphan() {
        let cache = TileCache::new(1);
        let mut backend = SoftwareTextureBackend::new();

        // Payload drained, then the tile is evicted before complete_upload.
        cache.ensure(key(1, 0));
        cache
            .stage_payload(&key(1, 0), TilePayload::new(vec![0x33; 16], 2, 2).unwrap())
            .unwrap();
        let pending = cache.take_pending();
        cache.ensure(key(2, 0)); // evicts key(1, 0)

        for (k, payload) in pending {
            let handle = backend
                .create_texture(&payload.pixels, payload.width, payload.height)
                .unwrap();
            match cache.complete_upload(&k, handle) {
                UploadCompletion::TileEvicted { orphan } => backend.destroy_texture(orphan),
                UploadCompletion::Loaded { .. } => panic!("tile should be gone"),
            }
        }

        assert_eq!(backend.live_count(), 0);
        assert_eq!(backend.destroyed_count(), 1);
    }

    #[test]
    fn test_no_pending_is_a_cheap_no_op() {
        let cache = TileCache::new(8);
        let mut backend = SoftwareTextureBackend::new();
        assert_eq!(process_pending(&cache, &mut backend), 0);
        assert_eq!(backend.created_count(), 0);
    }
}
