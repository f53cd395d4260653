//! Tile request gating.
//!
//! Ensures each tile produces at most one outbound fetch over its lifetime
//! in the cache. The gate itself is stateless: the per-tile request state
//! lives in the cache, and [`crate::cache::TileCache::begin_request`]
//! provides the atomic `NotRequested → Requested` transition the gate
//! relies on.

use std::sync::{Arc, OnceLock};

use tracing::{debug, trace};

use crate::cache::TileCache;
use crate::coord::TileKey;
use crate::provider::MapDataProvider;

/// Gate between camera-driven visibility and the outbound provider.
///
/// In-flight requests are never cancelled: an evicted tile's fetch keeps
/// running and its late payload is filtered out at staging time instead.
#[derive(Default)]
pub struct RequestGate {
    provider: OnceLock<Arc<dyn MapDataProvider>>,
}

impl RequestGate {
    /// Create a gate with no provider attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the outbound provider. Returns false if one was already
    /// attached (the first provider wins).
    pub fn attach(&self, provider: Arc<dyn MapDataProvider>) -> bool {
        let name = provider.name().to_string();
        let attached = self.provider.set(provider).is_ok();
        if attached {
            debug!(provider = %name, "map data provider attached");
        } else {
            debug!(provider = %name, "provider already attached, ignoring");
        }
        attached
    }

    /// True once a provider is attached.
    pub fn has_provider(&self) -> bool {
        self.provider.get().is_some()
    }

    /// Issue a fetch for every tile in `keys` that has never been
    /// requested. Tiles already `Requested` or `Loaded` are skipped, which
    /// caps outstanding fetches at exactly one per tile.
    ///
    /// With no provider attached this is a no-op that leaves every tile
    /// `NotRequested`, so the next camera update retries once a provider
    /// exists.
    ///
    /// Returns the number of requests issued.
    pub fn request_missing(&self, cache: &TileCache, keys: &[TileKey]) -> usize {
        let Some(provider) = self.provider.get() else {
            trace!("no provider attached, skipping {} candidate tiles", keys.len());
            return 0;
        };

        let mut issued = 0;
        for key in keys {
            if cache.begin_request(key) {
                provider.request_tile(*key);
                issued += 1;
            }
        }
        if issued > 0 {
            debug!(issued, provider = provider.name(), "tile requests dispatched");
        }
        issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Provider double that records every request.
    struct RecordingProvider {
        requests: Mutex<Vec<TileKey>>,
        count: AtomicUsize,
    }

    impl RecordingProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                count: AtomicUsize::new(0),
            })
        }
    }

    impl MapDataProvider for RecordingProvider {
        fn request_tile(&self, key: TileKey) {
            self.requests.lock().unwrap().push(key);
            self.count.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn key(x: u32, y: u32) -> TileKey {
        TileKey::new(x, y, 13)
    }

    #[test]
    fn test_requests_each_tile_exactly_once() {
        let cache = TileCache::new(8);
        let gate = RequestGate::new();
        let provider = RecordingProvider::new();
        gate.attach(provider.clone());

        let keys = [key(1, 1), key(2, 1)];
        for k in &keys {
            cache.ensure(*k);
        }

        assert_eq!(gate.request_missing(&cache, &keys), 2);
        // Same window again: nothing new goes out.
        assert_eq!(gate.request_missing(&cache, &keys), 0);
        assert_eq!(provider.count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_no_provider_means_no_transition() {
        let cache = TileCache::new(8);
        let gate = RequestGate::new();
        cache.ensure(key(1, 1));

        assert_eq!(gate.request_missing(&cache, &[key(1, 1)]), 0);

        // The tile must still be requestable once a provider shows up.
        let provider = RecordingProvider::new();
        gate.attach(provider.clone());
        assert_eq!(gate.request_missing(&cache, &[key(1, 1)]), 1);
    }

    #[test]
    fn test_first_provider_wins() {
        let gate = RequestGate::new();
        let first = RecordingProvider::new();
        let second = RecordingProvider::new();

        assert!(gate.attach(first.clone()));
        assert!(!gate.attach(second.clone()));

        let cache = TileCache::new(8);
        cache.ensure(key(1, 1));
        gate.request_missing(&cache, &[key(1, 1)]);

        assert_eq!(first.count.load(Ordering::SeqCst), 1);
        assert_eq!(second.count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unknown_keys_are_skipped() {
        let cache = TileCache::new(8);
        let gate = RequestGate::new();
        let provider = RecordingProvider::new();
        gate.attach(provider.clone());

        // Never ensured, so begin_request refuses.
        assert_eq!(gate.request_missing(&cache, &[key(7, 7)]), 0);
        assert!(provider.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_evicted_tile_becomes_requestable_again() {
        let cache = TileCache::new(1);
        let gate = RequestGate::new();
        let provider = RecordingProvider::new();
        gate.attach(provider.clone());

        cache.ensure(key(1, 1));
        gate.request_missing(&cache, &[key(1, 1)]);

        cache.ensure(key(2, 2)); // evicts key(1, 1)
        cache.ensure(key(1, 1)); // fresh slot, fresh lifecycle

        assert_eq!(gate.request_missing(&cache, &[key(1, 1)]), 1);
        assert_eq!(provider.count.load(Ordering::SeqCst), 2);
    }
}
