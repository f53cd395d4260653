//! Tile cache statistics.

/// Counters describing cache behaviour since construction.
///
/// Written under the cache's stats lock, read via a cloned snapshot.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Successful lookups
    pub hits: u64,
    /// Lookups for keys not resident
    pub misses: u64,
    /// Slots removed by capacity pressure
    pub evictions: u64,
    /// Payloads accepted by `stage_payload`
    pub staged: u64,
    /// Payloads replaced before upload (last write wins)
    pub replaced_payloads: u64,
    /// Payloads dropped because the key was no longer resident
    pub stale_drops: u64,
    /// Payloads turned into textures
    pub uploads: u64,
    /// Uploads that failed and were discarded
    pub upload_failures: u64,
}

impl CacheStats {
    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub(crate) fn record_staged(&mut self, replaced: bool) {
        self.staged += 1;
        if replaced {
            self.replaced_payloads += 1;
        }
    }

    pub(crate) fn record_stale_drop(&mut self) {
        self.stale_drops += 1;
    }

    pub(crate) fn record_upload(&mut self) {
        self.uploads += 1;
    }

    pub(crate) fn record_upload_failure(&mut self) {
        self.upload_failures += 1;
    }
}
