//! Bounded tile cache with FIFO eviction and payload staging.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use tracing::{debug, trace};

use super::stats::CacheStats;
use super::types::{CacheError, RequestState, TilePayload, TileView, UploadCompletion};
use crate::coord::{tile_to_lat_lon, TileKey};
use crate::texture::TextureHandle;

/// One resident tile.
#[derive(Debug)]
struct TileSlot {
    key: TileKey,
    /// Northwest corner, computed once on insertion
    geo_origin: (f64, f64),
    texture: Option<TextureHandle>,
    visible: bool,
    state: RequestState,
    pending: Option<TilePayload>,
}

impl TileSlot {
    fn new(key: TileKey) -> Self {
        Self {
            key,
            geo_origin: tile_to_lat_lon(&key),
            texture: None,
            visible: false,
            state: RequestState::NotRequested,
            pending: None,
        }
    }

    fn view(&self) -> TileView {
        TileView {
            key: self.key,
            geo_origin: self.geo_origin,
            state: self.state,
            texture: self.texture,
            visible: self.visible,
            has_pending: self.pending.is_some(),
        }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    slots: HashMap<TileKey, TileSlot>,
    /// Insertion order; the front is the eviction candidate
    order: VecDeque<TileKey>,
    /// Textures whose slots are gone, awaiting destruction on the render
    /// context. Eviction and clear() may run off the render thread, so
    /// they only queue handles here.
    retired: Vec<TextureHandle>,
}

/// Bounded cache of map tiles shared between the producer context (payload
/// staging) and the render context (texture upload and drawing).
///
/// All mutating operations take one internal mutex for the shortest
/// possible critical section: payload buffers move in and out under the
/// lock, but decoding and GPU uploads happen outside it. `clear()` takes
/// the same mutex and is therefore exclusive with every other operation.
///
/// Eviction is FIFO by insertion order, not LRU. This matches the
/// system this cache models; an LRU upgrade would not change the public
/// contract but is deliberately not implemented.
#[derive(Debug)]
pub struct TileCache {
    state: Mutex<CacheState>,
    capacity: usize,
    stats: Mutex<CacheStats>,
}

impl TileCache {
    /// Create a cache holding at most `capacity` tiles.
    ///
    /// A zero capacity is folded up to 1 so that `ensure` can always
    /// succeed.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            capacity: capacity.max(1),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// Maximum number of resident tiles.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of resident tiles.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().slots.len()
    }

    /// True if no tiles are resident.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of one tile, if resident. No side effects on tile state.
    pub fn lookup(&self, key: &TileKey) -> Option<TileView> {
        let state = self.state.lock().unwrap();
        let view = state.slots.get(key).map(TileSlot::view);

        let mut stats = self.stats.lock().unwrap();
        match view {
            Some(_) => stats.record_hit(),
            None => stats.record_miss(),
        }

        view
    }

    /// Ensure a slot exists for `key`, evicting the oldest-inserted slot
    /// if the cache is full. Never fails: capacity is always restored by
    /// eviction before insertion.
    pub fn ensure(&self, key: TileKey) -> TileView {
        let mut state = self.state.lock().unwrap();

        if let Some(slot) = state.slots.get(&key) {
            return slot.view();
        }

        while state.slots.len() >= self.capacity {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            if let Some(slot) = state.slots.remove(&oldest) {
                trace!(tile = %oldest, "evicting oldest tile");
                if let Some(handle) = slot.texture {
                    state.retired.push(handle);
                }
                // slot.pending is dropped here with the slot
                self.stats.lock().unwrap().record_eviction();
            }
        }

        let slot = TileSlot::new(key);
        let view = slot.view();
        state.slots.insert(key, slot);
        state.order.push_back(key);
        view
    }

    /// Stage decoded pixels for `key`.
    ///
    /// Producer-context safe: this is a CPU-side move under the cache lock
    /// and never touches a texture. At most one payload is pending per tile;
    /// staging over an existing payload replaces it (last write wins).
    ///
    /// Returns `Ok(true)` if the payload was stored, `Ok(false)` if the key
    /// is not resident (late data for an evicted tile is dropped, which is
    /// policy, not an error). Invalid payloads are rejected via
    /// [`TilePayload::new`] before this is called; this method accepts only
    /// validated payloads.
    pub fn stage_payload(&self, key: &TileKey, payload: TilePayload) -> Result<bool, CacheError> {
        let mut state = self.state.lock().unwrap();

        let Some(slot) = state.slots.get_mut(key) else {
            debug!(tile = %key, "dropping payload for non-resident tile");
            self.stats.lock().unwrap().record_stale_drop();
            return Ok(false);
        };

        let replaced = slot.pending.replace(payload).is_some();
        if replaced {
            trace!(tile = %key, "replacing pending payload");
        }
        self.stats.lock().unwrap().record_staged(replaced);
        Ok(true)
    }

    /// Atomically transition `key` from `NotRequested` to `Requested`.
    ///
    /// Returns true only on the transition; calling again on a `Requested`
    /// or `Loaded` tile is a no-op, which is what caps outstanding fetches
    /// at one per tile.
    pub fn begin_request(&self, key: &TileKey) -> bool {
        let mut state = self.state.lock().unwrap();
        match state.slots.get_mut(key) {
            Some(slot) if slot.state == RequestState::NotRequested => {
                slot.state = RequestState::Requested;
                true
            }
            _ => false,
        }
    }

    /// Replace the visible set: every resident tile is marked invisible,
    /// then the given keys are marked visible. Keys not resident are
    /// ignored (visibility does not create slots).
    pub fn set_visible_window(&self, keys: &[TileKey]) {
        let mut state = self.state.lock().unwrap();
        for slot in state.slots.values_mut() {
            slot.visible = false;
        }
        for key in keys {
            if let Some(slot) = state.slots.get_mut(key) {
                slot.visible = true;
            }
        }
    }

    /// Move every pending payload out of the cache.
    ///
    /// Called by the uploader on the render context; the payloads are
    /// uploaded outside the lock.
    pub fn take_pending(&self) -> Vec<(TileKey, TilePayload)> {
        let mut state = self.state.lock().unwrap();
        let mut drained = Vec::new();
        for slot in state.slots.values_mut() {
            if let Some(payload) = slot.pending.take() {
                drained.push((slot.key, payload));
            }
        }
        drained
    }

    /// Record a finished upload for `key`.
    ///
    /// On success the tile becomes `Loaded` and any texture it previously
    /// held is handed back for destruction. If the slot was evicted while
    /// the upload ran, the new texture is handed back instead.
    pub fn complete_upload(&self, key: &TileKey, handle: TextureHandle) -> UploadCompletion {
        let mut state = self.state.lock().unwrap();
        match state.slots.get_mut(key) {
            Some(slot) => {
                let replaced = slot.texture.replace(handle);
                slot.state = RequestState::Loaded;
                self.stats.lock().unwrap().record_upload();
                UploadCompletion::Loaded { replaced }
            }
            None => {
                debug!(tile = %key, "tile evicted during upload, retiring texture");
                UploadCompletion::TileEvicted { orphan: handle }
            }
        }
    }

    /// Record a failed upload for `key`.
    ///
    /// The payload is already gone (it was drained before the attempt).
    /// A tile with no surviving texture is demoted to `NotRequested` so a
    /// later camera update can fetch it again; a tile that still has an
    /// older texture keeps it and stays `Loaded`.
    pub fn fail_upload(&self, key: &TileKey) {
        let mut state = self.state.lock().unwrap();
        if let Some(slot) = state.slots.get_mut(key) {
            if slot.texture.is_none() {
                slot.state = RequestState::NotRequested;
            }
        }
        self.stats.lock().unwrap().record_upload_failure();
    }

    /// Take the textures queued for destruction by eviction or `clear`.
    pub fn drain_retired(&self) -> Vec<TextureHandle> {
        let mut state = self.state.lock().unwrap();
        std::mem::take(&mut state.retired)
    }

    /// Tiles that should be drawn this frame: visible, loaded, textured.
    pub fn visible_loaded(&self) -> Vec<(TileKey, TextureHandle)> {
        let state = self.state.lock().unwrap();
        state
            .slots
            .values()
            .filter(|slot| slot.visible && slot.state == RequestState::Loaded)
            .filter_map(|slot| slot.texture.map(|handle| (slot.key, handle)))
            .collect()
    }

    /// Drop every slot, queueing all textures for destruction and freeing
    /// all pending payloads. Exclusive with every other operation by way
    /// of the shared mutex.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        let slots = std::mem::take(&mut state.slots);
        state.order.clear();
        for (_, slot) in slots {
            if let Some(handle) = slot.texture {
                state.retired.push(handle);
            }
        }
        debug!("tile cache cleared");
    }

    /// Snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.lock().unwrap().clone()
    }
}
