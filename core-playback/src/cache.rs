//! In-memory [`PlaybackInfoCache`] with least-recently-used eviction.

use bridge_traits::{PlaybackInfo, PlaybackInfoCache, PlayerKey};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// Number of keys kept by [`LruPlaybackInfoCache::default`].
pub const DEFAULT_PLAYBACK_INFO_CAPACITY: usize = 256;

/// Bounded playback info store for hosts without their own persistence.
///
/// Entries live for the lifetime of the process; the oldest key is evicted
/// when the capacity is exceeded.
pub struct LruPlaybackInfoCache {
    entries: Mutex<LruCache<PlayerKey, PlaybackInfo>>,
}

impl LruPlaybackInfoCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for LruPlaybackInfoCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_PLAYBACK_INFO_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}

impl std::fmt::Debug for LruPlaybackInfoCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("LruPlaybackInfoCache")
            .field("len", &entries.len())
            .field("capacity", &entries.cap())
            .finish()
    }
}

impl PlaybackInfoCache for LruPlaybackInfoCache {
    fn get(&self, key: &PlayerKey) -> Option<PlaybackInfo> {
        self.entries.lock().get(key).copied()
    }

    fn put(&self, key: &PlayerKey, info: PlaybackInfo) {
        self.entries.lock().put(key.clone(), info);
    }

    fn remove(&self, key: &PlayerKey) -> Option<PlaybackInfo> {
        self.entries.lock().pop(key)
    }
}
