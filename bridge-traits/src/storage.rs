//! Playback state persistence abstractions.
//!
//! The feed core keeps a small amount of soft state per [`PlayerKey`]: the last
//! known position, whether the media reached its end, and the audio settings.
//! Hosts decide where it lives (memory, preferences, a database) by providing a
//! [`PlaybackInfoCache`].

use serde::{Deserialize, Serialize};

use crate::{platform::PlatformSendSync, playback::PlayerKey};

/// Volume used when nothing has been persisted for a key.
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Audio settings persisted per key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeInfo {
    /// Output volume in `0.0..=1.0`.
    pub volume: f32,
    pub muted: bool,
}

impl VolumeInfo {
    pub fn new(volume: f32, muted: bool) -> Self {
        Self { volume, muted }
    }
}

impl Default for VolumeInfo {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            muted: false,
        }
    }
}

/// Durable soft state for one key.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackInfo {
    /// Last persisted playback position in milliseconds.
    pub playback_position_ms: u64,
    /// Whether the media reached its end the last time it played.
    pub ended: bool,
    pub volume_info: VolumeInfo,
}

impl PlaybackInfo {
    pub fn new(playback_position_ms: u64, ended: bool, volume_info: VolumeInfo) -> Self {
        Self {
            playback_position_ms,
            ended,
            volume_info,
        }
    }

    pub fn with_position(mut self, playback_position_ms: u64) -> Self {
        self.playback_position_ms = playback_position_ms;
        self
    }
}

/// Key-value store for [`PlaybackInfo`].
///
/// Implementations are shared by every item of a feed. Keys are independent,
/// so no cross-key consistency is required.
pub trait PlaybackInfoCache: PlatformSendSync {
    fn get(&self, key: &PlayerKey) -> Option<PlaybackInfo>;

    fn put(&self, key: &PlayerKey, info: PlaybackInfo);

    /// Remove the entry for `key`, returning it if present.
    fn remove(&self, key: &PlayerKey) -> Option<PlaybackInfo>;

    /// Fetch the entry for `key`, falling back to `default` when absent.
    fn get_or(&self, key: &PlayerKey, default: PlaybackInfo) -> PlaybackInfo {
        self.get(key).unwrap_or(default)
    }
}
