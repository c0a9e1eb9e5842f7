//! Player bridge traits and supporting types.
//!
//! These abstractions let the feed playback core drive a host media engine
//! (ExoPlayer, AVPlayer, an HTML video element, ...) without knowing anything
//! about decoding or rendering. Every command is fire-and-forget: results are
//! observed only through [`PlayerEventListener`] callbacks, which the core
//! marshals back onto its command thread.

use crate::platform::PlatformSendSync;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Identifier of a display surface (a video view) owned by the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    /// Generate a new surface identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a live display surface a player can render into.
///
/// A playable item is only considered "truly playable" while it holds one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Surface {
    id: SurfaceId,
}

impl Surface {
    /// Create a handle for a freshly inflated surface.
    pub fn new() -> Self {
        Self {
            id: SurfaceId::new(),
        }
    }

    /// Wrap an identifier assigned by the host.
    pub fn with_id(id: SurfaceId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable identity of a piece of playable content.
///
/// Built from the content URL plus a disambiguating tag, so the same video shown
/// twice in a feed can keep two independent playback positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerKey(String);

impl PlayerKey {
    pub fn new(url: &str, tag: &str) -> Self {
        Self(format!("{}{}", url, tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Pool configuration a player is created with.
///
/// Players are pooled per `(PlayerConfig, PlayerKey)`, so two items using
/// different buffering profiles never share an instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Name of the profile, used by the pool as part of the cache key.
    pub name: String,
    /// Minimum media duration buffered before playback starts (milliseconds).
    pub min_buffer_ms: u32,
    /// Maximum media duration kept buffered (milliseconds).
    pub max_buffer_ms: u32,
    /// Size of the on-disk media cache shared by players of this profile.
    pub cache_size_bytes: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            min_buffer_ms: 2_500,
            max_buffer_ms: 5_000,
            cache_size_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Media source bound to a player before preparing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    /// Content URI as supplied by the playable item.
    pub uri: String,
    /// Whether the source repeats indefinitely.
    pub looping: bool,
}

impl MediaSource {
    pub fn new(uri: impl Into<String>, looping: bool) -> Self {
        Self {
            uri: uri.into(),
            looping,
        }
    }
}

/// Engine-level playback state reported through [`PlayerEventListener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    /// No media prepared, or the player was stopped.
    Idle,
    /// Waiting for enough data to continue.
    Buffering,
    /// Able to play immediately.
    Ready,
    /// Reached the end of the media.
    Ended,
}

/// Error reported by the engine (decoder failure, network loss, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerError {
    pub message: String,
}

impl PlayerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for PlayerError {}

/// Identity of a registered event listener, used to unregister it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Audio controls exposed by a player.
pub trait VolumeController: PlatformSendSync {
    /// Set the output volume, normalized to `0.0..=1.0`.
    fn set_volume(&self, volume: f32);

    fn volume(&self) -> f32;

    fn set_muted(&self, muted: bool);

    fn is_muted(&self) -> bool;
}

/// Receives asynchronous engine callbacks.
///
/// Hosts may invoke these from any thread; implementations must not touch
/// item state directly.
pub trait PlayerEventListener: PlatformSendSync {
    /// Identity used by [`Player::remove_event_listener`].
    fn listener_id(&self) -> ListenerId;

    fn on_player_state_changed(&self, state: PlayerState);

    fn on_player_error(&self, error: PlayerError);

    fn on_loading_changed(&self, _is_loading: bool) {}
}

/// Called by the pool when a shared player is moved between surfaces.
pub trait AttachmentStateDelegate: PlatformSendSync {
    fn on_attach(&self, player: &dyn Player);

    fn on_detach(&self, player: &dyn Player);
}

/// Opaque media engine capability.
///
/// Commands never block and never fail synchronously; engine failures are
/// delivered through [`PlayerEventListener::on_player_error`].
pub trait Player: PlatformSendSync {
    /// Allocate engine resources. Idempotent.
    fn init(&self);

    fn attach(&self, surface: &Surface);

    fn detach(&self, surface: &Surface);

    fn is_attached(&self, surface: &Surface) -> bool;

    fn set_media_source(&self, source: MediaSource);

    fn seek(&self, position_ms: u64);

    /// Prepare the bound media source. With `force_reset` the engine discards
    /// its current position and buffers.
    fn prepare(&self, force_reset: bool);

    fn play(&self);

    fn pause(&self);

    fn stop(&self, reset: bool);

    fn playback_position_ms(&self) -> u64;

    /// Total media duration, or `None` while it is still unknown.
    fn duration_ms(&self) -> Option<u64>;

    fn is_playing(&self) -> bool;

    fn playback_state(&self) -> PlayerState;

    fn volume_controller(&self) -> &dyn VolumeController;

    fn add_event_listener(&self, listener: Arc<dyn PlayerEventListener>);

    fn remove_event_listener(&self, id: ListenerId);

    fn set_attachment_delegate(&self, delegate: Option<Arc<dyn AttachmentStateDelegate>>);
}

/// Pool of players shared by all playable items.
///
/// The pool is constructed by the host and injected into the feed controller;
/// there is no global instance.
pub trait PlayerProvider: PlatformSendSync {
    /// Return the player currently registered for `key`, if any.
    fn get_player(&self, config: &PlayerConfig, key: &PlayerKey) -> Option<Arc<dyn Player>>;

    /// Return the player registered for `key`, creating and registering one
    /// when none exists.
    fn get_or_init_player(&self, config: &PlayerConfig, key: &PlayerKey) -> Arc<dyn Player>;

    /// Give the player for `key` back to the pool for reuse or eviction.
    /// Returns `true` if a player was registered.
    fn unregister(&self, config: &PlayerConfig, key: &PlayerKey) -> bool;

    fn create_media_source(&self, config: &PlayerConfig, uri: &str, looping: bool) -> MediaSource;

    /// Free every pooled player. Called once when the feed is torn down.
    fn shutdown(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_key_concatenates_url_and_tag() {
        let key = PlayerKey::new("https://cdn.example.com/v/1.mp4", "#2");
        assert_eq!(key.as_str(), "https://cdn.example.com/v/1.mp4#2");
        assert_eq!(key.to_string(), key.as_str());
    }

    #[test]
    fn player_key_without_tag_is_url() {
        let key = PlayerKey::new("https://cdn.example.com/v/1.mp4", "");
        assert_eq!(key, PlayerKey::from("https://cdn.example.com/v/1.mp4"));
    }

    #[test]
    fn surfaces_are_unique() {
        let a = Surface::new();
        let b = Surface::new();
        assert_ne!(a, b);
        assert_eq!(a, Surface::with_id(a.id()));
    }

    #[test]
    fn default_player_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.name, "default");
        assert!(config.min_buffer_ms <= config.max_buffer_ms);
    }

    #[test]
    fn player_error_display() {
        let error = PlayerError::new("Source error: 404");
        assert_eq!(error.to_string(), "Source error: 404");
    }
}
