//! # Host Bridge Traits
//!
//! Capabilities the feed playback core consumes but never implements itself.
//!
//! ## Overview
//!
//! The core decides *when* items play. Everything that depends on the host
//! platform (the media engine, the player pool, where playback positions are
//! kept, how much of a view is on screen) is reached through the traits in this
//! crate and injected at construction time.
//!
//! ## Traits
//!
//! ### Media
//! - [`Player`](playback::Player) - Opaque media engine handle
//! - [`VolumeController`](playback::VolumeController) - Audio controls of a player
//! - [`PlayerEventListener`](playback::PlayerEventListener) - Engine state/error callbacks
//! - [`AttachmentStateDelegate`](playback::AttachmentStateDelegate) - Surface re-attachment callbacks
//! - [`PlayerProvider`](playback::PlayerProvider) - Pool of players keyed by config and key
//!
//! ### State & Geometry
//! - [`PlaybackInfoCache`](storage::PlaybackInfoCache) - Per-key position and volume state
//! - [`VisibilityProvider`](container::VisibilityProvider) - Visible area ratio of a surface
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! Player commands are fire-and-forget and do not return errors; engine
//! failures arrive through [`PlayerEventListener::on_player_error`]. Only the
//! logging sink, which may perform I/O, reports [`BridgeError`].
//!
//! ## Thread Safety
//!
//! Bridge traits require `Send + Sync` on native targets (see
//! [`platform::PlatformSendSync`]) because player callbacks may arrive on engine
//! threads. The core still only mutates item state on its command thread.
//!
//! [`PlayerEventListener::on_player_error`]: playback::PlayerEventListener::on_player_error

pub mod container;
pub mod error;
pub mod logging;
pub mod platform;
pub mod playback;
pub mod storage;

pub use error::BridgeError;

pub use container::{ScrollState, VisibilityProvider};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use playback::{
    AttachmentStateDelegate, ListenerId, MediaSource, Player, PlayerConfig, PlayerError,
    PlayerEventListener, PlayerKey, PlayerProvider, PlayerState, Surface, SurfaceId,
    VolumeController,
};
pub use storage::{PlaybackInfo, PlaybackInfoCache, VolumeInfo, DEFAULT_VOLUME};
