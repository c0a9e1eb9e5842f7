//! # Feed Configuration Module
//!
//! Provides configuration management for the feed playback core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `FeedConfig`
//! instance that holds every injected collaborator and the autoplay policy
//! settings. It enforces fail-fast validation so that a feed can never be
//! created with a missing bridge or an out-of-range setting.
//!
//! ## Required Dependencies
//!
//! - `PlayerProvider` - Pool handing out players per content key
//! - `PlaybackInfoCache` - Per-key position and volume persistence
//! - `VisibilityProvider` - Visible area ratio of item surfaces
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{AutoplayMode, FeedConfig};
//! use std::sync::Arc;
//!
//! let config = FeedConfig::builder()
//!     .player_provider(Arc::new(MyPlayerPool::new()))
//!     .playback_info_cache(Arc::new(MyCache::default()))
//!     .visibility_provider(Arc::new(MyGeometry))
//!     .autoplay_mode(AutoplayMode::OneAtATime)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::EventBus;
use bridge_traits::{PlaybackInfoCache, PlayerConfig, PlayerProvider, VisibilityProvider};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound for the progress timer cadence.
pub const MAX_TIMER_INTERVAL: Duration = Duration::from_secs(60);

/// Concurrency policy of the playback scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoplayMode {
    /// At most one item plays; the first qualifying item in container order wins.
    #[default]
    OneAtATime,
    /// Every qualifying item plays.
    MultipleSimultaneously,
}

/// Scroll phases during which the scheduler may start new playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackTriggeringState {
    Dragging,
    Settling,
    Idling,
}

/// Triggering states used when none are configured.
pub const DEFAULT_PLAYBACK_TRIGGERING_STATES: [PlaybackTriggeringState; 2] = [
    PlaybackTriggeringState::Dragging,
    PlaybackTriggeringState::Idling,
];

/// Build a triggering set from `states`, falling back to
/// [`DEFAULT_PLAYBACK_TRIGGERING_STATES`] when `states` is empty.
pub fn triggering_states_or_default(
    states: &[PlaybackTriggeringState],
) -> HashSet<PlaybackTriggeringState> {
    if states.is_empty() {
        DEFAULT_PLAYBACK_TRIGGERING_STATES.into_iter().collect()
    } else {
        states.iter().copied().collect()
    }
}

/// What the progress timer reports on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownMode {
    /// Current playback position.
    #[default]
    Elapsed,
    /// Duration minus current position.
    Remaining,
}

/// What an item does after its player reports an error.
///
/// The `Error` state is always emitted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Report only; the caller decides how to recover.
    #[default]
    Report,
    /// Stop the item, keeping its player registered in the pool.
    Stop,
    /// Release the item's player and forget its playback info.
    Release,
}

/// Progress timer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Delay between two countdown notifications.
    ///
    /// Default: 1 second.
    #[serde(default = "default_timer_interval")]
    pub interval: Duration,

    /// Default: elapsed time.
    #[serde(default)]
    pub mode: CountdownMode,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            interval: default_timer_interval(),
            mode: CountdownMode::default(),
        }
    }
}

impl TimerConfig {
    /// Cadence used by list-style feeds that display the remaining time.
    pub fn remaining() -> Self {
        Self {
            interval: Duration::from_millis(500),
            mode: CountdownMode::Remaining,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::Config(
                "Timer interval must be greater than 0ms".to_string(),
            ));
        }

        if self.interval > MAX_TIMER_INTERVAL {
            return Err(Error::Config(
                "Timer interval exceeds maximum of 60 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_timer_interval() -> Duration {
    Duration::from_secs(1)
}

/// Autoplay policy of a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoplayConfig {
    pub mode: AutoplayMode,
    pub enabled: bool,
    pub triggering_states: HashSet<PlaybackTriggeringState>,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            mode: AutoplayMode::default(),
            enabled: true,
            triggering_states: triggering_states_or_default(&[]),
        }
    }
}

/// Feed configuration.
///
/// Holds the injected collaborators and the policy settings a feed controller
/// starts with. Use [`FeedConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct FeedConfig {
    /// Profile players are pooled under
    pub player_config: PlayerConfig,

    /// Player pool (required)
    pub player_provider: Arc<dyn PlayerProvider>,

    /// Playback position/volume persistence (required)
    pub playback_info_cache: Arc<dyn PlaybackInfoCache>,

    /// Geometry oracle (required)
    pub visibility_provider: Arc<dyn VisibilityProvider>,

    pub autoplay: AutoplayConfig,

    pub timer: TimerConfig,

    pub error_policy: ErrorPolicy,

    /// Optional bus mirroring item notifications to other subscribers
    pub event_bus: Option<EventBus>,
}

impl std::fmt::Debug for FeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedConfig")
            .field("player_config", &self.player_config)
            .field("player_provider", &"PlayerProvider { ... }")
            .field("playback_info_cache", &"PlaybackInfoCache { ... }")
            .field("visibility_provider", &"VisibilityProvider { ... }")
            .field("autoplay", &self.autoplay)
            .field("timer", &self.timer)
            .field("error_policy", &self.error_policy)
            .field("event_bus", &self.event_bus)
            .finish()
    }
}

impl FeedConfig {
    pub fn builder() -> FeedConfigBuilder {
        FeedConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.player_config.name.is_empty() {
            return Err(Error::Config(
                "Player config name cannot be empty".to_string(),
            ));
        }

        if self.player_config.min_buffer_ms > self.player_config.max_buffer_ms {
            return Err(Error::Config(
                "min_buffer_ms cannot exceed max_buffer_ms".to_string(),
            ));
        }

        if self.autoplay.triggering_states.is_empty() {
            return Err(Error::Config(
                "At least one playback triggering state is required".to_string(),
            ));
        }

        self.timer.validate()
    }
}

fn capability_missing(capability: &str, message: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: message.to_string(),
    }
}

/// Builder for constructing [`FeedConfig`] instances.
#[derive(Default)]
pub struct FeedConfigBuilder {
    player_config: Option<PlayerConfig>,
    player_provider: Option<Arc<dyn PlayerProvider>>,
    playback_info_cache: Option<Arc<dyn PlaybackInfoCache>>,
    visibility_provider: Option<Arc<dyn VisibilityProvider>>,
    autoplay: AutoplayConfig,
    timer: TimerConfig,
    error_policy: ErrorPolicy,
    event_bus: Option<EventBus>,
}

impl FeedConfigBuilder {
    /// Sets the pool profile. Default: [`PlayerConfig::default`].
    pub fn player_config(mut self, config: PlayerConfig) -> Self {
        self.player_config = Some(config);
        self
    }

    /// Sets the player pool (required).
    pub fn player_provider(mut self, provider: Arc<dyn PlayerProvider>) -> Self {
        self.player_provider = Some(provider);
        self
    }

    /// Sets the playback info cache (required).
    ///
    /// Hosts without their own persistence can use the LRU cache shipped with
    /// `core-playback`.
    pub fn playback_info_cache(mut self, cache: Arc<dyn PlaybackInfoCache>) -> Self {
        self.playback_info_cache = Some(cache);
        self
    }

    /// Sets the geometry oracle (required).
    pub fn visibility_provider(mut self, provider: Arc<dyn VisibilityProvider>) -> Self {
        self.visibility_provider = Some(provider);
        self
    }

    /// Default: [`AutoplayMode::OneAtATime`]
    pub fn autoplay_mode(mut self, mode: AutoplayMode) -> Self {
        self.autoplay.mode = mode;
        self
    }

    /// Default: true
    pub fn autoplay_enabled(mut self, enabled: bool) -> Self {
        self.autoplay.enabled = enabled;
        self
    }

    /// Sets the scroll phases that may start playback. An empty slice restores
    /// the default `{Dragging, Idling}`.
    pub fn playback_triggering_states(mut self, states: &[PlaybackTriggeringState]) -> Self {
        self.autoplay.triggering_states = triggering_states_or_default(states);
        self
    }

    pub fn timer(mut self, timer: TimerConfig) -> Self {
        self.timer = timer;
        self
    }

    /// Default: [`ErrorPolicy::Report`]
    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Builds the final `FeedConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] when a required bridge was not
    /// provided and [`Error::Config`] when a setting is out of range.
    pub fn build(self) -> Result<FeedConfig> {
        let player_provider = self.player_provider.ok_or_else(|| {
            capability_missing(
                "PlayerProvider",
                "A player pool is required to acquire players. \
                 Inject the host's pool with .player_provider().",
            )
        })?;

        let playback_info_cache = self.playback_info_cache.ok_or_else(|| {
            capability_missing(
                "PlaybackInfoCache",
                "A playback info cache is required to persist positions. \
                 Inject one with .playback_info_cache() (core-playback ships an LRU cache).",
            )
        })?;

        let visibility_provider = self.visibility_provider.ok_or_else(|| {
            capability_missing(
                "VisibilityProvider",
                "A visibility provider is required to measure item surfaces. \
                 Inject the container geometry with .visibility_provider().",
            )
        })?;

        let config = FeedConfig {
            player_config: self.player_config.unwrap_or_default(),
            player_provider,
            playback_info_cache,
            visibility_provider,
            autoplay: self.autoplay,
            timer: self.timer,
            error_policy: self.error_policy,
            event_bus: self.event_bus,
        };

        config.validate()?;

        Ok(config)
    }
}
