//! # Feed Playback Core
//!
//! Visibility-driven playback scheduling for scrollable video feeds.
//!
//! ## Overview
//!
//! This crate decides which items of a feed play at any instant:
//! - Scroll and visibility policy ([`policy`])
//! - Concurrency policy over ordered candidates ([`scheduler`])
//! - Per-item lifecycle against a pooled player ([`playable`])
//! - Progress countdown timer ([`timer`])
//! - The controller hosts talk to ([`controller`])
//!
//! Media engines, player pools, geometry and persistence are host
//! capabilities from `bridge-traits`, injected through
//! [`core_runtime::config::FeedConfig`].

pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod message;
pub mod playable;
pub mod policy;
pub mod registry;
pub mod scheduler;
pub mod time_format;
pub mod timer;

pub use cache::LruPlaybackInfoCache;
pub use config::{PlayableOptions, DEFAULT_TRIGGER_OFFSET};
pub use controller::{FeedController, ItemBinding};
pub use error::{PlaybackError, Result};
pub use playable::{ItemPhase, NoopObserver, PlayableItem, PlaybackObserver, StartGate};
pub use registry::{ItemId, ItemRegistry};
pub use scheduler::{Playable, ScheduleOutcome, SchedulePass};
pub use time_format::format_playback_time;

pub use core_runtime::config::{
    AutoplayMode, CountdownMode, ErrorPolicy, FeedConfig, PlaybackTriggeringState, TimerConfig,
};
pub use core_runtime::events::{FeedEvent, PlaybackState};
