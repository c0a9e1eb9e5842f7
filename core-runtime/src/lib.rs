//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the feed playback core:
//! - Logging and tracing infrastructure
//! - Feed configuration with fail-fast validation
//! - Event bus for feed-wide notifications
//!
//! ## Overview
//!
//! `core-playback` depends on this crate for its configuration types and for
//! publishing item events. Hosts use it directly to install logging.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{
    AutoplayConfig, AutoplayMode, CountdownMode, ErrorPolicy, FeedConfig, FeedConfigBuilder,
    PlaybackTriggeringState, TimerConfig,
};
pub use error::{Error, Result};
pub use events::{EventBus, EventStream, FeedEvent, PlaybackState};
