//! Workspace facade crate.
//!
//! Host applications can depend on `feed-workspace` alone and pick the pieces
//! they need through feature flags instead of wiring each crate individually.
//! The `playback` feature (on by default) pulls in the feed scheduler.

pub use bridge_traits;
pub use core_runtime;

#[cfg(feature = "playback")]
pub use core_playback;
