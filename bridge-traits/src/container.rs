//! Container and visibility abstractions.
//!
//! The feed core never measures views itself. The host UI reports scroll state
//! changes and answers how much of a surface is currently visible inside the
//! container bounds.

use serde::{Deserialize, Serialize};

use crate::{platform::PlatformSendSync, playback::Surface};

/// Raw scroll state of the container, as reported by the UI toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScrollState {
    #[default]
    Idle,
    /// The user is dragging the content.
    Dragging,
    /// The content is animating towards its final position.
    Settling,
}

/// Geometry oracle for playable surfaces.
pub trait VisibilityProvider: PlatformSendSync {
    /// Fraction of `surface` visible inside the container, in `0.0..=1.0`.
    /// Surfaces the container does not know about report `0.0`.
    fn visible_area_ratio(&self, surface: &Surface) -> f32;
}
