//! # Playable Item Options
//!
//! Per-item settings supplied when the host binds a feed slot.

use crate::error::{is_unit_fraction, PlaybackError, Result};
use serde::{Deserialize, Serialize};

/// Visibility fraction an item needs before it wants to play.
pub const DEFAULT_TRIGGER_OFFSET: f32 = 0.5;

/// Options of one playable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayableOptions {
    /// Repeat the media indefinitely. A looping item always replays, even
    /// after it reached its end.
    ///
    /// Default: false.
    #[serde(default)]
    pub looping: bool,

    /// Visible area ratio (`0.0..=1.0`) at which the item wants to play.
    ///
    /// Default: 0.5.
    #[serde(default = "default_trigger_offset")]
    pub trigger_offset: f32,

    /// Report progress through countdown notifications while playing.
    ///
    /// Default: false.
    #[serde(default)]
    pub timer_enabled: bool,

    /// Disambiguates two slots showing the same URL. Appended to the URL to
    /// form the player key.
    ///
    /// Default: empty.
    #[serde(default)]
    pub tag: String,
}

impl Default for PlayableOptions {
    fn default() -> Self {
        Self {
            looping: false,
            trigger_offset: default_trigger_offset(),
            timer_enabled: false,
            tag: String::new(),
        }
    }
}

impl PlayableOptions {
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_trigger_offset(mut self, trigger_offset: f32) -> Self {
        self.trigger_offset = trigger_offset;
        self
    }

    pub fn with_timer(mut self, enabled: bool) -> Self {
        self.timer_enabled = enabled;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Validate option values.
    pub fn validate(&self) -> Result<()> {
        if !is_unit_fraction(self.trigger_offset) {
            return Err(PlaybackError::InvalidTriggerOffset(self.trigger_offset));
        }

        Ok(())
    }
}

fn default_trigger_offset() -> f32 {
    DEFAULT_TRIGGER_OFFSET
}
