//! # Visibility & Scroll Policy
//!
//! Pure decisions feeding the scheduler: whether the container's current
//! scroll phase allows new playback to start, and whether an item is visible
//! enough to want to play.

use bridge_traits::ScrollState;
use core_runtime::config::PlaybackTriggeringState;
use std::collections::HashSet;

/// Map a raw container scroll state to its triggering phase.
pub fn triggering_state_for(scroll_state: ScrollState) -> PlaybackTriggeringState {
    match scroll_state {
        ScrollState::Dragging => PlaybackTriggeringState::Dragging,
        ScrollState::Settling => PlaybackTriggeringState::Settling,
        ScrollState::Idle => PlaybackTriggeringState::Idling,
    }
}

/// Whether the scheduler may start new playback in the current scroll phase.
///
/// The mapped phase must be in `triggering_states`. A drag only qualifies
/// while the content is not moving under the finger (`is_scrolling == false`).
pub fn should_reevaluate(
    scroll_state: ScrollState,
    triggering_states: &HashSet<PlaybackTriggeringState>,
    is_scrolling: bool,
) -> bool {
    let state = triggering_state_for(scroll_state);
    if !triggering_states.contains(&state) {
        return false;
    }

    match state {
        PlaybackTriggeringState::Dragging => !is_scrolling,
        PlaybackTriggeringState::Settling | PlaybackTriggeringState::Idling => true,
    }
}

/// An item wants to play once its visible area ratio reaches its trigger offset.
pub fn wants_to_play(visible_area_ratio: f32, trigger_offset: f32) -> bool {
    visible_area_ratio >= trigger_offset
}

/// Tracks page-scroll callbacks to tell a held drag from a moving one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollTracker {
    previous_delta_x: i32,
    previous_delta_y: f32,
    scrolling: bool,
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a page-scroll callback and return whether the content is moving.
    ///
    /// `offset` is the fractional page offset, `offset_pixels` the same offset
    /// in pixels. Both previous deltas take the pixel offset afterwards.
    pub fn on_page_scrolled(&mut self, offset: f32, offset_pixels: i32) -> bool {
        self.scrolling = self.previous_delta_x != offset_pixels
            || (self.previous_delta_y - offset).abs() > offset_pixels as f32;

        self.previous_delta_x = offset_pixels;
        self.previous_delta_y = offset_pixels as f32;

        self.scrolling
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_runtime::config::{triggering_states_or_default, DEFAULT_PLAYBACK_TRIGGERING_STATES};

    fn defaults() -> HashSet<PlaybackTriggeringState> {
        DEFAULT_PLAYBACK_TRIGGERING_STATES.into_iter().collect()
    }

    #[test]
    fn test_scroll_state_mapping() {
        assert_eq!(
            triggering_state_for(ScrollState::Dragging),
            PlaybackTriggeringState::Dragging
        );
        assert_eq!(
            triggering_state_for(ScrollState::Settling),
            PlaybackTriggeringState::Settling
        );
        assert_eq!(
            triggering_state_for(ScrollState::Idle),
            PlaybackTriggeringState::Idling
        );
    }

    #[test]
    fn test_default_set_rejects_settling() {
        assert!(!should_reevaluate(ScrollState::Settling, &defaults(), false));
    }

    #[test]
    fn test_default_set_accepts_idle() {
        assert!(should_reevaluate(ScrollState::Idle, &defaults(), false));
        assert!(should_reevaluate(ScrollState::Idle, &defaults(), true));
    }

    #[test]
    fn test_drag_requires_still_content() {
        assert!(should_reevaluate(ScrollState::Dragging, &defaults(), false));
        assert!(!should_reevaluate(ScrollState::Dragging, &defaults(), true));
    }

    #[test]
    fn test_custom_set() {
        let settling_only = triggering_states_or_default(&[PlaybackTriggeringState::Settling]);
        assert!(should_reevaluate(ScrollState::Settling, &settling_only, true));
        assert!(!should_reevaluate(ScrollState::Idle, &settling_only, false));
        assert!(!should_reevaluate(ScrollState::Dragging, &settling_only, false));
    }

    #[test]
    fn test_wants_to_play_threshold() {
        assert!(wants_to_play(0.5, 0.5));
        assert!(wants_to_play(1.0, 0.5));
        assert!(!wants_to_play(0.49, 0.5));
        assert!(wants_to_play(0.0, 0.0));
    }

    #[test]
    fn test_scroll_tracker() {
        let mut tracker = ScrollTracker::new();

        // Content at rest.
        assert!(!tracker.on_page_scrolled(0.0, 0));

        // The page starts moving.
        assert!(tracker.on_page_scrolled(0.1, 120));
        assert!(tracker.is_scrolling());

        // Same pixel offset reported again: the finger holds still.
        assert!(!tracker.on_page_scrolled(0.1, 120));

        tracker.reset();
        assert!(!tracker.is_scrolling());
    }
}
