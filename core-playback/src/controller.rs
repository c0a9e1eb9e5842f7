//! # Feed Controller
//!
//! Owns the playable items of one scrollable container and runs the
//! visibility-driven scheduler over them.
//!
//! ## Overview
//!
//! The host forwards three kinds of input:
//!
//! - **Binding**: slots are attached, given surfaces, recycled and detached
//!   ([`attach_item`](FeedController::attach_item),
//!   [`bind_surface`](FeedController::bind_surface), ...).
//! - **Scroll and lifecycle signals**: page scroll callbacks and screen
//!   lifecycle hooks re-run the scheduler or apply a bulk command.
//! - **Marshaled callbacks**: player events and timer ticks queued by other
//!   threads, drained with [`pump`](FeedController::pump) or awaited with
//!   [`process_next`](FeedController::process_next).
//!
//! Everything runs on the thread that owns the controller.
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::{FeedController, ItemBinding, PlayableOptions};
//!
//! let mut feed = FeedController::new(config)?;
//! let first = feed.attach_item(
//!     ItemBinding::new("https://cdn.example.com/v/1.mp4")
//!         .at_position(0)
//!         .with_surface(surface)
//!         .with_options(PlayableOptions::default().with_timer(true)),
//! )?;
//!
//! feed.on_attached_to_window();
//! loop {
//!     feed.process_next().await;
//! }
//! ```

use crate::config::PlayableOptions;
use crate::error::Result;
use crate::message::{self, FeedMessage, MessageReceiver};
use crate::playable::{ItemContext, NoopObserver, PlayableItem, PlaybackObserver, StartGate};
use crate::policy::{self, ScrollTracker};
use crate::registry::{ItemId, ItemRegistry};
use crate::scheduler::{self, ScheduleOutcome, SchedulePass};

use bridge_traits::{ScrollState, Surface};
use core_runtime::config::{
    triggering_states_or_default, AutoplayMode, FeedConfig, PlaybackTriggeringState,
};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace};

/// Everything needed to attach one slot to the feed.
pub struct ItemBinding {
    url: String,
    options: PlayableOptions,
    position: usize,
    surface: Option<Surface>,
    observer: Arc<dyn PlaybackObserver>,
    start_gate: Option<Arc<dyn StartGate>>,
}

impl ItemBinding {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            options: PlayableOptions::default(),
            position: 0,
            surface: None,
            observer: Arc::new(NoopObserver),
            start_gate: None,
        }
    }

    pub fn with_options(mut self, options: PlayableOptions) -> Self {
        self.options = options;
        self
    }

    /// Index of the slot in container order. Default: 0.
    pub fn at_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PlaybackObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_start_gate(mut self, gate: Arc<dyn StartGate>) -> Self {
        self.start_gate = Some(gate);
        self
    }
}

pub struct FeedController {
    context: ItemContext,
    items: ItemRegistry<PlayableItem>,
    receiver: MessageReceiver,
    autoplay_mode: AutoplayMode,
    autoplay_enabled: bool,
    triggering_states: HashSet<PlaybackTriggeringState>,
    scroll_state: ScrollState,
    scroll_tracker: ScrollTracker,
}

impl FeedController {
    /// Create a controller from a validated configuration.
    pub fn new(config: FeedConfig) -> Result<Self> {
        config.validate()?;

        let (sender, receiver) = message::channel();
        let context = ItemContext::from_config(&config, sender);

        info!(
            mode = ?config.autoplay.mode,
            autoplay = config.autoplay.enabled,
            "Feed controller created"
        );

        Ok(Self {
            context,
            items: ItemRegistry::new(),
            receiver,
            autoplay_mode: config.autoplay.mode,
            autoplay_enabled: config.autoplay.enabled,
            triggering_states: config.autoplay.triggering_states,
            scroll_state: ScrollState::Idle,
            scroll_tracker: ScrollTracker::new(),
        })
    }

    // ========================================================================
    // Item binding
    // ========================================================================

    /// Attach a slot. Fails if its options are invalid.
    #[instrument(skip_all, fields(position = binding.position))]
    pub fn attach_item(&mut self, binding: ItemBinding) -> Result<ItemId> {
        let ItemBinding {
            url,
            options,
            position,
            surface,
            observer,
            start_gate,
        } = binding;

        let context = self.context.clone();
        let id = self.items.try_insert_with(|id| {
            let mut item =
                PlayableItem::new(id, url, options, observer, context)?.with_position(position);
            item.set_surface(surface);
            item.set_start_gate(start_gate);
            Ok::<_, crate::error::PlaybackError>(item)
        })?;

        debug!(%id, "Item attached");
        Ok(id)
    }

    /// Release a slot's player and forget the slot.
    #[instrument(skip(self))]
    pub fn detach_item(&mut self, id: ItemId) -> bool {
        match self.items.remove(id) {
            Some(mut item) => {
                item.release();
                debug!(key = %item.key(), "Item detached");
                true
            }
            None => false,
        }
    }

    /// Give a slot a live surface. Returns `false` for unknown ids.
    pub fn bind_surface(&mut self, id: ItemId, surface: Surface) -> bool {
        match self.items.get_mut(id) {
            Some(item) => {
                item.set_surface(Some(surface));
                true
            }
            None => false,
        }
    }

    /// Recycle a slot's view: release its player, then drop the surface.
    pub fn unbind_surface(&mut self, id: ItemId) -> bool {
        match self.items.get_mut(id) {
            Some(item) => {
                item.release();
                item.set_surface(None);
                true
            }
            None => false,
        }
    }

    pub fn set_item_position(&mut self, id: ItemId, position: usize) -> bool {
        match self.items.get_mut(id) {
            Some(item) => {
                item.set_position(position);
                true
            }
            None => false,
        }
    }

    pub fn item(&self, id: ItemId) -> Option<&PlayableItem> {
        self.items.get(id)
    }

    /// Direct access for UI commands such as tap-to-pause.
    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut PlayableItem> {
        self.items.get_mut(id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    // ========================================================================
    // Autoplay settings
    // ========================================================================

    pub fn autoplay_mode(&self) -> AutoplayMode {
        self.autoplay_mode
    }

    /// Change the concurrency mode, re-running the scheduler when autoplay is
    /// enabled.
    #[instrument(skip(self))]
    pub fn set_autoplay_mode(&mut self, mode: AutoplayMode) {
        self.autoplay_mode = mode;
        if self.autoplay_enabled {
            self.start_playback();
        }
    }

    pub fn is_autoplay_enabled(&self) -> bool {
        self.autoplay_enabled
    }

    /// Enabling starts playback right away; disabling stops every item.
    #[instrument(skip(self))]
    pub fn set_autoplay_enabled(&mut self, enabled: bool) {
        self.autoplay_enabled = enabled;
        if enabled {
            self.start_playback();
        } else {
            self.stop_playback();
        }
    }

    pub fn playback_triggering_states(&self) -> &HashSet<PlaybackTriggeringState> {
        &self.triggering_states
    }

    /// Replace the triggering set. An empty slice restores the default
    /// `{Dragging, Idling}`.
    pub fn set_playback_triggering_states(&mut self, states: &[PlaybackTriggeringState]) {
        self.triggering_states = triggering_states_or_default(states);
    }

    // ========================================================================
    // Playback commands
    // ========================================================================

    /// Re-run the scheduler allowing new playback to start.
    pub fn start_playback(&mut self) -> ScheduleOutcome {
        self.reschedule(true)
    }

    pub fn stop_playback(&mut self) -> usize {
        scheduler::stop_all(self.candidates())
    }

    pub fn pause_playback(&mut self) -> usize {
        scheduler::pause_all(self.candidates())
    }

    pub fn release_all(&mut self) -> usize {
        scheduler::release_all(self.candidates())
    }

    fn reschedule(&mut self, allow_start: bool) -> ScheduleOutcome {
        let pass = SchedulePass {
            mode: self.autoplay_mode,
            autoplay_enabled: self.autoplay_enabled,
            allow_start,
        };
        let outcome = scheduler::reschedule(self.candidates(), pass);
        trace!(?outcome, allow_start, "Rescheduled feed");
        outcome
    }

    /// Items in container order.
    fn candidates(&mut self) -> Vec<&mut PlayableItem> {
        let mut items: Vec<&mut PlayableItem> = self.items.values_mut().collect();
        items.sort_by_key(|item| item.position());
        items
    }

    // ========================================================================
    // Container signals
    // ========================================================================

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll_state
    }

    pub fn on_page_scroll_state_changed(&mut self, state: ScrollState) -> ScheduleOutcome {
        self.scroll_state = state;
        let allow_start = self.can_play();
        self.reschedule(allow_start)
    }

    /// Page scroll callback: `offset` is the fractional page offset and
    /// `offset_pixels` the same offset in pixels.
    pub fn on_page_scrolled(
        &mut self,
        position: usize,
        offset: f32,
        offset_pixels: i32,
    ) -> ScheduleOutcome {
        let scrolling = self.scroll_tracker.on_page_scrolled(offset, offset_pixels);
        trace!(position, offset, offset_pixels, scrolling, "Page scrolled");
        let allow_start = self.can_play();
        self.reschedule(allow_start)
    }

    fn can_play(&self) -> bool {
        policy::should_reevaluate(
            self.scroll_state,
            &self.triggering_states,
            self.scroll_tracker.is_scrolling(),
        )
    }

    // ========================================================================
    // Screen lifecycle
    // ========================================================================

    #[instrument(skip(self))]
    pub fn on_resume(&mut self) {
        info!("Feed resumed");
        self.start_playback();
    }

    #[instrument(skip(self))]
    pub fn on_pause(&mut self) {
        info!("Feed paused");
        self.pause_playback();
    }

    #[instrument(skip(self))]
    pub fn on_stop(&mut self) {
        info!("Feed stopped");
        self.stop_playback();
    }

    #[instrument(skip(self))]
    pub fn on_destroy(&mut self) {
        info!("Feed destroyed");
        self.release_all();
    }

    #[instrument(skip(self))]
    pub fn on_attached_to_window(&mut self) {
        info!("Feed attached to window");
        self.start_playback();
    }

    #[instrument(skip(self))]
    pub fn on_detached_from_window(&mut self) {
        info!("Feed detached from window");
        self.release_all();
    }

    // ========================================================================
    // Marshaled callbacks
    // ========================================================================

    /// Dispatch every queued player event and timer tick. Returns the number
    /// of messages handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.receiver.try_recv() {
            self.dispatch(message);
            handled += 1;
        }
        handled
    }

    /// Wait for the next queued message and dispatch it.
    ///
    /// The controller keeps a sender of its own, so the channel stays open for
    /// as long as the controller lives.
    pub async fn process_next(&mut self) {
        if let Some(message) = self.receiver.recv().await {
            self.dispatch(message);
        }
    }

    fn dispatch(&mut self, message: FeedMessage) {
        let id = message.item();
        match self.items.get_mut(id) {
            Some(item) => item.handle_message(message),
            None => trace!(%id, "Dropping message for detached item"),
        }
    }

    /// Release every item and shut the player pool down.
    pub fn shutdown(mut self) {
        info!("Shutting down feed");
        self.release_all();
        self.context.provider.shutdown();
    }
}

impl fmt::Debug for FeedController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedController")
            .field("items", &self.items)
            .field("autoplay_mode", &self.autoplay_mode)
            .field("autoplay_enabled", &self.autoplay_enabled)
            .field("triggering_states", &self.triggering_states)
            .field("scroll_state", &self.scroll_state)
            .finish()
    }
}
