//! # Playable Item State Machine
//!
//! One [`PlayableItem`] per bound feed slot. It acquires a pooled player for
//! its key, restores and persists [`PlaybackInfo`], drives the player through
//! start / restart / pause / stop / release, and reports transitions upward.
//!
//! ## Collaborators
//!
//! The item is composed of small capability objects instead of implementing
//! every host protocol itself:
//!
//! - [`SurfaceDelegate`] re-attaches the item's surface when the pool hands
//!   the shared player around.
//! - [`EventForwarder`] turns engine callbacks into [`FeedMessage`]s.
//! - [`PlaybackObserver`] receives the upward notifications.
//! - [`StartGate`] can veto replaying media that already ended.
//!
//! ## Threading
//!
//! Every method runs on the feed's command thread. Engine callbacks and timer
//! ticks reach the item only through [`PlayableItem::handle_message`].

use crate::config::PlayableOptions;
use crate::error::{is_unit_fraction, PlaybackError, Result};
use crate::message::{FeedMessage, MessageSender};
use crate::registry::ItemId;
use crate::scheduler::Playable;
use crate::time_format::format_playback_millis;
use crate::timer::ProgressTimer;
use crate::policy;

use bridge_traits::platform::PlatformSendSync;
use bridge_traits::{
    AttachmentStateDelegate, ListenerId, PlaybackInfo, PlaybackInfoCache, Player, PlayerConfig,
    PlayerError, PlayerEventListener, PlayerKey, PlayerProvider, PlayerState, Surface,
    VisibilityProvider,
};
use core_runtime::config::{CountdownMode, ErrorPolicy, FeedConfig, TimerConfig};
use core_runtime::events::{EventBus, FeedEvent, PlaybackState};
use core_runtime::logging::redact_url;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, trace};

// ============================================================================
// Capability objects
// ============================================================================

/// Receives an item's upward notifications on the command thread.
pub trait PlaybackObserver: PlatformSendSync {
    fn on_state_changed(&self, state: PlaybackState);

    /// Progress timer tick, already formatted for display.
    fn on_count_down_time(&self, _display: &str) {}

    fn on_playability_state_changed(&self, _is_playable: bool) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PlaybackObserver for NoopObserver {
    fn on_state_changed(&self, _state: PlaybackState) {}
}

/// Last-moment veto on replaying media that already reached its end.
///
/// Consulted only for non-looping items whose persisted info says `ended`.
pub trait StartGate: PlatformSendSync {
    fn can_start_playing(&self) -> bool;
}

impl<F> StartGate for F
where
    F: Fn() -> bool + PlatformSendSync,
{
    fn can_start_playing(&self) -> bool {
        self()
    }
}

/// Attaches the item's current surface whenever the pool re-attaches the
/// shared player.
pub struct SurfaceDelegate {
    surface: Arc<RwLock<Option<Surface>>>,
}

impl AttachmentStateDelegate for SurfaceDelegate {
    fn on_attach(&self, player: &dyn Player) {
        if let Some(surface) = self.surface.read().as_ref() {
            player.attach(surface);
        }
    }

    fn on_detach(&self, player: &dyn Player) {
        if let Some(surface) = self.surface.read().as_ref() {
            player.detach(surface);
        }
    }
}

/// Engine listener that enqueues callbacks for the command thread.
pub struct EventForwarder {
    item: ItemId,
    id: ListenerId,
    sender: MessageSender,
}

impl EventForwarder {
    fn new(item: ItemId, sender: MessageSender) -> Self {
        Self {
            item,
            id: ListenerId::new(),
            sender,
        }
    }
}

impl PlayerEventListener for EventForwarder {
    fn listener_id(&self) -> ListenerId {
        self.id
    }

    fn on_player_state_changed(&self, state: PlayerState) {
        let message = FeedMessage::PlayerStateChanged {
            item: self.item,
            listener: self.id,
            state,
        };
        if self.sender.send(message).is_err() {
            trace!(item = %self.item, "Feed closed, dropping player state");
        }
    }

    fn on_player_error(&self, error: PlayerError) {
        let message = FeedMessage::PlayerError {
            item: self.item,
            listener: self.id,
            error,
        };
        if self.sender.send(message).is_err() {
            trace!(item = %self.item, "Feed closed, dropping player error");
        }
    }
}

// ============================================================================
// Shared item context
// ============================================================================

/// Collaborators shared by every item of a feed.
#[derive(Clone)]
pub struct ItemContext {
    pub player_config: PlayerConfig,
    pub provider: Arc<dyn PlayerProvider>,
    pub cache: Arc<dyn PlaybackInfoCache>,
    pub visibility: Arc<dyn VisibilityProvider>,
    pub timer: TimerConfig,
    pub error_policy: ErrorPolicy,
    pub event_bus: Option<EventBus>,
    pub sender: MessageSender,
}

impl ItemContext {
    pub fn from_config(config: &FeedConfig, sender: MessageSender) -> Self {
        Self {
            player_config: config.player_config.clone(),
            provider: Arc::clone(&config.player_provider),
            cache: Arc::clone(&config.playback_info_cache),
            visibility: Arc::clone(&config.visibility_provider),
            timer: config.timer,
            error_policy: config.error_policy,
            event_bus: config.event_bus.clone(),
            sender,
        }
    }
}

/// Where the item stands with respect to its player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemPhase {
    /// No player bound by this item.
    Idle,
    /// Player bound and attached, playback not started.
    Attached,
    Playing,
    Paused,
    Stopped,
}

// ============================================================================
// Playable item
// ============================================================================

pub struct PlayableItem {
    id: ItemId,
    url: String,
    key: PlayerKey,
    options: PlayableOptions,
    position: usize,
    surface: Arc<RwLock<Option<Surface>>>,
    delegate: Arc<SurfaceDelegate>,
    listener: Option<Arc<EventForwarder>>,
    observer: Arc<dyn PlaybackObserver>,
    start_gate: Option<Arc<dyn StartGate>>,
    timer: ProgressTimer,
    phase: ItemPhase,
    last_state: PlaybackState,
    context: ItemContext,
}

impl PlayableItem {
    /// Build an item for `url`. Fails if the URL is blank or the options are
    /// invalid.
    pub fn new(
        id: ItemId,
        url: impl Into<String>,
        options: PlayableOptions,
        observer: Arc<dyn PlaybackObserver>,
        context: ItemContext,
    ) -> Result<Self> {
        options.validate()?;

        let url = url.into();
        if url.trim().is_empty() {
            return Err(PlaybackError::InvalidConfiguration(
                "content URL must not be empty".to_string(),
            ));
        }
        let key = PlayerKey::new(&url, &options.tag);
        let surface = Arc::new(RwLock::new(None));
        let delegate = Arc::new(SurfaceDelegate {
            surface: Arc::clone(&surface),
        });
        let timer = ProgressTimer::new(context.timer);

        Ok(Self {
            id,
            url,
            key,
            options,
            position: 0,
            surface,
            delegate,
            listener: None,
            observer,
            start_gate: None,
            timer,
            phase: ItemPhase::Idle,
            last_state: PlaybackState::Idle,
            context,
        })
    }

    pub fn with_start_gate(mut self, gate: Arc<dyn StartGate>) -> Self {
        self.start_gate = Some(gate);
        self
    }

    pub fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn key(&self) -> &PlayerKey {
        &self.key
    }

    pub fn options(&self) -> &PlayableOptions {
        &self.options
    }

    /// Index of the item in container order.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    pub fn phase(&self) -> ItemPhase {
        self.phase
    }

    /// Last state reported to the observer.
    pub fn last_state(&self) -> PlaybackState {
        self.last_state
    }

    pub fn surface(&self) -> Option<Surface> {
        self.surface.read().clone()
    }

    pub fn set_surface(&mut self, surface: Option<Surface>) {
        *self.surface.write() = surface;
    }

    pub fn set_start_gate(&mut self, gate: Option<Arc<dyn StartGate>>) {
        self.start_gate = gate;
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    // ------------------------------------------------------------------------
    // Lifecycle commands
    // ------------------------------------------------------------------------

    /// Acquire the player and start playback from the persisted position.
    ///
    /// Media that already ended is only replayed when the item loops or the
    /// start gate allows it; otherwise the player stays attached and nothing
    /// is reported.
    pub fn start(&mut self) {
        let Some(surface) = self.surface() else {
            return;
        };

        let info = self.playback_info();
        self.put_playback_info(info);

        let should_play = self.options.looping || !info.ended || self.can_start_playing();

        let player = self
            .context
            .provider
            .get_or_init_player(&self.context.player_config, &self.key);
        self.bind_player(&*player, &surface, &info);
        self.install_listener(&*player);

        debug!(key = %self.key, should_play, position_ms = info.playback_position_ms, "Starting playback");

        if !should_play {
            self.timer.stop();
            self.phase = ItemPhase::Attached;
            return;
        }

        player.seek(info.playback_position_ms);
        player.prepare(false);
        player.play();
        self.start_timer();
        self.phase = ItemPhase::Playing;

        let state = if player.playback_state() == PlayerState::Ready {
            PlaybackState::Ready
        } else {
            PlaybackState::Started
        };
        self.notify_state(state);
    }

    /// Play from the beginning regardless of the persisted state.
    pub fn restart(&mut self) {
        let Some(surface) = self.surface() else {
            return;
        };

        let info = self.playback_info().with_position(0);
        self.put_playback_info(info);

        let player = self
            .context
            .provider
            .get_or_init_player(&self.context.player_config, &self.key);
        self.bind_player(&*player, &surface, &info);
        self.install_listener(&*player);

        debug!(key = %self.key, "Restarting playback");

        player.seek(0);
        player.prepare(false);
        player.play();
        self.start_timer();
        self.phase = ItemPhase::Playing;
        self.notify_state(PlaybackState::Restarted);
    }

    /// Pause and remember the current position.
    ///
    /// Pausing an item that is already paused does nothing.
    pub fn pause(&mut self) {
        if self.surface().is_none() || self.phase == ItemPhase::Paused {
            return;
        }
        let Some(player) = self.player() else {
            return;
        };

        player.pause();
        self.remove_listener(&*player);

        let info = self
            .playback_info()
            .with_position(player.playback_position_ms());
        self.put_playback_info(info);
        self.timer.stop();
        self.phase = ItemPhase::Paused;

        debug!(key = %self.key, position_ms = info.playback_position_ms, "Paused playback");
        self.notify_state(PlaybackState::Paused);
    }

    /// Stop, detach and rewind. The player stays registered in the pool.
    pub fn stop(&mut self) {
        let Some(surface) = self.surface() else {
            return;
        };
        let Some(player) = self.player() else {
            return;
        };

        player.pause();
        player.detach(&surface);
        player.stop(true);
        player.set_attachment_delegate(None);
        self.remove_listener(&*player);

        let info = self.playback_info().with_position(0);
        self.put_playback_info(info);
        self.timer.stop();
        self.phase = ItemPhase::Stopped;

        debug!(key = %self.key, "Stopped playback");
        self.notify_state(PlaybackState::Stopped);
    }

    /// Give the player back to the pool and forget the persisted state.
    ///
    /// A later [`start`](Self::start) rebuilds everything from scratch.
    pub fn release(&mut self) {
        let Some(surface) = self.surface() else {
            return;
        };

        let player = self.player();
        self.context
            .provider
            .unregister(&self.context.player_config, &self.key);
        self.context.cache.remove(&self.key);
        self.timer.stop();

        match player {
            Some(player) => {
                player.pause();
                player.stop(true);
                player.detach(&surface);
                player.set_attachment_delegate(None);
                self.remove_listener(&*player);
            }
            None => self.listener = None,
        }
        self.phase = ItemPhase::Idle;

        debug!(key = %self.key, "Released player");
        self.notify_state(PlaybackState::Stopped);
    }

    /// Seek the live player and persist the position right away.
    pub fn seek_to(&mut self, position_ms: u64) {
        let Some(player) = self.player() else {
            return;
        };

        player.seek(position_ms);
        let info = self.playback_info().with_position(position_ms);
        self.put_playback_info(info);
    }

    // ------------------------------------------------------------------------
    // Queries and audio settings
    // ------------------------------------------------------------------------

    pub fn is_playing(&self) -> bool {
        self.player().is_some_and(|player| player.is_playing())
    }

    pub fn is_truly_playable(&self) -> bool {
        self.surface.read().is_some()
    }

    /// Whether `player` currently renders into this item's surface.
    pub fn is_attached(&self, player: &dyn Player) -> bool {
        self.surface
            .read()
            .as_ref()
            .is_some_and(|surface| player.is_attached(surface))
    }

    pub fn wants_to_play(&self) -> bool {
        match self.surface.read().as_ref() {
            Some(surface) => policy::wants_to_play(
                self.context.visibility.visible_area_ratio(surface),
                self.options.trigger_offset,
            ),
            None => false,
        }
    }

    /// Live player position, or 0 without a player.
    pub fn playback_position(&self) -> u64 {
        self.player()
            .map(|player| player.playback_position_ms())
            .unwrap_or(0)
    }

    /// Media duration, or `None` without a player or while unknown.
    pub fn duration(&self) -> Option<u64> {
        self.player().and_then(|player| player.duration_ms())
    }

    pub fn playback_info(&self) -> PlaybackInfo {
        self.context.cache.get_or(&self.key, PlaybackInfo::default())
    }

    /// Persist `volume` and apply it to the live player, if any.
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        if !is_unit_fraction(volume) {
            return Err(PlaybackError::InvalidVolume(volume));
        }

        let mut info = self.playback_info();
        info.volume_info.volume = volume;
        self.put_playback_info(info);

        if let Some(player) = self.player() {
            player.volume_controller().set_volume(volume);
        }
        Ok(())
    }

    pub fn volume(&self) -> f32 {
        match self.player() {
            Some(player) => player.volume_controller().volume(),
            None => self.playback_info().volume_info.volume,
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        let mut info = self.playback_info();
        info.volume_info.muted = muted;
        self.put_playback_info(info);

        if let Some(player) = self.player() {
            player.volume_controller().set_muted(muted);
        }
    }

    pub fn is_muted(&self) -> bool {
        match self.player() {
            Some(player) => player.volume_controller().is_muted(),
            None => self.playback_info().volume_info.muted,
        }
    }

    /// Forward the scheduler's playability verdict to the observer.
    pub fn on_playability_changed(&mut self, is_playable: bool) {
        self.observer.on_playability_state_changed(is_playable);
        self.publish(FeedEvent::PlayabilityChanged {
            key: self.key.clone(),
            playable: is_playable,
        });
    }

    // ------------------------------------------------------------------------
    // Marshaled callbacks
    // ------------------------------------------------------------------------

    /// Handle a message addressed to this item.
    pub fn handle_message(&mut self, message: FeedMessage) {
        match message {
            FeedMessage::PlayerStateChanged { listener, state, .. } => {
                if self.accepts_listener(listener) {
                    self.on_player_state_changed(state);
                } else {
                    trace!(key = %self.key, ?state, "Dropping state from removed listener");
                }
            }
            FeedMessage::PlayerError { listener, error, .. } => {
                if self.accepts_listener(listener) {
                    self.on_player_error(error);
                } else {
                    trace!(key = %self.key, "Dropping error from removed listener");
                }
            }
            FeedMessage::Tick { epoch, .. } => self.on_tick(epoch),
        }
    }

    fn accepts_listener(&self, listener: ListenerId) -> bool {
        self.listener
            .as_ref()
            .is_some_and(|current| current.id == listener)
    }

    fn on_player_state_changed(&mut self, state: PlayerState) {
        match state {
            PlayerState::Idle => {
                self.persist_ended();
                self.notify_state(PlaybackState::Stopped);
            }
            PlayerState::Buffering => {
                self.persist_ended();
                self.notify_state(PlaybackState::Buffering);
            }
            PlayerState::Ready => {
                self.persist_ended();
                self.notify_state(PlaybackState::Ready);
            }
            PlayerState::Ended => {
                self.timer.stop();
                self.notify_state(PlaybackState::Stopped);
                let mut info = self.playback_info().with_position(0);
                info.ended = true;
                self.put_playback_info(info);
            }
        }
    }

    fn on_player_error(&mut self, player_error: PlayerError) {
        error!(key = %self.key, error = %player_error, "Player error");

        self.notify_state(PlaybackState::Error);
        self.publish(FeedEvent::PlayerError {
            key: self.key.clone(),
            message: player_error.message,
        });

        match self.context.error_policy {
            ErrorPolicy::Report => {}
            ErrorPolicy::Stop => self.stop(),
            ErrorPolicy::Release => self.release(),
        }
    }

    fn on_tick(&mut self, epoch: u64) {
        if !self.timer.accepts(epoch) {
            return;
        }
        let Some(player) = self.player() else {
            return;
        };
        let duration = match player.duration_ms() {
            Some(duration) if duration > 0 => duration,
            _ => return,
        };

        let position = player.playback_position_ms();
        let millis = match self.timer.config().mode {
            CountdownMode::Elapsed => position,
            CountdownMode::Remaining => duration.saturating_sub(position),
        };
        let display = format_playback_millis(millis);

        self.observer.on_count_down_time(&display);
        self.publish(FeedEvent::CountDown {
            key: self.key.clone(),
            millis,
            display,
        });
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn player(&self) -> Option<Arc<dyn Player>> {
        self.context
            .provider
            .get_player(&self.context.player_config, &self.key)
    }

    fn can_start_playing(&self) -> bool {
        self.start_gate
            .as_ref()
            .map_or(true, |gate| gate.can_start_playing())
    }

    fn put_playback_info(&self, info: PlaybackInfo) {
        self.context.cache.put(&self.key, info);
    }

    /// Persist whether the player currently sits at the end of the media.
    fn persist_ended(&self) {
        let ended = self
            .player()
            .is_some_and(|player| player.playback_state() == PlayerState::Ended);
        let mut info = self.playback_info();
        info.ended = ended;
        self.put_playback_info(info);
    }

    fn bind_player(&self, player: &dyn Player, surface: &Surface, info: &PlaybackInfo) {
        player.init();
        player.attach(surface);
        player.volume_controller().set_volume(info.volume_info.volume);
        player.volume_controller().set_muted(info.volume_info.muted);

        trace!(url = %redact_url(&self.url), "Binding media source");
        let source = self.context.provider.create_media_source(
            &self.context.player_config,
            &self.url,
            self.options.looping,
        );
        player.set_media_source(source);

        let delegate: Arc<dyn AttachmentStateDelegate> = Arc::clone(&self.delegate) as _;
        player.set_attachment_delegate(Some(delegate));
    }

    /// Replace the current listener with a fresh one.
    fn install_listener(&mut self, player: &dyn Player) {
        self.remove_listener(player);

        let listener = Arc::new(EventForwarder::new(self.id, self.context.sender.clone()));
        let as_listener: Arc<dyn PlayerEventListener> = Arc::clone(&listener) as _;
        player.add_event_listener(as_listener);
        self.listener = Some(listener);
    }

    fn remove_listener(&mut self, player: &dyn Player) {
        if let Some(listener) = self.listener.take() {
            player.remove_event_listener(listener.id);
        }
    }

    fn start_timer(&mut self) {
        if self.options.timer_enabled {
            self.timer.start(self.id, &self.context.sender);
        } else {
            self.timer.stop();
        }
    }

    fn notify_state(&mut self, state: PlaybackState) {
        self.last_state = state;
        self.observer.on_state_changed(state);
        self.publish(FeedEvent::StateChanged {
            key: self.key.clone(),
            state,
        });
    }

    fn publish(&self, event: FeedEvent) {
        if let Some(bus) = self.context.event_bus.as_ref() {
            // No subscribers is fine.
            let _ = bus.emit(event);
        }
    }
}

impl fmt::Debug for PlayableItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayableItem")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("position", &self.position)
            .field("phase", &self.phase)
            .field("last_state", &self.last_state)
            .field("has_surface", &self.is_truly_playable())
            .field("timer_running", &self.timer.is_running())
            .finish()
    }
}

impl Playable for PlayableItem {
    fn is_truly_playable(&self) -> bool {
        PlayableItem::is_truly_playable(self)
    }

    fn wants_to_play(&self) -> bool {
        PlayableItem::wants_to_play(self)
    }

    fn is_playing(&self) -> bool {
        PlayableItem::is_playing(self)
    }

    fn start(&mut self) {
        PlayableItem::start(self)
    }

    fn pause(&mut self) {
        PlayableItem::pause(self)
    }

    fn stop(&mut self) {
        PlayableItem::stop(self)
    }

    fn release(&mut self) {
        PlayableItem::release(self)
    }

    fn on_playability_changed(&mut self, is_playable: bool) {
        PlayableItem::on_playability_changed(self, is_playable)
    }
}
