//! Recording fakes for the host bridges.
#![allow(dead_code)]

use bridge_traits::{
    AttachmentStateDelegate, ListenerId, MediaSource, PlaybackInfo, PlaybackInfoCache, Player,
    PlayerConfig, PlayerError, PlayerEventListener, PlayerKey, PlayerProvider, PlayerState,
    Surface, SurfaceId, VisibilityProvider, VolumeController,
};
use core_playback::{
    FeedController, ItemBinding, ItemId, LruPlaybackInfoCache, PlayableOptions, PlaybackObserver,
    PlaybackState,
};
use core_runtime::config::{FeedConfig, FeedConfigBuilder};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Player
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Init,
    Attach(SurfaceId),
    Detach(SurfaceId),
    SetMediaSource { uri: String, looping: bool },
    Seek(u64),
    Prepare(bool),
    Play,
    Pause,
    Stop(bool),
}

#[derive(Default)]
pub struct FakeVolume {
    volume: Mutex<f32>,
    muted: AtomicBool,
}

impl VolumeController for FakeVolume {
    fn set_volume(&self, volume: f32) {
        *self.volume.lock().unwrap() = volume;
    }

    fn volume(&self) -> f32 {
        *self.volume.lock().unwrap()
    }

    fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::SeqCst);
    }

    fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }
}

pub struct FakePlayer {
    calls: Mutex<Vec<Call>>,
    state: Mutex<PlayerState>,
    playing: AtomicBool,
    position: Mutex<u64>,
    duration: Mutex<Option<u64>>,
    attached: Mutex<Option<SurfaceId>>,
    listeners: Mutex<Vec<Arc<dyn PlayerEventListener>>>,
    delegate: Mutex<Option<Arc<dyn AttachmentStateDelegate>>>,
    volume: FakeVolume,
}

impl Default for FakePlayer {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            state: Mutex::new(PlayerState::Idle),
            playing: AtomicBool::new(false),
            position: Mutex::new(0),
            duration: Mutex::new(None),
            attached: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
            delegate: Mutex::new(None),
            volume: FakeVolume::default(),
        }
    }
}

impl FakePlayer {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn last_seek(&self) -> Option<u64> {
        self.calls().iter().rev().find_map(|call| match call {
            Call::Seek(position) => Some(*position),
            _ => None,
        })
    }

    pub fn set_state(&self, state: PlayerState) {
        *self.state.lock().unwrap() = state;
    }

    pub fn set_position(&self, position_ms: u64) {
        *self.position.lock().unwrap() = position_ms;
    }

    pub fn set_duration(&self, duration_ms: Option<u64>) {
        *self.duration.lock().unwrap() = duration_ms;
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    pub fn has_delegate(&self) -> bool {
        self.delegate.lock().unwrap().is_some()
    }

    /// Move to `state` and notify the registered listeners.
    pub fn emit_state(&self, state: PlayerState) {
        self.set_state(state);
        let listeners = self.listeners.lock().unwrap().clone();
        for listener in listeners {
            listener.on_player_state_changed(state);
        }
    }

    pub fn emit_error(&self, message: &str) {
        let listeners = self.listeners.lock().unwrap().clone();
        for listener in listeners {
            listener.on_player_error(PlayerError::new(message));
        }
    }

    /// Simulate the pool moving the player back onto its owner's surface.
    pub fn reattach(&self) {
        let delegate = self.delegate.lock().unwrap().clone();
        if let Some(delegate) = delegate {
            delegate.on_detach(self);
            delegate.on_attach(self);
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Player for FakePlayer {
    fn init(&self) {
        self.record(Call::Init);
    }

    fn attach(&self, surface: &Surface) {
        *self.attached.lock().unwrap() = Some(surface.id());
        self.record(Call::Attach(surface.id()));
    }

    fn detach(&self, surface: &Surface) {
        let mut attached = self.attached.lock().unwrap();
        if *attached == Some(surface.id()) {
            *attached = None;
        }
        drop(attached);
        self.record(Call::Detach(surface.id()));
    }

    fn is_attached(&self, surface: &Surface) -> bool {
        *self.attached.lock().unwrap() == Some(surface.id())
    }

    fn set_media_source(&self, source: MediaSource) {
        self.record(Call::SetMediaSource {
            uri: source.uri,
            looping: source.looping,
        });
    }

    fn seek(&self, position_ms: u64) {
        self.set_position(position_ms);
        self.record(Call::Seek(position_ms));
    }

    fn prepare(&self, force_reset: bool) {
        self.record(Call::Prepare(force_reset));
    }

    fn play(&self) {
        self.playing.store(true, Ordering::SeqCst);
        self.record(Call::Play);
    }

    fn pause(&self) {
        self.playing.store(false, Ordering::SeqCst);
        self.record(Call::Pause);
    }

    fn stop(&self, reset: bool) {
        self.playing.store(false, Ordering::SeqCst);
        if reset {
            self.set_position(0);
        }
        self.set_state(PlayerState::Idle);
        self.record(Call::Stop(reset));
    }

    fn playback_position_ms(&self) -> u64 {
        *self.position.lock().unwrap()
    }

    fn duration_ms(&self) -> Option<u64> {
        *self.duration.lock().unwrap()
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn playback_state(&self) -> PlayerState {
        *self.state.lock().unwrap()
    }

    fn volume_controller(&self) -> &dyn VolumeController {
        &self.volume
    }

    fn add_event_listener(&self, listener: Arc<dyn PlayerEventListener>) {
        self.listeners.lock().unwrap().push(listener);
    }

    fn remove_event_listener(&self, id: ListenerId) {
        self.listeners
            .lock()
            .unwrap()
            .retain(|listener| listener.listener_id() != id);
    }

    fn set_attachment_delegate(&self, delegate: Option<Arc<dyn AttachmentStateDelegate>>) {
        *self.delegate.lock().unwrap() = delegate;
    }
}

// ============================================================================
// Pool
// ============================================================================

#[derive(Default)]
pub struct FakePool {
    players: Mutex<HashMap<PlayerKey, Arc<FakePlayer>>>,
    created: AtomicUsize,
    unregistered: Mutex<Vec<PlayerKey>>,
    shut_down: AtomicBool,
}

impl FakePool {
    pub fn player(&self, key: &str) -> Option<Arc<FakePlayer>> {
        self.players.lock().unwrap().get(&PlayerKey::from(key)).cloned()
    }

    /// Register a player up front so tests can configure it before `start`.
    pub fn preload(&self, key: &str) -> Arc<FakePlayer> {
        let player = Arc::new(FakePlayer::default());
        self.players
            .lock()
            .unwrap()
            .insert(PlayerKey::from(key), Arc::clone(&player));
        player
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn unregistered(&self) -> Vec<PlayerKey> {
        self.unregistered.lock().unwrap().clone()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

impl PlayerProvider for FakePool {
    fn get_player(&self, _config: &PlayerConfig, key: &PlayerKey) -> Option<Arc<dyn Player>> {
        self.players
            .lock()
            .unwrap()
            .get(key)
            .map(|player| Arc::clone(player) as Arc<dyn Player>)
    }

    fn get_or_init_player(&self, _config: &PlayerConfig, key: &PlayerKey) -> Arc<dyn Player> {
        let mut players = self.players.lock().unwrap();
        let player = players.entry(key.clone()).or_insert_with(|| {
            self.created.fetch_add(1, Ordering::SeqCst);
            Arc::new(FakePlayer::default())
        });
        Arc::clone(player) as Arc<dyn Player>
    }

    fn unregister(&self, _config: &PlayerConfig, key: &PlayerKey) -> bool {
        self.unregistered.lock().unwrap().push(key.clone());
        self.players.lock().unwrap().remove(key).is_some()
    }

    fn create_media_source(&self, _config: &PlayerConfig, uri: &str, looping: bool) -> MediaSource {
        MediaSource::new(uri, looping)
    }

    fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }
}

// ============================================================================
// Geometry, persistence and observation
// ============================================================================

#[derive(Default)]
pub struct FakeVisibility {
    ratios: Mutex<HashMap<SurfaceId, f32>>,
}

impl FakeVisibility {
    pub fn set(&self, surface: &Surface, ratio: f32) {
        self.ratios.lock().unwrap().insert(surface.id(), ratio);
    }
}

impl VisibilityProvider for FakeVisibility {
    fn visible_area_ratio(&self, surface: &Surface) -> f32 {
        self.ratios
            .lock()
            .unwrap()
            .get(&surface.id())
            .copied()
            .unwrap_or(0.0)
    }
}

/// LRU cache that counts writes.
#[derive(Default)]
pub struct CountingCache {
    inner: LruPlaybackInfoCache,
    puts: AtomicUsize,
}

impl CountingCache {
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn info(&self, key: &str) -> Option<PlaybackInfo> {
        self.inner.get(&PlayerKey::from(key))
    }
}

impl PlaybackInfoCache for CountingCache {
    fn get(&self, key: &PlayerKey) -> Option<PlaybackInfo> {
        self.inner.get(key)
    }

    fn put(&self, key: &PlayerKey, info: PlaybackInfo) {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, info);
    }

    fn remove(&self, key: &PlayerKey) -> Option<PlaybackInfo> {
        self.inner.remove(key)
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    states: Mutex<Vec<PlaybackState>>,
    countdowns: Mutex<Vec<String>>,
    playability: Mutex<Vec<bool>>,
}

impl RecordingObserver {
    pub fn states(&self) -> Vec<PlaybackState> {
        self.states.lock().unwrap().clone()
    }

    pub fn countdowns(&self) -> Vec<String> {
        self.countdowns.lock().unwrap().clone()
    }

    pub fn playability(&self) -> Vec<bool> {
        self.playability.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.states.lock().unwrap().clear();
        self.countdowns.lock().unwrap().clear();
        self.playability.lock().unwrap().clear();
    }
}

impl PlaybackObserver for RecordingObserver {
    fn on_state_changed(&self, state: PlaybackState) {
        self.states.lock().unwrap().push(state);
    }

    fn on_count_down_time(&self, display: &str) {
        self.countdowns.lock().unwrap().push(display.to_string());
    }

    fn on_playability_state_changed(&self, is_playable: bool) {
        self.playability.lock().unwrap().push(is_playable);
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub pool: Arc<FakePool>,
    pub cache: Arc<CountingCache>,
    pub visibility: Arc<FakeVisibility>,
}

/// One attached slot.
pub struct Slot {
    pub id: ItemId,
    pub url: String,
    pub surface: Surface,
    pub observer: Arc<RecordingObserver>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            pool: Arc::new(FakePool::default()),
            cache: Arc::new(CountingCache::default()),
            visibility: Arc::new(FakeVisibility::default()),
        }
    }

    pub fn builder(&self) -> FeedConfigBuilder {
        FeedConfig::builder()
            .player_provider(self.pool.clone())
            .playback_info_cache(self.cache.clone())
            .visibility_provider(self.visibility.clone())
    }

    pub fn controller(&self) -> FeedController {
        self.controller_with(|builder| builder)
    }

    pub fn controller_with(
        &self,
        configure: impl FnOnce(FeedConfigBuilder) -> FeedConfigBuilder,
    ) -> FeedController {
        let config = configure(self.builder()).build().unwrap();
        FeedController::new(config).unwrap()
    }

    /// Attach a slot showing `url` at `position`, visible at `ratio`.
    pub fn attach(
        &self,
        feed: &mut FeedController,
        url: &str,
        position: usize,
        ratio: f32,
        options: PlayableOptions,
    ) -> Slot {
        let surface = Surface::new();
        self.visibility.set(&surface, ratio);
        let observer = Arc::new(RecordingObserver::default());

        let id = feed
            .attach_item(
                ItemBinding::new(url)
                    .at_position(position)
                    .with_surface(surface.clone())
                    .with_options(options)
                    .with_observer(observer.clone()),
            )
            .unwrap();

        Slot {
            id,
            url: url.to_string(),
            surface,
            observer,
        }
    }
}
