//! # Feed Event Bus
//!
//! Typed broadcast of item notifications using `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! Every playable item reports its transitions synchronously to its own
//! observer. When a feed is configured with an [`EventBus`], the same
//! notifications are also published here so that analytics, UI overlays or
//! tests can follow the whole feed without registering per-item observers.
//!
//! ```text
//! ┌──────────────┐   emit   ┌───────────┐  subscribe  ┌────────────┐
//! │ Playable #1  ├─────────>│           ├────────────>│ Subscriber │
//! └──────────────┘          │ EventBus  │             └────────────┘
//! ┌──────────────┐   emit   │ (broadcast│  subscribe  ┌────────────┐
//! │ Playable #2  ├─────────>│  channel) ├────────────>│ Subscriber │
//! └──────────────┘          └───────────┘             └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, EventStream, FeedEvent, PlaybackState};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(64);
//! let mut errors = EventStream::new(bus.subscribe())
//!     .filter(|event| matches!(event, FeedEvent::PlayerError { .. }));
//!
//! bus.emit(FeedEvent::StateChanged {
//!     key: "https://cdn.example.com/1.mp4".into(),
//!     state: PlaybackState::Started,
//! })
//! .ok();
//!
//! assert!(errors.try_recv().is_none());
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events and may keep
//!   receiving.
//! - **`RecvError::Closed`**: every sender was dropped; the feed was torn down.
//!
//! Emitting without subscribers fails with `SendError`; publishers ignore it.

use bridge_traits::PlayerKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Countdown ticks are the densest traffic: one per playing item per timer
/// interval.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Event Types
// ============================================================================

/// Lifecycle state reported by a playable item.
///
/// Not strictly linear: `Buffering` and `Ready` may interleave with `Started`
/// depending on what the engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaybackState {
    Idle,
    Started,
    Restarted,
    Paused,
    Stopped,
    Buffering,
    Ready,
    Error,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Idle => "IDLE",
            PlaybackState::Started => "STARTED",
            PlaybackState::Restarted => "RESTARTED",
            PlaybackState::Paused => "PAUSED",
            PlaybackState::Stopped => "STOPPED",
            PlaybackState::Buffering => "BUFFERING",
            PlaybackState::Ready => "READY",
            PlaybackState::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Notification published for one item of the feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum FeedEvent {
    /// The item moved to a new lifecycle state.
    StateChanged { key: PlayerKey, state: PlaybackState },
    /// Progress timer tick.
    CountDown {
        key: PlayerKey,
        /// Reported time in milliseconds (elapsed or remaining).
        millis: u64,
        /// `mm:ss` / `hh:mm:ss` rendering of `millis`.
        display: String,
    },
    /// The scheduler re-evaluated whether the item sits in the playable area.
    PlayabilityChanged { key: PlayerKey, playable: bool },
    /// The engine reported an error for the item.
    PlayerError { key: PlayerKey, message: String },
}

impl FeedEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            FeedEvent::StateChanged { .. } => "Playback state changed",
            FeedEvent::CountDown { .. } => "Playback progress",
            FeedEvent::PlayabilityChanged { .. } => "Playability changed",
            FeedEvent::PlayerError { .. } => "Player error",
        }
    }

    /// Key of the item the event belongs to.
    pub fn key(&self) -> &PlayerKey {
        match self {
            FeedEvent::StateChanged { key, .. }
            | FeedEvent::CountDown { key, .. }
            | FeedEvent::PlayabilityChanged { key, .. }
            | FeedEvent::PlayerError { key, .. } => key,
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            FeedEvent::PlayerError { .. } => EventSeverity::Error,
            FeedEvent::StateChanged {
                state: PlaybackState::Error,
                ..
            } => EventSeverity::Error,
            FeedEvent::StateChanged { .. } => EventSeverity::Info,
            FeedEvent::CountDown { .. } | FeedEvent::PlayabilityChanged { .. } => {
                EventSeverity::Debug
            }
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central bus for publishing and subscribing to feed events.
///
/// Cloning the bus yields another publisher on the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<FeedEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` events per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are none.
    pub fn emit(&self, event: FeedEvent) -> Result<usize, SendError<FeedEvent>> {
        self.sender.send(event)
    }

    /// Creates an independent receiver for all future events.
    pub fn subscribe(&self) -> Receiver<FeedEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&FeedEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional predicate.
pub struct EventStream {
    receiver: Receiver<FeedEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<FeedEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&FeedEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Restrict the stream to events of a single item.
    pub fn for_key(self, key: PlayerKey) -> Self {
        self.filter(move |event| event.key() == &key)
    }

    fn accepts(&self, event: &FeedEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<FeedEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching event is currently available.
    pub fn try_recv(&mut self) -> Option<Result<FeedEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn started(key: &str) -> FeedEvent {
        FeedEvent::StateChanged {
            key: key.into(),
            state: PlaybackState::Started,
        }
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);

        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_fails() {
        let bus = EventBus::default();
        assert!(bus.emit(started("a")).is_err());
    }

    #[tokio::test]
    async fn test_every_subscriber_receives() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        assert_eq!(bus.emit(started("a")).unwrap(), 2);
        assert_eq!(sub1.recv().await.unwrap(), started("a"));
        assert_eq!(sub2.recv().await.unwrap(), started("a"));
    }

    #[tokio::test]
    async fn test_stream_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| event.severity() == EventSeverity::Error);

        bus.emit(started("a")).ok();
        bus.emit(FeedEvent::PlayerError {
            key: "a".into(),
            message: "decoder failure".to_string(),
        })
        .ok();

        match stream.recv().await.unwrap() {
            FeedEvent::PlayerError { message, .. } => assert_eq!(message, "decoder failure"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stream_for_key() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe()).for_key("b".into());

        bus.emit(started("a")).ok();
        bus.emit(started("b")).ok();

        assert_eq!(stream.try_recv().unwrap().unwrap(), started("b"));
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut stream = EventStream::new(bus.subscribe());

        for i in 0..5 {
            bus.emit(started(&format!("item-{}", i))).ok();
        }

        assert!(matches!(stream.try_recv(), Some(Err(RecvError::Lagged(_)))));
        assert!(matches!(stream.try_recv(), Some(Ok(_))));
    }

    #[tokio::test]
    async fn test_closed_bus() {
        let bus = EventBus::new(2);
        let mut stream = EventStream::new(bus.subscribe());
        drop(bus);

        assert!(matches!(stream.recv().await, Err(RecvError::Closed)));
    }

    #[test]
    fn test_event_serialization() {
        let event = FeedEvent::CountDown {
            key: "clip#1".into(),
            millis: 65_000,
            display: "01:05".to_string(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"CountDown\""));
        assert!(json.contains("01:05"));

        let deserialized: FeedEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(PlaybackState::Restarted.to_string(), "RESTARTED");
        assert_eq!(
            serde_json::to_string(&PlaybackState::Buffering).unwrap(),
            "\"BUFFERING\""
        );
    }

    #[test]
    fn test_event_metadata() {
        let event = FeedEvent::PlayabilityChanged {
            key: "clip".into(),
            playable: true,
        };
        assert_eq!(event.description(), "Playability changed");
        assert_eq!(event.severity(), EventSeverity::Debug);
        assert_eq!(event.key().as_str(), "clip");

        let failed = FeedEvent::StateChanged {
            key: "clip".into(),
            state: PlaybackState::Error,
        };
        assert_eq!(failed.severity(), EventSeverity::Error);
    }
}
