//! Messages marshaled onto the feed's command thread.
//!
//! Player callbacks and timer ticks may fire on any thread. They only enqueue
//! a message naming the item; the controller dispatches it after the command
//! in flight returns, in the order the messages were sent.

use crate::registry::ItemId;
use bridge_traits::{ListenerId, PlayerError, PlayerState};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    PlayerStateChanged {
        item: ItemId,
        listener: ListenerId,
        state: PlayerState,
    },
    PlayerError {
        item: ItemId,
        listener: ListenerId,
        error: PlayerError,
    },
    /// Progress timer tick. `epoch` identifies the timer run that produced it.
    Tick { item: ItemId, epoch: u64 },
}

impl FeedMessage {
    pub fn item(&self) -> ItemId {
        match self {
            FeedMessage::PlayerStateChanged { item, .. }
            | FeedMessage::PlayerError { item, .. }
            | FeedMessage::Tick { item, .. } => *item,
        }
    }
}

pub type MessageSender = mpsc::UnboundedSender<FeedMessage>;
pub type MessageReceiver = mpsc::UnboundedReceiver<FeedMessage>;

pub fn channel() -> (MessageSender, MessageReceiver) {
    mpsc::unbounded_channel()
}
