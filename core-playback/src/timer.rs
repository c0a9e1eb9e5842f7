//! # Progress Timer
//!
//! Periodic countdown ticks for a playing item.
//!
//! Each run is a Tokio task that sends [`FeedMessage::Tick`] at a fixed
//! cadence until its [`CancellationToken`] fires. The first tick is sent
//! immediately. Ticks carry the run's epoch so that a tick still queued when
//! the timer was stopped or restarted is recognised as stale.

use crate::message::{FeedMessage, MessageSender};
use crate::registry::ItemId;
use core_runtime::config::TimerConfig;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

#[derive(Debug)]
pub struct ProgressTimer {
    config: TimerConfig,
    epoch: u64,
    cancel: Option<CancellationToken>,
}

impl ProgressTimer {
    pub fn new(config: TimerConfig) -> Self {
        Self {
            config,
            epoch: 0,
            cancel: None,
        }
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Start a new run for `item`, cancelling the current one.
    ///
    /// Without a Tokio runtime on the calling thread the timer stays stopped.
    pub fn start(&mut self, item: ItemId, sender: &MessageSender) {
        self.stop();

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(%item, "No Tokio runtime available, progress timer disabled");
                return;
            }
        };

        self.epoch += 1;
        let epoch = self.epoch;
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let period = self.config.interval;
        let sender = sender.clone();

        handle.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if sender.send(FeedMessage::Tick { item, epoch }).is_err() {
                            break;
                        }
                    }
                }
            }

            trace!(%item, epoch, "Progress timer finished");
        });

        self.cancel = Some(token);
    }

    pub fn stop(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.cancel.is_some()
    }

    /// Whether a tick from run `epoch` should still be reported.
    pub fn accepts(&self, epoch: u64) -> bool {
        self.is_running() && epoch == self.epoch
    }
}

impl Drop for ProgressTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
