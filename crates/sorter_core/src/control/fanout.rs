//! Realtime fanout of state changes to dashboard sessions.
//!
//! # Invariants
//! - A message reaches only the sessions subscribed when `publish` runs;
//!   there is no replay for late joiners.
//! - Each subscriber sees messages in publish order.
//! - Publishing never waits on a subscriber: a subscriber that falls more
//!   than `buffer` messages behind skips the oldest ones.

use log::{error, trace, warn};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

pub const DEFAULT_FANOUT_BUFFER: usize = 64;

/// Fanout channel names as seen by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// A new ledger event.
    Deposit,
    /// A full axis snapshot.
    Axis,
    /// A raw weight report, passed through untouched.
    WeightsUpdate,
}

impl Topic {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Axis => "axis",
            Self::WeightsUpdate => "weights_update",
        }
    }
}

/// One pushed message; serialized to sessions as `{"event", "data"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FanoutMessage {
    pub event: Topic,
    pub data: Value,
}

/// Broadcast hub. Cloning shares the same channel.
#[derive(Debug, Clone)]
pub struct Fanout {
    sender: broadcast::Sender<FanoutMessage>,
}

impl Default for Fanout {
    fn default() -> Self {
        Self::new(DEFAULT_FANOUT_BUFFER)
    }
}

impl Fanout {
    /// Creates a hub where each subscriber buffers up to `buffer` messages.
    pub fn new(buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer.max(1));
        Self { sender }
    }

    /// Serializes `payload` and publishes it on `topic`.
    ///
    /// Returns how many sessions the message was queued for.
    pub fn publish<T: Serialize + ?Sized>(&self, topic: Topic, payload: &T) -> usize {
        match serde_json::to_value(payload) {
            Ok(data) => self.publish_value(topic, data),
            Err(err) => {
                error!(
                    "event=fanout_publish module=control status=error topic={} error={}",
                    topic.as_str(),
                    err
                );
                0
            }
        }
    }

    /// Publishes an already-encoded payload on `topic`.
    pub fn publish_value(&self, topic: Topic, data: Value) -> usize {
        // `send` only fails when nobody is listening.
        let delivered = self
            .sender
            .send(FanoutMessage { event: topic, data })
            .unwrap_or(0);
        trace!(
            "event=fanout_publish module=control status=ok topic={} subscribers={}",
            topic.as_str(),
            delivered
        );
        delivered
    }

    /// Registers a new session; it receives messages published from now on.
    pub fn subscribe(&self) -> FanoutSubscription {
        FanoutSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receiving half held by one dashboard session.
#[derive(Debug)]
pub struct FanoutSubscription {
    receiver: broadcast::Receiver<FanoutMessage>,
}

impl FanoutSubscription {
    /// Waits for the next message. Skips over lag; `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<FanoutMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "event=fanout_lagged module=control status=error skipped={}",
                        skipped
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<FanoutMessage> {
        loop {
            match self.receiver.try_recv() {
                Ok(message) => return Some(message),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(
                        "event=fanout_lagged module=control status=error skipped={}",
                        skipped
                    );
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}
