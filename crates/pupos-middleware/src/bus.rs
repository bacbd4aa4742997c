//! Headless, typed, topic-based publish/subscribe event bus.
//!
//! Uses [`tokio::sync::broadcast`] channels under the hood so that every
//! subscriber receives every message without any single subscriber blocking
//! the others.
//!
//! # Topics
//!
//! Traffic is partitioned into three [`Topic`] lanes so components only
//! receive the messages they care about:
//!
//! | Topic | Typical traffic |
//! |---|---|
//! | [`Topic::Directives`] | Inbound control payloads from the transport |
//! | [`Topic::GadgetEvents`] | Outbound custom events (bark) for the transport |
//! | [`Topic::SystemAlerts`] | Faults and operator stop requests |

use pupos_types::{PupError, RobotEvent};
use tokio::sync::broadcast;
use tracing::warn;

/// Default channel capacity (number of buffered events before old ones are
/// dropped for slow subscribers).
const DEFAULT_CAPACITY: usize = 256;

/// Enumeration of all routing topics on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Inbound directive payloads delivered by a transport adapter.
    Directives,
    /// Outbound named events destined for the paired transport device.
    GadgetEvents,
    /// Faults and operator-initiated stop requests.
    SystemAlerts,
}

/// Shared event bus. Clone it cheaply – all clones share the same underlying
/// broadcast channels.
#[derive(Clone, Debug)]
pub struct EventBus {
    directives: broadcast::Sender<RobotEvent>,
    gadget_events: broadcast::Sender<RobotEvent>,
    system_alerts: broadcast::Sender<RobotEvent>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity.
    ///
    /// The `capacity` is applied to every topic channel independently.
    pub fn new(capacity: usize) -> Self {
        let (directives, _) = broadcast::channel(capacity);
        let (gadget_events, _) = broadcast::channel(capacity);
        let (system_alerts, _) = broadcast::channel(capacity);
        Self {
            directives,
            gadget_events,
            system_alerts,
        }
    }

    /// Publish `event` to the given [`Topic`] channel.
    ///
    /// Returns the number of active receivers that were handed the event, or
    /// [`PupError::Channel`] when no subscriber is currently listening on
    /// the topic. Fire-and-forget publishers ignore the error.
    pub fn publish_to(&self, topic: Topic, event: RobotEvent) -> Result<usize, PupError> {
        self.topic_sender(topic)
            .send(event)
            .map_err(|_| PupError::Channel(format!("no subscribers for topic {topic:?}")))
    }

    /// Subscribe to a specific [`Topic`] channel.
    ///
    /// The returned [`TopicReceiver`] yields only events published to that
    /// topic.
    pub fn subscribe_to(&self, topic: Topic) -> TopicReceiver {
        TopicReceiver {
            topic,
            receiver: self.topic_sender(topic).subscribe(),
        }
    }

    fn topic_sender(&self, topic: Topic) -> &broadcast::Sender<RobotEvent> {
        match topic {
            Topic::Directives => &self.directives,
            Topic::GadgetEvents => &self.gadget_events,
            Topic::SystemAlerts => &self.system_alerts,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// An async receiver bound to a single [`Topic`] channel.
///
/// Obtained via [`EventBus::subscribe_to`].
pub struct TopicReceiver {
    topic: Topic,
    receiver: broadcast::Receiver<RobotEvent>,
}

impl TopicReceiver {
    /// Wait for the next event on this topic.
    ///
    /// Skips over lag gaps (logging how many events were dropped) and
    /// returns `None` once the bus has shut down.
    pub async fn recv(&mut self) -> Option<RobotEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(topic = ?self.topic, lagged_by = n, "topic receiver lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking poll for an already-buffered event.
    pub fn try_recv(&mut self) -> Option<RobotEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    /// The [`Topic`] this receiver is bound to.
    pub fn topic(&self) -> Topic {
        self.topic
    }
}
