//! [`EventEmitter`] – fire-and-forget dispatch of named gadget events.
//!
//! Loops that produce outbound events (HeelLoop's `bark`) hold an emitter
//! and never learn whether the transport actually delivered anything: a
//! publish with no listening adapter is logged at debug level and dropped.

use pupos_types::{EventName, EventPayload, GadgetEvent, GadgetPayload, RobotEvent};
use tracing::debug;

use crate::bus::{EventBus, Topic};

/// Cheap-to-clone handle publishing gadget events on the bus.
#[derive(Clone)]
pub struct EventEmitter {
    bus: EventBus,
    source: String,
}

impl EventEmitter {
    pub fn new(bus: EventBus, source: impl Into<String>) -> Self {
        Self {
            bus,
            source: source.into(),
        }
    }

    /// Send a named event with payload toward the transport, fire-and-forget.
    ///
    /// Transport failure (or absence) is never surfaced to the caller.
    pub fn emit(&self, name: EventName, payload: GadgetPayload) {
        let event = RobotEvent::new(
            self.source.clone(),
            EventPayload::Gadget(GadgetEvent { name, payload }),
        );
        if let Err(err) = self.bus.publish_to(Topic::GadgetEvents, event) {
            debug!(event = name.as_str(), %err, "gadget event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pupos_types::EventName;

    #[tokio::test]
    async fn emit_reaches_gadget_event_subscribers() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe_to(Topic::GadgetEvents);
        let emitter = EventEmitter::new(bus.clone(), "pupos-runtime::heel");

        emitter.emit(EventName::Bark, GadgetPayload::Bark { distance: 21 });

        let event = rx.recv().await.expect("bark should arrive");
        assert_eq!(event.source, "pupos-runtime::heel");
        match event.payload {
            EventPayload::Gadget(gadget) => {
                assert_eq!(gadget.name, EventName::Bark);
                assert_eq!(gadget.payload, GadgetPayload::Bark { distance: 21 });
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn emit_without_subscribers_is_silently_dropped() {
        let bus = EventBus::default();
        let emitter = EventEmitter::new(bus, "pupos-runtime::heel");
        // No subscriber on the topic; must not panic or error.
        emitter.emit(EventName::Bark, GadgetPayload::Bark { distance: 5 });
    }
}
