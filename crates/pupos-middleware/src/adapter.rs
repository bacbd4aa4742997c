//! The transport adapter seam.
//!
//! The behavior controller never speaks a wire protocol directly. It
//! publishes to the internal [`EventBus`][crate::bus::EventBus]; adapters
//! translate between the bus and the specific protocol of the outside world
//! (the paired voice-assistant link on a real robot, the interactive console
//! in headless operation).

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use pupos_types::{EventPayload, GadgetEvent, PupError, RobotEvent};
use tracing::debug;

use crate::bus::{EventBus, Topic};

/// Every external-transport adapter must implement this trait.
///
/// # Contract
///
/// * `deliver_event` – forwards an outbound [`GadgetEvent`] (e.g. `bark`)
///   to the paired device. Failures are the adapter's problem; the emitting
///   loop never learns about them.
///
/// * `control_stream` – a live stream of raw directive payloads (JSON
///   strings) arriving from the paired device. Decoding and validation
///   happen downstream in the dispatcher.
#[async_trait]
pub trait TransportAdapter: Send + Sync {
    /// Forward an outbound gadget event to the paired device.
    async fn deliver_event(&self, event: GadgetEvent) -> Result<(), PupError>;

    /// Raw inbound control payloads, one JSON string per directive.
    async fn control_stream(&self) -> BoxStream<'static, String>;
}

/// Pump connecting a [`TransportAdapter`] to the bus.
///
/// Inbound control payloads flow to [`Topic::Directives`]; outbound gadget
/// events flow back through [`TransportAdapter::deliver_event`]. Failures in
/// either direction are logged and dropped — the transport is best-effort
/// on both sides. Runs until the adapter's control stream ends.
pub async fn run_transport(adapter: Arc<dyn TransportAdapter>, bus: EventBus) {
    let mut inbound = adapter.control_stream().await;
    let mut outbound = bus.subscribe_to(Topic::GadgetEvents);
    loop {
        tokio::select! {
            payload = inbound.next() => match payload {
                Some(raw) => {
                    let event = RobotEvent::new(
                        "pupos-middleware::transport",
                        EventPayload::ControlPayload(raw),
                    );
                    if let Err(err) = bus.publish_to(Topic::Directives, event) {
                        debug!(%err, "inbound directive dropped");
                    }
                }
                None => break,
            },
            event = outbound.recv() => match event {
                Some(event) => {
                    if let EventPayload::Gadget(gadget) = event.payload
                        && let Err(err) = adapter.deliver_event(gadget).await
                    {
                        debug!(%err, "outbound gadget event dropped");
                    }
                }
                None => break,
            },
        }
    }
}
