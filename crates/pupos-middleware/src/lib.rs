//! `pupos-middleware` – The Nervous System
//!
//! Routes asynchronous traffic between the transport boundary and the
//! behavior controller without caring about the data's meaning.
//!
//! # Modules
//!
//! - [`bus`] – Headless, typed, topic-based publish/subscribe event bus
//!   built on Tokio broadcast channels.
//! - [`adapter`] – [`TransportAdapter`][adapter::TransportAdapter]: the
//!   trait every external transport (the paired voice-assistant link, the
//!   console) implements.
//! - [`emitter`] – [`EventEmitter`][emitter::EventEmitter]: fire-and-forget
//!   dispatch of named gadget events toward the transport.

pub mod adapter;
pub mod bus;
pub mod emitter;

pub use adapter::{TransportAdapter, run_transport};
pub use bus::{EventBus, Topic, TopicReceiver};
pub use emitter::EventEmitter;
