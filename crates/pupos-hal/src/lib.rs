//! `pupos-hal` – Hardware Abstraction Layer
//!
//! Collaborator traits for every physical device the behavior controller
//! talks to, plus an in-process simulated rig for headless tests and CI.
//!
//! # Modules
//!
//! - [`motor`] – [`Motor`][motor::Motor]: timed fire-and-forget speed
//!   commands with last-write-wins semantics at the hardware layer, and
//!   [`TankDrive`][motor::TankDrive], the differential left/right pair.
//! - [`sensor`] – [`ProximitySensor`][sensor::ProximitySensor] and
//!   [`TouchSensor`][sensor::TouchSensor]: polled, not event-driven.
//! - [`led`] – [`StatusLed`][led::StatusLed]: the two side status LEDs.
//! - [`display`] – [`EyeDisplay`][display::EyeDisplay]: clear → draw →
//!   commit frame protocol for the eye animation.
//! - [`sound`] – [`SoundPlayer`][sound::SoundPlayer]: named audio cues and
//!   TTS; `play_file` blocks until the cue completes.
//! - [`rig`] – [`Rig`][rig::Rig]: the bundle of shared device handles the
//!   loops and the dispatcher clone freely.
//! - [`sim`] – recording stub drivers and the [`SimRig`][sim::SimRig]
//!   builder so the full stack runs without hardware.
//!
//! Drivers implement the traits and are shared as `Arc<dyn …>`; the rest of
//! the controller only ever talks to the traits, so real device drivers can
//! be swapped in without touching behavior logic.

pub mod display;
pub mod led;
pub mod motor;
pub mod rig;
pub mod sensor;
pub mod sim;
pub mod sound;

pub use display::{EyeDisplay, Fill, Rect};
pub use led::{LedColor, LedSide, StatusLed};
pub use motor::{Motor, MotorCommand, TankDrive};
pub use rig::Rig;
pub use sensor::{ProximitySensor, TouchSensor};
pub use sim::SimRig;
pub use sound::SoundPlayer;
