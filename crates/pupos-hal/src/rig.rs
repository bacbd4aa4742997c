//! [`Rig`] – the bundle of shared device handles.
//!
//! One `Rig` is built at startup and cloned into the dispatcher and every
//! behavior loop. All handles are `Arc`s: clones address the same physical
//! devices, and nothing arbitrates between concurrent callers.

use std::sync::Arc;

use crate::display::EyeDisplay;
use crate::led::StatusLed;
use crate::motor::{Motor, TankDrive};
use crate::sensor::{ProximitySensor, TouchSensor};
use crate::sound::SoundPlayer;

/// Every device the behavior controller touches.
#[derive(Clone)]
pub struct Rig {
    /// Differential drive pair (left + right wheel).
    pub drive: TankDrive,
    /// Auxiliary posture motor (sit/stand gear).
    pub posture: Arc<dyn Motor>,
    /// Infrared proximity sensor.
    pub ir: Arc<dyn ProximitySensor>,
    /// Touch sensor on the robot's back.
    pub touch: Arc<dyn TouchSensor>,
    /// Side status LEDs.
    pub leds: Arc<dyn StatusLed>,
    /// Eye display.
    pub screen: Arc<dyn EyeDisplay>,
    /// Speaker.
    pub sound: Arc<dyn SoundPlayer>,
}
