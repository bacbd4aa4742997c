//! Polled sensor traits: infrared proximity and touch.

use pupos_types::PupError;

/// Infrared proximity sensor. Higher readings mean farther away.
pub trait ProximitySensor: Send + Sync {
    /// Stable identifier, e.g. `"infrared"`.
    fn id(&self) -> &str;

    /// Current proximity distance in sensor units.
    ///
    /// # Errors
    ///
    /// Returns [`PupError::HardwareFault`] when the device is unreachable.
    /// The owning loop treats this as fatal for itself only.
    fn proximity(&self) -> Result<i32, PupError>;
}

/// Momentary touch sensor.
pub trait TouchSensor: Send + Sync {
    /// Stable identifier, e.g. `"touch"`.
    fn id(&self) -> &str;

    /// `true` while the button is held down. Sampled, not edge-triggered;
    /// the caller sees whatever level is present at poll time.
    fn is_pressed(&self) -> Result<bool, PupError>;
}
