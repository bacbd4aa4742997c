//! In-process simulated rig for CI and headless testing.
//!
//! [`SimRig`] builds a [`Rig`] backed by stub drivers that record every
//! command and return settable sensor values. This lets the full behavior
//! stack run in tests without physical hardware, and lets tests assert on
//! exactly which motor commands were issued.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use pupos_hal::sim::SimRig;
//!
//! let sim = SimRig::new();
//! let rig = sim.rig();
//!
//! rig.drive.run_timed(75, 75, Duration::from_secs(2)).unwrap();
//! assert_eq!(sim.left_wheel.commands().len(), 1);
//! assert_eq!(sim.right_wheel.commands()[0].speed_sp, 75);
//! ```

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::time::Duration;

use pupos_types::PupError;
use tracing::trace;

use crate::display::{EyeDisplay, Fill, Rect};
use crate::led::{LedColor, LedSide, StatusLed};
use crate::motor::{Motor, MotorCommand, TankDrive};
use crate::rig::Rig;
use crate::sensor::{ProximitySensor, TouchSensor};
use crate::sound::SoundPlayer;

// ────────────────────────────────────────────────────────────────────────────
// Stub motor
// ────────────────────────────────────────────────────────────────────────────

/// A simulated timed motor that records every command. Always succeeds.
pub struct SimMotor {
    id: String,
    commands: Mutex<Vec<MotorCommand>>,
    rotations: Mutex<Vec<(i32, f32)>>,
    stops: AtomicUsize,
}

impl SimMotor {
    pub fn shared(id: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            commands: Mutex::new(Vec::new()),
            rotations: Mutex::new(Vec::new()),
            stops: AtomicUsize::new(0),
        })
    }

    /// Every timed command issued so far, oldest first.
    pub fn commands(&self) -> Vec<MotorCommand> {
        self.commands.lock().expect("sim motor lock").clone()
    }

    /// The most recently issued timed command, if any.
    pub fn last_command(&self) -> Option<MotorCommand> {
        self.commands.lock().expect("sim motor lock").last().copied()
    }

    /// Every fixed-rotation command issued so far as `(speed_pct, rotations)`.
    pub fn rotation_commands(&self) -> Vec<(i32, f32)> {
        self.rotations.lock().expect("sim motor lock").clone()
    }

    /// Number of explicit `stop` calls.
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// Forget all recorded commands.
    pub fn reset(&self) {
        self.commands.lock().expect("sim motor lock").clear();
        self.rotations.lock().expect("sim motor lock").clear();
        self.stops.store(0, Ordering::SeqCst);
    }
}

impl Motor for SimMotor {
    fn id(&self) -> &str {
        &self.id
    }

    fn run_timed(&self, speed_sp: i32, duration: Duration) -> Result<(), PupError> {
        trace!(motor = %self.id, speed_sp, duration_ms = duration.as_millis() as u64, "run_timed");
        self.commands.lock().expect("sim motor lock").push(MotorCommand {
            speed_sp,
            duration_ms: duration.as_millis() as u64,
        });
        Ok(())
    }

    fn on_for_rotations(&self, speed_pct: i32, rotations: f32) -> Result<(), PupError> {
        self.rotations
            .lock()
            .expect("sim motor lock")
            .push((speed_pct, rotations));
        Ok(())
    }

    fn stop(&self) -> Result<(), PupError> {
        trace!(motor = %self.id, "stop");
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub sensors
// ────────────────────────────────────────────────────────────────────────────

/// A simulated proximity sensor whose reading tests can set at will.
pub struct SimProximity {
    id: String,
    distance: AtomicI32,
}

impl SimProximity {
    pub fn shared(id: impl Into<String>, initial: i32) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            distance: AtomicI32::new(initial),
        })
    }

    pub fn set_distance(&self, distance: i32) {
        self.distance.store(distance, Ordering::SeqCst);
    }
}

impl ProximitySensor for SimProximity {
    fn id(&self) -> &str {
        &self.id
    }

    fn proximity(&self) -> Result<i32, PupError> {
        Ok(self.distance.load(Ordering::SeqCst))
    }
}

/// A simulated touch sensor with a settable pressed level.
pub struct SimTouch {
    id: String,
    pressed: AtomicBool,
}

impl SimTouch {
    pub fn shared(id: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            pressed: AtomicBool::new(false),
        })
    }

    pub fn set_pressed(&self, pressed: bool) {
        self.pressed.store(pressed, Ordering::SeqCst);
    }
}

impl TouchSensor for SimTouch {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_pressed(&self) -> Result<bool, PupError> {
        Ok(self.pressed.load(Ordering::SeqCst))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub LED, display, sound
// ────────────────────────────────────────────────────────────────────────────

/// A simulated LED driver recording every color change.
pub struct SimLed {
    history: Mutex<Vec<(LedSide, LedColor)>>,
}

impl SimLed {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self {
            history: Mutex::new(Vec::new()),
        })
    }

    /// Full change history, oldest first.
    pub fn history(&self) -> Vec<(LedSide, LedColor)> {
        self.history.lock().expect("sim led lock").clone()
    }

    /// Most recent color set on `side`, if any.
    pub fn current(&self, side: LedSide) -> Option<LedColor> {
        self.history
            .lock()
            .expect("sim led lock")
            .iter()
            .rev()
            .find(|(s, _)| *s == side)
            .map(|(_, c)| *c)
    }
}

impl StatusLed for SimLed {
    fn set_color(&self, side: LedSide, color: LedColor) -> Result<(), PupError> {
        self.history.lock().expect("sim led lock").push((side, color));
        Ok(())
    }
}

/// A single recorded display operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOp {
    Clear,
    Rectangle(Rect, Fill),
    Commit,
}

/// A simulated display recording the clear/draw/commit sequence.
pub struct SimDisplay {
    ops: Mutex<Vec<DisplayOp>>,
}

impl SimDisplay {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self {
            ops: Mutex::new(Vec::new()),
        })
    }

    pub fn ops(&self) -> Vec<DisplayOp> {
        self.ops.lock().expect("sim display lock").clone()
    }

    /// Number of committed frames.
    pub fn commits(&self) -> usize {
        self.ops
            .lock()
            .expect("sim display lock")
            .iter()
            .filter(|op| matches!(op, DisplayOp::Commit))
            .count()
    }
}

impl EyeDisplay for SimDisplay {
    fn clear(&self) -> Result<(), PupError> {
        self.ops.lock().expect("sim display lock").push(DisplayOp::Clear);
        Ok(())
    }

    fn draw_rectangle(&self, bounds: Rect, fill: Fill) -> Result<(), PupError> {
        self.ops
            .lock()
            .expect("sim display lock")
            .push(DisplayOp::Rectangle(bounds, fill));
        Ok(())
    }

    fn commit(&self) -> Result<(), PupError> {
        self.ops.lock().expect("sim display lock").push(DisplayOp::Commit);
        Ok(())
    }
}

/// A simulated speaker recording cue and speech requests.
///
/// `latency` emulates the real blocking playback duration: `play_file`
/// sleeps for that long before returning, so tests can observe state held
/// "for the duration of the cue".
pub struct SimSound {
    played: Mutex<Vec<String>>,
    spoken: Mutex<Vec<String>>,
    latency: Duration,
}

impl SimSound {
    pub fn shared() -> Arc<Self> {
        Self::shared_with_latency(Duration::ZERO)
    }

    pub fn shared_with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            played: Mutex::new(Vec::new()),
            spoken: Mutex::new(Vec::new()),
            latency,
        })
    }

    pub fn played(&self) -> Vec<String> {
        self.played.lock().expect("sim sound lock").clone()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().expect("sim sound lock").clone()
    }
}

impl SoundPlayer for SimSound {
    fn play_file(&self, name: &str) -> Result<(), PupError> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        self.played.lock().expect("sim sound lock").push(name.to_string());
        Ok(())
    }

    fn speak(&self, text: &str) -> Result<(), PupError> {
        self.spoken.lock().expect("sim sound lock").push(text.to_string());
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimRig
// ────────────────────────────────────────────────────────────────────────────

/// A complete simulated rig with the concrete stub handles exposed so tests
/// can drive sensors and assert on actuation.
pub struct SimRig {
    pub left_wheel: Arc<SimMotor>,
    pub right_wheel: Arc<SimMotor>,
    pub posture_motor: Arc<SimMotor>,
    pub ir: Arc<SimProximity>,
    pub touch: Arc<SimTouch>,
    pub leds: Arc<SimLed>,
    pub screen: Arc<SimDisplay>,
    pub sound: Arc<SimSound>,
}

impl SimRig {
    /// Build a rig with neutral sensor values (proximity in the hold band,
    /// touch released) and an instant speaker.
    pub fn new() -> Self {
        Self::with_sound(SimSound::shared())
    }

    /// Build a rig around a specific speaker stub (e.g. one with latency).
    pub fn with_sound(sound: Arc<SimSound>) -> Self {
        Self {
            left_wheel: SimMotor::shared("left_wheel"),
            right_wheel: SimMotor::shared("right_wheel"),
            posture_motor: SimMotor::shared("posture_motor"),
            ir: SimProximity::shared("infrared", 40),
            touch: SimTouch::shared("touch"),
            leds: SimLed::shared(),
            screen: SimDisplay::shared(),
            sound,
        }
    }

    /// Bundle the stubs into the trait-object [`Rig`] the controller takes.
    pub fn rig(&self) -> Rig {
        Rig {
            drive: TankDrive::new(self.left_wheel.clone(), self.right_wheel.clone()),
            posture: self.posture_motor.clone(),
            ir: self.ir.clone(),
            touch: self.touch.clone(),
            leds: self.leds.clone(),
            screen: self.screen.clone(),
            sound: self.sound.clone(),
        }
    }
}

impl Default for SimRig {
    fn default() -> Self {
        Self::new()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_motor_records_timed_commands_in_order() {
        let motor = SimMotor::shared("left_wheel");
        motor.run_timed(750, Duration::from_millis(2500)).unwrap();
        motor.run_timed(-350, Duration::from_millis(1000)).unwrap();

        let commands = motor.commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].speed_sp, 750);
        assert_eq!(commands[0].duration_ms, 2500);
        assert_eq!(
            motor.last_command(),
            Some(MotorCommand {
                speed_sp: -350,
                duration_ms: 1000,
            })
        );
    }

    #[test]
    fn sim_motor_records_rotations_and_stops() {
        let motor = SimMotor::shared("posture_motor");
        motor.on_for_rotations(20, 0.5).unwrap();
        motor.stop().unwrap();
        assert_eq!(motor.rotation_commands(), vec![(20, 0.5)]);
        assert_eq!(motor.stop_count(), 1);
    }

    #[test]
    fn sim_proximity_is_settable() {
        let ir = SimProximity::shared("infrared", 40);
        assert_eq!(ir.proximity().unwrap(), 40);
        ir.set_distance(12);
        assert_eq!(ir.proximity().unwrap(), 12);
    }

    #[test]
    fn sim_touch_level_is_sampled_not_latched() {
        let touch = SimTouch::shared("touch");
        assert!(!touch.is_pressed().unwrap());
        touch.set_pressed(true);
        assert!(touch.is_pressed().unwrap());
        assert!(touch.is_pressed().unwrap());
        touch.set_pressed(false);
        assert!(!touch.is_pressed().unwrap());
    }

    #[test]
    fn sim_led_tracks_current_color_per_side() {
        let leds = SimLed::shared();
        leds.set_both(LedColor::Green).unwrap();
        leds.set_color(LedSide::Left, LedColor::Red).unwrap();
        assert_eq!(leds.current(LedSide::Left), Some(LedColor::Red));
        assert_eq!(leds.current(LedSide::Right), Some(LedColor::Green));
    }

    #[test]
    fn sim_display_records_frame_protocol() {
        let screen = SimDisplay::shared();
        screen.clear().unwrap();
        screen
            .draw_rectangle(Rect::new(5, 50, 75, 60), Fill::Black)
            .unwrap();
        screen.commit().unwrap();

        let ops = screen.ops();
        assert_eq!(ops[0], DisplayOp::Clear);
        assert!(matches!(ops[1], DisplayOp::Rectangle(_, Fill::Black)));
        assert_eq!(ops[2], DisplayOp::Commit);
        assert_eq!(screen.commits(), 1);
    }

    #[test]
    fn sim_sound_records_cues_and_speech() {
        let sound = SimSound::shared();
        sound.play_file("angry_bark.wav").unwrap();
        sound.speak("Hello").unwrap();
        assert_eq!(sound.played(), vec!["angry_bark.wav".to_string()]);
        assert_eq!(sound.spoken(), vec!["Hello".to_string()]);
    }

    #[test]
    fn full_sim_rig_runs_without_hardware() {
        let sim = SimRig::new();
        let rig = sim.rig();

        rig.drive.run_timed(75, 75, Duration::from_secs(1)).unwrap();
        rig.posture.on_for_rotations(50, -0.5).unwrap();
        rig.leds.set_both(LedColor::Green).unwrap();
        rig.sound.speak("ready").unwrap();

        assert_eq!(sim.left_wheel.commands().len(), 1);
        assert_eq!(sim.posture_motor.rotation_commands(), vec![(50, -0.5)]);
        assert_eq!(sim.sound.spoken(), vec!["ready".to_string()]);
    }
}
