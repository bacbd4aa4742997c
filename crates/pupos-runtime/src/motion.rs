//! [`MotionController`] – the command-to-actuation mapping.
//!
//! Translates direction tokens into differential-drive commands, issues the
//! fixed follow/hold pulses used by the heel behavior, and performs the
//! sit/stand posture moves on the auxiliary motor.
//!
//! Every actuation here is fire-and-forget: a command is handed to the
//! motor driver and forgotten, and a later command supersedes it at the
//! hardware layer. The only waiting this type ever does is the optional
//! blocking form of [`MotionController::travel`], which sleeps out the
//! commanded duration after issuing.

use std::sync::Arc;
use std::time::Duration;

use pupos_hal::Rig;
use pupos_types::{Direction, PupError};
use tracing::debug;

use crate::mode::ModeState;

/// Setpoint used by the heel/come pulses.
const PULSE_SPEED: i32 = 750;
/// Duration of a follow (forward/backward) pulse.
const PULSE: Duration = Duration::from_millis(2500);
/// Duration of a hold (zero setpoint) pulse.
const HOLD: Duration = Duration::from_millis(1000);

/// Wheel assist issued while standing up.
const STAND_ASSIST_SPEED: i32 = -350;
const STAND_ASSIST: Duration = Duration::from_millis(1000);

/// Auxiliary posture motor parameters.
const SIT_SPEED_PCT: i32 = 20;
const SIT_ROTATIONS: f32 = 0.5;
const STAND_SPEED_PCT: i32 = 50;
const STAND_ROTATIONS: f32 = -0.5;

/// Cheap-to-clone handle over the drive pair, the posture motor and the
/// mode flags STOP has to clear.
#[derive(Clone)]
pub struct MotionController {
    rig: Rig,
    mode: Arc<ModeState>,
}

impl MotionController {
    pub fn new(rig: Rig, mode: Arc<ModeState>) -> Self {
        Self { rig, mode }
    }

    /// Drive in `direction` at `speed` percent for `duration_secs`.
    ///
    /// Differential mapping: forward/backward drive both wheels with the
    /// same sign, left/right pivot the wheels against each other. `Stop`
    /// powers both wheels off immediately and additionally clears
    /// `patrol_mode` and `dance`, regardless of why it was invoked.
    ///
    /// With `blocking` set the call sleeps until the duration elapses;
    /// otherwise it returns as soon as the command is issued while the
    /// motors keep running.
    pub async fn travel(
        &self,
        direction: Direction,
        duration_secs: u64,
        speed: i32,
        blocking: bool,
    ) -> Result<(), PupError> {
        debug!(?direction, duration_secs, speed, blocking, "move command");
        let duration = Duration::from_secs(duration_secs);
        match direction {
            Direction::Forward => self.rig.drive.run_timed(speed, speed, duration)?,
            Direction::Backward => self.rig.drive.run_timed(-speed, -speed, duration)?,
            Direction::Left => self.rig.drive.run_timed(speed, -speed, duration)?,
            Direction::Right => self.rig.drive.run_timed(-speed, speed, duration)?,
            Direction::Stop => {
                self.rig.drive.off()?;
                self.mode.set_patrol_mode(false);
                self.mode.set_dance(false);
                return Ok(());
            }
        }
        if blocking {
            tokio::time::sleep(duration).await;
        }
        Ok(())
    }

    /// Fixed forward pulse toward the followed obstacle.
    pub fn forward_pulse(&self) -> Result<(), PupError> {
        self.rig.drive.run_timed(PULSE_SPEED, PULSE_SPEED, PULSE)
    }

    /// Fixed backward pulse away from the followed obstacle.
    pub fn backward_pulse(&self) -> Result<(), PupError> {
        self.rig.drive.run_timed(-PULSE_SPEED, -PULSE_SPEED, PULSE)
    }

    /// Zero-setpoint hold pulse.
    pub fn hold_pulse(&self) -> Result<(), PupError> {
        self.rig.drive.run_timed(0, 0, HOLD)
    }

    /// Fixed approach pulse used by the COME preset.
    pub fn come_pulse(&self) -> Result<(), PupError> {
        self.rig.drive.run_timed(PULSE_SPEED, PULSE_SPEED, PULSE)
    }

    /// Fold the hind gear to sit down.
    pub fn sit_down(&self) -> Result<(), PupError> {
        self.rig.posture.on_for_rotations(SIT_SPEED_PCT, SIT_ROTATIONS)
    }

    /// Unfold the hind gear to stand, with a short backward wheel assist so
    /// the body clears the gear. Both commands are fire-and-forget and run
    /// concurrently on the hardware.
    pub fn stand_up(&self) -> Result<(), PupError> {
        self.rig
            .drive
            .run_timed(STAND_ASSIST_SPEED, STAND_ASSIST_SPEED, STAND_ASSIST)?;
        self.rig
            .posture
            .on_for_rotations(STAND_SPEED_PCT, STAND_ROTATIONS)
    }
}
