//! [`Motor`] trait for the timed drive and posture motors, plus
//! [`TankDrive`], the differential left/right pair.
//!
//! The contract is deliberately thin: a timed speed command is issued and
//! forgotten. There is no queue and no cancellation handle; a command that
//! lands while a previous one is still running simply supersedes it at the
//! hardware layer (last write wins). Callers that need to know when a
//! command finished must wait out its duration themselves.

use std::sync::Arc;
use std::time::Duration;

use pupos_types::PupError;

/// A single timed speed command, as accepted by [`Motor::run_timed`].
///
/// Transient: issued and forgotten, never persisted. The simulated drivers
/// record these so tests can assert on actuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorCommand {
    /// Signed speed setpoint (device units; percent values are passed
    /// through unscaled).
    pub speed_sp: i32,
    /// Bound of this command; the motor powers off when it elapses.
    pub duration_ms: u64,
}

/// A timed motor (drive wheel or auxiliary posture motor).
///
/// Every motor has a stable string identifier so logs and fault reports can
/// name the failing device.
pub trait Motor: Send + Sync {
    /// Stable identifier, e.g. `"left_wheel"` or `"posture_motor"`.
    fn id(&self) -> &str;

    /// Run at `speed_sp` for `duration`, fire-and-forget.
    ///
    /// Returns as soon as the command is accepted; the motor keeps running
    /// asynchronously until the duration elapses or a later command
    /// supersedes this one.
    ///
    /// # Errors
    ///
    /// Returns [`PupError::HardwareFault`] if the command cannot be issued.
    fn run_timed(&self, speed_sp: i32, duration: Duration) -> Result<(), PupError>;

    /// Turn a fixed number of `rotations` at `speed_pct`, fire-and-forget.
    ///
    /// Used by the posture moves on the auxiliary motor; negative rotations
    /// reverse the direction.
    fn on_for_rotations(&self, speed_pct: i32, rotations: f32) -> Result<(), PupError>;

    /// Power off immediately.
    fn stop(&self) -> Result<(), PupError>;
}

/// The differential drive pair.
///
/// Cheap to clone: both handles are shared `Arc`s. There is no arbitration
/// between clones — whichever command lands last at the hardware boundary
/// determines physical motion until superseded.
#[derive(Clone)]
pub struct TankDrive {
    left: Arc<dyn Motor>,
    right: Arc<dyn Motor>,
}

impl TankDrive {
    pub fn new(left: Arc<dyn Motor>, right: Arc<dyn Motor>) -> Self {
        Self { left, right }
    }

    /// Issue a timed command to both wheels, fire-and-forget.
    pub fn run_timed(
        &self,
        left_sp: i32,
        right_sp: i32,
        duration: Duration,
    ) -> Result<(), PupError> {
        self.left.run_timed(left_sp, duration)?;
        self.right.run_timed(right_sp, duration)
    }

    /// Power both wheels off immediately.
    pub fn off(&self) -> Result<(), PupError> {
        self.left.stop()?;
        self.right.stop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimMotor;

    #[test]
    fn tank_drive_fans_out_to_both_wheels() {
        let left = SimMotor::shared("left_wheel");
        let right = SimMotor::shared("right_wheel");
        let tank = TankDrive::new(left.clone(), right.clone());

        tank.run_timed(75, -75, Duration::from_secs(2)).unwrap();

        assert_eq!(
            left.commands(),
            vec![MotorCommand {
                speed_sp: 75,
                duration_ms: 2000,
            }]
        );
        assert_eq!(
            right.commands(),
            vec![MotorCommand {
                speed_sp: -75,
                duration_ms: 2000,
            }]
        );
    }

    #[test]
    fn tank_drive_off_stops_both_wheels() {
        let left = SimMotor::shared("left_wheel");
        let right = SimMotor::shared("right_wheel");
        let tank = TankDrive::new(left.clone(), right.clone());

        tank.off().unwrap();

        assert_eq!(left.stop_count(), 1);
        assert_eq!(right.stop_count(), 1);
    }
}
