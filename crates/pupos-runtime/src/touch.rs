//! [`TouchLoop`] – sit/stand toggling on touch.
//!
//! Tight poll with no timed sleep: every iteration samples the pressed
//! level and yields to the scheduler. While pressed the side LEDs show the
//! warning color and the sitting posture toggles; released restores the
//! neutral color. There is no debounce — a press held across several polls
//! toggles on every sampled iteration, not only on edges.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use pupos_hal::{LedColor, Rig};
use pupos_types::PupError;
use tracing::{error, info};

use crate::mode::ModeState;
use crate::motion::MotionController;
use crate::watchdog::Watchdog;

/// LED color while the sensor is pressed.
const WARNING: LedColor = LedColor::Red;
/// LED color while released.
const NEUTRAL: LedColor = LedColor::Green;

pub struct TouchLoop {
    mode: Arc<ModeState>,
    motion: MotionController,
    rig: Rig,
    watchdog: Arc<Watchdog>,
    shutdown: Arc<AtomicBool>,
}

impl TouchLoop {
    pub fn new(
        mode: Arc<ModeState>,
        motion: MotionController,
        rig: Rig,
        watchdog: Arc<Watchdog>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            mode,
            motion,
            rig,
            watchdog,
            shutdown,
        }
    }

    pub async fn run(self) {
        info!("touch loop started");
        while !self.shutdown.load(Ordering::SeqCst) {
            self.watchdog.heartbeat("touch");

            if let Err(err) = self.step() {
                error!(%err, "touch loop failed");
                return;
            }

            tokio::task::yield_now().await;
        }
        info!("touch loop stopped");
    }

    /// One poll iteration.
    fn step(&self) -> Result<(), PupError> {
        if self.rig.touch.is_pressed()? {
            self.rig.leds.set_both(WARNING)?;
            if self.mode.sitting() {
                self.motion.stand_up()?;
                self.mode.set_sitting(false);
            } else {
                self.motion.sit_down()?;
                self.mode.set_sitting(true);
            }
        } else {
            self.rig.leds.set_both(NEUTRAL)?;
        }
        Ok(())
    }
}
