//! [`PatrolLoop`] – random wandering while `patrol_mode` is set.
//!
//! Idle at a one-second flag poll; while patrolling, each iteration picks a
//! random non-STOP direction, a duration of 1–5 s and a speed from
//! {25, 50, 75, 100}, issues the move non-blocking and then sleeps out the
//! chosen duration. The sleep, not the motor command, gates the cadence.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pupos_types::Direction;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, error, info};

use crate::mode::ModeState;
use crate::motion::MotionController;
use crate::watchdog::Watchdog;

/// Flag poll cadence while idle.
const IDLE_POLL: Duration = Duration::from_secs(1);

pub struct PatrolLoop {
    mode: Arc<ModeState>,
    motion: MotionController,
    watchdog: Arc<Watchdog>,
    shutdown: Arc<AtomicBool>,
}

impl PatrolLoop {
    pub fn new(
        mode: Arc<ModeState>,
        motion: MotionController,
        watchdog: Arc<Watchdog>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            mode,
            motion,
            watchdog,
            shutdown,
        }
    }

    pub async fn run(self) {
        info!("patrol loop started");
        while !self.shutdown.load(Ordering::SeqCst) {
            self.watchdog.heartbeat("patrol");

            if !self.mode.patrol_mode() {
                tokio::time::sleep(IDLE_POLL).await;
                continue;
            }

            let (direction, duration, speed) = {
                let mut rng = rand::thread_rng();
                (
                    sample_direction(&mut rng),
                    rng.gen_range(1..=5u64),
                    rng.gen_range(1..=4) * 25,
                )
            };
            debug!(?direction, duration, speed, "patrol leg");

            if let Err(err) = self.motion.travel(direction, duration, speed, false).await {
                error!(%err, "patrol loop actuation failed");
                return;
            }

            tokio::time::sleep(Duration::from_secs(duration)).await;
        }
        info!("patrol loop stopped");
    }
}

/// Uniform random direction, resampled until it is not STOP.
fn sample_direction(rng: &mut impl Rng) -> Direction {
    let mut direction = *Direction::ALL.choose(rng).expect("non-empty");
    while direction == Direction::Stop {
        direction = *Direction::ALL.choose(rng).expect("non-empty");
    }
    direction
}
