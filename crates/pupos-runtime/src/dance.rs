//! [`DanceLoop`] – tempo-locked dance while `dance` is set.
//!
//! The beat interval derives from the nominal BPM as
//! `min(1000 ms, round(60000 / bpm) * 0.65)` — 390 ms at the default
//! 100 BPM. Each bar is a fixed four-step pattern, one beat apart:
//!
//! 1. toggle the LED color (alternating a random pool color with off),
//!    flip the motor sign, and issue a symmetric-opposite 150 ms pulse;
//! 2. the same pulse with the wheels' roles swapped (same net effect);
//! 3. a smaller fixed symmetric-opposite 300 ms sway, independent of the
//!    toggling sign;
//! 4. the step-1 pulse again.
//!
//! The bar repeats for as long as the flag stays set; clearing it (the
//! dispatcher's STOP path, or the end of a coffin cue) returns the loop to
//! its one-second idle poll.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pupos_hal::{LedColor, Rig};
use pupos_types::PupError;
use rand::seq::SliceRandom;
use tracing::{error, info};

use crate::mode::ModeState;
use crate::watchdog::Watchdog;

/// Flag poll cadence while idle.
const IDLE_POLL: Duration = Duration::from_secs(1);
/// Base motor setpoint; its sign flips every bar.
const BASE_SPEED: i32 = 400;
/// Duration of the step-1/2/4 pulses.
const STEP_PULSE: Duration = Duration::from_millis(150);
/// Setpoint and duration of the step-3 sway.
const SWAY_SPEED: i32 = 350;
const SWAY_PULSE: Duration = Duration::from_millis(300);
/// LED colors the toggle alternates with off.
const COLOR_POOL: [LedColor; 4] = [
    LedColor::Green,
    LedColor::Red,
    LedColor::Amber,
    LedColor::Yellow,
];

/// Beat interval for a nominal BPM: `min(1000 ms, round(60000/bpm) * 0.65)`.
pub fn beat_interval(bpm: u32) -> Duration {
    let millis = ((60_000.0 / f64::from(bpm)).round() * 0.65).min(1000.0);
    Duration::from_millis(millis as u64)
}

pub struct DanceLoop {
    mode: Arc<ModeState>,
    rig: Rig,
    bpm: u32,
    watchdog: Arc<Watchdog>,
    shutdown: Arc<AtomicBool>,
}

impl DanceLoop {
    pub fn new(
        mode: Arc<ModeState>,
        rig: Rig,
        bpm: u32,
        watchdog: Arc<Watchdog>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            mode,
            rig,
            bpm,
            watchdog,
            shutdown,
        }
    }

    pub async fn run(self) {
        let beat = beat_interval(self.bpm);
        info!(bpm = self.bpm, beat_ms = beat.as_millis() as u64, "dance loop started");

        // Color and sign carry over between bars.
        let mut led_color = random_color();
        let mut motor_speed = BASE_SPEED;

        while !self.shutdown.load(Ordering::SeqCst) {
            self.watchdog.heartbeat("dance");

            if !self.mode.dance() {
                tokio::time::sleep(IDLE_POLL).await;
                continue;
            }

            if let Err(err) = self.bar(&mut led_color, &mut motor_speed, beat).await {
                error!(%err, "dance loop actuation failed");
                return;
            }
        }
        info!("dance loop stopped");
    }

    /// One four-step bar.
    async fn bar(
        &self,
        led_color: &mut LedColor,
        motor_speed: &mut i32,
        beat: Duration,
    ) -> Result<(), PupError> {
        // Step 1: alternate LED color and motor direction.
        *led_color = if *led_color != LedColor::Black {
            LedColor::Black
        } else {
            random_color()
        };
        *motor_speed = -*motor_speed;

        self.rig.leds.set_both(*led_color)?;
        self.rig
            .drive
            .run_timed(-*motor_speed, *motor_speed, STEP_PULSE)?;
        tokio::time::sleep(beat).await;

        // Step 2: wheels' roles swapped, same net effect.
        self.rig
            .drive
            .run_timed(-*motor_speed, *motor_speed, STEP_PULSE)?;
        tokio::time::sleep(beat).await;

        // Step 3: the fixed sway, independent of the toggling sign.
        self.rig
            .drive
            .run_timed(-SWAY_SPEED, SWAY_SPEED, SWAY_PULSE)?;
        tokio::time::sleep(beat).await;

        // Step 4: the step-1 pulse again.
        self.rig
            .drive
            .run_timed(-*motor_speed, *motor_speed, STEP_PULSE)?;
        tokio::time::sleep(beat).await;

        Ok(())
    }
}

fn random_color() -> LedColor {
    *COLOR_POOL
        .choose(&mut rand::thread_rng())
        .expect("color pool is non-empty")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pupos_hal::sim::SimRig;

    #[test]
    fn beat_interval_at_100_bpm_is_exactly_390ms() {
        assert_eq!(beat_interval(100), Duration::from_millis(390));
    }

    #[test]
    fn beat_interval_clamps_to_one_second_for_slow_tempos() {
        // 60000/30 = 2000, * 0.65 = 1300 → clamped.
        assert_eq!(beat_interval(30), Duration::from_millis(1000));
        assert_eq!(beat_interval(10), Duration::from_millis(1000));
    }

    #[test]
    fn beat_interval_scales_above_the_clamp_threshold() {
        // 60000/120 = 500, * 0.65 = 325.
        assert_eq!(beat_interval(120), Duration::from_millis(325));
    }

    fn dance_loop(sim: &SimRig) -> (DanceLoop, Arc<ModeState>, Arc<AtomicBool>) {
        let mode = Arc::new(ModeState::new());
        let watchdog = Arc::new(Watchdog::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let dance = DanceLoop::new(
            Arc::clone(&mode),
            sim.rig(),
            100,
            watchdog,
            Arc::clone(&shutdown),
        );
        (dance, mode, shutdown)
    }

    #[tokio::test(start_paused = true)]
    async fn dancing_issues_the_four_step_pattern() {
        let sim = SimRig::new();
        let (dance, mode, shutdown) = dance_loop(&sim);
        mode.set_dance(true);

        let handle = tokio::spawn(dance.run());
        // 390 ms * 4 steps per bar: a few seconds covers several bars.
        tokio::time::sleep(Duration::from_secs(4)).await;
        shutdown.store(true, Ordering::SeqCst);
        mode.set_dance(false);
        tokio::time::sleep(Duration::from_secs(3)).await;
        handle.await.unwrap();

        let left = sim.left_wheel.commands();
        let right = sim.right_wheel.commands();
        assert!(!left.is_empty());
        assert_eq!(left.len(), right.len());

        for (l, r) in left.iter().zip(&right) {
            // Every pulse is symmetric-opposite.
            assert_eq!(l.speed_sp, -r.speed_sp);
            match l.duration_ms {
                150 => assert_eq!(l.speed_sp.abs(), BASE_SPEED),
                300 => assert_eq!(l.speed_sp.abs(), SWAY_SPEED),
                other => panic!("unexpected pulse duration {other}"),
            }
        }

        // Per bar: three 150 ms pulses and one 300 ms sway.
        let sways = left.iter().filter(|c| c.duration_ms == 300).count();
        let steps = left.iter().filter(|c| c.duration_ms == 150).count();
        assert!(sways >= 1);
        assert!(steps >= 3 * sways);
    }

    #[tokio::test(start_paused = true)]
    async fn led_toggle_alternates_color_with_off() {
        let sim = SimRig::new();
        let (dance, mode, shutdown) = dance_loop(&sim);
        mode.set_dance(true);

        let handle = tokio::spawn(dance.run());
        tokio::time::sleep(Duration::from_secs(7)).await;
        shutdown.store(true, Ordering::SeqCst);
        mode.set_dance(false);
        tokio::time::sleep(Duration::from_secs(3)).await;
        handle.await.unwrap();

        let history = sim.leds.history();
        assert!(history.iter().any(|(_, c)| *c == LedColor::Black));
        assert!(history.iter().any(|(_, c)| COLOR_POOL.contains(c)));
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_the_flag_returns_to_idle() {
        let sim = SimRig::new();
        let (dance, mode, shutdown) = dance_loop(&sim);
        mode.set_dance(true);

        let handle = tokio::spawn(dance.run());
        tokio::time::sleep(Duration::from_secs(2)).await;
        mode.set_dance(false);
        // Let the in-flight bar drain, then snapshot the command count.
        tokio::time::sleep(Duration::from_secs(3)).await;
        let settled = sim.left_wheel.commands().len();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(sim.left_wheel.commands().len(), settled, "idle issues nothing");

        shutdown.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(2)).await;
        handle.await.unwrap();
    }
}
