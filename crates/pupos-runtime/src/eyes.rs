//! [`EyeLoop`] – the blink animation.
//!
//! While `eyes_on` is set (it starts set and nothing clears it in normal
//! operation) the loop alternates two frames: "closed" — two low, flat
//! rectangles held for ten seconds — and "open" — two tall rectangles held
//! for one second. Every frame is a full clear → draw → commit cycle on
//! the display.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pupos_hal::{EyeDisplay, Fill, Rect};
use pupos_types::PupError;
use tracing::{error, info};

use crate::mode::ModeState;
use crate::watchdog::Watchdog;

/// Flag poll cadence while the animation is disabled.
const IDLE_POLL: Duration = Duration::from_secs(1);
/// Hold times for the two frames.
const CLOSED_HOLD: Duration = Duration::from_secs(10);
const OPEN_HOLD: Duration = Duration::from_secs(1);

/// Closed lids: flat rectangles at the lowered y-position.
const CLOSED_EYES: [Rect; 2] = [Rect::new(5, 50, 75, 60), Rect::new(103, 50, 173, 60)];
/// Open eyes: the full-height rectangles.
const OPEN_EYES: [Rect; 2] = [Rect::new(5, 10, 75, 100), Rect::new(103, 10, 173, 100)];

pub struct EyeLoop {
    mode: Arc<ModeState>,
    screen: Arc<dyn EyeDisplay>,
    watchdog: Arc<Watchdog>,
    shutdown: Arc<AtomicBool>,
}

impl EyeLoop {
    pub fn new(
        mode: Arc<ModeState>,
        screen: Arc<dyn EyeDisplay>,
        watchdog: Arc<Watchdog>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            mode,
            screen,
            watchdog,
            shutdown,
        }
    }

    pub async fn run(self) {
        info!("eye loop started");
        while !self.shutdown.load(Ordering::SeqCst) {
            self.watchdog.heartbeat("eyes");

            if !self.mode.eyes_on() {
                tokio::time::sleep(IDLE_POLL).await;
                continue;
            }

            if let Err(err) = self.draw(&CLOSED_EYES) {
                error!(%err, "eye loop lost its display");
                return;
            }
            tokio::time::sleep(CLOSED_HOLD).await;

            self.watchdog.heartbeat("eyes");
            if let Err(err) = self.draw(&OPEN_EYES) {
                error!(%err, "eye loop lost its display");
                return;
            }
            tokio::time::sleep(OPEN_HOLD).await;
        }
        info!("eye loop stopped");
    }

    /// Render one frame: full clear, both rectangles, commit.
    fn draw(&self, eyes: &[Rect; 2]) -> Result<(), PupError> {
        self.screen.clear()?;
        for rect in eyes {
            self.screen.draw_rectangle(*rect, Fill::Black)?;
        }
        self.screen.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pupos_hal::sim::{DisplayOp, SimRig};

    fn eye_loop(sim: &SimRig) -> (EyeLoop, Arc<ModeState>, Arc<AtomicBool>) {
        let mode = Arc::new(ModeState::new());
        let watchdog = Arc::new(Watchdog::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let eyes = EyeLoop::new(
            Arc::clone(&mode),
            sim.screen.clone(),
            watchdog,
            Arc::clone(&shutdown),
        );
        (eyes, mode, shutdown)
    }

    #[test]
    fn frame_follows_clear_draw_commit_protocol() {
        let sim = SimRig::new();
        let (eyes, _, _) = eye_loop(&sim);

        eyes.draw(&CLOSED_EYES).unwrap();

        assert_eq!(
            sim.screen.ops(),
            vec![
                DisplayOp::Clear,
                DisplayOp::Rectangle(CLOSED_EYES[0], Fill::Black),
                DisplayOp::Rectangle(CLOSED_EYES[1], Fill::Black),
                DisplayOp::Commit,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn blink_cycle_holds_closed_ten_seconds_then_open_one() {
        let sim = SimRig::new();
        let (eyes, _, shutdown) = eye_loop(&sim);

        let handle = tokio::spawn(eyes.run());

        // One full cycle is 11 s; 23 s covers two closed and two open frames.
        tokio::time::sleep(Duration::from_secs(23)).await;
        shutdown.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(12)).await;
        handle.await.unwrap();

        let ops = sim.screen.ops();
        let rects: Vec<Rect> = ops
            .iter()
            .filter_map(|op| match op {
                DisplayOp::Rectangle(rect, _) => Some(*rect),
                _ => None,
            })
            .collect();

        // Closed frame first, open frame second, then the cycle repeats.
        assert_eq!(rects[0], CLOSED_EYES[0]);
        assert_eq!(rects[1], CLOSED_EYES[1]);
        assert_eq!(rects[2], OPEN_EYES[0]);
        assert_eq!(rects[3], OPEN_EYES[1]);
        assert_eq!(rects[4], CLOSED_EYES[0]);
        assert!(sim.screen.commits() >= 4);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_eyes_draw_nothing() {
        let sim = SimRig::new();
        let (eyes, mode, shutdown) = eye_loop(&sim);
        mode.set_eyes_on(false);

        let handle = tokio::spawn(eyes.run());
        tokio::time::sleep(Duration::from_secs(5)).await;
        shutdown.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(2)).await;
        handle.await.unwrap();

        assert!(sim.screen.ops().is_empty());
    }
}
