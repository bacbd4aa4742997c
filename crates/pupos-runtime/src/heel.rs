//! [`HeelLoop`] – threshold-based obstacle following.
//!
//! Two states. **Idle** while `heel_mode` is off, polling the flag once a
//! second. **Following** while it is on: every 200 ms the proximity
//! distance is sampled and exactly one of three hysteresis branches fires —
//! too close (< 35) backs away and barks, too far (> 50) closes in, and
//! the [35, 50] band holds still.
//!
//! Pulses are issued fire-and-forget. A pulse lasts 1–2.5 s while the poll
//! interval is 0.2 s, so consecutive pulses overlap and the most recently
//! issued one wins at the motor driver. That overlap is the intended
//! smoothing: no in-flight handle is kept and nothing waits.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pupos_hal::Rig;
use pupos_types::{EventName, GadgetPayload, PupError};
use pupos_middleware::EventEmitter;
use tracing::{debug, error, info};

use crate::mode::ModeState;
use crate::motion::MotionController;
use crate::watchdog::Watchdog;

/// Flag poll cadence while idle.
const IDLE_POLL: Duration = Duration::from_secs(1);
/// Sensor poll cadence while following.
const ACTIVE_POLL: Duration = Duration::from_millis(200);
/// Below this distance the robot backs off (and barks).
const NEAR_LIMIT: i32 = 35;
/// Above this distance the robot closes in.
const FAR_LIMIT: i32 = 50;

pub struct HeelLoop {
    mode: Arc<ModeState>,
    motion: MotionController,
    rig: Rig,
    emitter: EventEmitter,
    watchdog: Arc<Watchdog>,
    shutdown: Arc<AtomicBool>,
}

impl HeelLoop {
    pub fn new(
        mode: Arc<ModeState>,
        motion: MotionController,
        rig: Rig,
        emitter: EventEmitter,
        watchdog: Arc<Watchdog>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            mode,
            motion,
            rig,
            emitter,
            watchdog,
            shutdown,
        }
    }

    /// Run until shutdown, or until the sensor or the drive fails (which is
    /// fatal to this loop only).
    pub async fn run(self) {
        info!("heel loop started");
        while !self.shutdown.load(Ordering::SeqCst) {
            self.watchdog.heartbeat("heel");

            if !self.mode.heel_mode() {
                tokio::time::sleep(IDLE_POLL).await;
                continue;
            }

            let distance = match self.rig.ir.proximity() {
                Ok(distance) => distance,
                Err(err) => {
                    error!(%err, "heel loop lost its proximity sensor");
                    return;
                }
            };

            if let Err(err) = self.react(distance) {
                error!(%err, "heel loop actuation failed");
                return;
            }

            tokio::time::sleep(ACTIVE_POLL).await;
        }
        info!("heel loop stopped");
    }

    /// One following iteration: exactly one branch fires per sample.
    fn react(&self, distance: i32) -> Result<(), PupError> {
        debug!(distance, "proximity sample");
        if distance < NEAR_LIMIT {
            self.motion.backward_pulse()?;
            self.emitter
                .emit(EventName::Bark, GadgetPayload::Bark { distance });
        } else if distance > FAR_LIMIT {
            self.motion.forward_pulse()?;
        } else {
            self.motion.hold_pulse()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pupos_hal::sim::SimRig;
    use pupos_middleware::{EventBus, Topic};
    use pupos_types::EventPayload;

    fn heel_loop(sim: &SimRig, bus: &EventBus) -> (HeelLoop, Arc<ModeState>, Arc<AtomicBool>) {
        let mode = Arc::new(ModeState::new());
        let motion = MotionController::new(sim.rig(), Arc::clone(&mode));
        let emitter = EventEmitter::new(bus.clone(), "pupos-runtime::heel");
        let watchdog = Arc::new(Watchdog::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let heel = HeelLoop::new(
            Arc::clone(&mode),
            motion,
            sim.rig(),
            emitter,
            Arc::clone(&watchdog),
            Arc::clone(&shutdown),
        );
        (heel, mode, shutdown)
    }

    #[tokio::test]
    async fn close_obstacle_backs_off_and_barks() {
        let bus = EventBus::default();
        let mut events = bus.subscribe_to(Topic::GadgetEvents);
        let sim = SimRig::new();
        let (heel, _, _) = heel_loop(&sim, &bus);

        heel.react(20).unwrap();

        assert_eq!(sim.left_wheel.last_command().unwrap().speed_sp, -750);
        let event = events.recv().await.expect("bark event");
        match event.payload {
            EventPayload::Gadget(gadget) => {
                assert_eq!(gadget.name, EventName::Bark);
                assert_eq!(gadget.payload, GadgetPayload::Bark { distance: 20 });
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn far_obstacle_closes_in_without_barking() {
        let bus = EventBus::default();
        let mut events = bus.subscribe_to(Topic::GadgetEvents);
        let sim = SimRig::new();
        let (heel, _, _) = heel_loop(&sim, &bus);

        heel.react(80).unwrap();

        assert_eq!(sim.left_wheel.last_command().unwrap().speed_sp, 750);
        assert!(events.try_recv().is_none(), "no bark when following");
    }

    #[tokio::test]
    async fn hysteresis_band_holds_still() {
        let bus = EventBus::default();
        let sim = SimRig::new();
        let (heel, _, _) = heel_loop(&sim, &bus);

        for distance in [35, 42, 50] {
            heel.react(distance).unwrap();
            let command = sim.left_wheel.last_command().unwrap();
            assert_eq!(command.speed_sp, 0, "distance {distance} must hold");
            assert_eq!(command.duration_ms, 1000);
        }
    }

    #[tokio::test]
    async fn exactly_one_pulse_per_sample() {
        let bus = EventBus::default();
        let sim = SimRig::new();
        let (heel, _, _) = heel_loop(&sim, &bus);

        heel.react(20).unwrap();
        heel.react(80).unwrap();
        heel.react(40).unwrap();

        // Three samples, three pulses per wheel — never two branches at once.
        assert_eq!(sim.left_wheel.commands().len(), 3);
        assert_eq!(sim.right_wheel.commands().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_idles_until_heel_mode_is_set() {
        let bus = EventBus::default();
        let sim = SimRig::new();
        let (heel, mode, shutdown) = heel_loop(&sim, &bus);
        sim.ir.set_distance(20);

        let handle = tokio::spawn(heel.run());

        // Idle: a second of polling produces no actuation.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(sim.left_wheel.commands().is_empty());

        // Following: pulses start arriving on the 200 ms cadence.
        mode.set_heel_mode(true);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!sim.left_wheel.commands().is_empty());
        assert!(sim.left_wheel.commands().iter().all(|c| c.speed_sp == -750));

        shutdown.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(2)).await;
        handle.await.unwrap();
    }
}
