//! [`BehaviorController`] – owns the always-on tasks.
//!
//! Spawns the five behavior loops plus the directive pump at construction
//! time; every loop starts with the process and lives until it ends. Each
//! loop owns its own cadence; there is no scheduler arbitrating between
//! them, and the motor driver gets no ordering guarantee across loops.
//!
//! Shutdown is cooperative (a shared flag each loop polls) with a hard
//! [`BehaviorController::abort`] for abrupt process-level teardown:
//! in-flight motor commands are never retracted either way.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pupos_hal::Rig;
use pupos_middleware::{EventBus, EventEmitter, Topic};
use pupos_types::{Direction, EventPayload};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::dance::DanceLoop;
use crate::dispatcher::CommandDispatcher;
use crate::eyes::EyeLoop;
use crate::heel::HeelLoop;
use crate::mode::ModeState;
use crate::motion::MotionController;
use crate::patrol::PatrolLoop;
use crate::touch::TouchLoop;
use crate::watchdog::Watchdog;

/// How often the directive pump re-checks the shutdown flag while idle.
const PUMP_TICK: Duration = Duration::from_millis(500);

/// Tunables the operator can override in the config file.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Nominal dance tempo.
    pub bpm: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self { bpm: 100 }
    }
}

pub struct BehaviorController {
    mode: Arc<ModeState>,
    watchdog: Arc<Watchdog>,
    shutdown: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl BehaviorController {
    /// Wire up the full behavior stack and spawn every task.
    pub fn spawn(rig: Rig, bus: EventBus, config: ControllerConfig) -> Self {
        let mode = Arc::new(ModeState::new());
        let watchdog = Arc::new(Watchdog::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let motion = MotionController::new(rig.clone(), Arc::clone(&mode));
        let emitter = EventEmitter::new(bus.clone(), "pupos-runtime::heel");

        // Deadlines sized to each loop's longest legitimate silence.
        watchdog.register("heel", Duration::from_secs(5));
        watchdog.register("patrol", Duration::from_secs(10));
        watchdog.register("dance", Duration::from_secs(5));
        watchdog.register("touch", Duration::from_secs(5));
        watchdog.register("eyes", Duration::from_secs(15));

        let mut handles = Vec::new();

        handles.push(tokio::spawn(
            HeelLoop::new(
                Arc::clone(&mode),
                motion.clone(),
                rig.clone(),
                emitter,
                Arc::clone(&watchdog),
                Arc::clone(&shutdown),
            )
            .run(),
        ));

        handles.push(tokio::spawn(
            PatrolLoop::new(
                Arc::clone(&mode),
                motion.clone(),
                Arc::clone(&watchdog),
                Arc::clone(&shutdown),
            )
            .run(),
        ));

        handles.push(tokio::spawn(
            DanceLoop::new(
                Arc::clone(&mode),
                rig.clone(),
                config.bpm,
                Arc::clone(&watchdog),
                Arc::clone(&shutdown),
            )
            .run(),
        ));

        handles.push(tokio::spawn(
            TouchLoop::new(
                Arc::clone(&mode),
                motion.clone(),
                rig.clone(),
                Arc::clone(&watchdog),
                Arc::clone(&shutdown),
            )
            .run(),
        ));

        handles.push(tokio::spawn(
            EyeLoop::new(
                Arc::clone(&mode),
                rig.screen.clone(),
                Arc::clone(&watchdog),
                Arc::clone(&shutdown),
            )
            .run(),
        ));

        handles.push(Self::spawn_directive_pump(
            rig,
            bus,
            Arc::clone(&mode),
            motion,
            Arc::clone(&shutdown),
        ));

        info!("behavior controller online: 5 loops + directive pump");

        Self {
            mode,
            watchdog,
            shutdown,
            handles,
        }
    }

    /// The pump feeds inbound control payloads to the dispatcher and reacts
    /// to system alerts (operator stop) by powering the drive off.
    fn spawn_directive_pump(
        rig: Rig,
        bus: EventBus,
        mode: Arc<ModeState>,
        motion: MotionController,
        shutdown: Arc<AtomicBool>,
    ) -> JoinHandle<()> {
        let dispatcher = CommandDispatcher::new(Arc::clone(&mode), motion.clone(), rig);
        let mut directives = bus.subscribe_to(Topic::Directives);
        let mut alerts = bus.subscribe_to(Topic::SystemAlerts);

        tokio::spawn(async move {
            info!("directive pump started");
            loop {
                if shutdown.load(Ordering::SeqCst) {
                    break;
                }
                tokio::select! {
                    event = directives.recv() => match event {
                        Some(event) => {
                            if let EventPayload::ControlPayload(raw) = event.payload {
                                dispatcher.handle_payload(&raw).await;
                            }
                        }
                        None => break,
                    },
                    event = alerts.recv() => {
                        if let Some(event) = event
                            && let EventPayload::Fault { component, message } = &event.payload
                        {
                            warn!(%component, %message, "system alert: stopping drive");
                            let _ = motion.travel(Direction::Stop, 0, 0, false).await;
                        }
                    },
                    _ = tokio::time::sleep(PUMP_TICK) => {}
                }
            }
            info!("directive pump stopped");
        })
    }

    /// Shared mode flags (diagnostics, console `/state`).
    pub fn mode(&self) -> Arc<ModeState> {
        Arc::clone(&self.mode)
    }

    /// Loop health registry.
    pub fn watchdog(&self) -> Arc<Watchdog> {
        Arc::clone(&self.watchdog)
    }

    /// Ask every loop to exit at its next flag poll. Motor commands already
    /// issued keep running on the hardware.
    pub fn begin_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Abrupt teardown: abort every task without draining.
    pub fn abort(self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pupos_hal::sim::SimRig;
    use pupos_types::RobotEvent;

    fn control_payload(raw: &str) -> RobotEvent {
        RobotEvent::new(
            "test::console",
            EventPayload::ControlPayload(raw.to_string()),
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn sit_directive_flows_from_bus_to_posture_motor() {
        let sim = SimRig::new();
        let bus = EventBus::default();
        let controller = BehaviorController::spawn(sim.rig(), bus.clone(), ControllerConfig::default());

        // Give the pump a moment to subscribe before publishing.
        tokio::time::sleep(Duration::from_millis(50)).await;
        bus.publish_to(
            Topic::Directives,
            control_payload(r#"{"type":"command","command":"sit"}"#),
        )
        .unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(sim.posture_motor.rotation_commands(), vec![(20, 0.5)]);
        assert!(!controller.mode().heel_mode());
        assert!(controller.mode().tempo_active());

        controller.abort();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn system_alert_stops_the_drive_and_clears_background_modes() {
        let sim = SimRig::new();
        let bus = EventBus::default();
        let controller = BehaviorController::spawn(sim.rig(), bus.clone(), ControllerConfig::default());
        controller.mode().set_patrol_mode(true);

        tokio::time::sleep(Duration::from_millis(50)).await;
        bus.publish_to(
            Topic::SystemAlerts,
            RobotEvent::new(
                "test::ctrlc",
                EventPayload::Fault {
                    component: "console".to_string(),
                    message: "operator stop".to_string(),
                },
            ),
        )
        .unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(sim.left_wheel.stop_count() >= 1);
        assert!(!controller.mode().patrol_mode());

        controller.abort();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn all_loops_heartbeat_at_startup() {
        let sim = SimRig::new();
        let bus = EventBus::default();
        let controller = BehaviorController::spawn(sim.rig(), bus, ControllerConfig::default());

        tokio::time::sleep(Duration::from_millis(200)).await;

        for (name, health) in controller.watchdog().statuses() {
            assert_eq!(
                health,
                crate::watchdog::LoopHealth::Healthy,
                "loop {name} should be healthy right after startup"
            );
        }

        controller.abort();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_patrol_and_dance_both_reach_the_motors() {
        // The documented hazard: no arbitration between behaviors. Both
        // loops run at once and interleave commands at the driver.
        let sim = SimRig::new();
        let bus = EventBus::default();
        let controller = BehaviorController::spawn(sim.rig(), bus, ControllerConfig::default());

        controller.mode().set_patrol_mode(true);
        controller.mode().set_dance(true);
        tokio::time::sleep(Duration::from_millis(1800)).await;

        let commands = sim.left_wheel.commands();
        let dance_pulses = commands
            .iter()
            .filter(|c| c.duration_ms == 150 || c.duration_ms == 300)
            .count();
        let patrol_legs = commands
            .iter()
            .filter(|c| c.duration_ms >= 1000)
            .count();
        assert!(dance_pulses > 0, "dance loop must have issued pulses");
        assert!(patrol_legs > 0, "patrol loop must have issued legs");

        controller.abort();
    }
}
