//! `pupos-runtime` – The Behavior Controller
//!
//! The execution engine: shared mode flags, the directive-to-actuation
//! mapping, and the five always-on behavior loops that read sensors and
//! flags and issue motor commands as peers, with no central scheduler.
//!
//! # Modules
//!
//! - [`mode`] – [`ModeState`][mode::ModeState]: the six shared behavior
//!   flags behind one short-critical-section mutex.
//! - [`motion`] – [`MotionController`][motion::MotionController]: the
//!   differential-drive mapping, the fixed follow/hold pulses, and the
//!   sit/stand posture moves.
//! - [`dispatcher`] – [`CommandDispatcher`][dispatcher::CommandDispatcher]:
//!   decodes inbound directives and evaluates every preset rule
//!   independently (several may fire for one input).
//! - [`heel`], [`patrol`], [`dance`], [`touch`], [`eyes`] – the five
//!   behavior loops, each a long-lived task owning its own poll cadence.
//! - [`watchdog`] – [`Watchdog`][watchdog::Watchdog]: per-loop heartbeat
//!   deadlines, so one dead sensor is observable without halting the
//!   sibling loops.
//! - [`controller`] – [`BehaviorController`][controller::BehaviorController]:
//!   spawns everything at construction time and wires the directive pump.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: tracing
//!   subscriber with optional OTLP span export.
//!
//! # Shared-state model
//!
//! `ModeState` is the only cross-task state and the mutex around it is the
//! only lock. Nothing serializes the behaviors themselves: two active loops
//! may interleave motor commands, and whichever lands last at the driver
//! wins. That race is observable, intended, and covered by tests.

pub mod controller;
pub mod dance;
pub mod dispatcher;
pub mod eyes;
pub mod heel;
pub mod mode;
pub mod motion;
pub mod patrol;
pub mod telemetry;
pub mod touch;
pub mod watchdog;

pub use controller::{BehaviorController, ControllerConfig};
pub use dance::{DanceLoop, beat_interval};
pub use dispatcher::CommandDispatcher;
pub use eyes::EyeLoop;
pub use heel::HeelLoop;
pub use mode::{ModeSnapshot, ModeState};
pub use motion::MotionController;
pub use patrol::PatrolLoop;
pub use telemetry::{TracerProviderGuard, init_tracing};
pub use touch::TouchLoop;
pub use watchdog::{LoopHealth, Watchdog};
