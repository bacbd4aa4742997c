//! `pupos-cli` – the PupOS entry point.
//!
//! Boots the behavior controller against the simulated rig and drops the
//! operator into an interactive console that doubles as the transport
//! boundary:
//!
//! 1. Initialises structured logging (`RUST_LOG`, `PUPOS_LOG_FORMAT=json`,
//!    optional OTLP export).
//! 2. Loads `~/.pupos/config.toml`, writing defaults on first run.
//! 3. Spawns the five behavior loops plus the directive pump.
//! 4. Runs the startup ceremony (greeting + green LEDs) and mirrors
//!    outbound gadget events (bark) to the console.
//! 5. Intercepts **Ctrl-C** to publish a stop alert and exit cleanly.

mod config;
mod repl;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use pupos_hal::LedColor;
use pupos_hal::sim::SimRig;
use pupos_middleware::{EventBus, Topic};
use pupos_runtime::{BehaviorController, ControllerConfig};
use pupos_types::{EventPayload, GadgetPayload, RobotEvent};

fn main() {
    // Hold the guard for the whole process so pending spans are flushed.
    let _telemetry = pupos_runtime::init_tracing("pupos");

    print_banner();

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let cfg = config::Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  No config found – wrote defaults to {}",
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Config write failed".yellow(), e),
            }
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };

    // ── Shared shutdown flag + bus ────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let bus = EventBus::new(64);

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    // Publishes a stop alert so the directive pump powers the drive off,
    // then flags the console to exit.
    {
        let shutdown = Arc::clone(&shutdown);
        let bus = bus.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            println!();
            println!("{}", "Ctrl-C received – stopping.".yellow().bold());
            let _ = bus.publish_to(
                Topic::SystemAlerts,
                RobotEvent::new(
                    "pupos-cli",
                    EventPayload::Fault {
                        component: "console".to_string(),
                        message: "operator stop".to_string(),
                    },
                ),
            );
            shutdown.store(true, Ordering::SeqCst);
        }) {
            warn!(error = %e, "failed to install Ctrl-C handler");
        }
    }

    // ── Runtime + behavior stack ──────────────────────────────────────────
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{}: {}", "Runtime init failed".red(), e);
            return;
        }
    };
    let _enter = runtime.enter();

    // Headless operation drives the simulated rig; a build for the physical
    // robot wires real device drivers into the same Rig here.
    let sim = SimRig::new();
    let rig = sim.rig();
    println!("  {} simulated rig (no hardware attached)", "Rig:".bold());

    let controller =
        BehaviorController::spawn(rig.clone(), bus.clone(), ControllerConfig { bpm: cfg.bpm });

    // ── Startup ceremony ──────────────────────────────────────────────────
    if let Err(e) = rig.sound.speak(&cfg.greeting) {
        warn!(error = %e, "greeting failed");
    }
    if let Err(e) = rig.leds.set_both(LedColor::Green) {
        warn!(error = %e, "status LEDs unavailable");
    }

    // ── Gadget event mirror ───────────────────────────────────────────────
    // Prints outbound events (bark) the way the paired device would see
    // them.
    {
        let mut events = bus.subscribe_to(Topic::GadgetEvents);
        runtime.spawn(async move {
            while let Some(event) = events.recv().await {
                if let EventPayload::Gadget(gadget) = event.payload {
                    let GadgetPayload::Bark { distance } = gadget.payload;
                    println!(
                        "  {} {} {}",
                        "event:".dimmed(),
                        gadget.name.as_str().bold().yellow(),
                        format!("distance={distance}").dimmed()
                    );
                }
            }
        });
    }

    println!(
        "  Type {} for a list of commands.\n",
        "/help".bold().cyan()
    );

    // ── Interactive console ───────────────────────────────────────────────
    repl::run(
        Arc::clone(&shutdown),
        bus,
        controller.mode(),
        controller.watchdog(),
    );

    // ── Shutdown ceremony ─────────────────────────────────────────────────
    controller.begin_shutdown();
    let _ = rig.leds.set_both(LedColor::Black);
    println!("{}", "Goodbye.".green());
    // Dropping the runtime tears the remaining tasks down abruptly;
    // already-issued motor commands are never retracted.
}

fn print_banner() {
    println!();
    println!("{}", "  ╔══════════════════════════════════╗".bold().cyan());
    println!("{}", "  ║   PupOS – behavior controller    ║".bold().cyan());
    println!("{}", "  ╚══════════════════════════════════╝".bold().cyan());
    println!();
}
