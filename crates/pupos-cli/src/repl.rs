//! REPL – the interactive console doubling as the transport boundary.
//!
//! Every non-slash line is treated as a directive for the robot and
//! published on the bus's directive topic, either as raw JSON (lines
//! starting with `{`) or via the shorthand forms:
//!
//!   move <direction phrase> <seconds>   e.g. `move go forward 2`
//!   command <phrase>                    e.g. `command coffin bark`
//!
//! Slash-commands:
//!   /help          – show this list
//!   /state         – mode flags and loop health
//!   /patrol        – toggle patrol mode
//!   /eyes          – toggle the eye animation
//!   /quit | /exit  – leave the console

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use pupos_middleware::{EventBus, Topic};
use pupos_runtime::{LoopHealth, ModeState, Watchdog};
use pupos_types::{Directive, EventPayload, RobotEvent};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Entry point for the interactive console.
///
/// `shutdown` is polled each iteration; when set (e.g. by Ctrl-C) the
/// console exits cleanly.
pub fn run(
    shutdown: Arc<AtomicBool>,
    bus: EventBus,
    mode: Arc<ModeState>,
    watchdog: Arc<Watchdog>,
) {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("{}: {}", "Console unavailable".red(), e);
            return;
        }
    };

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        let line = match editor.readline(&format!("{} ", "pupos>".bold().cyan())) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(input);

        match input {
            "/help" => cmd_help(),
            "/state" => cmd_state(&mode, &watchdog),
            "/patrol" => {
                let on = !mode.patrol_mode();
                mode.set_patrol_mode(on);
                println!("  patrol mode {}", on_off(on));
            }
            "/eyes" => {
                let on = !mode.eyes_on();
                mode.set_eyes_on(on);
                println!("  eye animation {}", on_off(on));
            }
            "/quit" | "/exit" => {
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            raw if raw.starts_with('{') => publish(&bus, raw.to_string()),
            other => match parse_shorthand(other) {
                Some(directive) => match serde_json::to_string(&directive) {
                    Ok(raw) => publish(&bus, raw),
                    Err(e) => eprintln!("{}: {}", "Encode error".red(), e),
                },
                None => {
                    println!(
                        "  Unrecognized input. Type {} for the command list.",
                        "/help".bold().cyan()
                    );
                }
            },
        }
    }
}

/// Translate the `move …` / `command …` shorthand into a [`Directive`].
///
/// Returns `None` for anything else; validation of the phrase itself is the
/// dispatcher's job, exactly as for directives from a real transport.
fn parse_shorthand(input: &str) -> Option<Directive> {
    let (keyword, rest) = input.split_once(' ')?;
    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }
    match keyword {
        "move" => {
            let (phrase, duration) = match rest.rsplit_once(' ') {
                Some((phrase, last)) => match last.parse::<u64>() {
                    Ok(duration) => (phrase.trim(), duration),
                    Err(_) => (rest, 1),
                },
                None => (rest, 1),
            };
            Some(Directive::Move {
                direction: phrase.to_string(),
                duration,
                speed: None,
            })
        }
        "command" => Some(Directive::Command {
            command: rest.to_string(),
        }),
        _ => None,
    }
}

fn publish(bus: &EventBus, raw: String) {
    let event = RobotEvent::new("pupos-cli::console", EventPayload::ControlPayload(raw));
    if let Err(e) = bus.publish_to(Topic::Directives, event) {
        eprintln!("{}: {}", "Publish failed".red(), e);
    }
}

fn cmd_help() {
    println!();
    println!("  {}", "Directives".bold());
    println!("    move <direction phrase> <seconds>   e.g. move go forward 2");
    println!("    command <phrase>                    e.g. command coffin bark");
    println!("    {{...}}                               raw directive JSON");
    println!();
    println!("  {}", "Console".bold());
    println!("    /state    mode flags and loop health");
    println!("    /patrol   toggle patrol mode");
    println!("    /eyes     toggle the eye animation");
    println!("    /quit     exit");
    println!();
}

fn cmd_state(mode: &ModeState, watchdog: &Watchdog) {
    let snap = mode.snapshot();
    println!();
    println!("  {}", "Mode flags".bold());
    println!("    heel_mode    {}", on_off(snap.heel_mode));
    println!("    patrol_mode  {}", on_off(snap.patrol_mode));
    println!("    dance        {}", on_off(snap.dance));
    println!("    sitting      {}", on_off(snap.sitting));
    println!("    tempo_active {}", on_off(snap.tempo_active));
    println!("    eyes_on      {}", on_off(snap.eyes_on));
    println!();
    println!("  {}", "Loop health".bold());
    for (name, health) in watchdog.statuses() {
        let label = match health {
            LoopHealth::Healthy => "healthy".green(),
            LoopHealth::TimedOut => "timed out".red(),
        };
        println!("    {name:<8} {label}");
    }
    println!();
}

fn on_off(on: bool) -> colored::ColoredString {
    if on { "on".green() } else { "off".dimmed() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthand_move_with_duration() {
        assert_eq!(
            parse_shorthand("move go forward 2"),
            Some(Directive::Move {
                direction: "go forward".to_string(),
                duration: 2,
                speed: None,
            })
        );
    }

    #[test]
    fn shorthand_move_defaults_duration_to_one() {
        assert_eq!(
            parse_shorthand("move brake"),
            Some(Directive::Move {
                direction: "brake".to_string(),
                duration: 1,
                speed: None,
            })
        );
    }

    #[test]
    fn shorthand_command_keeps_the_whole_phrase() {
        assert_eq!(
            parse_shorthand("command coffin bark"),
            Some(Directive::Command {
                command: "coffin bark".to_string(),
            })
        );
    }

    #[test]
    fn unknown_shorthand_is_rejected() {
        assert_eq!(parse_shorthand("sing me a song"), None);
        assert_eq!(parse_shorthand("move"), None);
        assert_eq!(parse_shorthand("command "), None);
    }
}
