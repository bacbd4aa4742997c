//! [`CommandDispatcher`] – maps inbound directives to actuation and mode
//! flag mutations.
//!
//! The dispatcher is invoked once per directive, concurrently with the
//! behavior loops. Nothing here is transactional: each rule's side effects
//! land as they execute, and two directives arriving in quick succession
//! can observe interleaved partial effects.
//!
//! Error asymmetry, kept on purpose: a `move` whose direction phrase
//! resolves to no token is reported and dropped, while a `command` phrase
//! matching no preset category is silently ignored.

use std::sync::Arc;

use pupos_hal::Rig;
use pupos_types::{Directive, Direction, PresetCommand, PupError};
use rand::Rng;
use tracing::{error, info, trace, warn};

use crate::mode::ModeState;
use crate::motion::MotionController;

/// Audio cues for the bark presets.
const ANGRY_CUE: &str = "angry_bark.wav";
const CUTE_CUE: &str = "cute_bark.wav";
const COFFIN_CUE: &str = "coffin_dance.wav";

pub struct CommandDispatcher {
    mode: Arc<ModeState>,
    motion: MotionController,
    rig: Rig,
}

impl CommandDispatcher {
    pub fn new(mode: Arc<ModeState>, motion: MotionController, rig: Rig) -> Self {
        Self { mode, motion, rig }
    }

    /// Decode a raw control payload and handle it.
    ///
    /// A payload that fails validation (missing or ill-typed field) is
    /// logged and dropped here; nothing propagates back to the transport.
    pub async fn handle_payload(&self, raw: &str) {
        match serde_json::from_str::<Directive>(raw) {
            Ok(directive) => {
                if let Err(err) = self.handle(directive).await {
                    warn!(%err, "directive rejected");
                }
            }
            Err(err) => {
                error!(%err, payload = raw, "malformed directive dropped");
            }
        }
    }

    /// Handle a decoded directive.
    ///
    /// # Errors
    ///
    /// [`PupError::UnknownDirection`] when a `move` phrase resolves to no
    /// direction token (no actuation, no flag mutation has happened), or a
    /// [`PupError::HardwareFault`] bubbled up from a collaborator.
    pub async fn handle(&self, directive: Directive) -> Result<(), PupError> {
        match directive {
            Directive::Move {
                direction,
                duration,
                speed,
            } => {
                let token = Direction::resolve(&direction)
                    .ok_or_else(|| PupError::UnknownDirection(direction.clone()))?;
                let speed = speed.unwrap_or_else(Self::choose_speed);
                info!(phrase = %direction, ?token, duration, speed, "move directive");
                self.motion.travel(token, duration, speed, false).await
            }
            Directive::Command { command } => {
                self.activate(&command).await
            }
        }
    }

    /// Evaluate every preset rule independently against `phrase`.
    ///
    /// Categories are not exclusive: one phrase may fire several rules, and
    /// a phrase matching none does nothing at all.
    async fn activate(&self, phrase: &str) -> Result<(), PupError> {
        trace!(phrase, matched = ?PresetCommand::matching(phrase), "preset command");

        if PresetCommand::Come.matches(phrase) {
            self.motion.come_pulse()?;
        }

        if PresetCommand::Heel.matches(phrase) {
            self.mode.set_heel_mode(true);
        }

        if PresetCommand::Sit.matches(phrase) {
            self.mode.set_heel_mode(false);
            self.mode.set_tempo_active(true);
            self.motion.sit_down()?;
        }

        if PresetCommand::Sentry.matches(phrase) {
            self.mode.set_tempo_active(true);
            self.mode.set_heel_mode(false);
            self.motion.stand_up()?;
        }

        if PresetCommand::Stay.matches(phrase) {
            self.mode.set_heel_mode(false);
            self.motion.stand_up()?;
        }

        if PresetCommand::Angry.matches(phrase) {
            self.play_cue(ANGRY_CUE).await?;
        }

        if PresetCommand::Cute.matches(phrase) {
            self.play_cue(CUTE_CUE).await?;
        }

        if PresetCommand::Coffin.matches(phrase) {
            // The dance overlay runs for exactly the duration of the cue;
            // the dispatcher blocks here until both are over.
            self.mode.set_dance(true);
            self.mode.set_tempo_active(true);
            self.play_cue(COFFIN_CUE).await?;
            self.mode.set_dance(false);
        }

        if PresetCommand::Dance.matches(phrase) {
            self.mode.set_tempo_active(true);
            self.mode.set_dance(true);
        }

        Ok(())
    }

    /// Play a named cue to completion without stalling the async runtime.
    async fn play_cue(&self, name: &'static str) -> Result<(), PupError> {
        let sound = Arc::clone(&self.rig.sound);
        tokio::task::spawn_blocking(move || sound.play_file(name))
            .await
            .map_err(|err| PupError::HardwareFault {
                component: "sound".to_string(),
                details: err.to_string(),
            })?
    }

    /// Server-assigned move speed: uniform over {75, 100}.
    fn choose_speed() -> i32 {
        rand::thread_rng().gen_range(3..=4) * 25
    }
}
