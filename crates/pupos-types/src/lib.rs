use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Directional movement tokens and their accepted spoken variations.
///
/// Matching is literal, case-sensitive set membership over each token's
/// synonym list (the lists mirror the voice-skill slot values, including the
/// non-English variants). Tokens are tested in declaration order and the
/// first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
}

impl Direction {
    /// Every direction token, in matching order.
    pub const ALL: [Direction; 5] = [
        Direction::Forward,
        Direction::Backward,
        Direction::Left,
        Direction::Right,
        Direction::Stop,
    ];

    /// Accepted phrase variations for this token.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Direction::Forward => &["forward", "forwards", "go forward"],
            Direction::Backward => &["back", "backward", "backwards", "go backward"],
            Direction::Left => &["left", "go left"],
            Direction::Right => &["right", "go right"],
            Direction::Stop => &["stop", "brake"],
        }
    }

    /// Resolve a phrase to a direction token, first match wins.
    ///
    /// Returns `None` when the phrase belongs to no synonym list; the caller
    /// decides whether that is an error (it is, for `move` directives).
    pub fn resolve(phrase: &str) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| d.synonyms().contains(&phrase))
    }
}

/// Preset behavior commands and their invocation variations.
///
/// Unlike [`Direction`], a single incoming phrase is tested against every
/// category independently: categories are not mutually exclusive and more
/// than one rule may fire for one input. A phrase matching no category is
/// silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresetCommand {
    Come,
    Heel,
    Sit,
    Stay,
    Sentry,
    Angry,
    Cute,
    Coffin,
    Dance,
    Speak,
}

impl PresetCommand {
    /// Every preset category, in rule-evaluation order.
    pub const ALL: [PresetCommand; 10] = [
        PresetCommand::Come,
        PresetCommand::Heel,
        PresetCommand::Sit,
        PresetCommand::Sentry,
        PresetCommand::Stay,
        PresetCommand::Angry,
        PresetCommand::Cute,
        PresetCommand::Coffin,
        PresetCommand::Dance,
        PresetCommand::Speak,
    ];

    /// Accepted phrase variations for this category.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            PresetCommand::Sentry => &[
                "guard",
                "protect",
                "sentry",
                "sentry mode",
                "watch",
                "watch mode",
            ],
            PresetCommand::Sit => &["sitz", "sit"],
            PresetCommand::Stay => &["bleib", "stay", "steh auf", "stehen bleiben"],
            PresetCommand::Heel => &["fuss", "heel"],
            PresetCommand::Come => &["come to me", "Komm", "come"],
            PresetCommand::Speak => &["speak", "laut"],
            PresetCommand::Angry => &[
                "angry bark",
                "angry",
                "bark",
                "chey chey",
                "chase",
                "cheey",
                "cheey cheey",
            ],
            PresetCommand::Cute => &[
                "cute",
                "cute bark",
                "cutie cutie",
                "cutie pie",
                "hello cutie",
                "beepash my cutie",
                "good boy beepash",
            ],
            PresetCommand::Coffin => &[
                "coughing",
                "coffee",
                "coffin",
                "coffin bark",
                "die",
                "beepash die",
                "die beepash",
            ],
            PresetCommand::Dance => &["sing", "dance", "dance for me"],
        }
    }

    /// `true` when `phrase` is a literal member of this category's list.
    pub fn matches(self, phrase: &str) -> bool {
        self.synonyms().contains(&phrase)
    }

    /// All categories whose synonym list contains `phrase`, in rule order.
    pub fn matching(phrase: &str) -> Vec<PresetCommand> {
        PresetCommand::ALL
            .into_iter()
            .filter(|c| c.matches(phrase))
            .collect()
    }
}

/// One-shot external instruction delivered by the transport.
///
/// Decoded from the raw control payload with explicit required-field
/// validation: a missing `type`, `direction`, `duration` or `command` key
/// fails decoding and the directive is dropped. `speed` is the only optional
/// field; when absent the dispatcher assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Directive {
    /// Directional movement: direction phrase, duration in whole seconds,
    /// optional speed percent.
    Move {
        direction: String,
        duration: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        speed: Option<i32>,
    },
    /// Named preset command phrase.
    Command { command: String },
}

/// Names of custom events sent from the robot back to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventName {
    Bark,
}

impl EventName {
    pub fn as_str(self) -> &'static str {
        match self {
            EventName::Bark => "bark",
        }
    }
}

/// Payload of an outbound gadget event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GadgetPayload {
    /// Proximity reading that triggered the bark, in sensor distance units.
    Bark { distance: i32 },
}

/// A named custom event destined for the paired transport device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GadgetEvent {
    pub name: EventName,
    pub payload: GadgetPayload,
}

/// Unified event wrapper routed over the internal bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g. `"pupos-cli::console"` or `"pupos-runtime::heel"`
    pub source: String,
    pub payload: EventPayload,
}

impl RobotEvent {
    /// Build an event stamped with a fresh id and the current time.
    pub fn new(source: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Variants of data routed over the internal event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    /// Raw inbound control payload (directive JSON) from the transport.
    ControlPayload(String),
    /// Outbound custom event for the transport (fire-and-forget).
    Gadget(GadgetEvent),
    /// A component fault, e.g. a dead sensor or an operator stop request.
    Fault { component: String, message: String },
}

/// Error type spanning directive decoding, token resolution, and hardware
/// collaborator failures.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum PupError {
    #[error("Malformed directive: {0}")]
    MalformedDirective(String),

    #[error("Unresolved direction token: {0:?}")]
    UnknownDirection(String),

    #[error("Hardware fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Channel error: {0}")]
    Channel(String),
}
