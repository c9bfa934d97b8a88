//! Core types for sequence construction.

use crate::error::ValidationError;
use crate::frame::Frame;
use serde::{Deserialize, Serialize};

/// Step duration used when none is given.
pub const DEFAULT_DURATION_MS: u32 = 500;

/// Stable identity of a sequence. Never reused within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceId(pub u32);

/// Stable identity of a step. Never reused within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(pub u32);

impl core::fmt::Display for SequenceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl core::fmt::Display for StepId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Physical buttons on the watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Mode,
    Light,
    Alarm,
}

impl Button {
    pub const ALL: [Button; 3] = [Button::Mode, Button::Light, Button::Alarm];

    /// Parses a button name as sent by the transport.
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        match name {
            "mode" => Ok(Button::Mode),
            "light" => Ok(Button::Light),
            "alarm" => Ok(Button::Alarm),
            other => Err(ValidationError::UnknownButton(other.to_string())),
        }
    }
}

/// How a button was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressKind {
    /// Raw press edge.
    Press,
    /// Raw release edge.
    Release,
    Single,
    Double,
    Long,
}

impl PressKind {
    /// Whether this press fires the button's trigger. Releases never do.
    #[inline]
    pub fn activates(&self) -> bool {
        !matches!(self, PressKind::Release)
    }
}

/// Playback transport commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportAction {
    Play,
    Pause,
    PlayPause,
}

/// Action bound to a button.
///
/// Serialized as `-1` (none), `"play"`, `"pause"`, `"playpause"`, or the
/// index of the sequence to jump to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTrigger", into = "RawTrigger")]
pub enum Trigger {
    #[default]
    None,
    Transport(TransportAction),
    Jump(SequenceId),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawTrigger {
    Index(i64),
    Command(String),
}

impl TryFrom<RawTrigger> for Trigger {
    type Error = ValidationError;

    fn try_from(raw: RawTrigger) -> Result<Self, Self::Error> {
        match raw {
            RawTrigger::Index(-1) => Ok(Trigger::None),
            RawTrigger::Index(n) => u32::try_from(n)
                .map(|n| Trigger::Jump(SequenceId(n)))
                .map_err(|_| ValidationError::UnknownTrigger(n.to_string())),
            RawTrigger::Command(cmd) => match cmd.as_str() {
                "play" => Ok(Trigger::Transport(TransportAction::Play)),
                "pause" => Ok(Trigger::Transport(TransportAction::Pause)),
                "playpause" => Ok(Trigger::Transport(TransportAction::PlayPause)),
                // Older exports stored dropdown values as strings.
                "-1" => Ok(Trigger::None),
                other => other
                    .parse::<u32>()
                    .map(|n| Trigger::Jump(SequenceId(n)))
                    .map_err(|_| ValidationError::UnknownTrigger(other.to_string())),
            },
        }
    }
}

impl From<Trigger> for RawTrigger {
    fn from(trigger: Trigger) -> Self {
        match trigger {
            Trigger::None => RawTrigger::Index(-1),
            Trigger::Transport(TransportAction::Play) => RawTrigger::Command("play".into()),
            Trigger::Transport(TransportAction::Pause) => RawTrigger::Command("pause".into()),
            Trigger::Transport(TransportAction::PlayPause) => {
                RawTrigger::Command("playpause".into())
            }
            Trigger::Jump(id) => RawTrigger::Index(i64::from(id.0)),
        }
    }
}

/// Button bindings of one sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triggers {
    #[serde(default)]
    pub mode: Trigger,
    #[serde(default)]
    pub light: Trigger,
    #[serde(default)]
    pub alarm: Trigger,
}

impl Triggers {
    pub fn get(&self, button: Button) -> Trigger {
        match button {
            Button::Mode => self.mode,
            Button::Light => self.light,
            Button::Alarm => self.alarm,
        }
    }

    pub fn set(&mut self, button: Button, trigger: Trigger) {
        match button {
            Button::Mode => self.mode = trigger,
            Button::Light => self.light = trigger,
            Button::Alarm => self.alarm = trigger,
        }
    }

    /// Resets every binding that jumps to `target`. Returns how many changed.
    pub fn clear_jumps_to(&mut self, target: SequenceId) -> usize {
        let mut cleared = 0;
        for button in Button::ALL {
            if self.get(button) == Trigger::Jump(target) {
                self.set(button, Trigger::None);
                cleared += 1;
            }
        }
        cleared
    }
}

/// A frame held for a duration; the unit of an authored animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    /// Stable identity.
    pub index: StepId,
    /// Position in the sequence, recomputed on every structural edit.
    pub order: usize,
    /// Display time in milliseconds, at least 1.
    pub duration_ms: u32,
    pub frame: Frame,
}

impl Step {
    /// Creates a blank step.
    #[inline]
    pub fn new(index: StepId, duration_ms: u32) -> Self {
        Self {
            index,
            order: 0,
            duration_ms,
            frame: Frame::BLANK,
        }
    }
}

/// Validates a step duration.
///
/// # Errors
/// `InvalidDuration` for zero.
pub fn check_duration(duration_ms: u32) -> Result<u32, ValidationError> {
    if duration_ms == 0 {
        return Err(ValidationError::InvalidDuration(duration_ms.to_string()));
    }
    Ok(duration_ms)
}

/// Parses duration text typed into the editor.
///
/// Surrounding whitespace is ignored; anything else that is not an integer
/// of at least 1 is rejected.
pub fn parse_duration(text: &str) -> Result<u32, ValidationError> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidDuration(text.to_string()))
        .and_then(check_duration)
}
