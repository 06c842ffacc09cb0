//! Action protocol.
//!
//! Every message is `{"type": TAG}` or `{"type": TAG, "payload": {...}}`.
//! Control actions drive a [`Session`](super::Session); instruction actions
//! share the same envelope and are what program files contain.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::isa::Instruction;

use super::control::Speed;

/// Errors decoding or validating actions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("speed {0} is outside 1..=10")]
    SpeedOutOfRange(u8),

    #[error("cannot decode action: {0}")]
    Decode(String),

    #[error("expected an instruction action, got {0}")]
    NotAnInstruction(String),
}

impl From<serde_json::Error> for ActionError {
    fn from(err: serde_json::Error) -> Self {
        ActionError::Decode(err.to_string())
    }
}

/// User-level control actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ControlAction {
    #[serde(rename = "CONTROL_PLAY")]
    Play,
    #[serde(rename = "CONTROL_PAUSE")]
    Pause,
    #[serde(rename = "CONTROL_RESET")]
    Reset,
    #[serde(rename = "CONTROL_STEP_FORWARD")]
    StepForward,
    #[serde(rename = "CONTROL_STEP_BACKWARD")]
    StepBackward,
    #[serde(rename = "CONTROL_SPEED_SLIDER")]
    SetSpeed { speed: Speed },
}

impl ControlAction {
    /// Protocol tag.
    pub fn tag(&self) -> &'static str {
        match self {
            ControlAction::Play => "CONTROL_PLAY",
            ControlAction::Pause => "CONTROL_PAUSE",
            ControlAction::Reset => "CONTROL_RESET",
            ControlAction::StepForward => "CONTROL_STEP_FORWARD",
            ControlAction::StepBackward => "CONTROL_STEP_BACKWARD",
            ControlAction::SetSpeed { .. } => "CONTROL_SPEED_SLIDER",
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlAction::SetSpeed { speed } => write!(f, "{} {}", self.tag(), speed),
            other => f.write_str(other.tag()),
        }
    }
}

/// Any protocol message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Action {
    Control(ControlAction),
    Instruction(Instruction),
}

impl Action {
    /// Decode one JSON message.
    pub fn from_json(text: &str) -> Result<Self, ActionError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode a JSON array of instruction actions into a program.
    pub fn program_from_json(text: &str) -> Result<Vec<Instruction>, ActionError> {
        let actions: Vec<Action> = serde_json::from_str(text)?;
        actions
            .into_iter()
            .map(|action| match action {
                Action::Instruction(instr) => Ok(instr),
                Action::Control(control) => Err(ActionError::NotAnInstruction(control.tag().to_string())),
            })
            .collect()
    }
}

impl From<ControlAction> for Action {
    fn from(action: ControlAction) -> Self {
        Action::Control(action)
    }
}

impl From<Instruction> for Action {
    fn from(instr: Instruction) -> Self {
        Action::Instruction(instr)
    }
}
