//! Control state: run status plus playback speed.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::machine::ExecError;

use super::action::ActionError;

/// Run status of a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProgramState {
    /// Nothing executed yet (or just reset).
    #[default]
    Pending,
    /// Stopped by the user; steps only on request.
    Paused,
    /// Scheduler is stepping.
    Running,
    /// Input exhausted or program ended cleanly.
    Finished,
    /// Faulted. Only reset leaves this state.
    Error(ExecError),
}

impl ProgramState {
    /// Finished or Error.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgramState::Finished | ProgramState::Error(_))
    }

    /// Protocol-style name, used in snapshots and logs.
    pub fn name(&self) -> &'static str {
        match self {
            ProgramState::Pending => "PENDING",
            ProgramState::Paused => "PAUSED",
            ProgramState::Running => "RUNNING",
            ProgramState::Finished => "FINISHED",
            ProgramState::Error(_) => "ERROR",
        }
    }

    /// Error message, when faulted.
    pub fn error(&self) -> Option<&ExecError> {
        match self {
            ProgramState::Error(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for ProgramState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramState::Error(err) => write!(f, "ERROR: {}", err),
            other => f.write_str(other.name()),
        }
    }
}

/// Playback speed, 1 (slowest) to 10 (fastest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Speed(u8);

impl Speed {
    pub const MIN: Speed = Speed(1);
    pub const MAX: Speed = Speed(10);

    /// Raw value in `1..=10`.
    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Speed(2)
    }
}

impl TryFrom<u8> for Speed {
    type Error = ActionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Speed(value))
        } else {
            Err(ActionError::SpeedOutOfRange(value))
        }
    }
}

impl From<Speed> for u8 {
    fn from(speed: Speed) -> u8 {
        speed.0
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session-level control state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControlState {
    pub speed: Speed,
    pub state: ProgramState,
}

impl ControlState {
    pub fn new(speed: Speed) -> Self {
        Self {
            speed,
            state: ProgramState::Pending,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == ProgramState::Running
    }
}
