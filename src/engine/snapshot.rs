//! Read-only session view for renderers.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::isa::OpcodeSet;
use crate::machine::{ByteValue, MachineState};

use super::control::Speed;

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub level: &'static str,
    /// Machine state under the history cursor.
    #[serde(flatten)]
    pub machine: Arc<MachineState>,
    /// `PENDING`, `PAUSED`, `RUNNING`, `FINISHED` or `ERROR`.
    pub state: &'static str,
    pub error: Option<String>,
    pub speed: Speed,
    pub cursor: usize,
    pub history_len: usize,
    pub instructions: OpcodeSet,
    pub expected_output: Vec<ByteValue>,
}

fn join<T: fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|item| item.to_string()).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.machine;
        let carry = m.carry.map_or_else(|| "-".to_string(), |v| v.to_string());
        let memory = join(m.memory.iter().map(|cell| cell.map_or_else(|| "-".to_string(), |v| v.to_string())));
        let next = m
            .current_instruction()
            .map_or_else(|| "<end>".to_string(), |instr| instr.to_string());

        write!(
            f,
            "[{}/{}] {:<8} sp={:<2} {:<16} carry={} mem=[{}] in=[{}] out=[{}]",
            self.cursor,
            self.history_len - 1,
            self.state,
            m.stack_pointer,
            next,
            carry,
            memory,
            join(m.input.iter()),
            join(m.output.iter()),
        )?;
        if let Some(err) = &self.error {
            write!(f, " error: {}", err)?;
        }
        Ok(())
    }
}
