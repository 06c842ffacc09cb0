//! Instruction execution rules.
//!
//! Every rule is a pure function from the current snapshot (plus the
//! instruction payload) to an [`Outcome`]. Rules never touch session state;
//! `Return` additionally reads the level's expected output by reference.
//!
//! The rules are grouped by the unit that owns them:
//!
//! - [`MemoryUnit`]: `Load`, `Return`, `CopyTo`, `CopyFrom`
//! - [`ArithUnit`]: `Increment`, `Decrement`, `Add`, `Subtract`
//! - [`ControlUnit`]: `Jump`, `JumpIfZero`, `JumpIfNegative`

mod arith;
mod control;
mod memory;

pub use arith::ArithUnit;
pub use control::ControlUnit;
pub use memory::MemoryUnit;

use crate::machine::{ByteValue, ExecError, MachineState};

use super::Instruction;

/// Result of executing one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// New snapshot to append to the history.
    Next(MachineState),
    /// `Load` found no input left: the run is complete.
    Finished,
    /// Fatal fault; no snapshot is produced.
    Fault(ExecError),
}

impl From<Result<MachineState, ExecError>> for Outcome {
    fn from(result: Result<MachineState, ExecError>) -> Self {
        match result {
            Ok(state) => Outcome::Next(state),
            Err(err) => Outcome::Fault(err),
        }
    }
}

/// Execute `instr` against `state`.
///
/// `expected_output` is the initialized level's expected output sequence;
/// only `Return` consults it.
pub fn execute(instr: &Instruction, state: &MachineState, expected_output: &[ByteValue]) -> Outcome {
    match *instr {
        Instruction::Load => MemoryUnit::load(state),
        Instruction::Return => MemoryUnit::ret(state, expected_output).into(),
        Instruction::CopyTo { address } => MemoryUnit::copy_to(state, address).into(),
        Instruction::CopyFrom { address } => MemoryUnit::copy_from(state, address).into(),
        Instruction::Increment { address } => ArithUnit::increment(state, address).into(),
        Instruction::Decrement { address } => ArithUnit::decrement(state, address).into(),
        Instruction::Add { address } => ArithUnit::add(state, address).into(),
        Instruction::Subtract { address } => ArithUnit::subtract(state, address).into(),
        Instruction::Jump { target } => ControlUnit::jump(state, target).into(),
        Instruction::JumpIfZero { target } => ControlUnit::jump_if_zero(state, target).into(),
        Instruction::JumpIfNegative { target } => {
            ControlUnit::jump_if_negative(state, target).into()
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::isa::Instruction;
    use crate::machine::{ByteValue, MachineState};

    /// Snapshot with the given carry, memory and a stack of `stack_len` loads.
    pub fn machine(carry: Option<i64>, memory: &[Option<i64>], stack_len: usize) -> MachineState {
        let stack: Arc<[Instruction]> = vec![Instruction::Load; stack_len].into();
        let mut state = MachineState::new(Vec::new(), memory.len(), stack);
        state.carry = carry.map(ByteValue::Number);
        state.memory = memory.iter().map(|v| v.map(ByteValue::Number)).collect();
        state
    }

    /// Unwrap an `Outcome::Next`.
    pub fn next(outcome: super::Outcome) -> MachineState {
        match outcome {
            super::Outcome::Next(state) => state,
            other => panic!("expected a new state, got {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::machine;
    use super::*;
    use crate::isa::Opcode;

    #[test]
    fn test_dispatch_covers_every_opcode() {
        let state = machine(Some(1), &[Some(2)], 4);
        for opcode in Opcode::ALL {
            let operand = match opcode {
                Opcode::Load | Opcode::Return => None,
                _ => Some(0),
            };
            let instr = Instruction::from_parts(opcode, operand).unwrap();
            // Any outcome is acceptable; dispatch must not panic.
            let _ = execute(&instr, &state, &[ByteValue::Number(1)]);
        }
    }

    #[test]
    fn test_rules_leave_input_snapshot_untouched() {
        let state = machine(Some(3), &[Some(4)], 2);
        let before = state.clone();
        let _ = execute(&Instruction::Increment { address: 0 }, &state, &[]);
        let _ = execute(&Instruction::CopyTo { address: 0 }, &state, &[]);
        assert_eq!(state, before);
    }
}
