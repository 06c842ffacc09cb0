//! Input, output and memory transfer rules.

use crate::isa::Opcode;
use crate::machine::{ByteValue, ExecError, MachineState};

use super::Outcome;

/// Rules that move values between input, carry, memory and output.
pub struct MemoryUnit;

impl MemoryUnit {
    /// `Load`: pop the last input into carry.
    ///
    /// With no input left the run is finished and no snapshot is produced.
    pub fn load(state: &MachineState) -> Outcome {
        let mut next = state.clone();
        match next.input.pop() {
            Some(value) => {
                next.carry = Some(value);
                Outcome::Next(next.advanced())
            }
            None => Outcome::Finished,
        }
    }

    /// `Return`: check carry against the expected output at the current
    /// output position, append it and clear carry.
    pub fn ret(state: &MachineState, expected_output: &[ByteValue]) -> Result<MachineState, ExecError> {
        let carry = state.carry.ok_or(ExecError::CarryNull {
            opcode: Opcode::Return,
        })?;

        let expected = expected_output.get(state.output.len()).copied();
        if expected != Some(carry) {
            return Err(ExecError::InvalidReturnValue {
                expected,
                actual: carry,
            });
        }

        let mut next = state.clone();
        next.output.push(carry);
        next.carry = None;
        Ok(next.advanced())
    }

    /// `CopyTo`: write carry into `memory[address]`. Carry is kept.
    pub fn copy_to(state: &MachineState, address: usize) -> Result<MachineState, ExecError> {
        state.read_memory(address)?;
        let carry = state.carry.ok_or(ExecError::CarryNull {
            opcode: Opcode::CopyTo,
        })?;

        let mut next = state.clone();
        next.memory[address] = Some(carry);
        Ok(next.advanced())
    }

    /// `CopyFrom`: load `memory[address]` into carry.
    pub fn copy_from(state: &MachineState, address: usize) -> Result<MachineState, ExecError> {
        let value = state.read_memory(address)?.ok_or(ExecError::NullValue {
            opcode: Opcode::CopyFrom,
            address,
        })?;

        let mut next = state.clone();
        next.carry = Some(value);
        Ok(next.advanced())
    }
}
