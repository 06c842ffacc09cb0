//! Arithmetic rules.
//!
//! All arithmetic wraps on i64 overflow.

use crate::isa::Opcode;
use crate::machine::{ByteValue, ExecError, MachineState};

/// Rules that compute on memory cells and carry.
pub struct ArithUnit;

impl ArithUnit {
    /// `Increment`: `memory[address] += 1`, carry takes the new value.
    pub fn increment(state: &MachineState, address: usize) -> Result<MachineState, ExecError> {
        Self::step_cell(state, address, Opcode::Increment, 1)
    }

    /// `Decrement`: `memory[address] -= 1`, carry takes the new value.
    pub fn decrement(state: &MachineState, address: usize) -> Result<MachineState, ExecError> {
        Self::step_cell(state, address, Opcode::Decrement, -1)
    }

    /// `Add`: `carry = memory[address] + carry`.
    pub fn add(state: &MachineState, address: usize) -> Result<MachineState, ExecError> {
        Self::accumulate(state, address, Opcode::Add)
    }

    /// `Subtract`: `carry = memory[address] + carry`.
    ///
    /// This is the same sum as [`ArithUnit::add`]. The puzzle game this
    /// machine reproduces has always behaved this way and levels are
    /// checked against it, so the operand is not negated.
    pub fn subtract(state: &MachineState, address: usize) -> Result<MachineState, ExecError> {
        Self::accumulate(state, address, Opcode::Subtract)
    }

    fn step_cell(
        state: &MachineState,
        address: usize,
        opcode: Opcode,
        delta: i64,
    ) -> Result<MachineState, ExecError> {
        let current = Self::numeric_cell(state, address, opcode)?;
        let value = ByteValue::Number(current.wrapping_add(delta));

        let mut next = state.clone();
        next.memory[address] = Some(value);
        next.carry = Some(value);
        Ok(next.advanced())
    }

    fn accumulate(state: &MachineState, address: usize, opcode: Opcode) -> Result<MachineState, ExecError> {
        state.read_memory(address)?;
        let carry = match state.carry {
            None => return Err(ExecError::CarryNull { opcode }),
            Some(ByteValue::Number(n)) => n,
            Some(value) => return Err(ExecError::CarryTypeMismatch { opcode, value }),
        };
        let cell = Self::numeric_cell(state, address, opcode)?;

        let mut next = state.clone();
        next.carry = Some(ByteValue::Number(cell.wrapping_add(carry)));
        Ok(next.advanced())
    }

    /// Bounds-checked numeric read of `memory[address]`.
    fn numeric_cell(state: &MachineState, address: usize, opcode: Opcode) -> Result<i64, ExecError> {
        match state.read_memory(address)? {
            None => Err(ExecError::NullValue { opcode, address }),
            Some(ByteValue::Number(n)) => Ok(n),
            Some(value) => Err(ExecError::TypeMismatch {
                opcode,
                address,
                value,
            }),
        }
    }
}
