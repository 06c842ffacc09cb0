//! Control flow rules.

use crate::isa::Opcode;
use crate::machine::{ByteValue, ExecError, MachineState};

/// Rules that move the stack pointer.
pub struct ControlUnit;

impl ControlUnit {
    /// `Jump`: unconditional, target must be inside the stack.
    pub fn jump(state: &MachineState, target: usize) -> Result<MachineState, ExecError> {
        state.check_stack_address(target)?;
        Ok(state.clone().jumped(target))
    }

    /// `JumpIfZero`: taken when carry is the number 0.
    pub fn jump_if_zero(state: &MachineState, target: usize) -> Result<MachineState, ExecError> {
        Self::branch(state, target, Opcode::JumpIfZero, ByteValue::is_zero)
    }

    /// `JumpIfNegative`: taken when carry is a number below 0.
    pub fn jump_if_negative(state: &MachineState, target: usize) -> Result<MachineState, ExecError> {
        Self::branch(state, target, Opcode::JumpIfNegative, ByteValue::is_negative)
    }

    /// Conditional branch. Only the taken branch checks `target`; the
    /// fall-through always advances by one.
    fn branch(
        state: &MachineState,
        target: usize,
        opcode: Opcode,
        condition: fn(&ByteValue) -> bool,
    ) -> Result<MachineState, ExecError> {
        let carry = state.carry.ok_or(ExecError::CarryNull { opcode })?;

        if condition(&carry) {
            state.check_stack_address(target)?;
            Ok(state.clone().jumped(target))
        } else {
            Ok(state.clone().advanced())
        }
    }
}
