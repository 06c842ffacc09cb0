//! Machine state snapshot.

use serde::Serialize;
use std::sync::Arc;

use crate::isa::Instruction;

use super::{AddressSpace, ByteValue, ExecError};

/// One snapshot of the machine, produced by every successful step.
///
/// A snapshot is never modified after it enters the history. Rules take the
/// current snapshot by reference and build the successor from a clone; the
/// program stack is shared between all snapshots of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineState {
    /// Accumulator register; `None` when empty.
    pub carry: Option<ByteValue>,
    /// Remaining input, consumed from the tail.
    pub input: Vec<ByteValue>,
    /// Program memory, fixed length for the run.
    pub memory: Vec<Option<ByteValue>>,
    /// Values returned so far.
    pub output: Vec<ByteValue>,
    /// Program stack.
    pub stack: Arc<[Instruction]>,
    /// Index of the next instruction in `stack`.
    pub stack_pointer: usize,
    /// Number of instructions executed to reach this snapshot.
    pub step_counter: u64,
}

impl MachineState {
    /// Initial snapshot for a run: empty carry, empty memory, no output.
    pub fn new(input: Vec<ByteValue>, memory_size: usize, stack: Arc<[Instruction]>) -> Self {
        Self {
            carry: None,
            input,
            memory: vec![None; memory_size],
            output: Vec::new(),
            stack,
            stack_pointer: 0,
            step_counter: 0,
        }
    }

    /// Instruction at the stack pointer, if the pointer is inside the stack.
    #[inline]
    pub fn current_instruction(&self) -> Option<&Instruction> {
        self.stack.get(self.stack_pointer)
    }

    /// Read a memory cell after bounds checking `address`.
    pub fn read_memory(&self, address: usize) -> Result<Option<ByteValue>, ExecError> {
        self.memory
            .get(address)
            .copied()
            .ok_or(ExecError::OutOfBound {
                space: AddressSpace::Memory,
                address,
                limit: self.memory.len(),
            })
    }

    /// Check that `address` names an instruction in the stack.
    pub fn check_stack_address(&self, address: usize) -> Result<(), ExecError> {
        if address < self.stack.len() {
            Ok(())
        } else {
            Err(ExecError::OutOfBound {
                space: AddressSpace::Stack,
                address,
                limit: self.stack.len(),
            })
        }
    }

    /// Successor with the pointer moved past the current instruction.
    pub(crate) fn advanced(mut self) -> Self {
        self.stack_pointer += 1;
        self.step_counter += 1;
        self
    }

    /// Successor with the pointer set to `target`.
    pub(crate) fn jumped(mut self, target: usize) -> Self {
        self.stack_pointer = target;
        self.step_counter += 1;
        self
    }
}
