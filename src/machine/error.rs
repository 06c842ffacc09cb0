//! Execution faults.
//!
//! Every fault is fatal to the current run. Instruction rules return these
//! as values; the session stores the fault in its control state, where it
//! stays until a reset.

use thiserror::Error;

use crate::isa::Opcode;

use super::ByteValue;

/// Address space an out-of-bound address was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSpace {
    /// Program memory cells.
    Memory,
    /// Program stack (instruction list).
    Stack,
}

impl AddressSpace {
    fn describe(&self) -> &'static str {
        match self {
            AddressSpace::Memory => "program memory",
            AddressSpace::Stack => "program stack",
        }
    }
}

/// Highest valid address for a space of `limit` entries, for messages.
fn highest(limit: &usize) -> String {
    match limit.checked_sub(1) {
        Some(max) => max.to_string(),
        None => "none".to_string(),
    }
}

fn expected_value(expected: &Option<ByteValue>) -> String {
    match expected {
        Some(value) => value.to_string(),
        None => "nothing".to_string(),
    }
}

/// Fatal errors raised while executing an instruction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// Memory or stack address beyond the available range.
    #[error(
        "address {address} is out of bounds of the {}; highest available address: {}",
        space.describe(),
        highest(limit)
    )]
    OutOfBound {
        /// Which address space was indexed.
        space: AddressSpace,
        /// Requested address.
        address: usize,
        /// Number of addressable entries.
        limit: usize,
    },

    /// Referenced memory cell holds no value.
    #[error("cannot {}: memory address {address} contains no value", opcode.verb())]
    NullValue {
        /// Instruction that read the cell.
        opcode: Opcode,
        /// Empty cell.
        address: usize,
    },

    /// Numeric operation on a non-numeric memory cell.
    #[error("can only {} numbers, memory address {address} holds the {} {value}", opcode.verb(), value.type_name())]
    TypeMismatch {
        /// Instruction that read the cell.
        opcode: Opcode,
        /// Offending cell.
        address: usize,
        /// Its value.
        value: ByteValue,
    },

    /// Operation requires a value in carry.
    #[error("carry must hold a value to {}", opcode.verb())]
    CarryNull {
        /// Instruction that needed the carry.
        opcode: Opcode,
    },

    /// Numeric operation on a non-numeric carry.
    #[error("can only {} when carry is a number, got the {} {value}", opcode.verb(), value.type_name())]
    CarryTypeMismatch {
        /// Instruction that needed a numeric carry.
        opcode: Opcode,
        /// Carry contents.
        value: ByteValue,
    },

    /// Returned value does not match the level's expected output.
    #[error("expected return value {}, got {actual}", expected_value(expected))]
    InvalidReturnValue {
        /// Value the level expects at this output position, if any remain.
        expected: Option<ByteValue>,
        /// Value in carry.
        actual: ByteValue,
    },

    /// Program ran off the end of the stack with input left to consume.
    #[error("unprocessed input")]
    UnprocessedInput,
}
