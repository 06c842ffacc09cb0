//! Instruction set.
//!
//! | Instruction | Payload | Effect |
//! |-------------|---------|--------|
//! | `Load` | - | carry = input.pop(); finishes the run when input is empty |
//! | `Return` | - | output.push(carry) if it matches the expected output |
//! | `CopyTo` | memory address | memory[a] = carry |
//! | `CopyFrom` | memory address | carry = memory[a] |
//! | `Increment` / `Decrement` | memory address | memory[a] ± 1, carry = memory[a] |
//! | `Add` / `Subtract` | memory address | carry = memory[a] + carry |
//! | `Jump` | stack address | sp = a |
//! | `JumpIfZero` / `JumpIfNegative` | stack address | sp = a if carry == 0 / < 0 |
//!
//! [`instruction`] defines the instructions, their wire form and the text
//! listing format; [`execute`] holds one pure rule per opcode.

pub mod execute;
pub mod instruction;

pub use execute::{execute, Outcome};
pub use instruction::{format_program, parse_program, Instruction, Opcode, OpcodeSet, ParseError};
