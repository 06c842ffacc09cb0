//! Machine model: values, snapshots and faults.
//!
//! The machine has a single accumulator (`carry`), a fixed-size program
//! memory, an input queue consumed from the tail, an output queue appended
//! at the tail, and a fixed program stack addressed by the stack pointer.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use carry_vm::isa::Instruction;
//! use carry_vm::machine::{ByteValue, MachineState};
//!
//! let stack: Arc<[Instruction]> = vec![Instruction::Load].into();
//! let state = MachineState::new(vec![ByteValue::Number(5)], 2, stack);
//! assert_eq!(state.memory.len(), 2);
//! assert_eq!(state.current_instruction(), Some(&Instruction::Load));
//! ```

mod error;
mod state;
mod value;

pub use error::{AddressSpace, ExecError};
pub use state::MachineState;
pub use value::ByteValue;
