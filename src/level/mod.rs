//! Puzzle levels.
//!
//! A [`Level`] describes a puzzle: how its input is generated, how each input
//! maps to expected output, which instructions the player may use and how
//! much program memory is available. Initializing a level materializes its
//! input once and derives the expected output from it.
//!
//! # Expected output order
//!
//! The program consumes input from the tail, so the first value it returns
//! belongs to the *last* generated input. The expected output is therefore
//! the concatenation of every per-input mapping, in generation order, then
//! reversed as a whole:
//!
//! ```
//! use carry_vm::level::Level;
//! use carry_vm::machine::ByteValue;
//!
//! let level = Level::double().with_fixed_input(vec![1, 2, 3, 4, 5]);
//! let init = level.initialize().unwrap();
//! let expected: Vec<ByteValue> = [10, 8, 6, 4, 2].into_iter().map(ByteValue::Number).collect();
//! assert_eq!(init.output, expected);
//! ```

mod catalog;

use rand_core::{OsRng, RngCore};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::isa::{Instruction, OpcodeSet};
use crate::machine::{ByteValue, MachineState};

/// Errors raised while looking up or initializing a level.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LevelError {
    /// Levels must generate at least one input.
    #[error("level {0} must generate at least one input")]
    EmptyInput(&'static str),

    /// Fixed input list does not match the declared input count.
    #[error("level {level} declares {expected} inputs but lists {actual}")]
    FixedCountMismatch {
        level: &'static str,
        expected: usize,
        actual: usize,
    },

    /// No built-in level has this name.
    #[error("unknown level: {0}")]
    UnknownLevel(String),
}

/// Maps one input value to the output values it must produce.
pub type OutputMapping = fn(&ByteValue) -> Vec<ByteValue>;

/// How a level produces its input values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Uniform random integers in `0..=max`.
    RandomNumbers { max: u32 },
    /// `start, start + 1, ...`
    Sequence { start: i64 },
    /// Exactly these values.
    Fixed(Vec<ByteValue>),
}

impl InputSource {
    fn generate(&self, count: usize, rng: &mut impl RngCore) -> Vec<ByteValue> {
        match self {
            InputSource::RandomNumbers { max } => {
                let span = u64::from(*max) + 1;
                (0..count)
                    .map(|_| ByteValue::Number((u64::from(rng.next_u32()) % span) as i64))
                    .collect()
            }
            InputSource::Sequence { start } => (0..count as i64)
                .map(|i| ByteValue::Number(start.wrapping_add(i)))
                .collect(),
            InputSource::Fixed(values) => values.clone(),
        }
    }
}

/// A puzzle definition, before initialization.
#[derive(Clone)]
pub struct Level {
    /// Short identifier, used on the command line.
    pub name: &'static str,
    /// One-line puzzle statement.
    pub description: &'static str,
    /// Number of inputs to generate.
    pub input_count: usize,
    /// Input generation rule.
    pub source: InputSource,
    /// Per-input expected output.
    pub mapping: OutputMapping,
    /// Instructions offered to the player.
    pub instructions: OpcodeSet,
    /// Number of program memory cells.
    pub memory_size: usize,
    /// Reference solution as a program listing.
    pub solution: Option<&'static str>,
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Level")
            .field("name", &self.name)
            .field("input_count", &self.input_count)
            .field("source", &self.source)
            .field("instructions", &self.instructions)
            .field("memory_size", &self.memory_size)
            .finish_non_exhaustive()
    }
}

impl Level {
    /// Replace the input source with fixed numbers (and adjust the count).
    pub fn with_fixed_input(mut self, values: Vec<i64>) -> Self {
        self.input_count = values.len();
        self.source = InputSource::Fixed(values.into_iter().map(ByteValue::Number).collect());
        self
    }

    /// Initialize with OS randomness.
    pub fn initialize(&self) -> Result<InitializedLevel, LevelError> {
        self.initialize_with(&mut OsRng)
    }

    /// Initialize, drawing any random input from `rng`.
    pub fn initialize_with(&self, rng: &mut impl RngCore) -> Result<InitializedLevel, LevelError> {
        if self.input_count == 0 {
            return Err(LevelError::EmptyInput(self.name));
        }
        if let InputSource::Fixed(values) = &self.source {
            if values.len() != self.input_count {
                return Err(LevelError::FixedCountMismatch {
                    level: self.name,
                    expected: self.input_count,
                    actual: values.len(),
                });
            }
        }

        let input = self.source.generate(self.input_count, rng);
        let mut output: Vec<ByteValue> = input.iter().flat_map(self.mapping).collect();
        output.reverse();

        log::debug!(
            "Initialized level {}: {} inputs, {} expected outputs",
            self.name,
            input.len(),
            output.len()
        );

        Ok(InitializedLevel {
            name: self.name,
            input,
            output,
            instructions: self.instructions,
            memory_size: self.memory_size,
        })
    }
}

/// A level with concrete input and expected output. Immutable for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializedLevel {
    /// Level identifier.
    pub name: &'static str,
    /// Generated input, in generation order.
    pub input: Vec<ByteValue>,
    /// Expected output, reversed as described in the module docs.
    pub output: Vec<ByteValue>,
    /// Instructions offered to the player.
    pub instructions: OpcodeSet,
    /// Number of program memory cells.
    pub memory_size: usize,
}

impl InitializedLevel {
    /// First history entry for a run of `program` on this level.
    pub fn initial_state(&self, program: Arc<[Instruction]>) -> MachineState {
        MachineState::new(self.input.clone(), self.memory_size, program)
    }
}
