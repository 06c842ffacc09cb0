//! Built-in levels.

use crate::isa::{Opcode, OpcodeSet};
use crate::machine::ByteValue;

use super::{InputSource, Level, LevelError};

fn identity(input: &ByteValue) -> Vec<ByteValue> {
    vec![*input]
}

fn doubled(input: &ByteValue) -> Vec<ByteValue> {
    match input {
        ByteValue::Number(n) => vec![ByteValue::Number(n.wrapping_mul(2))],
        other => vec![*other],
    }
}

impl Level {
    /// Return three random numbers unchanged.
    pub fn pass_through_3() -> Self {
        Level {
            name: "pass-through-3",
            description: "Move every input value to the output.",
            input_count: 3,
            source: InputSource::RandomNumbers { max: 100 },
            mapping: identity,
            instructions: OpcodeSet::of(&[Opcode::Load, Opcode::Return]),
            memory_size: 0,
            solution: Some("LOAD\nRETURN\nLOAD\nRETURN\nLOAD\nRETURN"),
        }
    }

    /// Return every input multiplied by two.
    pub fn double() -> Self {
        Level {
            name: "double",
            description: "Output every input value doubled.",
            input_count: 5,
            source: InputSource::RandomNumbers { max: 100 },
            mapping: doubled,
            instructions: OpcodeSet::of(&[
                Opcode::Load,
                Opcode::Return,
                Opcode::CopyTo,
                Opcode::Jump,
            ]),
            memory_size: 1,
            solution: Some("LOAD\nCOPY_TO 0\nADD 0\nRETURN\nJUMP 0"),
        }
    }

    /// Every built-in level, in play order.
    pub fn catalog() -> Vec<Level> {
        vec![Level::pass_through_3(), Level::double()]
    }

    /// Look up a built-in level by name.
    pub fn by_name(name: &str) -> Result<Level, LevelError> {
        Level::catalog()
            .into_iter()
            .find(|level| level.name == name)
            .ok_or_else(|| LevelError::UnknownLevel(name.to_string()))
    }
}
