//! Instruction definitions, opcode sets and the text listing format.
//!
//! Each [`Instruction`] carries only the payload it needs. Its serde form is
//! the action protocol used by the presentation layer:
//!
//! ```text
//! {"type":"INSTRUCTION_LOAD"}
//! {"type":"INSTRUCTION_COPY_TO","payload":{"programMemoryAddress":0}}
//! {"type":"INSTRUCTION_JUMP","payload":{"programStackAddress":3}}
//! ```
//!
//! The text listing uses short mnemonics, one instruction per line or
//! separated by `;`:
//!
//! ```text
//! LOAD
//! COPY_TO 0
//! ADD 0      # carry = memory[0] + carry
//! RETURN
//! JUMP 0
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while parsing a program listing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Mnemonic not recognized.
    #[error("unknown instruction: {0}")]
    UnknownMnemonic(String),

    /// Addressed instruction without an address.
    #[error("{0} requires an address operand")]
    MissingOperand(&'static str),

    /// Operand given to an instruction that takes none.
    #[error("{0} takes no operand")]
    UnexpectedOperand(&'static str),

    /// Operand is not a non-negative integer.
    #[error("invalid address operand: {0}")]
    InvalidOperand(String),

    /// Error at a given line of a listing.
    #[error("line {line}: {source}")]
    Line {
        /// 1-based line (or `;`-separated statement) number.
        line: usize,
        /// Underlying error.
        source: Box<ParseError>,
    },
}

/// A program stack instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Instruction {
    /// Pop the last input into carry.
    #[serde(rename = "INSTRUCTION_LOAD")]
    Load,
    /// Validate carry against the expected output and append it.
    #[serde(rename = "INSTRUCTION_RETURN")]
    Return,
    /// memory[address] = carry
    #[serde(rename = "INSTRUCTION_COPY_TO")]
    CopyTo {
        #[serde(rename = "programMemoryAddress")]
        address: usize,
    },
    /// carry = memory[address]
    #[serde(rename = "INSTRUCTION_COPY_FROM")]
    CopyFrom {
        #[serde(rename = "programMemoryAddress")]
        address: usize,
    },
    /// memory[address] += 1; carry = memory[address]
    #[serde(rename = "INSTRUCTION_INCREMENT")]
    Increment {
        #[serde(rename = "programMemoryAddress")]
        address: usize,
    },
    /// memory[address] -= 1; carry = memory[address]
    #[serde(rename = "INSTRUCTION_DECREMENT")]
    Decrement {
        #[serde(rename = "programMemoryAddress")]
        address: usize,
    },
    /// carry = memory[address] + carry
    #[serde(rename = "INSTRUCTION_ADD")]
    Add {
        #[serde(rename = "programMemoryAddress")]
        address: usize,
    },
    /// carry = memory[address] + carry (same sum as `Add`)
    #[serde(rename = "INSTRUCTION_SUBTRACT")]
    Subtract {
        #[serde(rename = "programMemoryAddress")]
        address: usize,
    },
    /// stack_pointer = target
    #[serde(rename = "INSTRUCTION_JUMP")]
    Jump {
        #[serde(rename = "programStackAddress")]
        target: usize,
    },
    /// stack_pointer = target if carry == 0
    #[serde(rename = "INSTRUCTION_JUMP_IF_ZERO")]
    JumpIfZero {
        #[serde(rename = "programStackAddress")]
        target: usize,
    },
    /// stack_pointer = target if carry < 0
    #[serde(rename = "INSTRUCTION_JUMP_IF_NEGATIVE")]
    JumpIfNegative {
        #[serde(rename = "programStackAddress")]
        target: usize,
    },
}

impl Instruction {
    /// Fieldless discriminant of this instruction.
    pub const fn opcode(&self) -> Opcode {
        match self {
            Instruction::Load => Opcode::Load,
            Instruction::Return => Opcode::Return,
            Instruction::CopyTo { .. } => Opcode::CopyTo,
            Instruction::CopyFrom { .. } => Opcode::CopyFrom,
            Instruction::Increment { .. } => Opcode::Increment,
            Instruction::Decrement { .. } => Opcode::Decrement,
            Instruction::Add { .. } => Opcode::Add,
            Instruction::Subtract { .. } => Opcode::Subtract,
            Instruction::Jump { .. } => Opcode::Jump,
            Instruction::JumpIfZero { .. } => Opcode::JumpIfZero,
            Instruction::JumpIfNegative { .. } => Opcode::JumpIfNegative,
        }
    }

    /// Memory or stack address operand, if any.
    pub const fn operand(&self) -> Option<usize> {
        match *self {
            Instruction::Load | Instruction::Return => None,
            Instruction::CopyTo { address }
            | Instruction::CopyFrom { address }
            | Instruction::Increment { address }
            | Instruction::Decrement { address }
            | Instruction::Add { address }
            | Instruction::Subtract { address } => Some(address),
            Instruction::Jump { target }
            | Instruction::JumpIfZero { target }
            | Instruction::JumpIfNegative { target } => Some(target),
        }
    }

    /// Build an instruction from an opcode and its operand.
    pub fn from_parts(opcode: Opcode, operand: Option<usize>) -> Result<Self, ParseError> {
        let need = |operand: Option<usize>| operand.ok_or(ParseError::MissingOperand(opcode.mnemonic()));
        let instr = match opcode {
            Opcode::Load | Opcode::Return => {
                if operand.is_some() {
                    return Err(ParseError::UnexpectedOperand(opcode.mnemonic()));
                }
                if opcode == Opcode::Load {
                    Instruction::Load
                } else {
                    Instruction::Return
                }
            }
            Opcode::CopyTo => Instruction::CopyTo { address: need(operand)? },
            Opcode::CopyFrom => Instruction::CopyFrom { address: need(operand)? },
            Opcode::Increment => Instruction::Increment { address: need(operand)? },
            Opcode::Decrement => Instruction::Decrement { address: need(operand)? },
            Opcode::Add => Instruction::Add { address: need(operand)? },
            Opcode::Subtract => Instruction::Subtract { address: need(operand)? },
            Opcode::Jump => Instruction::Jump { target: need(operand)? },
            Opcode::JumpIfZero => Instruction::JumpIfZero { target: need(operand)? },
            Opcode::JumpIfNegative => Instruction::JumpIfNegative { target: need(operand)? },
        };
        Ok(instr)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand() {
            Some(operand) => write!(f, "{} {}", self.opcode().mnemonic(), operand),
            None => f.write_str(self.opcode().mnemonic()),
        }
    }
}

impl FromStr for Instruction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| ParseError::UnknownMnemonic(String::new()))?;
        let opcode: Opcode = name.parse()?;

        let operand = match parts.next() {
            Some(text) => Some(
                text.parse::<usize>()
                    .map_err(|_| ParseError::InvalidOperand(text.to_string()))?,
            ),
            None => None,
        };
        if let Some(extra) = parts.next() {
            return Err(ParseError::InvalidOperand(extra.to_string()));
        }

        Self::from_parts(opcode, operand)
    }
}

/// Parse a program listing.
///
/// Statements are separated by newlines or `;`. Text after `#` is a comment.
/// Errors are wrapped in [`ParseError::Line`] with the 1-based statement number.
pub fn parse_program(source: &str) -> Result<Vec<Instruction>, ParseError> {
    source
        .split(['\n', ';'])
        .enumerate()
        .filter_map(|(idx, stmt)| {
            let code = stmt.split('#').next().unwrap_or_default().trim();
            (!code.is_empty()).then_some((idx + 1, code))
        })
        .map(|(line, code)| {
            code.parse::<Instruction>().map_err(|e| ParseError::Line {
                line,
                source: Box::new(e),
            })
        })
        .collect()
}

/// Format a program as a listing that [`parse_program`] accepts.
pub fn format_program(program: &[Instruction]) -> String {
    program
        .iter()
        .map(Instruction::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Instruction discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    #[serde(rename = "INSTRUCTION_LOAD")]
    Load = 0,
    #[serde(rename = "INSTRUCTION_RETURN")]
    Return = 1,
    #[serde(rename = "INSTRUCTION_COPY_TO")]
    CopyTo = 2,
    #[serde(rename = "INSTRUCTION_COPY_FROM")]
    CopyFrom = 3,
    #[serde(rename = "INSTRUCTION_INCREMENT")]
    Increment = 4,
    #[serde(rename = "INSTRUCTION_DECREMENT")]
    Decrement = 5,
    #[serde(rename = "INSTRUCTION_ADD")]
    Add = 6,
    #[serde(rename = "INSTRUCTION_SUBTRACT")]
    Subtract = 7,
    #[serde(rename = "INSTRUCTION_JUMP")]
    Jump = 8,
    #[serde(rename = "INSTRUCTION_JUMP_IF_ZERO")]
    JumpIfZero = 9,
    #[serde(rename = "INSTRUCTION_JUMP_IF_NEGATIVE")]
    JumpIfNegative = 10,
}

impl Opcode {
    /// All opcodes in discriminant order.
    pub const ALL: [Opcode; 11] = [
        Opcode::Load,
        Opcode::Return,
        Opcode::CopyTo,
        Opcode::CopyFrom,
        Opcode::Increment,
        Opcode::Decrement,
        Opcode::Add,
        Opcode::Subtract,
        Opcode::Jump,
        Opcode::JumpIfZero,
        Opcode::JumpIfNegative,
    ];

    /// Action protocol tag.
    pub const fn tag(&self) -> &'static str {
        match self {
            Opcode::Load => "INSTRUCTION_LOAD",
            Opcode::Return => "INSTRUCTION_RETURN",
            Opcode::CopyTo => "INSTRUCTION_COPY_TO",
            Opcode::CopyFrom => "INSTRUCTION_COPY_FROM",
            Opcode::Increment => "INSTRUCTION_INCREMENT",
            Opcode::Decrement => "INSTRUCTION_DECREMENT",
            Opcode::Add => "INSTRUCTION_ADD",
            Opcode::Subtract => "INSTRUCTION_SUBTRACT",
            Opcode::Jump => "INSTRUCTION_JUMP",
            Opcode::JumpIfZero => "INSTRUCTION_JUMP_IF_ZERO",
            Opcode::JumpIfNegative => "INSTRUCTION_JUMP_IF_NEGATIVE",
        }
    }

    /// Listing mnemonic.
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Load => "LOAD",
            Opcode::Return => "RETURN",
            Opcode::CopyTo => "COPY_TO",
            Opcode::CopyFrom => "COPY_FROM",
            Opcode::Increment => "INC",
            Opcode::Decrement => "DEC",
            Opcode::Add => "ADD",
            Opcode::Subtract => "SUB",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfZero => "JUMP_IF_ZERO",
            Opcode::JumpIfNegative => "JUMP_IF_NEG",
        }
    }

    /// Verb used in fault messages.
    pub const fn verb(&self) -> &'static str {
        match self {
            Opcode::Load => "load",
            Opcode::Return => "return",
            Opcode::CopyTo => "copy to memory",
            Opcode::CopyFrom => "copy from memory",
            Opcode::Increment => "increment",
            Opcode::Decrement => "decrement",
            Opcode::Add => "add",
            Opcode::Subtract => "subtract",
            Opcode::Jump => "jump",
            Opcode::JumpIfZero => "jump if zero",
            Opcode::JumpIfNegative => "jump if negative",
        }
    }

    #[inline]
    const fn bit(self) -> u16 {
        1 << (self as u8)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl FromStr for Opcode {
    type Err = ParseError;

    /// Accepts the mnemonic or the protocol tag, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Opcode::ALL
            .into_iter()
            .find(|op| op.mnemonic() == upper || op.tag() == upper)
            .ok_or_else(|| ParseError::UnknownMnemonic(s.to_string()))
    }
}

/// Set of enabled opcodes, stored as a bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Opcode>", into = "Vec<Opcode>")]
pub struct OpcodeSet(u16);

impl OpcodeSet {
    /// No opcodes.
    pub const EMPTY: OpcodeSet = OpcodeSet(0);

    /// Every opcode.
    pub const ALL: OpcodeSet = OpcodeSet((1 << Opcode::ALL.len()) - 1);

    /// Build a set from a list of opcodes.
    pub const fn of(opcodes: &[Opcode]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < opcodes.len() {
            bits |= opcodes[i].bit();
            i += 1;
        }
        OpcodeSet(bits)
    }

    /// Copy of this set with `opcode` added.
    pub const fn with(self, opcode: Opcode) -> Self {
        OpcodeSet(self.0 | opcode.bit())
    }

    /// Is `opcode` enabled?
    #[inline]
    pub const fn contains(&self, opcode: Opcode) -> bool {
        self.0 & opcode.bit() != 0
    }

    /// Number of enabled opcodes.
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// True when no opcode is enabled.
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Enabled opcodes in discriminant order.
    pub fn iter(&self) -> impl Iterator<Item = Opcode> + '_ {
        Opcode::ALL.into_iter().filter(|op| self.contains(*op))
    }

    /// Opcodes used by `program` that are not in this set, deduplicated.
    pub fn disallowed_in(&self, program: &[Instruction]) -> OpcodeSet {
        let used = program
            .iter()
            .fold(OpcodeSet::EMPTY, |set, instr| set.with(instr.opcode()));
        OpcodeSet(used.0 & !self.0)
    }
}

impl From<Vec<Opcode>> for OpcodeSet {
    fn from(opcodes: Vec<Opcode>) -> Self {
        OpcodeSet::of(&opcodes)
    }
}

impl From<OpcodeSet> for Vec<Opcode> {
    fn from(set: OpcodeSet) -> Self {
        set.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse_agree() {
        let program = vec![
            Instruction::Load,
            Instruction::CopyTo { address: 0 },
            Instruction::Add { address: 0 },
            Instruction::Return,
            Instruction::JumpIfNegative { target: 12 },
        ];
        let text = format_program(&program);
        assert_eq!(text, "LOAD\nCOPY_TO 0\nADD 0\nRETURN\nJUMP_IF_NEG 12");
        assert_eq!(parse_program(&text).unwrap(), program);
    }

    #[test]
    fn test_parse_accepts_tags_case_and_comments() {
        let program = parse_program("load; instruction_copy_from 2 # fetch\n\n  jump_if_zero 0 ").unwrap();
        assert_eq!(
            program,
            vec![
                Instruction::Load,
                Instruction::CopyFrom { address: 2 },
                Instruction::JumpIfZero { target: 0 },
            ]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "COPY_TO".parse::<Instruction>(),
            Err(ParseError::MissingOperand("COPY_TO"))
        );
        assert_eq!(
            "LOAD 1".parse::<Instruction>(),
            Err(ParseError::UnexpectedOperand("LOAD"))
        );
        assert_eq!(
            "JUMP -1".parse::<Instruction>(),
            Err(ParseError::InvalidOperand("-1".to_string()))
        );
        assert!(matches!(
            "HALT".parse::<Instruction>(),
            Err(ParseError::UnknownMnemonic(name)) if name == "HALT"
        ));
    }

    #[test]
    fn test_parse_program_reports_line() {
        let err = parse_program("LOAD\nRETURN\nFLY 3").unwrap_err();
        assert_eq!(err.to_string(), "line 3: unknown instruction: FLY");
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&Instruction::CopyTo { address: 0 }).unwrap();
        assert_eq!(
            json,
            r#"{"type":"INSTRUCTION_COPY_TO","payload":{"programMemoryAddress":0}}"#
        );

        let json = serde_json::to_string(&Instruction::Load).unwrap();
        assert_eq!(json, r#"{"type":"INSTRUCTION_LOAD"}"#);

        let parsed: Instruction = serde_json::from_str(
            r#"{"type":"INSTRUCTION_JUMP_IF_ZERO","payload":{"programStackAddress":4}}"#,
        )
        .unwrap();
        assert_eq!(parsed, Instruction::JumpIfZero { target: 4 });
    }

    #[test]
    fn test_opcode_set() {
        let set = OpcodeSet::of(&[Opcode::Load, Opcode::Return]);
        assert!(set.contains(Opcode::Load));
        assert!(!set.contains(Opcode::Add));
        assert_eq!(set.len(), 2);
        assert_eq!(OpcodeSet::ALL.len(), Opcode::ALL.len());
        assert!(OpcodeSet::EMPTY.is_empty());

        let program = [Instruction::Load, Instruction::Add { address: 0 }, Instruction::Add { address: 1 }];
        let missing = set.disallowed_in(&program);
        assert_eq!(missing.iter().collect::<Vec<_>>(), vec![Opcode::Add]);
    }

    #[test]
    fn test_opcode_set_serializes_as_tags() {
        let set = OpcodeSet::EMPTY.with(Opcode::Jump).with(Opcode::Load);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["INSTRUCTION_LOAD","INSTRUCTION_JUMP"]"#);
        let back: OpcodeSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
