//! Byte values held in carry, memory, input and output.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single value on the machine: either a number or one character.
///
/// Values are immutable once produced. Equality is structural, so a number
/// never compares equal to a character even if the character is a digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ByteValue {
    /// Signed integer.
    Number(i64),
    /// Single character.
    Char(char),
}

impl ByteValue {
    /// Numeric payload, if this is a number.
    #[inline]
    pub fn as_number(&self) -> Option<i64> {
        match self {
            ByteValue::Number(n) => Some(*n),
            ByteValue::Char(_) => None,
        }
    }

    /// True for `Number(0)`.
    #[inline]
    pub fn is_zero(&self) -> bool {
        matches!(self, ByteValue::Number(0))
    }

    /// True for numbers below zero. Characters are never negative.
    #[inline]
    pub fn is_negative(&self) -> bool {
        matches!(self, ByteValue::Number(n) if *n < 0)
    }

    /// Type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ByteValue::Number(_) => "number",
            ByteValue::Char(_) => "character",
        }
    }
}

impl fmt::Display for ByteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteValue::Number(n) => write!(f, "{}", n),
            ByteValue::Char(c) => write!(f, "'{}'", c),
        }
    }
}

impl From<i64> for ByteValue {
    fn from(n: i64) -> Self {
        ByteValue::Number(n)
    }
}

impl From<char> for ByteValue {
    fn from(c: char) -> Self {
        ByteValue::Char(c)
    }
}
