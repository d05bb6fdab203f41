//! Parse errors for the pull side.

use std::fmt;

use bitstore_arena::BitKind;

/// Errors raised while parsing the textual format.
///
/// Positions are byte offsets into the input. Any parse error aborts the
/// whole pull; the reader frees everything it built before returning, so a
/// failed parse never leaves a partially populated tree behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A character in tag position is not in the tag table.
    UnknownTag { tag: char, at: usize },
    /// A specific token was required and something else was found.
    UnexpectedToken {
        expected: &'static str,
        found: char,
        at: usize,
    },
    /// Input ended in the middle of a production.
    UnexpectedEnd { expected: &'static str },
    /// An opening delimiter was never closed.
    Unterminated { delimiter: char, opened_at: usize },
    /// A literal does not conform to its declared kind.
    InvalidLiteral {
        kind: BitKind,
        literal: String,
        at: usize,
    },
    /// A named context (top level or container body) found a nameless bit.
    MissingName { at: usize },
    /// An array element carried a name.
    UnexpectedName { name: String, at: usize },
    /// An array bit appeared directly inside an array.
    NestedArray { at: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownTag { tag, at } => {
                write!(f, "unknown type tag '{}' at byte {}", tag, at)
            }
            ParseError::UnexpectedToken {
                expected,
                found,
                at,
            } => {
                write!(f, "expected {}, found '{}' at byte {}", expected, found, at)
            }
            ParseError::UnexpectedEnd { expected } => {
                write!(f, "unexpected end of input, expected {}", expected)
            }
            ParseError::Unterminated {
                delimiter,
                opened_at,
            } => {
                write!(
                    f,
                    "unterminated '{}' opened at byte {}",
                    delimiter, opened_at
                )
            }
            ParseError::InvalidLiteral { kind, literal, at } => {
                write!(
                    f,
                    "invalid {} literal '{}' at byte {}",
                    kind, literal, at
                )
            }
            ParseError::MissingName { at } => {
                write!(f, "missing bit name at byte {}", at)
            }
            ParseError::UnexpectedName { name, at } => {
                write!(
                    f,
                    "array elements are unnamed, found name '{}' at byte {}",
                    name, at
                )
            }
            ParseError::NestedArray { at } => {
                write!(f, "arrays cannot contain arrays, at byte {}", at)
            }
        }
    }
}

impl std::error::Error for ParseError {}
