//! Context paths and key validation.

use std::fmt;

/// Errors related to key and context-path validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A path segment is not a valid Unicode identifier.
    InvalidSegment {
        segment: String,
        position: usize,
        message: String,
    },
    /// The path string as a whole is invalid.
    InvalidPath { message: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::InvalidSegment {
                segment,
                position,
                message,
            } => {
                write!(
                    f,
                    "invalid path segment '{}' at position {}: {}",
                    segment, position, message
                )
            }
            PathError::InvalidPath { message } => {
                write!(f, "invalid context path: {}", message)
            }
        }
    }
}

impl std::error::Error for PathError {}

/// A context path: a dotted chain of container names.
///
/// # Path syntax
///
/// - Segments are separated by `.` (`people.address.city`)
/// - Every segment must be a valid Unicode identifier (UAX#31); empty
///   segments are rejected, so `a..b`, `.a`, and `a.` are all invalid
/// - The empty string is the empty path, which names the current context
///   itself (the top level, for store operations)
///
/// Array elements are addressed with an explicit numeric index argument on
/// the operation, never inside the path text.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct ContextPath {
    segments: Vec<String>,
}

impl ContextPath {
    /// Parse a path string, validating every segment.
    pub fn parse(s: &str) -> Result<Self, PathError> {
        if s.is_empty() {
            return Ok(ContextPath {
                segments: Vec::new(),
            });
        }

        let segments: Vec<String> = s.split('.').map(|seg| seg.to_string()).collect();
        for (i, segment) in segments.iter().enumerate() {
            validate_segment(segment, i)?;
        }

        Ok(ContextPath { segments })
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Iterate over segments, outermost container first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }
}

impl fmt::Display for ContextPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Validate a single bit key: the same identifier rule as path segments.
pub fn validate_key(key: &str) -> Result<(), PathError> {
    validate_segment(key, 0)
}

fn validate_segment(segment: &str, position: usize) -> Result<(), PathError> {
    if segment.is_empty() {
        return Err(PathError::InvalidSegment {
            segment: segment.to_string(),
            position,
            message: "empty segment".to_string(),
        });
    }

    let mut chars = segment.chars();
    let first = chars.next().unwrap();

    // First char: XID_Start, or underscore followed by XID_Continue
    let valid_start = unicode_ident::is_xid_start(first)
        || (first == '_'
            && chars
                .clone()
                .next()
                .is_some_and(unicode_ident::is_xid_continue));

    if !valid_start {
        return Err(PathError::InvalidSegment {
            segment: segment.to_string(),
            position,
            message: "must start with a letter or underscore followed by letter/digit"
                .to_string(),
        });
    }

    for c in chars {
        if !unicode_ident::is_xid_continue(c) {
            return Err(PathError::InvalidSegment {
                segment: segment.to_string(),
                position,
                message: format!("invalid character '{}' in identifier", c),
            });
        }
    }

    Ok(())
}
