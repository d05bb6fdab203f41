//! The store-level error taxonomy.
//!
//! Every failure is raised synchronously at the point it occurs and
//! propagates to the caller as one of these variants; there is no retry and
//! no silent recovery. Lower-layer errors (parse, path, I/O) convert in via
//! `From`; file-collaborator failures pass through as the original
//! [`std::io::Error`].

use bitstore_arena::BitKind;
use bitstore_text::ParseError;

use crate::path::PathError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A name, path, or index did not resolve to an existing bit of the
    /// expected kind - or a creation collided with an existing name.
    #[error("bit name error: {message}")]
    BitName { message: String },

    /// An anchor target does not exist or is structurally invalid,
    /// including a previously valid anchor whose bit was removed.
    #[error("anchor error: {message}")]
    AnchorName { message: String },

    /// An operation needed the anchor before one was ever set.
    #[error("no anchor has been set")]
    EmptyAnchor,

    /// `set` hit an existing bit without overwrite permission.
    #[error("bit '{name}' already exists and overwrite is not set")]
    OverridingBit { name: String },

    /// The on-disk text is malformed; the tree is left empty.
    #[error("pull error: {0}")]
    Pull(#[from] ParseError),

    /// A key or context path failed validation.
    #[error("{0}")]
    Path(#[from] PathError),

    /// A structural kind where a scalar was required, or the reverse.
    #[error("kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        expected: &'static str,
        found: BitKind,
    },

    /// `init` on a context that already has bits.
    #[error("cannot init '{name}': the context already has bits")]
    ContextNotEmpty { name: String },

    /// pull/push without a backing file.
    #[error("store is not connected to a backing file")]
    Disconnected,

    /// File collaborator failure, surfaced unwrapped.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
