//! Bitstore node model: the foundation layer.
//!
//! A store's tree is made of *bits* - named or positional values that are
//! either scalars (bool, the numeric kinds, char, string, opaque bytes) or
//! structural groupings (`Array`, `Container`). Bits live in a [`BitArena`]
//! and refer to each other through [`BitId`] handles:
//! - `previous`/`next`: doubly-linked, insertion-ordered sibling list
//! - `child_head`: first child of a structural bit
//! - `parent`: non-owning back-reference to the containing structural bit
//!
//! Handles are generational: once a bit is freed, every handle that pointed
//! at it stops resolving instead of aliasing whatever reuses the slot.
//!
//! Higher layers build on this: addressing and the store API live in
//! `bitstore-core`, the wire format in `bitstore-text`.

mod arena;
mod bit;
mod kind;
mod value;

pub use arena::{BitArena, BitId};
pub use bit::Bit;
pub use kind::BitKind;
pub use value::BitValue;

// Re-export the payload type for convenience
pub use bytes::Bytes;
