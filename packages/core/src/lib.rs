//! Bitstore core: the semantic store layer.
//!
//! This layer turns the raw node model into a usable store:
//! - [`ContextPath`]: dotted chains of container names (`people.address`)
//! - the addressing engine ([`address`]): name, kind, and path lookups
//! - [`Store`]: connect/disconnect, pull/push, typed CRUD, anchor caching
//! - [`Error`]: the shared failure vocabulary
//!
//! # Example
//!
//! ```rust
//! use bitstore_core::{BitKind, Store};
//!
//! fn build() -> Result<(), bitstore_core::Error> {
//!     let mut store = Store::new();
//!     store.declare("people", BitKind::Container)?;
//!     store.append_in("people", "alice", 7)?;
//!     assert_eq!(store.get_in::<i32>("people", "alice")?, 7);
//!     Ok(())
//! }
//! # build().unwrap();
//! ```

pub mod address;
mod convert;
mod error;
mod path;
mod store;

pub use convert::FromBits;
pub use error::Error;
pub use path::{validate_key, ContextPath, PathError};
pub use store::Store;

// Re-export the lower layers for convenience
pub use bitstore_arena::{Bit, BitArena, BitId, BitKind, BitValue, Bytes};
pub use bitstore_file::BackingFile;
pub use bitstore_text::{kind_of, read_all_bits, tag_of, write_all_bits, ParseError};
