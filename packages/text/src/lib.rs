//! Bitstore wire format: the textual encoding of a bit tree.
//!
//! The format is UTF-8 text, whitespace-insensitive between tokens. Each bit
//! opens with a single-character type tag:
//!
//! | tag | kind     | tag | kind     | tag | kind      |
//! |-----|----------|-----|----------|-----|-----------|
//! | `b` | Bool     | `d` | Double   | `u` | Unsafe    |
//! | `i` | Int      | `c` | Char     | `a` | Array     |
//! | `l` | Long     | `s` | String   | `#` | Container |
//! | `x` | LongLong | `f` | Float    |     |           |
//!
//! Productions:
//!
//! ```text
//! value bit:     <tag> <name> : <literal>
//! container bit: # <name> { <bit>* }
//! array bit:     a <name> [ <element>* ]
//! top level:     <bit>*
//! ```
//!
//! Array elements are unnamed value or container bits (`i : 1`, `# { ... }`);
//! arrays never nest directly inside arrays. Literals: `true`/`false`,
//! optional-sign decimal integers, Rust float syntax, `'c'` and `"..."` with
//! backslash escapes, and `<hex>` for opaque bytes.
//!
//! [`read_all_bits`] (pull) and [`write_all_bits`] (push) are exact inverses:
//! parsing the writer's output reproduces an equal tree.

mod cursor;
mod error;
mod reader;
mod tag;
mod writer;

pub use error::ParseError;
pub use reader::read_all_bits;
pub use tag::{kind_of, tag_of};
pub use writer::write_all_bits;
