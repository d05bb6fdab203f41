//! The Store: a tree of bits with a typed CRUD surface and an optional
//! backing file.
//!
//! All mutation and query calls resolve their targets through the
//! addressing engine, then edit the arena directly. Context arguments are
//! dotted paths (see [`ContextPath`](crate::ContextPath)); the empty string
//! names the top level. Persistence is whole-file: [`pull`](Store::pull)
//! replaces the tree with the parsed file contents, [`push`](Store::push)
//! overwrites the file with the rendered tree.

use std::path::Path as FsPath;

use bitstore_arena::{Bit, BitArena, BitId, BitKind, BitValue};
use bitstore_file::BackingFile;
use bitstore_text::{read_all_bits, write_all_bits};

use crate::address;
use crate::convert::FromBits;
use crate::path::{validate_key, ContextPath};
use crate::Error;

/// A resolved creation/lookup context: the top level or a container bit.
#[derive(Clone, Copy)]
enum ContextRef {
    Root,
    Bit(BitId),
}

/// An embedded, file-backed hierarchical store of typed bits.
///
/// A store owns its whole tree for its lifetime. It may be *disconnected*
/// (purely in-memory) or *connected* to one backing file; connecting does
/// not load anything by itself.
///
/// # Example
///
/// ```rust
/// use bitstore_core::{BitKind, Store};
///
/// let mut store = Store::new();
/// store.init("age", 30).unwrap();
/// store.declare("scores", BitKind::Array).unwrap();
/// store.iterate("scores", 1).unwrap();
/// store.iterate("scores", 2).unwrap();
///
/// assert_eq!(store.get::<i32>("age").unwrap(), 30);
/// assert_eq!(store.get_at::<i32>("scores", 1).unwrap(), 2);
/// ```
#[derive(Default)]
pub struct Store {
    arena: BitArena,
    first: Option<BitId>,
    anchor: Option<BitId>,
    file: Option<BackingFile>,
}

impl Store {
    /// A disconnected, empty store.
    pub fn new() -> Self {
        Store::default()
    }

    // === File binding ===

    /// Bind a backing file, creating it when missing. Does not load data.
    pub fn connect(&mut self, path: impl AsRef<FsPath>) -> Result<(), Error> {
        let mut file = BackingFile::new();
        file.open(path)?;
        self.file = Some(file);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.file.as_ref().is_some_and(BackingFile::is_open)
    }

    /// Drop the backing file. The in-memory tree is untouched.
    /// Returns false when the store was already disconnected.
    pub fn disconnect(&mut self) -> bool {
        self.file.take().is_some()
    }

    // === Pull / push ===

    /// Replace the tree with the parsed contents of the backing file.
    ///
    /// The current tree is erased first; on malformed input the error is
    /// [`Error::Pull`] and the store is left empty, never half-populated.
    /// Handles and anchors minted before the pull go stale.
    pub fn pull(&mut self) -> Result<(), Error> {
        let file = self.file.as_ref().ok_or(Error::Disconnected)?;
        let body = file.read_all()?;
        log::debug!("pulling {} bytes", body.len());
        self.erase();
        self.first = read_all_bits(&mut self.arena, &body)?;
        Ok(())
    }

    /// Render the whole tree and overwrite the backing file with it.
    pub fn push(&mut self) -> Result<(), Error> {
        let file = self.file.as_ref().ok_or(Error::Disconnected)?;
        let body = write_all_bits(&self.arena, self.first);
        log::debug!("pushing {} bytes", body.len());
        file.write_all(&body)?;
        Ok(())
    }

    // === Tree state ===

    /// Free every bit. The backing file, if any, stays connected.
    pub fn erase(&mut self) {
        let mut current = self.first;
        while let Some(id) = current {
            current = self.arena.get(id).and_then(|bit| bit.next);
            self.arena.free_subtree(id);
        }
        self.first = None;
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// Number of bits in a context: the top level for the empty path, the
    /// child count of the container or array at `target` otherwise.
    pub fn count(&self, target: &str) -> Result<usize, Error> {
        let path = ContextPath::parse(target)?;
        if path.is_empty() {
            return Ok(self.arena.chain_len(self.first));
        }
        let id = address::find_rec(
            &self.arena,
            self.first,
            &path,
            &[BitKind::Container, BitKind::Array],
        )
        .ok_or_else(|| Error::BitName {
            message: format!("no container or array at '{}'", target),
        })?;
        Ok(self
            .arena
            .chain_len(self.arena.get(id).and_then(|bit| bit.child_head)))
    }

    /// Head of the top-level sibling list.
    pub fn roots(&self) -> Option<BitId> {
        self.first
    }

    /// Read-only view of the arena, for direct tree walks.
    pub fn arena(&self) -> &BitArena {
        &self.arena
    }

    // === Creation ===

    /// Create the very first bit of the top level.
    pub fn init(&mut self, name: &str, value: impl Into<BitValue>) -> Result<BitId, Error> {
        self.init_in("", name, value)
    }

    /// Create the very first bit of the container at `context`.
    /// Fails with [`Error::ContextNotEmpty`] when the context has bits.
    pub fn init_in(
        &mut self,
        context: &str,
        name: &str,
        value: impl Into<BitValue>,
    ) -> Result<BitId, Error> {
        validate_key(name)?;
        let ctx = self.resolve_context(context)?;
        if self.context_head(ctx).is_some() {
            return Err(Error::ContextNotEmpty {
                name: name.to_string(),
            });
        }
        self.insert_last(ctx, Bit::new(name, value.into()))
    }

    /// Append a bit after the current last bit of the top level.
    pub fn append(&mut self, name: &str, value: impl Into<BitValue>) -> Result<BitId, Error> {
        self.append_in("", name, value)
    }

    /// Append a bit at the end of the container at `context`. On an empty
    /// context this creates the first bit.
    pub fn append_in(
        &mut self,
        context: &str,
        name: &str,
        value: impl Into<BitValue>,
    ) -> Result<BitId, Error> {
        validate_key(name)?;
        let ctx = self.resolve_context(context)?;
        self.insert_last(ctx, Bit::new(name, value.into()))
    }

    /// Declare a structural bit (`Array` or `Container`) at the top level.
    pub fn declare(&mut self, name: &str, kind: BitKind) -> Result<BitId, Error> {
        self.declare_in("", name, kind)
    }

    /// Declare a structural bit inside the container at `context`.
    pub fn declare_in(&mut self, context: &str, name: &str, kind: BitKind) -> Result<BitId, Error> {
        let value = match kind {
            BitKind::Array => BitValue::Array,
            BitKind::Container => BitValue::Container,
            other => {
                return Err(Error::KindMismatch {
                    expected: "Array or Container",
                    found: other,
                })
            }
        };
        self.append_in(context, name, value)
    }

    // === Set ===

    /// Set a scalar bit at the top level. An existing bit of the same name
    /// and kind is replaced in place when `overwrite` is true and rejected
    /// with [`Error::OverridingBit`] otherwise; a missing bit is created.
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<BitValue>,
        overwrite: bool,
    ) -> Result<BitId, Error> {
        self.set_in("", name, value, overwrite)
    }

    /// Set a scalar bit inside the container at `context`.
    pub fn set_in(
        &mut self,
        context: &str,
        name: &str,
        value: impl Into<BitValue>,
        overwrite: bool,
    ) -> Result<BitId, Error> {
        let value = value.into();
        if value.is_structural() {
            return Err(Error::KindMismatch {
                expected: "a scalar kind",
                found: value.kind(),
            });
        }
        let ctx = self.resolve_context(context)?;
        let head = self.context_head(ctx);
        if let Some(id) = address::find_any(&self.arena, head, name, value.kind()) {
            if !overwrite {
                return Err(Error::OverridingBit {
                    name: name.to_string(),
                });
            }
            if let Some(bit) = self.arena.get_mut(id) {
                bit.replace_value(value);
            }
            return Ok(id);
        }
        validate_key(name)?;
        self.insert_last(ctx, Bit::new(name, value))
    }

    /// Replace the scalar element at `array[index]` in place.
    pub fn set_at(
        &mut self,
        array: &str,
        index: usize,
        value: impl Into<BitValue>,
    ) -> Result<BitId, Error> {
        let value = value.into();
        if value.is_structural() {
            return Err(Error::KindMismatch {
                expected: "a scalar kind",
                found: value.kind(),
            });
        }
        let element = self.resolve_element(array, index)?;
        if let Some(bit) = self.arena.get_mut(element) {
            bit.replace_value(value);
        }
        Ok(element)
    }

    // === Get ===

    /// Read a scalar bit at the top level, typed by the requested Rust type.
    pub fn get<T: FromBits>(&self, name: &str) -> Result<T, Error> {
        self.get_in("", name)
    }

    /// Read a scalar bit inside the container at `context`.
    pub fn get_in<T: FromBits>(&self, context: &str, name: &str) -> Result<T, Error> {
        let ctx = self.resolve_context(context)?;
        let head = self.context_head(ctx);
        let id = address::find_any(&self.arena, head, name, T::KIND).ok_or_else(|| {
            Error::BitName {
                message: format!("no {} bit named '{}'", T::KIND, name),
            }
        })?;
        self.typed(id, name)
    }

    /// Read the element at `array[index]`.
    pub fn get_at<T: FromBits>(&self, array: &str, index: usize) -> Result<T, Error> {
        let element = self.resolve_element(array, index)?;
        let bit = self.arena.get(element).ok_or_else(|| Error::BitName {
            message: format!("'{}[{}]' is gone", array, index),
        })?;
        T::from_bits(&bit.value).ok_or_else(|| Error::BitName {
            message: format!("'{}[{}]' does not hold a {}", array, index, T::KIND),
        })
    }

    /// Borrow a scalar bit's payload at the top level.
    pub fn get_ref(&self, name: &str, kind: BitKind) -> Result<&BitValue, Error> {
        self.get_ref_in("", name, kind)
    }

    /// Borrow a scalar bit's payload inside the container at `context`.
    pub fn get_ref_in(
        &self,
        context: &str,
        name: &str,
        kind: BitKind,
    ) -> Result<&BitValue, Error> {
        if kind.is_structural() {
            return Err(Error::KindMismatch {
                expected: "a scalar kind",
                found: kind,
            });
        }
        let ctx = self.resolve_context(context)?;
        let head = self.context_head(ctx);
        let id = address::find_any(&self.arena, head, name, kind).ok_or_else(|| Error::BitName {
            message: format!("no {} bit named '{}'", kind, name),
        })?;
        self.value(id)
    }

    /// Borrow a bit's payload directly by handle.
    pub fn value(&self, id: BitId) -> Result<&BitValue, Error> {
        self.arena
            .get(id)
            .map(|bit| &bit.value)
            .ok_or_else(|| Error::BitName {
                message: "stale bit handle".to_string(),
            })
    }

    // === Remove ===

    /// Remove the top-level bit matching `name` and `kind`, freeing its
    /// whole subtree.
    pub fn remove(&mut self, name: &str, kind: BitKind) -> Result<(), Error> {
        self.remove_in("", name, kind)
    }

    /// Remove a bit from the container at `context`.
    pub fn remove_in(&mut self, context: &str, name: &str, kind: BitKind) -> Result<(), Error> {
        let ctx = self.resolve_context(context)?;
        let head = self.context_head(ctx);
        let id = address::find_any(&self.arena, head, name, kind).ok_or_else(|| Error::BitName {
            message: format!("no {} bit named '{}'", kind, name),
        })?;
        self.unlink_and_free(id);
        Ok(())
    }

    /// Remove the element at `array[index]`.
    pub fn remove_at(&mut self, array: &str, index: usize) -> Result<(), Error> {
        let element = self.resolve_element(array, index)?;
        self.unlink_and_free(element);
        Ok(())
    }

    // === Anchor ===

    /// Cache the container at `context` for repeat access.
    pub fn set_anchor(&mut self, context: &str) -> Result<BitId, Error> {
        let path = ContextPath::parse(context)?;
        if path.is_empty() {
            return Err(Error::AnchorName {
                message: "the empty path cannot be anchored".to_string(),
            });
        }
        let id = address::find_rec(&self.arena, self.first, &path, &[BitKind::Container])
            .ok_or_else(|| Error::AnchorName {
                message: format!("no container at '{}'", context),
            })?;
        self.anchor = Some(id);
        Ok(id)
    }

    /// Cache the `index`-th child of the container or array at `target`.
    pub fn set_anchor_at(&mut self, target: &str, index: usize) -> Result<BitId, Error> {
        let path = ContextPath::parse(target)?;
        let id = address::find_rec(
            &self.arena,
            self.first,
            &path,
            &[BitKind::Container, BitKind::Array],
        )
        .ok_or_else(|| Error::AnchorName {
            message: format!("no container or array at '{}'", target),
        })?;
        let head = self.arena.get(id).and_then(|bit| bit.child_head);
        let element = self
            .arena
            .nth_in_chain(head, index)
            .ok_or_else(|| Error::AnchorName {
                message: format!("'{}[{}]' is out of range", target, index),
            })?;
        self.anchor = Some(element);
        Ok(element)
    }

    /// Cache a bit directly by handle.
    pub fn set_anchor_bit(&mut self, id: BitId) -> Result<BitId, Error> {
        if !self.arena.contains(id) {
            return Err(Error::AnchorName {
                message: "stale bit handle".to_string(),
            });
        }
        self.anchor = Some(id);
        Ok(id)
    }

    /// The cached anchor. [`Error::EmptyAnchor`] when none was ever set;
    /// [`Error::AnchorName`] when the anchored bit has since been removed.
    pub fn anchor(&self) -> Result<BitId, Error> {
        let id = self.anchor.ok_or(Error::EmptyAnchor)?;
        if !self.arena.contains(id) {
            return Err(Error::AnchorName {
                message: "the anchored bit was removed".to_string(),
            });
        }
        Ok(id)
    }

    // === Array building ===

    /// Push an unnamed element onto the array at `target`, resolving the
    /// path on every call. For bulk building, resolve once (or anchor) and
    /// use [`append_iter`](Store::append_iter).
    pub fn iterate(&mut self, target: &str, value: impl Into<BitValue>) -> Result<BitId, Error> {
        let path = ContextPath::parse(target)?;
        let id = address::find_rec(&self.arena, self.first, &path, &[BitKind::Array])
            .ok_or_else(|| Error::BitName {
                message: format!("no array at '{}'", target),
            })?;
        self.push_element(id, value.into())
    }

    /// Push the first unnamed element onto a pre-resolved array.
    /// Fails with [`Error::ContextNotEmpty`] when it already has elements.
    pub fn init_iter(&mut self, context: BitId, value: impl Into<BitValue>) -> Result<BitId, Error> {
        if let Some(bit) = self.arena.get(context) {
            if bit.child_head.is_some() {
                return Err(Error::ContextNotEmpty {
                    name: bit.key.clone(),
                });
            }
        }
        self.push_element(context, value.into())
    }

    /// Push an unnamed element onto a pre-resolved array.
    pub fn append_iter(
        &mut self,
        context: BitId,
        value: impl Into<BitValue>,
    ) -> Result<BitId, Error> {
        self.push_element(context, value.into())
    }

    // === Internals ===

    fn push_element(&mut self, context: BitId, value: BitValue) -> Result<BitId, Error> {
        let kind = self
            .arena
            .get(context)
            .map(Bit::kind)
            .ok_or_else(|| Error::BitName {
                message: "stale bit handle".to_string(),
            })?;
        if kind != BitKind::Array {
            return Err(Error::KindMismatch {
                expected: "Array",
                found: kind,
            });
        }
        if value.kind() == BitKind::Array {
            return Err(Error::KindMismatch {
                expected: "a scalar kind or Container",
                found: BitKind::Array,
            });
        }
        let id = self.arena.alloc(Bit::element(value));
        self.arena.push_child(context, id);
        Ok(id)
    }

    fn resolve_context(&self, context: &str) -> Result<ContextRef, Error> {
        let path = ContextPath::parse(context)?;
        if path.is_empty() {
            return Ok(ContextRef::Root);
        }
        let id = address::find_rec(&self.arena, self.first, &path, &[BitKind::Container])
            .ok_or_else(|| Error::BitName {
                message: format!("no container at '{}'", context),
            })?;
        Ok(ContextRef::Bit(id))
    }

    fn context_head(&self, ctx: ContextRef) -> Option<BitId> {
        match ctx {
            ContextRef::Root => self.first,
            ContextRef::Bit(id) => self.arena.get(id).and_then(|bit| bit.child_head),
        }
    }

    /// The `index`-th element of the array at `array`.
    fn resolve_element(&self, array: &str, index: usize) -> Result<BitId, Error> {
        let path = ContextPath::parse(array)?;
        let id = address::find_rec(&self.arena, self.first, &path, &[BitKind::Array]).ok_or_else(
            || Error::BitName {
                message: format!("no array at '{}'", array),
            },
        )?;
        let head = self.arena.get(id).and_then(|bit| bit.child_head);
        self.arena
            .nth_in_chain(head, index)
            .ok_or_else(|| Error::BitName {
                message: format!("'{}[{}]' is out of range", array, index),
            })
    }

    /// Link a fresh bit at the end of a context, enforcing key uniqueness.
    fn insert_last(&mut self, ctx: ContextRef, bit: Bit) -> Result<BitId, Error> {
        let head = self.context_head(ctx);
        if !bit.key.is_empty() && address::find(&self.arena, head, &bit.key).is_some() {
            return Err(Error::BitName {
                message: format!("a bit named '{}' already exists in this context", bit.key),
            });
        }
        let id = self.arena.alloc(bit);
        match ctx {
            ContextRef::Root => match self.first {
                None => self.first = Some(id),
                Some(h) => {
                    if let Some(last) = self.arena.last_in_chain(h) {
                        self.arena.link_after(last, id);
                    }
                }
            },
            ContextRef::Bit(container) => {
                self.arena.push_child(container, id);
            }
        }
        Ok(id)
    }

    fn unlink_and_free(&mut self, id: BitId) {
        if self.first == Some(id) {
            self.first = self.arena.get(id).and_then(|bit| bit.next);
        }
        self.arena.detach(id);
        self.arena.free_subtree(id);
    }

    fn typed<T: FromBits>(&self, id: BitId, label: &str) -> Result<T, Error> {
        let bit = self.arena.get(id).ok_or_else(|| Error::BitName {
            message: format!("no {} bit named '{}'", T::KIND, label),
        })?;
        T::from_bits(&bit.value).ok_or_else(|| Error::BitName {
            message: format!("'{}' does not hold a {}", label, T::KIND),
        })
    }
}
