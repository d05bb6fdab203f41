//! The Bit node.

use crate::{BitId, BitKind, BitValue};

/// One node in a store's tree.
///
/// A bit is either a scalar (owned payload in `value`) or structural
/// (`value` is `Array`/`Container` and children hang off `child_head`);
/// exactly one of the two is populated, matching the kind. `key` is empty
/// for array elements, which are addressed by position. Sibling order is
/// insertion order and the only defined order.
#[derive(Clone, Debug)]
pub struct Bit {
    pub key: String,
    pub value: BitValue,
    pub previous: Option<BitId>,
    pub next: Option<BitId>,
    pub child_head: Option<BitId>,
    pub parent: Option<BitId>,
}

impl Bit {
    /// A fresh, unlinked bit.
    pub fn new(key: impl Into<String>, value: BitValue) -> Self {
        Bit {
            key: key.into(),
            value,
            previous: None,
            next: None,
            child_head: None,
            parent: None,
        }
    }

    /// An unlinked array element (empty key).
    pub fn element(value: BitValue) -> Self {
        Bit::new("", value)
    }

    pub fn kind(&self) -> BitKind {
        self.value.kind()
    }

    pub fn is_scalar(&self) -> bool {
        self.value.is_scalar()
    }

    pub fn is_structural(&self) -> bool {
        self.value.is_structural()
    }

    /// Replace the payload in place, dropping the old one.
    ///
    /// Only meaningful for scalar bits; swapping a structural payload would
    /// orphan the child list, so callers gate on `is_scalar` first.
    pub fn replace_value(&mut self, value: BitValue) {
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_bit_is_unlinked() {
        let bit = Bit::new("age", BitValue::from(30i32));
        assert_eq!(bit.key, "age");
        assert_eq!(bit.kind(), BitKind::Int);
        assert!(bit.previous.is_none());
        assert!(bit.next.is_none());
        assert!(bit.child_head.is_none());
        assert!(bit.parent.is_none());
    }

    #[test]
    fn element_has_empty_key() {
        let bit = Bit::element(BitValue::from(1i32));
        assert!(bit.key.is_empty());
    }

    #[test]
    fn replace_value_drops_old_payload() {
        let mut bit = Bit::new("name", BitValue::from("Alice"));
        bit.replace_value(BitValue::from("Bob"));
        assert_eq!(bit.value.as_str(), Some("Bob"));
    }
}
