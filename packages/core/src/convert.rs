//! Typed reads out of bit values.

use bitstore_arena::{BitKind, BitValue, Bytes};

/// Conversion from a stored payload into a concrete Rust type.
///
/// This is what makes `store.get::<i32>("age")` work: the type parameter
/// selects the kind the lookup must match, and the conversion itself can
/// only succeed on that kind. A mismatch is an ordinary lookup miss, never
/// a cast.
pub trait FromBits: Sized {
    /// The kind this conversion accepts.
    const KIND: BitKind;

    fn from_bits(value: &BitValue) -> Option<Self>;
}

impl FromBits for bool {
    const KIND: BitKind = BitKind::Bool;

    fn from_bits(value: &BitValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FromBits for i32 {
    const KIND: BitKind = BitKind::Int;

    fn from_bits(value: &BitValue) -> Option<Self> {
        value.as_int()
    }
}

impl FromBits for i64 {
    const KIND: BitKind = BitKind::Long;

    fn from_bits(value: &BitValue) -> Option<Self> {
        value.as_long()
    }
}

impl FromBits for i128 {
    const KIND: BitKind = BitKind::LongLong;

    fn from_bits(value: &BitValue) -> Option<Self> {
        value.as_long_long()
    }
}

impl FromBits for f32 {
    const KIND: BitKind = BitKind::Float;

    fn from_bits(value: &BitValue) -> Option<Self> {
        value.as_float()
    }
}

impl FromBits for f64 {
    const KIND: BitKind = BitKind::Double;

    fn from_bits(value: &BitValue) -> Option<Self> {
        value.as_double()
    }
}

impl FromBits for char {
    const KIND: BitKind = BitKind::Char;

    fn from_bits(value: &BitValue) -> Option<Self> {
        value.as_char()
    }
}

impl FromBits for String {
    const KIND: BitKind = BitKind::String;

    fn from_bits(value: &BitValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromBits for Bytes {
    const KIND: BitKind = BitKind::Unsafe;

    fn from_bits(value: &BitValue) -> Option<Self> {
        value.as_bytes().cloned()
    }
}
