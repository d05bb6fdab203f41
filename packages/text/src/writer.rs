//! The push side: renders a bit tree back to text.
//!
//! Exact inverse of the reader: nested productions indent four spaces per
//! depth, and every literal is escaped/encoded with the same rules the
//! reader decodes.

use bitstore_arena::{Bit, BitArena, BitId, BitKind, BitValue};

use crate::tag;

/// Render a whole sibling chain, one top-level bit per production.
pub fn write_all_bits(arena: &BitArena, head: Option<BitId>) -> String {
    let mut out = String::new();
    for id in arena.iter_chain(head) {
        write_bit(arena, id, 0, &mut out);
    }
    out
}

fn write_bit(arena: &BitArena, id: BitId, depth: usize, out: &mut String) {
    let Some(bit) = arena.get(id) else {
        return;
    };
    match bit.kind() {
        BitKind::Container => write_container_bit(arena, bit, depth, out),
        BitKind::Array => write_array_bit(arena, bit, depth, out),
        _ => write_var_bit(bit, depth, out),
    }
}

fn write_container_bit(arena: &BitArena, bit: &Bit, depth: usize, out: &mut String) {
    push_indent(out, depth);
    push_header(out, bit);
    out.push_str(" {\n");
    for child in arena.iter_chain(bit.child_head) {
        write_bit(arena, child, depth + 1, out);
    }
    push_indent(out, depth);
    out.push_str("}\n");
}

fn write_array_bit(arena: &BitArena, bit: &Bit, depth: usize, out: &mut String) {
    push_indent(out, depth);
    push_header(out, bit);
    out.push_str(" [\n");
    for element in arena.iter_chain(bit.child_head) {
        write_bit(arena, element, depth + 1, out);
    }
    push_indent(out, depth);
    out.push_str("]\n");
}

fn write_var_bit(bit: &Bit, depth: usize, out: &mut String) {
    push_indent(out, depth);
    push_header(out, bit);
    out.push_str(" : ");
    push_literal(out, &bit.value);
    out.push('\n');
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("    ");
    }
}

/// Tag character plus the key, when there is one (array elements have none).
fn push_header(out: &mut String, bit: &Bit) {
    out.push(tag::tag_of(bit.kind()));
    if !bit.key.is_empty() {
        out.push(' ');
        out.push_str(&bit.key);
    }
}

fn push_literal(out: &mut String, value: &BitValue) {
    match value {
        BitValue::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
        BitValue::Int(v) => out.push_str(&v.to_string()),
        BitValue::Long(v) => out.push_str(&v.to_string()),
        BitValue::LongLong(v) => out.push_str(&v.to_string()),
        BitValue::Float(v) => out.push_str(&v.to_string()),
        BitValue::Double(v) => out.push_str(&v.to_string()),
        BitValue::Char(c) => {
            out.push('\'');
            push_escaped(out, *c);
            out.push('\'');
        }
        BitValue::String(s) => {
            out.push('"');
            for c in s.chars() {
                push_escaped(out, c);
            }
            out.push('"');
        }
        BitValue::Unsafe(blob) => {
            out.push('<');
            out.push_str(&hex::encode(blob));
            out.push('>');
        }
        BitValue::Array | BitValue::Container => {
            unreachable!("structural bits are rendered by their own productions")
        }
    }
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '\\' => out.push_str("\\\\"),
        '"' => out.push_str("\\\""),
        '\'' => out.push_str("\\'"),
        '\n' => out.push_str("\\n"),
        '\t' => out.push_str("\\t"),
        '\r' => out.push_str("\\r"),
        '\0' => out.push_str("\\0"),
        other => out.push(other),
    }
}
