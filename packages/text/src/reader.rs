//! The pull side: recursive-descent reader.
//!
//! Each production consumes exactly its own text from the cursor, allocates
//! its bit into the caller's arena, and links it to its predecessor and
//! structural parent. On any failure the whole partial build is freed before
//! the error propagates, so a failed pull never leaves bits behind.

use bitstore_arena::{Bit, BitArena, BitId, BitKind, BitValue, Bytes};

use crate::cursor::Cursor;
use crate::{tag, ParseError};

/// Parse a whole document into a sibling chain, returning its head
/// (`None` for blank input).
pub fn read_all_bits(arena: &mut BitArena, text: &str) -> Result<Option<BitId>, ParseError> {
    let mut cursor = Cursor::new(text);
    let mut head = None;
    let mut last: Option<BitId> = None;
    loop {
        cursor.skip_whitespace();
        if cursor.at_end() {
            break;
        }
        match read_bit(arena, &mut cursor) {
            Ok(id) => {
                match last {
                    None => head = Some(id),
                    Some(previous) => {
                        arena.link_after(previous, id);
                    }
                }
                last = Some(id);
            }
            Err(e) => {
                free_chain(arena, head);
                return Err(e);
            }
        }
    }
    Ok(head)
}

fn free_chain(arena: &mut BitArena, head: Option<BitId>) {
    let mut current = head;
    while let Some(id) = current {
        current = arena.get(id).and_then(|bit| bit.next);
        arena.free_subtree(id);
    }
}

/// One named bit production: top level or container body.
fn read_bit(arena: &mut BitArena, cursor: &mut Cursor) -> Result<BitId, ParseError> {
    cursor.skip_whitespace();
    let at = cursor.pos();
    let tag_char = cursor.bump().ok_or(ParseError::UnexpectedEnd {
        expected: "a type tag",
    })?;
    let kind = tag::kind_of(tag_char).ok_or(ParseError::UnknownTag { tag: tag_char, at })?;

    cursor.skip_whitespace();
    let name_at = cursor.pos();
    let name = cursor.take_ident();
    if name.is_empty() {
        return Err(ParseError::MissingName { at: name_at });
    }
    let name = name.to_string();

    match kind {
        BitKind::Container => read_container_bit(arena, cursor, name),
        BitKind::Array => read_array_bit(arena, cursor, name),
        _ => read_value_bit(arena, cursor, name, kind),
    }
}

/// One unnamed array-element production: a value bit or a container bit.
fn read_element(arena: &mut BitArena, cursor: &mut Cursor) -> Result<BitId, ParseError> {
    cursor.skip_whitespace();
    let at = cursor.pos();
    let tag_char = cursor.bump().ok_or(ParseError::UnexpectedEnd {
        expected: "a type tag",
    })?;
    let kind = tag::kind_of(tag_char).ok_or(ParseError::UnknownTag { tag: tag_char, at })?;

    cursor.skip_whitespace();
    let name_at = cursor.pos();
    let name = cursor.take_ident();
    if !name.is_empty() {
        return Err(ParseError::UnexpectedName {
            name: name.to_string(),
            at: name_at,
        });
    }

    match kind {
        BitKind::Container => read_container_bit(arena, cursor, String::new()),
        BitKind::Array => Err(ParseError::NestedArray { at }),
        _ => read_value_bit(arena, cursor, String::new(), kind),
    }
}

fn read_container_bit(
    arena: &mut BitArena,
    cursor: &mut Cursor,
    name: String,
) -> Result<BitId, ParseError> {
    let opened_at = cursor.expect('{', "'{'")?;
    let id = arena.alloc(Bit::new(name, BitValue::Container));
    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            Some('}') => {
                cursor.bump();
                break;
            }
            None => {
                arena.free_subtree(id);
                return Err(ParseError::Unterminated {
                    delimiter: '{',
                    opened_at,
                });
            }
            Some(_) => match read_bit(arena, cursor) {
                Ok(child) => {
                    arena.push_child(id, child);
                }
                Err(e) => {
                    arena.free_subtree(id);
                    return Err(e);
                }
            },
        }
    }
    Ok(id)
}

fn read_array_bit(
    arena: &mut BitArena,
    cursor: &mut Cursor,
    name: String,
) -> Result<BitId, ParseError> {
    let opened_at = cursor.expect('[', "'['")?;
    let id = arena.alloc(Bit::new(name, BitValue::Array));
    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            Some(']') => {
                cursor.bump();
                break;
            }
            None => {
                arena.free_subtree(id);
                return Err(ParseError::Unterminated {
                    delimiter: '[',
                    opened_at,
                });
            }
            Some(_) => match read_element(arena, cursor) {
                Ok(child) => {
                    arena.push_child(id, child);
                }
                Err(e) => {
                    arena.free_subtree(id);
                    return Err(e);
                }
            },
        }
    }
    Ok(id)
}

fn read_value_bit(
    arena: &mut BitArena,
    cursor: &mut Cursor,
    name: String,
    kind: BitKind,
) -> Result<BitId, ParseError> {
    cursor.expect(':', "':'")?;
    cursor.skip_whitespace();
    let value = match kind {
        BitKind::Char => read_char_literal(cursor)?,
        BitKind::String => read_string_literal(cursor)?,
        BitKind::Unsafe => read_unsafe_literal(cursor)?,
        _ => read_plain_literal(cursor, kind)?,
    };
    Ok(arena.alloc(Bit::new(name, value)))
}

/// Bool and numeric literals: one bare token, parsed per kind.
fn read_plain_literal(cursor: &mut Cursor, kind: BitKind) -> Result<BitValue, ParseError> {
    let at = cursor.pos();
    let token = cursor.take_while(|c| !c.is_whitespace() && c != ']' && c != '}');
    if token.is_empty() {
        return Err(if cursor.at_end() {
            ParseError::UnexpectedEnd {
                expected: "a literal",
            }
        } else {
            ParseError::InvalidLiteral {
                kind,
                literal: String::new(),
                at,
            }
        });
    }
    let invalid = || ParseError::InvalidLiteral {
        kind,
        literal: token.to_string(),
        at,
    };
    match kind {
        BitKind::Bool => match token {
            "true" => Ok(BitValue::Bool(true)),
            "false" => Ok(BitValue::Bool(false)),
            _ => Err(invalid()),
        },
        BitKind::Int => token.parse().map(BitValue::Int).map_err(|_| invalid()),
        BitKind::Long => token.parse().map(BitValue::Long).map_err(|_| invalid()),
        BitKind::LongLong => token.parse().map(BitValue::LongLong).map_err(|_| invalid()),
        BitKind::Float => token.parse().map(BitValue::Float).map_err(|_| invalid()),
        BitKind::Double => token.parse().map(BitValue::Double).map_err(|_| invalid()),
        _ => unreachable!("quoted and structural kinds are dispatched before this point"),
    }
}

fn read_char_literal(cursor: &mut Cursor) -> Result<BitValue, ParseError> {
    let opened_at = cursor.expect('\'', "a char literal")?;
    let c = match cursor.bump() {
        Some('\\') => read_escape(cursor, BitKind::Char)?,
        Some('\'') => {
            return Err(ParseError::InvalidLiteral {
                kind: BitKind::Char,
                literal: "''".to_string(),
                at: opened_at,
            })
        }
        Some(c) => c,
        None => {
            return Err(ParseError::Unterminated {
                delimiter: '\'',
                opened_at,
            })
        }
    };
    match cursor.bump() {
        Some('\'') => Ok(BitValue::Char(c)),
        _ => Err(ParseError::Unterminated {
            delimiter: '\'',
            opened_at,
        }),
    }
}

fn read_string_literal(cursor: &mut Cursor) -> Result<BitValue, ParseError> {
    let opened_at = cursor.expect('"', "a string literal")?;
    let mut out = String::new();
    loop {
        match cursor.bump() {
            Some('"') => return Ok(BitValue::String(out)),
            Some('\\') => out.push(read_escape(cursor, BitKind::String)?),
            Some(c) => out.push(c),
            None => {
                return Err(ParseError::Unterminated {
                    delimiter: '"',
                    opened_at,
                })
            }
        }
    }
}

/// `<hex>`: lowercase hex digits, even count, possibly empty.
fn read_unsafe_literal(cursor: &mut Cursor) -> Result<BitValue, ParseError> {
    let opened_at = cursor.expect('<', "an unsafe literal")?;
    let at = cursor.pos();
    let digits = cursor.take_while(|c| c.is_ascii_hexdigit());
    match cursor.peek() {
        Some('>') => {
            cursor.bump();
        }
        Some(found) => {
            return Err(ParseError::UnexpectedToken {
                expected: "'>'",
                found,
                at: cursor.pos(),
            })
        }
        None => {
            return Err(ParseError::Unterminated {
                delimiter: '<',
                opened_at,
            })
        }
    }
    let blob = hex::decode(digits).map_err(|_| ParseError::InvalidLiteral {
        kind: BitKind::Unsafe,
        literal: digits.to_string(),
        at,
    })?;
    Ok(BitValue::Unsafe(Bytes::from(blob)))
}

fn read_escape(cursor: &mut Cursor, kind: BitKind) -> Result<char, ParseError> {
    let at = cursor.pos();
    match cursor.bump() {
        Some('\\') => Ok('\\'),
        Some('\'') => Ok('\''),
        Some('"') => Ok('"'),
        Some('n') => Ok('\n'),
        Some('t') => Ok('\t'),
        Some('r') => Ok('\r'),
        Some('0') => Ok('\0'),
        Some(other) => Err(ParseError::InvalidLiteral {
            kind,
            literal: format!("\\{}", other),
            at: at - 1,
        }),
        None => Err(ParseError::UnexpectedEnd {
            expected: "an escape character",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (BitArena, Option<BitId>) {
        let mut arena = BitArena::new();
        let head = read_all_bits(&mut arena, text).unwrap();
        (arena, head)
    }

    fn parse_err(text: &str) -> ParseError {
        let mut arena = BitArena::new();
        let err = read_all_bits(&mut arena, text).unwrap_err();
        assert!(arena.is_empty(), "failed parse must free everything");
        err
    }

    #[test]
    fn blank_input_is_empty_tree() {
        let (_, head) = parse("   \n\t ");
        assert!(head.is_none());
    }

    #[test]
    fn scalar_kinds_parse() {
        let (arena, head) = parse(concat!(
            "b flag : true\n",
            "i age : 30\n",
            "l count : -9000000000\n",
            "x wide : 170141183460469231731687303715884105727\n",
            "f ratio : 1.5\n",
            "d pi : 3.141592653589793\n",
            "c initial : 'A'\n",
            "s name : \"Alice\"\n",
            "u blob : <4f3a>\n",
        ));
        let values: Vec<_> = arena
            .iter_chain(head)
            .map(|id| arena.get(id).unwrap().value.clone())
            .collect();
        assert_eq!(values.len(), 9);
        assert_eq!(values[0], BitValue::Bool(true));
        assert_eq!(values[1], BitValue::Int(30));
        assert_eq!(values[2], BitValue::Long(-9_000_000_000));
        assert_eq!(values[3], BitValue::LongLong(i128::MAX));
        assert_eq!(values[4], BitValue::Float(1.5));
        assert_eq!(values[5], BitValue::Double(std::f64::consts::PI));
        assert_eq!(values[6], BitValue::Char('A'));
        assert_eq!(values[7], BitValue::String("Alice".to_string()));
        assert_eq!(values[8], BitValue::Unsafe(Bytes::from_static(&[0x4f, 0x3a])));
    }

    #[test]
    fn sibling_order_is_document_order() {
        let (arena, head) = parse("i a : 1 i b : 2 i c : 3");
        let keys: Vec<_> = arena
            .iter_chain(head)
            .map(|id| arena.get(id).unwrap().key.clone())
            .collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[test]
    fn container_nests_and_links_parent() {
        let (arena, head) = parse("# people { i alice : 7 # address { s city : \"Lisbon\" } }");
        let people = head.unwrap();
        let people_bit = arena.get(people).unwrap();
        assert_eq!(people_bit.kind(), BitKind::Container);

        let alice = people_bit.child_head.unwrap();
        assert_eq!(arena.get(alice).unwrap().key, "alice");
        assert_eq!(arena.get(alice).unwrap().parent, Some(people));

        let address = arena.get(alice).unwrap().next.unwrap();
        let city = arena.get(address).unwrap().child_head.unwrap();
        assert_eq!(arena.get(city).unwrap().value.as_str(), Some("Lisbon"));
        assert_eq!(arena.get(city).unwrap().parent, Some(address));
    }

    #[test]
    fn array_elements_are_unnamed() {
        let (arena, head) = parse("a scores [ i : 1 i : 2 i : 3 ]");
        let scores = head.unwrap();
        let elements: Vec<_> = arena
            .iter_chain(arena.get(scores).unwrap().child_head)
            .map(|id| arena.get(id).unwrap().clone())
            .collect();
        assert_eq!(elements.len(), 3);
        for (i, bit) in elements.iter().enumerate() {
            assert!(bit.key.is_empty());
            assert_eq!(bit.value.as_int(), Some(i as i32 + 1));
        }
    }

    #[test]
    fn array_may_hold_unnamed_containers() {
        let (arena, head) = parse("a shapes [ # { i sides : 3 } # { i sides : 4 } ]");
        let shapes = head.unwrap();
        let mut sides = Vec::new();
        for element in arena.iter_chain(arena.get(shapes).unwrap().child_head) {
            let bit = arena.get(element).unwrap();
            assert!(bit.key.is_empty());
            assert_eq!(bit.kind(), BitKind::Container);
            let child = bit.child_head.unwrap();
            sides.push(arena.get(child).unwrap().value.as_int().unwrap());
        }
        assert_eq!(sides, [3, 4]);
    }

    #[test]
    fn cramped_input_parses() {
        let (arena, head) = parse("iage:30");
        let bit = arena.get(head.unwrap()).unwrap();
        assert_eq!(bit.key, "age");
        assert_eq!(bit.value.as_int(), Some(30));
    }

    #[test]
    fn string_escapes_decode() {
        let (arena, head) = parse(r#"s text : "line\nquote\"back\\slash\ttab""#);
        let bit = arena.get(head.unwrap()).unwrap();
        assert_eq!(bit.value.as_str(), Some("line\nquote\"back\\slash\ttab"));
    }

    #[test]
    fn char_escapes_decode() {
        let (arena, head) = parse(r"c quote : '\''");
        assert_eq!(arena.get(head.unwrap()).unwrap().value.as_char(), Some('\''));
    }

    #[test]
    fn empty_unsafe_blob() {
        let (arena, head) = parse("u blob : <>");
        assert_eq!(
            arena.get(head.unwrap()).unwrap().value.as_bytes(),
            Some(&Bytes::new())
        );
    }

    #[test]
    fn unknown_tag_fails() {
        assert!(matches!(
            parse_err("z oops : 1"),
            ParseError::UnknownTag { tag: 'z', at: 0 }
        ));
    }

    #[test]
    fn top_level_bits_need_names() {
        assert!(matches!(parse_err("i : 1"), ParseError::MissingName { .. }));
    }

    #[test]
    fn named_array_elements_rejected() {
        assert!(matches!(
            parse_err("a scores [ i sneaky : 1 ]"),
            ParseError::UnexpectedName { .. }
        ));
    }

    #[test]
    fn nested_arrays_rejected() {
        assert!(matches!(
            parse_err("a outer [ a [ ] ]"),
            ParseError::NestedArray { .. }
        ));
    }

    #[test]
    fn unterminated_container_fails() {
        assert!(matches!(
            parse_err("# box { i x : 1"),
            ParseError::Unterminated { delimiter: '{', .. }
        ));
    }

    #[test]
    fn unterminated_string_fails() {
        assert!(matches!(
            parse_err("s text : \"runs off"),
            ParseError::Unterminated { delimiter: '"', .. }
        ));
    }

    #[test]
    fn literal_kind_mismatch_fails() {
        assert!(matches!(
            parse_err("i age : notanumber"),
            ParseError::InvalidLiteral {
                kind: BitKind::Int,
                ..
            }
        ));
    }

    #[test]
    fn int_overflow_is_a_literal_error() {
        assert!(matches!(
            parse_err("i big : 2147483648"),
            ParseError::InvalidLiteral { .. }
        ));
    }

    #[test]
    fn odd_hex_fails() {
        assert!(matches!(
            parse_err("u blob : <4f3>"),
            ParseError::InvalidLiteral {
                kind: BitKind::Unsafe,
                ..
            }
        ));
    }

    #[test]
    fn truncated_input_fails() {
        assert!(matches!(
            parse_err("i age :"),
            ParseError::UnexpectedEnd { .. }
        ));
    }

    #[test]
    fn failure_midway_frees_earlier_siblings() {
        let mut arena = BitArena::new();
        let err = read_all_bits(&mut arena, "i ok : 1 # box { s bad : \"unterminated }");
        assert!(err.is_err());
        assert!(arena.is_empty());
    }
}
