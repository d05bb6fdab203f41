//! The addressing engine.
//!
//! Every read and write on a store resolves its target through these
//! lookups. They all scan a sibling chain linearly in insertion order;
//! because creation enforces key uniqueness per context, the first match is
//! also the only match. Lookups return `None` on a miss - call sites decide
//! whether that is a `BitName` or `AnchorName` error - and never fall back
//! to a bit of the wrong kind.

use bitstore_arena::{BitArena, BitId, BitKind};

use crate::path::ContextPath;

/// First bit in the chain whose key equals `name`.
///
/// The empty name never matches: array elements are addressed by position,
/// not by their (empty) key.
pub fn find(arena: &BitArena, head: Option<BitId>, name: &str) -> Option<BitId> {
    if name.is_empty() {
        return None;
    }
    arena
        .iter_chain(head)
        .find(|&id| arena.get(id).is_some_and(|bit| bit.key == name))
}

/// Name match restricted to scalar kinds.
pub fn find_value(arena: &BitArena, head: Option<BitId>, name: &str) -> Option<BitId> {
    let id = find(arena, head, name)?;
    arena.get(id)?.is_scalar().then_some(id)
}

/// Name match restricted to structural kinds.
pub fn find_structural(arena: &BitArena, head: Option<BitId>, name: &str) -> Option<BitId> {
    let id = find(arena, head, name)?;
    arena.get(id)?.is_structural().then_some(id)
}

/// Name plus exact-kind match.
pub fn find_any(arena: &BitArena, head: Option<BitId>, name: &str, kind: BitKind) -> Option<BitId> {
    let id = find(arena, head, name)?;
    (arena.get(id)?.kind() == kind).then_some(id)
}

/// Resolve a context path from a chain head.
///
/// Every segment but the last must name a `Container`, whose child list the
/// walk descends into; the final segment must match one of the `terminal`
/// kinds. The empty path resolves to `head` itself, with no kind check -
/// callers treat it as "the context I started from".
pub fn find_rec(
    arena: &BitArena,
    head: Option<BitId>,
    path: &ContextPath,
    terminal: &[BitKind],
) -> Option<BitId> {
    let mut segments = path.iter().peekable();
    let mut chain = head;
    let Some(mut segment) = segments.next() else {
        return head;
    };
    loop {
        if segments.peek().is_none() {
            let id = find(arena, chain, segment)?;
            let kind = arena.get(id)?.kind();
            return terminal.contains(&kind).then_some(id);
        }
        let id = find_any(arena, chain, segment, BitKind::Container)?;
        chain = arena.get(id)?.child_head;
        segment = segments.next()?;
    }
}
