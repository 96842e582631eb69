//! Node arena (C8): a fixed-capacity bump allocator of [`Node`]s.
//!
//! Grounded on `SgUctAllocator` (`SgUctTree.h`): `Clear()`/`SetMaxNodes()`/
//! `Swap()` map directly. The original backs its allocator with a raw
//! `SgUctNode*` array grown by `SetMaxNodes`; here the backing `Vec<Node>`
//! is allocated once at its final capacity and never resized, so a
//! `u32` slot index handed out by `reserve` stays valid for the arena's
//! entire lifetime (distilled spec §3: "never reallocates... any
//! previously handed-out node index/pointer remains valid").

use std::sync::atomic::{AtomicUsize, Ordering};

use super::node::Node;

/// A reserved-capacity sequence of nodes, one per worker. `reserve`
/// bump-allocates a contiguous run; `nu_nodes` only ever grows between
/// `clear()` calls (distilled spec §4.5: "Removed subtrees become
/// unreachable but are not compacted — arena counts therefore do not
/// reflect 'live' nodes").
pub struct Arena {
    nodes: Vec<Node>,
    nu_nodes: AtomicUsize,
}

impl Arena {
    pub fn new(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity);
        nodes.resize_with(capacity, Node::new_blank);
        Arena {
            nodes,
            nu_nodes: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nu_nodes.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempts to bump-allocate `n` consecutive slots. Returns the
    /// starting slot index, or `None` if the arena has no room
    /// (distilled spec §7 class 2: capacity exhaustion is reported, not
    /// fatal). Safe to call concurrently with other `reserve` calls on
    /// the *same* arena only if the caller is the arena's sole owning
    /// worker (distilled spec §5: "no cross-worker arena writes" — each
    /// worker only ever reserves from its own arena), but the
    /// fetch-update loop below is correct even without that guarantee.
    pub fn reserve(&self, n: usize) -> Option<u32> {
        let mut cur = self.nu_nodes.load(Ordering::Relaxed);
        loop {
            let next = cur.checked_add(n)?;
            if next > self.nodes.len() {
                return None;
            }
            match self
                .nu_nodes
                .compare_exchange_weak(cur, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(start) => return Some(start as u32),
                Err(actual) => cur = actual,
            }
        }
    }

    pub fn node(&self, slot: u32) -> &Node {
        &self.nodes[slot as usize]
    }

    /// Returns `nu_nodes` to zero. Does not free or rewrite existing
    /// nodes' contents (a following `reserve` will hand out the same
    /// slots again; callers overwrite every field they care about before
    /// publishing).
    pub fn clear(&mut self) {
        self.nu_nodes.store(0, Ordering::Relaxed);
        for node in &self.nodes {
            node.reset();
        }
    }

    /// Exchanges backing buffers with `other`. `other` must have
    /// capacity >= this arena's capacity (distilled spec §4.5
    /// `extractSubtree`'s precondition uses this indirectly via
    /// `Tree::swap`).
    pub fn swap(&mut self, other: &mut Arena) {
        std::mem::swap(&mut self.nodes, &mut other.nodes);
        let self_len = self.nu_nodes.swap(other.nu_nodes.load(Ordering::Relaxed), Ordering::Relaxed);
        other.nu_nodes.store(self_len, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_bump_allocates_and_refuses_overflow() {
        let arena = Arena::new(10);
        assert_eq!(arena.reserve(4), Some(0));
        assert_eq!(arena.reserve(4), Some(4));
        assert_eq!(arena.reserve(3), None); // only 2 slots left
        assert_eq!(arena.reserve(2), Some(8));
        assert_eq!(arena.len(), 10);
    }

    #[test]
    fn clear_resets_length_and_node_state() {
        let mut arena = Arena::new(4);
        let start = arena.reserve(2).unwrap();
        arena.node(start).set_signature(7);
        arena.clear();
        assert_eq!(arena.len(), 0);
        assert_eq!(arena.node(start).signature(), crate::constants::SIGNATURE_NONE);
    }

    #[test]
    fn swap_exchanges_contents() {
        let mut a = Arena::new(4);
        let mut b = Arena::new(4);
        a.reserve(2);
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 0);
        a.swap(&mut b);
        assert_eq!(a.len(), 0);
        assert_eq!(b.len(), 2);
    }
}
