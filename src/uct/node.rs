//! UCT node (C8/C9 data type): the per-position statistics block stored
//! in a worker arena.
//!
//! Grounded on `SgUctNode` (`SgUctTree.h`): the same field list (move,
//! posCount, value/rave statistics pairs, firstChild/nuChildren,
//! signature), but with the original's `volatile` word-tearing reliance
//! replaced by typed atomics, per the distilled spec's Design Notes
//! ("Volatile shared statistics" / "Inheritance of `UctNode` statistics
//! class"): `Stat` replaces `SgStatisticsBase<float, size_t>` as a
//! concrete inline struct composed twice (value, rave).

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};

use crate::constants::{NULL_POINT, SIGNATURE_NONE};
use crate::point::Point;

/// A `(sum, count)` pair updated without locks. Per distilled spec §5.1,
/// readers may observe a `sum` momentarily inconsistent with its `count`;
/// this is tolerated because the statistic is a running mean sampled
/// over many simulations. `sum` is stored as reinterpreted `f32` bits
/// (there is no native atomic float) updated via a relaxed CAS loop;
/// `count` is a plain atomic counter. Both fields use relaxed ordering.
#[derive(Debug)]
pub struct Stat {
    sum_bits: AtomicU32,
    count: AtomicUsize,
}

impl Stat {
    fn new() -> Self {
        Stat {
            sum_bits: AtomicU32::new(0.0f32.to_bits()),
            count: AtomicUsize::new(0),
        }
    }

    /// `SgUctNode::AddGameResult`/`AddRaveValue`: accumulate one more
    /// observation. Racy by design (distilled spec §5.1): a concurrent
    /// reader may see the updated `count` before the updated `sum`, or
    /// vice versa.
    pub fn add(&self, value: f32) {
        let mut cur = self.sum_bits.load(Ordering::Relaxed);
        loop {
            let new = (f32::from_bits(cur) + value).to_bits();
            match self
                .sum_bits
                .compare_exchange_weak(cur, new, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => break,
                Err(actual) => cur = actual,
            }
        }
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// `SgUctNode::InitializeValue`/`InitializeRaveValue`: seed the
    /// statistic with a prior mean and pseudocount. Called only while the
    /// node is still exclusively owned by the expanding worker (before
    /// publication), so plain relaxed stores suffice.
    pub fn initialize(&self, value: f32, count: usize) {
        self.sum_bits
            .store((value * count as f32).to_bits(), Ordering::Relaxed);
        self.count.store(count, Ordering::Relaxed);
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> f32 {
        f32::from_bits(self.sum_bits.load(Ordering::Relaxed))
    }

    /// The running mean, or `0.5` (the conventional "unknown" midpoint)
    /// when there are no observations yet.
    pub fn mean(&self) -> f64 {
        let c = self.count();
        if c == 0 {
            0.5
        } else {
            self.sum() as f64 / c as f64
        }
    }

    fn reset(&self) {
        self.sum_bits.store(0.0f32.to_bits(), Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

impl Default for Stat {
    fn default() -> Self {
        Self::new()
    }
}

/// Packed `(arena_id, slot)` handle to a node owned by one of the tree's
/// per-worker arenas, distinct from the tree's single root. `arena_id`
/// is offset by 1 so that `0` can mean "undefined" in the packed atomic
/// representation used by [`Node::first_child`].
const UNDEFINED_CHILD: u64 = 0;

#[inline]
fn pack_child(arena_id: u32, slot: u32) -> u64 {
    ((arena_id as u64 + 1) << 32) | slot as u64
}

#[inline]
fn unpack_child(packed: u64) -> Option<(u32, u32)> {
    if packed == UNDEFINED_CHILD {
        None
    } else {
        Some(((packed >> 32) as u32 - 1, packed as u32))
    }
}

/// A node of the UCT tree. See distilled spec §3 "UCT node" for the
/// field-level invariants (`nuChildren == 0 => firstChild` undefined,
/// `moveCount == valueSum.count`, `posCount >= moveCount`).
#[derive(Debug)]
pub struct Node {
    /// The move that led to this node. Undefined (left as `NULL_POINT`)
    /// for the root. An atomic (rather than a plain field) because nodes
    /// live in a shared arena indexed through `&Node`, never `&mut Node`,
    /// once any other node in the same arena might be concurrently
    /// initialized (distilled spec §5: only the expanding worker touches
    /// its own reserved slots, but that worker has only a shared
    /// reference into the arena's backing storage).
    mv: AtomicUsize,
    pos_count: AtomicUsize,
    value: Stat,
    rave: Stat,
    first_child: AtomicU64,
    nu_children: AtomicU32,
    signature: AtomicUsize,
}

impl Node {
    /// A freshly allocated, unpublished node: zero statistics, no
    /// children, signature at the sentinel "not computed" value
    /// (distilled spec §3: `SIGNATURE_NONE`, matching
    /// `numeric_limits<size_t>::max()` in `SgUctNode`'s constructor).
    pub fn new_blank() -> Self {
        Node {
            mv: AtomicUsize::new(NULL_POINT),
            pos_count: AtomicUsize::new(0),
            value: Stat::new(),
            rave: Stat::new(),
            first_child: AtomicU64::new(UNDEFINED_CHILD),
            nu_children: AtomicU32::new(0),
            signature: AtomicUsize::new(SIGNATURE_NONE),
        }
    }

    /// Re-initializes an arena slot being reused by a new `createChildren`
    /// call (arenas are cleared between searches, not between individual
    /// allocations, so a freshly-reserved slot still holds this blank
    /// state from construction or from the last `clear()`).
    pub fn reset(&self) {
        self.mv.store(NULL_POINT, Ordering::Relaxed);
        self.pos_count.store(0, Ordering::Relaxed);
        self.value.reset();
        self.rave.reset();
        self.first_child.store(UNDEFINED_CHILD, Ordering::Relaxed);
        self.nu_children.store(0, Ordering::Relaxed);
        self.signature.store(SIGNATURE_NONE, Ordering::Relaxed);
    }

    pub fn mv(&self) -> Point {
        self.mv.load(Ordering::Relaxed)
    }

    /// Sets the move field. Only valid on a node not yet reachable from
    /// any parent's `firstChild` (i.e. during `createChildren`, before
    /// publication).
    pub(super) fn set_move(&self, mv: Point) {
        self.mv.store(mv, Ordering::Relaxed);
    }

    pub fn pos_count(&self) -> usize {
        self.pos_count.load(Ordering::Relaxed)
    }

    pub fn inc_pos_count(&self) {
        self.pos_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_pos_count_by(&self, count: usize) {
        self.pos_count.fetch_add(count, Ordering::Relaxed);
    }

    pub fn value(&self) -> &Stat {
        &self.value
    }

    pub fn rave(&self) -> &Stat {
        &self.rave
    }

    pub fn move_count(&self) -> usize {
        self.value.count()
    }

    /// Mean of the value statistic, conventionally read as "probability
    /// the mover at this node wins".
    pub fn mean(&self) -> f64 {
        self.value.mean()
    }

    pub fn rave_mean(&self) -> f64 {
        self.rave.mean()
    }

    pub fn rave_count(&self) -> usize {
        self.rave.count()
    }

    pub fn has_children(&self) -> bool {
        self.nu_children.load(Ordering::Acquire) > 0
    }

    pub fn nu_children(&self) -> u32 {
        self.nu_children.load(Ordering::Acquire)
    }

    /// Valid only after `has_children()` — mirrors `SgUctNode::FirstChild`'s
    /// precondition (distilled spec §3: "If `nuChildren == 0`, `firstChild`
    /// is undefined (never dereferenced)").
    pub(super) fn first_child_raw(&self) -> Option<(u32, u32)> {
        unpack_child(self.first_child.load(Ordering::Acquire))
    }

    pub(super) fn set_first_child_raw(&self, arena_id: u32, slot: u32) {
        self.first_child.store(pack_child(arena_id, slot), Ordering::Relaxed);
    }

    /// Attempts to publish `nu_children` for this node (distilled spec
    /// §5.2: "a worker... publishes by writing `nuChildren` last with
    /// release semantics"). Returns whether *this* call's CAS won the
    /// race; callers outside a race always win. See the `uct::tree`
    /// module doc comment for why a losing call still leaves the tree in
    /// a valid state.
    pub(super) fn publish_children(&self, nu_children: u32) -> bool {
        self.nu_children
            .compare_exchange(0, nu_children, Ordering::Release, Ordering::Acquire)
            .is_ok()
    }

    /// Unconditional republish, used by `applyFilter`'s single-writer
    /// rewrite of an already-expanded node's child range (not a race:
    /// the distilled spec's root filter runs "not inside a single
    /// search", serialized with respect to concurrent expansion).
    pub(super) fn republish_children(&self, nu_children: u32) {
        self.nu_children.store(nu_children, Ordering::Release);
    }

    pub fn signature(&self) -> usize {
        self.signature.load(Ordering::Relaxed)
    }

    pub fn set_signature(&self, sig: usize) {
        self.signature.store(sig, Ordering::Relaxed);
    }

    /// `SgUctNode::CopyDataFrom`: copies statistics but deliberately NOT
    /// the signature field (distilled spec §9 Design Notes: "`CopyDataFrom`
    /// in the node does not copy the signature field; replicate that
    /// behavior precisely").
    pub fn copy_stats_from(&self, other: &Node) {
        self.pos_count.store(other.pos_count(), Ordering::Relaxed);
        self.value
            .sum_bits
            .store(other.value.sum_bits.load(Ordering::Relaxed), Ordering::Relaxed);
        self.value.count.store(other.value.count(), Ordering::Relaxed);
        self.rave
            .sum_bits
            .store(other.rave.sum_bits.load(Ordering::Relaxed), Ordering::Relaxed);
        self.rave.count.store(other.rave.count(), Ordering::Relaxed);
        // signature intentionally not copied.
    }
}
