//! Block table (C2): per-point ownership of blocks, with incremental
//! stone/liberty bookkeeping.
//!
//! Grounded on `GoUctBoard.h`'s nested `Block` class (anchor, color,
//! stone list, liberty list) and the merge/kill machinery in
//! `GoUctBoard.cpp` (`AddStoneToBlock`, `MergeBlocks`, `KillBlock`).
//!
//! Per the distilled spec's Design Notes, raw pointers from point to
//! block are replaced with a `Vec<Block>` arena owned by the table and a
//! `block_index: Vec<u32>` mapping point -> slot (0 = none); the
//! original's mutable "marker" set used to deduplicate liberties during
//! a merge is replaced with a scratch `Vec<u32>` plus a generation
//! counter for O(1) clearing.

use crate::constants::BOARDSIZE;
use crate::point::{neighbors4, Color, Point};

/// A maximally connected set of same-color stones together with its
/// liberties. See distilled spec §3 ("Block").
#[derive(Clone, Debug)]
pub struct Block {
    pub color: Color,
    pub anchor: Point,
    pub stones: Vec<Point>,
    pub liberties: Vec<Point>,
}

impl Block {
    #[inline]
    pub fn num_liberties(&self) -> usize {
        self.liberties.len()
    }

    #[inline]
    pub fn in_atari(&self) -> bool {
        self.liberties.len() == 1
    }

    /// Valid only when `in_atari()` holds.
    #[inline]
    pub fn the_liberty(&self) -> Point {
        debug_assert_eq!(self.liberties.len(), 1, "the_liberty requires atari");
        self.liberties[0]
    }
}

/// Slot index into the block arena; `0` means "no block" (see
/// `block_index`). Matches the distilled spec's `block[P]` field.
pub type Slot = u32;

const NO_BLOCK: Slot = 0;

/// Owns the block arena and the point -> slot index, plus a reusable
/// scratch marker for O(1)-clear deduplication during merges.
#[derive(Clone)]
pub struct BlockTable {
    /// Slot 0 is an unused dummy so that `NO_BLOCK == 0` is a safe sentinel.
    blocks: Vec<Option<Block>>,
    free_slots: Vec<Slot>,
    block_index: Vec<Slot>,
    scratch: Vec<u32>,
    generation: u32,
}

impl BlockTable {
    pub fn new() -> Self {
        let mut blocks = Vec::with_capacity(BOARDSIZE / 2 + 1);
        blocks.push(None); // slot 0 = dummy / NO_BLOCK
        BlockTable {
            blocks,
            free_slots: Vec::new(),
            block_index: vec![NO_BLOCK; BOARDSIZE],
            scratch: vec![0; BOARDSIZE],
            generation: 0,
        }
    }

    pub fn clear(&mut self) {
        self.blocks.truncate(1);
        self.free_slots.clear();
        self.block_index.iter_mut().for_each(|s| *s = NO_BLOCK);
    }

    #[inline]
    pub fn slot_at(&self, p: Point) -> Slot {
        self.block_index[p]
    }

    #[inline]
    pub fn block_at(&self, p: Point) -> Option<&Block> {
        let slot = self.block_index[p];
        if slot == NO_BLOCK {
            None
        } else {
            self.blocks[slot as usize].as_ref()
        }
    }

    #[inline]
    pub fn block(&self, slot: Slot) -> &Block {
        self.blocks[slot as usize]
            .as_ref()
            .expect("dereferenced a freed block slot")
    }

    #[inline]
    fn block_mut(&mut self, slot: Slot) -> &mut Block {
        self.blocks[slot as usize]
            .as_mut()
            .expect("dereferenced a freed block slot")
    }

    fn alloc_slot(&mut self, block: Block) -> Slot {
        if let Some(slot) = self.free_slots.pop() {
            self.blocks[slot as usize] = Some(block);
            slot
        } else {
            self.blocks.push(Some(block));
            (self.blocks.len() - 1) as Slot
        }
    }

    /// Begins a scratch pass: marks are all considered "unset" until
    /// [`Self::mark`] is called for the current generation. O(1).
    fn scratch_begin(&mut self) {
        self.generation += 1;
    }

    fn mark(&mut self, p: Point) {
        self.scratch[p] = self.generation;
    }

    fn is_marked(&self, p: Point) -> bool {
        self.scratch[p] == self.generation
    }

    /// Used only by `PlayoutBoard::init`'s from-scratch flood-fill rebuild:
    /// allocate a block with pre-computed stones/liberties directly,
    /// bypassing the incremental single-stone/append/merge paths.
    pub fn alloc_block_raw(&mut self, color: Color, anchor: Point, stones: Vec<Point>, liberties: Vec<Point>) -> Slot {
        self.alloc_slot(Block {
            color,
            anchor,
            stones,
            liberties,
        })
    }

    /// Used only by `PlayoutBoard::init`'s rebuild, alongside `alloc_block_raw`.
    pub fn set_index(&mut self, p: Point, slot: Slot) {
        self.block_index[p] = slot;
    }

    /// Create a new single-stone block at `p` (distilled spec §4.1 step 5,
    /// "no same-color neighbors" case). `empty_neighbors` are `p`'s empty
    /// 4-neighbors at the moment of placement.
    pub fn create_single_stone_block(
        &mut self,
        p: Point,
        color: Color,
        empty_neighbors: &[Point],
    ) -> Slot {
        let block = Block {
            color,
            anchor: p,
            stones: vec![p],
            liberties: empty_neighbors.to_vec(),
        };
        let slot = self.alloc_slot(block);
        self.block_index[p] = slot;
        slot
    }

    /// Append `p` to the single existing same-color neighbor block
    /// (distilled spec §4.1 step 5, single-neighbor case). `empty_neighbors`
    /// are `p`'s empty 4-neighbors not already known as liberties of
    /// `slot`.
    pub fn append_stone(&mut self, slot: Slot, p: Point, new_liberties: &[Point]) {
        self.block_index[p] = slot;
        let block = self.block_mut(slot);
        block.stones.push(p);
        for &lib in new_liberties {
            if !block.liberties.contains(&lib) {
                block.liberties.push(lib);
            }
        }
    }

    /// Merge `others` into `survivor` (the largest neighbor block is
    /// chosen as survivor by the caller). Deduplicates liberties using the
    /// generation-counter scratch buffer preloaded with the survivor's
    /// existing liberties, per distilled spec §4.1 step 5 "merge" case and
    /// `GoUctBoard.cpp`'s `MergeBlocks`.
    pub fn merge_blocks(&mut self, survivor: Slot, others: &[Slot], p: Point, extra_libs: &[Point]) {
        self.scratch_begin();
        for &lib in &self.block(survivor).liberties.clone() {
            self.mark(lib);
        }
        self.block_mut(survivor).stones.push(p);
        self.block_index[p] = survivor;

        for &other in others {
            let (stones, liberties, color) = {
                let b = self.block(other);
                (b.stones.clone(), b.liberties.clone(), b.color)
            };
            debug_assert_eq!(color, self.block(survivor).color);
            for s in stones {
                self.block_index[s] = survivor;
                self.block_mut(survivor).stones.push(s);
            }
            for lib in liberties {
                if !self.is_marked(lib) {
                    self.mark(lib);
                    self.block_mut(survivor).liberties.push(lib);
                }
            }
            self.free_block(other);
        }
        for &lib in extra_libs {
            if !self.is_marked(lib) {
                self.mark(lib);
                self.block_mut(survivor).liberties.push(lib);
            }
        }
    }

    /// Remove `p` from the liberty list of its 4-neighbors' blocks
    /// (distilled spec §4.1 step 3). Each distinct same-color block is
    /// touched once.
    pub fn remove_liberty_from_neighbors(&mut self, p: Point) {
        let mut touched: Vec<Slot> = Vec::with_capacity(4);
        for n in neighbors4(p) {
            let slot = self.block_index[n];
            if slot != NO_BLOCK && !touched.contains(&slot) {
                touched.push(slot);
                let block = self.block_mut(slot);
                if let Some(pos) = block.liberties.iter().position(|&l| l == p) {
                    block.liberties.swap_remove(pos);
                }
            }
        }
    }

    /// Adds `p` back as a liberty to every distinct block adjacent to it
    /// of color `color` (used both during merges' neighbor scan and when
    /// a stone is captured and its point becomes a liberty of the
    /// surrounding blocks). Distilled spec §4.1 step 4.
    pub fn add_liberty_to_neighbors(&mut self, p: Point, color: Color) {
        let mut touched: Vec<Slot> = Vec::with_capacity(4);
        for n in neighbors4(p) {
            let slot = self.block_index[n];
            if slot == NO_BLOCK || touched.contains(&slot) {
                continue;
            }
            if self.block(slot).color != color {
                continue;
            }
            touched.push(slot);
            let block = self.block_mut(slot);
            if !block.liberties.contains(&p) {
                block.liberties.push(p);
            }
        }
    }

    /// Distinct same-color neighbor block slots of `p` (no color filter
    /// applied at this layer — callers pass the right neighbor set).
    pub fn distinct_neighbor_blocks(&self, p: Point, color: Color) -> Vec<Slot> {
        let mut out = Vec::with_capacity(4);
        for n in neighbors4(p) {
            let slot = self.block_index[n];
            if slot != NO_BLOCK && self.block(slot).color == color && !out.contains(&slot) {
                out.push(slot);
            }
        }
        out
    }

    /// Kills the block at `slot`: removes every stone, freeing the slot,
    /// and returns the list of captured stones (in block order, as the
    /// distilled spec's `capturedStones` requires "in some order").
    /// Does not add liberties to neighboring opponent blocks of the
    /// opposite color — that is the caller's responsibility (distilled
    /// spec step 4: "add the stone as a liberty of each distinct adjacent
    /// block of the opposite color").
    pub fn kill_block(&mut self, slot: Slot) -> Vec<Point> {
        let stones = self.block(slot).stones.clone();
        for &s in &stones {
            self.block_index[s] = NO_BLOCK;
        }
        self.free_block(slot);
        stones
    }

    fn free_block(&mut self, slot: Slot) {
        self.blocks[slot as usize] = None;
        self.free_slots.push(slot);
    }
}

impl Default for BlockTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_stone_block_has_its_empty_neighbors_as_liberties() {
        let mut t = BlockTable::new();
        let p = 50;
        let libs = vec![51, 52];
        let slot = t.create_single_stone_block(p, Color::Black, &libs);
        assert_eq!(t.block(slot).stones, vec![p]);
        assert_eq!(t.block(slot).liberties.len(), 2);
    }

    #[test]
    fn merge_deduplicates_liberties() {
        let mut t = BlockTable::new();
        let a = t.create_single_stone_block(10, Color::Black, &[11, 20]);
        let b = t.create_single_stone_block(12, Color::Black, &[11, 13]);
        t.merge_blocks(a, &[b], 100, &[]);
        let block = t.block(a);
        let mut libs = block.liberties.clone();
        libs.sort();
        assert_eq!(libs, vec![11, 13, 20]);
        assert_eq!(block.stones.len(), 3);
    }

    #[test]
    fn kill_block_frees_the_slot_and_index() {
        let mut t = BlockTable::new();
        let slot = t.create_single_stone_block(10, Color::Black, &[11]);
        let stones = t.kill_block(slot);
        assert_eq!(stones, vec![10]);
        assert_eq!(t.slot_at(10), NO_BLOCK);
    }
}
