//! Playout board (C3): a mutable Go position optimized for millions of
//! light simulations per second — incremental blocks, liberties,
//! neighbor counts and simple-ko state, with no undo.
//!
//! Grounded directly on `GoUctBoard.h`/`GoUctBoard.cpp`'s `Play` method
//! and its helpers (`AddStone`, `RemoveLibFromAdjBlocks`,
//! `KillAdjacentOpponentBlocks`, `UpdateBlocksAfterAddStone`). The
//! numbered steps in the doc comment on [`PlayoutBoard::play`] are the
//! distilled spec's §4.1 algorithm, implemented in the same order.

use crate::block::{BlockTable, Slot};
use crate::constants::{BOARDSIZE, NULL_POINT};
use crate::point::{is_on_board, neighbors4, Color, Point, PointState};
use crate::reference_board::ReferenceBoard;

/// A precondition of `play`/query methods was violated. Per distilled
/// spec §7 class 1, these are programming errors — the core never
/// constructs one itself; this type exists only so callers outside the
/// core (a GTP front-end, a fuzzer) that bypass `is_legal` get a
/// recoverable signal instead of a panic when they choose to call
/// [`PlayoutBoard::try_play`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    OffBoard,
    Occupied,
    Suicide,
    KoViolation,
}

impl std::fmt::Display for MoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MoveError::OffBoard => "point is off-board",
            MoveError::Occupied => "point is occupied",
            MoveError::Suicide => "move is suicide",
            MoveError::KoViolation => "move recaptures the simple ko point",
        };
        write!(f, "{s}")
    }
}

impl std::error::Error for MoveError {}

/// Cloneable so that callers needing hypothetical lookahead without
/// undo (the ladder reader in [`crate::safety`]) can branch by copying
/// the whole board rather than by reverting moves.
#[derive(Clone)]
pub struct PlayoutBoard {
    state: Vec<PointState>,
    blocks: BlockTable,
    /// `nu_neighbors[color.index()][p]`: count of cardinal neighbors of
    /// that color.
    nu_neighbors: [Vec<u8>; 2],
    nu_empty: Vec<u8>,
    to_play: Color,
    ko_point: Point,
    captured_stones: Vec<Point>,
    prisoners: [u32; 2],
    last_move: Point,
    second_last_move: Point,
    n_moves: usize,
}

impl PlayoutBoard {
    pub fn new() -> Self {
        PlayoutBoard {
            state: vec![PointState::Border; BOARDSIZE],
            blocks: BlockTable::new(),
            nu_neighbors: [vec![0; BOARDSIZE], vec![0; BOARDSIZE]],
            nu_empty: vec![0; BOARDSIZE],
            to_play: Color::Black,
            ko_point: NULL_POINT,
            captured_stones: Vec::new(),
            prisoners: [0, 0],
            last_move: NULL_POINT,
            second_last_move: NULL_POINT,
            n_moves: 0,
        }
    }

    /// Copy stones, ko, move history and to-play from the external
    /// reference, then rebuild all blocks from scratch. Reuses the
    /// board's internal arena (the block table is cleared, not
    /// reallocated).
    pub fn init(&mut self, reference: &dyn ReferenceBoard) {
        self.blocks.clear();
        for p in 0..BOARDSIZE {
            self.state[p] = PointState::Border;
            self.nu_neighbors[0][p] = 0;
            self.nu_neighbors[1][p] = 0;
            self.nu_empty[p] = 0;
        }
        for p in reference.points() {
            self.state[p] = PointState::Empty;
        }

        // First pass: place stones so color queries below see the final board.
        for p in reference.points() {
            if let PointState::Stone(c) = reference.get_color(p) {
                self.state[p] = PointState::Stone(c);
            }
        }
        // Second pass: neighbor counts, derived purely from `state`.
        for p in reference.points() {
            let mut empty = 0u8;
            let mut nb = [0u8, 0u8];
            for n in neighbors4(p) {
                match self.state[n] {
                    PointState::Empty => empty += 1,
                    PointState::Stone(c) => nb[c.index()] += 1,
                    PointState::Border => {}
                }
            }
            self.nu_empty[p] = empty;
            self.nu_neighbors[0][p] = nb[0];
            self.nu_neighbors[1][p] = nb[1];
        }
        // Third pass: rebuild blocks by flood fill (only done on init, not
        // on the incremental `play` path).
        let mut visited = vec![false; BOARDSIZE];
        for p in reference.points() {
            if visited[p] {
                continue;
            }
            let color = match self.state[p] {
                PointState::Stone(c) => c,
                _ => continue,
            };
            let mut stack = vec![p];
            let mut stones = Vec::new();
            let mut liberties = Vec::new();
            visited[p] = true;
            while let Some(q) = stack.pop() {
                stones.push(q);
                for n in neighbors4(q) {
                    match self.state[n] {
                        PointState::Empty => {
                            if !liberties.contains(&n) {
                                liberties.push(n);
                            }
                        }
                        PointState::Stone(c2) if c2 == color && !visited[n] => {
                            visited[n] = true;
                            stack.push(n);
                        }
                        _ => {}
                    }
                }
            }
            let anchor = *stones.iter().min().unwrap();
            let slot = self.blocks.alloc_block_raw(color, anchor, stones.clone(), liberties);
            for s in stones {
                self.blocks.set_index(s, slot);
            }
        }

        self.to_play = reference.to_play();
        self.ko_point = reference.ko_point().unwrap_or(NULL_POINT);
        self.last_move = reference.get_last_move().unwrap_or(NULL_POINT);
        self.second_last_move = reference.get_2nd_last_move().unwrap_or(NULL_POINT);
        self.prisoners[0] = reference.num_prisoners(Color::Black);
        self.prisoners[1] = reference.num_prisoners(Color::White);
        self.captured_stones.clear();
        self.n_moves = 0;
    }

    #[inline]
    pub fn to_play(&self) -> Color {
        self.to_play
    }

    #[inline]
    pub fn color(&self, p: Point) -> PointState {
        self.state[p]
    }

    #[inline]
    pub fn ko_point(&self) -> Option<Point> {
        if self.ko_point == NULL_POINT {
            None
        } else {
            Some(self.ko_point)
        }
    }

    #[inline]
    pub fn captured_stones(&self) -> &[Point] {
        &self.captured_stones
    }

    #[inline]
    pub fn num_prisoners(&self, c: Color) -> u32 {
        self.prisoners[c.index()]
    }

    #[inline]
    pub fn get_last_move(&self) -> Option<Point> {
        (self.last_move != NULL_POINT).then_some(self.last_move)
    }

    #[inline]
    pub fn get_2nd_last_move(&self) -> Option<Point> {
        (self.second_last_move != NULL_POINT).then_some(self.second_last_move)
    }

    #[inline]
    pub fn n_moves(&self) -> usize {
        self.n_moves
    }

    /// All genuine on-board points (see [`crate::point::all_board_points`]).
    pub fn points(&self) -> impl Iterator<Item = Point> {
        crate::point::all_board_points()
    }

    /// The stones of the block anchored at (containing) `p`, or empty if
    /// `p` is not occupied.
    pub fn block_stones(&self, p: Point) -> &[Point] {
        self.blocks
            .block_at(p)
            .map(|b| b.stones.as_slice())
            .unwrap_or(&[])
    }

    pub fn block_color(&self, p: Point) -> Option<Color> {
        self.blocks.block_at(p).map(|b| b.color)
    }

    pub fn block_anchor(&self, p: Point) -> Option<Point> {
        self.blocks.block_at(p).map(|b| b.anchor)
    }

    pub fn liberties(&self, p: Point) -> &[Point] {
        self.blocks
            .block_at(p)
            .map(|b| b.liberties.as_slice())
            .unwrap_or(&[])
    }

    pub fn num_liberties(&self, p: Point) -> usize {
        self.blocks.block_at(p).map(|b| b.num_liberties()).unwrap_or(0)
    }

    pub fn at_most_num_libs(&self, p: Point, n: usize) -> bool {
        self.num_liberties(p) <= n
    }

    pub fn in_atari(&self, p: Point) -> bool {
        self.blocks.block_at(p).map(|b| b.in_atari()).unwrap_or(false)
    }

    /// Valid only when `num_liberties(p) == 1`.
    pub fn the_liberty(&self, p: Point) -> Point {
        self.blocks
            .block_at(p)
            .expect("the_liberty requires an occupied point")
            .the_liberty()
    }

    /// Distinct same-color blocks adjacent to `blockP`'s block with at
    /// most `max_lib` liberties (pass `usize::MAX` for "all").
    pub fn adjacent_blocks(&self, block_p: Point, max_lib: usize) -> Vec<Point> {
        let color = match self.blocks.block_at(block_p) {
            Some(b) => b.color,
            None => return Vec::new(),
        };
        let mut anchors = Vec::new();
        for &stone in &self.blocks.block_at(block_p).unwrap().stones.clone() {
            for n in neighbors4(stone) {
                if let Some(nb) = self.blocks.block_at(n) {
                    if nb.color == color
                        && nb.anchor != block_p
                        && nb.num_liberties() <= max_lib
                        && !anchors.contains(&nb.anchor)
                    {
                        anchors.push(nb.anchor);
                    }
                }
            }
        }
        anchors
    }

    /// Distinct blocks of color `c` adjacent to the empty point `empty_p`.
    pub fn neighbor_blocks(&self, empty_p: Point, c: Color) -> Vec<Point> {
        debug_assert!(matches!(self.state[empty_p], PointState::Empty));
        let mut anchors = Vec::new();
        for n in neighbors4(empty_p) {
            if let Some(nb) = self.blocks.block_at(n) {
                if nb.color == c && !anchors.contains(&nb.anchor) {
                    anchors.push(nb.anchor);
                }
            }
        }
        anchors
    }

    /// distilled spec §4.1 "Legality": suicide detection uses only the
    /// cached neighbor counts.
    pub fn is_legal(&self, p: Point, player: Color) -> bool {
        if p == NULL_POINT {
            return true; // PASS_MOVE == NULL_POINT == 0: pass is always legal
        }
        if !is_on_board(p) {
            return false;
        }
        if self.state[p] != PointState::Empty {
            return false;
        }
        if self.is_suicide(p, player) {
            return false;
        }
        if p == self.ko_point && self.to_play == player {
            return false;
        }
        true
    }

    /// A move is suicide iff it has no empty neighbor, no friendly
    /// neighbor with >= 2 liberties, and no opponent neighbor with
    /// exactly 1 liberty. Mirrors `GoUctBoard::IsSuicide`.
    fn is_suicide(&self, p: Point, player: Color) -> bool {
        if self.nu_empty[p] > 0 {
            return false;
        }
        let opp = player.opponent();
        for n in neighbors4(p) {
            match self.state[n] {
                PointState::Stone(c) if c == player => {
                    if self.num_liberties(n) >= 2 {
                        return false;
                    }
                }
                PointState::Stone(c) if c == opp => {
                    if self.num_liberties(n) == 1 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        true
    }

    /// Fallible wrapper for callers outside the core that have not
    /// pre-filtered with `is_legal` (e.g. a GTP front-end). The core
    /// itself always calls `play` after checking `is_legal`.
    pub fn try_play(&mut self, p: Point, c: Color) -> Result<(), MoveError> {
        if p != 0 && !is_on_board(p) {
            return Err(MoveError::OffBoard);
        }
        if p != 0 {
            if self.state[p] != PointState::Empty {
                return Err(MoveError::Occupied);
            }
            if self.is_suicide(p, c) {
                return Err(MoveError::Suicide);
            }
            if p == self.ko_point && self.to_play == c {
                return Err(MoveError::KoViolation);
            }
        }
        self.play(p, c);
        Ok(())
    }

    /// The incremental `play` algorithm, distilled spec §4.1. Caller
    /// must have verified `is_legal(p, c)` (or `p` is a pass); violating
    /// that precondition is a programming error (§7 class 1) and will
    /// panic via the debug assertions below rather than returning an
    /// error.
    ///
    /// 1. Clear `koPoint`/`capturedStones`; pass swaps `toPlay` and returns.
    /// 2. Place the stone; update neighbor/empty counts of its 4-neighbors.
    /// 3. Remove `p` as a liberty from same-color neighbor blocks.
    /// 4. Kill opponent neighbor blocks left with zero liberties.
    /// 5. Integrate `p` into the block structure (new/append/merge).
    /// 6. Validate ko.
    /// 7. Update last-move chain and flip `toPlay`.
    pub fn play(&mut self, p: Point, c: Color) {
        self.ko_point = NULL_POINT;
        self.captured_stones.clear();

        if p == NULL_POINT {
            // PASS_MOVE == NULL_POINT == 0 by construction; distinguished
            // from "no point" by call-site context (step 1).
            let entered_as_to_play = c == self.to_play;
            self.to_play = c.opponent();
            if !entered_as_to_play {
                self.last_move = NULL_POINT;
                self.second_last_move = NULL_POINT;
            } else {
                self.second_last_move = self.last_move;
                self.last_move = NULL_POINT;
            }
            self.n_moves += 1;
            return;
        }

        debug_assert!(is_on_board(p), "play onto an off-board point");
        debug_assert_eq!(
            self.state[p],
            PointState::Empty,
            "play onto a non-empty point"
        );

        let opp = c.opponent();

        // Step 2: place stone, update counts. `p` was empty and is now
        // occupied, so every on-board neighbor `n` loses one empty
        // neighbor and gains one `c`-colored neighbor; border neighbors
        // are untouched (their counts are never read).
        self.state[p] = PointState::Stone(c);
        let mut empty_neighbors = Vec::with_capacity(4);
        for n in neighbors4(p) {
            if self.state[n] == PointState::Empty {
                empty_neighbors.push(n);
            }
            if self.state[n] != PointState::Border {
                self.nu_empty[n] -= 1;
                self.nu_neighbors[c.index()][n] += 1;
            }
        }

        // Step 3: remove p from same-color neighbor blocks' liberties.
        self.blocks.remove_liberty_from_neighbors(p);

        // Step 4: kill opponent neighbor blocks with zero liberties left.
        let opp_neighbor_slots = self.blocks.distinct_neighbor_blocks(p, opp);
        let mut total_captured = 0usize;
        let mut last_killed_single: Point = NULL_POINT;
        for slot in opp_neighbor_slots {
            if self.blocks.block(slot).num_liberties() == 0 {
                let stones = self.blocks.kill_block(slot);
                for &stone in &stones {
                    self.state[stone] = PointState::Empty;
                    // `stone` flips occupied -> empty: every on-board
                    // neighbor gains one empty neighbor and loses one
                    // `opp`-colored neighbor.
                    for n in neighbors4(stone) {
                        if self.state[n] != PointState::Border {
                            self.nu_empty[n] += 1;
                            self.nu_neighbors[opp.index()][n] -= 1;
                        }
                    }
                    self.blocks.add_liberty_to_neighbors(stone, c);
                    self.captured_stones.push(stone);
                }
                total_captured += stones.len();
                if stones.len() == 1 {
                    last_killed_single = stones[0];
                }
                self.prisoners[opp.index()] += stones.len() as u32;
            }
        }

        // Step 5: integrate p into block structure.
        let same_color_slots = self.blocks.distinct_neighbor_blocks(p, c);
        let new_block_anchor;
        match same_color_slots.len() {
            0 => {
                let slot = self.blocks.create_single_stone_block(p, c, &empty_neighbors);
                new_block_anchor = self.blocks.block(slot).anchor;
            }
            1 => {
                let slot = same_color_slots[0];
                let existing_libs = self.blocks.block(slot).liberties.clone();
                let new_libs: Vec<Point> = empty_neighbors
                    .iter()
                    .copied()
                    .filter(|n| !existing_libs.contains(n))
                    .collect();
                self.blocks.append_stone(slot, p, &new_libs);
                new_block_anchor = self.blocks.block(slot).anchor;
            }
            _ => {
                let survivor = *same_color_slots
                    .iter()
                    .max_by_key(|&&s| self.blocks.block(s).stones.len())
                    .unwrap();
                let others: Vec<Slot> = same_color_slots
                    .into_iter()
                    .filter(|&s| s != survivor)
                    .collect();
                self.blocks.merge_blocks(survivor, &others, p, &empty_neighbors);
                new_block_anchor = self.blocks.block(survivor).anchor;
            }
        }

        // Step 6: validate ko.
        if total_captured == 1 {
            let placed = self.blocks.block_at(p).unwrap();
            if placed.stones.len() == 1 && placed.num_liberties() == 1 {
                self.ko_point = last_killed_single;
            }
        }
        let _ = new_block_anchor;

        // Step 7: update move chain, flip to_play.
        if c == self.to_play {
            self.second_last_move = self.last_move;
            self.last_move = p;
        } else {
            self.last_move = NULL_POINT;
            self.second_last_move = NULL_POINT;
        }
        self.to_play = opp;
        self.n_moves += 1;

        debug_assert!(
            self.blocks.block_at(p).map(|b| b.num_liberties() > 0).unwrap_or(false),
            "suicide slipped past is_legal"
        );
    }
}

impl Default for PlayoutBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixtureBoard {
        size: usize,
        stones: std::collections::HashMap<Point, Color>,
        to_play: Color,
    }

    impl ReferenceBoard for FixtureBoard {
        fn size(&self) -> usize {
            self.size
        }
        fn points(&self) -> Vec<Point> {
            use crate::constants::{BOARD_IMAX, BOARD_IMIN};
            (BOARD_IMIN..BOARD_IMAX).filter(|&p| is_on_board(p)).collect()
        }
        fn get_color(&self, p: Point) -> PointState {
            match self.stones.get(&p) {
                Some(&c) => PointState::Stone(c),
                None => {
                    if is_on_board(p) {
                        PointState::Empty
                    } else {
                        PointState::Border
                    }
                }
            }
        }
        fn is_border(&self, p: Point) -> bool {
            !is_on_board(p)
        }
        fn is_empty(&self, p: Point) -> bool {
            is_on_board(p) && !self.stones.contains_key(&p)
        }
        fn anchor(&self, p: Point) -> Point {
            p
        }
        fn num_neighbors(&self, p: Point, c: Color) -> usize {
            neighbors4(p)
                .into_iter()
                .filter(|n| self.stones.get(n) == Some(&c))
                .count()
        }
        fn num_empty_neighbors(&self, p: Point) -> usize {
            neighbors4(p)
                .into_iter()
                .filter(|n| is_on_board(*n) && !self.stones.contains_key(n))
                .count()
        }
        fn block_stones(&self, anchor: Point) -> Vec<Point> {
            vec![anchor]
        }
        fn block_liberties(&self, anchor: Point) -> Vec<Point> {
            neighbors4(anchor)
                .into_iter()
                .filter(|n| is_on_board(*n) && !self.stones.contains_key(n))
                .collect()
        }
        fn num_prisoners(&self, _c: Color) -> u32 {
            0
        }
        fn ko_point(&self) -> Option<Point> {
            None
        }
        fn get_last_move(&self) -> Option<Point> {
            None
        }
        fn get_2nd_last_move(&self) -> Option<Point> {
            None
        }
        fn to_play(&self) -> Color {
            self.to_play
        }
    }

    fn empty_fixture() -> FixtureBoard {
        FixtureBoard {
            size: crate::constants::N,
            stones: Default::default(),
            to_play: Color::Black,
        }
    }

    #[test]
    fn single_stone_block_has_four_liberties_in_open_board() {
        let mut board = PlayoutBoard::new();
        board.init(&empty_fixture());
        let stride = crate::point::ROW_STRIDE;
        let p = crate::constants::BOARD_IMIN + stride * 3 + 3; // row 4, col 3: interior
        assert!(board.is_legal(p, Color::Black));
        board.play(p, Color::Black);
        assert_eq!(board.num_liberties(p), 4);
    }

    #[test]
    fn capturing_a_single_stone_sets_ko_point() {
        let mut board = PlayoutBoard::new();
        board.init(&empty_fixture());
        // Surround a lone white stone at `center` with black on 3 sides,
        // then play the capturing 4th side (distilled spec scenario S1's shape).
        let stride = crate::point::ROW_STRIDE as isize;
        let center = (crate::constants::BOARD_IMIN + crate::point::ROW_STRIDE * 4 + 4) as isize;
        let north = (center - stride) as usize;
        let south = (center + stride) as usize;
        let east = (center + 1) as usize;
        let west = (center - 1) as usize;
        let center = center as usize;

        board.play(north, Color::Black);
        board.play(center, Color::White);
        board.play(east, Color::Black);
        board.play(0, Color::White); // pass
        board.play(west, Color::Black);
        board.play(0, Color::White); // pass
        assert!(board.is_legal(south, Color::Black));
        board.play(south, Color::Black);

        assert_eq!(board.captured_stones(), &[center]);
        assert_eq!(board.ko_point(), Some(center));
        assert!(!board.is_legal(center, Color::White));
    }

    /// Distilled spec scenario S2: black stones at A1 and A3 (edge column,
    /// rows 1 and 3), A2 empty; playing A2 merges them into one block
    /// with liberties exactly {A4, B1, B2, B3}.
    #[test]
    fn merge_on_play_yields_single_block_with_expected_liberties() {
        let mut board = PlayoutBoard::new();
        board.init(&empty_fixture());
        let stride = crate::point::ROW_STRIDE;
        let col_a = crate::constants::BOARD_IMIN + 1; // row 1, col 1 ("A1")
        let a1 = col_a;
        let a2 = a1 + stride;
        let a3 = a1 + 2 * stride;
        let a4 = a1 + 3 * stride;
        let b1 = a1 + 1;
        let b2 = a2 + 1;
        let b3 = a3 + 1;

        board.play(a1, Color::Black);
        board.play(0, Color::White);
        board.play(a3, Color::Black);
        board.play(0, Color::White);
        board.play(a2, Color::Black);

        let anchor_a1 = board.block_anchor(a1).unwrap();
        let anchor_a3 = board.block_anchor(a3).unwrap();
        assert_eq!(anchor_a1, anchor_a3);
        let mut libs = board.liberties(a1).to_vec();
        libs.sort();
        let mut expected = vec![a4, b1, b2, b3];
        expected.sort();
        assert_eq!(libs, expected);
    }
}
