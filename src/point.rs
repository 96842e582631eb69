//! Point geometry (C1): a fixed integer coordinate space surrounded by a
//! one-point border ring, with branch-free cardinal/diagonal neighbor
//! lookups.
//!
//! Points are plain `usize` indices into a flat array of size
//! [`crate::constants::BOARDSIZE`]; no range checks are needed for any
//! non-border point's neighbors because the border ring absorbs them.

use crate::constants::{BOARDSIZE, BOARD_IMAX, BOARD_IMIN, DELTA, N, PASS_MOVE};

/// All genuine on-board points, in row-major order. Used by every module
/// that needs to iterate the board (prior knowledge, safety solver, root
/// filter) instead of re-deriving the `BOARD_IMIN..BOARD_IMAX` + `is_on_board`
/// filter at each call site.
pub fn all_board_points() -> impl Iterator<Item = Point> {
    (BOARD_IMIN..BOARD_IMAX).filter(|&p| is_on_board(p))
}

/// The board's actual row stride (one left-padding column + `N` playable
/// columns; the right edge wraps into the next row's left padding, which
/// is always `Border`). Note this is `N + 1`, distinct from the
/// constant [`crate::constants::W`] (`N + 2`), which only sizes the
/// trailing padding block and is not a row stride.
pub(crate) const ROW_STRIDE: usize = N + 1;

/// A point on the board, or the reserved [`PASS_MOVE`] value.
pub type Point = usize;

/// One of the two playing colors, or the absence of a stone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }
}

/// What occupies a point: a color, empty, or off-board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PointState {
    Stone(Color),
    Empty,
    Border,
}

/// Cardinal neighbor offsets: North, East, South, West.
#[inline]
pub fn cardinal_deltas() -> [isize; 4] {
    [DELTA[0], DELTA[1], DELTA[2], DELTA[3]]
}

/// Diagonal neighbor offsets: NE, SE, SW, NW.
#[inline]
pub fn diagonal_deltas() -> [isize; 4] {
    [DELTA[4], DELTA[5], DELTA[6], DELTA[7]]
}

/// The four cardinal neighbors of `p` (always in-array thanks to the border).
#[inline]
pub fn neighbors4(p: Point) -> [Point; 4] {
    let p = p as isize;
    [
        (p + DELTA[0]) as Point,
        (p + DELTA[1]) as Point,
        (p + DELTA[2]) as Point,
        (p + DELTA[3]) as Point,
    ]
}

/// The four diagonal neighbors of `p`.
#[inline]
pub fn diagonals4(p: Point) -> [Point; 4] {
    let p = p as isize;
    [
        (p + DELTA[4]) as Point,
        (p + DELTA[5]) as Point,
        (p + DELTA[6]) as Point,
        (p + DELTA[7]) as Point,
    ]
}

/// All 8 neighbors, cardinal first then diagonal (matches pattern-code order).
#[inline]
pub fn neighbors8(p: Point) -> [Point; 8] {
    let p = p as isize;
    let mut out = [0usize; 8];
    for (i, d) in DELTA.iter().enumerate() {
        out[i] = (p + d) as Point;
    }
    out
}

/// True iff `p` is a genuine on-board playing point (excludes the top/
/// bottom padding rows, the left-padding column of every row, and the
/// reserved pass/padding slot 0).
#[inline]
pub fn is_on_board(p: Point) -> bool {
    p >= BOARD_IMIN && p < BOARD_IMAX && p != PASS_MOVE && p % ROW_STRIDE != 0
}

/// Distance (in points) from the nearest edge: 1 means "first line".
/// Mirrors `GoBoard::Line`: whichever dimension (row or column) is
/// closer to its edge determines the line.
pub fn line(p: Point) -> usize {
    let (row_edge, col_edge) = edge_distances(p);
    row_edge.min(col_edge)
}

/// 1 exactly at the four corner points, larger everywhere else. Mirrors
/// `GoBoard::Pos`; used to filter corner points out of pattern matching
/// (a corner needs both dimensions simultaneously at distance 1).
pub fn pos(p: Point) -> usize {
    let (row_edge, col_edge) = edge_distances(p);
    row_edge.max(col_edge)
}

/// `(distance from nearest row edge, distance from nearest column edge)`,
/// both 1-based (a point on the first/last row or column has distance 1).
fn edge_distances(p: Point) -> (usize, usize) {
    let row = p / ROW_STRIDE;
    let col = p % ROW_STRIDE;
    let row_edge = row.min(N + 1 - row);
    let col_edge = col.min(N + 1 - col);
    (row_edge, col_edge)
}

/// `true` if `p` is inside the one-point border ring (off-board sentinel).
#[inline]
pub fn is_border(p: Point) -> bool {
    !is_on_board(p) && p != PASS_MOVE
}

/// Total addressable range, including the border ring and slot 0.
#[inline]
pub fn board_size() -> usize {
    BOARDSIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_are_branch_free_in_range() {
        for p in BOARD_IMIN..BOARD_IMAX {
            for n in neighbors4(p) {
                assert!(n < BOARDSIZE);
            }
        }
    }

    #[test]
    fn corner_has_pos_one() {
        let corner = BOARD_IMIN + 1; // row 1, col 1: the first on-board point
        assert!(is_on_board(corner));
        assert_eq!(pos(corner), 1);
        assert_eq!(line(corner), 1);
    }

    #[test]
    fn edge_non_corner_has_larger_pos() {
        let mid_top_row = BOARD_IMIN + N / 2;
        assert!(is_on_board(mid_top_row));
        assert_eq!(line(mid_top_row), 1);
        assert!(pos(mid_top_row) > 1);
    }

    #[test]
    fn opponent_is_involution() {
        assert_eq!(Color::Black.opponent().opponent(), Color::Black);
    }
}
