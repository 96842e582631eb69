//! Root filter (C7): the set of legal root points that are not useful to
//! explore, derived from the safety/ladder oracle (C6).
//!
//! Grounded directly on `GoUctDefaultRootFilter.cpp`'s `Get()`: the same
//! three safe-territory conditions, applied only to currently-legal
//! points, plus the losing-ladder-defence liberties gated by
//! [`crate::config::SearchConfig::min_ladder_length`]. Ported condition
//! for condition — do not weaken or strengthen it (distilled spec §9
//! Open Questions).

use crate::config::SearchConfig;
use crate::playout_board::PlayoutBoard;
use crate::point::{all_board_points, Point};
use crate::safety::{alternate_safe, read_ladder, unconditional_safe};

/// Computes the root filter: legal points at the root that should not be
/// explored further. Recomputed only "whenever the reference board
/// changes genuinely" (distilled spec §6) — callers run this once per
/// genuine move, not per simulation.
pub fn compute_root_filter(board: &PlayoutBoard, config: &SearchConfig) -> Vec<Point> {
    let to_play = board.to_play();
    let opp = to_play.opponent();

    let alternate = alternate_safe(board);
    let is_all_alternate_safe = all_board_points().all(|p| {
        alternate.black.contains(&p) || alternate.white.contains(&p)
    });
    let unconditional = unconditional_safe(board);

    let mut filter = Vec::new();
    for p in all_board_points() {
        if !board.is_legal(p, to_play) {
            continue;
        }
        let is_unconditional_safe_own = unconditional.for_color(to_play).contains(&p);
        let is_unconditional_safe_opp = unconditional.for_color(opp).contains(&p);
        let is_alternate_safe_opp = alternate.for_color(opp).contains(&p);
        let has_opp_neighbors = crate::point::neighbors4(p)
            .into_iter()
            .any(|n| board.color(n) == crate::point::PointState::Stone(opp));

        if (is_all_alternate_safe && is_alternate_safe_opp)
            || is_unconditional_safe_opp
            || (is_unconditional_safe_own && !has_opp_neighbors)
        {
            filter.push(p);
        }
    }

    if config.check_ladders {
        for p in all_board_points() {
            if board.block_color(p) != Some(to_play) || !board.in_atari(p) {
                continue;
            }
            let anchor = board.block_anchor(p).unwrap();
            if anchor != p {
                continue; // visit each block once, at its anchor
            }
            let result = read_ladder(board, anchor, to_play, false);
            if result.eval < 0 && result.sequence.len() >= config.min_ladder_length {
                let liberty = board.the_liberty(anchor);
                if !filter.contains(&liberty) {
                    filter.push(liberty);
                }
            }
        }
    }

    let legal_count = all_board_points().filter(|&p| board.is_legal(p, to_play)).count();
    if legal_count > 0 && filter.len() >= legal_count {
        tracing::warn!(removed = filter.len(), legal = legal_count, "root filter removed every legal move");
    }

    filter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{Color, PointState};
    use crate::reference_board::ReferenceBoard;

    struct EmptyBoard;
    impl ReferenceBoard for EmptyBoard {
        fn size(&self) -> usize {
            crate::constants::N
        }
        fn points(&self) -> Vec<Point> {
            all_board_points().collect()
        }
        fn get_color(&self, p: Point) -> PointState {
            if crate::point::is_on_board(p) {
                PointState::Empty
            } else {
                PointState::Border
            }
        }
        fn is_border(&self, p: Point) -> bool {
            !crate::point::is_on_board(p)
        }
        fn is_empty(&self, p: Point) -> bool {
            crate::point::is_on_board(p)
        }
        fn anchor(&self, p: Point) -> Point {
            p
        }
        fn num_neighbors(&self, _p: Point, _c: Color) -> usize {
            0
        }
        fn num_empty_neighbors(&self, p: Point) -> usize {
            crate::point::neighbors4(p).into_iter().filter(|&n| crate::point::is_on_board(n)).count()
        }
        fn block_stones(&self, anchor: Point) -> Vec<Point> {
            vec![anchor]
        }
        fn block_liberties(&self, _anchor: Point) -> Vec<Point> {
            Vec::new()
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
            Color::Black
        }
    }

    /// `(row, col)`, both 1-based, to a [`Point`] — mirrors the layout
    /// `point::line`/`point::pos` decode from the other direction.
    fn pt(row: usize, col: usize) -> Point {
        row * crate::point::ROW_STRIDE + col
    }

    /// Columns 1-5 solid Black minus two single-point eyes at (3,3) and
    /// (7,3); columns 6-9 solid White minus two single-point eyes at
    /// (3,8)/(7,8) plus a three-cell open strip at row 5, columns 7-9 —
    /// genuinely Benson-alive territory on both sides with every point on
    /// the board accounted for by one color or the other.
    struct SettledEndgameBoard;
    impl ReferenceBoard for SettledEndgameBoard {
        fn size(&self) -> usize {
            crate::constants::N
        }
        fn points(&self) -> Vec<Point> {
            all_board_points().collect()
        }
        fn get_color(&self, p: Point) -> PointState {
            if !crate::point::is_on_board(p) {
                return PointState::Border;
            }
            let row = p / crate::point::ROW_STRIDE;
            let col = p % crate::point::ROW_STRIDE;
            if col <= 5 {
                if (row, col) == (3, 3) || (row, col) == (7, 3) {
                    PointState::Empty
                } else {
                    PointState::Stone(Color::Black)
                }
            } else if (row, col) == (3, 8) || (row, col) == (7, 8) || (row == 5 && (7..=9).contains(&col)) {
                PointState::Empty
            } else {
                PointState::Stone(Color::White)
            }
        }
        fn is_border(&self, p: Point) -> bool {
            !crate::point::is_on_board(p)
        }
        fn is_empty(&self, p: Point) -> bool {
            matches!(self.get_color(p), PointState::Empty)
        }
        fn anchor(&self, p: Point) -> Point {
            p
        }
        fn num_neighbors(&self, _p: Point, _c: Color) -> usize {
            0
        }
        fn num_empty_neighbors(&self, _p: Point) -> usize {
            0
        }
        fn block_stones(&self, anchor: Point) -> Vec<Point> {
            vec![anchor]
        }
        fn block_liberties(&self, _anchor: Point) -> Vec<Point> {
            Vec::new()
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
            Color::Black
        }
    }

    /// Distilled spec scenario S5: a fully settled position where every
    /// point belongs to one side's `alternateSafe` set. A three-cell open
    /// strip T sitting inside White's otherwise solid territory is legal
    /// for Black to invade (it still has a liberty from its own
    /// unplayed neighbors) but is dead ground — every legal point of T
    /// is in the root filter.
    #[test]
    fn s5_dead_opponent_territory_is_filtered() {
        let mut board = PlayoutBoard::new();
        board.init(&SettledEndgameBoard);
        let config = SearchConfig::default();
        let filter = compute_root_filter(&board, &config);

        let strip = [pt(5, 7), pt(5, 8), pt(5, 9)];
        for &p in &strip {
            assert!(board.is_legal(p, Color::Black), "strip point should be a legal invasion");
            assert!(filter.contains(&p), "legal dead-territory point should be filtered");
        }

        // White's two true eyes are suicide for Black and never reach the
        // legality gate at all.
        for eye in [pt(3, 8), pt(7, 8)] {
            assert!(!board.is_legal(eye, Color::Black));
        }
    }

    #[test]
    fn empty_board_filters_nothing() {
        let mut board = PlayoutBoard::new();
        board.init(&EmptyBoard);
        let config = SearchConfig::default();
        let filter = compute_root_filter(&board, &config);
        assert!(filter.is_empty());
    }

    /// A losing ladder defence liberty with a ladder read length below
    /// `min_ladder_length` is not added to the filter.
    #[test]
    fn short_ladder_sequences_below_threshold_are_not_filtered() {
        let mut board = PlayoutBoard::new();
        board.init(&EmptyBoard);
        let stride = crate::point::ROW_STRIDE;
        let corner = crate::constants::BOARD_IMIN + 1;
        board.play(corner + stride, Color::Black);
        board.play(corner, Color::White);
        board.play(0, Color::Black); // pass: white (the cornered stone's own color) is now to move
        let mut config = SearchConfig::default();
        config.min_ladder_length = usize::MAX; // make the gate impossible to satisfy
        let filter = compute_root_filter(&board, &config);
        let escape = board.the_liberty(corner);
        assert!(!filter.contains(&escape));
    }
}
