//! Prior knowledge (C5): per-position move biases derived from the
//! playout board, the pattern matcher, and a pluggable playout policy.
//!
//! Grounded directly on `GoUctDefaultPriorKnowledge.cpp`'s
//! `ProcessPosition` — the bias table in [`compute_priors`] reproduces
//! its three branches (`isFullBoardRandom && !anyHeuristic`,
//! `isFullBoardRandom && anyHeuristic`, otherwise) and literal weights
//! verbatim, per distilled spec §4.3 ("the exact weights matter for
//! reproducibility"). `SetsAtari` is a direct port of the same-named
//! free function in the same file.

use crate::patterns;
use crate::playout_board::PlayoutBoard;
use crate::point::{neighbors4, Color, Point, PointState};

/// The kind of move a playout policy produced, per distilled spec §4.3's
/// `MoveType ∈ {random, fillboard, ...}`. `FullBoardRandom` is true
/// exactly when the move type is [`MoveType::Random`] or
/// [`MoveType::FillBoard`] — the two "no particular heuristic fired"
/// playout fallbacks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveType {
    Random,
    FillBoard,
    Pattern,
    Capture,
    Atari,
    Other,
}

impl MoveType {
    fn is_full_board_random(self) -> bool {
        matches!(self, MoveType::Random | MoveType::FillBoard)
    }
}

/// The capability interface the search consumes from "a playout policy"
/// (distilled spec §4.3's Design Notes: replace the original's
/// polymorphic `GoUctPlayoutPolicy` inheritance with a plain trait the
/// search doesn't downcast). The concrete heuristic playout in
/// [`crate::playout`] implements this; it is not normative (distilled
/// spec §1: "the random-playout policy as a concrete set of heuristics"
/// is out of scope — only this contract is).
pub trait PlayoutPolicy {
    /// Called once before `generate_move` — lets the policy reset any
    /// per-playout state.
    fn start_playout(&mut self, board: &PlayoutBoard);

    /// Picks one move for the current position and records its
    /// classification, retrievable via `move_type`.
    fn generate_move(&mut self, board: &PlayoutBoard) -> Point;

    fn move_type(&self) -> MoveType;

    /// Moves the policy judged equally good as the one it picked
    /// (possibly empty).
    fn equivalent_best_moves(&self) -> &[Point];

    fn end_playout(&mut self);
}

/// One move's seed for a freshly created child node: `(value in [0,1],
/// pseudocount, type code in 0..10)`, per distilled spec §4.3's output
/// triple.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PriorBias {
    pub value: f32,
    pub count: usize,
    pub move_type: u8,
}

impl PriorBias {
    const fn new(value: f32, count: usize, move_type: u8) -> Self {
        PriorBias { value, count, move_type }
    }
}

/// `GoUctDefaultPriorKnowledge::ProcessPosition`: runs the playout
/// policy once, classifies its move, scans the board for pattern
/// matches and atari-setting moves, then assigns a [`PriorBias`] to
/// every empty point and to `PASS`.
///
/// Returns `(pass_bias, point_biases)` where `point_biases[p]` is
/// `Some(..)` only for empty on-board points (everything else —
/// occupied points, border — carries no prior).
pub fn compute_priors(
    board: &PlayoutBoard,
    policy: &mut dyn PlayoutPolicy,
) -> (PriorBias, Vec<Option<PriorBias>>) {
    policy.start_playout(board);
    policy.generate_move(board);
    let move_type = policy.move_type();
    let is_full_board_random = move_type.is_full_board_random();

    let mut pattern_match = Vec::new();
    let mut sets_atari = Vec::new();
    let mut any_heuristic = false;
    for p in board.points() {
        if board.color(p) != PointState::Empty {
            continue;
        }
        if patterns::match_any(board, p) {
            pattern_match.push(p);
            any_heuristic = true;
        }
        if sets_atari_at(board, p) {
            sets_atari.push(p);
            any_heuristic = true;
        }
    }

    let pass_bias = PriorBias::new(0.1, 9, 1);
    let mut biases = vec![None; crate::constants::BOARDSIZE];

    for p in board.points() {
        if board.color(p) != PointState::Empty {
            continue;
        }
        let bias = if is_self_atari_or_suicide(board, p) {
            PriorBias::new(0.1, 9, 2)
        } else if is_full_board_random && !any_heuristic {
            PriorBias::new(0.5, 0, 0)
        } else if is_full_board_random {
            if sets_atari.contains(&p) {
                PriorBias::new(1.0, 3, 3)
            } else if pattern_match.contains(&p) {
                PriorBias::new(0.9, 3, 4)
            } else {
                PriorBias::new(0.5, 3, 5)
            }
        } else if sets_atari.contains(&p) {
            PriorBias::new(0.8, 9, 6)
        } else if pattern_match.contains(&p) {
            PriorBias::new(0.6, 9, 7)
        } else {
            PriorBias::new(0.4, 9, 8)
        };
        biases[p] = Some(bias);
    }

    if !is_full_board_random {
        for &p in policy.equivalent_best_moves() {
            biases[p] = Some(PriorBias::new(1.0, 9, 9));
        }
    }

    policy.end_playout();
    (pass_bias, biases)
}

/// `SetsAtari` (`GoUctDefaultPriorKnowledge.cpp`, free function): true
/// iff playing the (empty) point `p` would reduce some adjacent
/// opponent block from 2 liberties to 1.
fn sets_atari_at(board: &PlayoutBoard, p: Point) -> bool {
    let opp = board.to_play().opponent();
    for n in neighbors4(p) {
        if board.color(n) == PointState::Stone(opp) && board.num_liberties(n) == 2 {
            return true;
        }
    }
    false
}

/// `GoBoardUtil::SelfAtari(bd, p) || bd.IsSuicide(p)`: a move is
/// rejected-as-heuristic iff it is suicide, or it would leave the
/// just-played stone's own block in atari (self-atari) while capturing
/// nothing. `is_legal` already excludes true suicide for the side to
/// move, so we only need the self-atari half here plus an explicit
/// suicide fallback for robustness against callers that bypass
/// `is_legal`.
fn is_self_atari_or_suicide(board: &PlayoutBoard, p: Point) -> bool {
    let to_play = board.to_play();
    if !board.is_legal(p, to_play) {
        return true;
    }
    // A friendly block would end up in atari iff every same-color
    // neighbor block currently has exactly one liberty other than `p`
    // itself, no opponent neighbor block is captured (liberties > 1 or
    // capture frees space), and there's no second empty neighbor.
    let would_capture = neighbors4(p).into_iter().any(|n| {
        board.color(n) == PointState::Stone(to_play.opponent()) && board.num_liberties(n) == 1
    });
    if would_capture {
        return false;
    }
    let mut combined_libs: Vec<Point> = Vec::new();
    for n in neighbors4(p) {
        match board.color(n) {
            PointState::Empty => {
                if !combined_libs.contains(&n) {
                    combined_libs.push(n);
                }
            }
            PointState::Stone(c) if c == to_play => {
                for &lib in board.liberties(n) {
                    if lib != p && !combined_libs.contains(&lib) {
                        combined_libs.push(lib);
                    }
                }
            }
            _ => {}
        }
    }
    combined_libs.len() <= 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_board::ReferenceBoard;

    struct EmptyBoard9;
    impl ReferenceBoard for EmptyBoard9 {
        fn size(&self) -> usize {
            crate::constants::N
        }
        fn points(&self) -> Vec<Point> {
            crate::point::all_board_points().collect()
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
            neighbors4(p).into_iter().filter(|&n| crate::point::is_on_board(n)).count()
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

    struct StubRandomPolicy {
        mv: Point,
        equiv_best: Vec<Point>,
    }

    impl PlayoutPolicy for StubRandomPolicy {
        fn start_playout(&mut self, _board: &PlayoutBoard) {}
        fn generate_move(&mut self, _board: &PlayoutBoard) -> Point {
            self.mv
        }
        fn move_type(&self) -> MoveType {
            MoveType::Random
        }
        fn equivalent_best_moves(&self) -> &[Point] {
            &self.equiv_best
        }
        fn end_playout(&mut self) {}
    }

    /// Distilled spec scenario S3: empty board, random policy, no
    /// heuristic anywhere -> PASS is (0.1, 9, 1), every empty point is
    /// (0.5, 0, 0).
    #[test]
    fn s3_random_policy_no_heuristic_on_empty_board() {
        let mut board = PlayoutBoard::new();
        board.init(&EmptyBoard9);
        let mut policy = StubRandomPolicy {
            mv: 0,
            equiv_best: Vec::new(),
        };
        let (pass_bias, biases) = compute_priors(&board, &mut policy);
        assert_eq!(pass_bias, PriorBias::new(0.1, 9, 1));
        let some_point = crate::point::all_board_points().next().unwrap();
        assert_eq!(biases[some_point], Some(PriorBias::new(0.5, 0, 0)));
    }

    /// A single White stone in the corner, with exactly its two on-board
    /// liberties empty, so that `play`ing either one sets it in atari.
    struct OneCorneredStone;
    impl ReferenceBoard for OneCorneredStone {
        fn size(&self) -> usize {
            crate::constants::N
        }
        fn points(&self) -> Vec<Point> {
            crate::point::all_board_points().collect()
        }
        fn get_color(&self, p: Point) -> PointState {
            let stride = crate::point::ROW_STRIDE;
            if p == stride + 1 {
                PointState::Stone(Color::White)
            } else if crate::point::is_on_board(p) {
                PointState::Empty
            } else {
                PointState::Border
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
        fn num_empty_neighbors(&self, p: Point) -> usize {
            neighbors4(p).into_iter().filter(|&n| crate::point::is_on_board(n)).count()
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

    /// Distilled spec scenario S4: same board shape as S3, but one empty
    /// point X is an atari-setter (a random-policy playout with a
    /// heuristic present): X -> (1.0, 3, 3), PASS stays (0.1, 9, 1),
    /// unrelated empty points -> (0.5, 3, 5).
    #[test]
    fn s4_random_policy_with_atari_setting_heuristic() {
        let mut board = PlayoutBoard::new();
        board.init(&OneCorneredStone);
        let mut policy = StubRandomPolicy {
            mv: 0,
            equiv_best: Vec::new(),
        };
        let (pass_bias, biases) = compute_priors(&board, &mut policy);
        assert_eq!(pass_bias, PriorBias::new(0.1, 9, 1));

        let stride = crate::point::ROW_STRIDE;
        let corner_stone = stride + 1;
        let atari_setter = corner_stone + 1; // its east liberty
        assert!(sets_atari_at(&board, atari_setter));
        assert_eq!(biases[atari_setter], Some(PriorBias::new(1.0, 3, 3)));

        let ordinary = stride * (crate::constants::N / 2) + crate::constants::N / 2;
        assert!(!sets_atari_at(&board, ordinary));
        assert_eq!(biases[ordinary], Some(PriorBias::new(0.5, 3, 5)));
    }
}
