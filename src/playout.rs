//! Default playout policy and Monte-Carlo playout loop.
//!
//! The distilled spec explicitly puts "the random-playout policy as a
//! concrete set of heuristics" out of scope — only the
//! [`crate::prior::PlayoutPolicy`] contract the search requires is
//! specified. This module supplies *a* conforming implementation,
//! grounded in shape on the teacher's original `playout.rs` (capture
//! prioritization, 3x3 pattern bias, self-atari rejection probabilities)
//! but rebuilt against [`PlayoutBoard`] and using `fastrand` for
//! randomness instead of the teacher's hand-rolled LCG.

use crate::constants::{MAX_GAME_LEN, NULL_POINT, PROB_HEURISTIC_CAPTURE, PROB_HEURISTIC_PAT3, PROB_SSAREJECT};
use crate::patterns;
use crate::playout_board::PlayoutBoard;
use crate::point::{neighbors4, neighbors8, Color, Point, PointState};
use crate::prior::{MoveType, PlayoutPolicy};

/// A playout policy that prioritizes capturing moves, then 3x3 pattern
/// moves, then uniform-random non-self-atari moves, falling back to
/// filling the board with whatever is left when nothing better is
/// available. One instance is owned per worker (distilled spec §5: "Per
/// worker: ... one prior-knowledge engine, one random state").
pub struct DefaultPlayoutPolicy {
    rng: fastrand::Rng,
    last_move_type: MoveType,
    equivalent_best: Vec<Point>,
}

impl DefaultPlayoutPolicy {
    pub fn new(seed: u64) -> Self {
        DefaultPlayoutPolicy {
            rng: fastrand::Rng::with_seed(seed),
            last_move_type: MoveType::Other,
            equivalent_best: Vec::new(),
        }
    }

    /// Empty points adjacent to an opponent block currently at exactly
    /// one liberty: playing one finishes the capture.
    fn capture_candidates(&self, board: &PlayoutBoard) -> Vec<Point> {
        let opp = board.to_play().opponent();
        let mut out = Vec::new();
        for p in board.points() {
            if board.block_color(p) == Some(opp) && board.num_liberties(p) == 1 {
                let lib = board.the_liberty(p);
                if !out.contains(&lib) {
                    out.push(lib);
                }
            }
        }
        out
    }

    fn pattern_candidates(&self, board: &PlayoutBoard) -> Vec<Point> {
        let mut out = Vec::new();
        let Some(last) = board.get_last_move() else {
            return out;
        };
        for n in neighbors8(last) {
            if board.color(n) == PointState::Empty && patterns::match_any(board, n) {
                out.push(n);
            }
        }
        out
    }

    fn random_candidate(&mut self, board: &PlayoutBoard) -> Option<Point> {
        let to_play = board.to_play();
        let points: Vec<Point> = board.points().filter(|&p| board.color(p) == PointState::Empty).collect();
        if points.is_empty() {
            return None;
        }
        let mut start = self.rng.usize(0..points.len());
        for _ in 0..points.len() {
            let p = points[start];
            start = (start + 1) % points.len();
            if !board.is_legal(p, to_play) {
                continue;
            }
            if is_true_eye(board, p, to_play) {
                continue;
            }
            if is_self_atari(board, p, to_play) && self.rng.f64() < PROB_SSAREJECT {
                continue;
            }
            return Some(p);
        }
        None
    }

    fn fillboard_candidate(&mut self, board: &PlayoutBoard) -> Option<Point> {
        let to_play = board.to_play();
        let points: Vec<Point> = board
            .points()
            .filter(|&p| board.color(p) == PointState::Empty && board.is_legal(p, to_play))
            .collect();
        if points.is_empty() {
            return None;
        }
        Some(points[self.rng.usize(0..points.len())])
    }
}

/// A conservative "true eye" test for playout purposes: `p` is empty,
/// every 4-neighbor is `color`, and at most one diagonal (zero on the
/// edge) is neither off-board nor `color`. Declining to fill one's own
/// eyes is a playout-quality heuristic, not a legality rule — the
/// playout board itself has no concept of eyes.
fn is_true_eye(board: &PlayoutBoard, p: Point, color: Color) -> bool {
    for n in neighbors4(p) {
        if board.color(n) != PointState::Stone(color) {
            return false;
        }
    }
    let on_edge = crate::point::line(p) == 1;
    let mut bad_diagonals = 0;
    for d in crate::point::diagonals4(p) {
        match board.color(d) {
            PointState::Stone(c) if c == color => {}
            PointState::Border => {}
            _ => bad_diagonals += 1,
        }
    }
    if on_edge {
        bad_diagonals == 0
    } else {
        bad_diagonals <= 1
    }
}

/// Heuristic self-atari test used by the playout (looser than, and
/// distinct from, [`crate::prior`]'s classification): would playing `p`
/// leave the mover's own new block with exactly one liberty, without
/// capturing anything?
fn is_self_atari(board: &PlayoutBoard, p: Point, color: Color) -> bool {
    let opp = color.opponent();
    let captures_something = neighbors4(p)
        .into_iter()
        .any(|n| board.color(n) == PointState::Stone(opp) && board.num_liberties(n) == 1);
    if captures_something {
        return false;
    }
    let mut libs: Vec<Point> = Vec::new();
    for n in neighbors4(p) {
        match board.color(n) {
            PointState::Empty => {
                if !libs.contains(&n) {
                    libs.push(n);
                }
            }
            PointState::Stone(c) if c == color => {
                for &lib in board.liberties(n) {
                    if lib != p && !libs.contains(&lib) {
                        libs.push(lib);
                    }
                }
            }
            _ => {}
        }
    }
    libs.len() == 1
}

impl PlayoutPolicy for DefaultPlayoutPolicy {
    fn start_playout(&mut self, _board: &PlayoutBoard) {
        self.equivalent_best.clear();
        self.last_move_type = MoveType::Other;
    }

    fn generate_move(&mut self, board: &PlayoutBoard) -> Point {
        let captures = self.capture_candidates(board);
        if !captures.is_empty() && self.rng.f64() < PROB_HEURISTIC_CAPTURE {
            let mv = captures[self.rng.usize(0..captures.len())];
            self.equivalent_best = captures;
            self.last_move_type = MoveType::Capture;
            return mv;
        }

        let patterns = self.pattern_candidates(board);
        if !patterns.is_empty() && self.rng.f64() < PROB_HEURISTIC_PAT3 {
            let mv = patterns[self.rng.usize(0..patterns.len())];
            self.equivalent_best = patterns;
            self.last_move_type = MoveType::Pattern;
            return mv;
        }

        if let Some(mv) = self.random_candidate(board) {
            self.equivalent_best.clear();
            self.last_move_type = MoveType::Random;
            return mv;
        }

        if let Some(mv) = self.fillboard_candidate(board) {
            self.equivalent_best.clear();
            self.last_move_type = MoveType::FillBoard;
            return mv;
        }

        self.equivalent_best.clear();
        self.last_move_type = MoveType::FillBoard;
        NULL_POINT // pass
    }

    fn move_type(&self) -> MoveType {
        self.last_move_type
    }

    fn equivalent_best_moves(&self) -> &[Point] {
        &self.equivalent_best
    }

    fn end_playout(&mut self) {}
}

/// Plays `policy`'s moves on `board` until two consecutive passes or
/// [`MAX_GAME_LEN`] plies, then scores the result with simple area
/// counting (stones plus territory flood-filled from each empty region
/// bordering exactly one color). Returns the score from Black's
/// perspective: positive means Black ahead.
pub fn run_playout(board: &mut PlayoutBoard, policy: &mut dyn PlayoutPolicy, komi: f32) -> f32 {
    let mut consecutive_passes = 0;
    for _ in 0..MAX_GAME_LEN {
        if consecutive_passes >= 2 {
            break;
        }
        let to_play = board.to_play();
        policy.start_playout(board);
        let mv = policy.generate_move(board);
        policy.end_playout();
        if mv == NULL_POINT {
            consecutive_passes += 1;
        } else {
            consecutive_passes = 0;
        }
        board.play(mv, to_play);
    }
    score_area(board) - komi
}

/// Tromp-Taylor-style area score: `black_area - white_area`, where each
/// empty region flood-filled by 4-adjacency is credited to whichever
/// color exclusively borders it (neither, if both colors border it).
/// `komi` (White's compensation for playing second) is subtracted by the
/// caller, [`run_playout`], not here, so this function stays a pure area
/// count useful on its own in tests.
fn score_area(board: &PlayoutBoard) -> f32 {
    let mut visited = std::collections::HashSet::new();
    let mut black = 0i32;
    let mut white = 0i32;
    for p in board.points() {
        match board.color(p) {
            PointState::Stone(Color::Black) => black += 1,
            PointState::Stone(Color::White) => white += 1,
            PointState::Empty => {
                if visited.contains(&p) {
                    continue;
                }
                let (size, borders_black, borders_white) = flood_region(board, p, &mut visited);
                if borders_black && !borders_white {
                    black += size as i32;
                } else if borders_white && !borders_black {
                    white += size as i32;
                }
            }
            PointState::Border => {}
        }
    }
    (black - white) as f32
}

fn flood_region(
    board: &PlayoutBoard,
    start: Point,
    visited: &mut std::collections::HashSet<Point>,
) -> (usize, bool, bool) {
    let mut stack = vec![start];
    visited.insert(start);
    let mut size = 0;
    let mut borders_black = false;
    let mut borders_white = false;
    while let Some(p) = stack.pop() {
        size += 1;
        for n in neighbors4(p) {
            match board.color(n) {
                PointState::Stone(Color::Black) => borders_black = true,
                PointState::Stone(Color::White) => borders_white = true,
                PointState::Empty => {
                    if visited.insert(n) {
                        stack.push(n);
                    }
                }
                PointState::Border => {}
            }
        }
    }
    (size, borders_black, borders_white)
}
