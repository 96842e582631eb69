//! Cross-module integration scenarios (S1-S6), exercised end to end
//! against the crate's public API rather than any module's internals.

use michi_rust::config::SearchConfig;
use michi_rust::playout_board::PlayoutBoard;
use michi_rust::point::{all_board_points, Color, Point, PointState};
use michi_rust::prior::{compute_priors, MoveType, PlayoutPolicy, PriorBias};
use michi_rust::reference_board::ReferenceBoard;
use michi_rust::root_filter::compute_root_filter;
use michi_rust::uct::Tree;

struct EmptyBoard;

impl ReferenceBoard for EmptyBoard {
    fn size(&self) -> usize {
        michi_rust::constants::N
    }
    fn points(&self) -> Vec<Point> {
        all_board_points().collect()
    }
    fn get_color(&self, p: Point) -> PointState {
        if michi_rust::point::is_on_board(p) {
            PointState::Empty
        } else {
            PointState::Border
        }
    }
    fn is_border(&self, p: Point) -> bool {
        !michi_rust::point::is_on_board(p)
    }
    fn is_empty(&self, p: Point) -> bool {
        michi_rust::point::is_on_board(p)
    }
    fn anchor(&self, p: Point) -> Point {
        p
    }
    fn num_neighbors(&self, _p: Point, _c: Color) -> usize {
        0
    }
    fn num_empty_neighbors(&self, p: Point) -> usize {
        michi_rust::point::neighbors4(p)
            .into_iter()
            .filter(|&n| michi_rust::point::is_on_board(n))
            .count()
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

fn empty_board() -> PlayoutBoard {
    let mut board = PlayoutBoard::new();
    board.init(&EmptyBoard);
    board
}

/// S1: capturing a lone stone sets the ko point and forbids immediate
/// recapture by the side that was just captured.
#[test]
fn s1_capture_sets_ko_and_forbids_immediate_recapture() {
    let mut board = empty_board();
    let stride = michi_rust::point::ROW_STRIDE as isize;
    let center = (michi_rust::constants::BOARD_IMIN + michi_rust::point::ROW_STRIDE * 4 + 4) as isize;
    let north = (center - stride) as usize;
    let south = (center + stride) as usize;
    let east = (center + 1) as usize;
    let west = (center - 1) as usize;
    let center = center as usize;

    board.play(north, Color::Black);
    board.play(center, Color::White);
    board.play(east, Color::Black);
    board.play(0, Color::White);
    board.play(west, Color::Black);
    board.play(0, Color::White);
    board.play(south, Color::Black);

    assert_eq!(board.captured_stones(), &[center]);
    assert_eq!(board.ko_point(), Some(center));
    assert!(!board.is_legal(center, Color::White));

    board.play(0, Color::Black); // black passes elsewhere
    board.play(0, Color::White);
    assert!(board.is_legal(center, Color::White));
}

/// S2: playing the gap between two same-color stones on an edge merges
/// them into a single block with the union of their outer liberties.
#[test]
fn s2_merge_on_play_yields_expected_liberties() {
    let mut board = empty_board();
    let stride = michi_rust::point::ROW_STRIDE;
    let a1 = michi_rust::constants::BOARD_IMIN + 1;
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

    let mut libs = board.liberties(a1).to_vec();
    libs.sort();
    let mut expected = vec![a4, b1, b2, b3];
    expected.sort();
    assert_eq!(libs, expected);
    assert_eq!(board.block_anchor(a1), board.block_anchor(a3));
}

struct StubRandomPolicy {
    mv: Point,
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
        &[]
    }
    fn end_playout(&mut self) {}
}

/// S3: on an empty board with a random policy and no heuristic anywhere,
/// every empty point carries the flat no-heuristic prior.
#[test]
fn s3_random_policy_no_heuristic_on_empty_board() {
    let board = empty_board();
    let mut policy = StubRandomPolicy { mv: 0 };
    let (pass_bias, biases) = compute_priors(&board, &mut policy);

    assert_eq!(pass_bias, PriorBias { value: 0.1, count: 9, move_type: 1 });
    let some_point = all_board_points().next().unwrap();
    assert_eq!(biases[some_point], Some(PriorBias { value: 0.5, count: 0, move_type: 0 }));
}

struct OneCorneredStone;

impl ReferenceBoard for OneCorneredStone {
    fn size(&self) -> usize {
        michi_rust::constants::N
    }
    fn points(&self) -> Vec<Point> {
        all_board_points().collect()
    }
    fn get_color(&self, p: Point) -> PointState {
        let stride = michi_rust::point::ROW_STRIDE;
        if p == stride + 1 {
            PointState::Stone(Color::White)
        } else if michi_rust::point::is_on_board(p) {
            PointState::Empty
        } else {
            PointState::Border
        }
    }
    fn is_border(&self, p: Point) -> bool {
        !michi_rust::point::is_on_board(p)
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
        michi_rust::point::neighbors4(p)
            .into_iter()
            .filter(|&n| michi_rust::point::is_on_board(n))
            .count()
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

/// S4: same setup, but one empty point is an atari-setter; it gets the
/// atari-setting bias while ordinary empty points fall back to the
/// full-board-random-with-heuristic-present weight.
#[test]
fn s4_random_policy_with_atari_setting_heuristic() {
    let mut board = PlayoutBoard::new();
    board.init(&OneCorneredStone);
    let mut policy = StubRandomPolicy { mv: 0 };
    let (pass_bias, biases) = compute_priors(&board, &mut policy);
    assert_eq!(pass_bias, PriorBias::new(0.1, 9, 1));

    let stride = michi_rust::point::ROW_STRIDE;
    let corner_stone = stride + 1;
    let atari_setter = corner_stone + 1;
    assert_eq!(biases[atari_setter], Some(PriorBias::new(1.0, 3, 3)));

    let ordinary = stride * (michi_rust::constants::N / 2) + michi_rust::constants::N / 2;
    assert_eq!(biases[ordinary], Some(PriorBias::new(0.5, 3, 5)));
}

struct SettledEndgameBoard;

impl ReferenceBoard for SettledEndgameBoard {
    fn size(&self) -> usize {
        michi_rust::constants::N
    }
    fn points(&self) -> Vec<Point> {
        all_board_points().collect()
    }
    fn get_color(&self, p: Point) -> PointState {
        if !michi_rust::point::is_on_board(p) {
            return PointState::Border;
        }
        let row = p / michi_rust::point::ROW_STRIDE;
        let col = p % michi_rust::point::ROW_STRIDE;
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
        !michi_rust::point::is_on_board(p)
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

fn pt(row: usize, col: usize) -> Point {
    row * michi_rust::point::ROW_STRIDE + col
}

/// S5: a fully settled position where an open strip sitting inside one
/// side's otherwise solid territory is legal to invade but dead ground,
/// so every legal point of the strip ends up in the root filter.
#[test]
fn s5_dead_opponent_territory_is_filtered() {
    let mut board = PlayoutBoard::new();
    board.init(&SettledEndgameBoard);
    let config = SearchConfig::default();
    let filter = compute_root_filter(&board, &config);

    for p in [pt(5, 7), pt(5, 8), pt(5, 9)] {
        assert!(board.is_legal(p, Color::Black));
        assert!(filter.contains(&p));
    }
    for eye in [pt(3, 8), pt(7, 8)] {
        assert!(!board.is_legal(eye, Color::Black));
    }
}

/// S6: two workers racing to expand the same node leave exactly one
/// worker's children reachable, never a partially-initialized range.
#[test]
fn s6_racing_workers_leave_one_fully_initialized_expansion_reachable() {
    let tree = Tree::new(2, 16);
    let moves = [(1usize, 0.5f32, 0usize), (2, 0.5, 0)];
    let a = tree.create_children(0, tree.root_handle(), &moves);
    let b = tree.create_children(1, tree.root_handle(), &moves);

    assert!(a || b);
    assert!(!(a && b));

    let kids: Vec<_> = tree.children(tree.root_handle()).collect();
    assert_eq!(kids.len(), 2);
    let mut seen_moves: Vec<_> = kids.iter().map(|&h| tree.node(h).mv()).collect();
    seen_moves.sort();
    assert_eq!(seen_moves, vec![1, 2]);
}
