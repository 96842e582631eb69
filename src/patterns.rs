//! Pattern matcher (C4): 3x3 center and 2x3 edge heuristic pattern
//! matching via precomputed lookup tables.
//!
//! Grounded directly on `GoUctPatterns.cpp`'s `MatchHane`/`MatchCut`/
//! `MatchEdge`/`MatchAnyPattern` — the boolean expressions here are a
//! direct port, evaluated once per code during table construction rather
//! than at match time (the original builds its table the same way, by
//! synthesizing a board for every code and calling `MatchAnyPattern`).
//!
//! Two independent lookup tables are built once (behind a [`OnceLock`])
//! and indexed at match time:
//! - `CENTER_TABLE`: `3^8` codes (8 neighbors: N, E, S, W, NE, SE, SW, NW,
//!   matching [`crate::point::neighbors8`]'s order) x 2 to-play colors.
//! - `EDGE_TABLE`: `3^5` codes (the 5-point 2x3 neighborhood below a
//!   first-line point, in a canonical "up = south, side = east"
//!   orientation) x 2 to-play colors.

use std::sync::OnceLock;

use crate::playout_board::PlayoutBoard;
use crate::point::{neighbors4, neighbors8, pos, Color, Point, PointState};

const POWER3_8: usize = 6561; // 3^8
const POWER3_5: usize = 243; // 3^5

fn trit(c: Option<Color>) -> usize {
    match c {
        None => 0,
        Some(Color::Black) => 1,
        Some(Color::White) => 2,
    }
}

fn untrit(mut code: usize, n: usize) -> Vec<Option<Color>> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(match code % 3 {
            0 => None,
            1 => Some(Color::Black),
            _ => Some(Color::White),
        });
        code /= 3;
    }
    out
}

/// The 8-neighbor colors around an empty center, in N/E/S/W/NE/SE/SW/NW order.
struct CenterNeighborhood {
    n: Option<Color>,
    e: Option<Color>,
    s: Option<Color>,
    w: Option<Color>,
    ne: Option<Color>,
    se: Option<Color>,
    sw: Option<Color>,
    nw: Option<Color>,
}

impl CenterNeighborhood {
    fn from_code(code: usize) -> Self {
        let d = untrit(code, 8);
        CenterNeighborhood {
            n: d[0],
            e: d[1],
            s: d[2],
            w: d[3],
            ne: d[4],
            se: d[5],
            sw: d[6],
            nw: d[7],
        }
    }

    fn count(&self, c: Color) -> usize {
        [self.n, self.e, self.s, self.w].iter().filter(|&&x| x == Some(c)).count()
    }

    fn count_empty(&self) -> usize {
        [self.n, self.e, self.s, self.w].iter().filter(|&&x| x.is_none()).count()
    }

    fn count_diag(&self, c: Color) -> usize {
        [self.ne, self.se, self.sw, self.nw].iter().filter(|&&x| x == Some(c)).count()
    }
}

/// The 5 neighbors below/beside a first-line point, canonical orientation
/// ("up" = into the board, "side" = the fixed perpendicular axis).
/// Mirrors the 5-slot decoding order of `GoUctPatterns.cpp`'s
/// `EdgeDirection`: `+side, +up+side, +up, +up-side, -side`.
struct EdgeNeighborhood {
    plus_side: Option<Color>,
    plus_up_plus_side: Option<Color>,
    up: Option<Color>,
    plus_up_minus_side: Option<Color>,
    minus_side: Option<Color>,
}

impl EdgeNeighborhood {
    fn from_code(code: usize) -> Self {
        let d = untrit(code, 5);
        EdgeNeighborhood {
            plus_side: d[0],
            plus_up_plus_side: d[1],
            up: d[2],
            plus_up_minus_side: d[3],
            minus_side: d[4],
        }
    }

    fn count(&self, c: Color) -> usize {
        [self.plus_side, self.up, self.minus_side].iter().filter(|&&x| x == Some(c)).count()
    }

    fn count_empty(&self) -> usize {
        [self.plus_side, self.up, self.minus_side].iter().filter(|&&x| x.is_none()).count()
    }
}

fn opp(c: Color) -> Color {
    c.opponent()
}

/// Port of `CheckCut1`: `perp` is the neighbor along the orthogonal axis,
/// `diag` is the diagonal combining the two axes.
fn check_cut1(perp: Option<Color>, diag: Option<Color>, c: Color) -> bool {
    perp == Some(c) && diag == Some(opp(c))
}

/// Port of `CheckCut2` for a single orientation. `same_far` is `p - cDir`
/// (must equal `c`); `other_plus`/`other_minus` are `p +- otherDir`;
/// `far1..far4` are the diagonals that must NOT be color `c` for their
/// branch to trigger.
fn check_cut2(
    same_far: Option<Color>,
    other_plus: Option<Color>,
    far1: Option<Color>,
    far2: Option<Color>,
    other_minus: Option<Color>,
    far3: Option<Color>,
    far4: Option<Color>,
    c: Color,
) -> bool {
    if same_far != Some(c) {
        return false;
    }
    let branch_a = other_plus == Some(opp(c)) && far1 != Some(c) && far2 != Some(c);
    let branch_b = other_minus == Some(opp(c)) && far3 != Some(c) && far4 != Some(c);
    branch_a || branch_b
}

/// Port of `CheckHane1`: `c_dir` is the same-color neighbor along the
/// probed axis, `plus`/`minus` are the two opponent-colored diagonal
/// checks, `gap_plus`/`gap_minus` must be empty.
fn check_hane1(
    c_dir: Option<Color>,
    plus: Option<Color>,
    minus: Option<Color>,
    gap_plus: Option<Color>,
    gap_minus: Option<Color>,
    c: Color,
) -> bool {
    c_dir == Some(c) && plus == Some(opp(c)) && minus == Some(opp(c)) && gap_plus.is_none() && gap_minus.is_none()
}

fn match_cut(nb: &CenterNeighborhood) -> bool {
    let nu_empty = nb.count_empty();

    if let Some(c1) = nb.n {
        let cnt = nb.count(c1);
        if cnt >= 2 && !(cnt == 3 && nu_empty == 1) && (check_cut1(nb.e, nb.ne, c1) || check_cut1(nb.w, nb.nw, c1)) {
            return true;
        }
    }
    if let Some(c2) = nb.s {
        let cnt = nb.count(c2);
        if cnt >= 2 && !(cnt == 3 && nu_empty == 1) && (check_cut1(nb.e, nb.se, c2) || check_cut1(nb.w, nb.sw, c2)) {
            return true;
        }
    }
    if let Some(c1) = nb.n {
        if nb.count(c1) == 2
            && nb.count(opp(c1)) > 0
            && nb.count_diag(c1) <= 2
            && check_cut2(nb.s, nb.e, nb.nw, nb.sw, nb.w, nb.ne, nb.se, c1)
        {
            return true;
        }
    }
    if let Some(c3) = nb.e {
        if nb.count(c3) == 2
            && nb.count(opp(c3)) > 0
            && nb.count_diag(c3) <= 2
            && check_cut2(nb.w, nb.n, nb.sw, nb.se, nb.s, nb.nw, nb.ne, c3)
        {
            return true;
        }
    }
    false
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Dir {
    N,
    E,
    S,
    W,
}

fn find_single_dir(nb: &CenterNeighborhood, c: Color) -> Option<Dir> {
    if nb.n == Some(c) {
        Some(Dir::N)
    } else if nb.s == Some(c) {
        Some(Dir::S)
    } else if nb.e == Some(c) {
        Some(Dir::E)
    } else if nb.w == Some(c) {
        Some(Dir::W)
    } else {
        None
    }
}

/// `(p+dir+otherDir, p+dir-otherDir)` — the two corners adjacent to the
/// single stone at `dir`, and also the two gaps `hane2` checks for emptiness.
fn diag_plus(nb: &CenterNeighborhood, dir: Dir) -> (Option<Color>, Option<Color>) {
    match dir {
        Dir::N => (nb.ne, nb.nw),
        Dir::S => (nb.se, nb.sw),
        Dir::E => (nb.ne, nb.se),
        Dir::W => (nb.nw, nb.sw),
    }
}

/// `p + dirB + dirW`: the diagonal corner shared between two perpendicular
/// single-stone directions (hane3's precondition guarantees db/dw are
/// perpendicular).
fn diag_between(nb: &CenterNeighborhood, db: Dir, dw: Dir) -> Option<Color> {
    use Dir::*;
    match (db, dw) {
        (N, E) | (E, N) => nb.ne,
        (N, W) | (W, N) => nb.nw,
        (S, E) | (E, S) => nb.se,
        (S, W) | (W, S) => nb.sw,
        _ => None,
    }
}

fn match_any_center(nb: &CenterNeighborhood, to_play: Color, nu_black: usize, nu_white: usize) -> bool {
    match_hane(nb, to_play, nu_black, nu_white) || match_cut(nb)
}

/// Port of `MatchHane`. hane4's to-play condition (it requires the
/// opponent of the single stone to be on the move) is resolved here
/// directly rather than left tentative.
fn match_hane(nb: &CenterNeighborhood, to_play: Color, nu_black: usize, nu_white: usize) -> bool {
    let nu_empty = nb.count_empty();
    if nu_empty < 2 || nu_empty > 3 {
        return false;
    }
    if (nu_black < 1 || nu_black > 2) && (nu_white < 1 || nu_white > 2) {
        return false;
    }

    if nu_empty == 2 && nu_black == 1 && nu_white == 1 {
        // hane3: diagonal shared between the lone black and lone white
        // stone must not be empty.
        if let (Some(db), Some(dw)) = (find_single_dir(nb, Color::Black), find_single_dir(nb, Color::White)) {
            if diag_between(nb, db, dw).is_some() {
                return true;
            }
        }
    } else if nu_empty == 3 {
        let col = if nu_black == 1 { Color::Black } else { Color::White };
        let o = opp(col);
        if let Some(dir) = find_single_dir(nb, col) {
            let (d_plus, d_minus) = diag_plus(nb, dir);
            // hane2: either perpendicular corner is empty and the other is
            // the opponent's color.
            if d_plus.is_none() && d_minus == Some(o) {
                return true;
            }
            if d_minus.is_none() && d_plus == Some(o) {
                return true;
            }
            // hane4: the two corners are each other's opposite color, and
            // it is the single stone's opponent's move.
            if to_play == o {
                if let (Some(c1), Some(c2)) = (d_plus, d_minus) {
                    if c2 == opp(c1) {
                        return true;
                    }
                }
            }
        }
    }

    // hane1: >= 2 same-color diagonals, >= 1 opposite adjacent stone, plus a
    // directional micro-pattern on the perpendicular axis.
    if nb.count_diag(Color::Black) >= 2
        && nu_white > 0
        && (check_hane1(nb.n, nb.ne, nb.nw, nb.e, nb.w, Color::White)
            || check_hane1(nb.s, nb.se, nb.sw, nb.e, nb.w, Color::White)
            || check_hane1(nb.e, nb.ne, nb.se, nb.n, nb.s, Color::White)
            || check_hane1(nb.w, nb.nw, nb.sw, nb.n, nb.s, Color::White))
    {
        return true;
    }
    if nb.count_diag(Color::White) >= 2
        && nu_black > 0
        && (check_hane1(nb.n, nb.ne, nb.nw, nb.e, nb.w, Color::Black)
            || check_hane1(nb.s, nb.se, nb.sw, nb.e, nb.w, Color::Black)
            || check_hane1(nb.e, nb.ne, nb.se, nb.n, nb.s, Color::Black)
            || check_hane1(nb.w, nb.nw, nb.sw, nb.n, nb.s, Color::Black))
    {
        return true;
    }
    false
}

/// Port of `MatchEdge`. Operates in the canonical orientation where "up"
/// faces into the board and "side" is a fixed perpendicular axis; the
/// caller maps a real edge point's actual up/side directions onto this
/// same 5-slot layout before building the lookup code.
fn match_edge(nb: &EdgeNeighborhood, to_play: Color, nu_black: usize, nu_white: usize) -> bool {
    let nu_empty = nb.count_empty();
    let up_color = nb.up;

    // edge1
    if nu_empty > 0 && (nu_black > 0 || nu_white > 0) && up_color.is_none() {
        if let Some(c1) = nb.plus_side {
            if nb.plus_up_plus_side == Some(opp(c1)) {
                return true;
            }
        }
        if let Some(c2) = nb.minus_side {
            if nb.plus_up_minus_side == Some(opp(c2)) {
                return true;
            }
        }
    }

    // edge2
    if let Some(uc) = up_color {
        if (uc == Color::Black && nu_black == 1 && nu_white > 0) || (uc == Color::White && nu_white == 1 && nu_black > 0) {
            return true;
        }
    }

    // edge3
    if up_color == Some(to_play) {
        let opp_of_up = opp(up_color.unwrap());
        let diag_opp_count =
            [nb.plus_up_plus_side, nb.plus_up_minus_side].iter().filter(|&&x| x == Some(opp_of_up)).count();
        if diag_opp_count > 0 {
            return true;
        }
    }

    // edge4
    if up_color == Some(opp(to_play)) {
        let uc = up_color.unwrap();
        if nb.count(uc) <= 2 {
            if nb.plus_up_plus_side == Some(to_play) && nb.plus_side != Some(uc) {
                return true;
            }
            if nb.plus_up_minus_side == Some(to_play) && nb.minus_side != Some(uc) {
                return true;
            }
        }
    }

    // edge5
    if up_color == Some(opp(to_play)) {
        let uc = up_color.unwrap();
        if nb.count(uc) == 2 && nb.count(to_play) == 1 {
            if nb.plus_up_plus_side == Some(to_play) && nb.plus_side == Some(uc) {
                return true;
            }
            if nb.plus_up_minus_side == Some(to_play) && nb.minus_side == Some(uc) {
                return true;
            }
        }
    }

    false
}

struct PatternTables {
    center: Vec<bool>, // [to_play_index * POWER3_8 + code]
    edge: Vec<bool>,   // [to_play_index * POWER3_5 + code]
}

fn build_tables() -> PatternTables {
    let mut center = vec![false; 2 * POWER3_8];
    for code in 0..POWER3_8 {
        let nb = CenterNeighborhood::from_code(code);
        let nu_black = nb.count(Color::Black);
        let nu_white = nb.count(Color::White);
        for (idx, to_play) in [Color::Black, Color::White].into_iter().enumerate() {
            center[idx * POWER3_8 + code] = match_any_center(&nb, to_play, nu_black, nu_white);
        }
    }
    let mut edge = vec![false; 2 * POWER3_5];
    for code in 0..POWER3_5 {
        let nb = EdgeNeighborhood::from_code(code);
        let nu_black = nb.count(Color::Black);
        let nu_white = nb.count(Color::White);
        for (idx, to_play) in [Color::Black, Color::White].into_iter().enumerate() {
            edge[idx * POWER3_5 + code] = match_edge(&nb, to_play, nu_black, nu_white);
        }
    }
    PatternTables { center, edge }
}

static TABLES: OnceLock<PatternTables> = OnceLock::new();

fn tables() -> &'static PatternTables {
    TABLES.get_or_init(build_tables)
}

/// Computes a point's "up" (into-the-board) cardinal delta and the fixed
/// perpendicular "side" delta used to encode its edge neighborhood. Only
/// valid when `line(p) == 1`.
fn up_and_side(p: Point) -> (isize, isize) {
    let deltas = crate::point::cardinal_deltas(); // N, E, S, W
    for &d in &deltas {
        let np = (p as isize + d) as Point;
        if !crate::point::is_on_board(np) {
            let side = if d == deltas[0] || d == deltas[2] { deltas[1] } else { deltas[0] };
            return (-d, side);
        }
    }
    (0, 0)
}

fn code_for_center(board: &PlayoutBoard, p: Point) -> usize {
    let ns = neighbors8(p);
    let mut code = 0usize;
    for (i, &n) in ns.iter().enumerate() {
        let c = match board.color(n) {
            PointState::Stone(c) => Some(c),
            _ => None,
        };
        code += trit(c) * 3usize.pow(i as u32);
    }
    code
}

fn code_for_edge(board: &PlayoutBoard, p: Point) -> usize {
    let (up, side) = up_and_side(p);
    let pi = p as isize;
    let at = |delta: isize| -> Option<Color> {
        match board.color((pi + delta) as Point) {
            PointState::Stone(c) => Some(c),
            _ => None,
        }
    };
    let slots = [at(side), at(up + side), at(up), at(up - side), at(-side)];
    let mut code = 0usize;
    for (i, s) in slots.iter().enumerate() {
        code += trit(*s) * 3usize.pow(i as u32);
    }
    code
}

/// `true` iff `p` is empty and its neighborhood forms a hane, cut, or
/// edge pattern. Returns `false` immediately if both adjacent color
/// counts are zero or `p` is a corner, mirroring `MatchAnyPattern`'s
/// quick refutation.
pub fn match_any(board: &PlayoutBoard, p: Point) -> bool {
    debug_assert!(matches!(board.color(p), PointState::Empty));
    let nu_black = count_neighbors(board, p, Color::Black);
    let nu_white = count_neighbors(board, p, Color::White);
    if nu_black == 0 && nu_white == 0 {
        return false;
    }
    if pos(p) == 1 {
        return false;
    }
    let idx = board.to_play().index();
    if crate::point::line(p) == 1 {
        let code = code_for_edge(board, p);
        tables().edge[idx * POWER3_5 + code]
    } else {
        let code = code_for_center(board, p);
        tables().center[idx * POWER3_8 + code]
    }
}

fn count_neighbors(board: &PlayoutBoard, p: Point, c: Color) -> usize {
    neighbors4(p).into_iter().filter(|&n| board.color(n) == PointState::Stone(c)).count()
}
