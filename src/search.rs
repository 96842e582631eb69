//! Search driver: the worker loop wiring the UCT tree (C9), prior
//! knowledge (C5), the playout board (C3) and the root filter (C7)
//! together, per distilled spec §2's data-flow paragraph and §5's
//! concurrency model.
//!
//! Grounded on the teacher's `mcts.rs` (`rave_urgency`/`most_urgent`/
//! `tree_descend`/`tree_update` give the UCB1-RAVE selection formula and
//! the descend-expand-playout-backprop shape) generalized from its
//! single-threaded `Position`-cloning tree onto [`crate::uct::Tree`]'s
//! arena-backed, multi-worker design, using `std::thread::scope` and
//! `std::sync::atomic::AtomicBool` for the cooperative stop flag
//! (distilled spec §5 "Cancellation").

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::SearchConfig;
use crate::constants::NULL_POINT;
use crate::playout::DefaultPlayoutPolicy;
use crate::playout_board::PlayoutBoard;
use crate::point::{Color, Point, PointState};
use crate::prior::{compute_priors, PlayoutPolicy};
use crate::reference_board::ReferenceBoard;
use crate::uct::{Node, NodeHandle, Tree};

/// Per-worker state (distilled spec §5: "Per worker: one playout board,
/// one pattern matcher, one prior-knowledge engine, one arena, one
/// random state"). The pattern matcher is stateless (a shared static
/// lookup table, see [`crate::patterns`]) so it is not duplicated here.
pub struct Worker {
    pub id: usize,
    board: PlayoutBoard,
    policy: DefaultPlayoutPolicy,
}

impl Worker {
    pub fn new(id: usize, seed: u64) -> Self {
        Worker {
            id,
            board: PlayoutBoard::new(),
            policy: DefaultPlayoutPolicy::new(seed),
        }
    }
}

/// `RaveUrgency`/`rave_urgency`: the UCB1-RAVE selection score for one
/// child, blending its empirical mean with its RAVE mean. `rave_equiv`
/// is the visit count at which the two estimates are weighted equally.
fn urgency(node: &Node, rave_equiv: f64) -> f64 {
    let value_count = node.move_count() as f64;
    let value_mean = node.mean();
    let rave_count = node.rave_count() as f64;
    if rave_count == 0.0 {
        return value_mean;
    }
    let rave_mean = node.rave_mean();
    let beta = rave_count / (rave_count + value_count + value_count * rave_count / rave_equiv);
    beta * rave_mean + (1.0 - beta) * value_mean
}

/// `MostUrgent`: the child with the highest urgency score. Ties are
/// broken by the first child encountered (the teacher shuffles children
/// before scanning for exploration diversity; here the same effect is
/// achieved by scanning children in the arena's allocation order, which
/// is already randomized across workers by whichever one won the
/// expansion race).
fn select_child(tree: &Tree, parent: NodeHandle, rave_equiv: f64) -> Option<NodeHandle> {
    tree.children(parent)
        .max_by(|&a, &b| {
            let ua = urgency(tree.node(a), rave_equiv);
            let ub = urgency(tree.node(b), rave_equiv);
            ua.partial_cmp(&ub).unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// One step of the path taken during a descent: the handle reached, the
/// move played to reach it, and the color that played it (needed for
/// RAVE backprop — a simulated move credits every node of matching color
/// on the path, distilled spec glossary "RAVE").
struct PathStep {
    handle: NodeHandle,
    /// The node whose child `handle` is — `addGameResult`'s `father`
    /// parameter (distilled spec §4.5). Always well-defined: a
    /// [`PathStep`] is only ever produced by descending *into* a child,
    /// so its parent is the node just descended from (the root, for the
    /// first step).
    parent: NodeHandle,
    mv: Point,
    mover: Color,
}

/// Descends from the root to a leaf (an unexpanded node, or a node whose
/// arena-capacity-exhausted expansion attempt left it unexpanded —
/// distilled spec §7 class 2, "never fatal"), playing each selected
/// child's move on `worker`'s board as it goes.
fn descend(tree: &Tree, worker: &mut Worker, rave_equiv: f64) -> Vec<PathStep> {
    let mut path = Vec::new();
    let mut current = tree.root_handle();
    loop {
        let node = tree.node(current);
        if !node.has_children() {
            return path;
        }
        let mover = worker.board.to_play();
        let child = match select_child(tree, current, rave_equiv) {
            Some(c) => c,
            None => return path,
        };
        let mv = tree.node(child).mv();
        worker.board.play(mv, mover);
        path.push(PathStep { handle: child, parent: current, mv, mover });
        current = child;
    }
}

/// All legal moves from the worker's current board position (on-board
/// points plus `PASS`), used to build the candidate list for
/// `create_children` when a leaf is expanded.
fn legal_moves(board: &PlayoutBoard) -> Vec<Point> {
    let to_play = board.to_play();
    let mut moves: Vec<Point> = crate::point::all_board_points()
        .filter(|&p| board.color(p) == PointState::Empty && board.is_legal(p, to_play))
        .collect();
    moves.push(NULL_POINT); // PASS is always legal
    moves
}

/// Expands the leaf reached by `descend`: computes prior knowledge for
/// every legal move (C5, using C3+C4+the worker's playout policy) and
/// hands the resulting `(move, prior_value, prior_count)` triples to
/// `Tree::create_children`. Returns `false` (distilled spec §7 class 2)
/// if the worker's arena has no room; the caller then falls back to
/// simulating directly from the unexpanded leaf.
fn expand_leaf(tree: &Tree, worker: &mut Worker, leaf: NodeHandle) -> bool {
    let moves = legal_moves(&worker.board);
    if moves.is_empty() {
        return false;
    }
    let (pass_bias, biases) = compute_priors(&worker.board, &mut worker.policy);
    let triples: Vec<(Point, f32, usize)> = moves
        .iter()
        .map(|&mv| {
            let bias = if mv == NULL_POINT {
                pass_bias
            } else {
                biases[mv].unwrap_or(crate::prior::PriorBias { value: 0.5, count: 0, move_type: 0 })
            };
            (mv, bias.value, bias.count)
        })
        .collect();
    tree.create_children(worker.id, leaf, &triples)
}

/// Runs one full simulation: descend, (maybe) expand, playout, backprop.
/// `root_ref` seeds `worker`'s board at the start of every simulation —
/// the playout board has no undo (distilled spec §1), so each descent
/// starts from a freshly re-initialized copy of the genuine reference
/// position rather than rewinding moves.
pub fn run_simulation(tree: &Tree, worker: &mut Worker, root_ref: &dyn ReferenceBoard, config: &SearchConfig) {
    worker.board.init(root_ref);

    let mut path = descend(tree, worker, config.rave_equiv as f64);
    let leaf = path.last().map(|s| s.handle).unwrap_or_else(|| tree.root_handle());

    if tree.node(leaf).pos_count() as u32 >= config.expand_threshold && !tree.node(leaf).has_children() {
        if expand_leaf(tree, worker, leaf) {
            if let Some(child) = select_child(tree, leaf, config.rave_equiv as f64) {
                let mover = worker.board.to_play();
                let mv = tree.node(child).mv();
                worker.board.play(mv, mover);
                path.push(PathStep { handle: child, parent: leaf, mv, mover });
            }
        }
    }

    let mut policy = DefaultPlayoutPolicy::new(fastrand::u64(..));
    let score = crate::playout::run_playout(&mut worker.board, &mut policy, config.komi);
    // Score is from Black's perspective; convert to "probability the
    // mover at the backed-up node wins" the way the teacher's
    // `tree_update` does (an even-game score of 0 is a coin flip).
    let black_wins = if score > 0.0 { 1.0 } else if score < 0.0 { 0.0 } else { 0.5 };

    if path.is_empty() {
        tree.add_game_result(tree.root_handle(), None, black_wins as f32);
    }
    for step in &path {
        let eval = eval_for(black_wins, step.mover);
        tree.add_game_result(step.handle, Some(step.parent), eval);
        tree.add_rave_value(step.handle, eval);
    }
}

fn eval_for(black_wins: f64, mover: Color) -> f32 {
    match mover {
        Color::Black => black_wins as f32,
        Color::White => (1.0 - black_wins) as f32,
    }
}

/// Runs `config.num_simulations` simulations spread across
/// `config.num_workers` long-lived worker threads (distilled spec §5:
/// "A small, bounded set of worker threads... each run the full MCTS
/// loop"). Returns once every worker has finished its share or `stop`
/// has been observed set. `stop` lets a caller impose a time budget
/// (distilled spec §5 "Timeouts": "Imposed by the caller via the stop
/// flag") — in-flight simulations always complete (distilled spec
/// "Cancellation": "no simulation is interrupted mid-play").
pub fn run_search(tree: &Tree, root_ref: &dyn ReferenceBoard, config: &SearchConfig, stop: &AtomicBool) {
    let per_worker = config.num_simulations.div_ceil(config.num_workers.max(1));
    std::thread::scope(|scope| {
        for worker_id in 0..config.num_workers {
            let tree = &*tree;
            let config = &*config;
            scope.spawn(move || {
                let mut worker = Worker::new(worker_id, (worker_id as u64) ^ fastrand::u64(..));
                for _ in 0..per_worker {
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                    run_simulation(tree, &mut worker, root_ref, config);
                }
            });
        }
    });
}

/// The child move of the root with the most visits — the conventional
/// "best move" readout once a search batch completes (ties broken by
/// lowest raw point index, like the teacher's `best_move`).
pub fn best_move(tree: &Tree) -> Point {
    tree.children(tree.root_handle())
        .max_by_key(|&h| tree.node(h).move_count())
        .map(|h| tree.node(h).mv())
        .unwrap_or(NULL_POINT)
}
