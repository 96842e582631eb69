//! Michi-Rust: a lock-free, arena-based Go MCTS engine core.
//!
//! This crate is not a full Go program — no SGF/GTP front-end, no
//! rules-aware full-game board. It is the reusable core a front-end
//! would embed: an incremental playout board (C1-C3), 3x3/2x3 pattern
//! matching and prior knowledge (C4-C5), a Benson-safety/ladder oracle
//! and root move filter (C6-C7), and a lock-free, multi-worker UCT tree
//! (C8-C9) tying them together in [`search`].
//!
//! ## Modules
//!
//! - [`point`] - coordinate space, colors, neighbor/diagonal offsets
//! - [`constants`] - board size and engine-tuning constants
//! - [`config`] - runtime search configuration
//! - [`block`] - incremental block/liberty bookkeeping
//! - [`playout_board`] - the incremental board: play, capture, ko, suicide
//! - [`reference_board`] - read-only probe trait bridging a genuine game board
//! - [`patterns`] - 3x3/2x3 hane/cut/edge pattern matching
//! - [`prior`] - prior-knowledge bias table and the `PlayoutPolicy` trait
//! - [`playout`] - the default playout policy and random-game scoring
//! - [`safety`] - unconditional life (Benson) and the exhaustive ladder reader
//! - [`root_filter`] - root move exclusion built from the safety oracle
//! - [`uct`] - the lock-free node arena and tree
//! - [`search`] - the worker loop wiring everything together
//!
//! ## Example
//!
//! ```
//! use std::sync::atomic::AtomicBool;
//! use michi_rust::config::SearchConfig;
//! use michi_rust::point::{Color, PointState, Point, all_board_points};
//! use michi_rust::reference_board::ReferenceBoard;
//! use michi_rust::uct::Tree;
//! use michi_rust::search::{run_search, best_move};
//!
//! struct EmptyBoard;
//! impl ReferenceBoard for EmptyBoard {
//!     fn size(&self) -> usize { michi_rust::constants::N }
//!     fn points(&self) -> Vec<Point> { all_board_points().collect() }
//!     fn get_color(&self, p: Point) -> PointState {
//!         if michi_rust::point::is_on_board(p) { PointState::Empty } else { PointState::Border }
//!     }
//!     fn is_border(&self, p: Point) -> bool { !michi_rust::point::is_on_board(p) }
//!     fn is_empty(&self, p: Point) -> bool { michi_rust::point::is_on_board(p) }
//!     fn anchor(&self, p: Point) -> Point { p }
//!     fn num_neighbors(&self, _p: Point, _c: Color) -> usize { 0 }
//!     fn num_empty_neighbors(&self, p: Point) -> usize {
//!         michi_rust::point::neighbors4(p).into_iter().filter(|&n| michi_rust::point::is_on_board(n)).count()
//!     }
//!     fn block_stones(&self, anchor: Point) -> Vec<Point> { vec![anchor] }
//!     fn block_liberties(&self, _anchor: Point) -> Vec<Point> { Vec::new() }
//!     fn num_prisoners(&self, _c: Color) -> u32 { 0 }
//!     fn ko_point(&self) -> Option<Point> { None }
//!     fn get_last_move(&self) -> Option<Point> { None }
//!     fn get_2nd_last_move(&self) -> Option<Point> { None }
//!     fn to_play(&self) -> Color { Color::Black }
//! }
//!
//! let mut config = SearchConfig::default();
//! config.num_simulations = 16;
//! let tree = Tree::new(config.num_workers, config.max_nodes_per_arena);
//! let stop = AtomicBool::new(false);
//! run_search(&tree, &EmptyBoard, &config, &stop);
//! let _best = best_move(&tree);
//! ```

pub mod block;
pub mod config;
pub mod constants;
pub mod patterns;
pub mod playout;
pub mod playout_board;
pub mod point;
pub mod prior;
pub mod reference_board;
pub mod root_filter;
pub mod safety;
pub mod search;
pub mod uct;
