//! Michi-Rust: a minimalistic Go MCTS engine core.
//!
//! ## Usage
//!
//! - `michi-rust` / `michi-rust demo` - run a short search against an
//!   empty board and print the move visit counts
//! - `michi-rust search --simulations N --workers K` - same, with
//!   search size overridden from the command line

use std::sync::atomic::AtomicBool;

use clap::{Parser, Subcommand};
use tracing::info;

use michi_rust::config::SearchConfig;
use michi_rust::point::{all_board_points, Color, Point, PointState};
use michi_rust::reference_board::ReferenceBoard;
use michi_rust::root_filter::compute_root_filter;
use michi_rust::search::{best_move, run_search};
use michi_rust::uct::Tree;

/// Michi-Rust: a minimalistic Go MCTS engine core
#[derive(Parser)]
#[command(name = "michi-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a short search from an empty board and report the chosen move
    Demo,
    /// Run a search with explicit sizing
    Search {
        #[arg(long, default_value_t = SearchConfig::default().num_simulations)]
        simulations: usize,
        #[arg(long, default_value_t = SearchConfig::default().num_workers)]
        workers: usize,
    },
}

/// A board with no genuine moves played yet — stands in for whatever a
/// front-end's real rules-aware board would supply via
/// [`ReferenceBoard`].
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

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match cli.command {
        Some(Commands::Search { simulations, workers }) => {
            let mut c = SearchConfig::default();
            c.num_simulations = simulations;
            c.num_workers = workers.max(1);
            c
        }
        Some(Commands::Demo) | None => SearchConfig::default(),
    };

    run_demo(&config);
}

fn run_demo(config: &SearchConfig) {
    println!("Michi-Rust: Minimalistic Go MCTS Engine\n");

    let root_ref = EmptyBoard;
    let mut board = michi_rust::playout_board::PlayoutBoard::new();
    board.init(&root_ref);
    let filtered = compute_root_filter(&board, config);
    info!(removed = filtered.len(), "computed root filter");

    let tree = Tree::new(config.num_workers, config.max_nodes_per_arena);
    let stop = AtomicBool::new(false);

    println!(
        "Running {} simulations across {} worker(s)...",
        config.num_simulations, config.num_workers
    );
    run_search(&tree, &root_ref, config, &stop);

    let mv = best_move(&tree);
    let children = tree.node(tree.root_handle());
    println!("Root visit count: {}", children.pos_count());
    if mv == michi_rust::constants::NULL_POINT {
        println!("Best move: pass");
    } else {
        println!("Best move: point {mv}");
    }
}
