use clap::Parser;
use rush_hour_solver::heuristics::HeuristicKind;
use rush_hour_solver::solver::{solve, Strategy};
use rush_hour_solver::utils::read_puzzle_file;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Search algorithm
    #[clap(short, long, value_enum)]
    algorithm: Strategy,

    /// Heuristic for gbfs, astar and idastar (ignored by ucs)
    #[clap(short = 'H', long, value_enum)]
    heuristic: Option<HeuristicKind>,

    /// Print only the move list and statistics, not the board after every move
    #[clap(short, long)]
    quiet: bool,

    /// Path to the puzzle file
    puzzle_file: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let board = match read_puzzle_file(&args.puzzle_file) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("Failed to load {}: {}", args.puzzle_file.display(), e);
            process::exit(1);
        }
    };
    println!("Loaded board from {}\n", args.puzzle_file.display());
    println!("Initial board state:\n{}\n", board.to_string_with_highlight(None));

    match args.heuristic {
        Some(heuristic) if args.algorithm.requires_heuristic() => {
            println!("Searching with {} ({})...\n", args.algorithm, heuristic)
        }
        _ => println!("Searching with {}...\n", args.algorithm),
    }

    let result = match solve(board, args.algorithm, args.heuristic) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if result.is_solved() {
        let moves = result.moves();
        println!("Solution found:\n");
        println!("Moves ({}):", moves.len());
        if moves.is_empty() {
            println!("  No moves needed.");
        }
        for (i, (mv, state)) in moves.iter().zip(result.path().into_iter().skip(1)).enumerate() {
            println!("  Move {}: {}", i + 1, mv);
            if !args.quiet {
                println!("{}\n", state.board().to_string_with_highlight(Some(mv.piece_id())));
            }
        }
    } else {
        println!("No solution found.");
    }
    println!("\nNodes visited: {}", result.nodes_visited);
    println!("Time: {} ms", result.elapsed_millis());
}
