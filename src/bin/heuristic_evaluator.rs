use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rush_hour_solver::heuristics::HeuristicKind;
use rush_hour_solver::solver::{solve, Strategy};
use rush_hour_solver::utils::{read_puzzle_file, scramble};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Number of scrambled boards to evaluate
    #[clap(short, long, default_value_t = 20)]
    boards: usize,

    /// Seed of the first board; board `i` uses `seed + i`
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    /// Length of the random walk that scrambles each board
    #[clap(short = 'm', long, default_value_t = 30)]
    scramble_moves: usize,

    /// Restrict the evaluation to these algorithms (repeatable; all by default)
    #[clap(short, long, value_enum)]
    algorithm: Vec<Strategy>,

    /// Puzzle file the boards are scrambled from
    puzzle_file: PathBuf,
}

#[derive(Default)]
struct Totals {
    solved: usize,
    unsolved: usize,
    nodes: u64,
    moves: u64,
    millis: u64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let base = match read_puzzle_file(&args.puzzle_file) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("Failed to load {}: {}", args.puzzle_file.display(), e);
            process::exit(1);
        }
    };

    let strategies: Vec<Strategy> = if args.algorithm.is_empty() {
        Strategy::ALL.to_vec()
    } else {
        args.algorithm.clone()
    };
    let mut configs: Vec<(Strategy, Option<HeuristicKind>)> = Vec::new();
    for strategy in strategies {
        if strategy.requires_heuristic() {
            configs.extend(HeuristicKind::ALL.into_iter().map(|h| (strategy, Some(h))));
        } else {
            configs.push((strategy, None));
        }
    }

    let label = |(strategy, heuristic): &(Strategy, Option<HeuristicKind>)| match heuristic {
        Some(h) => format!("{} + {}", strategy, h),
        None => strategy.to_string(),
    };
    let mut totals: BTreeMap<String, Totals> = BTreeMap::new();

    println!("Starting heuristic evaluation for {} boards...", args.boards);

    for board_idx in 0..args.boards {
        let current_seed = args.seed + board_idx as u64;
        let mut rng = SmallRng::seed_from_u64(current_seed);
        let board = scramble(&base, args.scramble_moves, &mut rng);

        println!("\nEvaluating Board {} (Seed: {})\n{}", board_idx, current_seed, board);

        for config in &configs {
            let name = label(config);
            let result = match solve(board.clone(), config.0, config.1) {
                Ok(result) => result,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            };
            let entry = totals.entry(name.clone()).or_default();
            entry.nodes += result.nodes_visited;
            entry.millis += result.elapsed_millis();
            match result.solution_length() {
                Some(length) => {
                    entry.solved += 1;
                    entry.moves += length as u64;
                    println!(
                        "  {:<40} Moves: {:<4} Nodes: {:<10} Time: {} ms",
                        name,
                        length,
                        result.nodes_visited,
                        result.elapsed_millis()
                    );
                }
                None => {
                    entry.unsolved += 1;
                    println!(
                        "  {:<40} No solution  Nodes: {:<10} Time: {} ms",
                        name,
                        result.nodes_visited,
                        result.elapsed_millis()
                    );
                }
            }
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!("Number of boards evaluated: {}", args.boards);
    println!("\n--- Averages ---");

    let mut averages: Vec<(&str, f64, f64, f64, usize)> = totals
        .iter()
        .filter(|(_, t)| t.solved + t.unsolved > 0)
        .map(|(name, t)| {
            let runs = (t.solved + t.unsolved) as f64;
            let moves = if t.solved > 0 {
                t.moves as f64 / t.solved as f64
            } else {
                0.0
            };
            (
                name.as_str(),
                t.nodes as f64 / runs,
                moves,
                t.millis as f64 / runs,
                t.unsolved,
            )
        })
        .collect();

    // Fewest nodes first
    averages.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    for (name, nodes, moves, millis, unsolved) in averages {
        println!(
            "{:<40}: Nodes = {:>12.1}, Moves = {:>6.2}, Time = {:>8.2} ms, Unsolved = {}",
            name, nodes, moves, millis, unsolved
        );
    }
}
