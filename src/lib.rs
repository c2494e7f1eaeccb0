//! # Rush Hour Solver Library
//!
//! This library provides the board model for the Rush Hour sliding-block puzzle and four
//! search strategies that find a sequence of moves bringing the primary piece to the exit.
//!
//! It is used by two binaries:
//! - `rush_solver`: Loads a puzzle file, solves it with the chosen algorithm and heuristic,
//!   then prints every move with the resulting board and the search statistics.
//! - `heuristic_evaluator`: Scrambles a puzzle into a set of seeded boards and compares the
//!   node counts of every strategy and heuristic combination on them.
//!
//! ## Modules
//! - `engine`: Pieces (`Piece`), moves (`Move`), the board (`Board`) with its move generator
//!   and win test, and search nodes (`GameState`).
//! - `heuristics`: The Manhattan distance, blocking pieces and combined lower bounds.
//! - `solver`: Uniform Cost, Greedy Best-First, A* and IDA* under the `SearchStrategy` trait,
//!   and the `solve` entry point.
//! - `utils`: Puzzle parsing and the random scrambler.
//! - `error`: Parse and configuration errors.

pub mod engine;
pub mod error;
pub mod heuristics;
pub mod solver;
pub mod utils;
