//! Search strategies for Rush Hour.
//!
//! Four algorithms share the `SearchStrategy` trait:
//! - `UniformCost`: best-first on path cost `g`.
//! - `GreedyBestFirst`: best-first on the heuristic `h`.
//! - `AStar`: best-first on `f = g + h`.
//! - `IterativeDeepeningAStar`: depth-first with an `f` threshold raised between iterations.
//!
//! Strategies that need a heuristic take it at construction time. Every `run` returns a fresh
//! `SolveResult`, so a strategy value can be reused across boards.
use crate::engine::{Board, GameState, Move, StateKey};
use crate::error::SolveError;
use crate::heuristics::{Heuristic, HeuristicKind, NO_PRIMARY};
use log::{debug, info, trace};
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runtime selector for the four search algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Strategy {
    /// Uniform Cost Search
    #[value(name = "ucs")]
    UniformCost,
    /// Greedy Best-First Search
    #[value(name = "gbfs")]
    GreedyBestFirst,
    /// A* Search
    #[value(name = "astar")]
    AStar,
    /// Iterative Deepening A*
    #[value(name = "idastar")]
    IterativeDeepeningAStar,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::UniformCost,
        Strategy::GreedyBestFirst,
        Strategy::AStar,
        Strategy::IterativeDeepeningAStar,
    ];

    /// `false` only for Uniform Cost Search.
    pub fn requires_heuristic(&self) -> bool {
        !matches!(self, Strategy::UniformCost)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::UniformCost => "Uniform Cost Search",
            Strategy::GreedyBestFirst => "Greedy Best-First Search",
            Strategy::AStar => "A* Search",
            Strategy::IterativeDeepeningAStar => "Iterative Deepening A*",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one search call.
#[derive(Clone, Debug)]
pub struct SolveResult {
    /// The goal state, or `None` when the strategy exhausted its search space.
    pub goal: Option<Arc<GameState>>,
    /// States popped from the frontier (best-first) or entered (IDA*, over all iterations).
    pub nodes_visited: u64,
    /// Wall-clock duration of the call.
    pub elapsed: Duration,
}

impl SolveResult {
    pub fn is_solved(&self) -> bool {
        self.goal.is_some()
    }

    pub fn elapsed_millis(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }

    /// Number of moves in the solution, if one was found.
    pub fn solution_length(&self) -> Option<u32> {
        self.goal.as_ref().map(|goal| goal.cost())
    }

    /// The solution's states, root first; empty when unsolved.
    pub fn path(&self) -> Vec<&GameState> {
        self.goal
            .as_deref()
            .map(GameState::solution_path)
            .unwrap_or_default()
    }

    /// The solution's moves in order; empty when unsolved or already won.
    pub fn moves(&self) -> Vec<Move> {
        self.goal
            .as_deref()
            .map(GameState::moves)
            .unwrap_or_default()
    }
}

/// A search algorithm over `GameState`s.
pub trait SearchStrategy {
    fn name(&self) -> &'static str;

    /// Searches from `initial` (cost 0, no parent) until a winning state is found or the
    /// search space is exhausted.
    fn run(&self, initial: GameState) -> SolveResult;
}

/// Frontier entry. Reverse compare, so `BinaryHeap`'s max-heap pops the lowest priority
/// first, and the earliest pushed among equal priorities.
struct FrontierNode {
    priority: u64,
    seq: u64,
    state: Arc<GameState>,
}

impl Ord for FrontierNode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then(other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierNode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontierNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for FrontierNode {}

/// Shared best-first loop: pop the lowest-priority state, stop on a goal, otherwise close it
/// and push every successor whose board is not closed yet.
fn best_first<F>(name: &str, initial: GameState, priority: F) -> SolveResult
where
    F: Fn(&GameState) -> u64,
{
    let start = Instant::now();
    let mut frontier = BinaryHeap::new();
    let mut closed: HashSet<StateKey> = HashSet::new();
    let mut nodes_visited = 0;
    let mut seq = 0;

    frontier.push(FrontierNode {
        priority: priority(&initial),
        seq,
        state: Arc::new(initial),
    });

    while let Some(FrontierNode { priority: p, state, .. }) = frontier.pop() {
        nodes_visited += 1;
        if state.is_goal() {
            debug!(
                "{}: goal at cost {} after {} nodes ({} closed, {} queued)",
                name,
                state.cost(),
                nodes_visited,
                closed.len(),
                frontier.len()
            );
            return SolveResult {
                goal: Some(state),
                nodes_visited,
                elapsed: start.elapsed(),
            };
        }
        if !closed.insert(state.key().clone()) {
            continue;
        }
        trace!("{}: expanding g={} priority={}", name, state.cost(), p);

        for mv in state.possible_moves() {
            let Some(next) = state.apply_move(&mv) else {
                continue;
            };
            if closed.contains(next.key()) {
                continue;
            }
            seq += 1;
            frontier.push(FrontierNode {
                priority: priority(&next),
                seq,
                state: Arc::new(next),
            });
        }
    }

    debug!(
        "{}: frontier exhausted after {} nodes ({} closed)",
        name,
        nodes_visited,
        closed.len()
    );
    SolveResult {
        goal: None,
        nodes_visited,
        elapsed: start.elapsed(),
    }
}

/// Uniform Cost Search: frontier ordered by path cost alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformCost;

impl SearchStrategy for UniformCost {
    fn name(&self) -> &'static str {
        Strategy::UniformCost.name()
    }

    fn run(&self, initial: GameState) -> SolveResult {
        best_first(self.name(), initial, |state| state.cost() as u64)
    }
}

/// Greedy Best-First Search: frontier ordered by the heuristic alone. Not optimal.
#[derive(Clone, Copy, Debug)]
pub struct GreedyBestFirst<H> {
    heuristic: H,
}

impl<H: Heuristic> GreedyBestFirst<H> {
    pub fn new(heuristic: H) -> Self {
        GreedyBestFirst { heuristic }
    }
}

impl<H: Heuristic> SearchStrategy for GreedyBestFirst<H> {
    fn name(&self) -> &'static str {
        Strategy::GreedyBestFirst.name()
    }

    fn run(&self, initial: GameState) -> SolveResult {
        best_first(self.name(), initial, |state| {
            self.heuristic.evaluate(state) as u64
        })
    }
}

/// A* Search: frontier ordered by `g + h`. Optimal with an admissible, consistent heuristic.
#[derive(Clone, Copy, Debug)]
pub struct AStar<H> {
    heuristic: H,
}

impl<H: Heuristic> AStar<H> {
    pub fn new(heuristic: H) -> Self {
        AStar { heuristic }
    }
}

impl<H: Heuristic> SearchStrategy for AStar<H> {
    fn name(&self) -> &'static str {
        Strategy::AStar.name()
    }

    fn run(&self, initial: GameState) -> SolveResult {
        best_first(self.name(), initial, |state| {
            state.cost() as u64 + self.heuristic.evaluate(state) as u64
        })
    }
}

/// Iterative Deepening A*.
///
/// Each iteration is a depth-first search that prunes nodes whose `f = g + h` exceeds the
/// current threshold. The threshold starts at `h(root)` and is raised to the smallest pruned
/// `f` of the previous iteration. Within one iteration, a board entered again at a cost no
/// lower than before is skipped: its subtree was already searched from a cheaper path. This
/// bounds each iteration by the number of reachable boards, and the search stops with no
/// solution once an iteration prunes nothing.
#[derive(Clone, Copy, Debug)]
pub struct IterativeDeepeningAStar<H> {
    heuristic: H,
}

impl<H: Heuristic> IterativeDeepeningAStar<H> {
    pub fn new(heuristic: H) -> Self {
        IterativeDeepeningAStar { heuristic }
    }
}

/// Nothing was pruned: the space below this node is exhausted.
const UNBOUNDED: u64 = u64::MAX;

enum Descent {
    Found(Arc<GameState>),
    /// Smallest `f` pruned below this node, or `UNBOUNDED`.
    Pruned(u64),
}

struct DepthFirst<'a, H> {
    heuristic: &'a H,
    /// Lowest cost at which each board was entered during the current iteration.
    entered: HashMap<StateKey, u32>,
    nodes_visited: u64,
}

impl<H: Heuristic> DepthFirst<'_, H> {
    fn visit(&mut self, state: &Arc<GameState>, threshold: u64) -> Descent {
        self.nodes_visited += 1;
        let g = state.cost();
        if self.entered.get(state.key()).map_or(false, |&seen| seen <= g) {
            return Descent::Pruned(UNBOUNDED);
        }
        let h = self.heuristic.evaluate(state);
        if h == NO_PRIMARY {
            return Descent::Pruned(UNBOUNDED);
        }
        let f = g as u64 + h as u64;
        if f > threshold {
            return Descent::Pruned(f);
        }
        if state.is_goal() {
            return Descent::Found(Arc::clone(state));
        }

        self.entered.insert(state.key().clone(), g);
        let mut next_threshold = UNBOUNDED;
        for mv in state.possible_moves() {
            let Some(next) = state.apply_move(&mv) else {
                continue;
            };
            match self.visit(&Arc::new(next), threshold) {
                found @ Descent::Found(_) => return found,
                Descent::Pruned(f) => next_threshold = next_threshold.min(f),
            }
        }
        Descent::Pruned(next_threshold)
    }
}

impl<H: Heuristic> SearchStrategy for IterativeDeepeningAStar<H> {
    fn name(&self) -> &'static str {
        Strategy::IterativeDeepeningAStar.name()
    }

    fn run(&self, initial: GameState) -> SolveResult {
        let start = Instant::now();
        let root = Arc::new(initial);
        let mut search = DepthFirst {
            heuristic: &self.heuristic,
            entered: HashMap::new(),
            nodes_visited: 0,
        };
        let mut threshold = self.heuristic.evaluate(&root) as u64;

        let goal = loop {
            search.entered.clear();
            let before = search.nodes_visited;
            match search.visit(&root, threshold) {
                Descent::Found(goal) => break Some(goal),
                Descent::Pruned(UNBOUNDED) => break None,
                Descent::Pruned(next) => {
                    debug!(
                        "{}: threshold {} -> {} ({} nodes this iteration)",
                        self.name(),
                        threshold,
                        next,
                        search.nodes_visited - before
                    );
                    threshold = next;
                }
            }
        };

        SolveResult {
            goal,
            nodes_visited: search.nodes_visited,
            elapsed: start.elapsed(),
        }
    }
}

/// Builds the strategy selected by `strategy`, wiring in `heuristic` where one is needed.
///
/// # Errors
/// `SolveError::MissingHeuristic` if `strategy` needs a heuristic and none is given. The
/// heuristic is ignored for Uniform Cost Search.
pub fn build_strategy(
    strategy: Strategy,
    heuristic: Option<HeuristicKind>,
) -> Result<Box<dyn SearchStrategy + Send + Sync>, SolveError> {
    if strategy == Strategy::UniformCost {
        return Ok(Box::new(UniformCost));
    }
    let heuristic = heuristic.ok_or(SolveError::MissingHeuristic { strategy })?;
    Ok(match strategy {
        Strategy::UniformCost => Box::new(UniformCost),
        Strategy::GreedyBestFirst => Box::new(GreedyBestFirst::new(heuristic)),
        Strategy::AStar => Box::new(AStar::new(heuristic)),
        Strategy::IterativeDeepeningAStar => Box::new(IterativeDeepeningAStar::new(heuristic)),
    })
}

/// Solves `board` with the selected strategy and heuristic.
///
/// The configuration is checked before searching, so a misconfiguration is reported as an
/// error while an unsolvable board is an `Ok` result with no goal.
///
/// # Examples
/// ```
/// use rush_hour_solver::heuristics::HeuristicKind;
/// use rush_hour_solver::solver::{solve, Strategy};
/// use rush_hour_solver::utils::board_from_str_array;
///
/// let board = board_from_str_array(&["..A...", "PPA...K", "......", "......"]).unwrap();
/// let result = solve(board, Strategy::AStar, Some(HeuristicKind::BlockingPieces)).unwrap();
/// assert_eq!(result.solution_length(), Some(2));
/// assert!(solve(result.path()[0].board().clone(), Strategy::AStar, None).is_err());
/// ```
pub fn solve(
    board: Board,
    strategy: Strategy,
    heuristic: Option<HeuristicKind>,
) -> Result<SolveResult, SolveError> {
    let search = build_strategy(strategy, heuristic)?;
    let result = search.run(GameState::new(board));
    match result.solution_length() {
        Some(length) => info!(
            "{}: solved in {} moves, {} nodes, {} ms",
            search.name(),
            length,
            result.nodes_visited,
            result.elapsed_millis()
        ),
        None => info!(
            "{}: no solution, {} nodes, {} ms",
            search.name(),
            result.nodes_visited,
            result.elapsed_millis()
        ),
    }
    Ok(result)
}
