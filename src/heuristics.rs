//! Heuristic estimators of the number of moves left before the primary piece exits.
//!
//! Every estimator is a stateless unit struct implementing `Heuristic`, so one instance can
//! be shared freely between searches. `HeuristicKind` selects an estimator at runtime (for
//! example from a command-line flag) and implements `Heuristic` by delegation.
use crate::engine::{exit_faces_far, Board, GameState, Orientation};
use std::fmt;

/// Returned when the board has no primary piece.
pub const NO_PRIMARY: u32 = u32::MAX;

/// A cost estimator over game states.
pub trait Heuristic {
    /// Returns a non-negative estimate of the moves remaining to reach a win.
    fn evaluate(&self, state: &GameState) -> u32;

    /// Human-readable name, used in reports.
    fn name(&self) -> &'static str;
}

/// Manhattan Distance (MD).
///
/// The number of cells between the primary piece's relevant edge and the exit along the
/// piece's axis, clamped to zero:
/// - exit beyond the far border: cells between the leading edge and the border,
/// - exit beyond the near border: cells between the border and the trailing edge,
/// - in-grid exit: cells from the edge facing the exit up to the exit cell.
///
/// One move may slide a piece several cells, so this counts cells, not moves.
#[derive(Clone, Copy, Debug, Default)]
pub struct ManhattanDistance;

/// Blocking Pieces (BP).
///
/// Counts the distinct vehicles occupying cells strictly between the primary piece and the
/// exit in the primary's row (or column). The scan stops at the exit cell, which is itself
/// not counted. Each blocker must move at least once, and one move changes the blocker set by
/// at most one vehicle, so BP is admissible and consistent for every exit kind.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockingPieces;

/// Distance + Blocking (DB): the plain sum of `ManhattanDistance` and `BlockingPieces`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DistanceBlocking;

/// Computes the MD value of a board.
pub fn manhattan_distance(board: &Board) -> u32 {
    let Some(primary) = board.primary_piece() else {
        return NO_PRIMARY;
    };
    let (exit, span) = board.exit_on_axis(primary);
    let (start, lead) = (primary.axis_start(), primary.axis_end());
    let distance = if exit >= span {
        span - 1 - lead
    } else if exit < 0 {
        start
    } else if exit_faces_far(exit, span) {
        exit - lead
    } else {
        start - exit
    };
    distance.max(0) as u32
}

/// Computes the BP value of a board.
pub fn blocking_pieces(board: &Board) -> u32 {
    let Some(primary) = board.primary_piece() else {
        return NO_PRIMARY;
    };
    let (exit, span) = board.exit_on_axis(primary);
    // Scan range along the axis, exit cell excluded.
    let cells: Box<dyn Iterator<Item = i32>> = if exit_faces_far(exit, span) {
        Box::new(primary.axis_end() + 1..exit.min(span))
    } else {
        Box::new((exit.max(-1) + 1..primary.axis_start()).rev())
    };

    let mut blockers: Vec<char> = Vec::new();
    for pos in cells {
        let (r, c) = match primary.orientation() {
            Orientation::Horizontal => (primary.row(), pos),
            Orientation::Vertical => (pos, primary.col()),
        };
        if !board.in_bounds(r, c) {
            continue;
        }
        if let Some(id) = board.cell(r as usize, c as usize) {
            if !blockers.contains(&id) {
                blockers.push(id);
            }
        }
    }
    blockers.len() as u32
}

impl Heuristic for ManhattanDistance {
    fn evaluate(&self, state: &GameState) -> u32 {
        manhattan_distance(state.board())
    }

    fn name(&self) -> &'static str {
        "Manhattan Distance"
    }
}

impl Heuristic for BlockingPieces {
    fn evaluate(&self, state: &GameState) -> u32 {
        blocking_pieces(state.board())
    }

    fn name(&self) -> &'static str {
        "Blocking Pieces"
    }
}

impl Heuristic for DistanceBlocking {
    fn evaluate(&self, state: &GameState) -> u32 {
        let board = state.board();
        manhattan_distance(board).saturating_add(blocking_pieces(board))
    }

    fn name(&self) -> &'static str {
        "Distance + Blocking"
    }
}

/// Runtime selector for the three heuristics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum HeuristicKind {
    /// Manhattan Distance
    #[value(name = "md")]
    ManhattanDistance,
    /// Blocking Pieces
    #[value(name = "bp")]
    BlockingPieces,
    /// Distance + Blocking
    #[value(name = "db")]
    DistanceBlocking,
}

impl HeuristicKind {
    pub const ALL: [HeuristicKind; 3] = [
        HeuristicKind::ManhattanDistance,
        HeuristicKind::BlockingPieces,
        HeuristicKind::DistanceBlocking,
    ];
}

impl Heuristic for HeuristicKind {
    fn evaluate(&self, state: &GameState) -> u32 {
        match self {
            HeuristicKind::ManhattanDistance => ManhattanDistance.evaluate(state),
            HeuristicKind::BlockingPieces => BlockingPieces.evaluate(state),
            HeuristicKind::DistanceBlocking => DistanceBlocking.evaluate(state),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            HeuristicKind::ManhattanDistance => ManhattanDistance.name(),
            HeuristicKind::BlockingPieces => BlockingPieces.name(),
            HeuristicKind::DistanceBlocking => DistanceBlocking.name(),
        }
    }
}

impl fmt::Display for HeuristicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Board;
    use crate::utils::{board_from_str_array, scramble};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet, VecDeque};
    use std::sync::Arc;

    fn state(rows: &[&str]) -> GameState {
        GameState::new(board_from_str_array(rows).unwrap())
    }

    /// Exact remaining cost of every state reachable from `board`, by backward BFS over the
    /// explored graph. States that cannot reach a win are absent from the map.
    fn true_distances(board: &Board) -> HashMap<String, u32> {
        let mut edges: HashMap<String, Vec<String>> = HashMap::new();
        let mut boards: HashMap<String, Board> = HashMap::new();
        let mut queue = VecDeque::from([board.clone()]);
        boards.insert(board.to_string(), board.clone());
        while let Some(current) = queue.pop_front() {
            let from = current.to_string();
            if current.is_win() {
                continue;
            }
            for mv in current.possible_moves() {
                let mut next = current.clone();
                assert!(next.apply_move(&mv));
                let to = next.to_string();
                edges.entry(to.clone()).or_default().push(from.clone());
                if !boards.contains_key(&to) {
                    boards.insert(to, next.clone());
                    queue.push_back(next);
                }
            }
        }

        let mut distances = HashMap::new();
        let mut queue = VecDeque::new();
        for (key, b) in &boards {
            if b.is_win() {
                distances.insert(key.clone(), 0);
                queue.push_back(key.clone());
            }
        }
        while let Some(key) = queue.pop_front() {
            let d = distances[&key];
            for pred in edges.get(&key).into_iter().flatten() {
                if !distances.contains_key(pred) {
                    distances.insert(pred.clone(), d + 1);
                    queue.push_back(pred.clone());
                }
            }
        }
        distances
    }

    fn reachable(board: &Board) -> Vec<Board> {
        let mut seen = HashSet::from([board.key()]);
        let mut out = vec![board.clone()];
        let mut queue = VecDeque::from([board.clone()]);
        while let Some(current) = queue.pop_front() {
            for mv in current.possible_moves() {
                let mut next = current.clone();
                next.apply_move(&mv);
                if seen.insert(next.key()) {
                    out.push(next.clone());
                    queue.push_back(next);
                }
            }
        }
        out
    }

    fn sample_boards() -> Vec<Board> {
        vec![
            board_from_str_array(&[
                "......", //
                "...A..",
                "PP.A..K",
                "......",
                "......",
                "......",
            ])
            .unwrap(),
            board_from_str_array(&[
                "AA...B", //
                "C..D.B",
                "CPPD.BK",
                "C..D..",
                "E...FF",
                "E.GGG.",
            ])
            .unwrap(),
            board_from_str_array(&[
                "B.A.", //
                "B.A.",
                "PP..K",
                "CC.D",
                "...D",
            ])
            .unwrap(),
            board_from_str_array(&["K..A.PP", " ..A...", " ......"]).unwrap(),
            board_from_str_array(&["...KBBBPP", "..A......", "..A......"]).unwrap(),
            board_from_str_array(&["PP.A.K.", "...A...", "...BB.."]).unwrap(),
            board_from_str_array(&["  K", "...", ".AA", "..P", "..P"]).unwrap(),
        ]
    }

    #[test]
    fn test_manhattan_distance_far_border() {
        assert_eq!(ManhattanDistance.evaluate(&state(&["PP....K", "......"])), 4);
        assert_eq!(ManhattanDistance.evaluate(&state(&["....PPK", "......"])), 0);
    }

    #[test]
    fn test_manhattan_distance_near_border() {
        assert_eq!(ManhattanDistance.evaluate(&state(&["K...PP.", "......"])), 3);
        assert_eq!(ManhattanDistance.evaluate(&state(&["KPP....", "......"])), 0);
    }

    #[test]
    fn test_manhattan_distance_vertical() {
        let s = state(&[".P.", ".P.", "...", "...", " K"]);
        assert_eq!(ManhattanDistance.evaluate(&s), 2);
        let s = state(&[" K", "...", "...", ".P.", ".P."]);
        assert_eq!(ManhattanDistance.evaluate(&s), 2);
    }

    #[test]
    fn test_manhattan_distance_interior_exit() {
        assert_eq!(ManhattanDistance.evaluate(&state(&["PP..K.", "......"])), 3);
        assert_eq!(ManhattanDistance.evaluate(&state(&[".K..PP", "......"])), 3);
        // Passing the exit clamps to zero.
        assert_eq!(ManhattanDistance.evaluate(&state(&["....K.PP", "........"])), 0);
    }

    #[test]
    fn test_blocking_pieces_counts_vehicles_towards_exit() {
        let s = state(&["..A...", "PPA.B.K", "....B.", "C....."]);
        assert_eq!(BlockingPieces.evaluate(&s), 2);
        let s = state(&["K.A.PP", "..A..."]);
        assert_eq!(s.board().exit(), (0, 0));
        assert_eq!(BlockingPieces.evaluate(&s), 1);
        let s = state(&["KB.A.PP", " B.A..."]);
        assert_eq!(s.board().exit(), (0, -1));
        assert_eq!(BlockingPieces.evaluate(&s), 2);
    }

    #[test]
    fn test_blocking_pieces_counts_long_blocker_once() {
        let s = state(&["...KBBBPP", "........."]);
        assert_eq!(s.board().exit(), (0, 3));
        assert_eq!(BlockingPieces.evaluate(&s), 1);
        let distances = true_distances(s.board());
        assert_eq!(distances.get(&s.board().to_string()), Some(&2));

        let s = state(&["PPAAA..."]);
        assert_eq!(BlockingPieces.evaluate(&s), 1);
    }

    #[test]
    fn test_blocking_pieces_ignores_exit_cell() {
        let cells: Vec<Vec<char>> = ["PP..A", "....A"]
            .iter()
            .map(|row| row.chars().collect())
            .collect();
        let board = Board::initialize(&cells, Some((0, 4)));
        assert_eq!(blocking_pieces(&board), 0);
        let board = Board::initialize(&cells, Some((0, 5)));
        assert_eq!(blocking_pieces(&board), 1);
    }

    #[test]
    fn test_blocking_pieces_vertical_primary() {
        let s = state(&[".P.", ".P.", "AA.", "...", ".B.", " K"]);
        assert_eq!(BlockingPieces.evaluate(&s), 2);
    }

    #[test]
    fn test_distance_blocking_is_sum() {
        let s = state(&["..A...", "PPA.B.K", "....B.", "C....."]);
        assert_eq!(ManhattanDistance.evaluate(&s), 4);
        assert_eq!(BlockingPieces.evaluate(&s), 2);
        assert_eq!(DistanceBlocking.evaluate(&s), 6);
    }

    #[test]
    fn test_missing_primary_sentinel() {
        let cells: Vec<Vec<char>> = ["AA..", "...."].iter().map(|r| r.chars().collect()).collect();
        let s = GameState::new(Board::initialize(&cells, Some((0, 4))));
        for kind in HeuristicKind::ALL {
            assert_eq!(kind.evaluate(&s), NO_PRIMARY, "{}", kind);
        }
    }

    #[test]
    fn test_heuristic_kind_delegates() {
        let s = state(&["..A...", "PPA.B.K", "....B.", "C....."]);
        assert_eq!(HeuristicKind::ManhattanDistance.evaluate(&s), 4);
        assert_eq!(HeuristicKind::BlockingPieces.evaluate(&s), 2);
        assert_eq!(HeuristicKind::DistanceBlocking.evaluate(&s), 6);
        assert_eq!(HeuristicKind::BlockingPieces.name(), "Blocking Pieces");
    }

    #[test]
    fn test_all_heuristics_zero_on_win() {
        for board in sample_boards() {
            for b in reachable(&board).into_iter().filter(Board::is_win) {
                let s = GameState::new(b);
                for kind in HeuristicKind::ALL {
                    assert_eq!(kind.evaluate(&s), 0, "{} on\n{}", kind, s.board());
                }
            }
        }
    }

    #[test]
    fn test_manhattan_distance_zero_only_on_win() {
        for board in sample_boards() {
            for b in reachable(&board) {
                assert_eq!(manhattan_distance(&b) == 0, b.is_win(), "\n{}", b);
            }
        }
    }

    #[test]
    fn test_blocking_pieces_admissible() {
        for board in sample_boards() {
            let distances = true_distances(&board);
            assert!(!distances.is_empty());
            for b in reachable(&board) {
                if let Some(&d) = distances.get(&b.to_string()) {
                    assert!(blocking_pieces(&b) <= d, "h > {} on\n{}", d, b);
                }
            }
        }
    }

    #[test]
    fn test_blocking_pieces_admissible_on_scrambles() {
        let base = sample_boards().remove(1);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..5 {
            let board = scramble(&base, 12, &mut rng);
            let distances = true_distances(&board);
            if let Some(&d) = distances.get(&board.to_string()) {
                assert!(blocking_pieces(&board) <= d);
            }
        }
    }

    #[test]
    fn test_blocking_pieces_consistent() {
        for board in sample_boards() {
            for b in reachable(&board).into_iter().filter(|b| !b.is_win()) {
                let h = blocking_pieces(&b);
                let root = Arc::new(GameState::new(b));
                for mv in root.possible_moves() {
                    let child: GameState = root.apply_move(&mv).unwrap();
                    let h_child = blocking_pieces(child.board());
                    assert!(h <= h_child + 1, "move {} drops h by more than one", mv);
                }
            }
        }
    }
}
