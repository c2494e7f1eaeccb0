//! Core puzzle model for Rush Hour.
//!
//! This module defines the puzzle's fundamental components:
//! - `Piece`: A vehicle with a fixed orientation, a length and an anchor cell.
//! - `Board`: The grid, its vehicles and the exit, with the win test and move generation.
//! - `Move`: A single slide of one vehicle in one direction.
//! - `GameState`: A node of the search tree (board snapshot, parent link, move, cost).
use std::fmt;
use std::sync::Arc;

/// Character used for an empty cell in textual boards.
pub const EMPTY: char = '.';
/// Identifier of the primary piece.
pub const PRIMARY_ID: char = 'P';
/// Character marking the exit in textual boards.
pub const EXIT_MARKER: char = 'K';

/// The axis a piece is allowed to slide along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// The piece slides left and right.
    Horizontal,
    /// The piece slides up and down.
    Vertical,
}

/// One of the four slide directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns the `(row, col)` offset of a single step in this direction.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Returns the orientation a piece must have to move in this direction.
    pub fn orientation(&self) -> Orientation {
        match self {
            Direction::Up | Direction::Down => Orientation::Vertical,
            Direction::Left | Direction::Right => Orientation::Horizontal,
        }
    }

    /// `true` for directions that increase the coordinate (`Down`, `Right`).
    pub fn is_forward(&self) -> bool {
        matches!(self, Direction::Down | Direction::Right)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        })
    }
}

/// A vehicle on the board.
///
/// A piece occupies `size` consecutive cells along its orientation, starting at its anchor
/// (`row`, `col`). The anchor is signed because the primary piece may hang off the grid
/// after an exit move.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    id: char,
    is_primary: bool,
    orientation: Orientation,
    size: usize,
    row: i32,
    col: i32,
}

impl Piece {
    /// Creates a new piece. `size` is clamped to at least 1.
    pub fn new(
        id: char,
        is_primary: bool,
        orientation: Orientation,
        size: usize,
        row: i32,
        col: i32,
    ) -> Self {
        Piece {
            id,
            is_primary,
            orientation,
            size: size.max(1),
            row,
            col,
        }
    }

    pub fn id(&self) -> char {
        self.id
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn is_horizontal(&self) -> bool {
        self.orientation == Orientation::Horizontal
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn row(&self) -> i32 {
        self.row
    }

    pub fn col(&self) -> i32 {
        self.col
    }

    /// Coordinate of the anchor along the movable axis (column if horizontal, row if vertical).
    pub fn axis_start(&self) -> i32 {
        match self.orientation {
            Orientation::Horizontal => self.col,
            Orientation::Vertical => self.row,
        }
    }

    /// Coordinate of the last occupied cell along the movable axis.
    pub fn axis_end(&self) -> i32 {
        self.axis_start() + self.size as i32 - 1
    }

    /// Iterates over the `(row, col)` cells covered by this piece, anchor first.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (dr, dc) = match self.orientation {
            Orientation::Horizontal => (0, 1),
            Orientation::Vertical => (1, 0),
        };
        (0..self.size as i32).map(move |s| (self.row + dr * s, self.col + dc * s))
    }

    fn shift(&mut self, direction: Direction, steps: u32) {
        let (dr, dc) = direction.delta();
        self.row += dr * steps as i32;
        self.col += dc * steps as i32;
    }
}

/// A slide of one piece by `steps` cells in `direction`.
///
/// The piece is referenced by identifier and resolved against whichever board the move is
/// applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    piece_id: char,
    direction: Direction,
    steps: u32,
}

impl Move {
    pub fn new(piece_id: char, direction: Direction, steps: u32) -> Self {
        Move {
            piece_id,
            direction,
            steps,
        }
    }

    pub fn piece_id(&self) -> char {
        self.piece_id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} {}", self.piece_id, self.direction, self.steps)
    }
}

/// Canonical identity of a board configuration.
///
/// Holds the movable-axis coordinate of every piece in board-insertion order. The fixed axis
/// of a piece never changes, so two boards of the same puzzle have equal keys exactly when
/// their grids print identically.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StateKey(Box<[i32]>);

/// Represents the Rush Hour board: its grid, vehicles and exit.
///
/// The grid is derived data: it is rebuilt from the piece list by `update_grid`, which every
/// mutating method calls. `Clone` is a full deep copy, pieces included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    grid: Vec<Option<char>>,
    pieces: Vec<Piece>,
    exit_row: i32,
    exit_col: i32,
}

impl Board {
    /// Builds a board from raw cell contents.
    ///
    /// Cells holding `EMPTY` are empty, `PRIMARY_ID` marks the primary piece, `EXIT_MARKER`
    /// marks an in-grid exit (the cell itself is empty), and any other character is a vehicle
    /// identifier. Same-identifier cells are grouped into one piece; pieces keep the order
    /// in which they first appear in a row-major scan. The first cell of a group is the
    /// anchor and the piece is horizontal unless its first two cells share a column.
    ///
    /// # Arguments
    /// * `cells`: Rows of cell characters. Short rows are padded with empty cells.
    /// * `exit`: The `(exit_row, exit_col)` location, where `-1`, `rows` or `cols` mean one
    ///   step beyond that border. When `None`, an in-grid `EXIT_MARKER` is used if present,
    ///   otherwise the border beyond the primary piece's far end (right for a horizontal
    ///   primary, bottom for a vertical one).
    ///
    /// This does not validate the input; see `utils::board_from_str_array` for that.
    pub fn initialize(cells: &[Vec<char>], exit: Option<(i32, i32)>) -> Self {
        let rows = cells.len();
        let cols = cells.iter().map(Vec::len).max().unwrap_or(0);
        let mut groups: Vec<(char, Vec<(i32, i32)>)> = Vec::new();
        let mut marker = None;

        for (r, row) in cells.iter().enumerate() {
            for (c, &ch) in row.iter().enumerate() {
                let pos = (r as i32, c as i32);
                match ch {
                    EMPTY => {}
                    EXIT_MARKER => marker = marker.or(Some(pos)),
                    id => match groups.iter_mut().find(|(gid, _)| *gid == id) {
                        Some((_, positions)) => positions.push(pos),
                        None => groups.push((id, vec![pos])),
                    },
                }
            }
        }

        let pieces = groups
            .into_iter()
            .map(|(id, mut positions)| {
                positions.sort_unstable();
                let (row, col) = positions[0];
                let orientation = match positions.get(1) {
                    Some(&(second_row, _)) if second_row != row => Orientation::Vertical,
                    _ => Orientation::Horizontal,
                };
                Piece::new(id, id == PRIMARY_ID, orientation, positions.len(), row, col)
            })
            .collect();

        let mut board = Board {
            rows,
            cols,
            grid: vec![None; rows * cols],
            pieces,
            exit_row: -1,
            exit_col: -1,
        };
        if let Some((exit_row, exit_col)) = exit.or(marker).or_else(|| board.default_exit()) {
            board.exit_row = exit_row;
            board.exit_col = exit_col;
        }
        board.update_grid();
        board
    }

    fn default_exit(&self) -> Option<(i32, i32)> {
        self.primary_piece().map(|primary| {
            if primary.is_horizontal() {
                (primary.row(), self.cols as i32)
            } else {
                (self.rows as i32, primary.col())
            }
        })
    }

    /// Rebuilds the cell grid from the current piece positions.
    ///
    /// Idempotent. Cells of a piece that lie outside the grid (the primary piece after an exit
    /// move) are clipped.
    pub fn update_grid(&mut self) {
        self.grid.iter_mut().for_each(|cell| *cell = None);
        for piece in &self.pieces {
            for (r, c) in piece.cells() {
                if let Some(idx) = self.index(r, c) {
                    self.grid[idx] = Some(piece.id());
                }
            }
        }
    }

    fn index(&self, r: i32, c: i32) -> Option<usize> {
        if self.in_bounds(r, c) {
            Some(r as usize * self.cols + c as usize)
        } else {
            None
        }
    }

    /// Returns `true` if `(r, c)` is a cell of the grid.
    pub fn in_bounds(&self, r: i32, c: i32) -> bool {
        r >= 0 && c >= 0 && (r as usize) < self.rows && (c as usize) < self.cols
    }

    /// Returns `true` if `(r, c)` is inside the grid and unoccupied.
    pub fn is_empty_at(&self, r: i32, c: i32) -> bool {
        self.index(r, c).map_or(false, |idx| self.grid[idx].is_none())
    }

    /// Returns the identifier of the piece at row `r`, column `c`, or `None` for an empty cell.
    ///
    /// # Panics
    /// Panics if `r` or `c` are outside the board dimensions.
    pub fn cell(&self, r: usize, c: usize) -> Option<char> {
        assert!(r < self.rows && c < self.cols, "cell ({r}, {c}) out of bounds");
        self.grid[r * self.cols + c]
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the exit location as `(exit_row, exit_col)`.
    pub fn exit(&self) -> (i32, i32) {
        (self.exit_row, self.exit_col)
    }

    /// Returns the pieces in board-insertion order.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: char) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id() == id)
    }

    pub fn primary_piece(&self) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.is_primary())
    }

    /// Returns a fully independent deep copy of the board.
    pub fn copy(&self) -> Board {
        self.clone()
    }

    /// Returns the canonical key of the current configuration.
    pub fn key(&self) -> StateKey {
        StateKey(self.pieces.iter().map(Piece::axis_start).collect())
    }

    /// Exit coordinate and grid span along the primary piece's axis.
    pub(crate) fn exit_on_axis(&self, piece: &Piece) -> (i32, i32) {
        match piece.orientation() {
            Orientation::Horizontal => (self.exit_col, self.cols as i32),
            Orientation::Vertical => (self.exit_row, self.rows as i32),
        }
    }

    /// Returns `true` if the piece's fixed coordinate matches the exit's row or column.
    pub(crate) fn is_aligned_with_exit(&self, piece: &Piece) -> bool {
        match piece.orientation() {
            Orientation::Horizontal => piece.row() == self.exit_row,
            Orientation::Vertical => piece.col() == self.exit_col,
        }
    }

    /// Checks whether the primary piece has reached the exit.
    ///
    /// The primary must be aligned with the exit. For an exit beyond the far border its
    /// leading edge must reach the last cell before the border; for one beyond the near
    /// border its trailing edge must reach the first cell. For an in-grid exit the piece must
    /// reach or pass the exit cell, approaching from the side opposite to the border the exit
    /// faces (see `exit_faces_far`).
    ///
    /// # Returns
    /// `false` if there is no primary piece.
    pub fn is_win(&self) -> bool {
        let Some(primary) = self.primary_piece() else {
            return false;
        };
        if !self.is_aligned_with_exit(primary) {
            return false;
        }
        let (exit, span) = self.exit_on_axis(primary);
        if exit >= span {
            primary.axis_end() >= span - 1
        } else if exit < 0 {
            primary.axis_start() <= 0
        } else if exit_faces_far(exit, span) {
            primary.axis_end() >= exit
        } else {
            primary.axis_start() <= exit
        }
    }

    /// Generates the legal moves of this board.
    ///
    /// Pieces are visited in insertion order and, for each piece, the backward direction
    /// (`Left` or `Up`) comes before the forward one. Only the maximal slide per direction is
    /// emitted. The primary piece additionally gets a single-step move off the grid when it is
    /// aligned with an off-grid exit and touches the border next to it.
    pub fn possible_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        for piece in &self.pieces {
            let directions = match piece.orientation() {
                Orientation::Horizontal => [Direction::Left, Direction::Right],
                Orientation::Vertical => [Direction::Up, Direction::Down],
            };
            for direction in directions {
                let free = self.free_run(piece, direction);
                if free > 0 {
                    moves.push(Move::new(piece.id(), direction, free));
                }
                if piece.is_primary() && self.touches_off_grid_exit(piece, direction) {
                    moves.push(Move::new(piece.id(), direction, 1));
                }
            }
        }
        moves
    }

    /// Number of empty cells between the piece and the first obstacle in `direction`.
    fn free_run(&self, piece: &Piece, direction: Direction) -> u32 {
        let (dr, dc) = direction.delta();
        let offset = if direction.is_forward() {
            piece.size() as i32
        } else {
            1
        };
        let (mut r, mut c) = (piece.row() + dr * offset, piece.col() + dc * offset);
        let mut free = 0;
        while self.is_empty_at(r, c) {
            free += 1;
            r += dr;
            c += dc;
        }
        free
    }

    fn touches_off_grid_exit(&self, piece: &Piece, direction: Direction) -> bool {
        if direction.orientation() != piece.orientation() || !self.is_aligned_with_exit(piece) {
            return false;
        }
        let (exit, span) = self.exit_on_axis(piece);
        if direction.is_forward() {
            exit == span && piece.axis_end() == span - 1
        } else {
            exit == -1 && piece.axis_start() == 0
        }
    }

    /// Slides the piece named by `mv` and rebuilds the grid.
    ///
    /// No legality check is made: `mv` is expected to come from `possible_moves`.
    ///
    /// # Returns
    /// `false` if no piece with the move's identifier exists (the board is left unchanged).
    pub fn apply_move(&mut self, mv: &Move) -> bool {
        let Some(piece) = self.pieces.iter_mut().find(|p| p.id() == mv.piece_id()) else {
            return false;
        };
        piece.shift(mv.direction(), mv.steps());
        self.update_grid();
        true
    }

    /// Generates a string representation of the board with ANSI colours.
    ///
    /// The exit marker is drawn at its location: beside the grid for off-grid exits (a
    /// leading column for a left exit, an extra line for top or bottom exits) or in its
    /// cell for in-grid exits. The primary piece is red, the piece named by `moved` is
    /// yellow and the exit is green. `Display` gives the same layout without colours.
    pub fn to_string_with_highlight(&self, moved: Option<char>) -> String {
        self.render(true, moved)
    }

    fn render(&self, color: bool, moved: Option<char>) -> String {
        let paint = |ch: char, code: &str| {
            if color {
                format!("\x1b[{}m{}\x1b[0m", code, ch)
            } else {
                ch.to_string()
            }
        };
        let left_exit = self.exit_col == -1 && (0..self.rows as i32).contains(&self.exit_row);
        let pad = if left_exit { 1 } else { 0 };
        let marker_line = |col: i32| {
            let mut line = " ".repeat((col + pad).max(0) as usize);
            line.push_str(&paint(EXIT_MARKER, "32"));
            line
        };

        let mut lines = Vec::with_capacity(self.rows + 2);
        if self.exit_row == -1 {
            lines.push(marker_line(self.exit_col));
        }
        for r in 0..self.rows {
            let mut line = String::new();
            if left_exit {
                line.push_str(&if self.exit_row == r as i32 {
                    paint(EXIT_MARKER, "32")
                } else {
                    " ".to_string()
                });
            }
            for c in 0..self.cols {
                line.push_str(&match self.cell(r, c) {
                    Some(id) if id == PRIMARY_ID => paint(id, "31"),
                    Some(id) if Some(id) == moved => paint(id, "33"),
                    Some(id) => id.to_string(),
                    None if (r as i32, c as i32) == (self.exit_row, self.exit_col) => {
                        paint(EXIT_MARKER, "32")
                    }
                    None => EMPTY.to_string(),
                });
            }
            if self.exit_row == r as i32 && self.exit_col == self.cols as i32 {
                line.push_str(&paint(EXIT_MARKER, "32"));
            }
            lines.push(line);
        }
        if self.exit_row == self.rows as i32 {
            lines.push(marker_line(self.exit_col));
        }
        lines.join("\n")
    }
}

/// Returns `true` if an exit at `exit` along an axis of length `span` faces the far border.
///
/// Off-grid exits face the border they lie beyond. An in-grid exit faces the nearer border,
/// with the middle cell of an odd span counting as far.
pub fn exit_faces_far(exit: i32, span: i32) -> bool {
    if exit >= span {
        true
    } else if exit < 0 {
        false
    } else {
        2 * exit >= span - 1
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false, None))
    }
}

/// A node of the search tree.
///
/// A `GameState` owns its board snapshot and shares its parent read-only, so the states of one
/// search form a tree rooted at the initial state. States are immutable once built; two states
/// compare equal when their boards have the same `StateKey`.
#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,
    key: StateKey,
    parent: Option<Arc<GameState>>,
    last_move: Option<Move>,
    cost: u32,
}

impl GameState {
    /// Creates a root state (cost 0, no parent, no move).
    pub fn new(board: Board) -> Self {
        GameState {
            key: board.key(),
            board,
            parent: None,
            last_move: None,
            cost: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn key(&self) -> &StateKey {
        &self.key
    }

    pub fn parent(&self) -> Option<&GameState> {
        self.parent.as_deref()
    }

    /// The move that produced this state; `None` at the root.
    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    /// Path cost `g`: the number of moves from the root.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn is_goal(&self) -> bool {
        self.board.is_win()
    }

    pub fn possible_moves(&self) -> Vec<Move> {
        self.board.possible_moves()
    }

    /// Builds the child state reached by applying `mv` to a copy of this state's board.
    ///
    /// # Returns
    /// `None` if the move names a piece that does not exist on this board.
    pub fn apply_move(self: &Arc<Self>, mv: &Move) -> Option<GameState> {
        let mut board = self.board.copy();
        if !board.apply_move(mv) {
            return None;
        }
        Some(GameState {
            key: board.key(),
            board,
            parent: Some(Arc::clone(self)),
            last_move: Some(*mv),
            cost: self.cost + 1,
        })
    }

    /// Returns the states from the root to this one, root first.
    pub fn solution_path(&self) -> Vec<&GameState> {
        let mut path: Vec<&GameState> =
            std::iter::successors(Some(self), |state| state.parent()).collect();
        path.reverse();
        path
    }

    /// Returns the moves from the root to this state, in order.
    pub fn moves(&self) -> Vec<Move> {
        self.solution_path()
            .iter()
            .filter_map(|state| state.last_move())
            .collect()
    }
}

impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for GameState {}

impl std::hash::Hash for GameState {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::board_from_str_array;

    fn blocked_board() -> Board {
        board_from_str_array(&[
            "......", //
            "...A..",
            "PP.A..K",
            "......",
            "......",
            "......",
        ])
        .unwrap()
    }

    #[test]
    fn test_initialize_groups_pieces() {
        let board = blocked_board();
        assert_eq!(board.rows(), 6);
        assert_eq!(board.cols(), 6);
        assert_eq!(board.pieces().len(), 2);

        let blocker = &board.pieces()[0];
        assert_eq!(blocker.id(), 'A');
        assert_eq!(blocker.orientation(), Orientation::Vertical);
        assert_eq!((blocker.row(), blocker.col(), blocker.size()), (1, 3, 2));

        let primary = board.primary_piece().unwrap();
        assert!(primary.is_primary());
        assert!(primary.is_horizontal());
        assert_eq!((primary.row(), primary.col(), primary.size()), (2, 0, 2));
        assert_eq!(board.exit(), (2, 6));
    }

    #[test]
    fn test_initialize_default_exit() {
        let cells: Vec<Vec<char>> = ["...", ".P.", ".P."]
            .iter()
            .map(|row| row.chars().collect())
            .collect();
        let board = Board::initialize(&cells, None);
        assert_eq!(board.exit(), (3, 1), "vertical primary exits at the bottom");

        let cells: Vec<Vec<char>> = ["...", "PP.", "..."]
            .iter()
            .map(|row| row.chars().collect())
            .collect();
        let board = Board::initialize(&cells, None);
        assert_eq!(board.exit(), (1, 3), "horizontal primary exits on the right");
    }

    #[test]
    fn test_initialize_in_grid_marker() {
        let cells: Vec<Vec<char>> = ["PP.K"].iter().map(|row| row.chars().collect()).collect();
        let board = Board::initialize(&cells, None);
        assert_eq!(board.exit(), (0, 3));
        assert_eq!(board.cell(0, 3), None);
    }

    #[test]
    fn test_update_grid_is_idempotent() {
        let mut board = blocked_board();
        let before = board.clone();
        board.update_grid();
        board.update_grid();
        assert_eq!(board, before);
        assert_eq!(board.cell(1, 3), Some('A'));
        assert_eq!(board.cell(2, 3), Some('A'));
        assert_eq!(board.cell(2, 1), Some('P'));
        assert_eq!(board.cell(0, 0), None);
    }

    #[test]
    fn test_copy_is_independent() {
        let board = blocked_board();
        let mut copy = board.copy();
        assert!(copy.apply_move(&Move::new('A', Direction::Down, 3)));
        assert_eq!(board.piece('A').unwrap().row(), 1);
        assert_eq!(copy.piece('A').unwrap().row(), 4);
        assert_eq!(board.cell(1, 3), Some('A'));
        assert_eq!(copy.cell(1, 3), None);
    }

    #[test]
    fn test_apply_move_unknown_piece() {
        let mut board = blocked_board();
        let before = board.clone();
        assert!(!board.apply_move(&Move::new('Z', Direction::Up, 1)));
        assert_eq!(board, before);
    }

    #[test]
    fn test_is_win_far_border_exit() {
        let board = board_from_str_array(&["....PPK", "......"]).unwrap();
        assert_eq!(board.exit(), (0, 6));
        assert!(board.is_win());
        let board = board_from_str_array(&["...PP.K", "......"]).unwrap();
        assert!(!board.is_win());
    }

    #[test]
    fn test_is_win_near_border_exit() {
        let board = board_from_str_array(&["KPP....", "......"]).unwrap();
        assert_eq!(board.exit(), (0, -1));
        assert!(board.is_win());
        let board = board_from_str_array(&["K.PP...", "......"]).unwrap();
        assert!(!board.is_win());
    }

    #[test]
    fn test_is_win_vertical_exits() {
        let board = board_from_str_array(&[" K", "...", ".P.", ".P."]).unwrap();
        assert_eq!(board.exit(), (-1, 1));
        assert!(!board.is_win());

        let board = board_from_str_array(&[".P.", ".P.", "...", " K"]).unwrap();
        assert_eq!(board.exit(), (3, 1));
        assert!(!board.is_win());

        let board = board_from_str_array(&["...", ".P.", ".P.", " K"]).unwrap();
        assert!(board.is_win());
    }

    #[test]
    fn test_is_win_interior_exit_requires_reaching_cell() {
        // Exit embedded in the last column faces the right border.
        let board = board_from_str_array(&["PP...K", "......"]).unwrap();
        assert_eq!(board.exit(), (0, 5));
        assert!(!board.is_win());
        let board = board_from_str_array(&["...PPK", "......"]).unwrap();
        assert!(!board.is_win());
        let board = board_from_str_array(&["....PP", "K....."]).unwrap();
        assert!(!board.is_win(), "exit on another row is not aligned");

        // Exit embedded in the first column faces the left border.
        let board = board_from_str_array(&["K..PP.", "......"]).unwrap();
        assert_eq!(board.exit(), (0, 0));
        assert!(!board.is_win());
    }

    #[test]
    fn test_is_win_interior_exit_reached() {
        let mut board = board_from_str_array(&["PP..K.", "......"]).unwrap();
        assert!(!board.is_win());
        assert!(board.apply_move(&Move::new('P', Direction::Right, 4)));
        assert!(board.is_win(), "passing over the exit cell counts");
    }

    #[test]
    fn test_is_win_misaligned_exit() {
        let board = board_from_str_array(&["....PP", "......K"]).unwrap();
        assert_eq!(board.exit(), (1, 6));
        assert!(!board.is_win());
    }

    #[test]
    fn test_possible_moves_order_and_maximal_steps() {
        let board = blocked_board();
        let moves = board.possible_moves();
        assert_eq!(
            moves,
            vec![
                Move::new('A', Direction::Up, 1),
                Move::new('A', Direction::Down, 3),
                Move::new('P', Direction::Right, 1),
            ]
        );
    }

    #[test]
    fn test_possible_moves_piece_without_room() {
        let board = board_from_str_array(&["APB", "APB", "CCC"]).unwrap();
        assert!(board.possible_moves().is_empty());
    }

    #[test]
    fn test_possible_moves_exit_move_when_aligned() {
        let board = board_from_str_array(&["....PPK", "......"]).unwrap();
        assert_eq!(
            board.possible_moves(),
            vec![
                Move::new('P', Direction::Left, 4),
                Move::new('P', Direction::Right, 1),
            ]
        );

        let board = board_from_str_array(&["KPP....", "......"]).unwrap();
        assert_eq!(
            board.possible_moves(),
            vec![
                Move::new('P', Direction::Left, 1),
                Move::new('P', Direction::Right, 4),
            ]
        );
    }

    #[test]
    fn test_possible_moves_no_exit_move_when_misaligned() {
        let board = board_from_str_array(&["....PP", "......K"]).unwrap();
        assert_eq!(
            board.possible_moves(),
            vec![Move::new('P', Direction::Left, 4)]
        );
    }

    #[test]
    fn test_exit_move_leaves_grid() {
        let mut board = board_from_str_array(&["....PPK", "......"]).unwrap();
        assert!(board.apply_move(&Move::new('P', Direction::Right, 1)));
        assert_eq!(board.primary_piece().unwrap().col(), 5);
        assert_eq!(board.cell(0, 4), None);
        assert_eq!(board.cell(0, 5), Some('P'));
        assert!(board.is_win());
    }

    #[test]
    fn test_key_matches_grid_identity() {
        let board = blocked_board();
        let mut moved = board.copy();
        moved.apply_move(&Move::new('A', Direction::Down, 2));
        assert_ne!(board.key(), moved.key());
        moved.apply_move(&Move::new('A', Direction::Up, 2));
        assert_eq!(board.key(), moved.key());
        assert_eq!(board.to_string(), moved.to_string());
    }

    /// 3 x 65537 board: vertical primary and a one-cell blocker in the last column.
    fn wide_board() -> Board {
        let last = 65536;
        let row = |id: char| {
            let mut cells = vec![EMPTY; last];
            cells.push(id);
            cells
        };
        let cells = vec![row('P'), row('P'), row('B')];
        Board::initialize(&cells, Some((3, last as i32)))
    }

    #[test]
    fn test_key_distinguishes_far_coordinates() {
        let board = wide_board();
        let mut moved = board.copy();
        assert!(moved.apply_move(&Move::new('B', Direction::Left, 65536)));
        assert_eq!(moved.cell(2, 0), Some('B'));
        assert_ne!(board.to_string(), moved.to_string());
        assert_ne!(board.key(), moved.key());
    }

    #[test]
    fn test_game_state_apply_move() {
        let root = Arc::new(GameState::new(blocked_board()));
        assert_eq!(root.cost(), 0);
        assert!(root.parent().is_none());
        assert!(root.last_move().is_none());

        let mv = Move::new('A', Direction::Down, 2);
        let child = root.apply_move(&mv).unwrap();
        assert_eq!(child.cost(), 1);
        assert_eq!(child.last_move(), Some(mv));
        assert_eq!(child.parent().unwrap(), &*root);
        assert_ne!(&child, &*root);
        assert_eq!(root.board().piece('A').unwrap().row(), 1);

        assert!(root.apply_move(&Move::new('Z', Direction::Up, 1)).is_none());
    }

    #[test]
    fn test_solution_path_root_first() {
        let root = Arc::new(GameState::new(blocked_board()));
        let first = Move::new('A', Direction::Down, 2);
        let second = Move::new('P', Direction::Right, 4);
        let child = Arc::new(root.apply_move(&first).unwrap());
        let goal = child.apply_move(&second).unwrap();
        assert!(goal.is_goal());

        let path = goal.solution_path();
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], &*root);
        assert_eq!(path[2].cost(), 2);
        assert_eq!(goal.moves(), vec![first, second]);
        assert!(root.moves().is_empty());
    }

    #[test]
    fn test_display_board_formatting() {
        let board = blocked_board();
        let expected = "......\n...A..\nPP.A..K\n......\n......\n......";
        assert_eq!(board.to_string(), expected);

        let board = board_from_str_array(&[" K", "...", ".P.", ".P."]).unwrap();
        assert_eq!(board.to_string(), " K\n...\n.P.\n.P.");

        let board = board_from_str_array(&["KPP.", " .A."]).unwrap();
        assert_eq!(board.exit(), (0, -1));
        assert_eq!(board.to_string(), "KPP.\n .A.");

        let board = board_from_str_array(&["PP.K", "...."]).unwrap();
        assert_eq!(board.to_string(), "PP.K\n....");
    }

    #[test]
    fn test_highlight_uses_ansi() {
        let board = blocked_board();
        let highlighted = board.to_string_with_highlight(Some('A'));
        assert!(highlighted.contains("\x1b[31mP\x1b[0m"));
        assert!(highlighted.contains("\x1b[33mA\x1b[0m"));
        assert!(highlighted.contains("\x1b[32mK\x1b[0m"));
    }
}
