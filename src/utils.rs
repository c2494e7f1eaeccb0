use crate::engine::{Board, EMPTY, EXIT_MARKER, PRIMARY_ID};
use crate::error::ParseError;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::path::Path;

/// Lines starting with this prefix before the header are ignored.
pub const COMMENT_PREFIX: &str = "//";

/// Largest row or column count a puzzle header may declare.
pub const MAX_DIMENSION: usize = i16::MAX as usize;

/// Parses an array of string slices into a `Board`, taking the dimensions from the lines.
///
/// Each string slice is one row of the grid, starting from row 0. `.` is an empty cell, `P` is
/// the primary piece and any other visible character is a vehicle identifier. Trailing
/// whitespace is ignored and short rows are padded with empty cells.
///
/// The exit marker `K` may appear:
/// - inside the grid: an interior exit, and the cell itself is empty;
/// - as one extra trailing character on a row: the exit is beyond the right border;
/// - as one extra leading character on a row: the exit is beyond the left border. Other rows
///   may then start with a single space so the columns line up;
/// - alone on a line before or after the grid: the exit is beyond the top or bottom border,
///   in the column of the `K`.
///
/// Without a marker the exit is beyond the border at the primary piece's far end.
///
/// # Arguments
/// * `s`: A slice of string slices (`&[&str]`) representing the rows of the board.
///
/// # Returns
/// * `Ok(Board)` if parsing is successful.
/// * `Err(ParseError)` if:
///     - The grid is empty, or a row holds whitespace or control characters.
///     - More than one `K` is present, or the exit is not on or next to the border.
///     - There is no primary piece.
///     - A piece is not a straight, contiguous run of cells.
///
/// # Examples
/// ```
/// use rush_hour_solver::utils::board_from_str_array;
///
/// let board = board_from_str_array(&[
///     "..A...",
///     "PPA...K",
///     "......",
/// ])
/// .unwrap();
/// assert_eq!((board.rows(), board.cols()), (3, 6));
/// assert_eq!(board.exit(), (1, 6));
/// assert_eq!(board.cell(0, 2), Some('A'));
/// assert_eq!(board.cell(2, 0), None);
///
/// assert!(board_from_str_array(&["PPK", "..K"]).is_err()); // two exits
/// assert!(board_from_str_array(&["AA..", "...."]).is_err()); // no primary
/// ```
pub fn board_from_str_array(s: &[&str]) -> Result<Board, ParseError> {
    let lines: Vec<&str> = s.iter().map(|line| line.trim_end()).collect();
    board_from_lines(&lines, None)
}

/// Parses a puzzle file's contents.
///
/// The format is optional `//` comment lines, a `<rows> <cols>` header, the number of pieces
/// besides the primary, and then the grid lines with the same exit marker rules as
/// `board_from_str_array`.
///
/// # Errors
/// Everything `board_from_str_array` rejects, plus a missing or malformed header, a grid that
/// does not match the header's dimensions, and a piece count that differs from the header.
/// Header dimensions above `MAX_DIMENSION` are rejected as `ParseError::InvalidNumber`.
pub fn parse_puzzle(content: &str) -> Result<Board, ParseError> {
    let mut lines = content.lines().map(str::trim_end);

    let header = next_content_line(&mut lines).ok_or(ParseError::MissingHeader)?;
    let dims = header
        .split_whitespace()
        .map(parse_number)
        .collect::<Result<Vec<_>, _>>()?;
    let &[rows, cols] = dims.as_slice() else {
        return Err(ParseError::InvalidNumber(header.trim().to_string()));
    };
    if let Some(&too_large) = dims.iter().find(|&&d| d > MAX_DIMENSION) {
        return Err(ParseError::InvalidNumber(too_large.to_string()));
    }

    let count_line = next_content_line(&mut lines).ok_or(ParseError::MissingPieceCount)?;
    let expected = parse_number(count_line.trim())?;

    let mut grid: Vec<&str> = lines.skip_while(|line| line.is_empty()).collect();
    while grid.last().map_or(false, |line| line.is_empty()) {
        grid.pop();
    }

    let board = board_from_lines(&grid, Some((rows, cols)))?;
    let found = board.pieces().iter().filter(|p| !p.is_primary()).count();
    if found != expected {
        return Err(ParseError::PieceCountMismatch { expected, found });
    }
    Ok(board)
}

/// Reads and parses a puzzle file. See `parse_puzzle` for the format.
pub fn read_puzzle_file(path: impl AsRef<Path>) -> Result<Board, ParseError> {
    let content = fs::read_to_string(path)?;
    parse_puzzle(&content)
}

fn next_content_line<'a>(lines: &mut impl Iterator<Item = &'a str>) -> Option<&'a str> {
    lines.find(|line| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with(COMMENT_PREFIX)
    })
}

fn parse_number(token: &str) -> Result<usize, ParseError> {
    token
        .parse()
        .map_err(|_| ParseError::InvalidNumber(token.to_string()))
}

fn is_marker_line(line: &str) -> bool {
    let mut chars = line.trim().chars();
    chars.next() == Some(EXIT_MARKER) && chars.next().is_none()
}

/// Widest row that carries no exit marker.
fn unmarked_width(rows: &[Vec<char>]) -> Option<usize> {
    rows.iter()
        .filter(|row| !row.contains(&EXIT_MARKER))
        .map(Vec::len)
        .max()
}

/// Shared by the file parser (`dims` from the header) and `board_from_str_array` (`dims`
/// inferred from the lines).
fn board_from_lines(lines: &[&str], dims: Option<(usize, usize)>) -> Result<Board, ParseError> {
    let markers: usize = lines.iter().map(|line| line.matches(EXIT_MARKER).count()).sum();
    if markers > 1 {
        return Err(ParseError::MultipleExits);
    }

    // Top or bottom marker line: (is_top, column).
    let mut grid_lines = lines.to_vec();
    let mut vertical = None;
    let marker_line_possible = match dims {
        Some((rows, _)) => lines.len() == rows + 1,
        None => lines.len() >= 2,
    };
    if marker_line_possible {
        let column = |line: &str| line.chars().take_while(|&c| c != EXIT_MARKER).count() as i32;
        if is_marker_line(grid_lines[0]) {
            vertical = Some((true, column(grid_lines.remove(0))));
        } else if grid_lines.last().map_or(false, |line| is_marker_line(line)) {
            let line = grid_lines.pop().unwrap_or_default();
            vertical = Some((false, column(line)));
        }
    }

    let mut rows: Vec<Vec<char>> = grid_lines.iter().map(|line| line.chars().collect()).collect();

    let base_cols = dims.map(|(_, cols)| cols).or_else(|| unmarked_width(&rows)).unwrap_or(0);
    let left = (0..rows.len()).find(|&i| {
        let row = &rows[i];
        let padded = rows.len() > 1
            && rows
                .iter()
                .enumerate()
                .all(|(j, other)| j == i || other.first() == Some(&' '));
        row.first() == Some(&EXIT_MARKER) && (row.len() == base_cols + 1 || padded)
    });
    let mut exit = None;
    if let Some(i) = left {
        for (j, row) in rows.iter_mut().enumerate() {
            if j == i || row.first() == Some(&' ') {
                row.remove(0);
            }
        }
        exit = Some((i as i32, -1));
    }

    let cols = match dims {
        Some((_, cols)) => cols,
        None => unmarked_width(&rows)
            .or_else(|| rows.iter().map(Vec::len).max())
            .unwrap_or(0),
    };

    for (r, row) in rows.iter_mut().enumerate() {
        if row.len() == cols + 1 && row.last() == Some(&EXIT_MARKER) {
            row.pop();
            exit = Some((r as i32, cols as i32));
        }
    }
    if let Some((is_top, col)) = vertical {
        let row = if is_top { -1 } else { rows.len() as i32 };
        exit = Some((row, col));
    }
    for (r, row) in rows.iter_mut().enumerate() {
        for (c, ch) in row.iter_mut().enumerate() {
            if *ch == EXIT_MARKER {
                *ch = EMPTY;
                exit = Some((r as i32, c as i32));
            }
        }
    }

    if rows.is_empty() || cols == 0 || dims.map_or(false, |(r, c)| r == 0 || c == 0) {
        return Err(ParseError::EmptyBoard);
    }
    if let Some((expected_rows, _)) = dims {
        if rows.len() != expected_rows {
            return Err(ParseError::DimensionMismatch {
                rows: expected_rows,
                cols,
                found: format!("{} rows", rows.len()),
            });
        }
    }
    for (r, row) in rows.iter_mut().enumerate() {
        if row.len() > cols {
            return Err(ParseError::DimensionMismatch {
                rows: dims.map_or(r + 1, |(rows, _)| rows),
                cols,
                found: format!("{} columns in row {}", row.len(), r),
            });
        }
        if let Some((c, &ch)) = row
            .iter()
            .enumerate()
            .find(|(_, ch)| ch.is_whitespace() || ch.is_control())
        {
            return Err(ParseError::InvalidCell { row: r, col: c, ch });
        }
        row.resize(cols, EMPTY);
    }

    if let Some((r, c)) = exit {
        let (height, width) = (rows.len() as i32, cols as i32);
        let row_outside = r < 0 || r >= height;
        let col_outside = c < 0 || c >= width;
        let adjacent = (-1..=height).contains(&r) && (-1..=width).contains(&c);
        if !adjacent || (row_outside && col_outside) {
            return Err(ParseError::InvalidExit { row: r, col: c });
        }
    }

    if !rows.iter().flatten().any(|&ch| ch == PRIMARY_ID) {
        return Err(ParseError::MissingPrimary);
    }

    let board = Board::initialize(&rows, exit);
    for (r, row) in rows.iter().enumerate() {
        for (c, &ch) in row.iter().enumerate() {
            let expected = (ch != EMPTY).then_some(ch);
            let actual = board.cell(r, c);
            if actual != expected {
                return Err(ParseError::BrokenPiece(expected.or(actual).unwrap_or(EMPTY)));
            }
        }
    }
    Ok(board)
}

/// Scrambles `board` with a random walk of up to `moves` legal moves.
///
/// Moves that would win are never taken, so the result is unsolved whenever the walk takes
/// at least one step. The walk stops early if no such move is available. The same `rng`
/// state always yields the same board.
pub fn scramble(board: &Board, moves: usize, rng: &mut impl Rng) -> Board {
    let mut current = board.copy();
    for _ in 0..moves {
        let candidates: Vec<Board> = current
            .possible_moves()
            .iter()
            .filter_map(|mv| {
                let mut next = current.copy();
                next.apply_move(mv);
                (!next.is_win()).then_some(next)
            })
            .collect();
        match candidates.choose(rng) {
            Some(next) => current = next.clone(),
            None => break,
        }
    }
    current
}
