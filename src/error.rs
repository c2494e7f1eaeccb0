use crate::solver::Strategy;

/// Errors that can occur while turning puzzle text into a `Board`.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("missing header line '<rows> <cols>'")]
    MissingHeader,

    #[error("missing piece count line")]
    MissingPieceCount,

    #[error("invalid number '{0}' in header")]
    InvalidNumber(String),

    #[error("board must have at least one row and one column")]
    EmptyBoard,

    #[error("expected a {rows}x{cols} grid, found {found}")]
    DimensionMismatch {
        rows: usize,
        cols: usize,
        found: String,
    },

    #[error("invalid cell {ch:?} at row {row}, column {col}")]
    InvalidCell { row: usize, col: usize, ch: char },

    #[error("no primary piece 'P' on the board")]
    MissingPrimary,

    #[error("more than one exit marker 'K'")]
    MultipleExits,

    #[error("exit marker at ({row}, {col}) is not on or next to the grid border")]
    InvalidExit { row: i32, col: i32 },

    #[error("piece '{0}' is not a straight, contiguous run of cells")]
    BrokenPiece(char),

    #[error("header declares {expected} pieces besides the primary, found {found}")]
    PieceCountMismatch { expected: usize, found: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that reject a solve request before any search starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolveError {
    #[error("strategy {strategy} requires a heuristic")]
    MissingHeuristic { strategy: Strategy },
}
