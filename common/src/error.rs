//! Error types for the minesweeper crate

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("point ({x}, {y}) is outside the {width}x{height} board")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("board dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("mine count {mines} must be less than the number of tiles ({cells})")]
    InvalidMineCount { mines: usize, cells: usize },

    #[error("game already over")]
    GameOver,

    #[error("invalid symbol '{symbol}' at ({x}, {y})")]
    InvalidSymbol { symbol: char, x: usize, y: usize },

    #[error("snapshot row {row} has {got} symbols, expected {expected}")]
    RaggedSnapshot {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("snapshot has no tiles")]
    EmptySnapshot,

    #[error("inconsistent board state: {0}")]
    InconsistentState(&'static str),

    #[error("state codec error: {0}")]
    Codec(#[from] bcs::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
