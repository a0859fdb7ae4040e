//! A minesweeper board engine and a rule-based bot that plays it.
//!
//! The [`Board`] owns the minefield: mines are placed lazily on the first
//! action so the opening click is always safe, reveals cascade across
//! zero tiles, and win/loss is tracked after every reveal. The [`Bot`] only
//! ever sees a [`Snapshot`] of visible symbols and answers with one
//! [`Move`] at a time.

use itertools::iproduct;

pub mod board;
pub mod config;
pub mod error;
pub mod snapshot;
pub mod solver;

pub use board::{Board, GameState, Tile};
pub use config::GameConfig;
pub use error::{Error, Result};
pub use snapshot::{Cell, Snapshot};
pub use solver::{Bot, Move, Reason, WeightAnalysis, deduce_moves, weigh_moves};

/// Represents a 2D coordinate on the minesweeper board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Point { x, y }
    }

    /// True if `other` is this point or one of its 8 neighbours.
    pub fn touches(self, other: Point) -> bool {
        self.x.abs_diff(other.x) <= 1 && self.y.abs_diff(other.y) <= 1
    }
}

/// What a player (or the bot) does to a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Action {
    Reveal,
    /// Toggles the flag: flagging a flagged tile removes the flag.
    Flag,
}

/// All valid neighbour coordinates of `point` on a `width` x `height` grid.
///
/// Walks the 3x3 block around the point row by row, skipping the point
/// itself and anything past the board edges.
pub fn neighbors(point: Point, width: usize, height: usize) -> impl Iterator<Item = Point> {
    iproduct!(-1isize..=1, -1isize..=1).filter_map(move |(dy, dx)| {
        if dx == 0 && dy == 0 {
            return None;
        }

        let nx = point.x as isize + dx;
        let ny = point.y as isize + dy;

        if nx >= 0 && nx < width as isize && ny >= 0 && ny < height as isize {
            Some(Point::new(nx as usize, ny as usize))
        } else {
            None
        }
    })
}
