//! The read-only symbol grid handed from the board to the bot.

use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::{Point, neighbors};

/// The visible state of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Hidden,
    Flagged,
    /// A revealed safe tile showing its adjacent mine count.
    Revealed(u8),
    /// A revealed mine. Only shows up once the game is lost.
    Mine,
}

impl Cell {
    /// The single-character symbol used in renderings and textual snapshots.
    pub fn symbol(self) -> char {
        match self {
            Cell::Hidden => '-',
            Cell::Flagged => 'B',
            Cell::Revealed(n) => char::from(b'0' + n.min(8)),
            Cell::Mine => 'X',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Cell> {
        match symbol {
            '-' => Some(Cell::Hidden),
            'B' => Some(Cell::Flagged),
            'X' => Some(Cell::Mine),
            '0'..='8' => Some(Cell::Revealed(symbol as u8 - b'0')),
            _ => None,
        }
    }
}

/// An owned copy of the visible board, indexed as `cells[y][x]`.
///
/// Always rectangular and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    width: usize,
    height: usize,
    cells: Vec<Vec<Cell>>,
}

impl Snapshot {
    /// Callers guarantee `cells` is rectangular and non-empty.
    pub(crate) fn from_rows(cells: Vec<Vec<Cell>>) -> Self {
        Snapshot {
            width: cells.first().map_or(0, Vec::len),
            height: cells.len(),
            cells,
        }
    }

    /// Parses rows of symbols (`-`, `B`, `X`, `0`-`8`). Whitespace inside a row is ignored,
    /// so the output of [`crate::Board::render`] without coordinates parses back.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let mut cells = Vec::with_capacity(rows.len());

        for (y, row) in rows.iter().enumerate() {
            let parsed = row
                .as_ref()
                .chars()
                .filter(|c| !c.is_whitespace())
                .enumerate()
                .map(|(x, symbol)| {
                    Cell::from_symbol(symbol).ok_or(Error::InvalidSymbol { symbol, x, y })
                })
                .collect::<Result<Vec<Cell>>>()?;
            cells.push(parsed);
        }

        let expected = cells.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(Error::EmptySnapshot);
        }
        if let Some((row, got)) = cells
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != expected)
        {
            return Err(Error::RaggedSnapshot { row, expected, got });
        }

        Ok(Snapshot::from_rows(cells))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    pub fn get(&self, at: Point) -> Option<Cell> {
        self.cells.get(at.y).and_then(|row| row.get(at.x)).copied()
    }

    /// Every coordinate, row by row.
    pub fn points(&self) -> impl Iterator<Item = Point> + use<> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Point::new(x, y)))
    }

    pub fn neighbors(&self, at: Point) -> impl Iterator<Item = Point> + use<> {
        neighbors(at, self.width, self.height)
    }

    /// Number of tiles still hidden and unflagged.
    pub fn hidden_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell == Cell::Hidden)
            .count()
    }
}

impl Index<Point> for Snapshot {
    type Output = Cell;

    fn index(&self, at: Point) -> &Cell {
        &self.cells[at.y][at.x]
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for cell in row {
                write!(f, "{}", cell.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
