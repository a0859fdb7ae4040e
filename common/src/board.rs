//! The board engine: minefield, lazy mine placement, cascading reveal and win/loss tracking.

use std::collections::{HashSet, VecDeque};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{Error, Result};
use crate::snapshot::{Cell, Snapshot};
use crate::{Action, Point, neighbors};

const MINE: i8 = -1;

/// A single tile. `value` is the adjacent mine count, or -1 for a mine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    value: i8,
    revealed: bool,
    flagged: bool,
}

impl Tile {
    pub fn value(&self) -> i8 {
        self.value
    }

    pub fn is_mine(&self) -> bool {
        self.value < 0
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged
    }

    /// Flagged tiles stay hidden until the flag is removed.
    fn reveal(&mut self) -> bool {
        if self.flagged || self.revealed {
            return false;
        }
        self.revealed = true;
        true
    }

    /// What a player sees on this tile.
    pub fn cell(&self) -> Cell {
        match (self.revealed, self.flagged) {
            (false, true) => Cell::Flagged,
            (false, false) => Cell::Hidden,
            (true, _) if self.is_mine() => Cell::Mine,
            (true, _) => Cell::Revealed(self.value as u8),
        }
    }
}

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// The minefield. Tiles are stored row-major in a single vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    width: usize,
    height: usize,
    mines: usize,
    tiles: Vec<Tile>,
    /// Mines are placed on the first action, not at construction.
    initialized: bool,
    state: GameState,
    /// Revealed non-mine tiles. The game is won when this reaches `tiles.len() - mines`.
    revealed_safe: usize,
}

impl Board {
    /// Creates an empty board. Mines are placed on the first call to [`Board::act`].
    pub fn new(width: usize, height: usize, mines: usize) -> Result<Self> {
        Board::from_config(GameConfig::new(width, height, mines))
    }

    pub fn from_config(config: GameConfig) -> Result<Self> {
        let cells = config.validate()?;
        Ok(Board {
            width: config.width,
            height: config.height,
            mines: config.mines,
            tiles: vec![Tile::default(); cells],
            initialized: false,
            state: GameState::Playing,
            revealed_safe: 0,
        })
    }

    /// Creates a board with mines at exactly the given points, skipping random placement.
    /// Duplicate points count once.
    pub fn from_mines(width: usize, height: usize, mines: &[Point]) -> Result<Self> {
        let unique: HashSet<Point> = mines.iter().copied().collect();
        let mut board = Board::new(width, height, unique.len())?;

        for &at in &unique {
            let index = board.checked_index(at)?;
            board.tiles[index].value = MINE;
        }
        board.assign_values();
        board.initialized = true;

        Ok(board)
    }

    /// Applies `action` at `at` using the thread-local RNG for the first-move mine placement.
    pub fn act(&mut self, at: Point, action: Action) -> Result<()> {
        self.act_with_rng(at, action, &mut rand::rng())
    }

    /// Applies a player action.
    ///
    /// The first call places the mines, keeping `at` and its neighbours clear.
    /// Acting on a revealed tile does nothing, revealing a flagged tile does nothing,
    /// and flagging toggles. Acting after the game has ended is an error.
    pub fn act_with_rng<R: Rng + ?Sized>(
        &mut self,
        at: Point,
        action: Action,
        rng: &mut R,
    ) -> Result<()> {
        let index = self.checked_index(at)?;
        if self.state != GameState::Playing {
            return Err(Error::GameOver);
        }
        if !self.initialized {
            self.place_mines(at, rng);
        }

        let tile = self.tiles[index];
        if tile.revealed {
            return Ok(());
        }

        match action {
            Action::Reveal => {
                if !tile.flagged {
                    self.reveal_from(at);
                }
            }
            Action::Flag => self.tiles[index].flagged = !tile.flagged,
        }

        Ok(())
    }

    /// Scatters the mines by rejection sampling, avoiding `anchor` and its neighbours.
    ///
    /// When the board is too crowded to keep the whole 3x3 block clear, only the
    /// anchor itself is kept clear.
    fn place_mines<R: Rng + ?Sized>(&mut self, anchor: Point, rng: &mut R) {
        let zone = 1 + neighbors(anchor, self.width, self.height).count();
        let keep_block_clear = self.tiles.len() - zone >= self.mines;

        let mut remaining = self.mines;
        while remaining > 0 {
            let candidate = Point::new(
                rng.random_range(0..self.width),
                rng.random_range(0..self.height),
            );
            let excluded = if keep_block_clear {
                anchor.touches(candidate)
            } else {
                anchor == candidate
            };
            let index = self.index(candidate);
            if excluded || self.tiles[index].is_mine() {
                continue;
            }
            self.tiles[index].value = MINE;
            remaining -= 1;
        }

        self.assign_values();
        self.initialized = true;
    }

    /// Sets every non-mine tile to its adjacent mine count.
    fn assign_values(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                let at = Point::new(x, y);
                let index = self.index(at);
                if self.tiles[index].is_mine() {
                    continue;
                }
                let count = neighbors(at, self.width, self.height)
                    .filter(|&n| self.tiles[self.index(n)].is_mine())
                    .count();
                self.tiles[index].value = count as i8;
            }
        }
    }

    /// Reveals `start`, flooding outwards across zero tiles.
    ///
    /// Stops as soon as the game is decided: a mine ends it immediately and
    /// the last safe tile wins it even if the flood still has tiles queued.
    fn reveal_from(&mut self, start: Point) {
        let mut queue = VecDeque::from([start]);

        while let Some(at) = queue.pop_front() {
            let index = self.index(at);
            if !self.tiles[index].reveal() {
                continue;
            }

            let tile = self.tiles[index];
            if tile.is_mine() {
                self.finish(GameState::Lost);
                return;
            }

            self.revealed_safe += 1;
            if self.revealed_safe == self.tiles.len() - self.mines {
                self.finish(GameState::Won);
                return;
            }

            if tile.value == 0 {
                for neighbor in neighbors(at, self.width, self.height) {
                    let next = self.tiles[self.index(neighbor)];
                    if !next.revealed && !next.flagged {
                        queue.push_back(neighbor);
                    }
                }
            }
        }
    }

    /// Ends the game. A loss uncovers every mine that is not flagged.
    fn finish(&mut self, outcome: GameState) {
        self.state = outcome;
        if outcome == GameState::Lost {
            for tile in self.tiles.iter_mut().filter(|t| t.is_mine()) {
                tile.reveal();
            }
        }
    }

    fn index(&self, at: Point) -> usize {
        at.y * self.width + at.x
    }

    fn checked_index(&self, at: Point) -> Result<usize> {
        if at.x >= self.width || at.y >= self.height {
            return Err(Error::OutOfBounds {
                x: at.x,
                y: at.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.index(at))
    }

    /// Bounds-checked access to a tile, hidden state included.
    pub fn tile(&self, at: Point) -> Result<&Tile> {
        let index = self.checked_index(at)?;
        Ok(&self.tiles[index])
    }

    /// The visible board as an owned copy. Nothing in it aliases the live tiles.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_rows(
            self.tiles
                .chunks(self.width)
                .map(|row| row.iter().map(Tile::cell).collect())
                .collect(),
        )
    }

    /// Human-readable board, two spaces after each symbol.
    ///
    /// With `include_coords`, each row ends with its 1-based index and a final
    /// line lists the 1-based column indices.
    pub fn render(&self, include_coords: bool) -> String {
        let mut out = String::new();
        for (y, row) in self.tiles.chunks(self.width).enumerate() {
            for tile in row {
                out.push(tile.cell().symbol());
                out.push_str("  ");
            }
            if include_coords {
                out.push_str(&(y + 1).to_string());
            }
            out.push('\n');
        }
        if include_coords {
            for x in 0..self.width {
                out.push_str(&(x + 1).to_string());
                out.push_str("  ");
            }
        }
        out
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn mines(&self) -> usize {
        self.mines
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state != GameState::Playing
    }

    pub fn did_win(&self) -> bool {
        self.state == GameState::Won
    }

    /// Serializes the full board, mine layout included.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    /// Deserializes a board and checks it against its own tiles, so a tampered
    /// state is rejected here instead of breaking a later action.
    pub fn from_bytes(bts: &[u8]) -> Result<Self> {
        let board: Board = bcs::from_bytes(bts)?;
        let cells = GameConfig::new(board.width, board.height, board.mines).validate()?;
        if board.tiles.len() != cells {
            return Err(Error::InconsistentState("tile count does not match dimensions"));
        }

        let placed = board.tiles.iter().filter(|t| t.is_mine()).count();
        let revealed_safe = board
            .tiles
            .iter()
            .filter(|t| t.revealed && !t.is_mine())
            .count();

        if board.tiles.iter().any(|t| t.revealed && t.flagged) {
            return Err(Error::InconsistentState("tile is both revealed and flagged"));
        }
        if board.initialized && placed != board.mines {
            return Err(Error::InconsistentState("mine count does not match tiles"));
        }
        if !board.initialized && (placed > 0 || board.tiles.iter().any(|t| t.revealed)) {
            return Err(Error::InconsistentState("uninitialized board has mines or reveals"));
        }
        if revealed_safe != board.revealed_safe {
            return Err(Error::InconsistentState("revealed count does not match tiles"));
        }

        Ok(board)
    }
}
