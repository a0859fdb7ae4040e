//! Game parameters fixed at board construction.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Dimensions and mine count of a single game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub mines: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: 9,
            height: 9,
            mines: 10,
        }
    }
}

impl GameConfig {
    pub fn new(width: usize, height: usize, mines: usize) -> Self {
        GameConfig {
            width,
            height,
            mines,
        }
    }

    /// Total number of tiles, or `None` if the board is empty or too large to address.
    pub fn cells(&self) -> Option<usize> {
        self.width
            .checked_mul(self.height)
            .filter(|&cells| cells > 0)
    }

    /// Checks that the board has tiles and that the mines leave at least one of them free.
    ///
    /// A full board would make mine placement spin forever, so it is rejected here.
    pub fn validate(&self) -> Result<usize> {
        let cells = self.cells().ok_or(Error::InvalidDimensions {
            width: self.width,
            height: self.height,
        })?;
        if self.mines >= cells {
            return Err(Error::InvalidMineCount {
                mines: self.mines,
                cells,
            });
        }
        Ok(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_classic_beginner_board() {
        let config = GameConfig::default();
        assert_eq!(config, GameConfig::new(9, 9, 10));
        assert_eq!(config.validate().unwrap(), 81);
    }

    #[test]
    fn test_rejects_empty_board() {
        let err = GameConfig::new(0, 5, 0).validate().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidDimensions {
                width: 0,
                height: 5
            }
        ));
    }

    #[test]
    fn test_rejects_full_board() {
        let err = GameConfig::new(3, 3, 9).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidMineCount { mines: 9, cells: 9 }));

        // One free tile is enough
        assert!(GameConfig::new(3, 3, 8).validate().is_ok());
    }

    #[test]
    fn test_rejects_overflowing_dimensions() {
        let err = GameConfig::new(usize::MAX, 2, 1).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { .. }));
    }
}
