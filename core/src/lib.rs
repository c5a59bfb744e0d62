use serde::{Deserialize, Serialize};

pub use board::*;
pub use error::*;
pub use rng::*;
pub use session::*;
pub use types::*;

mod board;
mod error;
mod rng;
mod session;
mod types;

/// Board dimensions plus mine count for one game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Validated constructor: at least one tile, strictly fewer mines than tiles.
    ///
    /// A safe first click may still be impossible on tiny boards; that is caught when
    /// the board is armed, not here.
    pub fn new((size_x, size_y): Coord2, mines: CellCount) -> Result<Self> {
        if size_x == 0 || size_y == 0 {
            return Err(GameError::EmptyBoard);
        }
        if mines >= size_x.saturating_mul(size_y) {
            return Err(GameError::TooManyMines);
        }
        Ok(Self::new_unchecked((size_x, size_y), mines))
    }

    pub const fn total_tiles(&self) -> CellCount {
        self.size.0.saturating_mul(self.size.1)
    }

    /// 9x9, 10 mines.
    pub const fn easy() -> Self {
        Self::new_unchecked((9, 9), 10)
    }

    /// 16x16, 40 mines.
    pub const fn medium() -> Self {
        Self::new_unchecked((16, 16), 40)
    }

    /// 20x20, 80 mines.
    pub const fn hard() -> Self {
        Self::new_unchecked((20, 20), 80)
    }
}
