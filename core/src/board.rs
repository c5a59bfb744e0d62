use core::ops::Index;
use hashbrown::HashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;

use crate::*;

/// One tile of the minefield.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    mine: bool,
    flag: bool,
    open: bool,
    adjacent_mines: u8,
}

impl Tile {
    pub const fn is_mine(self) -> bool {
        self.mine
    }

    pub const fn is_flagged(self) -> bool {
        self.flag
    }

    pub const fn is_open(self) -> bool {
        self.open
    }

    /// Mines among the up-to-8 surrounding tiles, fixed at generation time.
    pub const fn adjacent_mines(self) -> u8 {
        self.adjacent_mines
    }
}

/// Minefield grid plus per-tile player state.
///
/// A board starts blank and is armed exactly once, either by [`generate`](Self::generate)
/// or by building it from an explicit layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    tiles: Array2<Tile>,
    mine_count: CellCount,
    generated: bool,
}

impl Board {
    /// Blank board: every tile closed, unflagged and mine-free.
    pub fn new(size: Coord2) -> Self {
        Self {
            tiles: Array2::default(size.to_nd_index()),
            mine_count: 0,
            generated: false,
        }
    }

    /// Armed board with mines at exactly the given coordinates.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut board = Self::new(size);

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            board.tiles[coords.to_nd_index()].mine = true;
        }

        board.mine_count = board.tiles.iter().filter(|tile| tile.mine).count();
        board.count_adjacent_mines();
        board.generated = true;
        Ok(board)
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.tiles.dim();
        (dim.0, dim.1)
    }

    pub fn width(&self) -> Coord {
        self.size().0
    }

    pub fn height(&self) -> Coord {
        self.size().1
    }

    pub fn total_tiles(&self) -> CellCount {
        self.tiles.len()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn tile_at(&self, coords: Coord2) -> Tile {
        self.tiles[coords.to_nd_index()]
    }

    /// Flags currently sitting on closed tiles.
    pub fn flag_count(&self) -> CellCount {
        self.tiles
            .iter()
            .filter(|tile| tile.flag && !tile.open)
            .count()
    }

    /// Whether every tile without a mine is open.
    pub fn is_victory(&self) -> bool {
        self.tiles.iter().all(|tile| tile.mine || tile.open)
    }

    /// Arms the board: `mines` mines land anywhere outside the clipped 3x3 zone around
    /// `safe`, then every tile gets its adjacent-mine count.
    ///
    /// A Fisher-Yates shuffle of the flat tile order drives the placement; walking the
    /// permutation and skipping the safe zone keeps every admissible layout equally
    /// likely without rejection loops. Flags and open tiles are left untouched, so
    /// marks placed before the board is armed survive.
    pub fn generate<R: RandomSource>(
        &mut self,
        rng: &mut R,
        mines: CellCount,
        safe: Coord2,
    ) -> Result<()> {
        let (width, height) = self.size();
        debug_assert!(safe.0 < width && safe.1 < height, "safe tile out of bounds");

        if self.generated {
            return Err(GameError::AlreadyGenerated);
        }

        let safe_zone = self.safe_zone_indices(safe);
        let total = self.total_tiles();
        if mines > total - safe_zone.len() {
            return Err(GameError::TooManyMines);
        }
        if mines == 0 {
            log::warn!("Generating a minefield without mines");
        }

        // flat order is row-major, index = y * width + x
        let mut order: Vec<usize> = (0..total).collect();
        for i in (1..total).rev() {
            let j = rng.next_u64_cap(i as u64 + 1) as usize;
            order.swap(i, j);
        }

        let mut placed = 0;
        for &index in &order {
            if placed == mines {
                break;
            }
            if safe_zone.contains(&index) {
                continue;
            }
            self.tiles[(index % width, index / width).to_nd_index()].mine = true;
            placed += 1;
        }

        self.count_adjacent_mines();
        self.mine_count = mines;
        self.generated = true;
        log::debug!(
            "generated minefield: {} mines on {:?}, safe start {:?}",
            mines,
            (width, height),
            safe
        );
        Ok(())
    }

    /// Opens a tile and flood-fills outward across the zero-adjacency region.
    ///
    /// The starting tile opens unconditionally, mine or not; flag and mine handling
    /// belong to the caller. The cascade opens flagged tiles like any other but never
    /// crosses a tile with a nonzero count.
    pub fn explore(&mut self, coords: Coord2) {
        debug_assert!(
            coords.0 < self.width() && coords.1 < self.height(),
            "coordinates out of bounds"
        );

        if self.tiles[coords.to_nd_index()].open {
            return;
        }

        self.tiles[coords.to_nd_index()].open = true;
        log::trace!("open tile: {:?}", coords);
        if self.tiles[coords.to_nd_index()].adjacent_mines != 0 {
            return;
        }

        let mut visited: HashSet<Coord2> = HashSet::from([coords]);
        let mut to_visit: VecDeque<_> = self
            .tiles
            .iter_neighbors(coords)
            .filter(|&pos| !self.tiles[pos.to_nd_index()].open)
            .collect();

        while let Some(visit_coords) = to_visit.pop_front() {
            if !visited.insert(visit_coords) {
                continue;
            }
            if self.tiles[visit_coords.to_nd_index()].open {
                continue;
            }

            self.tiles[visit_coords.to_nd_index()].open = true;
            log::trace!("open tile: {:?}", visit_coords);

            if self.tiles[visit_coords.to_nd_index()].adjacent_mines == 0 {
                to_visit.extend(
                    self.tiles
                        .iter_neighbors(visit_coords)
                        .filter(|&pos| !self.tiles[pos.to_nd_index()].open)
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    /// Toggles the flag on a closed tile, reporting whether anything changed. Open tiles
    /// cannot be flagged.
    pub fn toggle_flag(&mut self, coords: Coord2) -> bool {
        debug_assert!(
            coords.0 < self.width() && coords.1 < self.height(),
            "coordinates out of bounds"
        );

        let tile = &mut self.tiles[coords.to_nd_index()];
        if tile.open {
            return false;
        }
        tile.flag = !tile.flag;
        true
    }

    /// Flat row-major indices of the clipped 3x3 zone centered on `safe`.
    fn safe_zone_indices(&self, safe: Coord2) -> SmallVec<[usize; 9]> {
        let width = self.width();
        let mut zone = SmallVec::new();
        zone.push(safe.1 * width + safe.0);
        zone.extend(self.tiles.iter_neighbors(safe).map(|(x, y)| y * width + x));
        zone
    }

    fn count_adjacent_mines(&mut self) {
        let (width, height) = self.size();
        for y in 0..height {
            for x in 0..width {
                let count = self
                    .tiles
                    .iter_neighbor_cells((x, y))
                    .filter(|tile| tile.is_mine())
                    .count();
                self.tiles[(x, y).to_nd_index()].adjacent_mines = count.try_into().unwrap();
            }
        }
    }
}

impl Index<Coord2> for Board {
    type Output = Tile;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.tiles[coords.to_nd_index()]
    }
}
