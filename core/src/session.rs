use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - NotStarted -> InProgress
/// - NotStarted -> Won
/// - NotStarted -> Lost
/// - InProgress -> Won
/// - InProgress -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// Initial state, board not armed yet
    NotStarted,
    /// First tile opened, minefield exists
    InProgress,
    /// Game ended and player won
    Won,
    /// Game ended and player lost
    Lost,
}

impl GameState {
    /// Indicates the game has not started yet
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    /// Indicates the game has ended and no moves can be made anymore
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// Outcome of a flag toggle
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Changed,
}

impl FlagOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Outcome of opening a tile
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpenOutcome {
    NoChange,
    Opened,
    Exploded,
    Won,
}

impl OpenOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        use OpenOutcome::*;
        match self {
            NoChange => false,
            Opened => true,
            Exploded => true,
            Won => true,
        }
    }
}

/// One playthrough from first click to win or loss.
///
/// Owns the board and the random engine, arms the board on the first real open so that
/// click always lands on a zero tile, and gates every move on flags and the end state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game<R = Xoshiro256StarStar> {
    config: GameConfig,
    board: Board,
    rng: R,
    state: GameState,
    triggered_mine: Option<Coord2>,
}

impl<R: RandomSource> Game<R> {
    /// The engine arrives already seeded; deriving seeds is the caller's concern.
    pub fn new(config: GameConfig, rng: R) -> Self {
        Self {
            board: Board::new(config.size),
            config,
            rng,
            state: GameState::default(),
            triggered_mine: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state.is_final()
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    /// How many mines have not been flagged yet, negative with spare flags
    pub fn mines_left(&self) -> isize {
        self.config.mines as isize - self.board.flag_count() as isize
    }

    /// The mine that ended the game, if it is lost
    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    /// Opens a tile.
    ///
    /// The first open of the game arms the board with the clicked tile as the safe
    /// start. Opening a mine loses without opening the tile; opening the last safe
    /// tile wins. Flagged and already-open tiles are ignored.
    pub fn open(&mut self, coords: Coord2) -> Result<OpenOutcome> {
        let coords = self.validate_coords(coords)?;
        self.check_not_over()?;

        let tile = self.board.tile_at(coords);
        if tile.is_flagged() || tile.is_open() {
            return Ok(OpenOutcome::NoChange);
        }

        if !self.board.is_generated() {
            self.board.generate(&mut self.rng, self.config.mines, coords)?;
        }

        if self.board.tile_at(coords).is_mine() {
            self.triggered_mine = Some(coords);
            self.state = GameState::Lost;
            log::debug!("mine hit at {:?}", coords);
            return Ok(OpenOutcome::Exploded);
        }

        self.board.explore(coords);

        if self.board.is_victory() {
            self.state = GameState::Won;
            log::debug!("all safe tiles open");
            Ok(OpenOutcome::Won)
        } else {
            self.mark_started();
            Ok(OpenOutcome::Opened)
        }
    }

    /// Toggles a flag on a closed tile.
    ///
    /// Works before the first open too: arming the board writes only mines and counts,
    /// so early flags survive.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        let coords = self.validate_coords(coords)?;
        self.check_not_over()?;

        if self.board.toggle_flag(coords) {
            Ok(FlagOutcome::Changed)
        } else {
            Ok(FlagOutcome::NoChange)
        }
    }

    fn mark_started(&mut self) {
        if self.state.is_initial() {
            self.state = GameState::InProgress;
        }
    }

    fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (width, height) = self.board.size();
        if coords.0 < width && coords.1 < height {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    fn check_not_over(&self) -> Result<()> {
        if self.state.is_final() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EASY_SEED: u64 = 42;
    const EASY_FIRST_CLICK: Coord2 = (4, 4);

    // layout produced by EASY_SEED when the first click lands on EASY_FIRST_CLICK
    const EASY_MINES: [Coord2; 10] = [
        (1, 0),
        (1, 2),
        (1, 4),
        (7, 1),
        (8, 0),
        (8, 2),
        (8, 3),
        (8, 6),
        (8, 7),
        (8, 8),
    ];

    fn easy_game() -> Game {
        Game::new(GameConfig::easy(), Xoshiro256StarStar::new(EASY_SEED))
    }

    #[test]
    fn first_open_arms_the_board_with_a_zero_start() {
        let mut game = easy_game();
        assert_eq!(game.state(), GameState::NotStarted);
        assert!(!game.board().is_generated());

        let outcome = game.open(EASY_FIRST_CLICK).unwrap();

        assert_eq!(outcome, OpenOutcome::Opened);
        assert_eq!(game.state(), GameState::InProgress);
        assert!(game.board().is_generated());
        assert_eq!(game.board().mine_count(), 10);
        assert!(game.board().tile_at(EASY_FIRST_CLICK).is_open());
        assert_eq!(game.board().tile_at(EASY_FIRST_CLICK).adjacent_mines(), 0);
    }

    #[test]
    fn seeded_game_reproduces_a_known_layout() {
        let mut game = easy_game();
        game.open(EASY_FIRST_CLICK).unwrap();

        let (width, height) = game.board().size();
        for y in 0..height {
            for x in 0..width {
                assert_eq!(
                    game.board().tile_at((x, y)).is_mine(),
                    EASY_MINES.contains(&(x, y)),
                    "at {:?}",
                    (x, y)
                );
            }
        }
    }

    #[test]
    fn opening_a_mine_loses_without_opening_the_tile() {
        let mut game = easy_game();
        game.open(EASY_FIRST_CLICK).unwrap();

        let mine = EASY_MINES[0];
        let outcome = game.open(mine).unwrap();

        assert_eq!(outcome, OpenOutcome::Exploded);
        assert_eq!(game.state(), GameState::Lost);
        assert!(game.is_over());
        assert!(!game.board().tile_at(mine).is_open());
        assert_eq!(game.triggered_mine(), Some(mine));
    }

    #[test]
    fn finished_game_rejects_further_moves() {
        let mut game = easy_game();
        game.open(EASY_FIRST_CLICK).unwrap();
        game.open(EASY_MINES[0]).unwrap();

        assert_eq!(game.open((0, 0)), Err(GameError::AlreadyEnded));
        assert_eq!(game.toggle_flag((0, 0)), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn opening_every_safe_tile_wins() {
        let mut game = easy_game();
        game.open(EASY_FIRST_CLICK).unwrap();

        let (width, height) = game.board().size();
        for y in 0..height {
            for x in 0..width {
                if EASY_MINES.contains(&(x, y)) || game.board().tile_at((x, y)).is_open() {
                    continue;
                }
                assert!(game.open((x, y)).unwrap().has_update());
            }
        }

        assert_eq!(game.state(), GameState::Won);
        assert!(game.board().is_victory());
        assert_eq!(game.triggered_mine(), None);
    }

    #[test]
    fn flag_gates_open_before_the_board_is_armed() {
        let mut game = easy_game();
        game.toggle_flag(EASY_FIRST_CLICK).unwrap();

        let outcome = game.open(EASY_FIRST_CLICK).unwrap();

        assert_eq!(outcome, OpenOutcome::NoChange);
        assert!(!game.board().is_generated());
        assert_eq!(game.state(), GameState::NotStarted);

        game.toggle_flag(EASY_FIRST_CLICK).unwrap();
        assert_eq!(game.open(EASY_FIRST_CLICK).unwrap(), OpenOutcome::Opened);
    }

    #[test]
    fn flag_gates_open_mid_game() {
        let mut game = easy_game();
        game.open(EASY_FIRST_CLICK).unwrap();

        let mine = EASY_MINES[0];
        game.toggle_flag(mine).unwrap();

        assert_eq!(game.open(mine).unwrap(), OpenOutcome::NoChange);
        assert_eq!(game.state(), GameState::InProgress);
        assert_eq!(game.mines_left(), 9);
    }

    #[test]
    fn early_flags_survive_arming_the_board() {
        let mut game = easy_game();
        game.toggle_flag((0, 0)).unwrap();

        game.open(EASY_FIRST_CLICK).unwrap();

        assert!(game.board().tile_at((0, 0)).is_flagged());
        assert!(!game.board().tile_at((0, 0)).is_open());
    }

    #[test]
    fn flag_toggle_reports_changes_and_tracks_the_counter() {
        let mut game = easy_game();
        assert_eq!(game.mines_left(), 10);

        assert_eq!(game.toggle_flag((0, 0)).unwrap(), FlagOutcome::Changed);
        assert_eq!(game.toggle_flag((1, 1)).unwrap(), FlagOutcome::Changed);
        assert_eq!(game.mines_left(), 8);

        assert_eq!(game.toggle_flag((1, 1)).unwrap(), FlagOutcome::Changed);
        assert_eq!(game.mines_left(), 9);
    }

    #[test]
    fn flagging_an_open_tile_changes_nothing() {
        let mut game = easy_game();
        game.open(EASY_FIRST_CLICK).unwrap();

        let outcome = game.toggle_flag(EASY_FIRST_CLICK).unwrap();

        assert_eq!(outcome, FlagOutcome::NoChange);
        assert!(!outcome.has_update());
    }

    #[test]
    fn coordinates_outside_the_board_are_rejected() {
        let mut game = easy_game();

        assert_eq!(game.open((9, 0)), Err(GameError::InvalidCoords));
        assert_eq!(game.toggle_flag((0, 9)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn overfull_config_surfaces_the_generation_error() {
        // 3 mines fit a 2x2 board, but no layout can honor the safe zone
        let config = GameConfig::new_unchecked((2, 2), 3);
        let mut game = Game::new(config, Xoshiro256StarStar::new(0));

        assert_eq!(game.open((0, 0)), Err(GameError::TooManyMines));
        assert_eq!(game.state(), GameState::NotStarted);
    }

    #[test]
    fn mine_free_board_wins_on_the_first_open() {
        let config = GameConfig::new((3, 3), 0).unwrap();
        let mut game = Game::new(config, Xoshiro256StarStar::new(1));

        assert_eq!(game.open((1, 1)).unwrap(), OpenOutcome::Won);
        assert_eq!(game.state(), GameState::Won);
    }

    #[test]
    fn mid_game_state_survives_a_serde_round_trip() {
        let mut game = easy_game();
        game.open(EASY_FIRST_CLICK).unwrap();
        game.toggle_flag((0, 0)).unwrap();

        let json = serde_json::to_string(&game).unwrap();
        let mut restored: Game = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, game);

        // the restored engine continues the same stream
        assert_eq!(restored.open((0, 1)).unwrap(), game.open((0, 1)).unwrap());
        assert_eq!(restored, game);
    }
}
