use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board has no tiles")]
    EmptyBoard,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Minefield was already generated")]
    AlreadyGenerated,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;
