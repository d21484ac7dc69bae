//! Error types for game module
//!
//! Every variant here ends the session: the state machine never tries to
//! recover in place from a desynchronised engine or a bad coordinate.

use crate::engine::EngineError;

/// Errors that can occur in game logic
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The engine tried to move something that is not its own piece
    #[error("Engine played '{mv}' but {reason}; board and engine are out of sync")]
    IllegalEngineMove { mv: String, reason: String },

    /// A string did not name a board cell
    #[error("'{text}' is not a valid board coordinate")]
    CoordinateFormat { text: String },

    /// The engine connector failed while the game waited on it
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
