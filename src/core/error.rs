//! Error types for core module
//!
//! [`CoreError`] covers settings persistence. [`SessionError`] is the single
//! error a running game can end with; each subsystem error converts into it
//! with `?`.

use crate::engine::EngineError;
use crate::game::GameError;
use crate::physics::PhysicsError;
use thiserror::Error;

/// Errors that can occur in the core module
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings file I/O error
    #[error("Settings I/O error: {0}")]
    SettingsIo(#[from] std::io::Error),

    /// Settings serialization/deserialization error
    #[error("Settings serialization error: {0}")]
    SettingsSerialization(#[from] serde_json::Error),
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Anything that ends a game session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Physics(#[from] PhysicsError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
