//! Error types for the engine connector
//!
//! Both variants are fatal for a game session: the connector never retries
//! a failed spawn or a malformed reply.

use thiserror::Error;

/// Errors raised while talking to the external engine process
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine process could not be spawned or its pipes could not be wired
    #[error("Failed to start engine '{command}': {source}")]
    Startup {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine replied with something the protocol does not allow here
    #[error("Engine protocol violation: {message}")]
    Protocol { message: String },

    /// Reading from or writing to the engine pipes failed mid-session
    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        EngineError::Protocol {
            message: message.into(),
        }
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
