//! Error types for the physics simulation

use super::body::BodyHandle;
use thiserror::Error;

/// Faults of the simulation backend
///
/// Any of these means the world can no longer be trusted; callers end the
/// session instead of stepping an inconsistent world again.
#[derive(Error, Debug)]
pub enum PhysicsError {
    /// A body's pose or velocity became NaN or infinite during a step
    #[error("Body {handle:?} reached a non-finite state during simulation")]
    NonFinite { handle: BodyHandle },

    /// The frame delta was negative or not a number
    #[error("Invalid simulation timestep: {dt}")]
    InvalidTimestep { dt: f32 },
}

/// Result type alias for physics operations
pub type PhysicsResult<T> = Result<T, PhysicsError>;
