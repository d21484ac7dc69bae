//! Visual aftermath of captures

pub mod smoke;

pub use smoke::{Particle, SmokePool, DEFAULT_CAPACITY};
