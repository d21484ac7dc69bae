//! ShatterChess - 3D chess against a UCI engine where captured pieces shatter
//!
//! - [`engine`] - engine subprocess and line protocol
//! - [`game`] - board, rules and the turn state machine
//! - [`physics`] - standing pieces, fragments and their lifetimes
//! - [`effects`] - smoke particles
//! - [`input`] / [`rendering`] - the Bevy front end
//! - [`core`] - settings, command line, fatal error handling

pub mod core;
pub mod effects;
pub mod engine;
pub mod game;
pub mod input;
pub mod physics;
pub mod rendering;
