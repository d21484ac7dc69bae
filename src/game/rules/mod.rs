//! Chess rules module - Pure movement logic without ECS coupling
//!
//! Computes where a selected piece could go so the renderer can highlight
//! those cells. The result is advisory only: the state machine applies any
//! user move between a user piece and a non-user cell, and the engine's
//! moves are trusted as authoritative.
//!
//! Check, checkmate and castling legality are not modelled.

pub mod piece_moves;


pub use piece_moves::{is_reachable, legal_destinations};
