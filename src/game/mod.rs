//! Chess game logic
//!
//! Pure game types with a thin ECS layer on top:
//!
//! - `board` - piece codes, cells and mechanical move application
//! - `uci` - the coordinate and move wire format
//! - `rules` - destination hints for a selected piece
//! - `state_machine` - [`ChessGame`], the turn sequencer
//! - `animation` - travelling pieces between cells
//! - `events` - the [`EventQueue`] mailbox
//! - `systems` / `system_sets` / `plugin` - scheduling inside the Bevy app

pub mod animation;
pub mod board;
pub mod error;
pub mod events;
pub mod plugin;
pub mod rules;
pub mod state_machine;
pub mod system_sets;
pub mod systems;
pub mod uci;

pub use board::{Board, PieceKind, Position, ENGINE, USER};
pub use error::{GameError, GameResult};
pub use events::{EventQueue, GameEvent};
pub use plugin::GamePlugin;
pub use state_machine::{ChessGame, Phase, DEFAULT_DWELL_SECONDS};
pub use system_sets::GameSystems;
pub use uci::{position_to_uci, uci_to_position, Move};
