//! Pointer input
//!
//! Board entities carry `.observe(...)` callbacks. Each click is turned into
//! a selection (`Some(cell)` or `None` for the table) and queued in
//! [`BoardInput`]; the game consumes the queue in
//! [`crate::game::GameSystems::Input`], so all board changes still happen
//! inside the chained game tick.

pub mod pointer;

pub use pointer::{on_cell_click, on_table_click, BoardCell, BoardInput};
