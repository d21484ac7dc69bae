//! Click observers for squares, pieces and the table

use crate::game::board::Position;
use bevy::picking::events::{Click, Pointer};
use bevy::prelude::*;
use std::collections::VecDeque;

/// Clicks waiting for the next game tick
#[derive(Resource, Debug, Default)]
pub struct BoardInput {
    pending: VecDeque<Option<Position>>,
}

impl BoardInput {
    pub fn push(&mut self, selection: Option<Position>) {
        self.pending.push_back(selection);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Option<Position>> + '_ {
        self.pending.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Board cell an entity stands for (a square, or the piece standing on it)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardCell(pub Position);

fn is_primary(button: PointerButton) -> bool {
    matches!(button, PointerButton::Primary)
}

/// Squares and pieces select the cell they stand for
pub fn on_cell_click(
    click: On<Pointer<Click>>,
    cells: Query<&BoardCell>,
    mut input: ResMut<BoardInput>,
) {
    if !is_primary(click.event.button) {
        return;
    }
    let Ok(cell) = cells.get(click.entity) else {
        return;
    };
    debug!("[INPUT] {} clicked", cell.0);
    input.push(Some(cell.0));
}

/// Clicking beside the board clears the selection
pub fn on_table_click(click: On<Pointer<Click>>, mut input: ResMut<BoardInput>) {
    if !is_primary(click.event.button) {
        return;
    }
    debug!("[INPUT] Table clicked");
    input.push(None);
}
