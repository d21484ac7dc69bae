//! Board squares and their highlights

use super::palette::{DARK_SQUARE, DESTINATION, LIGHT_SQUARE, SELECTED, SUGGESTION};
use crate::game::board::Position;
use crate::game::ChessGame;
use crate::input::{on_cell_click, BoardCell};
use bevy::prelude::*;
use std::collections::HashSet;

#[derive(Component)]
pub struct Square {
    base: Handle<StandardMaterial>,
}

#[derive(Resource)]
pub struct HighlightMaterials {
    selected: Handle<StandardMaterial>,
    destination: Handle<StandardMaterial>,
    suggestion: Handle<StandardMaterial>,
}

fn flat(materials: &mut Assets<StandardMaterial>, color: Color) -> Handle<StandardMaterial> {
    materials.add(StandardMaterial {
        base_color: color,
        perceptual_roughness: 0.8,
        ..default()
    })
}

pub fn create_board(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let square_mesh = meshes.add(Plane3d::default().mesh().size(1.0, 1.0));
    let light = flat(&mut materials, LIGHT_SQUARE);
    let dark = flat(&mut materials, DARK_SQUARE);

    commands.insert_resource(HighlightMaterials {
        selected: flat(&mut materials, SELECTED),
        destination: flat(&mut materials, DESTINATION),
        suggestion: flat(&mut materials, SUGGESTION),
    });

    for position in Position::all() {
        let base = if (position.file + position.rank) % 2 == 0 {
            dark.clone()
        } else {
            light.clone()
        };
        commands
            .spawn((
                Mesh3d(square_mesh.clone()),
                MeshMaterial3d(base.clone()),
                Transform::from_translation(position.to_world()),
                Square { base },
                BoardCell(position),
                Name::new(format!("Square {}", position)),
            ))
            .observe(on_cell_click);
    }
}

/// Selection, reachable cells for the selected piece, and the engine's hint
pub fn update_square_highlights(
    game: Res<ChessGame>,
    highlights: Res<HighlightMaterials>,
    mut squares: Query<(&Square, &BoardCell, &mut MeshMaterial3d<StandardMaterial>)>,
) {
    if !game.is_changed() {
        return;
    }

    let (selected, _) = game.selection();
    let destinations: HashSet<Position> = game.highlighted_destinations().into_iter().collect();
    let suggestion = game.suggested_move();

    for (square, cell, mut material) in &mut squares {
        let wanted = if selected == Some(cell.0) {
            &highlights.selected
        } else if destinations.contains(&cell.0) {
            &highlights.destination
        } else if suggestion.is_some_and(|mv| mv.from == cell.0 || mv.to == cell.0) {
            &highlights.suggestion
        } else {
            &square.base
        };
        if material.0 != *wanted {
            material.0 = wanted.clone();
        }
    }
}
