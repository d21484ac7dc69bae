//! Rendering - a thin view of the game, physics and smoke resources
//!
//! Nothing here changes game state. The board, pieces and shards are plain
//! `StandardMaterial` meshes lit by one shadow-casting light; smoke is drawn
//! with gizmos.
//!
//! - `scene` - camera, light and the clickable table
//! - `board` - squares and highlights
//! - `pieces` - piece and fragment entities mirrored from physics
//! - `smoke` - particle drawing
//! - `palette` - colours

pub mod board;
pub mod palette;
pub mod pieces;
pub mod scene;
pub mod smoke;

use crate::game::GameSystems;
use bevy::prelude::*;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(MeshPickingPlugin)
            .add_systems(
                Startup,
                (
                    scene::setup_scene,
                    board::create_board,
                    pieces::load_piece_assets,
                ),
            )
            .add_systems(
                Update,
                (
                    pieces::sync_piece_visuals,
                    pieces::sync_fragment_visuals,
                    board::update_square_highlights,
                    smoke::draw_smoke,
                )
                    .in_set(GameSystems::Visual),
            );
    }
}
