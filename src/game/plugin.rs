//! Game plugin - turn sequencing, physics and smoke wired into the schedule
//!
//! # Plugin Dependencies
//!
//! - [`crate::core::CorePlugin`] - provides [`crate::core::FatalError`]
//! - An [`crate::engine::EngineSession`] resource, inserted by the caller
//!   once the engine handshake succeeded
//! - Optionally a [`GameSettings`] resource; defaults are used without one
//!
//! Resources the caller already inserted (a custom [`ChessGame`] board, a
//! seeded [`PhysicsManager`]) are kept as they are.
//!
//! # System Organization
//!
//! Systems run in [`GameSystems`] order, chained, and stop for good once a
//! fatal error is recorded.

use super::events::EventQueue;
use super::state_machine::{ChessGame, Phase};
use super::system_sets::GameSystems;
use super::systems::*;
use crate::core::{session_running, GameSettings};
use crate::effects::SmokePool;
use crate::input::BoardInput;
use crate::physics::{PhysicsManager, ProceduralShards};
use bevy::prelude::*;

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        let settings = app
            .world()
            .get_resource::<GameSettings>()
            .cloned()
            .unwrap_or_default();

        if !app.world().contains_resource::<ChessGame>() {
            app.insert_resource(ChessGame::new(settings.dwell_seconds));
        }
        if !app.world().contains_resource::<PhysicsManager>() {
            app.insert_resource(PhysicsManager::new(
                Box::new(ProceduralShards::new()),
                settings.physics_substeps,
            ));
        }
        if !app.world().contains_resource::<SmokePool>() {
            app.insert_resource(SmokePool::new(settings.smoke_capacity));
        }
        app.init_resource::<EventQueue>()
            .init_resource::<BoardInput>()
            .register_type::<Phase>();

        app.add_systems(Startup, populate_physics);

        // Input → Execution → Simulation → Effects → Visual
        app.configure_sets(
            Update,
            (
                GameSystems::Input,
                GameSystems::Execution,
                GameSystems::Simulation,
                GameSystems::Effects,
                GameSystems::Visual,
            )
                .chain()
                .run_if(session_running),
        );

        app.add_systems(
            Update,
            (
                apply_board_input.in_set(GameSystems::Input),
                advance_game.in_set(GameSystems::Execution),
                simulate_physics.in_set(GameSystems::Simulation),
                (dispatch_events, advance_smoke)
                    .chain()
                    .in_set(GameSystems::Effects),
            ),
        );
    }
}

fn populate_physics(game: Res<ChessGame>, mut physics: ResMut<PhysicsManager>) {
    physics.populate(game.board());
}
