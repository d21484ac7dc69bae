//! ECS systems driving a game tick
//!
//! The systems are thin: each hands its resources to the pure game,
//! physics or smoke types and records failures in [`FatalError`].

use super::board::Position;
use super::events::{EventQueue, GameEvent};
use super::state_machine::ChessGame;
use crate::core::FatalError;
use crate::effects::SmokePool;
use crate::engine::EngineSession;
use crate::input::BoardInput;
use crate::physics::PhysicsManager;
use crate::rendering::palette::{dust_color, team_color};
use bevy::prelude::*;

/// Smoke particles per unit of fragment volume
const SMOKE_PER_VOLUME: f32 = 600.0;
const MAX_SMOKE_PER_FRAGMENT: usize = 12;
const SMOKE_SIZE_SCALE: f32 = 1.5;
const DUST_SIZE: f32 = 0.12;

/// Number and size of smoke particles left by a fragment of `volume`
pub fn smoke_burst(volume: f32) -> (usize, f32) {
    let count = ((volume * SMOKE_PER_VOLUME).ceil() as usize).clamp(1, MAX_SMOKE_PER_FRAGMENT);
    (count, volume.max(0.0).cbrt() * SMOKE_SIZE_SCALE)
}

/// Hand clicks recorded by the pointer observers to the game
pub fn apply_board_input(mut input: ResMut<BoardInput>, mut game: ResMut<ChessGame>) {
    for selection in input.drain() {
        game.select_position(selection);
    }
}

pub fn advance_game(
    time: Res<Time>,
    mut game: ResMut<ChessGame>,
    mut engine: ResMut<EngineSession>,
    mut events: ResMut<EventQueue>,
    mut fatal: ResMut<FatalError>,
) {
    if let Err(e) = game.advance(time.delta_secs(), &mut engine, &mut events) {
        fatal.record(e);
    }
}

pub fn simulate_physics(
    time: Res<Time>,
    mut physics: ResMut<PhysicsManager>,
    mut events: ResMut<EventQueue>,
    mut fatal: ResMut<FatalError>,
) {
    if let Err(e) = physics.simulate(time.delta_secs(), &mut events) {
        fatal.record(e);
    }
}

/// Route every queued event to its consumer
pub fn dispatch_events(
    game: Res<ChessGame>,
    mut events: ResMut<EventQueue>,
    mut physics: ResMut<PhysicsManager>,
    mut smoke: ResMut<SmokePool>,
) {
    for event in events.drain() {
        match event {
            GameEvent::PieceCaptured { piece, position } => {
                physics.collapse_piece(piece, position);
            }
            GameEvent::PieceMoving { start, current } => {
                physics.update_piece_position(start, current);
                smoke.generate(current, 1, dust_color(), DUST_SIZE);
            }
            GameEvent::PieceStopped { start, end } => {
                physics.move_piece(start, end);
                sync_promotion(&game, &mut physics, end);
            }
            GameEvent::FragmentExpired {
                position,
                volume,
                owner_sign,
            } => {
                let (count, size) = smoke_burst(volume);
                smoke.generate(position, count, team_color(owner_sign), size);
            }
        }
    }
}

fn sync_promotion(game: &ChessGame, physics: &mut PhysicsManager, end: Position) {
    let code = game.board().get(end);
    if physics.standing().get(&end).is_some_and(|s| s.code != code) && code != 0 {
        debug!("[GAME] Piece on {} is now {}", end, code);
        physics.set_piece_code(end, code);
    }
}

pub fn advance_smoke(time: Res<Time>, mut smoke: ResMut<SmokePool>) {
    smoke.advance(time.delta_secs());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke_burst_scales_with_volume() {
        let (small_count, small_size) = smoke_burst(0.004);
        let (large_count, large_size) = smoke_burst(0.017);
        assert!(small_count < large_count);
        assert!(small_size < large_size);
        assert_eq!(smoke_burst(10.0).0, MAX_SMOKE_PER_FRAGMENT);
        assert_eq!(smoke_burst(0.0).0, 1);
    }
}
