//! Standing pieces and fragment lifetimes
//!
//! Every occupied cell owns one static body. Capturing a piece swaps its
//! body for a burst of dynamic fragments, each with a random lifetime. When
//! a fragment runs out it is removed from the world and announced as
//! [`GameEvent::FragmentExpired`] so the effects stage can leave smoke
//! where it lay.

use super::body::{BodyHandle, RigidBody};
use super::error::PhysicsResult;
use super::proxy::ConvexProxy;
use super::shards::{MeshProvider, ProceduralShards};
use super::world::PhysicsWorld;
use crate::game::board::{owner, Board, PieceKind, Position};
use crate::game::events::{EventQueue, GameEvent};
use bevy::math::{Quat, Vec3};
use bevy::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::f32::consts::PI;

pub const DEFAULT_SUBSTEPS: u32 = 7;
pub const MIN_FRAGMENT_LIFETIME: f32 = 2.0;
pub const MAX_FRAGMENT_LIFETIME: f32 = 3.0;

const SHARD_DENSITY: f32 = 1000.0;
const MIN_SHARD_MASS: f32 = 0.05;
const BURST_SPEED: f32 = 1.2;
const BURST_LIFT: f32 = 1.5;
const BURST_SPIN: f32 = 4.0;

/// Static body of a piece still on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandingPiece {
    pub code: i8,
    pub body: BodyHandle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub owner_kind: PieceKind,
    pub owner_sign: i8,
    pub shard_index: usize,
    pub body: BodyHandle,
    pub remaining_lifetime: f32,
    pub volume: f32,
}

/// Engine pieces face the user
pub fn team_rotation(sign: i8) -> Quat {
    if sign < 0 {
        Quat::from_rotation_y(PI)
    } else {
        Quat::IDENTITY
    }
}

#[derive(Resource)]
pub struct PhysicsManager {
    world: PhysicsWorld,
    provider: Box<dyn MeshProvider>,
    standing: HashMap<Position, StandingPiece>,
    fragments: Vec<Fragment>,
    substeps: u32,
    rng: StdRng,
}

impl Default for PhysicsManager {
    fn default() -> Self {
        Self::new(Box::new(ProceduralShards::new()), DEFAULT_SUBSTEPS)
    }
}

impl PhysicsManager {
    pub fn new(provider: Box<dyn MeshProvider>, substeps: u32) -> Self {
        Self::with_rng(provider, substeps, StdRng::from_os_rng())
    }

    /// Deterministic fragment lifetimes and impulses
    pub fn with_seed(provider: Box<dyn MeshProvider>, substeps: u32, seed: u64) -> Self {
        Self::with_rng(provider, substeps, StdRng::seed_from_u64(seed))
    }

    fn with_rng(provider: Box<dyn MeshProvider>, substeps: u32, rng: StdRng) -> Self {
        Self {
            world: PhysicsWorld::default(),
            provider,
            standing: HashMap::new(),
            fragments: Vec::new(),
            substeps: substeps.max(1),
            rng,
        }
    }

    /// Replace every standing body with one per occupied cell of `board`
    pub fn populate(&mut self, board: &Board) {
        for (_, standing) in self.standing.drain() {
            self.world.remove(standing.body);
        }

        for (position, code) in board.pieces() {
            let Some(kind) = PieceKind::from_code(code) else {
                continue;
            };
            let vertices = self.provider.piece(kind).mesh.vertices();
            let Some(proxy) = ConvexProxy::from_vertices(&vertices) else {
                tracing::warn!("[PHYSICS] {:?} has an empty mesh, {} gets no body", kind, position);
                continue;
            };
            let body = self.world.insert(RigidBody::fixed(
                position.to_world(),
                team_rotation(owner(code)),
                proxy,
            ));
            self.standing.insert(position, StandingPiece { code, body });
        }
        tracing::info!("[PHYSICS] Populated {} standing pieces", self.standing.len());
    }

    /// Break the piece on `position` into fragments, returning how many
    pub fn collapse_piece(&mut self, piece_code: i8, position: Position) -> usize {
        let Some(kind) = PieceKind::from_code(piece_code) else {
            tracing::warn!("[PHYSICS] Cannot collapse unknown piece code {}", piece_code);
            return 0;
        };
        match self.standing.remove(&position) {
            Some(standing) => {
                self.world.remove(standing.body);
            }
            None => tracing::debug!("[PHYSICS] No standing body on {}", position),
        }

        let sign = owner(piece_code);
        let rotation = team_rotation(sign);
        let base = position.to_world();
        let mut spawned = 0;

        for (shard_index, shard) in self.provider.shards(kind).iter().enumerate() {
            let Some(proxy) = ConvexProxy::from_vertices(&shard.mesh.vertices()) else {
                continue;
            };
            let offset = rotation * shard.origin;
            let outward = Vec3::new(offset.x, 0.0, offset.z).normalize_or_zero();
            let spread: f32 = self.rng.random_range(0.6..=1.4);

            let mass = (shard.volume * SHARD_DENSITY).max(MIN_SHARD_MASS);
            let mut body = RigidBody::dynamic(base + offset, rotation, proxy, mass);
            body.linear_velocity = outward * BURST_SPEED * spread + Vec3::Y * BURST_LIFT * spread;
            body.angular_velocity = Vec3::new(
                self.rng.random_range(-1.0..=1.0),
                self.rng.random_range(-1.0..=1.0),
                self.rng.random_range(-1.0..=1.0),
            ) * BURST_SPIN;

            let handle = self.world.insert(body);
            self.fragments.push(Fragment {
                owner_kind: kind,
                owner_sign: sign,
                shard_index,
                body: handle,
                remaining_lifetime: self
                    .rng
                    .random_range(MIN_FRAGMENT_LIFETIME..=MAX_FRAGMENT_LIFETIME),
                volume: shard.volume,
            });
            spawned += 1;
        }

        tracing::info!(
            "[PHYSICS] {:?} on {} shattered into {} fragments",
            kind,
            position,
            spawned
        );
        spawned
    }

    /// Age fragments, retire the expired ones, then step the world
    ///
    /// Every fragment whose lifetime reaches zero produces exactly one
    /// [`GameEvent::FragmentExpired`]; survivors keep their order.
    pub fn simulate(&mut self, dt: f32, events: &mut EventQueue) -> PhysicsResult<()> {
        let world = &mut self.world;
        self.fragments.retain_mut(|fragment| {
            fragment.remaining_lifetime -= dt;
            if fragment.remaining_lifetime > 0.0 {
                return true;
            }
            let position = world
                .remove(fragment.body)
                .map(|body| body.position)
                .unwrap_or_default();
            events.push(GameEvent::FragmentExpired {
                position,
                volume: fragment.volume,
                owner_sign: fragment.owner_sign,
            });
            false
        });

        self.world.step(dt, self.substeps)
    }

    /// Follow a travelling piece with its static body
    pub fn update_piece_position(&mut self, start: Position, current: Vec3) {
        let Some(standing) = self.standing.get(&start) else {
            return;
        };
        if let Some(body) = self.world.get_mut(standing.body) {
            body.position = current;
        }
    }

    /// Snap the body that started on `start` to `end` and re-key it there
    pub fn move_piece(&mut self, start: Position, end: Position) {
        if start == end {
            return;
        }
        let Some(standing) = self.standing.remove(&start) else {
            tracing::debug!("[PHYSICS] No standing body on {} to move", start);
            return;
        };
        if let Some(body) = self.world.get_mut(standing.body) {
            body.position = end.to_world();
        }
        if let Some(stale) = self.standing.insert(end, standing) {
            tracing::warn!("[PHYSICS] Replacing stale body on {}", end);
            self.world.remove(stale.body);
        }
    }

    /// Keep a standing piece's code in sync after a promotion
    pub fn set_piece_code(&mut self, position: Position, code: i8) {
        if let Some(standing) = self.standing.get_mut(&position) {
            standing.code = code;
        }
    }

    pub fn standing(&self) -> &HashMap<Position, StandingPiece> {
        &self.standing
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.world.get(handle)
    }

    /// Cell a standing body is keyed under
    pub fn standing_position(&self, handle: BodyHandle) -> Option<Position> {
        self.standing
            .iter()
            .find(|(_, standing)| standing.body == handle)
            .map(|(position, _)| *position)
    }

    pub fn provider(&self) -> &dyn MeshProvider {
        self.provider.as_ref()
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::{ENGINE, USER};

    fn pos(file: u8, rank: u8) -> Position {
        Position::new(file, rank).unwrap()
    }

    fn manager() -> PhysicsManager {
        PhysicsManager::with_seed(Box::new(ProceduralShards::new()), DEFAULT_SUBSTEPS, 7)
    }

    #[test]
    fn test_populate_creates_one_body_per_piece() {
        let mut physics = manager();
        physics.populate(&Board::standard());
        assert_eq!(physics.standing().len(), 32);
        assert_eq!(physics.world().len(), 32);

        // Populating again replaces rather than duplicates
        physics.populate(&Board::standard());
        assert_eq!(physics.world().len(), 32);
    }

    #[test]
    fn test_collapse_replaces_standing_body_with_fragments() {
        let mut physics = manager();
        physics.populate(&Board::standard());
        let target = pos(3, 7);
        let handle = physics.standing()[&target].body;

        let spawned = physics.collapse_piece(PieceKind::Queen.code(ENGINE), target);

        assert_eq!(spawned, physics.provider().shards(PieceKind::Queen).len());
        assert!(physics.body(handle).is_none());
        assert!(!physics.standing().contains_key(&target));
        assert_eq!(physics.world().len(), 31 + spawned);
        for fragment in physics.fragments() {
            assert_eq!(fragment.owner_sign, ENGINE);
            assert_eq!(fragment.owner_kind, PieceKind::Queen);
            assert!((MIN_FRAGMENT_LIFETIME..=MAX_FRAGMENT_LIFETIME)
                .contains(&fragment.remaining_lifetime));
        }
    }

    #[test]
    fn test_engine_fragments_are_turned_to_face_the_user() {
        let mut physics = manager();
        physics.collapse_piece(PieceKind::Knight.code(ENGINE), pos(1, 7));
        let body = physics.body(physics.fragments()[0].body).unwrap();
        assert!(body.rotation.angle_between(Quat::from_rotation_y(PI)) < 1e-4);

        let mut physics = manager();
        physics.collapse_piece(PieceKind::Knight.code(USER), pos(1, 0));
        let body = physics.body(physics.fragments()[0].body).unwrap();
        assert!(body.rotation.angle_between(Quat::IDENTITY) < 1e-4);
    }

    #[test]
    fn test_every_fragment_expires_exactly_once() {
        let mut physics = manager();
        let mut events = EventQueue::default();
        let spawned = physics.collapse_piece(PieceKind::Rook.code(USER), pos(0, 0));
        let volume: f32 = physics.fragments().iter().map(|f| f.volume).sum();

        let mut expired = 0;
        let mut expired_volume = 0.0;
        for _ in 0..40 {
            physics.simulate(0.1, &mut events).unwrap();
            assert!(physics
                .fragments()
                .iter()
                .all(|fragment| fragment.remaining_lifetime > 0.0));
            for event in events.drain() {
                match event {
                    GameEvent::FragmentExpired {
                        volume, owner_sign, ..
                    } => {
                        assert_eq!(owner_sign, USER);
                        expired += 1;
                        expired_volume += volume;
                    }
                    other => panic!("unexpected event {other:?}"),
                }
            }
        }

        assert_eq!(expired, spawned);
        assert!((expired_volume - volume).abs() < 1e-6);
        assert!(physics.fragments().is_empty());
        assert!(physics.world().is_empty());
    }

    #[test]
    fn test_expiry_keeps_survivors_in_order() {
        let mut physics = manager();
        let mut events = EventQueue::default();
        physics.collapse_piece(PieceKind::Queen.code(USER), pos(3, 0));
        physics.fragments.truncate(5);

        // survivor, expired, survivor, expired, survivor
        for (index, fragment) in physics.fragments.iter_mut().enumerate() {
            fragment.remaining_lifetime = if index % 2 == 0 { 2.0 } else { 0.05 };
        }
        let handles: Vec<BodyHandle> = physics.fragments().iter().map(|f| f.body).collect();
        let expired_volumes = [physics.fragments[1].volume, physics.fragments[3].volume];

        physics.simulate(0.1, &mut events).unwrap();

        let survivors: Vec<BodyHandle> = physics.fragments().iter().map(|f| f.body).collect();
        assert_eq!(survivors, vec![handles[0], handles[2], handles[4]]);
        assert!(physics.body(handles[1]).is_none());
        assert!(physics.body(handles[3]).is_none());

        let volumes: Vec<f32> = events
            .drain()
            .map(|event| match event {
                GameEvent::FragmentExpired { volume, .. } => volume,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(volumes, expired_volumes);
    }

    #[test]
    fn test_nothing_expires_before_the_minimum_lifetime() {
        let mut physics = manager();
        let mut events = EventQueue::default();
        let spawned = physics.collapse_piece(PieceKind::Pawn.code(ENGINE), pos(4, 6));
        for _ in 0..19 {
            physics.simulate(0.1, &mut events).unwrap();
        }
        assert!(events.is_empty());
        assert_eq!(physics.fragments().len(), spawned);
    }

    #[test]
    fn test_fragments_stay_above_the_board() {
        let mut physics = manager();
        let mut events = EventQueue::default();
        physics.collapse_piece(PieceKind::King.code(USER), pos(4, 0));
        for _ in 0..90 {
            physics.simulate(1.0 / 60.0, &mut events).unwrap();
        }
        for fragment in physics.fragments() {
            let body = physics.body(fragment.body).unwrap();
            assert!(body.proxy.lowest_point(body.position, body.rotation) > -1e-2);
        }
    }

    #[test]
    fn test_move_piece_rekeys_the_standing_body() {
        let mut physics = manager();
        physics.populate(&Board::standard());
        let (start, end) = (pos(6, 0), pos(5, 2));
        let handle = physics.standing()[&start].body;

        physics.update_piece_position(start, Vec3::new(5.5, 0.2, 1.0));
        assert_eq!(physics.body(handle).unwrap().position, Vec3::new(5.5, 0.2, 1.0));

        physics.move_piece(start, end);
        assert_eq!(physics.standing_position(handle), Some(end));
        assert!(!physics.standing().contains_key(&start));
        assert_eq!(physics.body(handle).unwrap().position, end.to_world());
    }

    #[test]
    fn test_collapsing_an_empty_cell_still_spawns_fragments() {
        let mut physics = manager();
        let spawned = physics.collapse_piece(PieceKind::Bishop.code(USER), pos(2, 2));
        assert_eq!(spawned, physics.provider().shards(PieceKind::Bishop).len());
        assert_eq!(physics.collapse_piece(0, pos(2, 2)), 0);
    }
}
