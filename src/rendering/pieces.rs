//! Piece and fragment visuals mirrored from the physics world
//!
//! The physics manager is the source of truth for where pieces and shards
//! are. Each frame these systems spawn, move and despawn render entities so
//! they match its standing bodies and fragments.

use super::palette::team_color;
use crate::game::board::{owner, PieceKind};
use crate::input::{on_cell_click, BoardCell};
use crate::physics::{BodyHandle, MeshData, PhysicsManager};
use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;
use std::collections::HashMap;

#[derive(Component, Debug)]
pub struct PieceVisual {
    body: BodyHandle,
    code: i8,
}

#[derive(Component, Debug)]
pub struct FragmentVisual {
    body: BodyHandle,
}

/// GPU handles for every mesh the provider offers
#[derive(Resource)]
pub struct PieceAssets {
    pieces: Vec<Handle<Mesh>>,
    shards: Vec<Vec<Handle<Mesh>>>,
    user: Handle<StandardMaterial>,
    engine: Handle<StandardMaterial>,
}

impl PieceAssets {
    fn material(&self, sign: i8) -> Handle<StandardMaterial> {
        if sign < 0 {
            self.engine.clone()
        } else {
            self.user.clone()
        }
    }
}

pub fn mesh_from_data(data: &MeshData) -> Mesh {
    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, data.positions.clone());
    if data.normals.len() == data.positions.len() {
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, data.normals.clone());
    } else {
        mesh.compute_flat_normals();
    }
    mesh
}

pub fn load_piece_assets(
    mut commands: Commands,
    physics: Res<PhysicsManager>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let provider = physics.provider();
    let pieces = PieceKind::ALL
        .iter()
        .map(|&kind| meshes.add(mesh_from_data(&provider.piece(kind).mesh)))
        .collect();
    let shards = PieceKind::ALL
        .iter()
        .map(|&kind| {
            provider
                .shards(kind)
                .iter()
                .map(|shard| meshes.add(mesh_from_data(&shard.mesh)))
                .collect::<Vec<_>>()
        })
        .collect();

    let mut team = |sign: i8| {
        materials.add(StandardMaterial {
            base_color: team_color(sign),
            perceptual_roughness: 0.45,
            ..default()
        })
    };
    let user = team(1);
    let engine = team(-1);

    commands.insert_resource(PieceAssets {
        pieces,
        shards,
        user,
        engine,
    });
}

pub fn sync_piece_visuals(
    mut commands: Commands,
    physics: Res<PhysicsManager>,
    assets: Res<PieceAssets>,
    mut visuals: Query<(
        Entity,
        &mut PieceVisual,
        &mut BoardCell,
        &mut Transform,
        &mut Mesh3d,
    )>,
) {
    let mut unseen: HashMap<BodyHandle, _> = physics
        .standing()
        .iter()
        .map(|(position, standing)| (standing.body, (*position, standing.code)))
        .collect();

    for (entity, mut visual, mut cell, mut transform, mut mesh) in &mut visuals {
        let Some((position, code)) = unseen.remove(&visual.body) else {
            commands.entity(entity).despawn();
            continue;
        };
        if let Some(body) = physics.body(visual.body) {
            *transform = body.transform();
        }
        if cell.0 != position {
            cell.0 = position;
        }
        if visual.code != code {
            if let Some(kind) = PieceKind::from_code(code) {
                mesh.0 = assets.pieces[kind.index()].clone();
            }
            visual.code = code;
        }
    }

    for (body, (position, code)) in unseen {
        let (Some(kind), Some(rigid)) = (PieceKind::from_code(code), physics.body(body)) else {
            continue;
        };
        commands
            .spawn((
                Mesh3d(assets.pieces[kind.index()].clone()),
                MeshMaterial3d(assets.material(owner(code))),
                rigid.transform(),
                PieceVisual { body, code },
                BoardCell(position),
                Name::new(format!("{:?} {}", kind, position)),
            ))
            .observe(on_cell_click);
    }
}

pub fn sync_fragment_visuals(
    mut commands: Commands,
    physics: Res<PhysicsManager>,
    assets: Res<PieceAssets>,
    mut visuals: Query<(Entity, &FragmentVisual, &mut Transform)>,
) {
    let mut unseen: HashMap<BodyHandle, _> = physics
        .fragments()
        .iter()
        .map(|fragment| (fragment.body, fragment))
        .collect();

    for (entity, visual, mut transform) in &mut visuals {
        if unseen.remove(&visual.body).is_none() {
            commands.entity(entity).despawn();
            continue;
        }
        if let Some(body) = physics.body(visual.body) {
            *transform = body.transform();
        }
    }

    for (body, fragment) in unseen {
        let (Some(mesh), Some(rigid)) = (
            assets.shards[fragment.owner_kind.index()].get(fragment.shard_index),
            physics.body(body),
        ) else {
            continue;
        };
        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(assets.material(fragment.owner_sign)),
            rigid.transform(),
            FragmentVisual { body },
            bevy::picking::Pickable::IGNORE,
        ));
    }
}
