//! Camera, light and table

use super::palette::TABLE;
use crate::input::on_table_click;
use bevy::prelude::*;

/// Centre of the 8x8 board in world space
pub const BOARD_CENTER: Vec3 = Vec3::new(3.5, 0.0, 3.5);

#[derive(Component)]
pub struct Table;

pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // The user sits at rank 1 looking towards rank 8
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(BOARD_CENTER + Vec3::new(0.0, 9.0, -7.5))
            .looking_at(BOARD_CENTER, Vec3::Y),
        Name::new("Camera"),
    ));

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 9000.0,
            ..default()
        },
        Transform::from_xyz(2.0, 10.0, -4.0).looking_at(BOARD_CENTER, Vec3::Y),
        Name::new("Sun"),
    ));

    commands
        .spawn((
            Mesh3d(meshes.add(Plane3d::default().mesh().size(40.0, 40.0))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: TABLE,
                perceptual_roughness: 0.9,
                ..default()
            })),
            Transform::from_translation(BOARD_CENTER - Vec3::Y * 0.01),
            Table,
            Name::new("Table"),
        ))
        .observe(on_table_click);
}
