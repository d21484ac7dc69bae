//! Smoke drawn as fading gizmo spheres

use crate::effects::SmokePool;
use bevy::color::Alpha;
use bevy::prelude::*;

/// Particle size is a diameter, gizmo spheres take a radius
const RADIUS_SCALE: f32 = 0.5;

pub fn draw_smoke(smoke: Res<SmokePool>, mut gizmos: Gizmos) {
    for particle in smoke.particles() {
        let color = particle
            .color
            .with_alpha(particle.color.alpha() * particle.opacity());
        gizmos.sphere(particle.position, particle.size * RADIUS_SCALE, color);
    }
}
