//! Rigid bodies and their handles

use super::proxy::ConvexProxy;
use bevy::math::{Quat, Vec3};
use bevy::transform::components::Transform;

/// Stable reference to a body in a [`super::PhysicsWorld`]
///
/// The generation makes a handle to a removed body stay dead even after its
/// slot is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    /// Moved only by explicit placement, never by the solver
    Static,
    /// Integrated under gravity and contacts
    Dynamic,
}

#[derive(Clone, Debug)]
pub struct RigidBody {
    pub kind: BodyKind,
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
    pub proxy: ConvexProxy,
}

impl RigidBody {
    pub fn fixed(position: Vec3, rotation: Quat, proxy: ConvexProxy) -> Self {
        Self {
            kind: BodyKind::Static,
            position,
            rotation,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: 0.0,
            restitution: 0.2,
            friction: 0.6,
            proxy,
        }
    }

    pub fn dynamic(position: Vec3, rotation: Quat, proxy: ConvexProxy, mass: f32) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            mass,
            restitution: 0.35,
            friction: 0.5,
            ..Self::fixed(position, rotation, proxy)
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    pub fn inverse_mass(&self) -> f32 {
        match self.kind {
            BodyKind::Dynamic if self.mass > 0.0 => 1.0 / self.mass,
            _ => 0.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.rotation.is_finite()
            && self.linear_velocity.is_finite()
            && self.angular_velocity.is_finite()
    }

    /// Render transform of the body's local frame
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.rotation)
    }
}
