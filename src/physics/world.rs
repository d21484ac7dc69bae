//! Minimal rigid-body world
//!
//! Gravity, a ground plane at board height and sphere-approximated contacts
//! are all the shattering effect needs. Standing pieces are static
//! cylinders the fragments bounce off; fragments are dynamic bodies whose
//! bounding spheres push each other apart.

use super::body::{BodyHandle, RigidBody};
use super::error::{PhysicsError, PhysicsResult};
use bevy::math::{Quat, Vec3};

const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);
const LINEAR_DAMPING: f32 = 0.05;
const ANGULAR_DAMPING: f32 = 0.4;
/// Tangential velocity decay rate while resting on the ground
const GROUND_DRAG: f32 = 6.0;
/// Bounding spheres overestimate shards; shrink them for contacts
const CONTACT_RADIUS_SCALE: f32 = 0.7;

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    body: Option<RigidBody>,
}

#[derive(Debug)]
pub struct PhysicsWorld {
    slots: Vec<Slot>,
    free: Vec<u32>,
    gravity: Vec3,
    ground_height: f32,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl PhysicsWorld {
    pub fn new(ground_height: f32) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            gravity: GRAVITY,
            ground_height,
        }
    }

    pub fn insert(&mut self, body: RigidBody) -> BodyHandle {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.body = Some(body);
                BodyHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    body: Some(body),
                });
                BodyHandle {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        }
    }

    pub fn remove(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(body)
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)?
            .body
            .as_ref()
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)?
            .body
            .as_mut()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.body.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.body.as_ref().map(|body| {
                (
                    BodyHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    body,
                )
            })
        })
    }

    /// Advance the world by `dt` seconds in `substeps` equal slices
    pub fn step(&mut self, dt: f32, substeps: u32) -> PhysicsResult<()> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(PhysicsError::InvalidTimestep { dt });
        }
        if dt == 0.0 {
            return Ok(());
        }

        let substeps = substeps.max(1);
        let h = dt / substeps as f32;
        for _ in 0..substeps {
            self.integrate(h);
            self.resolve_contacts();
            self.resolve_ground(h);
        }

        match self.iter().find(|(_, body)| !body.is_finite()) {
            Some((handle, _)) => Err(PhysicsError::NonFinite { handle }),
            None => Ok(()),
        }
    }

    fn dynamic_bodies_mut(&mut self) -> impl Iterator<Item = &mut RigidBody> {
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.body.as_mut())
            .filter(|body| body.is_dynamic())
    }

    fn integrate(&mut self, h: f32) {
        let gravity = self.gravity;
        for body in self.dynamic_bodies_mut() {
            body.linear_velocity += gravity * h;
            body.linear_velocity *= 1.0 - LINEAR_DAMPING * h;
            body.angular_velocity *= 1.0 - ANGULAR_DAMPING * h;
            body.position += body.linear_velocity * h;
            body.rotation =
                (Quat::from_scaled_axis(body.angular_velocity * h) * body.rotation).normalize();
        }
    }

    fn resolve_ground(&mut self, h: f32) {
        let ground = self.ground_height;
        for body in self.dynamic_bodies_mut() {
            let lowest = body.proxy.lowest_point(body.position, body.rotation);
            if lowest >= ground {
                continue;
            }
            body.position.y += ground - lowest;
            if body.linear_velocity.y < 0.0 {
                body.linear_velocity.y *= -body.restitution;
            }
            let keep = (-body.friction * GROUND_DRAG * h).exp();
            body.linear_velocity.x *= keep;
            body.linear_velocity.z *= keep;
            body.angular_velocity *= keep;
        }
    }

    /// Pairwise contacts; corrections are gathered first, then applied
    fn resolve_contacts(&mut self) {
        let live: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.body.is_some())
            .map(|(index, _)| index)
            .collect();

        let mut position_delta = vec![Vec3::ZERO; self.slots.len()];
        let mut velocity_delta = vec![Vec3::ZERO; self.slots.len()];

        for (n, &i) in live.iter().enumerate() {
            for &j in &live[n + 1..] {
                let (Some(a), Some(b)) = (&self.slots[i].body, &self.slots[j].body) else {
                    continue;
                };
                let (inv_a, inv_b) = (a.inverse_mass(), b.inverse_mass());
                if inv_a + inv_b == 0.0 {
                    continue;
                }
                let Some((normal, depth)) = contact(a, b) else {
                    continue;
                };

                let share = depth / (inv_a + inv_b);
                position_delta[i] -= normal * share * inv_a;
                position_delta[j] += normal * share * inv_b;

                let approach = (b.linear_velocity - a.linear_velocity).dot(normal);
                if approach < 0.0 {
                    let restitution = a.restitution.min(b.restitution);
                    let impulse = -(1.0 + restitution) * approach / (inv_a + inv_b);
                    velocity_delta[i] -= normal * impulse * inv_a;
                    velocity_delta[j] += normal * impulse * inv_b;
                }
            }
        }

        for index in live {
            if let Some(body) = self.slots[index].body.as_mut() {
                if body.is_dynamic() {
                    body.position += position_delta[index];
                    body.linear_velocity += velocity_delta[index];
                }
            }
        }
    }
}

/// Contact normal (pointing from `a` to `b`) and penetration depth
fn contact(a: &RigidBody, b: &RigidBody) -> Option<(Vec3, f32)> {
    match (a.is_dynamic(), b.is_dynamic()) {
        (true, true) => sphere_sphere(a, b),
        (false, true) => cylinder_sphere(a, b),
        (true, false) => cylinder_sphere(b, a).map(|(normal, depth)| (-normal, depth)),
        (false, false) => None,
    }
}

fn sphere_sphere(a: &RigidBody, b: &RigidBody) -> Option<(Vec3, f32)> {
    let reach = (a.proxy.radius() + b.proxy.radius()) * CONTACT_RADIUS_SCALE;
    let offset = b.position - a.position;
    let distance = offset.length();
    if distance >= reach {
        return None;
    }
    let normal = if distance > f32::EPSILON {
        offset / distance
    } else {
        Vec3::Y
    };
    Some((normal, reach - distance))
}

/// Static piece as an upright cylinder standing on its origin
fn cylinder_sphere(cylinder: &RigidBody, sphere: &RigidBody) -> Option<(Vec3, f32)> {
    let extents = cylinder.proxy.half_extents();
    let cylinder_radius = extents.x.max(extents.z);
    let base = cylinder.position.y;
    let top = base + extents.y * 2.0;
    let radius = sphere.proxy.radius() * CONTACT_RADIUS_SCALE;
    let centre = sphere.position;

    if centre.y > top + radius || centre.y < base - radius {
        return None;
    }

    let mut horizontal = centre - cylinder.position;
    horizontal.y = 0.0;
    let distance = horizontal.length();
    if distance >= cylinder_radius + radius {
        return None;
    }

    if centre.y > top && distance < cylinder_radius {
        return Some((Vec3::Y, top + radius - centre.y));
    }
    let normal = if distance > f32::EPSILON {
        horizontal / distance
    } else {
        Vec3::X
    };
    Some((normal, cylinder_radius + radius - distance))
}
