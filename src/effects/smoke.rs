//! Bounded smoke particle pool
//!
//! Particles are kept sorted by remaining lifetime, longest first, so the
//! dead ones always sit at the tail and are dropped with a single truncate.

use bevy::color::Color;
use bevy::math::Vec3;
use bevy::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_CAPACITY: usize = 500;

const JITTER: f32 = 1.0;
const MIN_LIFETIME: f32 = 2.0;
const MAX_LIFETIME: f32 = 3.0;
const MIN_SIZE: f32 = 1.0;
const MAX_SIZE: f32 = 1.5;
const RISE_SPEED: f32 = 0.35;
const GROWTH_RATE: f32 = 0.25;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub size: f32,
    pub remaining_lifetime: f32,
    pub initial_lifetime: f32,
    pub color: Color,
}

impl Particle {
    /// Fades linearly from 1 to 0 over the particle's life
    pub fn opacity(&self) -> f32 {
        if self.initial_lifetime <= 0.0 {
            return 0.0;
        }
        (self.remaining_lifetime / self.initial_lifetime).clamp(0.0, 1.0)
    }
}

#[derive(Resource, Debug)]
pub struct SmokePool {
    particles: Vec<Particle>,
    capacity: usize,
    rng: StdRng,
}

impl Default for SmokePool {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SmokePool {
    pub fn new(capacity: usize) -> Self {
        Self::with_rng(capacity, StdRng::from_os_rng())
    }

    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        Self::with_rng(capacity, StdRng::seed_from_u64(seed))
    }

    fn with_rng(capacity: usize, rng: StdRng) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
            rng,
        }
    }

    /// Emit `count` particles around `position`
    ///
    /// A burst that would overflow the pool is refused whole and the pool
    /// is left untouched. Returns the number of particles added.
    pub fn generate(&mut self, position: Vec3, count: usize, color: Color, size_factor: f32) -> usize {
        if self.particles.len() + count > self.capacity {
            tracing::warn!(
                "[SMOKE] Dropping burst of {} particles, pool holds {}/{}",
                count,
                self.particles.len(),
                self.capacity
            );
            return 0;
        }

        for _ in 0..count {
            let jitter = Vec3::new(
                self.rng.random_range(-JITTER..=JITTER),
                self.rng.random_range(-JITTER..=JITTER),
                self.rng.random_range(-JITTER..=JITTER),
            );
            let lifetime = self.rng.random_range(MIN_LIFETIME..=MAX_LIFETIME);
            let drift = Vec3::new(
                self.rng.random_range(-0.1..=0.1),
                RISE_SPEED,
                self.rng.random_range(-0.1..=0.1),
            );
            self.particles.push(Particle {
                position: position + jitter,
                velocity: drift,
                size: self.rng.random_range(MIN_SIZE..=MAX_SIZE) * size_factor,
                remaining_lifetime: lifetime,
                initial_lifetime: lifetime,
                color,
            });
        }
        self.sort();
        count
    }

    /// Age and drift every particle, then drop the dead ones
    pub fn advance(&mut self, dt: f32) {
        for particle in &mut self.particles {
            particle.remaining_lifetime -= dt;
            particle.position += particle.velocity * dt;
            particle.size += GROWTH_RATE * dt;
        }
        self.sort();
        let alive = self
            .particles
            .partition_point(|particle| particle.remaining_lifetime > 0.0);
        self.particles.truncate(alive);
    }

    fn sort(&mut self) {
        self.particles
            .sort_by(|a, b| b.remaining_lifetime.total_cmp(&a.remaining_lifetime));
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
