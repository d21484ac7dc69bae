//! Simplified convex collision proxies
//!
//! Render meshes are far too detailed to collide every frame. A proxy keeps
//! only the mesh's extreme vertices along a fixed set of 26 directions (the
//! faces, edges and corners of a cube), which bounds the cost of contact
//! queries no matter how dense the source mesh is.

use bevy::math::{Quat, Vec3};

#[derive(Debug, Clone, PartialEq)]
pub struct ConvexProxy {
    points: Vec<Vec3>,
    half_extents: Vec3,
    radius: f32,
}

/// The 26 non-zero directions of the {-1, 0, 1}³ lattice
fn sample_directions() -> impl Iterator<Item = Vec3> {
    (-1..=1).flat_map(|x| {
        (-1..=1).flat_map(move |y| {
            (-1..=1).filter_map(move |z| {
                let dir = Vec3::new(x as f32, y as f32, z as f32);
                (dir != Vec3::ZERO).then(|| dir.normalize())
            })
        })
    })
}

impl ConvexProxy {
    /// Build a proxy from mesh vertices given in the body's local frame
    ///
    /// Returns `None` for an empty vertex buffer.
    pub fn from_vertices(vertices: &[Vec3]) -> Option<Self> {
        if vertices.is_empty() {
            return None;
        }

        let mut chosen: Vec<usize> = sample_directions()
            .filter_map(|dir| {
                vertices
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| a.dot(dir).total_cmp(&b.dot(dir)))
                    .map(|(index, _)| index)
            })
            .collect();
        chosen.sort_unstable();
        chosen.dedup();
        let points: Vec<Vec3> = chosen.into_iter().map(|i| vertices[i]).collect();

        let (min, max) = vertices.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), v| (min.min(*v), max.max(*v)),
        );
        let half_extents = (max - min) * 0.5;
        let radius = points.iter().map(|p| p.length()).fold(0.0, f32::max);

        Some(Self {
            points,
            half_extents,
            radius,
        })
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    /// Radius of the bounding sphere around the local origin
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Lowest world-space height of the proxy at the given pose
    pub fn lowest_point(&self, position: Vec3, rotation: Quat) -> f32 {
        self.points
            .iter()
            .map(|p| (rotation * *p + position).y)
            .fold(f32::MAX, f32::min)
    }

    /// Furthest proxy point along `dir` in local space
    pub fn support(&self, dir: Vec3) -> Vec3 {
        self.points
            .iter()
            .copied()
            .max_by(|a, b| a.dot(dir).total_cmp(&b.dot(dir)))
            .unwrap_or(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense_sphere(n: usize) -> Vec<Vec3> {
        let mut points = Vec::new();
        for i in 0..n {
            for j in 0..n {
                let theta = std::f32::consts::PI * i as f32 / (n - 1) as f32;
                let phi = std::f32::consts::TAU * j as f32 / n as f32;
                points.push(Vec3::new(
                    theta.sin() * phi.cos(),
                    theta.cos(),
                    theta.sin() * phi.sin(),
                ));
            }
        }
        points
    }

    #[test]
    fn test_proxy_is_bounded_by_direction_count() {
        let proxy = ConvexProxy::from_vertices(&dense_sphere(40)).unwrap();
        assert!(proxy.points().len() <= 26);
        assert!(proxy.points().len() >= 6);
        assert!((proxy.radius() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_proxy_of_a_box_keeps_its_corners() {
        let corners: Vec<Vec3> = (0..8)
            .map(|i| {
                Vec3::new(
                    if i & 1 == 0 { -1.0 } else { 1.0 },
                    if i & 2 == 0 { -0.5 } else { 0.5 },
                    if i & 4 == 0 { -2.0 } else { 2.0 },
                )
            })
            .collect();
        let proxy = ConvexProxy::from_vertices(&corners).unwrap();
        assert_eq!(proxy.half_extents(), Vec3::new(1.0, 0.5, 2.0));
        assert_eq!(proxy.lowest_point(Vec3::new(0.0, 3.0, 0.0), Quat::IDENTITY), 2.5);
        assert_eq!(proxy.support(Vec3::new(1.0, 1.0, 1.0)), Vec3::new(1.0, 0.5, 2.0));
    }

    #[test]
    fn test_empty_mesh_has_no_proxy() {
        assert!(ConvexProxy::from_vertices(&[]).is_none());
    }
}
