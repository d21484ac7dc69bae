//! Piece and fragment meshes
//!
//! The physics manager only needs vertex buffers, a volume per shard and the
//! offset of each shard inside its piece. [`MeshProvider`] is the seam where
//! a real asset pipeline could plug in; [`ProceduralShards`] builds a
//! faceted column for every kind and slices it into wedges and layers so the
//! game runs without any files on disk.

use crate::game::board::PieceKind;
use bevy::math::Vec3;
use std::f32::consts::TAU;

/// Flat-shaded triangle list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertices(&self) -> Vec<Vec3> {
        self.positions.iter().copied().map(Vec3::from).collect()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append a triangle wound outward, away from `inside`
    fn push_triangle(&mut self, inside: Vec3, a: Vec3, b: Vec3, c: Vec3) {
        let mut normal = (b - a).cross(c - a).normalize_or_zero();
        let (b, c) = if normal.dot((a + b + c) / 3.0 - inside) < 0.0 {
            normal = -normal;
            (c, b)
        } else {
            (b, c)
        };
        for vertex in [a, b, c] {
            self.indices.push(self.positions.len() as u32);
            self.positions.push(vertex.to_array());
            self.normals.push(normal.to_array());
        }
    }

    fn push_quad(&mut self, inside: Vec3, a: Vec3, b: Vec3, c: Vec3, d: Vec3) {
        self.push_triangle(inside, a, b, c);
        self.push_triangle(inside, a, c, d);
    }
}

/// Whole piece, base centred on the local origin
#[derive(Debug, Clone)]
pub struct PieceMesh {
    pub mesh: MeshData,
    pub volume: f32,
    pub height: f32,
    pub radius: f32,
}

/// One fragment of a piece
#[derive(Debug, Clone)]
pub struct ShardMesh {
    /// Vertices relative to `origin`
    pub mesh: MeshData,
    /// Shard centre in the piece's local frame
    pub origin: Vec3,
    pub volume: f32,
}

pub trait MeshProvider: Send + Sync {
    fn piece(&self, kind: PieceKind) -> &PieceMesh;

    fn shards(&self, kind: PieceKind) -> &[ShardMesh];
}

struct Silhouette {
    radius: f32,
    height: f32,
    sectors: usize,
    layers: usize,
}

fn silhouette(kind: PieceKind) -> Silhouette {
    let (radius, height, sectors, layers) = match kind {
        PieceKind::King => (0.32, 1.0, 4, 3),
        PieceKind::Queen => (0.32, 0.9, 4, 3),
        PieceKind::Bishop => (0.28, 0.75, 3, 3),
        PieceKind::Knight => (0.28, 0.7, 3, 2),
        PieceKind::Rook => (0.3, 0.6, 4, 2),
        PieceKind::Pawn => (0.25, 0.5, 3, 2),
    };
    Silhouette {
        radius,
        height,
        sectors,
        layers,
    }
}

/// Facets per sector on the intact piece
const FACETS_PER_SECTOR: usize = 4;

fn rim(radius: f32, angle: f32, y: f32) -> Vec3 {
    Vec3::new(radius * angle.cos(), y, radius * angle.sin())
}

fn piece_mesh(shape: &Silhouette) -> PieceMesh {
    let segments = shape.sectors * FACETS_PER_SECTOR;
    let inside = Vec3::new(0.0, shape.height * 0.5, 0.0);
    let bottom = Vec3::ZERO;
    let top = Vec3::new(0.0, shape.height, 0.0);
    let mut mesh = MeshData::default();

    for i in 0..segments {
        let a0 = TAU * i as f32 / segments as f32;
        let a1 = TAU * (i + 1) as f32 / segments as f32;
        let (b0, b1) = (rim(shape.radius, a0, 0.0), rim(shape.radius, a1, 0.0));
        let (t0, t1) = (rim(shape.radius, a0, shape.height), rim(shape.radius, a1, shape.height));
        mesh.push_quad(inside, b0, b1, t1, t0);
        mesh.push_triangle(inside, bottom, b1, b0);
        mesh.push_triangle(inside, top, t0, t1);
    }

    let wedge = 0.5 * shape.radius * shape.radius * (TAU / segments as f32).sin();
    PieceMesh {
        mesh,
        volume: wedge * segments as f32 * shape.height,
        height: shape.height,
        radius: shape.radius,
    }
}

/// Triangular prisms from the axis out to a chord of the rim
fn shard_meshes(shape: &Silhouette) -> Vec<ShardMesh> {
    let layer_height = shape.height / shape.layers as f32;
    let wedge_area =
        0.5 * shape.radius * shape.radius * (TAU / shape.sectors as f32).sin();

    let mut shards = Vec::with_capacity(shape.sectors * shape.layers);
    for layer in 0..shape.layers {
        let y0 = layer_height * layer as f32;
        let y1 = y0 + layer_height;
        for sector in 0..shape.sectors {
            let a0 = TAU * sector as f32 / shape.sectors as f32;
            let a1 = TAU * (sector + 1) as f32 / shape.sectors as f32;
            let corners = [
                Vec3::new(0.0, y0, 0.0),
                rim(shape.radius, a0, y0),
                rim(shape.radius, a1, y0),
                Vec3::new(0.0, y1, 0.0),
                rim(shape.radius, a0, y1),
                rim(shape.radius, a1, y1),
            ];
            let origin = corners.iter().copied().sum::<Vec3>() / corners.len() as f32;
            let [c0, r0, s0, c1, r1, s1] = corners.map(|corner| corner - origin);

            let mut mesh = MeshData::default();
            mesh.push_triangle(Vec3::ZERO, c0, r0, s0);
            mesh.push_triangle(Vec3::ZERO, c1, r1, s1);
            mesh.push_quad(Vec3::ZERO, r0, s0, s1, r1);
            mesh.push_quad(Vec3::ZERO, c0, r0, r1, c1);
            mesh.push_quad(Vec3::ZERO, c0, s0, s1, c1);

            shards.push(ShardMesh {
                mesh,
                origin,
                volume: wedge_area * layer_height,
            });
        }
    }
    shards
}

/// Built-in [`MeshProvider`]
pub struct ProceduralShards {
    pieces: [PieceMesh; 6],
    shards: [Vec<ShardMesh>; 6],
}

impl ProceduralShards {
    pub fn new() -> Self {
        Self {
            pieces: PieceKind::ALL.map(|kind| piece_mesh(&silhouette(kind))),
            shards: PieceKind::ALL.map(|kind| shard_meshes(&silhouette(kind))),
        }
    }
}

impl Default for ProceduralShards {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshProvider for ProceduralShards {
    fn piece(&self, kind: PieceKind) -> &PieceMesh {
        &self.pieces[kind.index()]
    }

    fn shards(&self, kind: PieceKind) -> &[ShardMesh] {
        &self.shards[kind.index()]
    }
}
