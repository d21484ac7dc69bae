//! Physics for standing pieces and their fragments
//!
//! - [`PhysicsWorld`] - bodies, gravity, ground and contacts
//! - [`ConvexProxy`] - bounded collision shapes built from meshes
//! - [`MeshProvider`] / [`ProceduralShards`] - piece and shard geometry
//! - [`PhysicsManager`] - board-aware bookkeeping and fragment lifetimes

pub mod body;
pub mod error;
pub mod manager;
pub mod proxy;
pub mod shards;
pub mod world;

pub use body::{BodyHandle, BodyKind, RigidBody};
pub use error::{PhysicsError, PhysicsResult};
pub use manager::{team_rotation, Fragment, PhysicsManager, StandingPiece, DEFAULT_SUBSTEPS};
pub use proxy::ConvexProxy;
pub use shards::{MeshData, MeshProvider, PieceMesh, ProceduralShards, ShardMesh};
pub use world::PhysicsWorld;
