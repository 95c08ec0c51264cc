//! In-memory mesh and rig sources.
//!
//! These back the command-line tool (which reads them from JSON) and make
//! the exporter usable without a host application.

pub mod mesh;
pub mod rig;

pub use mesh::{MeshData, MeshDocument, PolygonEntry, UvLayer, VertexEntry};
pub use rig::{BoneEntry, KeyEntry, PoseEntry, RigBone, RigData, RigDocument};
