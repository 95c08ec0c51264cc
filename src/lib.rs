//! # VRAW Export
//!
//! A Rust library for exporting polygon meshes and skeletal rigs to compact
//! interleaved vertex buffers.
//!
//! ## Overview
//!
//! A mesh is read through the [`MeshSource`] trait, laid out according to
//! an [`ExportConfig`], deduplicated into a minimal unique vertex set plus a
//! triangle index list, and written as a binary VRAW file or a YAML-like
//! text dump. Rigs are read through [`RigSource`], sampled at their rest
//! pose and authored keyframes, and written as ANIM files.
//!
//! ## Quick Start
//!
//! ```ignore
//! use vraw_export::{export_mesh, ExportConfig, MeshData};
//!
//! // Load a mesh description
//! let mesh = MeshData::load("path/to/mesh.json")?;
//!
//! // Pick the attributes to export
//! let config = ExportConfig::new()
//!     .with_normals(true)
//!     .with_textures(true);
//!
//! // Write the VRAW file
//! export_mesh(&mesh, "model.vraw", &config)?;
//! ```
//!
//! ## Skeletons
//!
//! ```ignore
//! use vraw_export::{export_skeleton, RigData};
//!
//! let mut rig = RigData::load("path/to/rig.json")?;
//! export_skeleton(&mut rig, "model.anim", true)?;
//! ```
//!
//! ## Library Integration
//!
//! To export from your own scene representation, implement [`MeshSource`]
//! or [`RigSource`] and use [`MeshExport::build`] / [`capture_skeleton`]
//! directly when the resolved data is needed in memory.

pub mod dedup;
pub mod error;
pub mod export;
pub mod layout;
pub mod skeleton;
pub mod source;
pub mod types;

// Re-export main types for convenience
pub use error::{ExportError, Result};
pub use types::{BoneInfluence, BoneTransform, MeshSource, Polygon, PoseMode, RigSource};
pub use layout::{
    ExportConfig, VertexAttributeUsage, VertexElement, VertexElementFlags, VertexLayout,
};
pub use dedup::{deduplicate, VertexPools};
pub use export::{export_mesh, read_vraw, save_mesh, AttributeValue, MeshExport};
pub use skeleton::{capture_skeleton, export_skeleton, read_anim, BoneRecord, Keyframe};
pub use source::{MeshData, RigData};
