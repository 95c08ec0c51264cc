//! Error types for the VRAW/ANIM exporter.

use thiserror::Error;

/// Result type alias using ExportError.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Main error type for mesh and skeleton export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O error while creating, writing or reading an export file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a JSON scene description.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A polygon has fewer than three corners and cannot be triangulated.
    #[error("Invalid topology: polygon {polygon} has {corners} corners (need at least 3)")]
    InvalidTopology { polygon: usize, corners: usize },

    /// A polygon corner references a vertex the mesh does not have.
    #[error("Invalid topology: polygon {polygon} references vertex {vertex} but the mesh has {vertex_count} vertices")]
    VertexOutOfRange {
        polygon: usize,
        vertex: u32,
        vertex_count: usize,
    },

    /// The configuration requests an attribute the source cannot supply.
    #[error("Unbound attribute: {0}")]
    UnboundAttribute(String),

    /// A bone index does not fit the uint16 bone index channel.
    #[error("Bone index {bone} on vertex {vertex} does not fit in 16 bits")]
    BoneIndexOutOfRange { vertex: usize, bone: u32 },

    /// A bone name cannot be written as ASCII.
    #[error("Bone name is not ASCII: {0:?}")]
    NonAsciiName(String),

    /// A bone names a parent the rig does not have.
    #[error("Bone '{bone}' has unknown parent '{parent}'")]
    UnknownParent { bone: String, parent: String },

    /// The rig's keyframe probe did not move forward.
    #[error("Keyframe probe for bone '{bone}' went from frame {previous} to {next}")]
    KeyframeOrder {
        bone: String,
        previous: i32,
        next: i32,
    },

    /// A VRAW or ANIM file could not be parsed.
    #[error("Invalid file format: {0}")]
    InvalidFormat(String),
}
