//! Shared types used throughout the library.
//!
//! The exporter never walks a live scene. It reads geometry through
//! [`MeshSource`] and bone poses through [`RigSource`], so any host
//! application (or the in-memory types in [`crate::source`]) can feed it.

mod transform;

pub use transform::{BoneTransform, PoseMode};

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A polygon as seen by the exporter: a contiguous run of loop corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polygon {
    /// Index of the first loop corner.
    pub loop_start: usize,
    /// Number of loop corners.
    pub loop_total: usize,
    /// Smooth-shaded polygons use per-vertex normals, flat ones the face normal.
    pub smooth: bool,
    /// Face normal.
    pub normal: [f32; 3],
}

impl Polygon {
    pub fn new(loop_start: usize, loop_total: usize, smooth: bool, normal: [f32; 3]) -> Self {
        Self {
            loop_start,
            loop_total,
            smooth,
            normal,
        }
    }

    /// Loop indices of this polygon's corners, in winding order.
    pub fn loops(&self) -> Range<usize> {
        self.loop_start..self.loop_start + self.loop_total
    }
}

/// Membership of a vertex in a bone's vertex group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoneInfluence {
    /// Bone (vertex group) index.
    pub bone: u32,
    /// Influence weight.
    pub weight: f32,
}

impl BoneInfluence {
    pub fn new(bone: u32, weight: f32) -> Self {
        Self { bone, weight }
    }
}

/// Trait for polygon mesh data sources.
pub trait MeshSource {
    /// Number of source vertices.
    fn vertex_count(&self) -> usize;

    /// Position of a source vertex.
    fn position(&self, vertex: usize) -> [f32; 3];

    /// Smooth normal of a source vertex.
    fn vertex_normal(&self, vertex: usize) -> [f32; 3];

    /// Number of polygons.
    fn polygon_count(&self) -> usize;

    /// Get a polygon by index.
    fn polygon(&self, index: usize) -> Polygon;

    /// Source vertex referenced by a loop corner.
    fn loop_vertex(&self, loop_index: usize) -> u32;

    /// Number of UV layers.
    fn uv_layer_count(&self) -> usize;

    /// UV coordinate of a loop corner in the given layer.
    fn loop_uv(&self, layer: usize, loop_index: usize) -> [f32; 2];

    /// Bone group memberships of a source vertex, in source order.
    fn bone_influences(&self, vertex: usize) -> &[BoneInfluence];

    /// Whether the source carries any skinning data at all.
    ///
    /// The default implementation reports true when any vertex has a
    /// bone influence.
    fn has_bone_weights(&self) -> bool {
        (0..self.vertex_count()).any(|v| !self.bone_influences(v).is_empty())
    }
}

/// Trait for skeletal rig sources.
///
/// The rig is stateful: it has a current pose mode and a current frame,
/// and [`bone_transform`](RigSource::bone_transform) answers for that state.
pub trait RigSource {
    /// Number of bones.
    fn bone_count(&self) -> usize;

    /// Name of a bone.
    fn bone_name(&self, bone: usize) -> &str;

    /// Parent of a bone, if any.
    fn bone_parent(&self, bone: usize) -> Option<usize>;

    /// The active pose mode.
    fn pose_mode(&self) -> PoseMode;

    /// Switch pose mode.
    fn set_pose_mode(&mut self, mode: PoseMode);

    /// Move to the first frame of the timeline and return it.
    fn jump_to_start(&mut self) -> i32;

    /// Move to the next authored keyframe of `bone` after the current
    /// frame. Returns `None` when the bone has no further keyframes.
    fn next_keyframe(&mut self, bone: usize) -> Option<i32>;

    /// Move to an arbitrary frame.
    fn set_frame(&mut self, frame: i32);

    /// Local transform of a bone in the current mode and frame.
    fn bone_transform(&self, bone: usize) -> BoneTransform;
}
