//! Bone transform types.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Which pose a rig reports bone transforms for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoseMode {
    /// The rig's zero-animation reference pose.
    Rest,
    /// The animated pose at the current frame.
    #[default]
    Pose,
}

/// Rotation and translation of a bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneTransform {
    /// Unit rotation quaternion.
    pub rotation: Quat,
    /// Translation.
    pub translation: Vec3,
}

impl BoneTransform {
    pub fn new(rotation: Quat, translation: Vec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Rotation as `[x, y, z, w]`, the order files store it in.
    pub fn rotation_xyzw(&self) -> [f32; 4] {
        self.rotation.to_array()
    }

    /// Translation as an array.
    pub fn translation_array(&self) -> [f32; 3] {
        self.translation.to_array()
    }

    /// Blend towards another transform (slerp rotation, lerp translation).
    pub fn interpolate(&self, other: &BoneTransform, t: f32) -> Self {
        Self {
            rotation: self.rotation.slerp(other.rotation, t),
            translation: self.translation.lerp(other.translation, t),
        }
    }
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            translation: Vec3::ZERO,
        }
    }
}
