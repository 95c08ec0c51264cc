//! In-memory skeletal rig with authored keyframes.

use crate::error::{ExportError, Result};
use crate::types::{BoneTransform, PoseMode, RigSource};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A bone and its authored keys.
#[derive(Debug, Clone, PartialEq)]
pub struct RigBone {
    pub name: String,
    pub parent: Option<usize>,
    pub rest: BoneTransform,
    /// Keys sorted by frame, at most one per frame.
    pub keys: Vec<(i32, BoneTransform)>,
}

impl RigBone {
    /// Pose of this bone at `frame`, interpolating between authored keys.
    ///
    /// Frames before the first key hold the first key, frames after the
    /// last hold the last. A bone without keys stays at rest.
    pub fn evaluate(&self, frame: i32) -> BoneTransform {
        let next = self.keys.partition_point(|(f, _)| *f <= frame);
        match (next.checked_sub(1).map(|i| &self.keys[i]), self.keys.get(next)) {
            (None, None) => self.rest,
            (Some((_, before)), None) => *before,
            (None, Some((_, after))) => *after,
            (Some((f0, before)), Some((f1, after))) => {
                let span = i64::from(*f1) - i64::from(*f0);
                let t = (i64::from(frame) - i64::from(*f0)) as f32 / span as f32;
                before.interpolate(after, t)
            }
        }
    }
}

/// Owned rig implementing [`RigSource`].
#[derive(Debug, Clone)]
pub struct RigData {
    bones: Vec<RigBone>,
    frame_start: i32,
    frame: i32,
    mode: PoseMode,
}

impl RigData {
    /// Create an empty rig whose timeline starts at `frame_start`.
    pub fn new(frame_start: i32) -> Self {
        Self {
            bones: Vec::new(),
            frame_start,
            frame: frame_start,
            mode: PoseMode::Pose,
        }
    }

    /// Add a bone and return its index.
    pub fn add_bone(
        &mut self,
        name: impl Into<String>,
        parent: Option<usize>,
        rest: BoneTransform,
    ) -> usize {
        self.bones.push(RigBone {
            name: name.into(),
            parent,
            rest,
            keys: Vec::new(),
        });
        self.bones.len() - 1
    }

    /// Author a key on a bone, replacing any key already on that frame.
    pub fn add_key(&mut self, bone: usize, frame: i32, transform: BoneTransform) {
        let keys = &mut self.bones[bone].keys;
        match keys.binary_search_by_key(&frame, |(f, _)| *f) {
            Ok(i) => keys[i].1 = transform,
            Err(i) => keys.insert(i, (frame, transform)),
        }
    }

    pub fn bones(&self) -> &[RigBone] {
        &self.bones
    }

    /// Current frame of the timeline.
    pub fn current_frame(&self) -> i32 {
        self.frame
    }

    /// Build a rig from a JSON document, resolving parent names.
    pub fn from_document(doc: &RigDocument) -> Result<Self> {
        let mut rig = Self::new(doc.frame_start);

        for entry in &doc.bones {
            let parent = match &entry.parent {
                Some(name) => Some(
                    doc.bones
                        .iter()
                        .position(|b| &b.name == name)
                        .ok_or_else(|| ExportError::UnknownParent {
                            bone: entry.name.clone(),
                            parent: name.clone(),
                        })?,
                ),
                None => None,
            };
            let bone = rig.add_bone(entry.name.clone(), parent, entry.rest.to_transform());
            for key in &entry.keys {
                rig.add_key(bone, key.frame, key.pose.to_transform());
            }
        }

        Ok(rig)
    }

    /// Parse a rig from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: RigDocument = serde_json::from_str(json)?;
        Self::from_document(&doc)
    }

    /// Load a rig from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl RigSource for RigData {
    fn bone_count(&self) -> usize {
        self.bones.len()
    }

    fn bone_name(&self, bone: usize) -> &str {
        &self.bones[bone].name
    }

    fn bone_parent(&self, bone: usize) -> Option<usize> {
        self.bones[bone].parent
    }

    fn pose_mode(&self) -> PoseMode {
        self.mode
    }

    fn set_pose_mode(&mut self, mode: PoseMode) {
        self.mode = mode;
    }

    fn jump_to_start(&mut self) -> i32 {
        self.frame = self.frame_start;
        self.frame
    }

    fn next_keyframe(&mut self, bone: usize) -> Option<i32> {
        let current = self.frame;
        let next = self.bones[bone]
            .keys
            .iter()
            .map(|(f, _)| *f)
            .find(|&f| f > current)?;
        self.frame = next;
        Some(next)
    }

    fn set_frame(&mut self, frame: i32) {
        self.frame = frame;
    }

    fn bone_transform(&self, bone: usize) -> BoneTransform {
        let bone = &self.bones[bone];
        match self.mode {
            PoseMode::Rest => bone.rest,
            PoseMode::Pose => bone.evaluate(self.frame),
        }
    }
}

/// JSON rig description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RigDocument {
    #[serde(default)]
    pub frame_start: i32,
    pub bones: Vec<BoneEntry>,
}

/// A bone in a [`RigDocument`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoneEntry {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub rest: PoseEntry,
    #[serde(default)]
    pub keys: Vec<KeyEntry>,
}

/// Rotation (x, y, z, w) and translation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoseEntry {
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 4],
    #[serde(default)]
    pub translation: [f32; 3],
}

impl Default for PoseEntry {
    fn default() -> Self {
        Self {
            rotation: identity_rotation(),
            translation: [0.0; 3],
        }
    }
}

impl PoseEntry {
    fn to_transform(self) -> BoneTransform {
        BoneTransform::new(
            Quat::from_array(self.rotation).normalize(),
            Vec3::from(self.translation),
        )
    }
}

/// An authored key in a [`BoneEntry`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KeyEntry {
    pub frame: i32,
    #[serde(flatten)]
    pub pose: PoseEntry,
}

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}
