//! Skeleton sampling and ANIM export.
//!
//! [`capture_skeleton`] drives a [`RigSource`] through its rest pose and
//! authored keyframes and collects one [`BoneRecord`] per bone. The
//! records are then written as a binary ANIM file or a YAML-like dump.

pub mod binary;
pub mod text;

pub use binary::{parse_anim, read_anim, write_anim, ANIM_MAGIC};
pub use text::write_anim_text;

use crate::error::{ExportError, Result};
use crate::export::{text_path, write_file};
use crate::types::{BoneTransform, PoseMode, RigSource};
use std::path::{Path, PathBuf};

/// A sampled pose at one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub frame: i32,
    pub transform: BoneTransform,
}

/// Everything exported for one bone.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneRecord {
    pub name: String,
    /// Name of the parent bone, `None` for a root.
    pub parent: Option<String>,
    pub rest: BoneTransform,
    /// Sampled keys in strictly increasing frame order.
    pub keyframes: Vec<Keyframe>,
}

/// Sample rest pose and keyframes of every bone of a rig.
///
/// Each bone's rest pose is read with the rig switched to
/// [`PoseMode::Rest`]; the previously active mode is restored right after,
/// bone by bone. Keyframe discovery jumps to the start of the timeline,
/// always keeps that frame, then follows the rig's per-bone keyframe probe
/// until it reports no further key. Keys are sampled in
/// [`PoseMode::Pose`]. The rig is left in the mode it started in.
///
/// # Errors
/// Returns [`ExportError::KeyframeOrder`] if the probe fails to advance.
pub fn capture_skeleton<R: RigSource + ?Sized>(rig: &mut R) -> Result<Vec<BoneRecord>> {
    let mut records = Vec::with_capacity(rig.bone_count());

    for bone in 0..rig.bone_count() {
        let active = rig.pose_mode();
        rig.set_pose_mode(PoseMode::Rest);
        let rest = rig.bone_transform(bone);
        rig.set_pose_mode(active);

        let frames = keyframe_frames(rig, bone)?;

        rig.set_pose_mode(PoseMode::Pose);
        let keyframes = frames
            .into_iter()
            .map(|frame| {
                rig.set_frame(frame);
                Keyframe {
                    frame,
                    transform: rig.bone_transform(bone),
                }
            })
            .collect();
        rig.set_pose_mode(active);

        records.push(BoneRecord {
            name: rig.bone_name(bone).to_string(),
            parent: rig.bone_parent(bone).map(|p| rig.bone_name(p).to_string()),
            rest,
            keyframes,
        });
    }

    tracing::debug!("Captured {} bones", records.len());
    Ok(records)
}

fn keyframe_frames<R: RigSource + ?Sized>(rig: &mut R, bone: usize) -> Result<Vec<i32>> {
    let mut frames = vec![rig.jump_to_start()];

    while let Some(next) = rig.next_keyframe(bone) {
        let previous = frames[frames.len() - 1];
        if next <= previous {
            return Err(ExportError::KeyframeOrder {
                bone: rig.bone_name(bone).to_string(),
                previous,
                next,
            });
        }
        frames.push(next);
    }

    Ok(frames)
}

/// Capture a rig and write it to `path`.
///
/// Binary output goes to `path` as given; text output goes to `path` with
/// `.yml` appended. Returns the path written.
///
/// # Errors
/// Returns an error if sampling fails, a bone name is not ASCII (binary
/// output only), or the file cannot be written.
pub fn export_skeleton<R, P>(rig: &mut R, path: P, binary: bool) -> Result<PathBuf>
where
    R: RigSource + ?Sized,
    P: AsRef<Path>,
{
    let bones = capture_skeleton(rig)?;
    save_skeleton(&bones, path, binary)
}

/// Write captured bones to `path`.
///
/// # Errors
/// Returns an error if a bone name is not ASCII (binary output only) or
/// the file cannot be written.
pub fn save_skeleton<P: AsRef<Path>>(
    bones: &[BoneRecord],
    path: P,
    binary: bool,
) -> Result<PathBuf> {
    let path = if binary {
        binary::check_names(bones)?;
        path.as_ref().to_path_buf()
    } else {
        text_path(path)
    };

    if binary {
        write_file(&path, |w| write_anim(w, bones))?;
    } else {
        write_file(&path, |w| write_anim_text(w, bones))?;
    }

    tracing::info!(
        "Exported {} bones, {} keyframes to {}",
        bones.len(),
        bones.iter().map(|b| b.keyframes.len()).sum::<usize>(),
        path.display()
    );

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RigData;
    use glam::{Quat, Vec3};
    use std::cell::RefCell;

    fn at(x: f32) -> BoneTransform {
        BoneTransform::new(Quat::IDENTITY, Vec3::new(x, 0.0, 0.0))
    }

    fn rig() -> RigData {
        let mut rig = RigData::new(1);
        let root = rig.add_bone("root", None, at(0.5));
        let arm = rig.add_bone("arm", Some(root), at(1.0));
        rig.add_key(root, 1, at(0.0));
        rig.add_key(root, 11, at(10.0));
        rig.add_key(arm, 5, at(2.0));
        rig.add_key(arm, 9, at(4.0));
        rig
    }

    #[test]
    fn test_capture_per_bone_keyframes() {
        let mut rig = rig();
        let bones = capture_skeleton(&mut rig).unwrap();

        assert_eq!(bones.len(), 2);
        assert_eq!(bones[0].name, "root");
        assert_eq!(bones[0].parent, None);
        assert_eq!(bones[1].parent.as_deref(), Some("root"));

        let root_frames: Vec<i32> = bones[0].keyframes.iter().map(|k| k.frame).collect();
        let arm_frames: Vec<i32> = bones[1].keyframes.iter().map(|k| k.frame).collect();
        assert_eq!(root_frames, vec![1, 11]);
        // Start frame is always sampled, even without a key there
        assert_eq!(arm_frames, vec![1, 5, 9]);
    }

    #[test]
    fn test_capture_samples_rest_and_pose() {
        let mut rig = rig();
        let bones = capture_skeleton(&mut rig).unwrap();

        assert_eq!(bones[0].rest, at(0.5));
        assert_eq!(bones[1].rest, at(1.0));
        assert_eq!(bones[0].keyframes[1].transform, at(10.0));
        // Before the arm's first key the first key is held
        assert_eq!(bones[1].keyframes[0].transform, at(2.0));
    }

    #[test]
    fn test_capture_restores_pose_mode() {
        let mut rig = rig();
        rig.set_pose_mode(PoseMode::Rest);
        let bones = capture_skeleton(&mut rig).unwrap();

        assert_eq!(rig.pose_mode(), PoseMode::Rest);
        // Keys are still sampled from the animated pose
        assert_eq!(bones[1].keyframes[2].transform, at(4.0));
    }

    /// Rig whose keyframe probe runs backwards.
    struct StuckRig(RigData);

    impl RigSource for StuckRig {
        fn bone_count(&self) -> usize {
            self.0.bone_count()
        }
        fn bone_name(&self, bone: usize) -> &str {
            self.0.bone_name(bone)
        }
        fn bone_parent(&self, bone: usize) -> Option<usize> {
            self.0.bone_parent(bone)
        }
        fn pose_mode(&self) -> PoseMode {
            self.0.pose_mode()
        }
        fn set_pose_mode(&mut self, mode: PoseMode) {
            self.0.set_pose_mode(mode)
        }
        fn jump_to_start(&mut self) -> i32 {
            self.0.jump_to_start()
        }
        fn next_keyframe(&mut self, _bone: usize) -> Option<i32> {
            Some(0)
        }
        fn set_frame(&mut self, frame: i32) {
            self.0.set_frame(frame)
        }
        fn bone_transform(&self, bone: usize) -> BoneTransform {
            self.0.bone_transform(bone)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum RigEvent {
        SetMode(PoseMode),
        Sample(usize, PoseMode),
    }

    /// Rig that logs mode switches and transform samples.
    struct RecordingRig {
        rig: RigData,
        events: RefCell<Vec<RigEvent>>,
    }

    impl RigSource for RecordingRig {
        fn bone_count(&self) -> usize {
            self.rig.bone_count()
        }
        fn bone_name(&self, bone: usize) -> &str {
            self.rig.bone_name(bone)
        }
        fn bone_parent(&self, bone: usize) -> Option<usize> {
            self.rig.bone_parent(bone)
        }
        fn pose_mode(&self) -> PoseMode {
            self.rig.pose_mode()
        }
        fn set_pose_mode(&mut self, mode: PoseMode) {
            self.events.borrow_mut().push(RigEvent::SetMode(mode));
            self.rig.set_pose_mode(mode)
        }
        fn jump_to_start(&mut self) -> i32 {
            self.rig.jump_to_start()
        }
        fn next_keyframe(&mut self, bone: usize) -> Option<i32> {
            self.rig.next_keyframe(bone)
        }
        fn set_frame(&mut self, frame: i32) {
            self.rig.set_frame(frame)
        }
        fn bone_transform(&self, bone: usize) -> BoneTransform {
            let mode = self.rig.pose_mode();
            self.events.borrow_mut().push(RigEvent::Sample(bone, mode));
            self.rig.bone_transform(bone)
        }
    }

    #[test]
    fn test_rest_pose_switch_is_per_bone() {
        use RigEvent::*;
        use PoseMode::{Pose, Rest};

        let mut rig = RecordingRig {
            rig: rig(),
            events: RefCell::new(Vec::new()),
        };
        capture_skeleton(&mut rig).unwrap();

        let expected = vec![
            // root: rest, restore, keys at 1 and 11, restore
            SetMode(Rest),
            Sample(0, Rest),
            SetMode(Pose),
            SetMode(Pose),
            Sample(0, Pose),
            Sample(0, Pose),
            SetMode(Pose),
            // arm: rest, restore, keys at 1, 5 and 9, restore
            SetMode(Rest),
            Sample(1, Rest),
            SetMode(Pose),
            SetMode(Pose),
            Sample(1, Pose),
            Sample(1, Pose),
            Sample(1, Pose),
            SetMode(Pose),
        ];
        assert_eq!(rig.events.into_inner(), expected);
    }

    #[test]
    fn test_stuck_probe_is_an_error() {
        let mut rig = StuckRig(rig());
        let err = capture_skeleton(&mut rig).unwrap_err();
        assert!(matches!(
            err,
            ExportError::KeyframeOrder {
                previous: 1,
                next: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_non_ascii_name_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rig.anim");
        let mut rig = RigData::new(0);
        rig.add_bone("b\u{f6}ne", None, BoneTransform::default());

        let err = export_skeleton(&mut rig, &path, true).unwrap_err();
        assert!(matches!(err, ExportError::NonAsciiName(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_text_export_uses_yml_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rig.anim");
        let written = export_skeleton(&mut rig(), &path, false).unwrap();

        assert_eq!(written, dir.path().join("rig.anim.yml"));
        let text = std::fs::read_to_string(written).unwrap();
        assert!(text.starts_with("Bones:\n  - Name:   root\n"));
    }
}
