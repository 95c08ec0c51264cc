//! Per-vertex bone weight lists.

use crate::error::{ExportError, Result};
use crate::types::MeshSource;

/// Number of bone influences kept per vertex.
pub const MAX_INFLUENCES: usize = 4;

/// One (bone, weight) entry of a bone weight list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoneWeight {
    pub bone: u16,
    pub weight: f32,
}

impl BoneWeight {
    pub fn new(bone: u16, weight: f32) -> Self {
        Self { bone, weight }
    }
}

/// The four strongest influences on a vertex, strongest first.
///
/// Unused entries are `(0, 0.0)`, which binds to bone 0 with no influence.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoneWeightList([BoneWeight; MAX_INFLUENCES]);

impl BoneWeightList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an influence before the first entry with a lower weight,
    /// dropping the weakest entry. Influences weaker than every entry are
    /// ignored, as are ties with the last entry.
    pub fn insert(&mut self, entry: BoneWeight) {
        if let Some(pos) = self.0.iter().position(|w| entry.weight > w.weight) {
            self.0.copy_within(pos..MAX_INFLUENCES - 1, pos + 1);
            self.0[pos] = entry;
        }
    }

    pub fn entries(&self) -> &[BoneWeight; MAX_INFLUENCES] {
        &self.0
    }

    /// Weights in list order.
    pub fn weights(&self) -> [f32; MAX_INFLUENCES] {
        self.0.map(|w| w.weight)
    }

    /// Bone indices in list order.
    pub fn bones(&self) -> [u16; MAX_INFLUENCES] {
        self.0.map(|w| w.bone)
    }
}

/// Build the weight list of every source vertex.
///
/// Influences with a weight of zero or less are skipped. Bone indices must
/// fit the 16-bit index channel.
pub fn collect_bone_weights<M: MeshSource + ?Sized>(mesh: &M) -> Result<Vec<BoneWeightList>> {
    let mut lists = Vec::with_capacity(mesh.vertex_count());

    for vertex in 0..mesh.vertex_count() {
        let mut list = BoneWeightList::new();
        for influence in mesh.bone_influences(vertex) {
            if influence.weight <= 0.0 {
                continue;
            }
            let bone = u16::try_from(influence.bone).map_err(|_| ExportError::BoneIndexOutOfRange {
                vertex,
                bone: influence.bone,
            })?;
            list.insert(BoneWeight::new(bone, influence.weight));
        }
        lists.push(list);
    }

    Ok(lists)
}
