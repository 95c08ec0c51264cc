//! Composite vertex keys and per-channel value pools.

use indexmap::IndexMap;

/// Scale of the UV quantization grid (4 decimal digits).
const UV_GRID: f64 = 10_000.0;

/// Bias that keeps float32 values stored just under a grid line on that line.
const UV_SNAP: f64 = 1e-3;

/// Where a vertex normal comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalSource {
    /// Smooth normal of a source vertex.
    PerVertex(u32),
    /// Face normal of a flat-shaded polygon.
    PerFace(u32),
}

/// One slot of a composite vertex key, one per vertex element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySlot {
    /// Source vertex index.
    Position(u32),
    Normal(NormalSource),
    /// Index into the UV pool of `layer`.
    TexCoord { layer: u8, index: u32 },
    /// Output triangle whose tangent frame the vertex uses.
    Tangent(u32),
    /// Output triangle whose tangent frame the vertex uses.
    Binormal(u32),
    /// Source vertex whose bone weight list supplies the weights.
    BoneWeights(u32),
    /// Source vertex whose bone weight list supplies the indices.
    BoneIndices(u32),
}

/// Identity of an output vertex: one slot per vertex element, in element order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexKey(pub Vec<KeySlot>);

impl VertexKey {
    pub fn slots(&self) -> &[KeySlot] {
        &self.0
    }
}

/// UV value snapped down to the 1e-4 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UvKey(i64, i64);

impl UvKey {
    pub fn new(uv: [f32; 2]) -> Self {
        Self(quantize(uv[0]), quantize(uv[1]))
    }

    /// The grid point this key stands for.
    pub fn value(&self) -> [f32; 2] {
        [
            (self.0 as f64 / UV_GRID) as f32,
            (self.1 as f64 / UV_GRID) as f32,
        ]
    }
}

fn quantize(v: f32) -> i64 {
    (f64::from(v) * UV_GRID + UV_SNAP).floor() as i64
}

/// First-seen pool of UV values for one layer.
///
/// Values whose keys collide share the index of the first one seen, and
/// that first value is the one serialized. Writing the raw first value
/// instead of the snapped grid point ([`UvKey::value`]) means a mesh
/// whose UVs never collide reads back bit for bit. Exporters that store
/// the grid point differ from this by at most one grid step.
#[derive(Debug, Clone, Default)]
pub struct UvPool {
    values: IndexMap<UvKey, [f32; 2]>,
}

impl UvPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `uv`, inserting it if its key has not been seen yet.
    pub fn insert(&mut self, uv: [f32; 2]) -> u32 {
        let entry = self.values.entry(UvKey::new(uv));
        let index = entry.index();
        entry.or_insert(uv);
        index as u32
    }

    /// Value stored at a pool index.
    pub fn get(&self, index: u32) -> Option<[f32; 2]> {
        self.values.get_index(index as usize).map(|(_, uv)| *uv)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Pool values in index order.
    pub fn values(&self) -> impl Iterator<Item = [f32; 2]> + '_ {
        self.values.values().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uv_noise_shares_key() {
        assert_eq!(UvKey::new([0.123449, 0.5]), UvKey::new([0.123451, 0.5]));
        assert_eq!(UvKey::new([0.123449, 0.5]).value(), [0.1234, 0.5]);
    }

    #[test]
    fn test_uv_on_grid_line_is_stable() {
        // 0.7 is stored as 0.69999999 in float32
        assert_eq!(UvKey::new([0.7, 0.3]).value(), [0.7, 0.3]);
        assert_eq!(UvKey::new([-0.5, 1.0]).value(), [-0.5, 1.0]);
    }

    #[test]
    fn test_distinct_uvs_get_distinct_keys() {
        assert_ne!(UvKey::new([0.1234, 0.5]), UvKey::new([0.1235, 0.5]));
        assert_ne!(UvKey::new([0.5, 0.1234]), UvKey::new([0.5, 0.1235]));
    }

    #[test]
    fn test_pool_first_seen_order() {
        let mut pool = UvPool::new();
        assert_eq!(pool.insert([0.0, 0.0]), 0);
        assert_eq!(pool.insert([1.0, 0.0]), 1);
        assert_eq!(pool.insert([0.123449, 0.5]), 2);
        assert_eq!(pool.insert([0.123451, 0.5]), 2);
        assert_eq!(pool.insert([0.0, 0.0]), 0);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(2), Some([0.123449, 0.5]));
        assert_ne!(pool.get(2), Some(UvKey::new([0.123449, 0.5]).value()));
        assert_eq!(pool.get(3), None);
    }

    #[test]
    fn test_vertex_key_equality_is_slotwise() {
        let a = VertexKey(vec![KeySlot::Position(3), KeySlot::Normal(NormalSource::PerVertex(3))]);
        let b = VertexKey(vec![KeySlot::Position(3), KeySlot::Normal(NormalSource::PerVertex(3))]);
        let c = VertexKey(vec![KeySlot::Position(3), KeySlot::Normal(NormalSource::PerFace(3))]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
