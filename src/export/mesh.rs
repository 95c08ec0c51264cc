//! Fully resolved vertex data, ready to serialize.

use crate::dedup::{deduplicate, KeySlot, NormalSource, VertexKey, VertexPools};
use crate::error::{ExportError, Result};
use crate::layout::{ExportConfig, VertexElement, VertexElementFlags, VertexLayout};
use crate::types::MeshSource;

/// Value of one vertex element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeValue {
    Float2([f32; 2]),
    Float3([f32; 3]),
    Float4([f32; 4]),
    UShort4([u16; 4]),
}

/// How an element's components are encoded on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ComponentEncoding {
    Float(usize),
    UShort4,
}

impl ComponentEncoding {
    pub(crate) fn of(element: &VertexElement) -> Result<Self> {
        let float = element.flags.contains(VertexElementFlags::FLOAT);
        match (element.component_size, element.component_count, float) {
            (4, count @ 2..=4, true) => Ok(Self::Float(count as usize)),
            (2, 4, false) => Ok(Self::UShort4),
            (size, count, _) => Err(ExportError::InvalidFormat(format!(
                "unsupported {} element encoding: {} x {} bytes, flags {:#04x}",
                element.usage.name(),
                count,
                size,
                element.flags.bits()
            ))),
        }
    }
}

/// Layout, per-vertex attribute values and triangles of one export.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshExport {
    pub layout: VertexLayout,
    /// One value per layout element for every unique vertex.
    pub vertices: Vec<Vec<AttributeValue>>,
    pub triangles: Vec<[u32; 3]>,
}

impl MeshExport {
    /// Validate, lay out, deduplicate and resolve a mesh.
    ///
    /// Everything that can fail short of I/O fails here, before any file
    /// is opened.
    pub fn build<M: MeshSource + ?Sized>(mesh: &M, config: &ExportConfig) -> Result<Self> {
        config.validate(mesh)?;
        let layout = VertexLayout::for_mesh(mesh, config);
        let pools = deduplicate(mesh, &layout, config)?;
        Ok(Self::from_pools(mesh, layout, &pools))
    }

    /// Resolve pooled keys into attribute values.
    pub fn from_pools<M: MeshSource + ?Sized>(
        mesh: &M,
        layout: VertexLayout,
        pools: &VertexPools,
    ) -> Self {
        let vertices = pools
            .vertices
            .iter()
            .map(|key| resolve_vertex(mesh, pools, key))
            .collect();

        Self {
            layout,
            vertices,
            triangles: pools.triangles.clone(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Triangle indices flattened into an index buffer.
    pub fn indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}

fn resolve_vertex<M: MeshSource + ?Sized>(
    mesh: &M,
    pools: &VertexPools,
    key: &VertexKey,
) -> Vec<AttributeValue> {
    key.slots()
        .iter()
        .map(|slot| match *slot {
            KeySlot::Position(v) => AttributeValue::Float3(mesh.position(v as usize)),
            KeySlot::Normal(NormalSource::PerVertex(v)) => {
                AttributeValue::Float3(mesh.vertex_normal(v as usize))
            }
            KeySlot::Normal(NormalSource::PerFace(p)) => {
                AttributeValue::Float3(mesh.polygon(p as usize).normal)
            }
            // Pool indices were handed out by the same pass that filled the pools
            KeySlot::TexCoord { layer, index } => AttributeValue::Float2(
                pools.uv_pools[layer as usize]
                    .get(index)
                    .unwrap_or_default(),
            ),
            KeySlot::Tangent(t) => AttributeValue::Float3(pools.tangent_frames[t as usize].tangent),
            KeySlot::Binormal(t) => {
                AttributeValue::Float3(pools.tangent_frames[t as usize].binormal)
            }
            KeySlot::BoneWeights(v) => {
                AttributeValue::Float4(pools.bone_weights[v as usize].weights())
            }
            KeySlot::BoneIndices(v) => {
                AttributeValue::UShort4(pools.bone_weights[v as usize].bones())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MeshData;
    use crate::types::BoneInfluence;

    fn hinge(smooth: bool) -> MeshData {
        let mut mesh = MeshData::new(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
        ]);
        mesh.add_polygon(&[0, 1, 2], smooth);
        mesh.add_polygon(&[1, 3, 2], smooth);
        mesh
    }

    #[test]
    fn test_flat_normals_come_from_faces() {
        let mut mesh = hinge(false);
        mesh.set_normal(0, [1.0, 0.0, 0.0]);
        let config = ExportConfig::default().with_normals(true);
        let export = MeshExport::build(&mesh, &config).unwrap();

        assert_eq!(export.vertex_count(), 6);
        for vertex in &export.vertices {
            assert_eq!(vertex[1], AttributeValue::Float3([0.0, 0.0, 1.0]));
        }
    }

    #[test]
    fn test_smooth_normals_come_from_vertices() {
        let mut mesh = hinge(true);
        mesh.set_normal(0, [1.0, 0.0, 0.0]);
        let config = ExportConfig::default().with_normals(true);
        let export = MeshExport::build(&mesh, &config).unwrap();

        assert_eq!(export.vertex_count(), 4);
        assert_eq!(export.vertices[0][0], AttributeValue::Float3([0.0, 0.0, 0.0]));
        assert_eq!(export.vertices[0][1], AttributeValue::Float3([1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_skinned_vertex_values() {
        let mut mesh = hinge(true);
        mesh.add_influence(3, BoneInfluence::new(4, 0.6));
        mesh.add_influence(3, BoneInfluence::new(2, 0.4));
        let config = ExportConfig::default().with_bone_weights(true);
        let export = MeshExport::build(&mesh, &config).unwrap();

        // Source vertex 3 is first seen as output vertex 3
        assert_eq!(export.vertices[3][1], AttributeValue::Float4([0.6, 0.4, 0.0, 0.0]));
        assert_eq!(export.vertices[3][2], AttributeValue::UShort4([4, 2, 0, 0]));
        assert_eq!(export.vertices[0][2], AttributeValue::UShort4([0, 0, 0, 0]));
    }

    #[test]
    fn test_unbound_tangents_rejected() {
        let mesh = hinge(true);
        let config = ExportConfig::default()
            .with_textures(true)
            .with_tangent_space(true);
        let err = MeshExport::build(&mesh, &config).unwrap_err();
        assert!(matches!(err, ExportError::UnboundAttribute(_)));
    }

    #[test]
    fn test_unbound_bone_weights_rejected() {
        let config = ExportConfig::default().with_bone_weights(true);
        let err = MeshExport::build(&hinge(true), &config).unwrap_err();
        assert!(matches!(err, ExportError::UnboundAttribute(_)));
    }

    #[test]
    fn test_indices_flatten_triangles() {
        let export = MeshExport::build(&hinge(true), &ExportConfig::default()).unwrap();
        assert_eq!(export.indices(), vec![0, 1, 2, 1, 3, 2]);
    }

    #[test]
    fn test_encoding_of_builder_elements() {
        use crate::layout::VertexAttributeUsage::*;
        assert_eq!(
            ComponentEncoding::of(&VertexElement::float(2, TextureCoordinate, 0)).unwrap(),
            ComponentEncoding::Float(2)
        );
        assert_eq!(
            ComponentEncoding::of(&VertexElement::ushort(4, BoneIndices, 0)).unwrap(),
            ComponentEncoding::UShort4
        );
        assert!(ComponentEncoding::of(&VertexElement::ushort(3, Custom, 0)).is_err());
    }
}
