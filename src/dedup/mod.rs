//! Vertex deduplication.
//!
//! Walks the fan triangulation of every polygon and builds, for each
//! triangle corner, a composite key with one slot per vertex element.
//! Corners with equal keys become one output vertex. Output vertex indices
//! are assigned in first-seen order, so identical input always produces
//! identical output.

pub mod key;
pub mod tangent;
pub mod triangulate;
pub mod weights;

pub use key::{KeySlot, NormalSource, UvKey, UvPool, VertexKey};
pub use tangent::TangentFrame;
pub use triangulate::{fan_triangle_count, fan_triangles};
pub use weights::{collect_bone_weights, BoneWeight, BoneWeightList, MAX_INFLUENCES};

use crate::error::{ExportError, Result};
use crate::layout::{ExportConfig, VertexAttributeUsage, VertexLayout};
use crate::types::{MeshSource, Polygon};
use indexmap::IndexSet;

/// Everything the deduplication pass produces.
#[derive(Debug, Clone, Default)]
pub struct VertexPools {
    /// Unique vertex keys; the set position is the output vertex index.
    pub vertices: IndexSet<VertexKey>,
    /// One UV pool per exported UV layer.
    pub uv_pools: Vec<UvPool>,
    /// Bone weight list per source vertex (empty unless skinning is exported).
    pub bone_weights: Vec<BoneWeightList>,
    /// Tangent frame per output triangle (empty unless tangents are exported).
    pub tangent_frames: Vec<TangentFrame>,
    /// Output triangles as indices into `vertices`.
    pub triangles: Vec<[u32; 3]>,
}

impl VertexPools {
    /// Number of unique output vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of output triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

/// Builds the vertex pools for one mesh.
pub struct Deduplicator<'a, M: MeshSource + ?Sized> {
    mesh: &'a M,
    layout: &'a VertexLayout,
    flip_v: bool,
    pools: VertexPools,
}

impl<'a, M: MeshSource + ?Sized> Deduplicator<'a, M> {
    pub fn new(mesh: &'a M, layout: &'a VertexLayout, config: &ExportConfig) -> Self {
        let uv_layers = layout
            .elements()
            .iter()
            .filter(|e| e.usage == VertexAttributeUsage::TextureCoordinate)
            .count();

        Self {
            mesh,
            layout,
            flip_v: config.export_v_flipped,
            pools: VertexPools {
                uv_pools: (0..uv_layers).map(|_| UvPool::new()).collect(),
                ..VertexPools::default()
            },
        }
    }

    /// Run the pass over every polygon and return the finished pools.
    pub fn build(mut self) -> Result<VertexPools> {
        let with_tangents = self.layout.has(VertexAttributeUsage::Tangent)
            || self.layout.has(VertexAttributeUsage::Binormal);

        for polygon_index in 0..self.mesh.polygon_count() {
            let polygon = self.mesh.polygon(polygon_index);
            if polygon.loop_total < 3 {
                return Err(ExportError::InvalidTopology {
                    polygon: polygon_index,
                    corners: polygon.loop_total,
                });
            }

            let loops: Vec<usize> = polygon.loops().collect();
            for corners in fan_triangles(&loops) {
                self.add_triangle(polygon_index, &polygon, corners, with_tangents)?;
            }
        }

        if self.layout.has(VertexAttributeUsage::BoneWeights)
            || self.layout.has(VertexAttributeUsage::BoneIndices)
        {
            self.pools.bone_weights = collect_bone_weights(self.mesh)?;
        }

        tracing::debug!(
            "Deduplicated to {} vertices, {} triangles, UV pools {:?}",
            self.pools.vertex_count(),
            self.pools.triangle_count(),
            self.pools.uv_pools.iter().map(UvPool::len).collect::<Vec<_>>()
        );

        Ok(self.pools)
    }

    fn add_triangle(
        &mut self,
        polygon_index: usize,
        polygon: &Polygon,
        corners: [usize; 3],
        with_tangents: bool,
    ) -> Result<()> {
        let triangle_index = self.pools.triangles.len() as u32;

        let mut vertices = [0u32; 3];
        for (slot, &loop_index) in vertices.iter_mut().zip(&corners) {
            let vertex = self.mesh.loop_vertex(loop_index);
            if vertex as usize >= self.mesh.vertex_count() {
                return Err(ExportError::VertexOutOfRange {
                    polygon: polygon_index,
                    vertex,
                    vertex_count: self.mesh.vertex_count(),
                });
            }
            *slot = vertex;
        }

        if with_tangents {
            let positions = vertices.map(|v| self.mesh.position(v as usize));
            let uvs = corners.map(|l| self.corner_uv(0, l));
            self.pools
                .tangent_frames
                .push(TangentFrame::from_triangle(positions, uvs));
        }

        let mut triangle = [0u32; 3];
        for i in 0..3 {
            let key = self.corner_key(
                polygon_index,
                polygon,
                corners[i],
                vertices[i],
                triangle_index,
            )?;
            let (index, _) = self.pools.vertices.insert_full(key);
            triangle[i] = index as u32;
        }
        self.pools.triangles.push(triangle);

        Ok(())
    }

    fn corner_key(
        &mut self,
        polygon_index: usize,
        polygon: &Polygon,
        loop_index: usize,
        vertex: u32,
        triangle_index: u32,
    ) -> Result<VertexKey> {
        let layout = self.layout;
        let mut slots = Vec::with_capacity(layout.len());

        for element in layout.elements() {
            let slot = match element.usage {
                VertexAttributeUsage::Position => KeySlot::Position(vertex),
                VertexAttributeUsage::Normal => KeySlot::Normal(if polygon.smooth {
                    NormalSource::PerVertex(vertex)
                } else {
                    NormalSource::PerFace(polygon_index as u32)
                }),
                VertexAttributeUsage::TextureCoordinate => {
                    let layer = element.usage_index;
                    let uv = self.corner_uv(layer as usize, loop_index);
                    let pool = self.pools.uv_pools.get_mut(layer as usize).ok_or_else(|| {
                        ExportError::UnboundAttribute(format!("UV layer {} is not exported", layer))
                    })?;
                    KeySlot::TexCoord {
                        layer,
                        index: pool.insert(uv),
                    }
                }
                VertexAttributeUsage::Tangent => KeySlot::Tangent(triangle_index),
                VertexAttributeUsage::Binormal => KeySlot::Binormal(triangle_index),
                VertexAttributeUsage::BoneWeights => KeySlot::BoneWeights(vertex),
                VertexAttributeUsage::BoneIndices => KeySlot::BoneIndices(vertex),
                VertexAttributeUsage::Color | VertexAttributeUsage::Custom => {
                    return Err(ExportError::UnboundAttribute(format!(
                        "{} has no source data",
                        element.usage.name()
                    )));
                }
            };
            slots.push(slot);
        }

        Ok(VertexKey(slots))
    }

    fn corner_uv(&self, layer: usize, loop_index: usize) -> [f32; 2] {
        let [u, v] = self.mesh.loop_uv(layer, loop_index);
        if self.flip_v {
            [u, 1.0 - v]
        } else {
            [u, v]
        }
    }
}

/// Deduplicate a mesh's triangle corners against a vertex layout.
pub fn deduplicate<M: MeshSource + ?Sized>(
    mesh: &M,
    layout: &VertexLayout,
    config: &ExportConfig,
) -> Result<VertexPools> {
    Deduplicator::new(mesh, layout, config).build()
}
