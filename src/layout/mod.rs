//! Vertex layout building.
//!
//! Decides, from the export options, which attributes a vertex carries and
//! where each one sits inside the interleaved vertex record.

pub mod config;
pub mod element;

pub use config::{ExportConfig, MAX_UV_LAYERS};
pub use element::{VertexAttributeUsage, VertexElement, VertexElementFlags};

use crate::types::MeshSource;

/// Ordered element list plus the per-vertex stride.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    elements: Vec<VertexElement>,
    stride: usize,
}

impl VertexLayout {
    /// Build a layout from an ordered element list, assigning offsets in a
    /// single forward pass. Offsets already set on the input are ignored.
    pub fn from_elements(mut elements: Vec<VertexElement>) -> Self {
        let mut stride = 0usize;
        for element in &mut elements {
            element.offset = stride as u16;
            stride += element.size();
        }
        Self { elements, stride }
    }

    /// Build the layout for a mesh.
    pub fn for_mesh<M: MeshSource + ?Sized>(mesh: &M, config: &ExportConfig) -> Self {
        Self::for_uv_layers(mesh.uv_layer_count(), config)
    }

    /// Build the layout for a mesh with `uv_layers` UV layers.
    ///
    /// Element order: position, normal, one texture coordinate per UV
    /// layer, tangent and binormal, bone weights and bone indices.
    pub fn for_uv_layers(uv_layers: usize, config: &ExportConfig) -> Self {
        let mut elements = vec![VertexElement::float(3, VertexAttributeUsage::Position, 0)];

        if config.export_normals {
            elements.push(VertexElement::float(3, VertexAttributeUsage::Normal, 0));
        }

        if config.export_textures {
            for layer in 0..uv_layers {
                elements.push(VertexElement::float(
                    2,
                    VertexAttributeUsage::TextureCoordinate,
                    layer as u8,
                ));
            }

            // Tangent space follows the first UV layer
            if config.export_tangent_space && uv_layers > 0 {
                elements.push(VertexElement::float(3, VertexAttributeUsage::Tangent, 0));
                elements.push(VertexElement::float(3, VertexAttributeUsage::Binormal, 0));
            }
        }

        if config.export_bone_weights {
            elements.push(VertexElement::float(4, VertexAttributeUsage::BoneWeights, 0));
            elements.push(VertexElement::ushort(4, VertexAttributeUsage::BoneIndices, 0));
        }

        let layout = Self::from_elements(elements);
        tracing::debug!(
            "Vertex layout: {} elements, stride {} bytes",
            layout.len(),
            layout.stride()
        );
        layout
    }

    /// The elements in declaration order.
    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    /// Size of one vertex record in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Always false for builder output; position is mandatory.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Find the element with the given usage and usage index.
    pub fn find(&self, usage: VertexAttributeUsage, usage_index: u8) -> Option<&VertexElement> {
        self.elements
            .iter()
            .find(|e| e.usage == usage && e.usage_index == usage_index)
    }

    /// Check whether any element has the given usage.
    pub fn has(&self, usage: VertexAttributeUsage) -> bool {
        self.elements.iter().any(|e| e.usage == usage)
    }
}
