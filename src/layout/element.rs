//! Vertex element descriptors.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Semantic role of a vertex attribute.
///
/// The discriminants are the values stored in the low nibble of the
/// packed usage byte of a VRAW element record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum VertexAttributeUsage {
    Position = 0,
    TextureCoordinate = 1,
    Normal = 2,
    Color = 3,
    Binormal = 4,
    Tangent = 5,
    BoneWeights = 6,
    BoneIndices = 7,
    Custom = 8,
}

impl VertexAttributeUsage {
    /// All usages in discriminant order.
    pub const ALL: [VertexAttributeUsage; 9] = [
        VertexAttributeUsage::Position,
        VertexAttributeUsage::TextureCoordinate,
        VertexAttributeUsage::Normal,
        VertexAttributeUsage::Color,
        VertexAttributeUsage::Binormal,
        VertexAttributeUsage::Tangent,
        VertexAttributeUsage::BoneWeights,
        VertexAttributeUsage::BoneIndices,
        VertexAttributeUsage::Custom,
    ];

    /// Decode a usage from its numeric value.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Upper-case name used by the text format.
    pub fn name(&self) -> &'static str {
        match self {
            VertexAttributeUsage::Position => "POSITION",
            VertexAttributeUsage::TextureCoordinate => "TEXTURE_COORDINATE",
            VertexAttributeUsage::Normal => "NORMAL",
            VertexAttributeUsage::Color => "COLOR",
            VertexAttributeUsage::Binormal => "BINORMAL",
            VertexAttributeUsage::Tangent => "TANGENT",
            VertexAttributeUsage::BoneWeights => "BONE_WEIGHTS",
            VertexAttributeUsage::BoneIndices => "BONE_INDICES",
            VertexAttributeUsage::Custom => "CUSTOM",
        }
    }
}

bitflags! {
    /// How the component bytes of an element are interpreted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VertexElementFlags: u8 {
        /// Components are IEEE floats.
        const FLOAT = 0x01;
        /// Components are unsigned integers.
        const UNSIGNED = 0x02;
        /// Integer components map to [0, 1] (or [-1, 1]).
        const NORMALIZED = 0x04;
    }
}

/// Byte layout of one attribute channel inside an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexElement {
    /// Byte offset within the vertex record.
    pub offset: u16,
    /// Bytes per scalar component.
    pub component_size: u8,
    /// Number of components (1-4).
    pub component_count: u8,
    /// Semantic role.
    pub usage: VertexAttributeUsage,
    /// Disambiguates channels of the same usage (UV layer 0, 1, ...).
    pub usage_index: u8,
    /// Component interpretation.
    pub flags: VertexElementFlags,
}

impl VertexElement {
    /// Create an element with offset 0; offsets are assigned by the layout.
    pub fn new(
        component_size: u8,
        component_count: u8,
        usage: VertexAttributeUsage,
        usage_index: u8,
        flags: VertexElementFlags,
    ) -> Self {
        Self {
            offset: 0,
            component_size,
            component_count,
            usage,
            usage_index,
            flags,
        }
    }

    /// float32 element with `count` components.
    pub fn float(count: u8, usage: VertexAttributeUsage, usage_index: u8) -> Self {
        Self::new(4, count, usage, usage_index, VertexElementFlags::FLOAT)
    }

    /// uint16 element with `count` components.
    pub fn ushort(count: u8, usage: VertexAttributeUsage, usage_index: u8) -> Self {
        Self::new(2, count, usage, usage_index, VertexElementFlags::UNSIGNED)
    }

    /// Size of this element in bytes.
    pub fn size(&self) -> usize {
        self.component_size as usize * self.component_count as usize
    }

    /// `usage_index << 4 | usage`, as stored in VRAW files.
    pub fn packed_usage(&self) -> u8 {
        (self.usage_index << 4) | self.usage as u8
    }

    /// Split a packed usage byte into (usage, usage index).
    pub fn unpack_usage(packed: u8) -> Option<(VertexAttributeUsage, u8)> {
        VertexAttributeUsage::from_u8(packed & 0x0F).map(|usage| (usage, packed >> 4))
    }
}
