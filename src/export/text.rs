//! Human-readable YAML-like mesh dump.

use super::mesh::{AttributeValue, MeshExport};
use crate::error::Result;
use crate::layout::VertexAttributeUsage;
use std::io::Write;

/// Write a mesh export in text form.
///
/// # Errors
/// Returns an error if writing fails.
pub fn write_vraw_text<W: Write>(writer: &mut W, export: &MeshExport) -> Result<()> {
    let elements = export.layout.elements();

    writeln!(writer, "VertexElements:")?;
    for element in elements {
        writeln!(writer, "  - Offset:     {}", element.offset)?;
        writeln!(writer, "    CompSize:   {}", element.component_size)?;
        writeln!(writer, "    CompCount:  {}", element.component_count)?;
        writeln!(writer, "    UsageType:  {}", element.usage.name())?;
        writeln!(writer, "    UsageIndex: {}", element.usage_index)?;
        writeln!(writer, "    Flags:      {}", element.flags.bits())?;
    }

    writeln!(writer, "Vertices:")?;
    for vertex in &export.vertices {
        for (i, (element, value)) in elements.iter().zip(vertex).enumerate() {
            let lead = if i == 0 { "  - " } else { "    " };
            let name = format!("{}{}:", label(element.usage), element.usage_index);
            writeln!(writer, "{}{:<10} [{}]", lead, name, format_value(value))?;
        }
    }

    writeln!(writer, "Triangles:")?;
    for [a, b, c] in &export.triangles {
        writeln!(writer, "  - [{},{},{}]", a, b, c)?;
    }

    Ok(())
}

fn label(usage: VertexAttributeUsage) -> &'static str {
    match usage {
        VertexAttributeUsage::Position => "Position",
        VertexAttributeUsage::TextureCoordinate => "TexCoord",
        VertexAttributeUsage::Normal => "Normal",
        VertexAttributeUsage::Color => "Color",
        VertexAttributeUsage::Binormal => "Binormal",
        VertexAttributeUsage::Tangent => "Tangent",
        VertexAttributeUsage::BoneWeights => "BWeights",
        VertexAttributeUsage::BoneIndices => "BIndices",
        VertexAttributeUsage::Custom => "Custom",
    }
}

fn format_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Float2(v) => join_floats(v),
        AttributeValue::Float3(v) => join_floats(v),
        AttributeValue::Float4(v) => join_floats(v),
        AttributeValue::UShort4(v) => v.iter().map(u16::to_string).collect::<Vec<_>>().join(","),
    }
}

fn join_floats(values: &[f32]) -> String {
    values
        .iter()
        .map(|v| format!("{:.6}", v))
        .collect::<Vec<_>>()
        .join(",")
}
