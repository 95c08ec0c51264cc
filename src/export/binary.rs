//! VRAW binary mesh files.
//!
//! Layout (little-endian):
//!
//! ```text
//! "VRAW"
//! u32 element count
//! per element: u16 offset, u8 component size, u8 component count,
//!              u8 usage index << 4 | usage, u8 flags
//! u32 index element size (always 4)
//! u32 vertex count
//! per vertex: every element's components in declared order
//! u32 index count (triangles * 3)
//! u32 indices
//! ```

#![allow(clippy::cast_possible_truncation)]

use super::mesh::{AttributeValue, ComponentEncoding, MeshExport};
use crate::error::{ExportError, Result};
use crate::layout::{VertexElement, VertexElementFlags, VertexLayout};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::Path;

/// File signature.
pub const VRAW_MAGIC: &[u8; 4] = b"VRAW";

/// Bytes per triangle index.
pub const INDEX_ELEMENT_SIZE: u32 = 4;

/// Upper bound for up-front allocations driven by counts read from a file.
const MAX_PREALLOCATION: usize = 1 << 16;

/// Write a mesh export in VRAW form.
///
/// # Errors
/// Returns an error if writing fails or a vertex value does not match its element.
pub fn write_vraw<W: Write>(writer: &mut W, export: &MeshExport) -> Result<()> {
    let elements = export.layout.elements();

    writer.write_all(VRAW_MAGIC)?;
    writer.write_u32::<LittleEndian>(elements.len() as u32)?;
    for element in elements {
        writer.write_u16::<LittleEndian>(element.offset)?;
        writer.write_u8(element.component_size)?;
        writer.write_u8(element.component_count)?;
        writer.write_u8(element.packed_usage())?;
        writer.write_u8(element.flags.bits())?;
    }

    writer.write_u32::<LittleEndian>(INDEX_ELEMENT_SIZE)?;
    writer.write_u32::<LittleEndian>(export.vertex_count() as u32)?;
    for (index, vertex) in export.vertices.iter().enumerate() {
        if vertex.len() != elements.len() {
            return Err(ExportError::InvalidFormat(format!(
                "vertex {} has {} values for {} elements",
                index,
                vertex.len(),
                elements.len()
            )));
        }
        for (element, value) in elements.iter().zip(vertex) {
            write_value(writer, element, value)?;
        }
    }

    writer.write_u32::<LittleEndian>(export.triangle_count() as u32 * 3)?;
    for triangle in &export.triangles {
        for &index in triangle {
            writer.write_u32::<LittleEndian>(index)?;
        }
    }

    Ok(())
}

fn write_value<W: Write>(
    writer: &mut W,
    element: &VertexElement,
    value: &AttributeValue,
) -> Result<()> {
    match (ComponentEncoding::of(element)?, value) {
        (ComponentEncoding::Float(2), AttributeValue::Float2(v)) => write_floats(writer, v),
        (ComponentEncoding::Float(3), AttributeValue::Float3(v)) => write_floats(writer, v),
        (ComponentEncoding::Float(4), AttributeValue::Float4(v)) => write_floats(writer, v),
        (ComponentEncoding::UShort4, AttributeValue::UShort4(v)) => {
            for &c in v {
                writer.write_u16::<LittleEndian>(c)?;
            }
            Ok(())
        }
        (_, value) => Err(ExportError::InvalidFormat(format!(
            "{} element cannot hold {:?}",
            element.usage.name(),
            value
        ))),
    }
}

fn write_floats<W: Write>(writer: &mut W, values: &[f32]) -> Result<()> {
    for &v in values {
        writer.write_f32::<LittleEndian>(v)?;
    }
    Ok(())
}

/// Read a VRAW file from disk.
///
/// # Errors
/// Returns [`ExportError::Io`] if the file cannot be read or is truncated,
/// and [`ExportError::InvalidFormat`] if its contents are not a valid VRAW mesh.
pub fn read_vraw<P: AsRef<Path>>(path: P) -> Result<MeshExport> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    parse_vraw(&buffer)
}

/// Parse VRAW data from bytes.
///
/// # Errors
/// Returns [`ExportError::Io`] on truncated data and
/// [`ExportError::InvalidFormat`] on a bad header or element table.
pub fn parse_vraw(data: &[u8]) -> Result<MeshExport> {
    let mut cursor = Cursor::new(data);

    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic)?;
    if &magic != VRAW_MAGIC {
        return Err(ExportError::InvalidFormat(format!(
            "bad VRAW magic {:?}",
            String::from_utf8_lossy(&magic)
        )));
    }

    let element_count = cursor.read_u32::<LittleEndian>()? as usize;
    let mut elements = Vec::with_capacity(element_count.min(MAX_PREALLOCATION));
    for i in 0..element_count {
        let offset = cursor.read_u16::<LittleEndian>()?;
        let component_size = cursor.read_u8()?;
        let component_count = cursor.read_u8()?;
        let packed = cursor.read_u8()?;
        let flag_bits = cursor.read_u8()?;

        let (usage, usage_index) = VertexElement::unpack_usage(packed).ok_or_else(|| {
            ExportError::InvalidFormat(format!("element {} has unknown usage {:#04x}", i, packed))
        })?;
        let flags = VertexElementFlags::from_bits(flag_bits).ok_or_else(|| {
            ExportError::InvalidFormat(format!(
                "element {} has unknown flags {:#04x}",
                i, flag_bits
            ))
        })?;

        let mut element =
            VertexElement::new(component_size, component_count, usage, usage_index, flags);
        element.offset = offset;
        elements.push(element);
    }

    let layout = VertexLayout::from_elements(elements.clone());
    if layout.elements() != elements.as_slice() {
        return Err(ExportError::InvalidFormat(
            "element offsets are not packed in declaration order".to_string(),
        ));
    }
    if layout.is_empty() {
        return Err(ExportError::InvalidFormat("mesh has no vertex elements".to_string()));
    }

    let index_size = cursor.read_u32::<LittleEndian>()?;
    if index_size != INDEX_ELEMENT_SIZE {
        return Err(ExportError::InvalidFormat(format!(
            "unsupported index element size {}",
            index_size
        )));
    }

    let encodings = layout
        .elements()
        .iter()
        .map(ComponentEncoding::of)
        .collect::<Result<Vec<_>>>()?;

    let vertex_count = cursor.read_u32::<LittleEndian>()? as usize;
    let mut vertices = Vec::with_capacity(vertex_count.min(MAX_PREALLOCATION));
    for _ in 0..vertex_count {
        let vertex = encodings
            .iter()
            .map(|&encoding| read_value(&mut cursor, encoding))
            .collect::<Result<Vec<_>>>()?;
        vertices.push(vertex);
    }

    let index_count = cursor.read_u32::<LittleEndian>()? as usize;
    if index_count % 3 != 0 {
        return Err(ExportError::InvalidFormat(format!(
            "index count {} is not a multiple of 3",
            index_count
        )));
    }
    let mut triangles = Vec::with_capacity((index_count / 3).min(MAX_PREALLOCATION));
    for _ in 0..index_count / 3 {
        let a = cursor.read_u32::<LittleEndian>()?;
        let b = cursor.read_u32::<LittleEndian>()?;
        let c = cursor.read_u32::<LittleEndian>()?;
        triangles.push([a, b, c]);
    }

    Ok(MeshExport {
        layout,
        vertices,
        triangles,
    })
}

fn read_value(cursor: &mut Cursor<&[u8]>, encoding: ComponentEncoding) -> Result<AttributeValue> {
    Ok(match encoding {
        ComponentEncoding::Float(2) => AttributeValue::Float2(read_floats(cursor)?),
        ComponentEncoding::Float(3) => AttributeValue::Float3(read_floats(cursor)?),
        ComponentEncoding::Float(_) => AttributeValue::Float4(read_floats(cursor)?),
        ComponentEncoding::UShort4 => {
            let mut v = [0u16; 4];
            cursor.read_u16_into::<LittleEndian>(&mut v)?;
            AttributeValue::UShort4(v)
        }
    })
}

fn read_floats<const N: usize>(cursor: &mut Cursor<&[u8]>) -> Result<[f32; N]> {
    let mut v = [0f32; N];
    cursor.read_f32_into::<LittleEndian>(&mut v)?;
    Ok(v)
}
