//! ANIM binary skeleton files.
//!
//! Layout (little-endian):
//!
//! ```text
//! "ANIM"
//! u32 bone count
//! per bone:
//!   u32 name length, ASCII name
//!   u32 parent name length (0 for a root), ASCII parent name
//!   f32 x4 rest rotation (x, y, z, w), f32 x3 rest translation
//!   u32 keyframe count
//!   per keyframe: i32 frame, f32 x4 rotation, f32 x3 translation
//! ```

#![allow(clippy::cast_possible_truncation)]

use super::{BoneRecord, Keyframe};
use crate::error::{ExportError, Result};
use crate::types::BoneTransform;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::{Quat, Vec3};
use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::Path;

/// File signature.
pub const ANIM_MAGIC: &[u8; 4] = b"ANIM";

/// Upper bound for up-front allocations driven by counts read from a file.
const MAX_PREALLOCATION: usize = 1 << 16;

/// Fail with [`ExportError::NonAsciiName`] on the first bone or parent
/// name that is not ASCII.
pub(crate) fn check_names(bones: &[BoneRecord]) -> Result<()> {
    let names = bones
        .iter()
        .flat_map(|b| std::iter::once(&b.name).chain(b.parent.as_ref()));
    for name in names {
        if !name.is_ascii() {
            return Err(ExportError::NonAsciiName(name.clone()));
        }
    }
    Ok(())
}

/// Write bone records in ANIM form.
///
/// # Errors
/// Returns [`ExportError::NonAsciiName`] before writing anything if a
/// name is not ASCII, or an I/O error if writing fails.
pub fn write_anim<W: Write>(writer: &mut W, bones: &[BoneRecord]) -> Result<()> {
    check_names(bones)?;

    writer.write_all(ANIM_MAGIC)?;
    writer.write_u32::<LittleEndian>(bones.len() as u32)?;

    for bone in bones {
        write_name(writer, &bone.name)?;
        write_name(writer, bone.parent.as_deref().unwrap_or(""))?;
        write_transform(writer, &bone.rest)?;

        writer.write_u32::<LittleEndian>(bone.keyframes.len() as u32)?;
        for key in &bone.keyframes {
            writer.write_i32::<LittleEndian>(key.frame)?;
            write_transform(writer, &key.transform)?;
        }
    }

    Ok(())
}

fn write_name<W: Write>(writer: &mut W, name: &str) -> Result<()> {
    writer.write_u32::<LittleEndian>(name.len() as u32)?;
    writer.write_all(name.as_bytes())?;
    Ok(())
}

fn write_transform<W: Write>(writer: &mut W, transform: &BoneTransform) -> Result<()> {
    for v in transform.rotation_xyzw() {
        writer.write_f32::<LittleEndian>(v)?;
    }
    for v in transform.translation_array() {
        writer.write_f32::<LittleEndian>(v)?;
    }
    Ok(())
}

/// Read an ANIM file from disk.
///
/// # Errors
/// Returns [`ExportError::Io`] if the file cannot be read or is truncated,
/// and [`ExportError::InvalidFormat`] if it is not a valid ANIM file.
pub fn read_anim<P: AsRef<Path>>(path: P) -> Result<Vec<BoneRecord>> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    parse_anim(&buffer)
}

/// Parse ANIM data from bytes.
///
/// # Errors
/// Returns [`ExportError::Io`] on truncated data and
/// [`ExportError::InvalidFormat`] on a bad header or name.
pub fn parse_anim(data: &[u8]) -> Result<Vec<BoneRecord>> {
    let mut cursor = Cursor::new(data);

    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic)?;
    if &magic != ANIM_MAGIC {
        return Err(ExportError::InvalidFormat(format!(
            "bad ANIM magic {:?}",
            String::from_utf8_lossy(&magic)
        )));
    }

    let bone_count = cursor.read_u32::<LittleEndian>()? as usize;
    let mut bones = Vec::with_capacity(bone_count.min(MAX_PREALLOCATION));

    for _ in 0..bone_count {
        let name = read_name(&mut cursor)?;
        let parent = Some(read_name(&mut cursor)?).filter(|p| !p.is_empty());
        let rest = read_transform(&mut cursor)?;

        let key_count = cursor.read_u32::<LittleEndian>()? as usize;
        let mut keyframes = Vec::with_capacity(key_count.min(MAX_PREALLOCATION));
        for _ in 0..key_count {
            let frame = cursor.read_i32::<LittleEndian>()?;
            let transform = read_transform(&mut cursor)?;
            keyframes.push(Keyframe { frame, transform });
        }

        bones.push(BoneRecord {
            name,
            parent,
            rest,
            keyframes,
        });
    }

    Ok(bones)
}

fn read_name(cursor: &mut Cursor<&[u8]>) -> Result<String> {
    let len = cursor.read_u32::<LittleEndian>()? as u64;
    let mut bytes = Vec::new();
    (&mut *cursor).take(len).read_to_end(&mut bytes)?;
    if bytes.len() as u64 != len {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated bone name").into());
    }
    if !bytes.is_ascii() {
        return Err(ExportError::InvalidFormat(format!(
            "bone name {:?} is not ASCII",
            String::from_utf8_lossy(&bytes)
        )));
    }
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

fn read_transform(cursor: &mut Cursor<&[u8]>) -> Result<BoneTransform> {
    let mut rotation = [0f32; 4];
    cursor.read_f32_into::<LittleEndian>(&mut rotation)?;
    let mut translation = [0f32; 3];
    cursor.read_f32_into::<LittleEndian>(&mut translation)?;
    Ok(BoneTransform::new(
        Quat::from_array(rotation),
        Vec3::from(translation),
    ))
}
