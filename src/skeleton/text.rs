//! Human-readable YAML-like skeleton dump.

use super::BoneRecord;
use crate::error::Result;
use crate::types::BoneTransform;
use std::io::Write;

/// Write bone records in text form.
///
/// # Errors
/// Returns an error if writing fails.
pub fn write_anim_text<W: Write>(writer: &mut W, bones: &[BoneRecord]) -> Result<()> {
    writeln!(writer, "Bones:")?;
    for bone in bones {
        writeln!(writer, "  - Name:   {}", bone.name)?;
        if let Some(parent) = &bone.parent {
            writeln!(writer, "    Parent: {}", parent)?;
        }

        writeln!(writer, "    Rest:")?;
        write_transform(writer, "      ", &bone.rest)?;

        writeln!(writer, "    Frames:")?;
        for key in &bone.keyframes {
            writeln!(writer, "      - Frame:       {}", key.frame)?;
            write_transform(writer, "        ", &key.transform)?;
        }
    }
    Ok(())
}

fn write_transform<W: Write>(
    writer: &mut W,
    indent: &str,
    transform: &BoneTransform,
) -> Result<()> {
    writeln!(
        writer,
        "{}Rotation:    [{}]",
        indent,
        join_floats(&transform.rotation_xyzw())
    )?;
    writeln!(
        writer,
        "{}Translation: [{}]",
        indent,
        join_floats(&transform.translation_array())
    )?;
    Ok(())
}

fn join_floats(values: &[f32]) -> String {
    values
        .iter()
        .map(|v| format!("{:.6}", v))
        .collect::<Vec<_>>()
        .join(", ")
}
