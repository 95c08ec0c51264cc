//! Mesh export.
//!
//! [`MeshExport::build`] resolves a mesh into layout, vertex values and
//! triangles; [`binary`] and [`text`] serialize the result.

pub mod binary;
pub mod mesh;
pub mod text;

pub use binary::{parse_vraw, read_vraw, write_vraw, INDEX_ELEMENT_SIZE, VRAW_MAGIC};
pub use mesh::{AttributeValue, MeshExport};
pub use text::write_vraw_text;

use crate::error::Result;
use crate::layout::ExportConfig;
use crate::types::MeshSource;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Path a text export is written to: the requested path with `.yml` appended.
pub fn text_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut os = path.as_ref().as_os_str().to_owned();
    os.push(".yml");
    PathBuf::from(os)
}

/// Create `path` and fill it through a buffered writer.
///
/// The file is removed again if `fill` or the final flush fails.
pub(crate) fn write_file<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let result = fill(&mut writer).and_then(|()| writer.flush().map_err(Into::into));
    if result.is_err() {
        drop(writer);
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!("Failed to remove partial export {}: {}", path.display(), e);
        }
    }
    result
}

/// Export a mesh to `path`, in binary or text form per `config`.
///
/// Returns the path actually written, which for text output carries an
/// extra `.yml` suffix.
///
/// # Errors
/// Returns an error if the configuration cannot be satisfied by the mesh,
/// the topology is invalid, or the file cannot be written. Nothing is
/// created on disk unless the mesh resolved successfully.
pub fn export_mesh<M, P>(mesh: &M, path: P, config: &ExportConfig) -> Result<PathBuf>
where
    M: MeshSource + ?Sized,
    P: AsRef<Path>,
{
    let export = MeshExport::build(mesh, config)?;
    save_mesh(&export, path, config.export_binary)
}

/// Write an already resolved mesh to `path`.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn save_mesh<P: AsRef<Path>>(export: &MeshExport, path: P, binary: bool) -> Result<PathBuf> {
    let path = if binary {
        path.as_ref().to_path_buf()
    } else {
        text_path(path)
    };

    if binary {
        write_file(&path, |w| write_vraw(w, export))?;
    } else {
        write_file(&path, |w| write_vraw_text(w, export))?;
    }

    tracing::info!(
        "Exported {} vertices ({} elements, stride {}), {} triangles to {}",
        export.vertex_count(),
        export.layout.len(),
        export.layout.stride(),
        export.triangle_count(),
        path.display()
    );

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_path_appends_suffix() {
        assert_eq!(text_path("out/model.vraw"), PathBuf::from("out/model.vraw.yml"));
        assert_eq!(text_path("model"), PathBuf::from("model.yml"));
    }

    #[test]
    fn test_failed_fill_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.vraw");

        let result = write_file(&path, |w| {
            w.write_all(b"VRAW")?;
            Err(crate::error::ExportError::InvalidFormat("stop".to_string()))
        });

        assert!(result.is_err());
        assert!(!path.exists());
    }
}
