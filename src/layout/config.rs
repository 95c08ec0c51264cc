//! Export options.

use crate::error::{ExportError, Result};
use crate::types::MeshSource;
use serde::{Deserialize, Serialize};

/// Highest UV layer count whose indices fit the packed usage nibble.
pub const MAX_UV_LAYERS: usize = 16;

/// Which attributes to export and in which file form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Export a normal per vertex.
    pub export_normals: bool,
    /// Export one texture coordinate channel per UV layer.
    pub export_textures: bool,
    /// Export tangent and binormal for the first UV layer.
    pub export_tangent_space: bool,
    /// Flip V (1 - v) in all UV layers.
    pub export_v_flipped: bool,
    /// Export bone weights and indices.
    pub export_bone_weights: bool,
    /// Write the binary form instead of the text form.
    pub export_binary: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_normals: false,
            export_textures: false,
            export_tangent_space: false,
            export_v_flipped: false,
            export_bone_weights: false,
            export_binary: true,
        }
    }
}

impl ExportConfig {
    /// Position-only binary export.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config with vertex normals enabled or disabled.
    pub fn with_normals(mut self, enabled: bool) -> Self {
        self.export_normals = enabled;
        self
    }

    /// Create config with texture coordinates enabled or disabled.
    pub fn with_textures(mut self, enabled: bool) -> Self {
        self.export_textures = enabled;
        self
    }

    /// Create config with tangents and binormals enabled or disabled.
    pub fn with_tangent_space(mut self, enabled: bool) -> Self {
        self.export_tangent_space = enabled;
        self
    }

    /// Create config with the V coordinate flipped or not.
    pub fn with_v_flipped(mut self, enabled: bool) -> Self {
        self.export_v_flipped = enabled;
        self
    }

    /// Create config with bone weights and indices enabled or disabled.
    pub fn with_bone_weights(mut self, enabled: bool) -> Self {
        self.export_bone_weights = enabled;
        self
    }

    /// Create config writing the binary form, or the text form when disabled.
    pub fn with_binary(mut self, enabled: bool) -> Self {
        self.export_binary = enabled;
        self
    }

    /// Check that the mesh can supply every attribute this configuration
    /// asks for. Runs before any output file is created.
    pub fn validate<M: MeshSource + ?Sized>(&self, mesh: &M) -> Result<()> {
        let uv_layers = mesh.uv_layer_count();

        if self.export_tangent_space {
            if !self.export_textures {
                return Err(ExportError::UnboundAttribute(
                    "tangent space requires texture coordinates to be exported".to_string(),
                ));
            }
            if uv_layers == 0 {
                return Err(ExportError::UnboundAttribute(
                    "tangent space requested but the mesh has no UV layer".to_string(),
                ));
            }
        }

        if self.export_textures && uv_layers > MAX_UV_LAYERS {
            return Err(ExportError::UnboundAttribute(format!(
                "mesh has {} UV layers, at most {} can be exported",
                uv_layers, MAX_UV_LAYERS
            )));
        }

        if self.export_bone_weights && !mesh.has_bone_weights() {
            return Err(ExportError::UnboundAttribute(
                "bone weights requested but the mesh has no bone influences".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MeshData;
    use crate::types::BoneInfluence;

    fn triangle() -> MeshData {
        let mut mesh = MeshData::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        mesh.add_polygon(&[0, 1, 2], true);
        mesh
    }

    #[test]
    fn test_default_is_position_only_binary() {
        let config = ExportConfig::default();
        assert!(config.export_binary);
        assert!(!config.export_normals && !config.export_textures && !config.export_bone_weights);
        assert!(config.validate(&triangle()).is_ok());
    }

    #[test]
    fn test_builders_set_each_flag() {
        let config = ExportConfig::new()
            .with_normals(true)
            .with_textures(true)
            .with_tangent_space(true)
            .with_v_flipped(true)
            .with_bone_weights(true)
            .with_binary(false);
        assert!(config.export_normals);
        assert!(config.export_textures);
        assert!(config.export_tangent_space);
        assert!(config.export_v_flipped);
        assert!(config.export_bone_weights);
        assert!(!config.export_binary);
    }

    #[test]
    fn test_tangents_need_textures() {
        let mut mesh = triangle();
        mesh.add_uv_layer("UVMap", vec![[0.0, 0.0]; 3]);
        let config = ExportConfig::new().with_tangent_space(true);
        assert!(matches!(
            config.validate(&mesh),
            Err(ExportError::UnboundAttribute(_))
        ));
        assert!(config.with_textures(true).validate(&mesh).is_ok());
    }

    #[test]
    fn test_too_many_uv_layers() {
        let mut mesh = triangle();
        for i in 0..=MAX_UV_LAYERS {
            mesh.add_uv_layer(format!("UV{}", i), vec![[0.0, 0.0]; 3]);
        }
        assert!(ExportConfig::new().validate(&mesh).is_ok());
        assert!(ExportConfig::new().with_textures(true).validate(&mesh).is_err());
    }

    #[test]
    fn test_bone_weights_need_influences() {
        let mut mesh = triangle();
        let config = ExportConfig::new().with_bone_weights(true);
        assert!(config.validate(&mesh).is_err());
        mesh.add_influence(2, BoneInfluence::new(0, 1.0));
        assert!(config.validate(&mesh).is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config: ExportConfig = serde_json::from_str(r#"{"export_normals": true}"#).unwrap();
        assert_eq!(config, ExportConfig::new().with_normals(true));
    }
}
