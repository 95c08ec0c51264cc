//! In-memory polygon mesh.

use crate::error::{ExportError, Result};
use crate::types::{BoneInfluence, MeshSource, Polygon};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A named UV layer with one coordinate per loop corner.
#[derive(Debug, Clone, PartialEq)]
pub struct UvLayer {
    pub name: String,
    pub uvs: Vec<[f32; 2]>,
}

/// Owned polygon mesh implementing [`MeshSource`].
///
/// Polygon normals are computed with Newell's method when a polygon is
/// added. Vertex normals default to the area-weighted average of the
/// adjacent polygon normals.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    positions: Vec<[f32; 3]>,
    normals: Vec<Option<[f32; 3]>>,
    normal_sums: Vec<Vec3>,
    polygons: Vec<Polygon>,
    loops: Vec<u32>,
    uv_layers: Vec<UvLayer>,
    influences: Vec<Vec<BoneInfluence>>,
}

impl MeshData {
    /// Create a mesh with the given vertex positions and no polygons.
    pub fn new(positions: Vec<[f32; 3]>) -> Self {
        let count = positions.len();
        Self {
            positions,
            normals: vec![None; count],
            normal_sums: vec![Vec3::ZERO; count],
            influences: vec![Vec::new(); count],
            ..Self::default()
        }
    }

    /// Append a polygon over the given vertices and return its index.
    pub fn add_polygon(&mut self, vertices: &[u32], smooth: bool) -> usize {
        let points: Vec<Vec3> = vertices
            .iter()
            .filter_map(|&v| self.positions.get(v as usize))
            .map(|&p| Vec3::from(p))
            .collect();
        let area_normal = newell_normal(&points);

        for &v in vertices {
            if let Some(sum) = self.normal_sums.get_mut(v as usize) {
                *sum += area_normal;
            }
        }

        let polygon = Polygon::new(
            self.loops.len(),
            vertices.len(),
            smooth,
            area_normal.normalize_or_zero().to_array(),
        );
        self.loops.extend_from_slice(vertices);
        self.polygons.push(polygon);
        self.polygons.len() - 1
    }

    /// Add a UV layer with one coordinate per loop corner.
    pub fn add_uv_layer(&mut self, name: impl Into<String>, uvs: Vec<[f32; 2]>) {
        self.uv_layers.push(UvLayer {
            name: name.into(),
            uvs,
        });
    }

    /// Override the smooth normal of a vertex.
    pub fn set_normal(&mut self, vertex: usize, normal: [f32; 3]) {
        if let Some(slot) = self.normals.get_mut(vertex) {
            *slot = Some(normal);
        }
    }

    /// Add a bone group membership to a vertex.
    pub fn add_influence(&mut self, vertex: usize, influence: BoneInfluence) {
        if let Some(list) = self.influences.get_mut(vertex) {
            list.push(influence);
        }
    }

    pub fn uv_layers(&self) -> &[UvLayer] {
        &self.uv_layers
    }

    /// Total number of loop corners.
    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    /// Build a mesh from a JSON document.
    ///
    /// # Errors
    /// Returns [`ExportError::InvalidFormat`] if a polygon does not carry
    /// exactly one UV array per named layer with one coordinate per corner.
    pub fn from_document(doc: &MeshDocument) -> Result<Self> {
        let mut mesh = Self::new(doc.vertices.iter().map(|v| v.position).collect());

        for (index, vertex) in doc.vertices.iter().enumerate() {
            if let Some(normal) = vertex.normal {
                mesh.set_normal(index, normal);
            }
            for &influence in &vertex.weights {
                mesh.add_influence(index, influence);
            }
        }

        let mut layers: Vec<Vec<[f32; 2]>> = vec![Vec::new(); doc.uv_layers.len()];
        for (index, polygon) in doc.polygons.iter().enumerate() {
            if polygon.uvs.len() != doc.uv_layers.len() {
                return Err(ExportError::InvalidFormat(format!(
                    "polygon {} has {} UV arrays for {} UV layers",
                    index,
                    polygon.uvs.len(),
                    doc.uv_layers.len()
                )));
            }
            for (layer, corner_uvs) in polygon.uvs.iter().enumerate() {
                if corner_uvs.len() != polygon.vertices.len() {
                    return Err(ExportError::InvalidFormat(format!(
                        "polygon {} has {} coordinates in UV layer {:?} for {} corners",
                        index,
                        corner_uvs.len(),
                        doc.uv_layers[layer],
                        polygon.vertices.len()
                    )));
                }
            }

            mesh.add_polygon(&polygon.vertices, polygon.smooth);
            for (uvs, corner_uvs) in layers.iter_mut().zip(&polygon.uvs) {
                uvs.extend_from_slice(corner_uvs);
            }
        }

        for (name, uvs) in doc.uv_layers.iter().zip(layers) {
            mesh.add_uv_layer(name.clone(), uvs);
        }

        Ok(mesh)
    }

    /// Parse a mesh from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: MeshDocument = serde_json::from_str(json)?;
        Self::from_document(&doc)
    }

    /// Load a mesh from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Unnormalized polygon normal, its length twice the polygon's area.
fn newell_normal(points: &[Vec3]) -> Vec3 {
    let mut normal = Vec3::ZERO;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        normal.x += (p.y - q.y) * (p.z + q.z);
        normal.y += (p.z - q.z) * (p.x + q.x);
        normal.z += (p.x - q.x) * (p.y + q.y);
    }
    normal
}

impl MeshSource for MeshData {
    fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn position(&self, vertex: usize) -> [f32; 3] {
        self.positions[vertex]
    }

    fn vertex_normal(&self, vertex: usize) -> [f32; 3] {
        self.normals[vertex].unwrap_or_else(|| {
            self.normal_sums[vertex]
                .try_normalize()
                .unwrap_or(Vec3::Z)
                .to_array()
        })
    }

    fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    fn polygon(&self, index: usize) -> Polygon {
        self.polygons[index]
    }

    fn loop_vertex(&self, loop_index: usize) -> u32 {
        self.loops[loop_index]
    }

    fn uv_layer_count(&self) -> usize {
        self.uv_layers.len()
    }

    fn loop_uv(&self, layer: usize, loop_index: usize) -> [f32; 2] {
        self.uv_layers
            .get(layer)
            .and_then(|l| l.uvs.get(loop_index))
            .copied()
            .unwrap_or_default()
    }

    fn bone_influences(&self, vertex: usize) -> &[BoneInfluence] {
        &self.influences[vertex]
    }
}

/// JSON mesh description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshDocument {
    pub vertices: Vec<VertexEntry>,
    pub polygons: Vec<PolygonEntry>,
    /// UV layer names, in layer order.
    #[serde(default)]
    pub uv_layers: Vec<String>,
}

/// A vertex in a [`MeshDocument`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VertexEntry {
    pub position: [f32; 3],
    #[serde(default)]
    pub normal: Option<[f32; 3]>,
    #[serde(default)]
    pub weights: Vec<BoneInfluence>,
}

/// A polygon in a [`MeshDocument`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolygonEntry {
    /// Corner vertex indices in winding order.
    pub vertices: Vec<u32>,
    #[serde(default = "default_smooth")]
    pub smooth: bool,
    /// Per-layer, per-corner UV coordinates.
    #[serde(default)]
    pub uvs: Vec<Vec<[f32; 2]>>,
}

fn default_smooth() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_normal() {
        let mut mesh = MeshData::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        mesh.add_polygon(&[0, 1, 2], false);
        assert_eq!(mesh.polygon(0).normal, [0.0, 0.0, 1.0]);
        assert_eq!(mesh.polygon(0).loops(), 0..3);
    }

    #[test]
    fn test_vertex_normal_averages_faces() {
        let mut mesh = MeshData::new(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ]);
        // One face in the XY plane (normal +Z), one in the XZ plane (normal +Y)
        mesh.add_polygon(&[0, 1, 2], true);
        mesh.add_polygon(&[0, 3, 1], true);

        let n = Vec3::from(mesh.vertex_normal(0));
        let expected = Vec3::new(0.0, 1.0, 1.0).normalize();
        assert!(n.abs_diff_eq(expected, 1e-6));
        assert_eq!(mesh.vertex_normal(2), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_explicit_normal_wins() {
        let mut mesh = MeshData::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        mesh.add_polygon(&[0, 1, 2], true);
        mesh.set_normal(1, [1.0, 0.0, 0.0]);
        assert_eq!(mesh.vertex_normal(1), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "vertices": [
                {"position": [0, 0, 0], "weights": [{"bone": 1, "weight": 0.5}]},
                {"position": [1, 0, 0]},
                {"position": [1, 1, 0]},
                {"position": [0, 1, 0]}
            ],
            "polygons": [
                {
                    "vertices": [0, 1, 2, 3],
                    "smooth": false,
                    "uvs": [
                        [[0, 0], [1, 0], [1, 1], [0, 1]],
                        [[0.5, 0], [0.5, 0.5], [0, 0.5], [0, 0]]
                    ]
                }
            ],
            "uv_layers": ["UVMap", "Lightmap"]
        }"#;
        let mesh = MeshData::from_json(json).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.polygon_count(), 1);
        assert!(!mesh.polygon(0).smooth);
        assert_eq!(mesh.loop_count(), 4);
        assert_eq!(mesh.uv_layer_count(), 2);
        assert_eq!(mesh.loop_uv(0, 2), [1.0, 1.0]);
        assert_eq!(mesh.loop_uv(1, 2), [0.0, 0.5]);
        assert_eq!(mesh.bone_influences(0), &[BoneInfluence::new(1, 0.5)]);
        assert!(mesh.has_bone_weights());
    }

    fn triangle_json(uvs: &str, uv_layers: &str) -> String {
        format!(
            r#"{{
                "vertices": [
                    {{"position": [0, 0, 0]}},
                    {{"position": [1, 0, 0]}},
                    {{"position": [0, 1, 0]}}
                ],
                "polygons": [{{"vertices": [0, 1, 2], "uvs": {}}}],
                "uv_layers": {}
            }}"#,
            uvs, uv_layers
        )
    }

    #[test]
    fn test_short_uv_corners_rejected() {
        let json = triangle_json("[[[0.5, 0.5]]]", r#"["UVMap"]"#);
        let err = MeshData::from_json(&json).unwrap_err();
        assert!(matches!(err, ExportError::InvalidFormat(_)));
    }

    #[test]
    fn test_missing_uv_layer_rejected() {
        let json = triangle_json("[]", r#"["UVMap"]"#);
        assert!(matches!(
            MeshData::from_json(&json),
            Err(ExportError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_unnamed_uv_layer_rejected() {
        let json = triangle_json("[[[0, 0], [1, 0], [0, 1]]]", "[]");
        assert!(matches!(
            MeshData::from_json(&json),
            Err(ExportError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(MeshData::from_json("{\"vertices\": 3}").is_err());
    }
}
