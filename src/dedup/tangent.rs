//! Per-triangle tangent frames from UV derivatives.

use glam::{Vec2, Vec3};

/// Tangent and binormal of one output triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentFrame {
    pub tangent: [f32; 3],
    pub binormal: [f32; 3],
}

impl TangentFrame {
    /// Compute the flat tangent frame of a triangle.
    ///
    /// The tangent follows increasing U and the binormal increasing V across
    /// the triangle. A degenerate UV mapping falls back to an arbitrary
    /// orthonormal pair perpendicular to the face.
    pub fn from_triangle(positions: [[f32; 3]; 3], uvs: [[f32; 2]; 3]) -> Self {
        let [p0, p1, p2] = positions.map(Vec3::from);
        let [t0, t1, t2] = uvs.map(Vec2::from);

        let e1 = p1 - p0;
        let e2 = p2 - p0;
        let d1 = t1 - t0;
        let d2 = t2 - t0;

        let det = d1.x * d2.y - d2.x * d1.y;
        if det.abs() > f32::EPSILON {
            let r = 1.0 / det;
            let tangent = ((e1 * d2.y - e2 * d1.y) * r).normalize_or_zero();
            let binormal = ((e2 * d1.x - e1 * d2.x) * r).normalize_or_zero();
            if tangent != Vec3::ZERO && binormal != Vec3::ZERO {
                return Self {
                    tangent: tangent.to_array(),
                    binormal: binormal.to_array(),
                };
            }
        }

        let normal = e1.cross(e2).try_normalize().unwrap_or(Vec3::Z);
        let (tangent, binormal) = normal.any_orthonormal_pair();
        Self {
            tangent: tangent.to_array(),
            binormal: binormal.to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: [f32; 3], b: [f32; 3]) -> bool {
        Vec3::from(a).abs_diff_eq(Vec3::from(b), 1e-5)
    }

    #[test]
    fn test_axis_aligned_mapping() {
        let frame = TangentFrame::from_triangle(
            [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 3.0, 0.0]],
            [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
        );
        assert!(approx(frame.tangent, [1.0, 0.0, 0.0]));
        assert!(approx(frame.binormal, [0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_swapped_uv_axes() {
        let frame = TangentFrame::from_triangle(
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0]],
        );
        assert!(approx(frame.tangent, [0.0, 1.0, 0.0]));
        assert!(approx(frame.binormal, [1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_degenerate_uvs_give_unit_frame_in_plane() {
        let frame = TangentFrame::from_triangle(
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            [[0.5, 0.5], [0.5, 0.5], [0.5, 0.5]],
        );
        let t = Vec3::from(frame.tangent);
        let b = Vec3::from(frame.binormal);
        assert!((t.length() - 1.0).abs() < 1e-5);
        assert!((b.length() - 1.0).abs() < 1e-5);
        assert!(t.dot(Vec3::Z).abs() < 1e-5);
        assert!(b.dot(Vec3::Z).abs() < 1e-5);
    }
}
