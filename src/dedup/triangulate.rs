//! Fan triangulation of polygon corner loops.
//!
//! Every triangle shares the polygon's first corner. This is only correct
//! for convex, planar polygons; concave polygons produce overlapping or
//! inverted triangles.

/// Split an n-corner loop into its n - 2 fan triangles.
///
/// Triangle `k` is `(corners[0], corners[k + 1], corners[k + 2])`. Loops with
/// fewer than three corners yield nothing.
pub fn fan_triangles<T: Copy>(corners: &[T]) -> impl Iterator<Item = [T; 3]> + '_ {
    (0..corners.len().saturating_sub(2)).map(move |k| [corners[0], corners[k + 1], corners[k + 2]])
}

/// Number of triangles a polygon with `corners` corners produces.
pub fn fan_triangle_count(corners: usize) -> usize {
    corners.saturating_sub(2)
}
