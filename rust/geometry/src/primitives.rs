// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Solid primitives: boxes, eight-vertex hexahedra and thickened polygons.
//!
//! Every primitive is emitted flat-shaded with its own vertices per face,
//! normals computed from the face polygon and winding forced outward.

use crate::mesh::Mesh;
use nalgebra::{Point3, Vector3};

/// Newell normal of a planar polygon (not normalized)
pub fn polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut normal = Vector3::zeros();
    let n = points.len();
    for i in 0..n {
        let current = points[i];
        let next = points[(i + 1) % n];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal
}

fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len().max(1) as f64)
}

/// Emit one face, flipping it if its normal points toward `inside`
fn add_outward_face(mesh: &mut Mesh, face: &[Point3<f64>], inside: &Point3<f64>) {
    let raw = polygon_normal(face);
    let normal = match raw.try_normalize(1e-12) {
        Some(n) => n,
        None => return, // collapsed face (e.g. wedge end of zero height)
    };
    let face_center = centroid(face);
    if normal.dot(&(face_center - inside)) < 0.0 {
        let reversed: Vec<Point3<f64>> = face.iter().rev().copied().collect();
        mesh.add_convex_face(&reversed, -normal);
    } else {
        mesh.add_convex_face(face, normal);
    }
}

/// Closed hexahedron from two quads.
///
/// `bottom[i]` and `top[i]` must be the two ends of the same side edge; the
/// quads themselves may be wound either way and need not be parallel. This is
/// the shape used for sloped top plates and wedge cutters, where a rotated box
/// would not reproduce ends at different heights.
pub fn hexahedron(bottom: [Point3<f64>; 4], top: [Point3<f64>; 4]) -> Mesh {
    let mut all = Vec::with_capacity(8);
    all.extend_from_slice(&bottom);
    all.extend_from_slice(&top);
    let inside = centroid(&all);

    let mut mesh = Mesh::with_capacity(24, 36);
    add_outward_face(&mut mesh, &bottom, &inside);
    add_outward_face(&mut mesh, &top, &inside);
    for i in 0..4 {
        let j = (i + 1) % 4;
        add_outward_face(&mut mesh, &[bottom[i], bottom[j], top[j], top[i]], &inside);
    }
    mesh
}

/// Axis-aligned box between two corners
pub fn aabb_mesh(min: Point3<f64>, max: Point3<f64>) -> Mesh {
    hexahedron(
        [
            Point3::new(min.x, min.y, min.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(max.x, min.y, max.z),
            Point3::new(min.x, min.y, max.z),
        ],
        [
            Point3::new(min.x, max.y, min.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(max.x, max.y, max.z),
            Point3::new(min.x, max.y, max.z),
        ],
    )
}

/// Box of the given size centered on the origin
#[inline]
pub fn box_mesh(size_x: f64, size_y: f64, size_z: f64) -> Mesh {
    let half = Vector3::new(size_x / 2.0, size_y / 2.0, size_z / 2.0);
    aabb_mesh(Point3::from(-half), Point3::from(half))
}

/// Box given by its minimum corner and size
#[inline]
pub fn box_at(min: Point3<f64>, size: Vector3<f64>) -> Mesh {
    aabb_mesh(min, min + size)
}

/// Thicken a convex planar polygon along `-normal` into a closed slab.
///
/// `outline` is the top face. Used for the triangle/trapezoid roof patches of
/// hip ends and hipped saddles.
pub fn slab(outline: &[Point3<f64>], normal: Vector3<f64>, thickness: f64) -> Mesh {
    if outline.len() < 3 {
        return Mesh::new();
    }
    let n = normal.normalize();
    let top: Vec<Point3<f64>> = if polygon_normal(outline).dot(&n) < 0.0 {
        outline.iter().rev().copied().collect()
    } else {
        outline.to_vec()
    };
    let bottom: Vec<Point3<f64>> = top.iter().map(|p| p - n * thickness).collect();

    let count = top.len();
    let mut mesh = Mesh::with_capacity(count * 6, count * 12);
    mesh.add_convex_face(&top, n);
    let bottom_reversed: Vec<Point3<f64>> = bottom.iter().rev().copied().collect();
    mesh.add_convex_face(&bottom_reversed, -n);
    for i in 0..count {
        let j = (i + 1) % count;
        let side = [top[i], bottom[i], bottom[j], top[j]];
        let side_normal = polygon_normal(&side);
        if let Some(sn) = side_normal.try_normalize(1e-12) {
            mesh.add_convex_face(&side, sn);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_box_volume_and_winding() {
        let mesh = box_mesh(2.0, 3.0, 4.0);
        assert_eq!(mesh.triangle_count(), 12);
        assert_relative_eq!(mesh.signed_volume(), 24.0, epsilon = 1e-4);
        let (min, max) = mesh.bounds();
        assert_relative_eq!(min.x, -1.0);
        assert_relative_eq!(max.z, 2.0);
    }

    #[test]
    fn test_hexahedron_with_reversed_input_is_outward() {
        // bottom wound clockwise seen from above, sloped top
        let bottom = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(10.0, 0.0, 1.0),
            Point3::new(10.0, 0.0, 0.0),
        ];
        let top = [
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 1.0),
            Point3::new(10.0, 4.0, 1.0),
            Point3::new(10.0, 4.0, 0.0),
        ];
        let mesh = hexahedron(bottom, top);
        // trapezoid cross-section: mean height 3, length 10, depth 1
        assert_relative_eq!(mesh.signed_volume(), 30.0, epsilon = 1e-3);
    }

    #[test]
    fn test_slab_triangle() {
        let outline = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 3.0),
        ];
        let mesh = slab(&outline, Vector3::y(), 0.5);
        assert_relative_eq!(mesh.signed_volume(), 3.0, epsilon = 1e-4);
        assert_eq!(mesh.triangle_count(), 2 + 3 * 2);
    }
}
