// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation for faces coming back from boolean operations.
//!
//! CSG output polygons are planar but may be concave once a wedge has cut
//! through a cladding strip, so anything past a quad goes through earcutr.

use crate::error::{Error, Result};
use crate::primitives::polygon_normal;
use nalgebra::{Point2, Point3, Vector3};

/// Triangulate a simple planar polygon given in 2D.
/// Returns indices into `points`, three per triangle.
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    match points.len() {
        0..=2 => Err(Error::TriangulationError(format!(
            "polygon with {} points",
            points.len()
        ))),
        3 => Ok(vec![0, 1, 2]),
        4 if is_convex(points) => Ok(vec![0, 1, 2, 0, 2, 3]),
        _ => {
            let flat: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y]).collect();
            earcutr::earcut(&flat, &[], 2)
                .map_err(|e| Error::TriangulationError(format!("{:?}", e)))
        }
    }
}

fn is_convex(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    let mut sign = 0.0f64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
        if cross.abs() <= 1e-10 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

/// Project points onto the plane with the given unit normal.
///
/// The in-plane basis is right-handed with respect to `normal`, so a polygon
/// wound counter-clockwise around `normal` stays counter-clockwise in 2D.
pub fn project_to_2d(points: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<Point2<f64>> {
    let Some(&origin) = points.first() else {
        return Vec::new();
    };
    // least-aligned world axis gives the most stable cross product
    let reference = if normal.x.abs() <= normal.y.abs() && normal.x.abs() <= normal.z.abs() {
        Vector3::x()
    } else if normal.y.abs() <= normal.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let u = reference.cross(normal).normalize();
    let v = normal.cross(&u);
    points
        .iter()
        .map(|p| {
            let d = p - origin;
            Point2::new(d.dot(&u), d.dot(&v))
        })
        .collect()
}

/// Unit normal of a planar polygon, `None` when it has no area
pub fn calculate_polygon_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    if points.len() < 3 {
        return None;
    }
    polygon_normal(points).try_normalize(1e-10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangulate_square() {
        let square = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let indices = triangulate_polygon(&square).unwrap();
        assert_eq!(indices.len(), 6);
    }

    #[test]
    fn test_triangulate_concave_notch() {
        // cladding strip end after a wedge clip: L-shaped outline
        let outline = [
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 3.0),
            Point2::new(0.0, 3.0),
        ];
        let indices = triangulate_polygon(&outline).unwrap();
        assert_eq!(indices.len(), 4 * 3);
    }

    #[test]
    fn test_too_few_points() {
        assert!(triangulate_polygon(&[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]).is_err());
    }

    #[test]
    fn test_projection_keeps_winding() {
        let tri = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let normal = calculate_polygon_normal(&tri).unwrap();
        assert_eq!(normal, Vector3::z());
        let flat = project_to_2d(&tri, &normal);
        let area2 = (flat[1].x - flat[0].x) * (flat[2].y - flat[0].y)
            - (flat[1].y - flat[0].y) * (flat[2].x - flat[0].x);
        assert!(area2 > 0.0);
    }
}
