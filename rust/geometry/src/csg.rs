// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CSG (Constructive Solid Geometry) Operations
//!
//! Boolean subtract/union used to trim cladding to the roofline and to cut
//! door and window holes. The backend sits behind [`BooleanOps`] so builders
//! can be driven with a different (or deliberately failing) implementation.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::triangulation::{calculate_polygon_normal, project_to_2d, triangulate_polygon};
use nalgebra::{Point3, Vector3};

/// Boolean mesh provider
pub trait BooleanOps {
    /// `host` minus `cutter`
    fn subtract(&self, host: &Mesh, cutter: &Mesh) -> Result<Mesh>;

    /// Union of two solids
    fn union(&self, a: &Mesh, b: &Mesh) -> Result<Mesh>;

    /// Union of any number of solids; empty input gives an empty mesh
    fn union_all(&self, meshes: &[Mesh]) -> Result<Mesh> {
        let mut iter = meshes.iter().filter(|m| !m.is_empty());
        let Some(first) = iter.next() else {
            return Ok(Mesh::new());
        };
        let mut acc = first.clone();
        for mesh in iter {
            acc = self.union(&acc, mesh)?;
        }
        Ok(acc)
    }
}

/// csgrs-backed boolean processor
#[derive(Debug, Clone)]
pub struct ClippingProcessor {
    /// Cutters enclosing less volume than this are rejected as degenerate
    pub min_cutter_volume: f64,
}

impl ClippingProcessor {
    pub fn new() -> Self {
        Self {
            min_cutter_volume: 1e-3,
        }
    }

    fn check_cutter(&self, cutter: &Mesh) -> Result<()> {
        cutter.validate()?;
        let volume = cutter.signed_volume();
        if !volume.is_finite() || volume.abs() < self.min_cutter_volume {
            let (min, max) = cutter.bounds();
            return Err(Error::DegenerateCutter(format!(
                "volume {:.3} mm3, bounds {:?}..{:?}",
                volume, min, max
            )));
        }
        Ok(())
    }

    /// Convert our Mesh format to csgrs Mesh format
    fn mesh_to_csgrs(mesh: &Mesh) -> Result<csgrs::mesh::Mesh<()>> {
        use csgrs::mesh::{polygon::Polygon, vertex::Vertex, Mesh as CSGMesh};
        use std::sync::OnceLock;

        if mesh.is_empty() {
            return Ok(CSGMesh {
                polygons: Vec::new(),
                bounding_box: OnceLock::new(),
                metadata: None,
            });
        }

        let mut polygons = Vec::with_capacity(mesh.triangle_count());
        for [v0, v1, v2] in mesh.triangles() {
            // zero-area triangles would feed NaN normals into the BSP
            let face_normal = match (v1 - v0).cross(&(v2 - v0)).try_normalize(1e-10) {
                Some(n) => n,
                None => continue,
            };
            let vertices = vec![
                Vertex::new(v0, face_normal),
                Vertex::new(v1, face_normal),
                Vertex::new(v2, face_normal),
            ];
            polygons.push(Polygon::new(vertices, None));
        }

        if polygons.is_empty() {
            return Err(Error::MalformedMesh(
                "every triangle is degenerate".to_string(),
            ));
        }
        Ok(CSGMesh::from_polygons(&polygons, None))
    }

    /// Convert csgrs Mesh format back to our Mesh format
    fn csgrs_to_mesh(csg_mesh: &csgrs::mesh::Mesh<()>) -> Result<Mesh> {
        let mut mesh = Mesh::new();

        for polygon in &csg_mesh.polygons {
            let vertices = &polygon.vertices;
            if vertices.len() < 3 {
                continue;
            }
            let points: Vec<Point3<f64>> = vertices
                .iter()
                .map(|v| Point3::new(v.pos[0], v.pos[1], v.pos[2]))
                .collect();

            let carried = Vector3::new(
                vertices[0].normal[0],
                vertices[0].normal[1],
                vertices[0].normal[2],
            );
            let normal = match carried.try_normalize(1e-10) {
                Some(n) if n.iter().all(|c| c.is_finite()) => n,
                _ => match calculate_polygon_normal(&points) {
                    Some(n) => n,
                    None => continue,
                },
            };

            let indices = if points.len() == 3 {
                vec![0, 1, 2]
            } else {
                match triangulate_polygon(&project_to_2d(&points, &normal)) {
                    Ok(idx) => idx,
                    Err(e) => {
                        tracing::debug!(error = %e, vertices = points.len(), "Skipping CSG polygon");
                        continue;
                    }
                }
            };

            let base = mesh.vertex_count() as u32;
            for p in &points {
                mesh.add_vertex(*p, normal);
            }
            for tri in indices.chunks_exact(3) {
                mesh.add_triangle(
                    base + tri[0] as u32,
                    base + tri[1] as u32,
                    base + tri[2] as u32,
                );
            }
        }

        Ok(mesh)
    }
}

impl BooleanOps for ClippingProcessor {
    fn subtract(&self, host: &Mesh, cutter: &Mesh) -> Result<Mesh> {
        use csgrs::traits::CSG;

        host.validate()?;
        if cutter.is_empty() || host.is_empty() {
            return Ok(host.clone());
        }
        self.check_cutter(cutter)?;

        let host_csg = Self::mesh_to_csgrs(host)?;
        let cutter_csg = Self::mesh_to_csgrs(cutter)?;
        let result = Self::csgrs_to_mesh(&host_csg.difference(&cutter_csg))?;
        result
            .validate()
            .map_err(|e| Error::BooleanFailed(format!("difference produced {}", e)))?;
        Ok(result)
    }

    fn union(&self, a: &Mesh, b: &Mesh) -> Result<Mesh> {
        use csgrs::traits::CSG;

        a.validate()?;
        b.validate()?;
        if a.is_empty() {
            return Ok(b.clone());
        }
        if b.is_empty() {
            return Ok(a.clone());
        }

        let a_csg = Self::mesh_to_csgrs(a)?;
        let b_csg = Self::mesh_to_csgrs(b)?;
        let result = Self::csgrs_to_mesh(&a_csg.union(&b_csg))?;
        if result.is_empty() {
            return Err(Error::BooleanFailed("union of two solids is empty".to_string()));
        }
        Ok(result)
    }
}

impl Default for ClippingProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{aabb_mesh, box_mesh};
    use approx::assert_relative_eq;

    #[test]
    fn test_subtract_removes_top_half() {
        let processor = ClippingProcessor::new();
        let host = aabb_mesh(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 10.0));
        let cutter = aabb_mesh(Point3::new(-1.0, 5.0, -1.0), Point3::new(11.0, 20.0, 11.0));
        let result = processor.subtract(&host, &cutter).unwrap();
        let (_, max) = result.bounds();
        assert_relative_eq!(max.y, 5.0, epsilon = 1e-4);
        assert_relative_eq!(result.signed_volume(), 500.0, epsilon = 1e-2);
    }

    #[test]
    fn test_union_of_disjoint_boxes() {
        let processor = ClippingProcessor::new();
        let a = aabb_mesh(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = aabb_mesh(Point3::new(5.0, 0.0, 0.0), Point3::new(6.0, 1.0, 1.0));
        let result = processor.union(&a, &b).unwrap();
        assert_relative_eq!(result.signed_volume(), 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_flat_cutter_is_degenerate() {
        let processor = ClippingProcessor::new();
        let host = box_mesh(10.0, 10.0, 10.0);
        let flat = aabb_mesh(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 10.0));
        assert!(matches!(
            processor.subtract(&host, &flat),
            Err(Error::DegenerateCutter(_)) | Err(Error::MalformedMesh(_))
        ));
    }

    #[test]
    fn test_malformed_host_is_rejected() {
        let processor = ClippingProcessor::new();
        let mut host = box_mesh(1.0, 1.0, 1.0);
        host.indices.push(9999);
        assert!(processor.subtract(&host, &box_mesh(0.5, 0.5, 0.5)).is_err());
    }

    #[test]
    fn test_empty_cutter_returns_host() {
        let processor = ClippingProcessor::new();
        let host = box_mesh(1.0, 1.0, 1.0);
        assert_eq!(processor.subtract(&host, &Mesh::new()).unwrap(), host);
    }
}
