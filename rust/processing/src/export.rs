// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wavefront OBJ export of the world-space scene.
//!
//! One `o` object per mesh node, grouped (`g`) by layer. World transforms
//! are resolved in parallel; writing is sequential and deterministic.

use crate::error::Result;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use shedkit_geometry::{Layer, Mesh, NodeKey, Scene};
use std::io::Write;

/// A mesh node resolved to world coordinates
#[derive(Debug, Clone)]
pub struct ExportMesh {
    pub name: String,
    pub layer: Option<Layer>,
    pub material: String,
    pub attachment_id: Option<String>,
    pub mesh: Mesh,
}

impl ExportMesh {
    pub fn vertex_count(&self) -> usize {
        self.mesh.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.indices.len() / 3
    }
}

/// Counts written by [`write_obj`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjStats {
    pub objects: usize,
    pub groups: usize,
    pub vertices: usize,
    pub triangles: usize,
}

/// Every mesh node of the scene in world coordinates
pub fn export_meshes(scene: &Scene) -> Result<Vec<ExportMesh>> {
    let keys: Vec<NodeKey> = scene.mesh_nodes().map(|(k, _)| k).collect();
    let meshes = keys
        .par_iter()
        .map(|&key| -> Result<Option<ExportMesh>> {
            let Some(node) = scene.node(key) else {
                return Ok(None);
            };
            let Some(mesh) = scene.world_mesh(key)? else {
                return Ok(None);
            };
            let material = node
                .material
                .and_then(|m| scene.material(m))
                .map(|m| m.name.clone())
                .unwrap_or_default();
            Ok(Some(ExportMesh {
                name: node.name.clone(),
                layer: node.tags.layer,
                material,
                attachment_id: node.tags.attachment_id.clone(),
                mesh,
            }))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(meshes.into_iter().flatten().collect())
}

/// Object name, unique per attachment
fn object_name(mesh: &ExportMesh) -> String {
    let name = match &mesh.attachment_id {
        Some(id) => format!("{}/{}", id, mesh.name),
        None => mesh.name.clone(),
    };
    name.replace(char::is_whitespace, "_")
}

/// Write the scene as OBJ text
pub fn write_obj<W: Write>(scene: &Scene, mut out: W) -> Result<ObjStats> {
    let meshes = export_meshes(scene)?;

    let mut groups: FxHashMap<Option<Layer>, Vec<&ExportMesh>> = FxHashMap::default();
    for mesh in &meshes {
        groups.entry(mesh.layer).or_default().push(mesh);
    }
    let mut layers: Vec<Option<Layer>> = groups.keys().copied().collect();
    layers.sort();

    let mut stats = ObjStats::default();
    writeln!(out, "# shedkit scene, millimetres, Y up")?;
    // OBJ indices are 1-based and global
    let mut base = 1usize;
    for layer in layers {
        let Some(members) = groups.get_mut(&layer) else {
            continue;
        };
        members.sort_by_key(|m| object_name(m));
        writeln!(out, "g {}", layer.map_or("untagged", |l| l.as_str()))?;
        stats.groups += 1;

        for mesh in members.iter() {
            writeln!(out, "o {}", object_name(mesh))?;
            writeln!(out, "usemtl {}", mesh.material)?;
            for p in mesh.mesh.positions.chunks_exact(3) {
                writeln!(out, "v {} {} {}", p[0], p[1], p[2])?;
            }
            for n in mesh.mesh.normals.chunks_exact(3) {
                writeln!(out, "vn {} {} {}", n[0], n[1], n[2])?;
            }
            for tri in mesh.mesh.indices.chunks_exact(3) {
                let (a, b, c) = (tri[0] as usize + base, tri[1] as usize + base, tri[2] as usize + base);
                writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
            }
            base += mesh.vertex_count();
            stats.objects += 1;
            stats.vertices += mesh.vertex_count();
            stats.triangles += mesh.triangle_count();
        }
    }
    out.flush()?;
    tracing::debug!(
        objects = stats.objects,
        groups = stats.groups,
        vertices = stats.vertices,
        triangles = stats.triangles,
        "OBJ written"
    );
    Ok(stats)
}

/// OBJ text of the whole scene
pub fn to_obj_string(scene: &Scene) -> Result<String> {
    let mut buf = Vec::new();
    write_obj(scene, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shedkit_geometry::primitives::box_mesh;
    use shedkit_geometry::{Isometry3, Part};

    fn scene() -> Scene {
        let mut scene = Scene::new();
        let root = scene
            .add_transform_node("root", None, Isometry3::translation(1000.0, 0.0, 0.0))
            .unwrap();
        let parts = vec![
            Part::new("stud", box_mesh(50.0, 2000.0, 75.0), "timber-frame", Layer::Frame),
            Part::new("deck", box_mesh(1800.0, 18.0, 2400.0), "plywood", Layer::Base),
        ];
        scene.emit(root, parts, None).unwrap();
        scene
    }

    #[test]
    fn test_world_meshes_are_transformed() {
        let scene = scene();
        let meshes = export_meshes(&scene).unwrap();
        assert_eq!(meshes.len(), 2);
        let stud = meshes.iter().find(|m| m.name == "stud").unwrap();
        let (min, _) = stud.mesh.bounds();
        assert!(min.x > 900.0);
        assert_eq!(stud.material, "timber-frame");
    }

    #[test]
    fn test_obj_groups_by_layer() {
        let scene = scene();
        let obj = to_obj_string(&scene).unwrap();
        let base = obj.find("g base").unwrap();
        let frame = obj.find("g frame").unwrap();
        assert!(base < frame);
        assert_eq!(obj.matches("\no ").count(), 2);

        let stats = write_obj(&scene, Vec::new()).unwrap();
        assert_eq!(stats.objects, 2);
        assert_eq!(stats.groups, 2);
        assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), stats.vertices);
        assert_eq!(obj.lines().filter(|l| l.starts_with("f ")).count(), stats.triangles);
    }

    #[test]
    fn test_face_indices_stay_in_range() {
        let obj = to_obj_string(&scene()).unwrap();
        let vertices = obj.lines().filter(|l| l.starts_with("v ")).count();
        for line in obj.lines().filter(|l| l.starts_with("f ")) {
            for corner in line.split_whitespace().skip(1) {
                let index: usize = corner.split("//").next().unwrap().parse().unwrap();
                assert!(index >= 1 && index <= vertices);
            }
        }
    }
}
