// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory scene graph.
//!
//! The [`Scene`] owns every transform node, mesh node and material produced
//! by a build. Nodes and materials live in slot maps with generational keys,
//! so a key held across a rebuild simply stops resolving once its node has
//! been disposed.
//!
//! Metadata tags (`layer`, `slope`, `attachment_id`) exist only for later
//! disposal and visibility toggling; no geometry is derived from them.
//!
//! ## Disposal ordering
//!
//! A material may back a dynamic texture. It can only be disposed once no
//! live mesh node references it ([`Error::MaterialInUse`]), and a mesh can
//! never be added with a disposed material ([`Error::DanglingMaterial`]).

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use nalgebra::Isometry3;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    /// Key for a transform or mesh node.
    pub struct NodeKey;

    /// Key for a named material.
    pub struct MaterialKey;
}

/// Anchor node names the builders attach to
pub mod anchors {
    pub const BASE: &str = "base-root";
    pub const WALLS: &str = "walls-root";
    pub const ROOF: &str = "roof-root";
    pub const ATTACHMENTS: &str = "attachments-root";
}

/// What a mesh node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Base,
    Frame,
    Truss,
    Rafter,
    Purlin,
    Osb,
    Membrane,
    Batten,
    Covering,
    Tile,
    Cap,
    Trim,
    Cladding,
    Insulation,
    Lining,
    Opening,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Base => "base",
            Layer::Frame => "frame",
            Layer::Truss => "truss",
            Layer::Rafter => "rafter",
            Layer::Purlin => "purlin",
            Layer::Osb => "osb",
            Layer::Membrane => "membrane",
            Layer::Batten => "batten",
            Layer::Covering => "covering",
            Layer::Tile => "tile",
            Layer::Cap => "cap",
            Layer::Trim => "trim",
            Layer::Cladding => "cladding",
            Layer::Insulation => "insulation",
            Layer::Lining => "lining",
            Layer::Opening => "opening",
        }
    }

    /// Layers that belong to the roof covering rather than its structure
    pub fn is_roof_covering(&self) -> bool {
        matches!(
            self,
            Layer::Osb | Layer::Membrane | Layer::Batten | Layer::Covering | Layer::Tile | Layer::Cap
        )
    }
}

/// Disposal/visibility metadata carried by a node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeTags {
    pub layer: Option<Layer>,
    pub slope: Option<String>,
    pub attachment_id: Option<String>,
}

/// One piece of built geometry, not yet in a scene
#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    pub mesh: Mesh,
    pub material: &'static str,
    pub layer: Layer,
    pub slope: Option<String>,
}

impl Part {
    pub fn new(name: impl Into<String>, mesh: Mesh, material: &'static str, layer: Layer) -> Self {
        Self {
            name: name.into(),
            mesh,
            material,
            layer,
            slope: None,
        }
    }

    pub fn on_slope(mut self, slope: impl Into<String>) -> Self {
        self.slope = Some(slope.into());
        self
    }
}

/// Material entry
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub color: [f32; 3],
    /// Backed by a generated texture that must be released explicitly
    pub dynamic_texture: bool,
}

/// Base colour and texture kind for a material name
pub fn material_spec(name: &str) -> ([f32; 3], bool) {
    match name {
        "timber-frame" => ([0.80, 0.66, 0.45], false),
        "timber-base" => ([0.55, 0.42, 0.28], false),
        "osb" => ([0.78, 0.62, 0.38], true),
        "felt" => ([0.18, 0.18, 0.20], false),
        "membrane" => ([0.30, 0.36, 0.42], false),
        "batten" => ([0.72, 0.58, 0.40], false),
        "tile" => ([0.55, 0.24, 0.18], false),
        "ridge-cap" => ([0.22, 0.22, 0.24], false),
        "trim" => ([0.92, 0.92, 0.88], false),
        "cladding-shiplap" | "cladding-loglap" => ([0.74, 0.56, 0.36], true),
        "insulation" => ([0.93, 0.84, 0.42], false),
        "plywood" => ([0.86, 0.74, 0.54], true),
        "door" => ([0.40, 0.30, 0.22], false),
        "glass" => ([0.70, 0.85, 0.95], false),
        _ => ([0.6, 0.6, 0.6], false),
    }
}

/// Scene node
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub parent: Option<NodeKey>,
    pub children: SmallVec<[NodeKey; 4]>,
    /// Transform relative to the parent
    pub local: Isometry3<f64>,
    pub mesh: Option<Mesh>,
    pub material: Option<MaterialKey>,
    pub tags: NodeTags,
}

/// Scene graph with a named material registry
#[derive(Debug, Default)]
pub struct Scene {
    nodes: SlotMap<NodeKey, SceneNode>,
    materials: SlotMap<MaterialKey, Material>,
    material_names: FxHashMap<String, MaterialKey>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transform-only node
    pub fn add_transform_node(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeKey>,
        local: Isometry3<f64>,
    ) -> Result<NodeKey> {
        self.insert(SceneNode {
            name: name.into(),
            parent,
            children: SmallVec::new(),
            local,
            mesh: None,
            material: None,
            tags: NodeTags::default(),
        })
    }

    /// Add a mesh node. The material must still be registered.
    pub fn add_mesh(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeKey>,
        mesh: Mesh,
        material: MaterialKey,
        tags: NodeTags,
    ) -> Result<NodeKey> {
        let name = name.into();
        if !self.materials.contains_key(material) {
            return Err(Error::DanglingMaterial(name));
        }
        self.insert(SceneNode {
            name,
            parent,
            children: SmallVec::new(),
            local: Isometry3::identity(),
            mesh: Some(mesh),
            material: Some(material),
            tags,
        })
    }

    fn insert(&mut self, node: SceneNode) -> Result<NodeKey> {
        let parent = node.parent;
        if let Some(p) = parent {
            if !self.nodes.contains_key(p) {
                return Err(Error::NodeNotFound(format!("parent of '{}'", node.name)));
            }
        }
        let key = self.nodes.insert(node);
        if let Some(p) = parent {
            if let Some(parent_node) = self.nodes.get_mut(p) {
                parent_node.children.push(key);
            }
        }
        Ok(key)
    }

    /// Add every part under `parent`, creating materials as needed
    pub fn emit(
        &mut self,
        parent: NodeKey,
        parts: Vec<Part>,
        attachment_id: Option<&str>,
    ) -> Result<Vec<NodeKey>> {
        let mut keys = Vec::with_capacity(parts.len());
        for part in parts {
            if part.mesh.is_empty() {
                continue;
            }
            let material = self.get_or_create_material(part.material);
            let tags = NodeTags {
                layer: Some(part.layer),
                slope: part.slope,
                attachment_id: attachment_id.map(str::to_string),
            };
            keys.push(self.add_mesh(part.name, Some(parent), part.mesh, material, tags)?);
        }
        Ok(keys)
    }

    /// Look up a material by name, creating it on first use.
    /// Repeated calls return the same key.
    pub fn get_or_create_material(&mut self, name: &str) -> MaterialKey {
        if let Some(&key) = self.material_names.get(name) {
            return key;
        }
        let (color, dynamic_texture) = material_spec(name);
        let key = self.materials.insert(Material {
            name: name.to_string(),
            color,
            dynamic_texture,
        });
        self.material_names.insert(name.to_string(), key);
        key
    }

    pub fn material(&self, key: MaterialKey) -> Option<&Material> {
        self.materials.get(key)
    }

    pub fn material_by_name(&self, name: &str) -> Option<MaterialKey> {
        self.material_names.get(name).copied()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Number of live mesh nodes referencing a material
    pub fn material_users(&self, key: MaterialKey) -> usize {
        self.nodes
            .values()
            .filter(|n| n.material == Some(key))
            .count()
    }

    /// Release a material. Fails while any mesh still references it.
    pub fn dispose_material(&mut self, key: MaterialKey) -> Result<()> {
        let Some(material) = self.materials.get(key) else {
            return Ok(());
        };
        let users = self.material_users(key);
        if users > 0 {
            return Err(Error::MaterialInUse(material.name.clone(), users));
        }
        let name = material.name.clone();
        self.materials.remove(key);
        self.material_names.remove(&name);
        tracing::debug!(material = %name, "Material disposed");
        Ok(())
    }

    /// Release every dynamic-texture material no mesh references any more.
    /// Call after mesh disposal, never before.
    pub fn dispose_unused_materials(&mut self) -> usize {
        let unused: Vec<MaterialKey> = self
            .materials
            .iter()
            .filter(|(_, m)| m.dynamic_texture)
            .map(|(k, _)| k)
            .filter(|&k| self.material_users(k) == 0)
            .collect();
        let mut count = 0;
        for key in unused {
            match self.dispose_material(key) {
                Ok(()) => count += 1,
                Err(e) => tracing::debug!(error = %e, "Material kept"),
            }
        }
        count
    }

    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut SceneNode> {
        self.nodes.get_mut(key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// First live node with this name
    pub fn find_node(&self, name: &str) -> Option<NodeKey> {
        self.nodes
            .iter()
            .find(|(_, n)| n.name == name)
            .map(|(k, _)| k)
    }

    /// Child of `parent` with this name
    pub fn find_child(&self, parent: NodeKey, name: &str) -> Option<NodeKey> {
        let node = self.nodes.get(parent)?;
        node.children
            .iter()
            .copied()
            .find(|&c| self.nodes.get(c).map_or(false, |n| n.name == name))
    }

    /// Composition of all local transforms from the root down to `key`
    pub fn world_transform(&self, key: NodeKey) -> Result<Isometry3<f64>> {
        let mut node = self
            .nodes
            .get(key)
            .ok_or_else(|| Error::NodeNotFound(format!("{:?}", key)))?;
        let mut world = node.local;
        while let Some(parent) = node.parent {
            node = self
                .nodes
                .get(parent)
                .ok_or_else(|| Error::NodeNotFound(format!("{:?}", parent)))?;
            world = node.local * world;
        }
        Ok(world)
    }

    /// Mesh of a node in world coordinates
    pub fn world_mesh(&self, key: NodeKey) -> Result<Option<Mesh>> {
        let Some(mesh) = self.nodes.get(key).and_then(|n| n.mesh.as_ref()) else {
            return Ok(None);
        };
        Ok(Some(mesh.transformed(&self.world_transform(key)?)))
    }

    /// Every live mesh node
    pub fn mesh_nodes(&self) -> impl Iterator<Item = (NodeKey, &SceneNode)> + '_ {
        self.nodes.iter().filter(|(_, n)| n.mesh.is_some())
    }

    /// Keys of `key` and all its descendants, parents before children
    pub fn subtree(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            if let Some(node) = self.nodes.get(k) {
                out.push(k);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Dispose `key` and everything below it; returns the number of nodes removed
    pub fn dispose_subtree(&mut self, key: NodeKey) -> usize {
        let keys = self.subtree(key);
        if let Some(parent) = self.nodes.get(key).and_then(|n| n.parent) {
            if let Some(p) = self.nodes.get_mut(parent) {
                p.children.retain(|c| *c != key);
            }
        }
        for k in &keys {
            self.nodes.remove(*k);
        }
        keys.len()
    }

    /// Dispose only the descendants of `key`, keeping the node itself
    pub fn clear_children(&mut self, key: NodeKey) -> usize {
        let children: Vec<NodeKey> = match self.nodes.get(key) {
            Some(node) => node.children.to_vec(),
            None => return 0,
        };
        children.into_iter().map(|c| self.dispose_subtree(c)).sum()
    }

    /// Dispose every node whose tags match, with its descendants
    pub fn dispose_where(&mut self, predicate: impl Fn(&NodeTags) -> bool) -> usize {
        let matching: Vec<NodeKey> = self
            .nodes
            .iter()
            .filter(|(_, n)| predicate(&n.tags))
            .map(|(k, _)| k)
            .collect();
        let mut total = 0;
        for k in matching {
            if self.nodes.contains_key(k) {
                total += self.dispose_subtree(k);
            }
        }
        total
    }

    /// Toggle-style query: mesh nodes on a given layer
    pub fn nodes_on_layer(&self, layer: Layer) -> Vec<NodeKey> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.tags.layer == Some(layer))
            .map(|(k, _)| k)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::box_mesh;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Translation3, UnitQuaternion, Vector3};

    #[test]
    fn test_material_cache_is_idempotent() {
        let mut scene = Scene::new();
        let a = scene.get_or_create_material("osb");
        let b = scene.get_or_create_material("osb");
        assert_eq!(a, b);
        assert_eq!(scene.material_count(), 1);
    }

    #[test]
    fn test_world_transform_composes_parents() {
        let mut scene = Scene::new();
        let root = scene
            .add_transform_node("root", None, Isometry3::translation(100.0, 0.0, 0.0))
            .unwrap();
        let child = scene
            .add_transform_node(
                "child",
                Some(root),
                Isometry3::from_parts(Translation3::new(0.0, 50.0, 0.0), UnitQuaternion::identity()),
            )
            .unwrap();
        let world = scene.world_transform(child).unwrap();
        let p = world * Point3::origin();
        assert_relative_eq!(p.coords, Vector3::new(100.0, 50.0, 0.0));
        assert_eq!(scene.find_child(root, "child"), Some(child));
    }

    #[test]
    fn test_material_disposed_only_after_meshes() {
        let mut scene = Scene::new();
        let root = scene.add_transform_node("root", None, Isometry3::identity()).unwrap();
        let parts = vec![Part::new("panel", box_mesh(1.0, 1.0, 1.0), "osb", Layer::Osb)];
        scene.emit(root, parts, None).unwrap();

        let osb = scene.material_by_name("osb").unwrap();
        assert!(matches!(
            scene.dispose_material(osb),
            Err(Error::MaterialInUse(_, 1))
        ));
        assert_eq!(scene.dispose_unused_materials(), 0);
        assert!(scene.material(osb).is_some());

        scene.clear_children(root);
        assert_eq!(scene.dispose_unused_materials(), 1);
        assert!(scene.material(osb).is_none());
    }

    #[test]
    fn test_dangling_material_is_rejected() {
        let mut scene = Scene::new();
        let key = scene.get_or_create_material("felt");
        scene.dispose_material(key).unwrap();
        let result = scene.add_mesh("x", None, box_mesh(1.0, 1.0, 1.0), key, NodeTags::default());
        assert!(matches!(result, Err(Error::DanglingMaterial(_))));
    }

    #[test]
    fn test_dispose_by_tag() {
        let mut scene = Scene::new();
        let root = scene.add_transform_node("root", None, Isometry3::identity()).unwrap();
        scene
            .emit(root, vec![Part::new("a", box_mesh(1.0, 1.0, 1.0), "trim", Layer::Trim)], Some("a1"))
            .unwrap();
        scene
            .emit(root, vec![Part::new("b", box_mesh(1.0, 1.0, 1.0), "trim", Layer::Trim)], None)
            .unwrap();
        let removed = scene.dispose_where(|t| t.attachment_id.as_deref() == Some("a1"));
        assert_eq!(removed, 1);
        assert!(scene.find_node("a").is_none());
        assert!(scene.find_node("b").is_some());
        assert_eq!(scene.node(root).unwrap().children.len(), 1);
    }
}
