// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rebuild pipeline.
//!
//! A [`Configurator`] owns the scene, the current parameters and the two
//! pluggable backends (booleans and opening geometry). Rebuilds are not
//! incremental: every affected subtree is disposed and built again from
//! scratch, in a fixed order (base, walls, roof, attachments). Materials
//! left without users are released only after all meshes are in place.

use crate::error::Result;
use crate::report::{BuildReport, RoofReport};
use shedkit_core::{resolve_dimensions, BuildingParameters, EngineConfig, ResolvedDimensions};
use shedkit_geometry::attachment::node_name;
use shedkit_geometry::{
    anchors, build_attachment, build_base, build_roof, build_walls, wall_profiles, BooleanOps,
    ClippingProcessor, DefaultOpenings, Isometry3, NodeKey, OpeningBuilder, Overhangs, ParentBuilding,
    PlanRect, RoofInput, RoofShape, Scene, SyntheticState, WallLayout,
};
use std::fmt;

/// A part of the scene that can be invalidated on its own
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subtree {
    Base,
    Walls,
    Roof,
    Attachment(String),
    All,
}

impl fmt::Display for Subtree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subtree::Base => write!(f, "base"),
            Subtree::Walls => write!(f, "walls"),
            Subtree::Roof => write!(f, "roof"),
            Subtree::Attachment(id) => write!(f, "attachment:{}", id),
            Subtree::All => write!(f, "all"),
        }
    }
}

impl Subtree {
    /// Subtrees a change from `old` to `new` invalidates.
    ///
    /// Attachments dock against the parent's walls and roof, so any change
    /// to the parent footprint or roof also rebuilds every attachment. The
    /// roof counts as changed when its resolved shape moves, which covers
    /// apex and hipped eaves that default to the wall height.
    pub fn affected_by(
        old: &BuildingParameters,
        new: &BuildingParameters,
        config: &EngineConfig,
    ) -> Vec<Subtree> {
        let old_dims = resolve_dimensions(old);
        let new_dims = resolve_dimensions(new);
        if old_dims != new_dims || old.frame != new.frame {
            return vec![Subtree::All];
        }
        let roof_changed = old.roof != new.roof
            || RoofShape::resolve(old, &old_dims, config) != RoofShape::resolve(new, &new_dims, config);
        let mut out = Vec::new();
        let mut all_attachments = false;
        if old.base != new.base {
            out.push(Subtree::Base);
            all_attachments = true;
        }
        if old.walls != new.walls || old.cladding != new.cladding || roof_changed {
            out.push(Subtree::Walls);
        }
        if old.cladding != new.cladding {
            all_attachments = true;
        }
        if roof_changed {
            out.push(Subtree::Roof);
            all_attachments = true;
        }

        let mut ids: Vec<&str> = Vec::new();
        for desc in &new.attachments {
            if all_attachments || old.attachment(&desc.id) != Some(desc) {
                ids.push(&desc.id);
            }
        }
        for desc in &old.attachments {
            if new.attachment(&desc.id).is_none() {
                ids.push(&desc.id);
            }
        }
        out.extend(ids.into_iter().map(|id| Subtree::Attachment(id.to_string())));
        out
    }
}

/// Which sections one rebuild touches
#[derive(Debug, Default)]
struct Invalidation {
    base: bool,
    walls: bool,
    roof: bool,
    all_attachments: bool,
    attachments: Vec<String>,
}

impl Invalidation {
    fn from_subtrees(subtrees: &[Subtree]) -> Self {
        let mut inv = Invalidation::default();
        for subtree in subtrees {
            match subtree {
                Subtree::Base => inv.base = true,
                Subtree::Walls => inv.walls = true,
                Subtree::Roof => inv.roof = true,
                Subtree::Attachment(id) => {
                    if !inv.attachments.contains(id) {
                        inv.attachments.push(id.clone());
                    }
                }
                Subtree::All => {
                    inv.base = true;
                    inv.walls = true;
                    inv.roof = true;
                    inv.all_attachments = true;
                }
            }
        }
        if inv.all_attachments {
            inv.attachments.clear();
        }
        inv
    }
}

/// Owns the scene and rebuilds it from building parameters
pub struct Configurator {
    scene: Scene,
    params: BuildingParameters,
    config: EngineConfig,
    booleans: Box<dyn BooleanOps>,
    openings: Box<dyn OpeningBuilder>,
}

impl Configurator {
    /// Configurator with the csgrs boolean backend and default door/window geometry
    pub fn new(params: BuildingParameters, config: EngineConfig) -> Result<Self> {
        let openings = DefaultOpenings::new(&config);
        Self::with_backends(params, config, Box::new(ClippingProcessor::new()), Box::new(openings))
    }

    pub fn with_backends(
        params: BuildingParameters,
        config: EngineConfig,
        booleans: Box<dyn BooleanOps>,
        openings: Box<dyn OpeningBuilder>,
    ) -> Result<Self> {
        let mut scene = Scene::new();
        for anchor in [anchors::BASE, anchors::WALLS, anchors::ROOF, anchors::ATTACHMENTS] {
            scene.add_transform_node(anchor, None, Isometry3::identity())?;
        }
        Ok(Self {
            scene,
            params,
            config,
            booleans,
            openings,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn params(&self) -> &BuildingParameters {
        &self.params
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the parameters and rebuild whatever they invalidate
    pub fn update(&mut self, params: BuildingParameters) -> Result<BuildReport> {
        let affected = Subtree::affected_by(&self.params, &params, &self.config);
        self.params = params;
        if affected.is_empty() {
            tracing::debug!("Parameters unchanged, nothing rebuilt");
            return Ok(BuildReport::default());
        }
        self.rebuild(&affected)
    }

    pub fn rebuild_all(&mut self) -> Result<BuildReport> {
        self.rebuild(&[Subtree::All])
    }

    /// Dispose the given subtrees, build them again, then release orphaned materials
    pub fn rebuild(&mut self, subtrees: &[Subtree]) -> Result<BuildReport> {
        let inv = Invalidation::from_subtrees(subtrees);
        let dims = resolve_dimensions(&self.params);
        let shape = RoofShape::resolve(&self.params, &dims, &self.config);
        let nodes_before = self.scene.node_count();

        let mut report = BuildReport {
            dimensions: Some(dims),
            ..Default::default()
        };
        report.nodes_disposed = self.dispose(&inv);

        if inv.base {
            let rect = base_rect(&dims);
            let build = build_base(&mut self.scene, &rect, &self.params.base, &self.config)?;
            if !build.nodes.is_empty() {
                report.base_joists = Some(build.joist_count);
            }
            report.rebuilt.push(Subtree::Base.to_string());
        }

        if inv.walls {
            let state = main_wall_state(&self.params, &dims, &shape, &self.config);
            let build = build_walls(
                &mut self.scene,
                &state,
                &self.config,
                self.booleans.as_ref(),
                self.openings.as_ref(),
            )?;
            report.add_walls(None, &build.walls);
            report.rebuilt.push(Subtree::Walls.to_string());
        }

        if inv.roof {
            let input = RoofInput {
                rect: PlanRect::new(0.0, dims.frame.w as f64, 0.0, dims.frame.d as f64),
                overhang: Overhangs::from(dims.overhang),
                covering: self.params.roof.covering,
                ornaments: true,
                config: &self.config,
            };
            let build = build_roof(&mut self.scene, &input, &shape)?;
            let requested = match shape {
                RoofShape::Apex { rise, .. } | RoofShape::Hipped { rise } => rise.requested_crest,
                RoofShape::Pent { .. } => None,
            };
            report.add_roof(None, &build.summary, requested);
            if !build.is_empty() {
                report.roof = Some(RoofReport::from(&build.summary));
            }
            report.rebuilt.push(Subtree::Roof.to_string());
        }

        let parent = ParentBuilding {
            w: dims.frame.w as f64,
            d: dims.frame.d as f64,
            shape,
            params: &self.params,
        };
        for desc in &self.params.attachments {
            if !inv.all_attachments && !inv.attachments.contains(&desc.id) {
                continue;
            }
            let before = self.scene.node_count();
            let build = build_attachment(
                &mut self.scene,
                &parent,
                desc,
                &self.config,
                self.booleans.as_ref(),
                self.openings.as_ref(),
            )?;
            if let Some(build) = build {
                report.add_attachment(&build, self.scene.node_count() - before);
            }
            report.rebuilt.push(Subtree::Attachment(desc.id.clone()).to_string());
        }

        report.materials_disposed = self.scene.dispose_unused_materials();
        report.nodes_built = (self.scene.node_count() + report.nodes_disposed).saturating_sub(nodes_before);

        tracing::info!(
            rebuilt = ?report.rebuilt,
            disposed = report.nodes_disposed,
            built = report.nodes_built,
            clamps = report.clamps.len(),
            fallbacks = report.csg_fallbacks.len(),
            "Rebuild complete"
        );
        Ok(report)
    }

    fn dispose(&mut self, inv: &Invalidation) -> usize {
        let mut disposed = 0;
        for (flag, anchor) in [
            (inv.base, anchors::BASE),
            (inv.walls, anchors::WALLS),
            (inv.roof, anchors::ROOF),
            (inv.all_attachments, anchors::ATTACHMENTS),
        ] {
            if flag {
                disposed += self.anchor(anchor).map_or(0, |key| self.scene.clear_children(key));
            }
        }
        if let Some(root) = self.anchor(anchors::ATTACHMENTS) {
            for id in &inv.attachments {
                if let Some(key) = self.scene.find_child(root, &node_name(id)) {
                    disposed += self.scene.dispose_subtree(key);
                }
            }
        }
        disposed
    }

    fn anchor(&self, name: &str) -> Option<NodeKey> {
        let key = self.scene.find_node(name);
        if key.is_none() {
            tracing::warn!(anchor = name, "Anchor missing, nothing to dispose");
        }
        key
    }
}

/// Base rectangle in frame coordinates, centred on the roof footprint
pub fn base_rect(dims: &ResolvedDimensions) -> PlanRect {
    let o = &dims.overhang;
    let ex = (dims.base.w as f64 - dims.roof.w as f64) / 2.0;
    let ez = (dims.base.d as f64 - dims.roof.d as f64) / 2.0;
    PlanRect::new(
        -(o.l as f64) - ex,
        (dims.frame.w + o.r) as f64 + ex,
        -(o.f as f64) - ez,
        (dims.frame.d + o.b) as f64 + ez,
    )
}

/// Synthetic wall state of the main building
pub fn main_wall_state(
    params: &BuildingParameters,
    dims: &ResolvedDimensions,
    shape: &RoofShape,
    config: &EngineConfig,
) -> SyntheticState {
    let (w, d) = (dims.frame.w as f64, dims.frame.d as f64);
    let depth = params.frame.depth_mm as f64;
    let openings = params
        .walls
        .openings
        .iter()
        .filter(|o| {
            let standard = o.wall.standard().is_some();
            if !standard {
                tracing::warn!(opening = %o.id, wall = ?o.wall, "Opening names no wall of the main building, skipped");
            }
            standard
        })
        .cloned()
        .collect();
    SyntheticState {
        w,
        d,
        variant: params.walls.variant,
        openings,
        thickness: params.frame.thickness_mm as f64,
        depth,
        layout: WallLayout::Standard,
        walls: wall_profiles(shape, w, d, depth, config),
        cladding: params.cladding.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shedkit_core::{AttachmentDescriptor, OverhangParams, WallName};

    #[test]
    fn test_invalidation_all_covers_everything() {
        let inv = Invalidation::from_subtrees(&[Subtree::Attachment("a1".into()), Subtree::All]);
        assert!(inv.base && inv.walls && inv.roof && inv.all_attachments);
        assert!(inv.attachments.is_empty());
    }

    #[test]
    fn test_affected_by_attachment_change() {
        let config = EngineConfig::default();
        let old = BuildingParameters {
            attachments: vec![AttachmentDescriptor {
                id: "a1".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut new = old.clone();
        new.attachments[0].depth_mm = 1500;
        assert_eq!(
            Subtree::affected_by(&old, &new, &config),
            vec![Subtree::Attachment("a1".into())]
        );

        new.attachments.clear();
        assert_eq!(
            Subtree::affected_by(&old, &new, &config),
            vec![Subtree::Attachment("a1".into())]
        );
    }

    #[test]
    fn test_affected_by_roof_change_reaches_attachments() {
        let config = EngineConfig::default();
        let old = BuildingParameters {
            attachments: vec![AttachmentDescriptor {
                id: "a1".into(),
                wall: WallName::Right,
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut new = old.clone();
        new.roof.apex.crest_mm = Some(2400);
        assert_eq!(
            Subtree::affected_by(&old, &new, &config),
            vec![Subtree::Walls, Subtree::Roof, Subtree::Attachment("a1".into())]
        );

        let mut resized = old.clone();
        resized.w = 2400;
        assert_eq!(Subtree::affected_by(&old, &resized, &config), vec![Subtree::All]);
        assert!(Subtree::affected_by(&old, &old.clone(), &config).is_empty());
    }

    #[test]
    fn test_wall_height_moves_default_eaves() {
        let config = EngineConfig::default();
        let old = BuildingParameters {
            attachments: vec![AttachmentDescriptor {
                id: "a1".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut taller = old.clone();
        taller.walls.height_mm = 2300;
        assert_eq!(
            Subtree::affected_by(&old, &taller, &config),
            vec![Subtree::Walls, Subtree::Roof, Subtree::Attachment("a1".into())]
        );

        // explicit eaves pin the roof, only the walls follow the height
        let mut pinned = old.clone();
        pinned.roof.apex.eaves_mm = Some(1850);
        let mut pinned_taller = pinned.clone();
        pinned_taller.walls.height_mm = 2300;
        assert_eq!(Subtree::affected_by(&pinned, &pinned_taller, &config), vec![Subtree::Walls]);
    }

    #[test]
    fn test_base_rect_follows_overhangs() {
        let params = BuildingParameters {
            overhang: OverhangParams {
                uniform_mm: 75,
                l_mm: Some(100),
                ..Default::default()
            },
            ..Default::default()
        };
        let rect = base_rect(&resolve_dimensions(&params));
        assert_eq!(rect, PlanRect::new(-100.0, 1875.0, -75.0, 2475.0));
    }
}
