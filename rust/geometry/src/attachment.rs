// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attachment docking and the parent envelope.
//!
//! An attachment is a small building docked against one wall of the main
//! building. Planning it takes three steps:
//!
//! 1. **Docking**: its frame footprint is placed against the parent wall,
//!    one wall-overhang gap outside it. Width runs along the parent wall and
//!    depth away from it. The attachment wall facing the parent is omitted.
//! 2. **Envelope**: the parent's lowest fascia bottom caps the attachment's
//!    roof. An apex attachment docked on a parent gable must also stay
//!    clear of the gable diamond. Heights above a cap are clamped, never
//!    rejected, and every clamp is returned with the plan.
//! 3. **Synthetic state**: attachment wall names (`front`/`back`/`outer`
//!    or `left`/`right`/`outer`) are remapped to the standard four walls,
//!    so the ordinary wall, opening and cladding builders can run on it.
//!
//! Heights of an attachment are relative to its own base, which sits
//! `levelOffset_mm` above the parent's.

use crate::base::{build_base_under, BaseBuild};
use crate::csg::BooleanOps;
use crate::error::Result;
use crate::openings::OpeningBuilder;
use crate::roof::{build_roof_under, Overhangs, RoofBuild, RoofInput, RoofShape};
use crate::scene::{anchors, NodeKey, Scene};
use crate::solver::{heuristic_rise, solve_rise};
use crate::transform::PlanRect;
use crate::walls::{build_walls_under, wall_profiles, SectionContext, SyntheticState, WallLayout, WallsBuild};
use nalgebra::{Isometry3, Vector3};
use shedkit_core::{
    AttachmentDescriptor, AttachmentRoofType, BuildingParameters, EngineConfig, Opening, RidgeAxis,
    WallName, WallRef,
};

/// Child anchor names under each attachment node
pub mod attachment_anchors {
    pub const WALLS: &str = "attachment-walls";
    pub const ROOF: &str = "attachment-roof";
    pub const BASE: &str = "attachment-base";
}

/// Scene node name of an attachment
pub fn node_name(id: &str) -> String {
    format!("attachment:{}", id)
}

/// A value that may have been capped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamped<T> {
    pub value: T,
    pub requested: T,
    pub clamped: bool,
}

impl Clamped<f64> {
    /// `requested`, lowered to `max` if above it
    pub fn at_most(requested: f64, max: f64) -> Self {
        if requested > max {
            Self {
                value: max,
                requested,
                clamped: true,
            }
        } else {
            Self {
                value: requested,
                requested,
                clamped: false,
            }
        }
    }
}

/// One height lowered to fit the envelope
#[derive(Debug, Clone, PartialEq)]
pub struct ClampRecord {
    pub attachment: String,
    pub field: &'static str,
    pub requested: f64,
    pub value: f64,
}

/// Where an attachment sits against its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Docking {
    /// Parent wall the attachment docks against; also the name of the
    /// attachment's own outer wall
    pub parent_wall: WallName,
    /// Attachment wall facing the parent, not built
    pub docked: WallName,
    /// Attachment wall-frame footprint in world plan coordinates
    pub rect: PlanRect,
    pub level: f64,
    pub layout: WallLayout,
}

impl Docking {
    /// World position of the attachment's local origin
    pub fn origin(&self) -> Vector3<f64> {
        Vector3::new(self.rect.min_x, self.level, self.rect.min_z)
    }

    #[inline]
    pub fn outer(&self) -> WallName {
        self.parent_wall
    }
}

/// Place an attachment's footprint against a `parent_w × parent_d` frame
pub fn dock(parent_w: f64, parent_d: f64, desc: &AttachmentDescriptor, config: &EngineConfig) -> Docking {
    let gap = config.walls.wall_overhang;
    let width = desc.width_mm as f64;
    let depth = desc.depth_mm as f64;
    let offset = desc.offset_mm as f64;
    let cx = parent_w / 2.0 + offset;
    let cz = parent_d / 2.0 + offset;

    let rect = match desc.wall {
        WallName::Left => PlanRect::new(-gap - depth, -gap, cz - width / 2.0, cz + width / 2.0),
        WallName::Right => PlanRect::new(
            parent_w + gap,
            parent_w + gap + depth,
            cz - width / 2.0,
            cz + width / 2.0,
        ),
        WallName::Front => PlanRect::new(cx - width / 2.0, cx + width / 2.0, -gap - depth, -gap),
        WallName::Back => PlanRect::new(
            cx - width / 2.0,
            cx + width / 2.0,
            parent_d + gap,
            parent_d + gap + depth,
        ),
    };
    let layout = if desc.wall.runs_along_x() {
        WallLayout::SideWallsFull
    } else {
        WallLayout::Standard
    };
    Docking {
        parent_wall: desc.wall,
        docked: desc.wall.opposite(),
        rect,
        level: desc.level_offset_mm as f64,
        layout,
    }
}

/// Height limits an attachment must respect, relative to its own base
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    /// Parent's lowest fascia bottom, parent-base relative
    pub fascia_bottom: f64,
    /// Highest wall frame top at the parent wall
    pub max_wall: f64,
    /// Highest rafter-top surface at the parent wall (pent high edge, apex eaves)
    pub max_roof: f64,
    /// Highest crest
    pub max_crest: f64,
    /// The parent's gable diamond is the tighter limit on the crest
    pub diamond_limited: bool,
}

/// Envelope under `parent` for an attachment on `parent_wall`
pub fn envelope(
    parent: &RoofShape,
    parent_wall: WallName,
    level: f64,
    apex_attachment: bool,
    config: &EngineConfig,
) -> Envelope {
    let roof = &config.roof;
    let fascia_bottom = parent.fascia_bottom(&config.trim);
    let max_wall = fascia_bottom - (roof.rafter_depth + roof.sheathing + roof.covering) - level;
    let max_roof = max_wall + roof.rafter_depth;
    let mut max_crest = max_roof + roof.sheathing;
    let mut diamond_limited = false;

    if apex_attachment && parent.gable_walls().contains(&parent_wall) {
        if let Some(bottom) = parent.diamond_bottom(config) {
            let limit = bottom - config.trim.diamond_clearance - level;
            if limit < max_crest {
                max_crest = limit;
                diamond_limited = true;
            }
        }
    }
    if max_wall <= 0.0 {
        tracing::warn!(parent_wall = %parent_wall, max_wall, "Parent envelope leaves no wall height");
    }
    Envelope {
        fascia_bottom,
        max_wall,
        max_roof,
        max_crest,
        diamond_limited,
    }
}

fn record(records: &mut Vec<ClampRecord>, id: &str, field: &'static str, c: Clamped<f64>) {
    if !c.clamped {
        return;
    }
    tracing::info!(
        attachment = %id,
        field,
        requested = c.requested,
        clamped = c.value,
        "Attachment height clamped to parent envelope"
    );
    records.push(ClampRecord {
        attachment: id.to_string(),
        field,
        requested: c.requested,
        value: c.value,
    });
}

/// Ridge direction of an apex attachment: perpendicular to the parent wall
pub fn attachment_ridge(parent_wall: WallName) -> RidgeAxis {
    if parent_wall.runs_along_x() {
        RidgeAxis::Depth
    } else {
        RidgeAxis::Width
    }
}

/// Roof shape of an attachment after clamping to the envelope
pub fn attachment_roof(
    desc: &AttachmentDescriptor,
    docking: &Docking,
    envelope: &Envelope,
    config: &EngineConfig,
) -> (RoofShape, Vec<ClampRecord>) {
    let mut clamps = Vec::new();
    let roof = &desc.roof;
    match roof.kind {
        AttachmentRoofType::Pent => {
            let max = Clamped::at_most(roof.max_height_mm as f64, envelope.max_roof);
            record(&mut clamps, &desc.id, "roof.maxHeight_mm", max);
            let min = Clamped::at_most(roof.min_height_mm as f64, max.value);
            record(&mut clamps, &desc.id, "roof.minHeight_mm", min);
            (RoofShape::pent(docking.docked, min.value, max.value), clamps)
        }
        AttachmentRoofType::Apex => {
            let ridge = attachment_ridge(docking.parent_wall);
            let span = match ridge {
                RidgeAxis::Depth => docking.rect.size_x(),
                RidgeAxis::Width => docking.rect.size_z(),
            };
            let sheathing = config.roof.sheathing;
            let eaves_req = roof.eaves_mm.unwrap_or(roof.min_height_mm) as f64;
            let heuristic = heuristic_rise(eaves_req, span, &config.roof);
            let crest = Clamped::at_most(
                roof.crest_mm.map(f64::from).unwrap_or(heuristic.crest),
                envelope.max_crest,
            );
            record(&mut clamps, &desc.id, "roof.crest_mm", crest);
            let eaves = Clamped::at_most(eaves_req, (crest.value - sheathing).min(envelope.max_roof));
            record(&mut clamps, &desc.id, "roof.eaves_mm", eaves);

            let rise = if roof.crest_mm.is_none() && !crest.clamped && !eaves.clamped {
                heuristic
            } else {
                solve_rise(eaves.value, crest.value, span / 2.0, &config.roof)
            };
            (RoofShape::Apex { ridge, rise }, clamps)
        }
    }
}

/// Translate attachment openings to standard wall names and positions.
///
/// Side walls measure `x_mm` from the parent wall outward; the outer wall
/// measures it from its own start, and gains the corner-wall depth because
/// it is framed between the two side walls.
pub fn remap_openings(desc: &AttachmentDescriptor, docking: &Docking, depth: f64) -> Vec<Opening> {
    let (w, d) = (docking.rect.size_x(), docking.rect.size_z());
    let side_walls = if docking.parent_wall.runs_along_x() {
        [WallRef::Left, WallRef::Right]
    } else {
        [WallRef::Front, WallRef::Back]
    };
    // side walls whose local origin lies on the outer end run away from the parent
    let flipped = matches!(docking.parent_wall, WallName::Left | WallName::Front);
    let side_length = if docking.parent_wall.runs_along_x() { d } else { w };

    let mut out = Vec::with_capacity(desc.walls.openings.len());
    for opening in &desc.walls.openings {
        let mut mapped = opening.clone();
        if opening.wall == WallRef::Outer {
            mapped.wall = WallRef::from(docking.outer());
            mapped.x_mm = opening.x_mm + depth.round() as u32;
        } else if side_walls.contains(&opening.wall) {
            if flipped {
                let x = side_length - opening.x_mm as f64 - opening.width_mm as f64;
                if x < 0.0 {
                    tracing::warn!(
                        attachment = %desc.id,
                        opening = %opening.id,
                        "Opening runs past the attachment wall, pinned to its end"
                    );
                }
                mapped.x_mm = x.max(0.0).round() as u32;
            }
        } else {
            tracing::warn!(
                attachment = %desc.id,
                opening = %opening.id,
                wall = ?opening.wall,
                "Opening names a wall this attachment does not have, skipped"
            );
            continue;
        }
        out.push(mapped);
    }
    out
}

/// The parent an attachment docks against
#[derive(Debug, Clone, Copy)]
pub struct ParentBuilding<'a> {
    pub w: f64,
    pub d: f64,
    pub shape: RoofShape,
    pub params: &'a BuildingParameters,
}

/// Everything derived for one attachment before any geometry is built
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentPlan {
    pub id: String,
    pub docking: Docking,
    pub envelope: Envelope,
    pub shape: RoofShape,
    pub overhang: Overhangs,
    pub clamps: Vec<ClampRecord>,
    pub state: SyntheticState,
}

impl AttachmentPlan {
    pub fn section_context(&self) -> SectionContext {
        SectionContext {
            offset: self.docking.origin(),
            attachment_id: Some(self.id.clone()),
        }
    }
}

/// Dock, constrain and remap one attachment
pub fn plan_attachment(parent: &ParentBuilding, desc: &AttachmentDescriptor, config: &EngineConfig) -> AttachmentPlan {
    let docking = dock(parent.w, parent.d, desc, config);
    let envelope = envelope(
        &parent.shape,
        desc.wall,
        docking.level,
        desc.roof.kind == AttachmentRoofType::Apex,
        config,
    );
    let (shape, clamps) = attachment_roof(desc, &docking, &envelope, config);

    let frame = &parent.params.frame;
    let depth = frame.depth_mm as f64;
    let (w, d) = (docking.rect.size_x(), docking.rect.size_z());
    let walls = wall_profiles(&shape, w, d, depth, config)
        .into_iter()
        .filter(|(name, _)| *name != docking.docked)
        .collect();
    let state = SyntheticState {
        w,
        d,
        variant: desc.walls.variant,
        openings: remap_openings(desc, &docking, depth),
        thickness: frame.thickness_mm as f64,
        depth,
        layout: docking.layout,
        walls,
        cladding: parent.params.cladding.clone(),
    };

    let o = desc.overhang_mm as f64;
    let mut overhang = Overhangs::uniform(o);
    match docking.docked {
        WallName::Left => overhang.left = 0.0,
        WallName::Right => overhang.right = 0.0,
        WallName::Front => overhang.front = 0.0,
        WallName::Back => overhang.back = 0.0,
    }

    AttachmentPlan {
        id: desc.id.clone(),
        docking,
        envelope,
        shape,
        overhang,
        clamps,
        state,
    }
}

/// Result of building one attachment
#[derive(Debug, Clone)]
pub struct AttachmentBuild {
    pub plan: AttachmentPlan,
    pub root: NodeKey,
    pub walls: WallsBuild,
    pub roof: RoofBuild,
    pub base: BaseBuild,
}

/// Build one attachment under the scene's `attachments-root` anchor.
///
/// Returns `None` when the attachment is disabled or the anchor is missing.
pub fn build_attachment(
    scene: &mut Scene,
    parent: &ParentBuilding,
    desc: &AttachmentDescriptor,
    config: &EngineConfig,
    booleans: &dyn BooleanOps,
    openings: &dyn OpeningBuilder,
) -> Result<Option<AttachmentBuild>> {
    if !desc.enabled {
        tracing::debug!(attachment = %desc.id, "Attachment disabled");
        return Ok(None);
    }
    let Some(anchor) = scene.find_node(anchors::ATTACHMENTS) else {
        tracing::warn!(attachment = %desc.id, "No attachments anchor in scene, attachment not built");
        return Ok(None);
    };

    let plan = plan_attachment(parent, desc, config);
    let id = plan.id.as_str();
    let lift = Isometry3::translation(0.0, plan.docking.level, 0.0);

    let root = scene.add_transform_node(node_name(id), Some(anchor), Isometry3::identity())?;
    if let Some(node) = scene.node_mut(root) {
        node.tags.attachment_id = Some(id.to_string());
    }
    let walls_anchor = scene.add_transform_node(attachment_anchors::WALLS, Some(root), Isometry3::identity())?;
    let roof_anchor = scene.add_transform_node(attachment_anchors::ROOF, Some(root), lift)?;
    let base_anchor = scene.add_transform_node(attachment_anchors::BASE, Some(root), lift)?;

    let walls = build_walls_under(
        scene,
        Some(walls_anchor),
        &plan.state,
        &plan.section_context(),
        config,
        booleans,
        openings,
    )?;
    let input = RoofInput {
        rect: plan.docking.rect,
        overhang: plan.overhang,
        covering: parent.params.roof.covering,
        ornaments: false,
        config,
    };
    let roof = build_roof_under(scene, Some(roof_anchor), &input, &plan.shape, Some(id))?;
    let base = build_base_under(
        scene,
        Some(base_anchor),
        &plan.docking.rect,
        &parent.params.base,
        config,
        Some(id),
    )?;

    tracing::debug!(
        attachment = %id,
        parent_wall = %plan.docking.parent_wall,
        walls = walls.walls.len(),
        clamps = plan.clamps.len(),
        "Attachment built"
    );
    Ok(Some(AttachmentBuild {
        plan,
        root,
        walls,
        roof,
        base,
    }))
}
