// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roof frame builder
//!
//! Three roof styles share one input and one output shape:
//!
//! - **apex**: two slopes meeting at a ridge, trusses at a fixed spacing
//! - **pent**: one slope, built flat and placed with a [`RigidFrame`]
//! - **hipped**: two saddle slopes and two triangular hip ends
//!
//! Heights follow one convention everywhere: a roof's eaves (or pent edge)
//! height is the height of the rafter-top surface on the outer wall line.
//! Wall frames stop at the rafter underside.

pub mod apex;
pub mod caps;
pub mod hipped;
pub mod pent;
pub mod trim;

use crate::scene::{anchors, NodeKey, Part, Scene};
use crate::solver::{resolve_rise, ApexRise};
use crate::transform::{PlanRect, RigidFrame};
use crate::error::Result;
use shedkit_core::{
    BuildingParameters, CoveringStyle, EngineConfig, ResolvedDimensions, RidgeAxis, RoofStyle,
    SideOverhang, TrimConfig, WallName,
};

/// Overhang per side in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Overhangs {
    pub left: f64,
    pub right: f64,
    pub front: f64,
    pub back: f64,
}

impl Overhangs {
    pub fn uniform(mm: f64) -> Self {
        Self {
            left: mm,
            right: mm,
            front: mm,
            back: mm,
        }
    }

    pub fn side(&self, wall: WallName) -> f64 {
        match wall {
            WallName::Left => self.left,
            WallName::Right => self.right,
            WallName::Front => self.front,
            WallName::Back => self.back,
        }
    }

    pub fn min(&self) -> f64 {
        self.left.min(self.right).min(self.front).min(self.back)
    }
}

impl From<SideOverhang> for Overhangs {
    fn from(o: SideOverhang) -> Self {
        Self {
            left: o.l as f64,
            right: o.r as f64,
            front: o.f as f64,
            back: o.b as f64,
        }
    }
}

/// Resolved roof shape, everything the builders and the envelope need
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoofShape {
    Apex { ridge: RidgeAxis, rise: ApexRise },
    Pent { high: WallName, min: f64, max: f64 },
    Hipped { rise: ApexRise },
}

impl RoofShape {
    /// Resolve the authoritative sub-config of the main building's roof
    pub fn resolve(params: &BuildingParameters, dims: &ResolvedDimensions, config: &EngineConfig) -> Self {
        let w = dims.frame.w as f64;
        let d = dims.frame.d as f64;
        let default_eaves = params.walls.height_mm as f64;
        let roof = &params.roof;
        match roof.style {
            RoofStyle::Apex => {
                let span = match roof.apex.ridge {
                    RidgeAxis::Depth => w,
                    RidgeAxis::Width => d,
                };
                RoofShape::Apex {
                    ridge: roof.apex.ridge,
                    rise: resolve_rise(
                        roof.apex.eaves_mm.map(f64::from),
                        roof.apex.crest_mm.map(f64::from),
                        default_eaves,
                        span,
                        &config.roof,
                    ),
                }
            }
            RoofStyle::Pent => Self::pent(
                roof.pent.high_side,
                roof.pent.min_height_mm as f64,
                roof.pent.max_height_mm as f64,
            ),
            RoofStyle::Hipped => RoofShape::Hipped {
                rise: resolve_rise(
                    roof.hipped.eaves_mm.map(f64::from),
                    roof.hipped.crest_mm.map(f64::from),
                    default_eaves,
                    w.min(d),
                    &config.roof,
                ),
            },
        }
    }

    /// Pent shape; a high edge below the low edge is raised to it
    pub fn pent(high: WallName, min: f64, max: f64) -> Self {
        if max < min {
            tracing::info!(requested = max, clamped = min, "Pent max height raised to min height");
        }
        RoofShape::Pent {
            high,
            min,
            max: max.max(min),
        }
    }

    pub fn style(&self) -> RoofStyle {
        match self {
            RoofShape::Apex { .. } => RoofStyle::Apex,
            RoofShape::Pent { .. } => RoofStyle::Pent,
            RoofShape::Hipped { .. } => RoofStyle::Hipped,
        }
    }

    /// Lowest eaves height of the roof
    pub fn eaves(&self) -> f64 {
        match self {
            RoofShape::Apex { rise, .. } | RoofShape::Hipped { rise } => rise.eaves,
            RoofShape::Pent { min, .. } => *min,
        }
    }

    /// Absolute height of the lowest fascia board's bottom edge
    pub fn fascia_bottom(&self, trim: &TrimConfig) -> f64 {
        self.eaves() - trim.fascia_depth
    }

    /// Bottom of the gable diamond; apex roofs only
    pub fn diamond_bottom(&self, config: &EngineConfig) -> Option<f64> {
        match self {
            RoofShape::Apex { rise, .. } => Some(trim::diamond_bottom(
                rise.crest,
                config.roof.sheathing,
                &config.trim,
            )),
            _ => None,
        }
    }

    /// Walls carrying a gable end, where the diamond hangs
    pub fn gable_walls(&self) -> &'static [WallName] {
        match self {
            RoofShape::Apex {
                ridge: RidgeAxis::Depth,
                ..
            } => &[WallName::Front, WallName::Back],
            RoofShape::Apex {
                ridge: RidgeAxis::Width,
                ..
            } => &[WallName::Left, WallName::Right],
            _ => &[],
        }
    }
}

/// Everything a roof builder needs besides its shape
#[derive(Debug, Clone, Copy)]
pub struct RoofInput<'a> {
    /// Wall-frame footprint in world plan coordinates
    pub rect: PlanRect,
    pub overhang: Overhangs,
    pub covering: CoveringStyle,
    /// Hang diamonds on gable ends
    pub ornaments: bool,
    pub config: &'a EngineConfig,
}

/// Measurements of a built roof
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoofSummary {
    pub style: Option<RoofStyle>,
    pub rise: f64,
    /// Common-rafter slope angle, radians
    pub angle: f64,
    pub eaves: f64,
    pub crest: f64,
    pub crest_clamped: bool,
    pub ridge_length: f64,
    pub hip_angle: Option<f64>,
    pub hip_rafter_length: Option<f64>,
    pub truss_count: usize,
    pub rafter_count: usize,
    pub purlin_count: usize,
    pub batten_count: usize,
    pub ridge_cap_count: usize,
    pub hip_cap_count: usize,
    pub fascia_bottom: f64,
    pub diamond_bottom: Option<f64>,
}

/// Roof parts in world coordinates plus their summary
#[derive(Debug, Clone, Default)]
pub struct RoofGeometry {
    pub parts: Vec<Part>,
    pub summary: RoofSummary,
}

impl RoofGeometry {
    fn place(mut self, frame: &RigidFrame) -> Self {
        let iso = frame.isometry();
        for part in &mut self.parts {
            part.mesh.transform(&iso);
        }
        self
    }
}

/// Result of emitting a roof into the scene
#[derive(Debug, Clone, Default)]
pub struct RoofBuild {
    pub nodes: Vec<NodeKey>,
    pub summary: RoofSummary,
}

impl RoofBuild {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Build roof geometry without touching a scene
pub fn generate(input: &RoofInput, shape: &RoofShape) -> RoofGeometry {
    match shape {
        RoofShape::Apex { ridge, rise } => apex::build(input, *ridge, rise),
        RoofShape::Pent { high, min, max } => pent::build(input, *high, *min, *max),
        RoofShape::Hipped { rise } => hipped::build(input, rise),
    }
}

/// Build the roof under the scene's `roof-root` anchor.
///
/// A missing anchor is not an error: it is logged and nothing is built.
pub fn build_roof(scene: &mut Scene, input: &RoofInput, shape: &RoofShape) -> Result<RoofBuild> {
    let anchor = scene.find_node(anchors::ROOF);
    build_roof_under(scene, anchor, input, shape, None)
}

/// Build a roof under an explicit anchor (attachments use their own)
pub fn build_roof_under(
    scene: &mut Scene,
    anchor: Option<NodeKey>,
    input: &RoofInput,
    shape: &RoofShape,
    attachment_id: Option<&str>,
) -> Result<RoofBuild> {
    let Some(anchor) = anchor else {
        tracing::warn!(style = ?shape.style(), "No roof anchor in scene, roof not built");
        return Ok(RoofBuild::default());
    };
    let geometry = generate(input, shape);
    let nodes = scene.emit(anchor, geometry.parts, attachment_id)?;
    tracing::debug!(
        style = ?shape.style(),
        nodes = nodes.len(),
        rise = geometry.summary.rise,
        "Roof built"
    );
    Ok(RoofBuild {
        nodes,
        summary: geometry.summary,
    })
}

/// Stations from `start` to `end` at a fixed spacing, always ending on `end`
pub(crate) fn fixed_stations(start: f64, end: f64, spacing: f64) -> Vec<f64> {
    if end < start || spacing <= 0.0 {
        return Vec::new();
    }
    let mut stations = Vec::new();
    let mut s = start;
    while s < end - spacing * 0.25 {
        stations.push(s);
        s += spacing;
    }
    stations.push(end);
    stations
}
