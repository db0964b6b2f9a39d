// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall panel & sloped-plate builder.
//!
//! Every wall is framed in its own local frame: X along the wall, Y up,
//! Z through the wall thickness (`0..depth`). Heights along a wall are read
//! from a [`WallTop`], evaluated at the building-relative position so that a
//! gable peak or a pent slope lines up no matter where the framed segment
//! starts.
//!
//! ## Layout
//!
//! Corner walls overlap at the building corners. In the standard layout the
//! front and back walls run the full width and the side walls fit between
//! them; attachments docked on the front or back swap this
//! ([`WallLayout::SideWallsFull`]).
//!
//! ## Section input
//!
//! The builder only sees a [`SyntheticState`] (footprint, member section,
//! variant, openings named with the four standard walls) and a
//! [`SectionContext`] carrying the section's world offset. The main building
//! and every attachment go through the same entry point.

pub mod framing;
pub mod insulated;
pub mod panels;
pub mod plates;

use crate::cladding::{clip_cladding, CladdingOutcome};
use crate::csg::BooleanOps;
use crate::error::Result;
use crate::openings::OpeningBuilder;
use crate::roof::RoofShape;
use crate::scene::{anchors, NodeKey, Part, Scene};
use crate::transform::{PlanRect, RigidFrame};
use nalgebra::{Isometry3, Point3, Vector3};
use shedkit_core::{
    CladdingParams, EngineConfig, Opening, RidgeAxis, WallName, WallVariant,
};
use std::f64::consts::FRAC_PI_2;

/// Height profile of a wall top, as a function of the building-relative
/// position along the wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WallTop {
    Flat { height: f64 },
    /// Linear from `start` at position 0 to `end` at `length`
    Sloped { start: f64, end: f64, length: f64 },
    /// Symmetric peak at `length / 2`
    Gable { eaves: f64, peak: f64, length: f64 },
}

impl WallTop {
    pub fn height_at(&self, t: f64) -> f64 {
        match *self {
            WallTop::Flat { height } => height,
            WallTop::Sloped { start, end, length } => {
                if length <= 0.0 {
                    return start.max(end);
                }
                start + (end - start) * (t / length).clamp(0.0, 1.0)
            }
            WallTop::Gable { eaves, peak, length } => {
                let half = length / 2.0;
                if half <= 0.0 {
                    return peak;
                }
                let k = 1.0 - ((t - half).abs() / half).min(1.0);
                eaves + (peak - eaves) * k
            }
        }
    }

    pub fn max_height(&self) -> f64 {
        match *self {
            WallTop::Flat { height } => height,
            WallTop::Sloped { start, end, .. } => start.max(end),
            WallTop::Gable { eaves, peak, .. } => eaves.max(peak),
        }
    }

    pub fn min_height(&self) -> f64 {
        match *self {
            WallTop::Flat { height } => height,
            WallTop::Sloped { start, end, .. } => start.min(end),
            WallTop::Gable { eaves, peak, .. } => eaves.min(peak),
        }
    }

    #[inline]
    pub fn is_flat(&self) -> bool {
        matches!(self, WallTop::Flat { .. })
    }

    /// Position of the gable peak, if any
    pub fn peak_at(&self) -> Option<f64> {
        match *self {
            WallTop::Gable { length, .. } => Some(length / 2.0),
            _ => None,
        }
    }
}

/// Framing top and cladding clip line of one wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallProfile {
    pub frame_top: WallTop,
    pub cladding_top: WallTop,
}

impl WallProfile {
    pub fn flat(frame: f64, cladding: f64) -> Self {
        Self {
            frame_top: WallTop::Flat { height: frame },
            cladding_top: WallTop::Flat { height: cladding },
        }
    }
}

/// Which pair of walls runs the full length at the corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WallLayout {
    #[default]
    Standard,
    SideWallsFull,
}

impl WallLayout {
    /// True when `wall` spans the full building side
    pub fn is_full(&self, wall: WallName) -> bool {
        match self {
            WallLayout::Standard => wall.runs_along_x(),
            WallLayout::SideWallsFull => !wall.runs_along_x(),
        }
    }
}

/// Wall-local description of a section (main building or attachment)
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticState {
    pub w: f64,
    pub d: f64,
    pub variant: WallVariant,
    /// Openings on the standard walls, positions building-relative
    pub openings: Vec<Opening>,
    /// Stud width along the wall
    pub thickness: f64,
    /// Wall depth
    pub depth: f64,
    pub layout: WallLayout,
    /// Walls to build, with their profiles; attachments omit the docked wall
    pub walls: Vec<(WallName, WallProfile)>,
    pub cladding: CladdingParams,
}

impl SyntheticState {
    pub fn openings_on(&self, wall: WallName) -> impl Iterator<Item = &Opening> + '_ {
        self.openings
            .iter()
            .filter(move |o| o.wall.standard() == Some(wall))
    }
}

/// World placement of a section, plus its scene tag
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SectionContext {
    pub offset: Vector3<f64>,
    pub attachment_id: Option<String>,
}

impl SectionContext {
    pub fn main() -> Self {
        Self::default()
    }

    pub fn isometry(&self) -> Isometry3<f64> {
        Isometry3::translation(self.offset.x, self.offset.y, self.offset.z)
    }
}

/// One wall placed in its section
#[derive(Debug, Clone, PartialEq)]
pub struct WallSpec {
    pub name: WallName,
    pub frame: RigidFrame,
    /// Framed segment length
    pub length: f64,
    /// Building-relative position of local `x = 0`
    pub corner_offset: f64,
    /// Length of the building side this wall sits on
    pub full_length: f64,
    pub depth: f64,
    pub profile: WallProfile,
}

impl WallSpec {
    /// Frame top height at local `x`
    #[inline]
    pub fn top_at(&self, x: f64) -> f64 {
        self.profile.frame_top.height_at(x + self.corner_offset)
    }

    /// Cladding clip height at local `x`
    #[inline]
    pub fn cladding_top_at(&self, x: f64) -> f64 {
        self.profile.cladding_top.height_at(x + self.corner_offset)
    }

    /// Local Z of the outer face
    #[inline]
    pub fn outer_z(&self) -> f64 {
        match self.name {
            WallName::Front | WallName::Right => 0.0,
            WallName::Back | WallName::Left => self.depth,
        }
    }

    /// `-1` when the outer face looks down local Z, `+1` otherwise
    #[inline]
    pub fn outward(&self) -> f64 {
        match self.name {
            WallName::Front | WallName::Right => -1.0,
            WallName::Back | WallName::Left => 1.0,
        }
    }

    /// Local Z of the inner face
    #[inline]
    pub fn inner_z(&self) -> f64 {
        self.depth - self.outer_z()
    }

    /// Opening start along the framed segment
    #[inline]
    pub fn local_x(&self, opening: &Opening) -> f64 {
        opening.x_mm as f64 - self.corner_offset
    }
}

/// Placement of every wall of a section, in section coordinates
pub fn wall_specs(state: &SyntheticState) -> Vec<WallSpec> {
    let (w, d, depth) = (state.w, state.d, state.depth);
    state
        .walls
        .iter()
        .map(|&(name, profile)| {
            let full = state.layout.is_full(name);
            let full_length = if name.runs_along_x() { w } else { d };
            let (length, corner_offset) = if full {
                (full_length, 0.0)
            } else {
                ((full_length - 2.0 * depth).max(0.0), depth)
            };
            let frame = match name {
                WallName::Front => {
                    RigidFrame::translation(Point3::new(corner_offset, 0.0, 0.0))
                }
                WallName::Back => {
                    RigidFrame::translation(Point3::new(corner_offset, 0.0, d - depth))
                }
                WallName::Left => {
                    RigidFrame::from_yaw_pitch(Point3::new(depth, 0.0, corner_offset), -FRAC_PI_2, 0.0)
                }
                WallName::Right => {
                    RigidFrame::from_yaw_pitch(Point3::new(w, 0.0, corner_offset), -FRAC_PI_2, 0.0)
                }
            };
            WallSpec {
                name,
                frame,
                length,
                corner_offset,
                full_length,
                depth,
                profile,
            }
        })
        .collect()
}

/// Wall profiles under a roof, for a `w × d` frame
pub fn wall_profiles(shape: &RoofShape, w: f64, d: f64, depth: f64, config: &EngineConfig) -> Vec<(WallName, WallProfile)> {
    let rafter = config.roof.rafter_depth;
    match *shape {
        RoofShape::Apex { ridge, rise } => {
            let drop = rafter / rise.angle.cos();
            let (gables, length) = match ridge {
                RidgeAxis::Depth => ([WallName::Front, WallName::Back], w),
                RidgeAxis::Width => ([WallName::Left, WallName::Right], d),
            };
            WallName::ALL
                .iter()
                .map(|&wall| {
                    let profile = if gables.contains(&wall) {
                        WallProfile {
                            frame_top: WallTop::Gable {
                                eaves: rise.eaves - drop,
                                peak: rise.ridge_height() - drop,
                                length,
                            },
                            cladding_top: WallTop::Gable {
                                eaves: rise.eaves + config.cladding.gable_eaves_offset,
                                peak: rise.crest - rafter,
                                length,
                            },
                        }
                    } else {
                        WallProfile::flat(rise.eaves - drop, rise.eaves)
                    };
                    (wall, profile)
                })
                .collect()
        }
        RoofShape::Pent { high, min, max } => {
            let rect = PlanRect::new(0.0, w, 0.0, d);
            let angle = (max - min).atan2(rect.run_toward(high));
            let drop = rafter / angle.cos();
            // side walls start at the front (left/right) or the left (front/back)
            let high_at_start = matches!(high, WallName::Front | WallName::Left);
            let (start, end) = if high_at_start { (max, min) } else { (min, max) };
            WallName::ALL
                .iter()
                .map(|&wall| {
                    let profile = if wall == high {
                        WallProfile::flat(max - drop - depth * angle.tan(), max)
                    } else if wall == high.opposite() {
                        WallProfile::flat(min - drop, min)
                    } else {
                        let length = if wall.runs_along_x() { w } else { d };
                        WallProfile {
                            frame_top: WallTop::Sloped {
                                start: start - drop,
                                end: end - drop,
                                length,
                            },
                            cladding_top: WallTop::Sloped { start, end, length },
                        }
                    };
                    (wall, profile)
                })
                .collect()
        }
        RoofShape::Hipped { rise } => {
            let drop = rafter / rise.angle.cos();
            WallName::ALL
                .iter()
                .map(|&wall| (wall, WallProfile::flat(rise.eaves - drop, rise.eaves)))
                .collect()
        }
    }
}

/// Report for one built wall
#[derive(Debug, Clone, PartialEq)]
pub struct WallReport {
    pub wall: WallName,
    pub length: f64,
    pub panels: Vec<(f64, f64)>,
    pub studs: Vec<f64>,
    pub cladding: Option<CladdingOutcome>,
}

/// Result of emitting a section's walls
#[derive(Debug, Clone, Default)]
pub struct WallsBuild {
    pub nodes: Vec<NodeKey>,
    pub walls: Vec<WallReport>,
}

impl WallsBuild {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Parts of one wall in its local frame
pub fn build_wall(
    spec: &WallSpec,
    state: &SyntheticState,
    config: &EngineConfig,
    booleans: &dyn BooleanOps,
    openings: &dyn OpeningBuilder,
) -> (Vec<Part>, WallReport) {
    let wall_openings: Vec<&Opening> = state.openings_on(spec.name).collect();
    let t = state.thickness;

    let mut parts = Vec::new();
    let (panels, studs) = match state.variant {
        WallVariant::Basic => {
            let zones = panels::frame_zones(spec, &wall_openings, t);
            let panels = panels::layout_panels(spec.length, &zones, t, config.walls.panel_max_width);
            let studs = panels::basic_studs(&panels, &zones, t);
            (panels, studs)
        }
        WallVariant::Insulated => {
            let zones = panels::frame_zones(spec, &wall_openings, t);
            let studs = panels::insulated_studs(spec.length, &zones, t, config.walls.insulated_stud_spacing);
            (vec![(0.0, spec.length)], studs)
        }
    };

    parts.extend(framing::studs(spec, &studs, t, config));
    parts.extend(plates::bottom_plates(spec, &wall_openings, config));
    parts.extend(plates::top_plates(spec, config));
    for opening in &wall_openings {
        parts.extend(framing::opening_framing(spec, opening, t, config));
        parts.extend(openings.build(spec, opening));
    }
    if state.variant == WallVariant::Insulated {
        parts.extend(insulated::insulation(spec, &wall_openings, t, config));
        parts.extend(insulated::lining(spec, &wall_openings, t, config, booleans));
    }

    let cladding = if state.cladding.visible {
        let (part, outcome) = clip_cladding(spec, &wall_openings, &state.cladding, config, booleans);
        parts.push(part);
        Some(outcome)
    } else {
        None
    };

    tracing::debug!(
        wall = %spec.name,
        length_mm = spec.length,
        panels = panels.len(),
        studs = studs.len(),
        openings = wall_openings.len(),
        "Wall framed"
    );
    let report = WallReport {
        wall: spec.name,
        length: spec.length,
        panels,
        studs,
        cladding,
    };
    (parts, report)
}

/// Build the main building's walls under the scene's `walls-root` anchor
pub fn build_walls(
    scene: &mut Scene,
    state: &SyntheticState,
    config: &EngineConfig,
    booleans: &dyn BooleanOps,
    openings: &dyn OpeningBuilder,
) -> Result<WallsBuild> {
    let anchor = scene.find_node(anchors::WALLS);
    build_walls_under(scene, anchor, state, &SectionContext::main(), config, booleans, openings)
}

/// Build a section's walls under an explicit anchor.
///
/// Each wall gets a transform node carrying the section offset and the
/// wall's frame; its parts are emitted in wall-local coordinates.
pub fn build_walls_under(
    scene: &mut Scene,
    anchor: Option<NodeKey>,
    state: &SyntheticState,
    ctx: &SectionContext,
    config: &EngineConfig,
    booleans: &dyn BooleanOps,
    openings: &dyn OpeningBuilder,
) -> Result<WallsBuild> {
    let Some(anchor) = anchor else {
        tracing::warn!(attachment = ?ctx.attachment_id, "No walls anchor in scene, walls not built");
        return Ok(WallsBuild::default());
    };

    let mut build = WallsBuild::default();
    for spec in wall_specs(state) {
        if spec.length <= 0.0 {
            tracing::warn!(wall = %spec.name, "Wall has no length, skipped");
            continue;
        }
        let (parts, report) = build_wall(&spec, state, config, booleans, openings);
        let local = ctx.isometry() * spec.frame.isometry();
        let node = scene.add_transform_node(format!("wall-{}", spec.name), Some(anchor), local)?;
        build.nodes.push(node);
        build.nodes.extend(scene.emit(node, parts, ctx.attachment_id.as_deref())?);
        build.walls.push(report);
    }
    Ok(build)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::solve_rise;
    use approx::assert_relative_eq;

    fn state(walls: Vec<(WallName, WallProfile)>) -> SyntheticState {
        SyntheticState {
            w: 1800.0,
            d: 2400.0,
            variant: WallVariant::Basic,
            openings: Vec::new(),
            thickness: 50.0,
            depth: 75.0,
            layout: WallLayout::Standard,
            walls,
            cladding: CladdingParams::default(),
        }
    }

    #[test]
    fn test_gable_top() {
        let top = WallTop::Gable {
            eaves: 1800.0,
            peak: 2100.0,
            length: 1800.0,
        };
        assert_relative_eq!(top.height_at(0.0), 1800.0);
        assert_relative_eq!(top.height_at(900.0), 2100.0);
        assert_relative_eq!(top.height_at(450.0), 1950.0);
        assert_relative_eq!(top.height_at(1800.0), 1800.0);
    }

    #[test]
    fn test_standard_layout_places_corners() {
        let profiles = WallName::ALL
            .iter()
            .map(|&w| (w, WallProfile::flat(1800.0, 1850.0)))
            .collect();
        let specs = wall_specs(&state(profiles));
        let left = specs.iter().find(|s| s.name == WallName::Left).unwrap();
        assert_relative_eq!(left.length, 2250.0);
        // left wall: local X runs toward the back, outer face on world x = 0
        let start = left.frame.transform_point(&Point3::new(0.0, 0.0, left.outer_z()));
        assert_relative_eq!(start, Point3::new(0.0, 0.0, 75.0), epsilon = 1e-9);
        let end = left.frame.transform_point(&Point3::new(left.length, 0.0, left.inner_z()));
        assert_relative_eq!(end, Point3::new(75.0, 0.0, 2325.0), epsilon = 1e-9);

        let right = specs.iter().find(|s| s.name == WallName::Right).unwrap();
        let outer = right.frame.transform_point(&Point3::new(0.0, 0.0, right.outer_z()));
        assert_relative_eq!(outer.x, 1800.0, epsilon = 1e-9);

        let back = specs.iter().find(|s| s.name == WallName::Back).unwrap();
        let outer = back.frame.transform_point(&Point3::new(0.0, 0.0, back.outer_z()));
        assert_relative_eq!(outer.z, 2400.0, epsilon = 1e-9);
        assert_relative_eq!(back.length, 1800.0);
    }

    #[test]
    fn test_apex_profiles() {
        let config = EngineConfig::default();
        let rise = solve_rise(1850.0, 2200.0, 900.0, &config.roof);
        let shape = RoofShape::Apex {
            ridge: RidgeAxis::Depth,
            rise,
        };
        let profiles = wall_profiles(&shape, 1800.0, 2400.0, 75.0, &config);
        let front = profiles.iter().find(|(w, _)| *w == WallName::Front).unwrap().1;
        let left = profiles.iter().find(|(w, _)| *w == WallName::Left).unwrap().1;
        let drop = 100.0 / rise.angle.cos();
        assert_relative_eq!(left.frame_top.height_at(0.0), 1850.0 - drop, epsilon = 1e-9);
        assert_relative_eq!(front.frame_top.height_at(900.0), 1850.0 + rise.rise - drop, epsilon = 1e-9);
        assert_relative_eq!(front.cladding_top.height_at(0.0), 1855.0);
    }

    #[test]
    fn test_pent_side_walls_slope_toward_high() {
        let config = EngineConfig::default();
        let shape = RoofShape::pent(WallName::Front, 2100.0, 2300.0);
        let profiles = wall_profiles(&shape, 1800.0, 2400.0, 75.0, &config);
        let left = profiles.iter().find(|(w, _)| *w == WallName::Left).unwrap().1;
        assert!(left.frame_top.height_at(0.0) > left.frame_top.height_at(2400.0));
        assert_relative_eq!(left.cladding_top.height_at(0.0), 2300.0);
        assert_relative_eq!(left.cladding_top.height_at(2400.0), 2100.0);
    }
}
