// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cladding course clipper.
//!
//! Courses are stacked bottom-up on the outer face of a wall, each a
//! protruding drip strip under a thinner upper strip, and overshoot the
//! nominal wall height by a margin. Two boolean passes then shape them:
//!
//! 1. the roofline: a box above a flat top, an eight-vertex wedge over a
//!    sloped top, or the union of two wedges over a gable;
//! 2. the openings: one box per door or window, unioned, subtracted once.
//!
//! A failing pass is logged and skipped, so a wall always keeps cladding.

use crate::csg::BooleanOps;
use crate::mesh::Mesh;
use crate::primitives::{aabb_mesh, hexahedron};
use crate::scene::{Layer, Part};
use crate::walls::{WallSpec, WallTop};
use nalgebra::Point3;
use shedkit_core::{CladdingParams, EngineConfig, Opening};

/// How one boolean pass went
#[derive(Debug, Clone, PartialEq)]
pub enum ClipResult {
    Applied,
    /// Nothing to cut
    Skipped,
    /// The pass failed and its input was kept
    Failed(String),
}

impl ClipResult {
    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, ClipResult::Failed(_))
    }
}

/// Outcome of clipping one wall's cladding
#[derive(Debug, Clone, PartialEq)]
pub struct CladdingOutcome {
    pub courses: usize,
    pub roofline: ClipResult,
    pub openings: ClipResult,
}

impl CladdingOutcome {
    pub fn fell_back(&self) -> bool {
        self.roofline.is_failed() || self.openings.is_failed()
    }
}

/// Number of courses needed to cover `height` plus `margin`
#[inline]
pub fn course_count(height: f64, margin: f64, pitch: f64) -> usize {
    ((height + margin) / pitch).ceil().max(0.0) as usize
}

/// Z range of a strip of `thickness` on the outer face
fn outer_band(spec: &WallSpec, thickness: f64) -> (f64, f64) {
    let outer = spec.outer_z();
    if spec.outward() < 0.0 {
        (outer - thickness, outer)
    } else {
        (outer, outer + thickness)
    }
}

/// Local X range covered by cladding: the whole building side
fn cladding_span(spec: &WallSpec) -> (f64, f64) {
    (-spec.corner_offset, spec.full_length - spec.corner_offset)
}

/// Merged, unclipped course mesh and its course count
pub fn build_courses(spec: &WallSpec, config: &EngineConfig) -> (Mesh, usize) {
    let c = &config.cladding;
    let top = &spec.profile.cladding_top;
    let margin = if top.is_flat() {
        c.clip_margin_flat
    } else {
        c.clip_margin_sloped
    };
    let count = course_count(top.max_height(), margin, c.course_pitch);
    let (x0, x1) = cladding_span(spec);
    let (dz0, dz1) = outer_band(spec, c.drip_thickness);
    let (uz0, uz1) = outer_band(spec, c.upper_thickness);

    let mut mesh = Mesh::with_capacity(count * 48, count * 72);
    for i in 0..count {
        let y = i as f64 * c.course_pitch;
        mesh.merge(&aabb_mesh(
            Point3::new(x0, y, dz0),
            Point3::new(x1, y + c.drip_height, dz1),
        ));
        mesh.merge(&aabb_mesh(
            Point3::new(x0, y + c.drip_height, uz0),
            Point3::new(x1, y + c.course_pitch, uz1),
        ));
    }
    (mesh, count)
}

/// Wedge whose underside follows the line `(xa, ya) → (xb, yb)`
fn wedge(xa: f64, ya: f64, xb: f64, yb: f64, z0: f64, z1: f64, height: f64) -> Mesh {
    let top = ya.max(yb) + height;
    hexahedron(
        [
            Point3::new(xa, ya, z0),
            Point3::new(xb, yb, z0),
            Point3::new(xb, yb, z1),
            Point3::new(xa, ya, z1),
        ],
        [
            Point3::new(xa, top, z0),
            Point3::new(xb, top, z0),
            Point3::new(xb, top, z1),
            Point3::new(xa, top, z1),
        ],
    )
}

/// Roofline cutter in wall-local coordinates.
///
/// Gable walls need a union of two wedges, so the boolean provider is
/// passed in.
pub fn roofline_cutter(spec: &WallSpec, config: &EngineConfig, booleans: &dyn BooleanOps) -> crate::error::Result<Mesh> {
    let c = &config.cladding;
    let (x0, x1) = cladding_span(spec);
    let reach = c.drip_thickness.max(c.upper_thickness) + 50.0;
    let (z0, z1) = (spec.outer_z() - reach, spec.outer_z() + reach);
    let (xa, xb) = (x0 - 100.0, x1 + 100.0);
    let co = spec.corner_offset;

    match spec.profile.cladding_top {
        WallTop::Flat { height } => Ok(aabb_mesh(
            Point3::new(xa, height, z0),
            Point3::new(xb, height + c.wedge_height, z1),
        )),
        WallTop::Sloped { start, end, length } => {
            // extend the roofline past both ends of the side
            let slope = if length > 0.0 { (end - start) / length } else { 0.0 };
            let at = |x: f64| start + slope * (x + co);
            Ok(wedge(xa, at(xa), xb, at(xb), z0, z1, c.wedge_height))
        }
        WallTop::Gable { eaves, peak, length } => {
            let half = length / 2.0;
            let slope = if half > 0.0 { (peak - eaves) / half } else { 0.0 };
            let xp = half - co;
            let left = wedge(xa, peak - slope * (xp - xa), xp, peak, z0, z1, c.wedge_height);
            let right = wedge(xp, peak, xb, peak - slope * (xb - xp), z0, z1, c.wedge_height);
            booleans.union(&left, &right)
        }
    }
}

/// Box through the cladding for one opening
pub fn opening_cutter(spec: &WallSpec, opening: &Opening, config: &EngineConfig) -> Mesh {
    let c = &config.cladding;
    let reach = c.drip_thickness.max(c.upper_thickness) + 10.0;
    let x = spec.local_x(opening);
    let y = opening.bottom_mm() as f64;
    aabb_mesh(
        Point3::new(x, y, spec.outer_z() - reach),
        Point3::new(x + opening.width_mm as f64, y + opening.height_mm as f64, spec.outer_z() + reach),
    )
}

/// Build, clip and cut one wall's cladding
pub fn clip_cladding(
    spec: &WallSpec,
    openings: &[&Opening],
    params: &CladdingParams,
    config: &EngineConfig,
    booleans: &dyn BooleanOps,
) -> (Part, CladdingOutcome) {
    let (courses, count) = build_courses(spec, config);

    let (clipped, roofline) = match roofline_cutter(spec, config, booleans)
        .and_then(|cutter| booleans.subtract(&courses, &cutter))
    {
        Ok(mesh) => (mesh, ClipResult::Applied),
        Err(e) => {
            tracing::warn!(
                wall = %spec.name,
                length_mm = spec.full_length,
                height_mm = spec.profile.cladding_top.max_height(),
                error = %e,
                "Cladding roofline clip failed, keeping unclipped courses"
            );
            (courses, ClipResult::Failed(e.to_string()))
        }
    };

    let (mesh, opening_result) = if openings.is_empty() {
        (clipped, ClipResult::Skipped)
    } else {
        let holes: Vec<Mesh> = openings.iter().map(|o| opening_cutter(spec, o, config)).collect();
        match booleans
            .union_all(&holes)
            .and_then(|cutter| booleans.subtract(&clipped, &cutter))
        {
            Ok(mesh) => (mesh, ClipResult::Applied),
            Err(e) => {
                tracing::warn!(
                    wall = %spec.name,
                    openings = openings.len(),
                    error = %e,
                    "Cladding opening cut failed, keeping uncut courses"
                );
                (clipped, ClipResult::Failed(e.to_string()))
            }
        }
    };

    let outcome = CladdingOutcome {
        courses: count,
        roofline,
        openings: opening_result,
    };
    let part = Part::new(
        format!("cladding-{}", spec.name),
        mesh,
        params.style.material_name(),
        Layer::Cladding,
    );
    (part, outcome)
}
