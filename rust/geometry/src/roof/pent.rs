// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pent (mono-pitch) roof.
//!
//! The slope is built flat in a local frame: X along the eaves edge
//! (`0..edge`), Z up the slope (`0..slope_length`), Y out of the rafter-top
//! surface. [`RigidFrame::for_slope`] then yaws it toward the high wall,
//! pitches it and drops its low corner onto the overhang line.

use super::apex::{batten_stations, layer_material};
use super::trim::fascia_board;
use super::{fixed_stations, Overhangs, RoofGeometry, RoofInput, RoofSummary};
use crate::mesh::Mesh;
use crate::primitives::aabb_mesh;
use crate::scene::{Layer, Part};
use crate::slope::{LayerStack, RoofLayer};
use crate::transform::{PlanRect, RigidFrame};
use nalgebra::{Point3, Vector3};
use shedkit_core::{RoofStyle, WallName};

/// Walls at local `x = 0` and `x = edge` for a slope rising toward `high`
pub fn side_walls(high: WallName) -> (WallName, WallName) {
    match high {
        WallName::Back => (WallName::Left, WallName::Right),
        WallName::Front => (WallName::Right, WallName::Left),
        WallName::Right => (WallName::Back, WallName::Front),
        WallName::Left => (WallName::Front, WallName::Back),
    }
}

/// Horizontal outer edge of `rect` on `wall`, with its outward direction
pub fn edge_line(rect: &PlanRect, wall: WallName) -> (Point3<f64>, Point3<f64>, Vector3<f64>) {
    match wall {
        WallName::Front => (
            Point3::new(rect.min_x, 0.0, rect.min_z),
            Point3::new(rect.max_x, 0.0, rect.min_z),
            -Vector3::z(),
        ),
        WallName::Back => (
            Point3::new(rect.min_x, 0.0, rect.max_z),
            Point3::new(rect.max_x, 0.0, rect.max_z),
            Vector3::z(),
        ),
        WallName::Left => (
            Point3::new(rect.min_x, 0.0, rect.min_z),
            Point3::new(rect.min_x, 0.0, rect.max_z),
            -Vector3::x(),
        ),
        WallName::Right => (
            Point3::new(rect.max_x, 0.0, rect.min_z),
            Point3::new(rect.max_x, 0.0, rect.max_z),
            Vector3::x(),
        ),
    }
}

/// Height of the rafter-top surface above a point of the wall-frame plan,
/// `run` being its horizontal distance from the low wall line
#[inline]
pub fn surface_height(min: f64, max: f64, total_run: f64, run: f64) -> f64 {
    if total_run <= 0.0 {
        return max;
    }
    min + (max - min) * run / total_run
}

pub(crate) fn build(input: &RoofInput, high: WallName, min: f64, max: f64) -> RoofGeometry {
    let cfg = &input.config.roof;
    let trim = &input.config.trim;
    let rect = &input.rect;
    let o: &Overhangs = &input.overhang;

    let run = rect.run_toward(high);
    if run <= 0.0 {
        tracing::warn!(high = %high, run, "Pent roof has no run, nothing built");
        return RoofGeometry::default();
    }
    let low = high.opposite();
    let o_low = o.side(low);
    let o_high = o.side(high);
    let (start_side, end_side) = side_walls(high);
    let o_start = o.side(start_side);
    let o_end = o.side(end_side);

    let angle = (max - min).atan2(run);
    let (tan, cos) = (angle.tan(), angle.cos());
    let expanded = rect.expanded(o.left, o.right, o.front, o.back);
    let edge = expanded.edge_along(high);
    let slope_length = (run + o_low + o_high) / cos;
    let y_low = min - o_low * tan;
    let frame = RigidFrame::for_slope(&expanded, high, y_low, angle);

    let mut parts = Vec::new();
    let mut summary = RoofSummary {
        style: Some(RoofStyle::Pent),
        rise: max - min,
        angle,
        eaves: min,
        crest: max,
        fascia_bottom: min - trim.fascia_depth,
        ..Default::default()
    };

    // Rafters run up the slope over the wall frame width
    let wall_x0 = o_start;
    let wall_x1 = edge - o_end;
    for (i, x) in fixed_stations(
        wall_x0 + cfg.rafter_thickness / 2.0,
        wall_x1 - cfg.rafter_thickness / 2.0,
        cfg.truss_spacing,
    )
    .into_iter()
    .enumerate()
    {
        let rafter = aabb_mesh(
            Point3::new(x - cfg.rafter_thickness / 2.0, -cfg.rafter_depth, 0.0),
            Point3::new(x + cfg.rafter_thickness / 2.0, 0.0, slope_length),
        );
        parts.push(Part::new(format!("rafter-{}", i), rafter, "timber-frame", Layer::Rafter).on_slope("main"));
        summary.rafter_count += 1;
    }

    // Purlins across the rafters between the wall lines
    let wall_z0 = o_low / cos;
    let wall_z1 = (o_low + run) / cos;
    for (k, z) in fixed_stations(
        wall_z0 + cfg.purlin_thickness / 2.0,
        wall_z1 - cfg.purlin_thickness / 2.0,
        cfg.purlin_spacing,
    )
    .into_iter()
    .enumerate()
    {
        let purlin = aabb_mesh(
            Point3::new(0.0, -cfg.purlin_depth, z - cfg.purlin_thickness / 2.0),
            Point3::new(edge, 0.0, z + cfg.purlin_thickness / 2.0),
        );
        parts.push(Part::new(format!("purlin-{}", k), purlin, "timber-frame", Layer::Purlin).on_slope("main"));
        summary.purlin_count += 1;
    }

    let stack = LayerStack::for_covering(input.covering, cfg);
    let stack_top = stack.total();
    for layer in stack.layers() {
        let (Some(offset), Some(thickness)) = (stack.offset(layer), stack.thickness(layer)) else {
            continue;
        };
        let (y0, y1) = (offset - thickness / 2.0, offset + thickness / 2.0);
        match layer {
            RoofLayer::Batten => {
                for (k, z) in batten_stations(slope_length, cfg.batten_width, cfg.batten_gauge)
                    .into_iter()
                    .enumerate()
                {
                    let batten = aabb_mesh(
                        Point3::new(0.0, y0, z - cfg.batten_width / 2.0),
                        Point3::new(edge, y1, z + cfg.batten_width / 2.0),
                    );
                    parts.push(Part::new(format!("batten-{}", k), batten, "batten", Layer::Batten).on_slope("main"));
                    summary.batten_count += 1;
                }
            }
            RoofLayer::Tile => {
                let mut tiles = Mesh::new();
                for z in batten_stations(slope_length, cfg.batten_width, cfg.batten_gauge) {
                    let z0 = (z - cfg.batten_gauge / 2.0).max(0.0);
                    let z1 = (z + cfg.batten_gauge / 2.0).min(slope_length);
                    tiles.merge(&aabb_mesh(Point3::new(0.0, y0, z0), Point3::new(edge, y1, z1)));
                }
                parts.push(Part::new("tiles", tiles, "tile", Layer::Tile).on_slope("main"));
            }
            other => {
                let (material, tag) = layer_material(other);
                let panel = aabb_mesh(Point3::new(0.0, y0, 0.0), Point3::new(edge, y1, slope_length));
                parts.push(Part::new(tag.as_str(), panel, material, tag).on_slope("main"));
            }
        }
    }

    // Barge boards close both side verges
    for (name, x0) in [(start_side, -trim.fascia_thickness), (end_side, edge)] {
        let barge = aabb_mesh(
            Point3::new(x0, stack_top - trim.fascia_depth, 0.0),
            Point3::new(x0 + trim.fascia_thickness, stack_top, slope_length),
        );
        parts.push(Part::new(format!("barge-{}", name), barge, "trim", Layer::Trim));
    }

    let mut geometry = RoofGeometry { parts, summary }.place(&frame);

    // Fascia boards are vertical, so they are placed directly in world space
    let y_high = max + o_high * tan;
    for (wall, top) in [(low, min), (high, y_high)] {
        let (a, b, outward) = edge_line(&expanded, wall);
        geometry.parts.push(Part::new(
            format!("fascia-{}", wall),
            fascia_board(a, b, outward, top - trim.fascia_depth, top, trim.fascia_thickness),
            "trim",
            Layer::Trim,
        ));
    }

    tracing::debug!(
        high = %high,
        min,
        max,
        angle_deg = angle.to_degrees(),
        rafters = geometry.summary.rafter_count,
        "Pent roof"
    );
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roof::{generate, RoofShape};
    use approx::assert_relative_eq;
    use shedkit_core::{CoveringStyle, EngineConfig};

    fn input(config: &EngineConfig) -> RoofInput<'_> {
        RoofInput {
            rect: PlanRect::new(0.0, 1800.0, 0.0, 2400.0),
            overhang: Overhangs::uniform(75.0),
            covering: CoveringStyle::Felt,
            ornaments: false,
            config,
        }
    }

    #[test]
    fn test_side_walls_match_frame() {
        let rect = PlanRect::new(0.0, 1800.0, 0.0, 2400.0);
        for high in WallName::ALL {
            let frame = RigidFrame::for_slope(&rect, high, 0.0, 0.0);
            let (start, end) = side_walls(high);
            let at_start = frame.transform_point(&Point3::new(0.0, 0.0, 1.0));
            let at_end = frame.transform_point(&Point3::new(rect.edge_along(high), 0.0, 1.0));
            let on = |wall: WallName, p: Point3<f64>| match wall {
                WallName::Left => (p.x - rect.min_x).abs() < 1e-6,
                WallName::Right => (p.x - rect.max_x).abs() < 1e-6,
                WallName::Front => (p.z - rect.min_z).abs() < 1e-6,
                WallName::Back => (p.z - rect.max_z).abs() < 1e-6,
            };
            assert!(on(start, at_start), "{:?}", high);
            assert!(on(end, at_end), "{:?}", high);
        }
    }

    #[test]
    fn test_surface_meets_wall_heights() {
        let config = EngineConfig::default();
        for high in WallName::ALL {
            let geometry = generate(&input(&config), &RoofShape::pent(high, 2100.0, 2300.0));
            let rafter = geometry.parts.iter().find(|p| p.name == "rafter-0").unwrap();
            let (_, max) = rafter.mesh.bounds();
            // rafter tops reach the high overhang edge
            let tan = (200.0_f64).atan2(PlanRect::new(0.0, 1800.0, 0.0, 2400.0).run_toward(high)).tan();
            assert_relative_eq!(max.y, 2300.0 + 75.0 * tan, epsilon = 0.05);
        }
    }

    #[test]
    fn test_fascia_bands() {
        let config = EngineConfig::default();
        let geometry = generate(&input(&config), &RoofShape::pent(WallName::Front, 2100.0, 2300.0));
        assert_relative_eq!(geometry.summary.fascia_bottom, 1950.0);
        let low = geometry.parts.iter().find(|p| p.name == "fascia-back").unwrap();
        let (min, max) = low.mesh.bounds();
        assert_relative_eq!(min.y, 1950.0, epsilon = 1e-3);
        assert_relative_eq!(max.y, 2100.0, epsilon = 1e-3);
        assert!(min.z > 2474.0);
        assert!(geometry.summary.purlin_count >= 4);
    }
}
