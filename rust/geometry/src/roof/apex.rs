// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Apex (gable) roof.
//!
//! Built in a canonical frame with the span on X (`0..span`) and the ridge
//! on Z (`0..length`), then placed: unchanged for a ridge along the building
//! depth, turned a quarter about Y for a ridge along the width.

use super::caps::cap_meshes;
use super::trim::{diamond, fascia_board};
use super::{fixed_stations, RoofGeometry, RoofInput, RoofSummary};
use crate::primitives::box_mesh;
use crate::scene::{Layer, Part};
use crate::slope::{LayerStack, RoofLayer, SlopeDescriptor, SlopeSide};
use crate::solver::ApexRise;
use crate::transform::RigidFrame;
use crate::mesh::Mesh;
use nalgebra::{Point3, Vector3};
use shedkit_core::{RidgeAxis, RoofStyle};
use std::f64::consts::FRAC_PI_2;

/// Canonical overhangs: across the span (`left`/`right`) and past the
/// gable ends (`start`/`end` along the ridge)
struct Canonical {
    span: f64,
    length: f64,
    left: f64,
    right: f64,
    start: f64,
    end: f64,
    names: [&'static str; 2],
    frame: RigidFrame,
}

fn canonical(input: &RoofInput, ridge: RidgeAxis) -> Canonical {
    let rect = &input.rect;
    let o = &input.overhang;
    match ridge {
        RidgeAxis::Depth => Canonical {
            span: rect.size_x(),
            length: rect.size_z(),
            left: o.left,
            right: o.right,
            start: o.front,
            end: o.back,
            names: ["left", "right"],
            frame: RigidFrame::translation(Point3::new(rect.min_x, 0.0, rect.min_z)),
        },
        // canonical X runs toward world front, canonical Z toward world right
        RidgeAxis::Width => Canonical {
            span: rect.size_z(),
            length: rect.size_x(),
            left: o.back,
            right: o.front,
            start: o.left,
            end: o.right,
            names: ["back", "front"],
            frame: RigidFrame::from_yaw_pitch(
                Point3::new(rect.min_x, 0.0, rect.max_z),
                FRAC_PI_2,
                0.0,
            ),
        },
    }
}

pub(crate) fn build(input: &RoofInput, ridge: RidgeAxis, rise: &ApexRise) -> RoofGeometry {
    let cfg = &input.config.roof;
    let trim = &input.config.trim;
    let c = canonical(input, ridge);

    let hs = c.span / 2.0;
    let angle = rise.rise.atan2(hs);
    let (sin, cos) = angle.sin_cos();
    let eaves = rise.eaves;
    let ridge_y = eaves + rise.rise;
    let roof_length = c.length + c.start + c.end;
    let ridge_point = Point3::new(hs, ridge_y, -c.start);

    let slopes = [
        (
            SlopeDescriptor::new(hs, rise.rise, SlopeSide::Left, ridge_point, roof_length),
            c.left,
            c.names[0],
        ),
        (
            SlopeDescriptor::new(hs, rise.rise, SlopeSide::Right, ridge_point, roof_length),
            c.right,
            c.names[1],
        ),
    ];

    let mut parts = Vec::new();
    let mut summary = RoofSummary {
        style: Some(RoofStyle::Apex),
        rise: rise.rise,
        angle,
        eaves,
        crest: rise.crest,
        crest_clamped: rise.crest_clamped,
        ridge_length: roof_length,
        fascia_bottom: eaves - trim.fascia_depth,
        ..Default::default()
    };

    // Trusses: tie beam on the wall plates, two rafters, king post if it fits
    let rafter_drop = cfg.rafter_depth / cos;
    let tie_bottom = eaves - rafter_drop;
    let tie_top = tie_bottom + cfg.rafter_depth;
    let king_top = ridge_y - rafter_drop;
    let stations = fixed_stations(
        cfg.rafter_thickness / 2.0,
        c.length - cfg.rafter_thickness / 2.0,
        cfg.truss_spacing,
    );
    for (i, &z) in stations.iter().enumerate() {
        let mut truss = box_mesh(c.span, cfg.rafter_depth, cfg.rafter_thickness);
        truss.transform(&nalgebra::Isometry3::translation(hs, (tie_bottom + tie_top) / 2.0, z));
        let clearance = king_top - tie_top;
        if clearance >= cfg.king_post_min_clearance {
            let mut post = box_mesh(cfg.rafter_thickness, clearance, cfg.rafter_thickness);
            post.transform(&nalgebra::Isometry3::translation(hs, tie_top + clearance / 2.0, z));
            truss.merge(&post);
        }
        parts.push(Part::new(format!("truss-{}", i), truss, "timber-frame", Layer::Truss));

        for (slope, overhang, name) in &slopes {
            let tail = (hs + overhang) / cos;
            let zl = z + c.start;
            let rafter = slope.board(
                0.0,
                tail,
                zl - cfg.rafter_thickness / 2.0,
                zl + cfg.rafter_thickness / 2.0,
                -cfg.rafter_depth / 2.0,
                cfg.rafter_depth,
            );
            parts.push(
                Part::new(format!("rafter-{}-{}", name, i), rafter, "timber-frame", Layer::Rafter)
                    .on_slope(*name),
            );
            summary.rafter_count += 1;
        }
    }
    summary.truss_count = stations.len();

    let stack = LayerStack::for_covering(input.covering, cfg);
    let stack_top = stack.total();
    for (slope, overhang, name) in &slopes {
        let wall_s = slope.width;
        let tail = (hs + overhang) / cos;

        // Purlins notched flush with the rafter tops
        for (k, s) in fixed_stations(
            cfg.purlin_thickness / 2.0,
            wall_s - cfg.purlin_thickness / 2.0,
            cfg.purlin_spacing,
        )
        .into_iter()
        .enumerate()
        {
            let purlin = slope.board(
                s - cfg.purlin_thickness / 2.0,
                s + cfg.purlin_thickness / 2.0,
                0.0,
                roof_length,
                -cfg.purlin_depth / 2.0,
                cfg.purlin_depth,
            );
            parts.push(
                Part::new(format!("purlin-{}-{}", name, k), purlin, "timber-frame", Layer::Purlin)
                    .on_slope(*name),
            );
            summary.purlin_count += 1;
        }

        for layer in stack.layers() {
            let (Some(offset), Some(thickness)) = (stack.offset(layer), stack.thickness(layer)) else {
                continue;
            };
            // panels reach past the rafter line so outer faces meet at the
            // ridge and line up with the fascia at the eaves
            let ext = (offset + thickness / 2.0) * angle.tan();
            match layer {
                RoofLayer::Batten => {
                    for (k, s) in batten_stations(tail, cfg.batten_width, cfg.batten_gauge)
                        .into_iter()
                        .enumerate()
                    {
                        let batten = slope.board(
                            s - cfg.batten_width / 2.0,
                            s + cfg.batten_width / 2.0,
                            0.0,
                            roof_length,
                            offset,
                            thickness,
                        );
                        parts.push(
                            Part::new(format!("batten-{}-{}", name, k), batten, "batten", Layer::Batten)
                                .on_slope(*name),
                        );
                        summary.batten_count += 1;
                    }
                }
                RoofLayer::Tile => {
                    let mut tiles = Mesh::new();
                    for s in batten_stations(tail, cfg.batten_width, cfg.batten_gauge) {
                        let s0 = (s - cfg.batten_gauge / 2.0).max(-ext);
                        let s1 = (s + cfg.batten_gauge / 2.0).min(tail + ext);
                        tiles.merge(&slope.board(s0, s1, 0.0, roof_length, offset, thickness));
                    }
                    parts.push(
                        Part::new(format!("tiles-{}", name), tiles, "tile", Layer::Tile).on_slope(*name),
                    );
                }
                other => {
                    let panel = slope.board(-ext, tail + ext, 0.0, roof_length, offset, thickness);
                    let (material, tag) = layer_material(other);
                    parts.push(
                        Part::new(format!("{}-{}", tag.as_str(), name), panel, material, tag)
                            .on_slope(*name),
                    );
                }
            }
        }

        // Fascia along the eaves edge
        let edge_x = match slope.side {
            SlopeSide::Left => -overhang,
            SlopeSide::Right => c.span + overhang,
        };
        let outward = Vector3::new(slope.downslope().x, 0.0, 0.0);
        parts.push(
            Part::new(
                format!("fascia-{}", name),
                fascia_board(
                    Point3::new(edge_x, 0.0, -c.start),
                    Point3::new(edge_x, 0.0, c.length + c.end),
                    outward,
                    eaves - trim.fascia_depth,
                    eaves,
                    trim.fascia_thickness,
                ),
                "trim",
                Layer::Trim,
            )
            .on_slope(*name),
        );

        // Barge boards on both gable verges, top flush with the covering
        let ext = stack_top * angle.tan();
        for (end, z0) in [
            ("start", -trim.fascia_thickness),
            ("end", roof_length),
        ] {
            let barge = slope.board(
                -ext,
                tail + ext,
                z0,
                z0 + trim.fascia_thickness,
                stack_top - trim.fascia_depth / 2.0,
                trim.fascia_depth,
            );
            parts.push(
                Part::new(format!("barge-{}-{}", name, end), barge, "trim", Layer::Trim)
                    .on_slope(*name),
            );
        }
    }

    // Ridge caps on top of the covering
    let cap_y = ridge_y + stack_top / cos;
    let caps = cap_meshes(
        Point3::new(hs, cap_y, -c.start),
        Point3::new(hs, cap_y, c.length + c.end),
        angle,
        &input.config.caps,
    );
    summary.ridge_cap_count = caps.len();
    for (i, cap) in caps.into_iter().enumerate() {
        parts.push(Part::new(format!("ridge-cap-{}", i), cap, "ridge-cap", Layer::Cap));
    }

    let diamond_top = rise.crest - cfg.sheathing;
    summary.diamond_bottom = Some(super::trim::diamond_bottom(rise.crest, cfg.sheathing, trim));
    if input.ornaments {
        let gap = trim.fascia_thickness + trim.diamond_thickness / 2.0;
        for (end, z) in [("start", -c.start - gap), ("end", c.length + c.end + gap)] {
            parts.push(Part::new(
                format!("diamond-{}", end),
                diamond(hs, diamond_top, z, trim),
                "trim",
                Layer::Trim,
            ));
        }
    }

    tracing::debug!(
        span = c.span,
        rise = rise.rise,
        angle_deg = angle.to_degrees(),
        trusses = summary.truss_count,
        purlins = summary.purlin_count,
        "Apex roof"
    );
    RoofGeometry { parts, summary }.place(&c.frame)
}

/// Batten centres measured from the ridge, laid from the eaves tail upward
pub(crate) fn batten_stations(tail: f64, width: f64, gauge: f64) -> Vec<f64> {
    let mut stations = Vec::new();
    let mut s = tail - width / 2.0;
    while s >= width / 2.0 {
        stations.push(s);
        s -= gauge;
    }
    stations
}

pub(crate) fn layer_material(layer: RoofLayer) -> (&'static str, Layer) {
    match layer {
        RoofLayer::Membrane => ("membrane", Layer::Membrane),
        RoofLayer::Batten => ("batten", Layer::Batten),
        RoofLayer::Osb => ("osb", Layer::Osb),
        RoofLayer::Covering => ("felt", Layer::Covering),
        RoofLayer::Tile => ("tile", Layer::Tile),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roof::{generate, Overhangs, RoofShape};
    use crate::solver::solve_rise;
    use crate::transform::PlanRect;
    use approx::assert_relative_eq;
    use shedkit_core::{CoveringStyle, EngineConfig};

    fn input(config: &EngineConfig, covering: CoveringStyle) -> RoofInput<'_> {
        RoofInput {
            rect: PlanRect::new(0.0, 1800.0, 0.0, 2400.0),
            overhang: Overhangs::uniform(75.0),
            covering,
            ornaments: true,
            config,
        }
    }

    #[test]
    fn test_apex_trusses_and_ridge() {
        let config = EngineConfig::default();
        let rise = solve_rise(1850.0, 2200.0, 900.0, &config.roof);
        let geometry = generate(
            &input(&config, CoveringStyle::Felt),
            &RoofShape::Apex { ridge: RidgeAxis::Depth, rise },
        );
        let s = &geometry.summary;
        // 0..2400 at 600mm: five trusses
        assert_eq!(s.truss_count, 5);
        assert_eq!(s.rafter_count, 10);
        assert_relative_eq!(s.ridge_length, 2550.0);
        // 2550 / 382 = 6 full caps, remainder 258 gets its own cap
        assert_eq!(s.ridge_cap_count, 7);
        assert!(geometry.parts.iter().any(|p| p.name == "diamond-start"));

        let osb = geometry.parts.iter().find(|p| p.name == "osb-left").unwrap();
        let (min, _) = osb.mesh.bounds();
        assert!(min.x < -75.0);
    }

    #[test]
    fn test_width_ridge_is_turned() {
        let config = EngineConfig::default();
        let rise = solve_rise(1850.0, 2200.0, 1200.0, &config.roof);
        let geometry = generate(
            &input(&config, CoveringStyle::Felt),
            &RoofShape::Apex { ridge: RidgeAxis::Width, rise },
        );
        let fascia = geometry.parts.iter().find(|p| p.name == "fascia-front").unwrap();
        let (min, max) = fascia.mesh.bounds();
        // front fascia runs along X, outside the front overhang
        assert!(max.x - min.x > 1800.0);
        assert!(max.z < -74.0);
    }

    #[test]
    fn test_tiles_build_battens() {
        let config = EngineConfig::default();
        let rise = solve_rise(1850.0, 2300.0, 900.0, &config.roof);
        let geometry = generate(
            &input(&config, CoveringStyle::Tiles),
            &RoofShape::Apex { ridge: RidgeAxis::Depth, rise },
        );
        assert!(geometry.summary.batten_count > 4);
        assert!(geometry.parts.iter().any(|p| p.layer == Layer::Membrane));
        assert!(!geometry.parts.iter().any(|p| p.layer == Layer::Covering));
    }
}
