// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hipped roof.
//!
//! Built with the short side `B` on X and the long side on Z, yawed a
//! quarter turn when the building is wider than deep. All four slopes share
//! one parameterization: a plan corner, a unit vector along the eaves and a
//! unit vector up the slope. A point is addressed by `(u, x)`, its distance
//! along the eaves and its horizontal distance in from the eaves line. Every
//! slope's outline is `(0,0) (E,0) (E−xr,xr) (xr,xr)`, which collapses to a
//! triangle on the hip ends and on square buildings.

use super::apex::{batten_stations, layer_material};
use super::caps::cap_meshes;
use super::pent::edge_line;
use super::trim::fascia_board;
use super::{fixed_stations, RoofGeometry, RoofInput, RoofSummary};
use crate::mesh::Mesh;
use crate::primitives::{box_mesh, slab};
use crate::scene::{Layer, Part};
use crate::slope::{LayerStack, RoofLayer};
use crate::solver::ApexRise;
use crate::transform::{align_z_to, PlanRect, RigidFrame};
use nalgebra::{Isometry3, Point3, Translation3, Vector3};
use shedkit_core::{RoofStyle, WallName};
use std::f64::consts::{FRAC_PI_2, SQRT_2};

/// Plan geometry of one hipped slope
#[derive(Debug, Clone, Copy)]
struct HipSlope {
    name: &'static str,
    corner: Point3<f64>,
    eaves: Vector3<f64>,
    up: Vector3<f64>,
    /// Eaves length including both overhangs
    length: f64,
}

/// Shared dimensions of the four slopes
#[derive(Debug, Clone, Copy)]
struct HipFrame {
    /// Horizontal distance from the eaves line to the ridge line
    reach: f64,
    /// Height of the rafter-top surface at the eaves line
    base_y: f64,
    tan: f64,
    sin: f64,
    cos: f64,
}

impl HipFrame {
    fn point(&self, slope: &HipSlope, u: f64, x: f64, lift: f64) -> Point3<f64> {
        let p = slope.corner + slope.eaves * u + slope.up * x;
        Point3::new(p.x, self.base_y + x * self.tan + lift, p.z)
    }

    fn normal(&self, slope: &HipSlope) -> Vector3<f64> {
        -slope.up * self.sin + Vector3::y() * self.cos
    }

    /// Band of the slope between `x0` and `x1` in from the eaves
    fn band(&self, slope: &HipSlope, x0: f64, x1: f64, lift: f64) -> Vec<Point3<f64>> {
        let x0 = x0.clamp(0.0, self.reach);
        let x1 = x1.clamp(0.0, self.reach);
        let e = slope.length;
        dedup(vec![
            self.point(slope, x0, x0, lift),
            self.point(slope, e - x0, x0, lift),
            self.point(slope, e - x1, x1, lift),
            self.point(slope, x1, x1, lift),
        ])
    }
}

fn dedup(mut points: Vec<Point3<f64>>) -> Vec<Point3<f64>> {
    points.dedup_by(|a, b| (*a - *b).norm() < 1e-6);
    if points.len() > 1 {
        let (first, last) = (points[0], points[points.len() - 1]);
        if (first - last).norm() < 1e-6 {
            points.pop();
        }
    }
    points
}

/// Eaves length remaining at a horizontal distance `x` in from the eaves
#[inline]
pub fn course_length(eaves_length: f64, x: f64) -> f64 {
    (eaves_length - x).min(eaves_length) - x.max(0.0)
}

/// Plan length of a hip line from wall corner to ridge end
#[inline]
pub fn hip_plan_length(half_span: f64) -> f64 {
    half_span * SQRT_2
}

/// Slope angle along the hip line, radians
#[inline]
pub fn hip_angle(half_span: f64, rise: f64) -> f64 {
    rise.atan2(hip_plan_length(half_span))
}

/// True length of a hip rafter between wall corner and ridge end
#[inline]
pub fn hip_rafter_length(half_span: f64, rise: f64) -> f64 {
    hip_plan_length(half_span).hypot(rise)
}

pub(crate) fn build(input: &RoofInput, rise: &ApexRise) -> RoofGeometry {
    let cfg = &input.config.roof;
    let trim = &input.config.trim;
    let rect = &input.rect;
    let turned = rect.size_x() > rect.size_z();
    let (short, long) = if turned {
        (rect.size_z(), rect.size_x())
    } else {
        (rect.size_x(), rect.size_z())
    };
    let names: [&'static str; 4] = if turned {
        ["back", "front", "left", "right"]
    } else {
        ["left", "right", "front", "back"]
    };
    let frame = if turned {
        RigidFrame::from_yaw_pitch(Point3::new(rect.min_x, 0.0, rect.max_z), FRAC_PI_2, 0.0)
    } else {
        RigidFrame::translation(Point3::new(rect.min_x, 0.0, rect.min_z))
    };

    let o = input.overhang.min();
    let hs = short / 2.0;
    let angle = rise.rise.atan2(hs);
    let hf = HipFrame {
        reach: hs + o,
        base_y: rise.eaves - o * angle.tan(),
        tan: angle.tan(),
        sin: angle.sin(),
        cos: angle.cos(),
    };
    let ridge_y = rise.eaves + rise.rise;
    let ridge_length = (long - short).max(0.0);
    let phi = hip_angle(hs, rise.rise);

    let slopes = [
        HipSlope {
            name: names[0],
            corner: Point3::new(-o, 0.0, -o),
            eaves: Vector3::z(),
            up: Vector3::x(),
            length: long + 2.0 * o,
        },
        HipSlope {
            name: names[1],
            corner: Point3::new(short + o, 0.0, -o),
            eaves: Vector3::z(),
            up: -Vector3::x(),
            length: long + 2.0 * o,
        },
        HipSlope {
            name: names[2],
            corner: Point3::new(-o, 0.0, -o),
            eaves: Vector3::x(),
            up: Vector3::z(),
            length: short + 2.0 * o,
        },
        HipSlope {
            name: names[3],
            corner: Point3::new(-o, 0.0, long + o),
            eaves: Vector3::x(),
            up: -Vector3::z(),
            length: short + 2.0 * o,
        },
    ];

    let mut parts = Vec::new();
    let mut summary = RoofSummary {
        style: Some(RoofStyle::Hipped),
        rise: rise.rise,
        angle,
        eaves: rise.eaves,
        crest: rise.crest,
        crest_clamped: rise.crest_clamped,
        ridge_length,
        hip_angle: Some(phi),
        hip_rafter_length: Some(hip_rafter_length(hs, rise.rise)),
        fascia_bottom: rise.eaves - trim.fascia_depth,
        ..Default::default()
    };

    let stack = LayerStack::for_covering(input.covering, cfg);
    let stack_top = stack.total();
    let tail = hf.reach / hf.cos;
    let min_course = cfg.min_batten_length;

    for slope in &slopes {
        let normal = hf.normal(slope);

        // Common and jack rafters, cut short where they meet the hips
        for u in fixed_stations(
            o + cfg.rafter_thickness / 2.0,
            slope.length - o - cfg.rafter_thickness / 2.0,
            cfg.truss_spacing,
        ) {
            let x_max = u.min(slope.length - u).min(hf.reach) - cfg.rafter_thickness / 2.0;
            if x_max < cfg.rafter_thickness {
                continue;
            }
            let h = cfg.rafter_thickness / 2.0;
            let outline = [
                hf.point(slope, u - h, 0.0, 0.0),
                hf.point(slope, u + h, 0.0, 0.0),
                hf.point(slope, u + h, x_max, 0.0),
                hf.point(slope, u - h, x_max, 0.0),
            ];
            parts.push(
                Part::new(
                    format!("rafter-{}-{}", slope.name, summary.rafter_count),
                    slab(&outline, normal, cfg.rafter_depth),
                    "timber-frame",
                    Layer::Rafter,
                )
                .on_slope(slope.name),
            );
            summary.rafter_count += 1;
        }

        // Purlins between the wall line and the ridge, shortened at the hips
        for s in fixed_stations(
            o / hf.cos + cfg.purlin_thickness / 2.0,
            tail - cfg.purlin_thickness / 2.0,
            cfg.purlin_spacing,
        ) {
            let x0 = (s - cfg.purlin_thickness / 2.0) * hf.cos;
            let x1 = (s + cfg.purlin_thickness / 2.0) * hf.cos;
            if course_length(slope.length, (x0 + x1) / 2.0) < min_course {
                continue;
            }
            let outline = hf.band(slope, x0, x1, 0.0);
            parts.push(
                Part::new(
                    format!("purlin-{}-{}", slope.name, summary.purlin_count),
                    slab(&outline, normal, cfg.purlin_depth),
                    "timber-frame",
                    Layer::Purlin,
                )
                .on_slope(slope.name),
            );
            summary.purlin_count += 1;
        }

        for layer in stack.layers() {
            let (Some(top), Some(thickness)) = (stack.top(layer), stack.thickness(layer)) else {
                continue;
            };
            let lift = top / hf.cos;
            match layer {
                RoofLayer::Batten | RoofLayer::Tile => {
                    let width = if layer == RoofLayer::Batten {
                        cfg.batten_width
                    } else {
                        cfg.batten_gauge
                    };
                    let mut courses = Mesh::new();
                    for s_ridge in batten_stations(tail, cfg.batten_width, cfg.batten_gauge) {
                        let s = tail - s_ridge;
                        let x0 = ((s - width / 2.0) * hf.cos).max(0.0);
                        let x1 = ((s + width / 2.0) * hf.cos).min(hf.reach);
                        if course_length(slope.length, (x0 + x1) / 2.0) < min_course {
                            continue;
                        }
                        let band = hf.band(slope, x0, x1, lift);
                        if band.len() < 3 {
                            continue;
                        }
                        if layer == RoofLayer::Batten {
                            summary.batten_count += 1;
                        }
                        courses.merge(&slab(&band, normal, thickness));
                    }
                    let (material, tag) = layer_material(layer);
                    parts.push(
                        Part::new(format!("{}-{}", tag.as_str(), slope.name), courses, material, tag)
                            .on_slope(slope.name),
                    );
                }
                other => {
                    let outline = hf.band(slope, 0.0, hf.reach, lift);
                    let (material, tag) = layer_material(other);
                    parts.push(
                        Part::new(
                            format!("{}-{}", tag.as_str(), slope.name),
                            slab(&outline, normal, thickness),
                            material,
                            tag,
                        )
                        .on_slope(slope.name),
                    );
                }
            }
        }
    }

    // Hip rafters from each wall corner to the nearer ridge end
    let ridge_start = Point3::new(hs, ridge_y, hs);
    let ridge_end = Point3::new(hs, ridge_y, long - hs);
    let corners = [
        (Point3::new(-o, hf.base_y, -o), ridge_start),
        (Point3::new(short + o, hf.base_y, -o), ridge_start),
        (Point3::new(-o, hf.base_y, long + o), ridge_end),
        (Point3::new(short + o, hf.base_y, long + o), ridge_end),
    ];
    for (i, (corner, top)) in corners.iter().enumerate() {
        let bearing = top - corner;
        let length = bearing.norm();
        let Some(dir) = bearing.try_normalize(1e-9) else {
            continue;
        };
        let center = corner + bearing / 2.0 - Vector3::y() * (cfg.rafter_depth / 2.0);
        let rafter = box_mesh(cfg.rafter_thickness, cfg.rafter_depth, length).transformed(
            &Isometry3::from_parts(Translation3::from(center.coords), align_z_to(&dir)),
        );
        parts.push(Part::new(format!("hip-rafter-{}", i), rafter, "timber-frame", Layer::Rafter));
    }

    if ridge_length > 0.0 {
        let mut beam = box_mesh(cfg.rafter_thickness, cfg.rafter_depth, ridge_length);
        beam.transform(&Isometry3::translation(
            hs,
            ridge_y - cfg.rafter_depth / 2.0,
            long / 2.0,
        ));
        parts.push(Part::new("ridge-beam", beam, "timber-frame", Layer::Rafter));
    }

    // Caps sit on the covering: lift every line by the stack height
    let lift = Vector3::y() * (stack_top / hf.cos);
    for (i, (corner, top)) in corners.iter().enumerate() {
        let caps = cap_meshes(corner + lift, top + lift, phi, &input.config.caps);
        summary.hip_cap_count += caps.len();
        let mut merged = Mesh::new();
        merged.merge_all(&caps);
        parts.push(Part::new(format!("hip-caps-{}", i), merged, "ridge-cap", Layer::Cap));
    }
    if ridge_length > 0.0 {
        let caps = cap_meshes(ridge_start + lift, ridge_end + lift, angle, &input.config.caps);
        summary.ridge_cap_count = caps.len();
        for (i, cap) in caps.into_iter().enumerate() {
            parts.push(Part::new(format!("ridge-cap-{}", i), cap, "ridge-cap", Layer::Cap));
        }
    }

    let outer = PlanRect::new(-o, short + o, -o, long + o);
    for (slope, wall) in slopes
        .iter()
        .zip([WallName::Left, WallName::Right, WallName::Front, WallName::Back])
    {
        let (a, b, outward) = edge_line(&outer, wall);
        parts.push(
            Part::new(
                format!("fascia-{}", slope.name),
                fascia_board(
                    a,
                    b,
                    outward,
                    rise.eaves - trim.fascia_depth,
                    rise.eaves,
                    trim.fascia_thickness,
                ),
                "trim",
                Layer::Trim,
            )
            .on_slope(slope.name),
        );
    }

    tracing::debug!(
        short,
        long,
        rise = rise.rise,
        ridge_length,
        hip_angle_deg = phi.to_degrees(),
        "Hipped roof"
    );
    RoofGeometry { parts, summary }.place(&frame)
}
