// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Studs and door/window framing

use super::WallSpec;
use crate::mesh::Mesh;
use crate::primitives::aabb_mesh;
use crate::scene::{Layer, Part};
use nalgebra::Point3;
use shedkit_core::{EngineConfig, Opening, OpeningKind};

/// Member positions around one opening, wall-local
#[derive(Debug, Clone, PartialEq)]
pub struct OpeningLayout {
    pub kind: OpeningKind,
    /// Start of each upright, left then right
    pub uprights: [f64; 2],
    /// Upright bottom and top heights
    pub upright_span: (f64, f64),
    /// Underside of the header
    pub header_y: f64,
    /// Top of the sill board, windows only
    pub sill_y: Option<f64>,
    /// Cripple studs as `(x, bottom, top)`
    pub cripples: Vec<(f64, f64, f64)>,
}

/// Lowest frame-top height over `[x0, x1]`
fn min_top(spec: &WallSpec, x0: f64, x1: f64) -> f64 {
    let mut h = spec.top_at(x0).min(spec.top_at(x1));
    if let Some(peak) = spec.profile.frame_top.peak_at() {
        let p = peak - spec.corner_offset;
        if p > x0 && p < x1 {
            h = h.min(spec.top_at(p));
        }
    }
    h
}

/// Evenly spread `count` studs of width `stud` across `[x0, x1]`
fn spread(x0: f64, x1: f64, stud: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![(x0 + x1) / 2.0 - stud / 2.0],
        n => {
            let step = (x1 - x0 - stud) / (n - 1) as f64;
            (0..n).map(|i| x0 + step * i as f64).collect()
        }
    }
}

/// Member layout for a door or window
pub fn opening_layout(spec: &WallSpec, opening: &Opening, stud: f64, config: &EngineConfig) -> OpeningLayout {
    let walls = &config.walls;
    let plate = walls.plate_height;
    let x = spec.local_x(opening);
    let w = opening.width_mm as f64;
    let h = opening.height_mm as f64;
    let wall_height = spec.top_at(x + w / 2.0);
    let uprights = [x - stud, x + w];

    match opening.kind {
        OpeningKind::Door => {
            let header_y = h.min(wall_height - walls.top_plate_clearance);
            if header_y < h {
                tracing::info!(
                    opening = %opening.id,
                    requested = h,
                    clamped = header_y,
                    "Door header lowered under top plate"
                );
            }
            let header_top = header_y + plate;
            let mut cripples = Vec::new();
            let plate_bottom = min_top(spec, x, x + w) - plate;
            if plate_bottom - header_top > stud {
                let count =
                    ((w / walls.door_cripple_spacing).ceil() as usize + 1).clamp(2, walls.door_cripple_max.max(2));
                for cx in spread(x, x + w, stud, count) {
                    let top = min_top(spec, cx, cx + stud) - plate;
                    cripples.push((cx, header_top, top));
                }
            }
            OpeningLayout {
                kind: OpeningKind::Door,
                uprights,
                upright_span: (plate, header_y),
                header_y,
                sill_y: None,
                cripples,
            }
        }
        OpeningKind::Window => {
            let y = opening.bottom_mm() as f64;
            let top = (y + h).min(wall_height - walls.top_plate_clearance);
            let sill_y = y.min(top).max(2.0 * plate);
            let count = ((w / walls.window_cripple_spacing).floor() as usize)
                .max(1)
                .min(walls.window_cripple_max);
            let mut cripples = Vec::new();
            let cripple_top = sill_y - plate;
            if cripple_top - plate > stud {
                for i in 0..count {
                    let cx = x + w * (i + 1) as f64 / (count + 1) as f64 - stud / 2.0;
                    cripples.push((cx, plate, cripple_top));
                }
            }
            OpeningLayout {
                kind: OpeningKind::Window,
                uprights,
                upright_span: (plate, min_top(spec, x - stud, x + w + stud) - plate),
                header_y: top,
                sill_y: Some(sill_y),
                cripples,
            }
        }
    }
}

fn member(spec: &WallSpec, x0: f64, x1: f64, y0: f64, y1: f64) -> Mesh {
    aabb_mesh(Point3::new(x0, y0, 0.0), Point3::new(x1, y1, spec.depth))
}

/// Framing members around one opening as a single part
pub fn opening_framing(spec: &WallSpec, opening: &Opening, stud: f64, config: &EngineConfig) -> Option<Part> {
    let layout = opening_layout(spec, opening, stud, config);
    let plate = config.walls.plate_height;
    let x = spec.local_x(opening);
    let w = opening.width_mm as f64;

    let mut mesh = Mesh::new();
    let (y0, y1) = layout.upright_span;
    for ux in layout.uprights {
        if y1 > y0 {
            mesh.merge(&member(spec, ux, ux + stud, y0, y1));
        }
    }
    mesh.merge(&member(spec, x - stud, x + w + stud, layout.header_y, layout.header_y + plate));
    if let Some(sill) = layout.sill_y {
        mesh.merge(&member(spec, x - stud, x + w + stud, sill - plate, sill));
    }
    for &(cx, bottom, top) in &layout.cripples {
        mesh.merge(&member(spec, cx, cx + stud, bottom, top));
    }
    if mesh.is_empty() {
        return None;
    }
    let kind = match opening.kind {
        OpeningKind::Door => "door",
        OpeningKind::Window => "window",
    };
    Some(Part::new(
        format!("{}-framing-{}", kind, opening.id),
        mesh,
        "timber-frame",
        Layer::Frame,
    ))
}

/// All studs of a wall merged into one part
pub fn studs(spec: &WallSpec, positions: &[f64], stud: f64, config: &EngineConfig) -> Option<Part> {
    let plate = config.walls.plate_height;
    let mut mesh = Mesh::new();
    for &x in positions {
        let top = min_top(spec, x, x + stud) - plate;
        if top > plate {
            mesh.merge(&member(spec, x, x + stud, plate, top));
        }
    }
    if mesh.is_empty() {
        return None;
    }
    Some(Part::new(format!("studs-{}", spec.name), mesh, "timber-frame", Layer::Frame))
}
