// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Top and bottom plates.
//!
//! A top plate under a sloped or gable top is an explicit eight-vertex
//! prism per straight run: both ends carry their own height, so the top
//! face stays planar while the ends sit at different levels.

use super::WallSpec;
use crate::mesh::Mesh;
use crate::primitives::{aabb_mesh, hexahedron};
use crate::scene::{Layer, Part};
use nalgebra::Point3;
use shedkit_core::{EngineConfig, Opening};

/// Prism under the wall top between local `x0` and `x1`
pub fn plate_prism(spec: &WallSpec, x0: f64, x1: f64, plate: f64) -> Mesh {
    let (y0, y1) = (spec.top_at(x0), spec.top_at(x1));
    let d = spec.depth;
    hexahedron(
        [
            Point3::new(x0, y0 - plate, 0.0),
            Point3::new(x1, y1 - plate, 0.0),
            Point3::new(x1, y1 - plate, d),
            Point3::new(x0, y0 - plate, d),
        ],
        [
            Point3::new(x0, y0, 0.0),
            Point3::new(x1, y1, 0.0),
            Point3::new(x1, y1, d),
            Point3::new(x0, y0, d),
        ],
    )
}

/// Straight runs of the wall top, split at a gable peak
pub fn top_runs(spec: &WallSpec) -> Vec<(f64, f64)> {
    let mut breaks = vec![0.0];
    if let Some(peak) = spec.profile.frame_top.peak_at() {
        let p = peak - spec.corner_offset;
        if p > 0.0 && p < spec.length {
            breaks.push(p);
        }
    }
    breaks.push(spec.length);
    breaks.windows(2).map(|w| (w[0], w[1])).collect()
}

pub fn top_plates(spec: &WallSpec, config: &EngineConfig) -> Option<Part> {
    let plate = config.walls.plate_height;
    let mesh = if spec.profile.frame_top.is_flat() {
        let h = spec.top_at(0.0);
        aabb_mesh(
            Point3::new(0.0, h - plate, 0.0),
            Point3::new(spec.length, h, spec.depth),
        )
    } else {
        let mut mesh = Mesh::new();
        for (x0, x1) in top_runs(spec) {
            mesh.merge(&plate_prism(spec, x0, x1, plate));
        }
        mesh
    };
    if mesh.is_empty() {
        return None;
    }
    Some(Part::new(format!("top-plate-{}", spec.name), mesh, "timber-frame", Layer::Frame))
}

/// Bottom plate runs, interrupted across door openings
pub fn bottom_runs(spec: &WallSpec, openings: &[&Opening]) -> Vec<(f64, f64)> {
    let mut doors: Vec<(f64, f64)> = openings
        .iter()
        .filter(|o| o.is_door())
        .map(|o| {
            let x = spec.local_x(o);
            (x, x + o.width_mm as f64)
        })
        .collect();
    doors.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut runs = Vec::new();
    let mut start = 0.0;
    for (a, b) in doors {
        let a = a.clamp(0.0, spec.length);
        if a > start {
            runs.push((start, a));
        }
        start = start.max(b.clamp(0.0, spec.length));
    }
    if spec.length > start {
        runs.push((start, spec.length));
    }
    runs
}

pub fn bottom_plates(spec: &WallSpec, openings: &[&Opening], config: &EngineConfig) -> Option<Part> {
    let plate = config.walls.plate_height;
    let mut mesh = Mesh::new();
    for (x0, x1) in bottom_runs(spec, openings) {
        mesh.merge(&aabb_mesh(
            Point3::new(x0, 0.0, 0.0),
            Point3::new(x1, plate, spec.depth),
        ));
    }
    if mesh.is_empty() {
        return None;
    }
    Some(Part::new(format!("bottom-plate-{}", spec.name), mesh, "timber-frame", Layer::Frame))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::RigidFrame;
    use crate::walls::{WallProfile, WallTop};
    use approx::assert_relative_eq;
    use shedkit_core::{WallName, WallRef};

    fn spec(top: WallTop, corner_offset: f64, length: f64) -> WallSpec {
        WallSpec {
            name: WallName::Left,
            frame: RigidFrame::identity(),
            length,
            corner_offset,
            full_length: length + 2.0 * corner_offset,
            depth: 75.0,
            profile: WallProfile {
                frame_top: top,
                cladding_top: top,
            },
        }
    }

    #[test]
    fn test_sloped_plate_ends_at_own_heights() {
        let wall = spec(
            WallTop::Sloped {
                start: 2200.0,
                end: 2000.0,
                length: 2400.0,
            },
            0.0,
            2400.0,
        );
        let prism = plate_prism(&wall, 0.0, 2400.0, 50.0);
        let mut at_start = Vec::new();
        let mut at_end = Vec::new();
        for i in 0..prism.vertex_count() {
            let p = prism.position(i);
            if p.x.abs() < 1e-3 {
                at_start.push(p.y);
            } else {
                at_end.push(p.y);
            }
        }
        let max = |v: &[f64]| v.iter().cloned().fold(f64::MIN, f64::max);
        let min = |v: &[f64]| v.iter().cloned().fold(f64::MAX, f64::min);
        assert_relative_eq!(max(&at_start), 2200.0, epsilon = 1e-3);
        assert_relative_eq!(min(&at_start), 2150.0, epsilon = 1e-3);
        assert_relative_eq!(max(&at_end), 2000.0, epsilon = 1e-3);
        assert_relative_eq!(min(&at_end), 1950.0, epsilon = 1e-3);
        assert!(prism.signed_volume() > 0.0);
    }

    #[test]
    fn test_gable_plate_splits_at_peak() {
        let top = WallTop::Gable {
            eaves: 1800.0,
            peak: 2100.0,
            length: 2400.0,
        };
        // side wall framed between corners: peak at 1200 building-relative
        let wall = spec(top, 75.0, 2250.0);
        assert_eq!(top_runs(&wall), vec![(0.0, 1125.0), (1125.0, 2250.0)]);
    }

    #[test]
    fn test_bottom_plate_gap_at_door() {
        let wall = spec(WallTop::Flat { height: 2000.0 }, 0.0, 2400.0);
        let door = Opening::door("d", WallRef::Left, 500, 800, 1900);
        let window = Opening::window("w", WallRef::Left, 1500, 900, 400, 400);
        assert_eq!(
            bottom_runs(&wall, &[&door, &window]),
            vec![(0.0, 500.0), (1300.0, 2400.0)]
        );
    }
}
