// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Insulation and interior lining for the insulated variant

use super::panels::{frame_zones, stud_grid};
use super::plates::top_runs;
use super::WallSpec;
use crate::csg::BooleanOps;
use crate::mesh::Mesh;
use crate::primitives::{aabb_mesh, hexahedron};
use crate::scene::{Layer, Part};
use nalgebra::Point3;
use shedkit_core::{EngineConfig, Opening};

/// Prism from `y0` up to the wall top minus `drop`, over `[x0, x1]` and
/// `[z0, z1]`
fn under_top(spec: &WallSpec, x0: f64, x1: f64, y0: f64, drop: f64, z0: f64, z1: f64) -> Mesh {
    let (h0, h1) = (spec.top_at(x0) - drop, spec.top_at(x1) - drop);
    hexahedron(
        [
            Point3::new(x0, y0, z0),
            Point3::new(x1, y0, z0),
            Point3::new(x1, y0, z1),
            Point3::new(x0, y0, z1),
        ],
        [
            Point3::new(x0, h0, z0),
            Point3::new(x1, h1, z0),
            Point3::new(x1, h1, z1),
            Point3::new(x0, h0, z1),
        ],
    )
}

fn overlaps(a: (f64, f64), zones: &[(f64, f64)]) -> bool {
    zones.iter().any(|&(z0, z1)| a.0 < z1 && a.1 > z0)
}

/// Insulation batts filling each stud bay not touched by an opening
pub fn insulation(spec: &WallSpec, openings: &[&Opening], stud: f64, config: &EngineConfig) -> Option<Part> {
    let walls = &config.walls;
    let zones = frame_zones(spec, openings, stud);
    let grid = stud_grid(spec.length, stud, walls.insulated_stud_spacing);
    let thickness = walls.insulation_thickness.min(spec.depth);
    let z0 = (spec.depth - thickness) / 2.0;

    let mut mesh = Mesh::new();
    let mut skipped = 0usize;
    for pair in grid.windows(2) {
        let bay = (pair[0] + stud, pair[1]);
        if bay.1 - bay.0 <= 0.0 {
            continue;
        }
        if overlaps(bay, &zones) {
            skipped += 1;
            continue;
        }
        mesh.merge(&under_top(
            spec,
            bay.0,
            bay.1,
            walls.plate_height,
            walls.plate_height,
            z0,
            z0 + thickness,
        ));
    }
    if skipped > 0 {
        tracing::debug!(wall = %spec.name, skipped, "Insulation bays skipped at openings");
    }
    if mesh.is_empty() {
        return None;
    }
    Some(Part::new(format!("insulation-{}", spec.name), mesh, "insulation", Layer::Insulation))
}

/// Z range of the lining sheet on the inner face
fn lining_z(spec: &WallSpec, thickness: f64) -> (f64, f64) {
    let inner = spec.inner_z();
    if inner > 0.0 {
        (inner, inner + thickness)
    } else {
        (-thickness, 0.0)
    }
}

/// Interior plywood lining.
///
/// Flat walls get one sheet with the openings cut out; a failed cut keeps
/// the uncut sheet. Sloped and gable walls get one piece per stud bay,
/// following the wall top, with bays across an opening left out.
pub fn lining(
    spec: &WallSpec,
    openings: &[&Opening],
    stud: f64,
    config: &EngineConfig,
    booleans: &dyn BooleanOps,
) -> Option<Part> {
    let walls = &config.walls;
    let (z0, z1) = lining_z(spec, walls.lining_thickness);

    let mesh = if spec.profile.frame_top.is_flat() {
        let sheet = aabb_mesh(
            Point3::new(0.0, 0.0, z0),
            Point3::new(spec.length, spec.top_at(0.0), z1),
        );
        let holes: Vec<Mesh> = openings
            .iter()
            .map(|o| {
                let x = spec.local_x(o);
                let y = o.bottom_mm() as f64;
                aabb_mesh(
                    Point3::new(x, y, z0 - 1.0),
                    Point3::new(x + o.width_mm as f64, y + o.height_mm as f64, z1 + 1.0),
                )
            })
            .collect();
        if holes.is_empty() {
            sheet
        } else {
            match booleans
                .union_all(&holes)
                .and_then(|cutter| booleans.subtract(&sheet, &cutter))
            {
                Ok(cut) => cut,
                Err(e) => {
                    tracing::warn!(wall = %spec.name, error = %e, "Lining cut failed, keeping full sheet");
                    sheet
                }
            }
        }
    } else {
        let exact: Vec<(f64, f64)> = openings
            .iter()
            .map(|o| {
                let x = spec.local_x(o);
                (x, x + o.width_mm as f64)
            })
            .collect();
        let mut breaks: Vec<f64> = stud_grid(spec.length, stud, walls.insulated_stud_spacing);
        breaks.push(spec.length);
        for (a, b) in top_runs(spec) {
            breaks.push(a);
            breaks.push(b);
        }
        breaks.sort_by(f64::total_cmp);
        breaks.dedup_by(|a, b| (*a - *b).abs() < 1e-6);

        let mut mesh = Mesh::new();
        for pair in breaks.windows(2) {
            let bay = (pair[0], pair[1]);
            if overlaps(bay, &exact) {
                continue;
            }
            mesh.merge(&under_top(spec, bay.0, bay.1, 0.0, 0.0, z0, z1));
        }
        mesh
    };

    if mesh.is_empty() {
        return None;
    }
    Some(Part::new(format!("lining-{}", spec.name), mesh, "plywood", Layer::Lining))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::transform::RigidFrame;
    use crate::walls::{WallProfile, WallTop};
    use shedkit_core::{WallName, WallRef};

    struct FailingBooleans;

    impl BooleanOps for FailingBooleans {
        fn subtract(&self, _host: &Mesh, _cutter: &Mesh) -> Result<Mesh> {
            Err(Error::BooleanFailed("forced".into()))
        }

        fn union(&self, _a: &Mesh, _b: &Mesh) -> Result<Mesh> {
            Err(Error::BooleanFailed("forced".into()))
        }
    }

    fn spec(top: WallTop) -> WallSpec {
        WallSpec {
            name: WallName::Front,
            frame: RigidFrame::identity(),
            length: 2400.0,
            corner_offset: 0.0,
            full_length: 2400.0,
            depth: 75.0,
            profile: WallProfile {
                frame_top: top,
                cladding_top: top,
            },
        }
    }

    #[test]
    fn test_insulation_skips_opening_bays() {
        let config = EngineConfig::default();
        let wall = spec(WallTop::Flat { height: 2000.0 });
        let full = insulation(&wall, &[], 50.0, &config).unwrap();
        let door = Opening::door("d", WallRef::Front, 500, 800, 1900);
        let cut = insulation(&wall, &[&door], 50.0, &config).unwrap();
        assert!(cut.mesh.triangle_count() < full.mesh.triangle_count());
    }

    #[test]
    fn test_lining_falls_back_to_full_sheet() {
        let config = EngineConfig::default();
        let wall = spec(WallTop::Flat { height: 2000.0 });
        let door = Opening::door("d", WallRef::Front, 500, 800, 1900);
        let part = lining(&wall, &[&door], 50.0, &config, &FailingBooleans).unwrap();
        // a single box: six quads
        assert_eq!(part.mesh.triangle_count(), 12);
        let (min, max) = part.mesh.bounds();
        assert!(min.z >= 75.0 - 1e-3 && max.z <= 84.0 + 1e-3);
    }

    #[test]
    fn test_sloped_lining_follows_top() {
        let config = EngineConfig::default();
        let wall = spec(WallTop::Sloped {
            start: 2000.0,
            end: 2300.0,
            length: 2400.0,
        });
        let part = lining(&wall, &[], 50.0, &config, &FailingBooleans).unwrap();
        let (_, max) = part.mesh.bounds();
        assert!((max.y - 2300.0).abs() < 1e-2);
    }
}
