// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Panel splitting and stud placement.
//!
//! Positions are local to the framed segment. A stud at `x` occupies
//! `[x, x + t]`. A frame zone is an opening widened by one stud on each side,
//! the space its uprights take.

use super::WallSpec;
use shedkit_core::Opening;

/// Merged frame zones of a wall's openings, sorted by start
pub fn frame_zones(spec: &WallSpec, openings: &[&Opening], stud: f64) -> Vec<(f64, f64)> {
    let zones = openings
        .iter()
        .map(|o| {
            let (a, b) = o.frame_zone(stud);
            (a - spec.corner_offset, b - spec.corner_offset)
        })
        .collect();
    merge_zones(zones)
}

/// Merge overlapping or touching intervals
pub fn merge_zones(zones: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    merge_within(zones, 0.0)
}

/// Merge intervals separated by less than `gap`
pub fn merge_within(mut zones: Vec<(f64, f64)>, gap: f64) -> Vec<(f64, f64)> {
    zones.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(zones.len());
    for (a, b) in zones {
        match merged.last_mut() {
            Some(last) if a <= last.1 || a - last.1 < gap => last.1 = last.1.max(b),
            _ => merged.push((a, b)),
        }
    }
    merged
}

/// Move a seam out of any cluster it falls inside, one stud clear of it.
///
/// `clusters` must be at least two studs apart (see [`merge_within`]), so
/// the moved seam cannot land in the neighbouring cluster.
pub fn clear_seam(seam: f64, clusters: &[(f64, f64)], stud: f64) -> f64 {
    for &(a, b) in clusters {
        if seam > a && seam < b {
            let before = a - stud;
            let after = b + stud;
            return if seam - before <= after - seam { before } else { after };
        }
    }
    seam
}

/// Split a wall into panels no wider than `max_width` (basic variant).
///
/// Seams start evenly spaced and are pushed clear of opening clusters.
pub fn layout_panels(length: f64, zones: &[(f64, f64)], stud: f64, max_width: f64) -> Vec<(f64, f64)> {
    if length <= max_width || max_width <= 0.0 {
        return vec![(0.0, length)];
    }
    let count = (length / max_width).ceil() as usize;
    let clusters = merge_within(zones.to_vec(), 2.0 * stud);
    let mut seams: Vec<f64> = (1..count)
        .map(|k| clear_seam(length * k as f64 / count as f64, &clusters, stud))
        .filter(|s| *s > stud && *s < length - stud)
        .collect();
    seams.dedup_by(|a, b| (*a - *b).abs() < stud);

    let mut panels = Vec::with_capacity(seams.len() + 1);
    let mut start = 0.0;
    for seam in seams {
        if seam <= start {
            continue;
        }
        panels.push((start, seam));
        start = seam;
    }
    panels.push((start, length));
    if panels.len() > 1 {
        tracing::debug!(length, panels = panels.len(), "Wall split into panels");
    }
    panels
}

/// A stud at `x` does not enter any frame zone
#[inline]
pub fn stud_clear(x: f64, stud: f64, zones: &[(f64, f64)]) -> bool {
    !zones.iter().any(|&(a, b)| x < b && x + stud > a)
}

/// Two end studs and one centre stud per panel, minus those hitting openings
pub fn basic_studs(panels: &[(f64, f64)], zones: &[(f64, f64)], stud: f64) -> Vec<f64> {
    let mut studs = Vec::with_capacity(panels.len() * 3);
    for &(p0, p1) in panels {
        let mid = (p0 + p1) / 2.0 - stud / 2.0;
        for x in [p0, mid, p1 - stud] {
            if stud_clear(x, stud, zones) {
                studs.push(x);
            }
        }
    }
    studs.sort_by(f64::total_cmp);
    studs
}

/// Regular stud grid at no more than `spacing`, ends included
pub fn stud_grid(length: f64, stud: f64, spacing: f64) -> Vec<f64> {
    let usable = (length - stud).max(0.0);
    let bays = ((usable / spacing).ceil() as usize).max(1);
    (0..=bays).map(|i| usable * i as f64 / bays as f64).collect()
}

/// Insulated-variant studs: the regular grid minus studs hitting openings
pub fn insulated_studs(length: f64, zones: &[(f64, f64)], stud: f64, spacing: f64) -> Vec<f64> {
    stud_grid(length, stud, spacing)
        .into_iter()
        .filter(|&x| stud_clear(x, stud, zones))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_door_on_short_wall() {
        // 2400 wall, door at 500 wide 800: one panel, centre stud dropped
        let zones = merge_zones(vec![(450.0, 1350.0)]);
        let panels = layout_panels(2400.0, &zones, 50.0, 2400.0);
        assert_eq!(panels, vec![(0.0, 2400.0)]);
        let studs = basic_studs(&panels, &zones, 50.0);
        assert_eq!(studs, vec![0.0, 2350.0]);
    }

    #[test]
    fn test_seam_pushed_out_of_cluster() {
        // 3000 wall splits at 1500; two touching openings straddle it
        let zones = merge_zones(vec![(1350.0, 1600.0), (1550.0, 1800.0)]);
        assert_eq!(zones, vec![(1350.0, 1800.0)]);
        let panels = layout_panels(3000.0, &zones, 50.0, 2400.0);
        assert_eq!(panels, vec![(0.0, 1300.0), (1300.0, 3000.0)]);
    }

    #[test]
    fn test_seam_clear_of_openings_sweep() {
        let stud = 50.0;
        for length in [2450.0, 3000.0, 3600.0, 4200.0, 4800.0] {
            let mut x = 0.0;
            while x + 600.0 < length {
                let opening = (x, x + 600.0);
                let zones = merge_zones(vec![(opening.0 - stud, opening.1 + stud)]);
                let panels = layout_panels(length, &zones, stud, 2400.0);
                for w in panels.windows(2) {
                    let seam = w[0].1;
                    assert!(
                        seam <= opening.0 - stud || seam >= opening.1 + stud,
                        "seam {} vs opening {:?} on {}",
                        seam,
                        opening,
                        length
                    );
                }
                x += 37.0;
            }
        }
    }

    #[test]
    fn test_seam_skips_neighbouring_zone() {
        // zones 20 apart: clearing the first alone would put the seam in the second
        let zones = merge_zones(vec![(1000.0, 1400.0), (1420.0, 1800.0)]);
        assert_eq!(zones.len(), 2);
        let panels = layout_panels(3000.0, &zones, 50.0, 2400.0);
        assert_eq!(panels, vec![(0.0, 1850.0), (1850.0, 3000.0)]);
    }

    #[test]
    fn test_seam_clear_of_opening_pairs_sweep() {
        let stud = 50.0;
        for length in [2450.0, 3000.0, 3600.0, 4200.0, 4800.0] {
            for gap in [0.0, 20.0, 60.0, 99.0, 150.0] {
                let mut x = 0.0;
                while x + 1000.0 + gap < length {
                    let zones = merge_zones(vec![(x, x + 500.0), (x + 500.0 + gap, x + 1000.0 + gap)]);
                    let panels = layout_panels(length, &zones, stud, 2400.0);
                    for w in panels.windows(2) {
                        let seam = w[0].1;
                        assert!(
                            zones.iter().all(|&(a, b)| seam <= a || seam >= b),
                            "seam {} in {:?} on {}",
                            seam,
                            zones,
                            length
                        );
                    }
                    x += 41.0;
                }
            }
        }
    }

    #[test]
    fn test_insulated_grid_spacing() {
        let grid = stud_grid(2400.0, 50.0, 400.0);
        assert_eq!(grid.len(), 7);
        for w in grid.windows(2) {
            assert!(w[1] - w[0] <= 400.0 + 1e-9);
        }
        let studs = insulated_studs(2400.0, &[(450.0, 1350.0)], 50.0, 400.0);
        assert!(studs.iter().all(|&x| stud_clear(x, 50.0, &[(450.0, 1350.0)])));
        assert!(studs.len() < grid.len());
    }
}
