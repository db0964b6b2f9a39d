// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ridge and hip cap layout.
//!
//! A line is tiled with caps of a fixed exposed length. A trailing remainder
//! longer than the minimum becomes one short cap; anything shorter is left
//! uncovered. Each cap is two wings drooping off the line, built in a local
//! frame where the line runs along +Z, then aligned to the line's bearing.

use crate::mesh::Mesh;
use crate::primitives::box_mesh;
use crate::transform::align_z_to;
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use shedkit_core::CapConfig;

/// One cap along a line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapSegment {
    pub index: usize,
    /// Distance of the cap centre from the line start
    pub center: f64,
    /// Cap length along the line (segment minus the gap)
    pub depth: f64,
}

/// Tile a line of the given length with caps
pub fn layout_caps(length: f64, config: &CapConfig) -> Vec<CapSegment> {
    let exposed = config.exposed_length;
    if length <= 0.0 || exposed <= 0.0 {
        return Vec::new();
    }
    let full = (length / exposed).floor() as usize;
    let remainder = length - full as f64 * exposed;

    let mut segments: Vec<CapSegment> = (0..full)
        .map(|i| CapSegment {
            index: i,
            center: i as f64 * exposed + exposed / 2.0,
            depth: exposed - config.gap,
        })
        .collect();

    if remainder > config.min_remainder {
        segments.push(CapSegment {
            index: full,
            center: full as f64 * exposed + remainder / 2.0,
            depth: remainder - config.gap,
        });
    } else if remainder > 1e-6 {
        tracing::debug!(length, remainder, "Cap remainder dropped");
    }
    segments
}

/// Orientation of one wing: `align ∘ droop`.
///
/// The droop tilts the wing about the line (local Z) in the canonical frame;
/// the alignment then carries that frame onto the line bearing.
pub fn wing_rotation(bearing: &Vector3<f64>, droop: f64, left: bool) -> UnitQuaternion<f64> {
    let align = align_z_to(bearing);
    let droop_q = UnitQuaternion::from_axis_angle(
        &Vector3::z_axis(),
        if left { droop } else { -droop },
    );
    align * droop_q
}

/// Cap meshes along `start → end`, wings drooping at `droop` radians
pub fn cap_meshes(start: Point3<f64>, end: Point3<f64>, droop: f64, config: &CapConfig) -> Vec<Mesh> {
    let bearing = end - start;
    let length = bearing.norm();
    let Some(dir) = bearing.try_normalize(1e-9) else {
        return Vec::new();
    };
    let align = align_z_to(&dir);

    let mut meshes = Vec::new();
    for segment in layout_caps(length, config) {
        let center = start + dir * segment.center;
        let mut cap = Mesh::new();
        for left in [true, false] {
            let rotation = wing_rotation(&dir, droop, left);
            // wing centre in the canonical frame, hanging off the line
            let side = if left { -1.0 } else { 1.0 };
            let half = config.wing_width / 2.0;
            let local_center = Vector3::new(
                side * half * droop.cos(),
                -half * droop.sin() + config.thickness / 2.0,
                0.0,
            );
            let offset = align * local_center;
            let wing = box_mesh(config.wing_width, config.thickness, segment.depth);
            cap.merge(&wing.transformed(&Isometry3::from_parts(
                Translation3::from(center.coords + offset),
                rotation,
            )));
        }
        meshes.push(cap);
    }
    meshes
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_multiple_has_no_remainder_cap() {
        let config = CapConfig::default();
        let caps = layout_caps(382.0 * 4.0, &config);
        assert_eq!(caps.len(), 4);
        assert_relative_eq!(caps[3].center, 3.5 * 382.0);
    }

    #[test]
    fn test_small_remainder_is_dropped() {
        let config = CapConfig::default();
        assert_eq!(layout_caps(382.0 * 2.0 + 15.0, &config).len(), 2);
        let caps = layout_caps(382.0 * 2.0 + 100.0, &config);
        assert_eq!(caps.len(), 3);
        assert_relative_eq!(caps[2].center, 764.0 + 50.0);
        assert_relative_eq!(caps[2].depth, 96.0);
    }

    #[test]
    fn test_wing_rotation_order() {
        // align then droop: the line direction must survive the droop
        let bearing = Vector3::new(1.0, 0.4, 1.0).normalize();
        let q = wing_rotation(&bearing, 0.35, true);
        assert_relative_eq!(q * Vector3::z(), bearing, epsilon = 1e-12);
        // the reverse order would tilt the line itself
        let reversed = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.35) * align_z_to(&bearing);
        assert!((reversed * Vector3::z() - bearing).norm() > 1e-3);
    }

    #[test]
    fn test_ridge_caps_follow_line() {
        let config = CapConfig::default();
        let caps = cap_meshes(
            Point3::new(0.0, 2000.0, 0.0),
            Point3::new(0.0, 2000.0, 1000.0),
            0.3,
            &config,
        );
        assert_eq!(caps.len(), 3);
        let (min, max) = caps[0].bounds();
        assert!(min.z >= -1e-3 && max.z <= 382.0);
        assert!(min.x < -100.0 && max.x > 100.0);
    }
}
