// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rigid frames for build-flat-then-place geometry.
//!
//! Sloped substructures (pent roofs, attachment roofs) are built once in a
//! canonical local frame:
//!
//! - local X runs along the low eaves edge, from `0` to the edge length
//! - local Z runs up the slope, measured along the sloped surface
//! - local Y is the outward surface normal
//!
//! and then placed with a [`RigidFrame`]: a pitch about local X, a yaw about
//! world Y selecting which of the four walls the slope rises toward, and a
//! translation putting the local origin on the eaves corner.

use crate::mesh::Mesh;
use nalgebra::{Isometry3, Point3, Translation3, Unit, UnitQuaternion, Vector3};
use shedkit_core::WallName;
use std::f64::consts::{FRAC_PI_2, PI};

/// Axis-aligned plan rectangle (world X/Z)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanRect {
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl PlanRect {
    pub fn new(min_x: f64, max_x: f64, min_z: f64, max_z: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_z,
            max_z,
        }
    }

    /// Rectangle of the given size with its minimum corner at `(x, z)`
    pub fn from_size(x: f64, z: f64, size_x: f64, size_z: f64) -> Self {
        Self::new(x, x + size_x, z, z + size_z)
    }

    #[inline]
    pub fn size_x(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn size_z(&self) -> f64 {
        self.max_z - self.min_z
    }

    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_z + self.max_z) / 2.0,
        )
    }

    /// Horizontal run of a slope rising toward `high`
    #[inline]
    pub fn run_toward(&self, high: WallName) -> f64 {
        if high.runs_along_x() {
            self.size_z()
        } else {
            self.size_x()
        }
    }

    /// Length of the eaves edge of a slope rising toward `high`
    #[inline]
    pub fn edge_along(&self, high: WallName) -> f64 {
        if high.runs_along_x() {
            self.size_x()
        } else {
            self.size_z()
        }
    }

    /// Grow each side by its own margin
    pub fn expanded(&self, left: f64, right: f64, front: f64, back: f64) -> Self {
        Self::new(
            self.min_x - left,
            self.max_x + right,
            self.min_z - front,
            self.max_z + back,
        )
    }
}

/// Yaw about world Y that turns local +Z toward the given wall
#[inline]
pub fn yaw_towards(wall: WallName) -> f64 {
    match wall {
        WallName::Back => 0.0,
        WallName::Right => FRAC_PI_2,
        WallName::Front => PI,
        WallName::Left => -FRAC_PI_2,
    }
}

/// Rigid placement of a locally built substructure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidFrame {
    pub origin: Point3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl RigidFrame {
    pub fn identity() -> Self {
        Self {
            origin: Point3::origin(),
            rotation: UnitQuaternion::identity(),
        }
    }

    pub fn translation(origin: Point3<f64>) -> Self {
        Self {
            origin,
            rotation: UnitQuaternion::identity(),
        }
    }

    /// `yaw ∘ pitch`: pitch about local X first, then yaw about world Y.
    /// Positive pitch lifts local +Z.
    pub fn from_yaw_pitch(origin: Point3<f64>, yaw: f64, pitch: f64) -> Self {
        let yaw_q = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw);
        let pitch_q = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -pitch);
        Self {
            origin,
            rotation: yaw_q * pitch_q,
        }
    }

    /// Frame placing a canonical slope on `rect`, low edge at height `y_low`
    /// on the wall opposite `high`, rising at `pitch` toward `high`.
    pub fn for_slope(rect: &PlanRect, high: WallName, y_low: f64, pitch: f64) -> Self {
        let yaw = yaw_towards(high);
        // local X in world after yaw; picks which end of the eaves edge is the origin
        let along = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw) * Vector3::x();
        let x = match high {
            WallName::Left => rect.max_x,
            WallName::Right => rect.min_x,
            _ if along.x > 0.0 => rect.min_x,
            _ => rect.max_x,
        };
        let z = match high {
            WallName::Front => rect.max_z,
            WallName::Back => rect.min_z,
            _ if along.z > 0.0 => rect.min_z,
            _ => rect.max_z,
        };
        Self::from_yaw_pitch(Point3::new(x, y_low, z), yaw, pitch)
    }

    #[inline]
    pub fn isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.origin.coords), self.rotation)
    }

    #[inline]
    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.origin + self.rotation * p.coords
    }

    #[inline]
    pub fn transform_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * v
    }

    /// Frame equivalent to applying `inner` first, then `self`
    pub fn compose(&self, inner: &RigidFrame) -> RigidFrame {
        RigidFrame {
            origin: self.transform_point(&inner.origin),
            rotation: self.rotation * inner.rotation,
        }
    }

    pub fn apply(&self, mesh: &Mesh) -> Mesh {
        mesh.transformed(&self.isometry())
    }
}

impl Default for RigidFrame {
    fn default() -> Self {
        Self::identity()
    }
}

/// Rotation taking canonical +Z onto `bearing`.
///
/// Built from the cross/dot axis-angle pair; parallel bearings give the
/// identity and antiparallel ones a half turn about Y.
pub fn align_z_to(bearing: &Vector3<f64>) -> UnitQuaternion<f64> {
    let Some(target) = bearing.try_normalize(1e-12) else {
        return UnitQuaternion::identity();
    };
    let z = Vector3::z();
    let cos = z.dot(&target).clamp(-1.0, 1.0);
    if cos > 1.0 - 1e-9 {
        return UnitQuaternion::identity();
    }
    if cos < -1.0 + 1e-9 {
        return UnitQuaternion::from_axis_angle(&Vector3::y_axis(), PI);
    }
    let axis = Unit::new_normalize(z.cross(&target));
    UnitQuaternion::from_axis_angle(&axis, cos.acos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lands_on(frame: &RigidFrame, local: Point3<f64>, world: Point3<f64>) {
        let p = frame.transform_point(&local);
        assert_relative_eq!(p, world, epsilon = 1e-9);
    }

    #[test]
    fn test_pitch_lifts_local_z() {
        let angle = 0.3f64;
        let frame = RigidFrame::from_yaw_pitch(Point3::origin(), 0.0, angle);
        lands_on(
            &frame,
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, angle.sin(), angle.cos()),
        );
    }

    #[test]
    fn test_slope_frame_covers_rect_for_every_wall() {
        let rect = PlanRect::new(0.0, 2000.0, 0.0, 3000.0);
        for high in WallName::ALL {
            let frame = RigidFrame::for_slope(&rect, high, 100.0, 0.0);
            let run = rect.run_toward(high);
            let edge = rect.edge_along(high);
            // the flat local rectangle must map exactly onto the plan rectangle
            let mut xs = Vec::new();
            let mut zs = Vec::new();
            for (lx, lz) in [(0.0, 0.0), (edge, 0.0), (0.0, run), (edge, run)] {
                let p = frame.transform_point(&Point3::new(lx, 0.0, lz));
                assert_relative_eq!(p.y, 100.0, epsilon = 1e-9);
                xs.push(p.x);
                zs.push(p.z);
            }
            let min_x = xs.iter().cloned().fold(f64::MAX, f64::min);
            let max_x = xs.iter().cloned().fold(f64::MIN, f64::max);
            let min_z = zs.iter().cloned().fold(f64::MAX, f64::min);
            let max_z = zs.iter().cloned().fold(f64::MIN, f64::max);
            assert_relative_eq!(min_x, 0.0, epsilon = 1e-9);
            assert_relative_eq!(max_x, 2000.0, epsilon = 1e-9);
            assert_relative_eq!(min_z, 0.0, epsilon = 1e-9);
            assert_relative_eq!(max_z, 3000.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_slope_frame_rises_toward_high_side() {
        let rect = PlanRect::new(0.0, 2000.0, 0.0, 3000.0);
        let angle = 0.2f64;
        let frame = RigidFrame::for_slope(&rect, WallName::Front, 0.0, angle);
        let top = frame.transform_point(&Point3::new(0.0, 0.0, 3000.0 / angle.cos()));
        assert_relative_eq!(top.z, 0.0, epsilon = 1e-6);
        assert_relative_eq!(top.y, 3000.0 * angle.tan(), epsilon = 1e-6);
    }

    #[test]
    fn test_align_z_to() {
        let bearing = Vector3::new(900.0, 333.0, 900.0);
        let q = align_z_to(&bearing);
        assert_relative_eq!(q * Vector3::z(), bearing.normalize(), epsilon = 1e-12);
        assert_eq!(align_z_to(&Vector3::z()), UnitQuaternion::identity());
        assert_relative_eq!(
            align_z_to(&-Vector3::z()) * Vector3::z(),
            -Vector3::z(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_compose() {
        let outer = RigidFrame::from_yaw_pitch(Point3::new(10.0, 0.0, 0.0), FRAC_PI_2, 0.0);
        let inner = RigidFrame::translation(Point3::new(0.0, 0.0, 5.0));
        let composed = outer.compose(&inner);
        let direct = outer.transform_point(&inner.transform_point(&Point3::origin()));
        assert_relative_eq!(composed.origin, direct, epsilon = 1e-12);
    }
}
