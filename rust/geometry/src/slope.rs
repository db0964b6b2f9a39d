// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Slope geometry shared by every roof style.
//!
//! A slope is described in the X/Y section plane: it runs down from a ridge
//! point toward the eaves, to the left (-X) or to the right (+X). The
//! idealized surface is the top of the rafters; every covering layer sits on
//! it at a perpendicular offset taken from a [`LayerStack`].

use crate::mesh::Mesh;
use crate::primitives::box_mesh;
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use shedkit_core::{CoveringStyle, RoofConfig};

/// Slope angle from half-span and rise (radians)
#[inline]
pub fn slope_angle(half_span: f64, rise: f64) -> f64 {
    rise.atan2(half_span)
}

/// Length of the slope from ridge to eaves line
#[inline]
pub fn slope_length(half_span: f64, rise: f64) -> f64 {
    half_span.hypot(rise)
}

/// Which way a slope descends from its ridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlopeSide {
    /// Descends toward -X
    Left,
    /// Descends toward +X
    Right,
}

impl SlopeSide {
    #[inline]
    fn sign(&self) -> f64 {
        match self {
            SlopeSide::Left => -1.0,
            SlopeSide::Right => 1.0,
        }
    }
}

/// One planar rafter slope.
///
/// `origin` is the ridge point on the rafter-top surface; `length` is the
/// extent along the ridge (Z) starting at `origin.z`; `width` is the slope
/// length from ridge to eaves line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeDescriptor {
    pub half_span: f64,
    pub rise: f64,
    pub angle: f64,
    pub side: SlopeSide,
    pub origin: Point3<f64>,
    pub length: f64,
    pub width: f64,
}

impl SlopeDescriptor {
    pub fn new(half_span: f64, rise: f64, side: SlopeSide, origin: Point3<f64>, length: f64) -> Self {
        Self {
            half_span,
            rise,
            angle: slope_angle(half_span, rise),
            side,
            origin,
            length,
            width: slope_length(half_span, rise),
        }
    }

    /// Outward unit normal of the surface
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        Vector3::new(self.side.sign() * self.angle.sin(), self.angle.cos(), 0.0)
    }

    /// Unit vector pointing down the slope, away from the ridge
    #[inline]
    pub fn downslope(&self) -> Vector3<f64> {
        Vector3::new(self.side.sign() * self.angle.cos(), -self.angle.sin(), 0.0)
    }

    /// Point on the rafter-top surface `s` along the slope from the ridge
    #[inline]
    pub fn surface_point(&self, s: f64) -> Point3<f64> {
        let run = s * self.angle.cos();
        let drop = s * self.angle.sin();
        Point3::new(
            self.origin.x + self.side.sign() * run,
            self.origin.y - drop,
            self.origin.z,
        )
    }

    /// Surface point pushed `offset` along the outward normal
    #[inline]
    pub fn offset_point(&self, s: f64, offset: f64) -> Point3<f64> {
        self.surface_point(s) + self.normal() * offset
    }

    /// Slope distance from the ridge to a horizontal distance `run` from it
    #[inline]
    pub fn s_at_run(&self, run: f64) -> f64 {
        run / self.angle.cos()
    }

    /// Rotation taking local X to the slope direction and local Y to the
    /// outward normal; local Z stays along the ridge.
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        let roll = match self.side {
            SlopeSide::Left => self.angle,
            SlopeSide::Right => -self.angle,
        };
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), roll)
    }

    /// Board lying on the slope.
    ///
    /// Spans slope distance `[s0, s1]` and ridge-axis range `[z0, z1]`
    /// (relative to `origin.z`), centred `offset` above the surface.
    pub fn board(&self, s0: f64, s1: f64, z0: f64, z1: f64, offset: f64, thickness: f64) -> Mesh {
        let mid = self.offset_point((s0 + s1) / 2.0, offset);
        let center = Point3::new(mid.x, mid.y, self.origin.z + (z0 + z1) / 2.0);
        let local = box_mesh((s1 - s0).abs(), thickness, (z1 - z0).abs());
        local.transformed(&Isometry3::from_parts(
            Translation3::from(center.coords),
            self.rotation(),
        ))
    }
}

/// Roof covering layers, bottom to top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoofLayer {
    Membrane,
    Batten,
    Osb,
    Covering,
    Tile,
}

/// Perpendicular offsets of stacked covering layers.
///
/// Each layer's mid-plane sits at the sum of all layers beneath it (each
/// with its clearance), plus its own clearance and half its own thickness.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStack {
    clearance: f64,
    layers: Vec<(RoofLayer, f64)>,
}

impl LayerStack {
    pub fn new(clearance: f64) -> Self {
        Self {
            clearance,
            layers: Vec::new(),
        }
    }

    /// Add a layer on top of the stack
    pub fn with(mut self, layer: RoofLayer, thickness: f64) -> Self {
        self.layers.push((layer, thickness));
        self
    }

    /// All five layers in stacking order
    pub fn full(config: &RoofConfig) -> Self {
        Self::new(config.layer_clearance)
            .with(RoofLayer::Membrane, config.membrane)
            .with(RoofLayer::Batten, config.batten_depth)
            .with(RoofLayer::Osb, config.sheathing)
            .with(RoofLayer::Covering, config.covering)
            .with(RoofLayer::Tile, config.tile)
    }

    /// Layers actually built for a covering style
    pub fn for_covering(style: CoveringStyle, config: &RoofConfig) -> Self {
        let stack = Self::new(config.layer_clearance);
        match style {
            CoveringStyle::Felt => stack
                .with(RoofLayer::Osb, config.sheathing)
                .with(RoofLayer::Covering, config.covering),
            CoveringStyle::Tiles => stack
                .with(RoofLayer::Membrane, config.membrane)
                .with(RoofLayer::Batten, config.batten_depth)
                .with(RoofLayer::Osb, config.sheathing)
                .with(RoofLayer::Tile, config.tile),
        }
    }

    pub fn layers(&self) -> impl Iterator<Item = RoofLayer> + '_ {
        self.layers.iter().map(|(l, _)| *l)
    }

    pub fn thickness(&self, layer: RoofLayer) -> Option<f64> {
        self.layers.iter().find(|(l, _)| *l == layer).map(|(_, t)| *t)
    }

    /// Mid-plane offset of a layer above the rafter-top surface
    pub fn offset(&self, layer: RoofLayer) -> Option<f64> {
        let mut below = 0.0;
        for (l, t) in &self.layers {
            if *l == layer {
                return Some(below + self.clearance + t / 2.0);
            }
            below += t + self.clearance;
        }
        None
    }

    /// Offset of a layer's top face
    pub fn top(&self, layer: RoofLayer) -> Option<f64> {
        Some(self.offset(layer)? + self.thickness(layer)? / 2.0)
    }

    /// Total height of the stack including clearances
    pub fn total(&self) -> f64 {
        self.layers.iter().map(|(_, t)| t + self.clearance).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_surface_point_left_and_right() {
        let ridge = Point3::new(900.0, 2200.0, 0.0);
        let left = SlopeDescriptor::new(900.0, 300.0, SlopeSide::Left, ridge, 2400.0);
        let right = SlopeDescriptor::new(900.0, 300.0, SlopeSide::Right, ridge, 2400.0);

        let eaves_l = left.surface_point(left.width);
        assert_relative_eq!(eaves_l.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(eaves_l.y, 1900.0, epsilon = 1e-9);
        let eaves_r = right.surface_point(right.width);
        assert_relative_eq!(eaves_r.x, 1800.0, epsilon = 1e-9);
        assert_relative_eq!(eaves_r.y, 1900.0, epsilon = 1e-9);
    }

    #[test]
    fn test_normal_is_perpendicular_and_outward() {
        for side in [SlopeSide::Left, SlopeSide::Right] {
            let slope = SlopeDescriptor::new(1200.0, 500.0, side, Point3::origin(), 1.0);
            assert_relative_eq!(slope.normal().dot(&slope.downslope()), 0.0, epsilon = 1e-12);
            assert!(slope.normal().y > 0.0);
            // outward means toward the eaves side
            assert!(slope.normal().x * slope.downslope().x > 0.0);
            assert_relative_eq!(slope.rotation() * Vector3::y(), slope.normal(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_board_sits_on_offset() {
        let slope = SlopeDescriptor::new(900.0, 900.0, SlopeSide::Right, Point3::new(0.0, 0.0, 0.0), 100.0);
        let board = slope.board(0.0, 100.0, 0.0, 100.0, 10.0, 2.0);
        let (min, max) = board.bounds();
        assert_relative_eq!(min.z, 0.0, epsilon = 1e-4);
        assert_relative_eq!(max.z, 100.0, epsilon = 1e-4);
        // 45 degrees: centre at s = 50 pushed 10 along (sin, cos)
        let c = (min.coords + max.coords) / 2.0;
        let expect = slope.offset_point(50.0, 10.0);
        assert_relative_eq!(c.x, expect.x, epsilon = 1e-3);
        assert_relative_eq!(c.y, expect.y, epsilon = 1e-3);
    }

    #[test]
    fn test_layer_offsets_strictly_stack() {
        let config = RoofConfig::default();
        let stack = LayerStack::full(&config);
        let order: Vec<RoofLayer> = stack.layers().collect();
        assert_eq!(
            order,
            vec![
                RoofLayer::Membrane,
                RoofLayer::Batten,
                RoofLayer::Osb,
                RoofLayer::Covering,
                RoofLayer::Tile
            ]
        );
        for pair in order.windows(2) {
            let (lower, upper) = (pair[0], pair[1]);
            let gap = stack.offset(upper).unwrap() - stack.offset(lower).unwrap();
            let needed = stack.thickness(lower).unwrap() / 2.0 + stack.thickness(upper).unwrap() / 2.0;
            assert!(gap > needed, "{:?} over {:?}", upper, lower);
        }
        assert_relative_eq!(stack.offset(RoofLayer::Membrane).unwrap(), 2.0);
    }

    #[test]
    fn test_felt_stack() {
        let config = RoofConfig::default();
        let stack = LayerStack::for_covering(CoveringStyle::Felt, &config);
        assert_relative_eq!(stack.offset(RoofLayer::Osb).unwrap(), 10.0);
        assert_relative_eq!(stack.offset(RoofLayer::Covering).unwrap(), 18.0 + 1.0 + 1.0 + 1.5);
        assert!(stack.offset(RoofLayer::Tile).is_none());
        assert_relative_eq!(stack.total(), 23.0);
    }
}
