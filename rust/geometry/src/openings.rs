// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Door and window geometry.
//!
//! The wall builder hands every opening to an [`OpeningBuilder`] together
//! with the wall it sits in. Parts come back in wall-local coordinates, so
//! the same builder serves the main building and every attachment.

use crate::mesh::Mesh;
use crate::primitives::aabb_mesh;
use crate::scene::{Layer, Part};
use crate::walls::framing::opening_layout;
use crate::walls::WallSpec;
use nalgebra::Point3;
use shedkit_core::{EngineConfig, Opening, OpeningKind};

/// Produces the visible geometry of a door or window
pub trait OpeningBuilder {
    fn build(&self, spec: &WallSpec, opening: &Opening) -> Vec<Part>;
}

/// Plain ledged door leaves and single-pane windows
#[derive(Debug, Clone)]
pub struct DefaultOpenings {
    pub config: EngineConfig,
    pub leaf_thickness: f64,
    pub frame_width: f64,
    pub frame_thickness: f64,
    pub glass_thickness: f64,
}

impl DefaultOpenings {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
            leaf_thickness: 40.0,
            frame_width: 45.0,
            frame_thickness: 45.0,
            glass_thickness: 6.0,
        }
    }

    /// Z range of a centred slab of `thickness` in the wall
    fn centred(spec: &WallSpec, thickness: f64) -> (f64, f64) {
        let t = thickness.min(spec.depth);
        let z0 = (spec.depth - t) / 2.0;
        (z0, z0 + t)
    }

    fn door(&self, spec: &WallSpec, opening: &Opening) -> Vec<Part> {
        let layout = opening_layout(spec, opening, 0.0, &self.config);
        let x = spec.local_x(opening);
        let plate = self.config.walls.plate_height;
        let (z0, z1) = Self::centred(spec, self.leaf_thickness);
        if layout.header_y <= plate {
            return Vec::new();
        }
        let leaf = aabb_mesh(
            Point3::new(x, plate, z0),
            Point3::new(x + opening.width_mm as f64, layout.header_y, z1),
        );
        vec![Part::new(format!("door-{}", opening.id), leaf, "door", Layer::Opening)]
    }

    fn window(&self, spec: &WallSpec, opening: &Opening) -> Vec<Part> {
        let layout = opening_layout(spec, opening, 0.0, &self.config);
        let x0 = spec.local_x(opening);
        let x1 = x0 + opening.width_mm as f64;
        let y0 = layout.sill_y.unwrap_or(opening.bottom_mm() as f64);
        let y1 = layout.header_y;
        let f = self.frame_width;
        if x1 - x0 <= 2.0 * f || y1 - y0 <= 2.0 * f {
            tracing::debug!(opening = %opening.id, "Window too small for a frame, skipped");
            return Vec::new();
        }

        let (z0, z1) = Self::centred(spec, self.frame_thickness);
        let mut frame = Mesh::new();
        for (a, b) in [
            ((x0, y0), (x1, y0 + f)),
            ((x0, y1 - f), (x1, y1)),
            ((x0, y0 + f), (x0 + f, y1 - f)),
            ((x1 - f, y0 + f), (x1, y1 - f)),
        ] {
            frame.merge(&aabb_mesh(Point3::new(a.0, a.1, z0), Point3::new(b.0, b.1, z1)));
        }

        let (g0, g1) = Self::centred(spec, self.glass_thickness);
        let glass = aabb_mesh(
            Point3::new(x0 + f, y0 + f, g0),
            Point3::new(x1 - f, y1 - f, g1),
        );
        vec![
            Part::new(format!("window-frame-{}", opening.id), frame, "timber-frame", Layer::Opening),
            Part::new(format!("window-glass-{}", opening.id), glass, "glass", Layer::Opening),
        ]
    }
}

impl OpeningBuilder for DefaultOpenings {
    fn build(&self, spec: &WallSpec, opening: &Opening) -> Vec<Part> {
        match opening.kind {
            OpeningKind::Door => self.door(spec, opening),
            OpeningKind::Window => self.window(spec, opening),
        }
    }
}

/// Builds nothing; framing and cladding holes are still produced
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpenings;

impl OpeningBuilder for NoOpenings {
    fn build(&self, _spec: &WallSpec, _opening: &Opening) -> Vec<Part> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::RigidFrame;
    use crate::walls::{WallProfile, WallTop};
    use approx::assert_relative_eq;
    use shedkit_core::{WallName, WallRef};

    fn spec(height: f64, corner_offset: f64) -> WallSpec {
        WallSpec {
            name: WallName::Left,
            frame: RigidFrame::identity(),
            length: 2400.0 - 2.0 * corner_offset,
            corner_offset,
            full_length: 2400.0,
            depth: 75.0,
            profile: WallProfile::flat(height, height + 50.0),
        }
    }

    #[test]
    fn test_door_leaf_sits_in_opening() {
        let config = EngineConfig::default();
        let builder = DefaultOpenings::new(&config);
        let door = Opening::door("d1", WallRef::Left, 500, 800, 1900);
        let parts = builder.build(&spec(2100.0, 75.0), &door);
        assert_eq!(parts.len(), 1);
        let (min, max) = parts[0].mesh.bounds();
        assert_relative_eq!(min.x, 425.0, epsilon = 1e-3);
        assert_relative_eq!(max.x, 1225.0, epsilon = 1e-3);
        assert_relative_eq!(max.y, 1900.0, epsilon = 1e-3);
        assert!(min.z > 0.0 && max.z < 75.0);
    }

    #[test]
    fn test_door_follows_header_clamp() {
        let config = EngineConfig::default();
        let builder = DefaultOpenings::new(&config);
        let door = Opening::door("d1", WallRef::Left, 500, 800, 1900);
        let parts = builder.build(&spec(1800.0, 0.0), &door);
        let (_, max) = parts[0].mesh.bounds();
        assert_relative_eq!(max.y, 1700.0, epsilon = 1e-3);
    }

    #[test]
    fn test_window_frame_and_glass() {
        let config = EngineConfig::default();
        let builder = DefaultOpenings::new(&config);
        let window = Opening::window("w1", WallRef::Left, 600, 900, 600, 500);
        let parts = builder.build(&spec(2100.0, 0.0), &window);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].material, "glass");
        let (min, max) = parts[0].mesh.bounds();
        assert_relative_eq!(min.y, 900.0, epsilon = 1e-3);
        assert_relative_eq!(max.y, 1400.0, epsilon = 1e-3);
        let (gmin, gmax) = parts[1].mesh.bounds();
        assert_relative_eq!(gmin.x, 645.0, epsilon = 1e-3);
        assert_relative_eq!(gmax.x, 1155.0, epsilon = 1e-3);
    }

    #[test]
    fn test_no_openings_builder() {
        let door = Opening::door("d1", WallRef::Left, 500, 800, 1900);
        assert!(NoOpenings.build(&spec(2100.0, 0.0), &door).is_empty());
    }
}
