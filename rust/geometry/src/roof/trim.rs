// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fascia boards and the gable diamond

use crate::mesh::Mesh;
use crate::primitives::{box_mesh, hexahedron};
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use shedkit_core::TrimConfig;
use std::f64::consts::{FRAC_PI_4, SQRT_2};

/// Vertical board along the horizontal edge `a → b`, thickened toward
/// `outward` and spanning heights `[bottom, top]`
pub fn fascia_board(
    a: Point3<f64>,
    b: Point3<f64>,
    outward: Vector3<f64>,
    bottom: f64,
    top: f64,
    thickness: f64,
) -> Mesh {
    let out = Vector3::new(outward.x, 0.0, outward.z)
        .try_normalize(1e-12)
        .unwrap_or_else(Vector3::x)
        * thickness;
    let at = |p: Point3<f64>, y: f64| Point3::new(p.x, y, p.z);
    hexahedron(
        [at(a, bottom), at(b, bottom), at(b + out, bottom), at(a + out, bottom)],
        [at(a, top), at(b, top), at(b + out, top), at(a + out, top)],
    )
}

/// Height of the lowest point of a diamond hung from `crest`
#[inline]
pub fn diamond_bottom(crest: f64, sheathing: f64, config: &TrimConfig) -> f64 {
    crest - sheathing - config.diamond_size * SQRT_2
}

/// Square ornament turned 45° in the X/Y plane, top corner at `top`
pub fn diamond(x: f64, top: f64, z: f64, config: &TrimConfig) -> Mesh {
    let half_diagonal = config.diamond_size * SQRT_2 / 2.0;
    let square = box_mesh(config.diamond_size, config.diamond_size, config.diamond_thickness);
    square.transformed(&Isometry3::from_parts(
        Translation3::new(x, top - half_diagonal, z),
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_4),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_diamond_bottom_matches_mesh() {
        let config = TrimConfig::default();
        let mesh = diamond(900.0, 2182.0, -100.0, &config);
        let (min, max) = mesh.bounds();
        assert_relative_eq!(max.y, 2182.0, epsilon = 1e-3);
        assert_relative_eq!(min.y, diamond_bottom(2200.0, 18.0, &config), epsilon = 1e-3);
    }

    #[test]
    fn test_fascia_board_band() {
        let board = fascia_board(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1000.0),
            -Vector3::x(),
            1700.0,
            1850.0,
            20.0,
        );
        let (min, max) = board.bounds();
        assert_relative_eq!(min.x, -20.0, epsilon = 1e-4);
        assert_relative_eq!(min.y, 1700.0, epsilon = 1e-3);
        assert_relative_eq!(max.y, 1850.0, epsilon = 1e-3);
        assert!(board.signed_volume() > 0.0);
    }
}
