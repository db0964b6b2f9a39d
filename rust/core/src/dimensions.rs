// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dimension resolver
//!
//! Derives the base, frame and roof footprints from the parameter tree.
//!
//! Frame size precedence, per axis:
//! 1. `dim.frameW_mm` / `dim.frameD_mm`
//! 2. `dim.baseW_mm` / `dim.baseD_mm` minus the overhang on both sides
//! 3. legacy top-level `w` / `d`
//!
//! The roof footprint is always the frame plus the per-side overhang. The
//! base is the explicit base size when given, otherwise the roof footprint.

use crate::params::{BuildingParameters, OverhangParams};
use serde::{Deserialize, Serialize};

/// Smallest frame edge the resolver will produce
pub const MIN_FRAME_MM: u32 = 600;

/// Plan rectangle in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    pub w: u32,
    pub d: u32,
}

impl Footprint {
    #[inline]
    pub fn new(w: u32, d: u32) -> Self {
        Self { w, d }
    }
}

/// Overhang on each side after falling back to the uniform value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SideOverhang {
    pub l: u32,
    pub r: u32,
    pub f: u32,
    pub b: u32,
}

impl SideOverhang {
    #[inline]
    pub fn uniform(mm: u32) -> Self {
        Self {
            l: mm,
            r: mm,
            f: mm,
            b: mm,
        }
    }

    /// Each side independently falls back to the uniform value
    pub fn resolve(params: &OverhangParams) -> Self {
        let u = params.uniform_mm;
        Self {
            l: params.l_mm.unwrap_or(u),
            r: params.r_mm.unwrap_or(u),
            f: params.f_mm.unwrap_or(u),
            b: params.b_mm.unwrap_or(u),
        }
    }

    /// Total overhang across the width (left + right)
    #[inline]
    pub fn across_w(&self) -> u32 {
        self.l + self.r
    }

    /// Total overhang across the depth (front + back)
    #[inline]
    pub fn across_d(&self) -> u32 {
        self.f + self.b
    }
}

/// Resolved footprints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDimensions {
    pub base: Footprint,
    pub frame: Footprint,
    pub roof: Footprint,
    pub overhang: SideOverhang,
}

/// Resolve footprints from a (possibly partially specified) parameter tree
pub fn resolve_dimensions(params: &BuildingParameters) -> ResolvedDimensions {
    let overhang = SideOverhang::resolve(&params.overhang);
    let dim = &params.dim;

    let frame_w = dim
        .frame_w_mm
        .or_else(|| dim.base_w_mm.map(|b| b.saturating_sub(overhang.across_w())))
        .unwrap_or(params.w);
    let frame_d = dim
        .frame_d_mm
        .or_else(|| dim.base_d_mm.map(|b| b.saturating_sub(overhang.across_d())))
        .unwrap_or(params.d);

    let frame = Footprint::new(clamp_frame(frame_w, "w"), clamp_frame(frame_d, "d"));
    let roof = Footprint::new(
        frame.w + overhang.across_w(),
        frame.d + overhang.across_d(),
    );
    let base = Footprint::new(
        dim.base_w_mm.unwrap_or(roof.w),
        dim.base_d_mm.unwrap_or(roof.d),
    );

    ResolvedDimensions {
        base,
        frame,
        roof,
        overhang,
    }
}

fn clamp_frame(value: u32, axis: &str) -> u32 {
    if value < MIN_FRAME_MM {
        tracing::info!(axis, requested = value, clamped = MIN_FRAME_MM, "Frame size clamped");
        MIN_FRAME_MM
    } else {
        value
    }
}
