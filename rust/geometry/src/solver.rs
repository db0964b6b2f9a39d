// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Apex-rise solver.
//!
//! Inverts `rise + t·hs / sqrt(hs² + rise²) = crest − eaves` by bisection,
//! where `t` is the sheathing thickness measured perpendicular to the slope
//! and `hs` the half-span. The left side increases with `rise` for any
//! realistic half-span, so a fixed number of halvings over
//! `[0, target + margin]` converges well below a millimetre.
//!
//! When no crest height is given the rise falls back to a span-proportional
//! heuristic and the crest is synthesized from it, so that supplying the
//! synthesized crest later solves back to exactly the same rise.

use shedkit_core::RoofConfig;

/// Solved apex geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApexRise {
    pub rise: f64,
    pub half_span: f64,
    /// Slope angle in radians
    pub angle: f64,
    pub eaves: f64,
    /// Crest after clamping to at least `eaves + sheathing`
    pub crest: f64,
    pub requested_crest: Option<f64>,
    pub crest_clamped: bool,
    /// `f(rise) − target`; best-effort result, never an error
    pub residual: f64,
    pub from_heuristic: bool,
}

impl ApexRise {
    /// Height of the ridge on the rafter-top surface
    #[inline]
    pub fn ridge_height(&self) -> f64 {
        self.eaves + self.rise
    }
}

/// Left side of the constraint
#[inline]
pub fn crest_offset(rise: f64, half_span: f64, sheathing: f64) -> f64 {
    if half_span <= 0.0 {
        return rise;
    }
    rise + sheathing * half_span / (half_span * half_span + rise * rise).sqrt()
}

/// Span-proportional rise used when no crest is given
#[inline]
pub fn fallback_rise(span: f64, config: &RoofConfig) -> f64 {
    (config.fallback_rise_ratio * span).clamp(config.fallback_rise_min, config.fallback_rise_max)
}

/// Solve for the rise reaching `crest` from `eaves`
pub fn solve_rise(eaves: f64, crest: f64, half_span: f64, config: &RoofConfig) -> ApexRise {
    let t = config.sheathing;
    let clamped_crest = crest.max(eaves + t);
    let crest_clamped = clamped_crest > crest;
    if crest_clamped {
        tracing::info!(
            eaves,
            requested = crest,
            clamped = clamped_crest,
            "Crest raised to clear sheathing"
        );
    }
    let target = t.max(clamped_crest - eaves);

    let rise = if half_span <= 0.0 {
        target
    } else {
        let mut lo = 0.0;
        let mut hi = target + config.solver_search_margin;
        for _ in 0..config.solver_iterations {
            let mid = 0.5 * (lo + hi);
            if crest_offset(mid, half_span, t) < target {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    };

    let residual = crest_offset(rise, half_span, t) - target;
    if residual.abs() > 1.0 {
        tracing::warn!(eaves, crest = clamped_crest, half_span, rise, residual, "Apex rise did not converge");
    }

    ApexRise {
        rise,
        half_span,
        angle: rise.atan2(half_span.max(0.0)),
        eaves,
        crest: clamped_crest,
        requested_crest: Some(crest),
        crest_clamped,
        residual,
        from_heuristic: false,
    }
}

/// Rise from the heuristic, with the crest that would solve back to it
pub fn heuristic_rise(eaves: f64, span: f64, config: &RoofConfig) -> ApexRise {
    let half_span = span / 2.0;
    let rise = fallback_rise(span, config);
    let crest = eaves + crest_offset(rise, half_span, config.sheathing);
    ApexRise {
        rise,
        half_span,
        angle: rise.atan2(half_span),
        eaves,
        crest,
        requested_crest: None,
        crest_clamped: false,
        residual: 0.0,
        from_heuristic: true,
    }
}

/// Resolve rise from optional eaves/crest controls.
///
/// An absent eaves height uses `default_eaves`; an absent crest selects the
/// heuristic.
pub fn resolve_rise(
    eaves: Option<f64>,
    crest: Option<f64>,
    default_eaves: f64,
    span: f64,
    config: &RoofConfig,
) -> ApexRise {
    let eaves = eaves.unwrap_or(default_eaves);
    match crest {
        Some(crest) => solve_rise(eaves, crest, span / 2.0, config),
        None => heuristic_rise(eaves, span, config),
    }
}
