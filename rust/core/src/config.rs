// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction constants shared by every builder.
//!
//! Loaded once (defaults or JSON) and passed into each build explicitly.
//! All lengths are millimetres.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub roof: RoofConfig,
    pub caps: CapConfig,
    pub trim: TrimConfig,
    pub walls: WallConfig,
    pub cladding: CladdingConfig,
    pub base: BaseConfig,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Roof members, sheathing layers and the apex-rise solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoofConfig {
    pub truss_spacing: f64,
    pub purlin_spacing: f64,
    pub rafter_thickness: f64,
    pub rafter_depth: f64,
    pub purlin_thickness: f64,
    pub purlin_depth: f64,
    /// Minimum vertical space under the ridge before a king post is fitted
    pub king_post_min_clearance: f64,
    /// OSB sheathing; also the thickness the apex-rise solver accounts for
    pub sheathing: f64,
    pub membrane: f64,
    pub batten_depth: f64,
    pub batten_width: f64,
    pub batten_gauge: f64,
    pub covering: f64,
    pub tile: f64,
    /// Gap added per layer so stacked layers never share a plane
    pub layer_clearance: f64,
    /// Battens or tile courses shorter than this are skipped on hip roofs
    pub min_batten_length: f64,
    pub fallback_rise_ratio: f64,
    pub fallback_rise_min: f64,
    pub fallback_rise_max: f64,
    pub solver_iterations: u32,
    pub solver_search_margin: f64,
}

impl Default for RoofConfig {
    fn default() -> Self {
        Self {
            truss_spacing: 600.0,
            purlin_spacing: 609.0,
            rafter_thickness: 47.0,
            rafter_depth: 100.0,
            purlin_thickness: 47.0,
            purlin_depth: 75.0,
            king_post_min_clearance: 150.0,
            sheathing: 18.0,
            membrane: 2.0,
            batten_depth: 25.0,
            batten_width: 38.0,
            batten_gauge: 320.0,
            covering: 3.0,
            tile: 12.0,
            layer_clearance: 1.0,
            min_batten_length: 40.0,
            fallback_rise_ratio: 0.20,
            fallback_rise_min: 200.0,
            fallback_rise_max: 900.0,
            solver_iterations: 32,
            solver_search_margin: 2000.0,
        }
    }
}

/// Ridge and hip cap layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapConfig {
    pub exposed_length: f64,
    pub gap: f64,
    /// Remainders at or below this are dropped instead of emitting a sliver cap
    pub min_remainder: f64,
    pub wing_width: f64,
    pub thickness: f64,
}

impl Default for CapConfig {
    fn default() -> Self {
        Self {
            exposed_length: 382.0,
            gap: 4.0,
            min_remainder: 20.0,
            wing_width: 150.0,
            thickness: 12.0,
        }
    }
}

/// Fascia, barge boards and the gable diamond
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimConfig {
    pub fascia_depth: f64,
    pub fascia_thickness: f64,
    /// Edge length of the square gable ornament (hung point-down)
    pub diamond_size: f64,
    pub diamond_thickness: f64,
    /// Required gap between an attachment crest and the parent's diamond
    pub diamond_clearance: f64,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            fascia_depth: 150.0,
            fascia_thickness: 20.0,
            diamond_size: 180.0,
            diamond_thickness: 20.0,
            diamond_clearance: 50.0,
        }
    }
}

/// Wall framing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    pub panel_max_width: f64,
    pub insulated_stud_spacing: f64,
    pub plate_height: f64,
    /// Minimum gap kept between a door header and the top plate
    pub top_plate_clearance: f64,
    /// Spacing of cripple studs over a door header
    pub door_cripple_spacing: f64,
    pub door_cripple_max: usize,
    pub window_cripple_spacing: f64,
    pub window_cripple_max: usize,
    pub insulation_thickness: f64,
    pub lining_thickness: f64,
    /// Distance the outer wall face sits beyond the frame footprint
    pub wall_overhang: f64,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            panel_max_width: 2400.0,
            insulated_stud_spacing: 400.0,
            plate_height: 50.0,
            top_plate_clearance: 100.0,
            door_cripple_spacing: 400.0,
            door_cripple_max: 10,
            window_cripple_spacing: 400.0,
            window_cripple_max: 10,
            insulation_thickness: 50.0,
            lining_thickness: 9.0,
            wall_overhang: 25.0,
        }
    }
}

/// Shiplap cladding courses and the roofline clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CladdingConfig {
    pub course_pitch: f64,
    pub drip_height: f64,
    pub drip_thickness: f64,
    pub upper_thickness: f64,
    /// Extra courses above nominal height for walls trimmed by a boolean cut
    pub clip_margin_sloped: f64,
    /// Extra courses above nominal height for flat walls
    pub clip_margin_flat: f64,
    pub wedge_height: f64,
    /// Lift of the gable cutter above the eaves line
    pub gable_eaves_offset: f64,
}

impl Default for CladdingConfig {
    fn default() -> Self {
        Self {
            course_pitch: 140.0,
            drip_height: 30.0,
            drip_thickness: 20.0,
            upper_thickness: 12.0,
            clip_margin_sloped: 500.0,
            clip_margin_flat: 200.0,
            wedge_height: 20_000.0,
            gable_eaves_offset: 5.0,
        }
    }
}

/// Timber base under the floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    pub deck_thickness: f64,
    pub bearer_width: f64,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            deck_thickness: 18.0,
            bearer_width: 50.0,
        }
    }
}
