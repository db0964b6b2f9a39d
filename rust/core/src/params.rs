// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building parameter tree
//!
//! This is the persisted state format: preset files, exported designs and
//! share links all carry exactly this JSON. Field names are fixed; every
//! field has a default applied here, once, at deserialization time, so that
//! no builder has to re-derive fallbacks at its read site.

use crate::error::Result;
use crate::openings::{Opening, WallName};
use serde::{Deserialize, Serialize};

/// Complete parameter tree for one building and its attachments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingParameters {
    /// Legacy frame width (mm), used when `dim` carries neither frame nor base width
    pub w: u32,
    /// Legacy frame depth (mm)
    pub d: u32,
    pub dim: DimensionInput,
    pub overhang: OverhangParams,
    pub frame: FrameParams,
    pub roof: RoofParams,
    pub walls: WallParams,
    pub cladding: CladdingParams,
    pub base: BaseParams,
    pub attachments: Vec<AttachmentDescriptor>,
}

impl Default for BuildingParameters {
    fn default() -> Self {
        Self {
            w: 1800,
            d: 2400,
            dim: DimensionInput::default(),
            overhang: OverhangParams::default(),
            frame: FrameParams::default(),
            roof: RoofParams::default(),
            walls: WallParams::default(),
            cladding: CladdingParams::default(),
            base: BaseParams::default(),
            attachments: Vec::new(),
        }
    }
}

impl BuildingParameters {
    /// Parse a parameter tree from JSON, filling every absent field with its default
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up an attachment by id
    pub fn attachment(&self, id: &str) -> Option<&AttachmentDescriptor> {
        self.attachments.iter().find(|a| a.id == id)
    }
}

/// Competing footprint inputs; see [`crate::dimensions::resolve_dimensions`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionInput {
    #[serde(rename = "frameW_mm", skip_serializing_if = "Option::is_none")]
    pub frame_w_mm: Option<u32>,
    #[serde(rename = "frameD_mm", skip_serializing_if = "Option::is_none")]
    pub frame_d_mm: Option<u32>,
    #[serde(rename = "baseW_mm", skip_serializing_if = "Option::is_none")]
    pub base_w_mm: Option<u32>,
    #[serde(rename = "baseD_mm", skip_serializing_if = "Option::is_none")]
    pub base_d_mm: Option<u32>,
}

/// Roof overhang beyond the wall frame.
///
/// A side set to `null` (or absent) uses `uniform_mm`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverhangParams {
    #[serde(rename = "uniform_mm")]
    pub uniform_mm: u32,
    #[serde(rename = "l_mm")]
    pub l_mm: Option<u32>,
    #[serde(rename = "r_mm")]
    pub r_mm: Option<u32>,
    #[serde(rename = "f_mm")]
    pub f_mm: Option<u32>,
    #[serde(rename = "b_mm")]
    pub b_mm: Option<u32>,
}

impl Default for OverhangParams {
    fn default() -> Self {
        Self {
            uniform_mm: 75,
            l_mm: None,
            r_mm: None,
            f_mm: None,
            b_mm: None,
        }
    }
}

/// Timber member section used for studs, plates and rafters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameParams {
    /// Narrow face of a member (stud width along the wall)
    #[serde(rename = "thickness_mm")]
    pub thickness_mm: u32,
    /// Wide face of a member (wall depth, rafter depth)
    #[serde(rename = "depth_mm")]
    pub depth_mm: u32,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            thickness_mm: 50,
            depth_mm: 75,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoofStyle {
    Apex,
    Pent,
    Hipped,
}

impl Default for RoofStyle {
    fn default() -> Self {
        RoofStyle::Apex
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoveringStyle {
    /// Mineral felt laid on the sheathing
    Felt,
    /// Membrane, battens and tile courses
    Tiles,
}

impl Default for CoveringStyle {
    fn default() -> Self {
        CoveringStyle::Felt
    }
}

/// Which plan axis the apex ridge runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RidgeAxis {
    /// Ridge runs front to back (gables on front and back walls)
    Depth,
    /// Ridge runs left to right (gables on left and right walls)
    Width,
}

impl Default for RidgeAxis {
    fn default() -> Self {
        RidgeAxis::Depth
    }
}

/// Roof parameters; `style` selects which sub-config is authoritative
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoofParams {
    pub style: RoofStyle,
    pub covering: CoveringStyle,
    pub apex: ApexParams,
    pub pent: PentParams,
    pub hipped: HippedParams,
}

/// Apex roof. Eaves and crest are absolute heights above the base; when
/// either is absent the rise falls back to a span-proportional heuristic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApexParams {
    #[serde(rename = "eaves_mm", skip_serializing_if = "Option::is_none")]
    pub eaves_mm: Option<u32>,
    #[serde(rename = "crest_mm", skip_serializing_if = "Option::is_none")]
    pub crest_mm: Option<u32>,
    pub ridge: RidgeAxis,
}

/// Pent (mono-pitch) roof
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PentParams {
    #[serde(rename = "minHeight_mm")]
    pub min_height_mm: u32,
    #[serde(rename = "maxHeight_mm")]
    pub max_height_mm: u32,
    /// Wall carrying the high edge of the slope
    #[serde(rename = "highSide")]
    pub high_side: WallName,
}

impl Default for PentParams {
    fn default() -> Self {
        Self {
            min_height_mm: 2100,
            max_height_mm: 2300,
            high_side: WallName::Front,
        }
    }
}

/// Hipped roof; same eaves/crest convention as the apex roof
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HippedParams {
    #[serde(rename = "eaves_mm", skip_serializing_if = "Option::is_none")]
    pub eaves_mm: Option<u32>,
    #[serde(rename = "crest_mm", skip_serializing_if = "Option::is_none")]
    pub crest_mm: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallVariant {
    /// Three studs per panel, panels up to the maximum board width
    Basic,
    /// Regular stud grid with insulation and plywood lining
    Insulated,
}

impl Default for WallVariant {
    fn default() -> Self {
        WallVariant::Basic
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallParams {
    pub variant: WallVariant,
    /// Eaves height used when a pitched roof carries no explicit eaves control
    #[serde(rename = "height_mm")]
    pub height_mm: u32,
    pub openings: Vec<Opening>,
}

impl Default for WallParams {
    fn default() -> Self {
        Self {
            variant: WallVariant::Basic,
            height_mm: 1850,
            openings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CladdingStyle {
    Shiplap,
    Loglap,
}

impl Default for CladdingStyle {
    fn default() -> Self {
        CladdingStyle::Shiplap
    }
}

impl CladdingStyle {
    /// Material name used for the cladding of this style
    pub fn material_name(&self) -> &'static str {
        match self {
            CladdingStyle::Shiplap => "cladding-shiplap",
            CladdingStyle::Loglap => "cladding-loglap",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CladdingParams {
    pub style: CladdingStyle,
    pub visible: bool,
}

impl Default for CladdingParams {
    fn default() -> Self {
        Self {
            style: CladdingStyle::Shiplap,
            visible: true,
        }
    }
}

/// Timber base under the floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseParams {
    pub enabled: bool,
    /// Bearer height; the wall frame stands on top of the deck
    #[serde(rename = "height_mm")]
    pub height_mm: u32,
}

impl Default for BaseParams {
    fn default() -> Self {
        Self {
            enabled: true,
            height_mm: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentRoofType {
    Pent,
    Apex,
}

impl Default for AttachmentRoofType {
    fn default() -> Self {
        AttachmentRoofType::Pent
    }
}

/// Roof of an attachment. Heights are relative to the attachment's own base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentRoof {
    #[serde(rename = "type")]
    pub kind: AttachmentRoofType,
    /// Pent: height of the inner (parent-side) edge
    #[serde(rename = "maxHeight_mm")]
    pub max_height_mm: u32,
    /// Pent: height of the outer edge
    #[serde(rename = "minHeight_mm")]
    pub min_height_mm: u32,
    /// Apex eaves; absent means heuristic rise
    #[serde(rename = "eaves_mm", skip_serializing_if = "Option::is_none")]
    pub eaves_mm: Option<u32>,
    #[serde(rename = "crest_mm", skip_serializing_if = "Option::is_none")]
    pub crest_mm: Option<u32>,
}

impl Default for AttachmentRoof {
    fn default() -> Self {
        Self {
            kind: AttachmentRoofType::Pent,
            max_height_mm: 1900,
            min_height_mm: 1700,
            eaves_mm: None,
            crest_mm: None,
        }
    }
}

/// Attachment wall settings. Openings name walls in the attachment's own
/// vocabulary (`front`/`back`/`outer` or `left`/`right`/`outer`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentWalls {
    pub variant: WallVariant,
    pub openings: Vec<Opening>,
}

/// A lean-to or side building docked against one wall of the main building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentDescriptor {
    pub id: String,
    pub enabled: bool,
    /// Parent wall the attachment docks against
    pub wall: WallName,
    /// Offset of the attachment's center along the parent wall from the wall center
    #[serde(rename = "offset_mm")]
    pub offset_mm: i32,
    /// Extent along the parent wall
    #[serde(rename = "width_mm")]
    pub width_mm: u32,
    /// Extent away from the parent wall
    #[serde(rename = "depth_mm")]
    pub depth_mm: u32,
    #[serde(rename = "overhang_mm")]
    pub overhang_mm: u32,
    /// Ground level of the attachment relative to the parent base
    #[serde(rename = "levelOffset_mm")]
    pub level_offset_mm: i32,
    pub roof: AttachmentRoof,
    pub walls: AttachmentWalls,
}

impl Default for AttachmentDescriptor {
    fn default() -> Self {
        Self {
            id: String::new(),
            enabled: true,
            wall: WallName::Left,
            offset_mm: 0,
            width_mm: 1800,
            depth_mm: 1200,
            overhang_mm: 75,
            level_offset_mm: 0,
            roof: AttachmentRoof::default(),
            walls: AttachmentWalls::default(),
        }
    }
}
