// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Shedkit Core
//!
//! Parameter schema for parametric timber garden buildings (sheds, garden
//! rooms, workshops).
//!
//! ## Overview
//!
//! - **BuildingParameters**: the persisted JSON tree (presets, exports, share
//!   links). Every field is defaulted at deserialization.
//! - **Dimension resolution**: base, frame and roof footprints from competing
//!   input conventions.
//! - **EngineConfig**: construction constants passed into every build.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shedkit_core::{BuildingParameters, resolve_dimensions};
//!
//! let params = BuildingParameters::from_json(r#"{"w":1800,"d":2400}"#)?;
//! let dims = resolve_dimensions(&params);
//! assert_eq!(dims.frame.w, 1800);
//! ```

pub mod config;
pub mod dimensions;
pub mod error;
pub mod openings;
pub mod params;

pub use config::{BaseConfig, CapConfig, CladdingConfig, EngineConfig, RoofConfig, TrimConfig, WallConfig};
pub use dimensions::{resolve_dimensions, Footprint, ResolvedDimensions, SideOverhang};
pub use error::{Error, Result};
pub use openings::{Opening, OpeningKind, WallName, WallRef, DEFAULT_WINDOW_SILL_MM};
pub use params::{
    ApexParams, AttachmentDescriptor, AttachmentRoof, AttachmentRoofType, AttachmentWalls,
    BaseParams, BuildingParameters, CladdingParams, CladdingStyle, CoveringStyle,
    DimensionInput, FrameParams, HippedParams, OverhangParams, PentParams, RidgeAxis,
    RoofParams, RoofStyle, WallParams, WallVariant,
};
