// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared rebuild pipeline used by the CLI and embedders.
//!
//! [`Configurator`] turns building parameters into a populated scene and a
//! [`BuildReport`]; [`write_obj`] exports that scene.

pub mod error;
pub mod export;
pub mod pipeline;
pub mod report;

pub use error::{Error, Result};
pub use export::{export_meshes, to_obj_string, write_obj, ExportMesh, ObjStats};
pub use pipeline::{base_rect, main_wall_state, Configurator, Subtree};
pub use report::{AttachmentEntry, BuildReport, ClampEntry, FallbackEntry, RoofReport, WallEntry};
