// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry construction
#[derive(Error, Debug)]
pub enum Error {
    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Malformed mesh: {0}")]
    MalformedMesh(String),

    #[error("Degenerate cutter: {0}")]
    DegenerateCutter(String),

    #[error("Boolean operation failed: {0}")]
    BooleanFailed(String),

    #[error("Mesh '{0}' references a disposed material")]
    DanglingMaterial(String),

    #[error("Material '{0}' is still used by {1} mesh(es)")]
    MaterialInUse(String, usize),

    #[error("Scene node not found: {0}")]
    NodeNotFound(String),

    #[error("Core parameter error: {0}")]
    Core(#[from] shedkit_core::Error),
}
