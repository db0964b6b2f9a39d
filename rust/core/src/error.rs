// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for parameter handling
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or resolving building parameters
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown wall name: {0}")]
    UnknownWall(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
