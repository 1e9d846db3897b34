// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the canonical model.

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or validating a canonical model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The canonical JSON could not be decoded or encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A length unit name did not match any known unit.
    #[error("unknown length unit: {0}")]
    UnknownLengthUnit(String),

    /// Two entities of the same category share an identifier.
    #[error("duplicate {category} id: {id}")]
    DuplicateId { category: &'static str, id: String },
}
