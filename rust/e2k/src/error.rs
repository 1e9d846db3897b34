// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Result type alias for E2K export.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("topology error: {0}")]
    Topology(#[from] structlink_topology::Error),

    #[error("model error: {0}")]
    Model(#[from] structlink_model::Error),

    #[error("precondition violated: {0}")]
    Precondition(String),

    #[error("failed to format output: {0}")]
    Format(#[from] std::fmt::Error),
}
