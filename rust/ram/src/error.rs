// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::reconcile::Category;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot open RAM database {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("cannot create RAM database {path}: {reason}")]
    Create { path: PathBuf, reason: String },

    #[error("cannot save RAM database: {0}")]
    Save(String),

    #[error("RAM call failed: {0}")]
    Native(String),

    #[error("precondition violated: {0}")]
    Precondition(String),

    #[error("no default {0} to fall back to")]
    MissingDefault(Category),

    #[error(transparent)]
    Topology(#[from] structlink_topology::Error),

    #[error(transparent)]
    Model(#[from] structlink_model::Error),
}
