// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for topology construction.
//!
//! Only configuration problems are errors. Elements with unusable geometry or
//! unresolved references are skipped, not reported through this type.

/// Result type alias for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring topology construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The rounding grid is coarser than the merge tolerance.
    #[error("grid size {grid} exceeds tolerance {tolerance}")]
    InvalidTolerance { grid: f64, tolerance: f64 },

    /// Grid size or tolerance is zero, negative or not finite.
    #[error("grid size {grid} and tolerance {tolerance} must be positive and finite")]
    NonFiniteTolerance { grid: f64, tolerance: f64 },
}
