// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Structlink RAM
//!
//! Interchange between the canonical model and a RAM Structural System
//! model, through the [`RamModel`] / [`RamDatabase`] boundary.
//!
//! - [`IdentifierReconciler`]: canonical id to native UID tables for
//!   materials, sections, floor types and stories
//! - [`import_levels`]: RAM stories to canonical levels
//! - [`RamExporter`]: canonical model to RAM, inside a [`RamSession`]
//! - [`MemoryRamModel`] / [`MemoryRamDatabase`]: in-process implementations
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use structlink_ram::{MemoryRamDatabase, RamExporter};
//!
//! let mut db = MemoryRamDatabase::new();
//! let report = RamExporter::default().convert(&model, &mut db, "out.rss".as_ref());
//! println!("{report}");
//! ```

pub mod api;
pub mod error;
pub mod export;
pub mod levels;
pub mod memory;
pub mod reconcile;
pub mod session;

pub use api::{
    RamDatabase, RamFloorType, RamLoadValues, RamMaterial, RamModel, RamSection, RamStory,
    RamUid, RAM_LENGTH_UNIT,
};
pub use error::{Error, Result};
pub use export::{
    ConversionReport, RamExportOptions, RamExportSummary, RamExporter,
    RAM_SURFACE_LOAD_CORRECTION,
};
pub use levels::{import_layout, import_levels, ImportedLayout, LevelReconciliation, LevelState};
pub use memory::{MemoryRamDatabase, MemoryRamModel, RamArea, RamMember, RamSurfaceLoad};
pub use reconcile::{Category, CrossSystemIdTable, Degradation, IdentifierReconciler};
pub use session::RamSession;
