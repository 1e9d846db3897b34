// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Structlink E2K
//!
//! Writes a [`CanonicalModel`](structlink_model::CanonicalModel) as E2K text,
//! the line-oriented input format of ETABS-family analysis programs.
//!
//! Points, connectivities and assignments come from `structlink-topology`,
//! so coincident corners drawn by different elements share one `POINT` and
//! permuted copies of the same polygon share one `AREA`.
//!
//! ```rust,ignore
//! use structlink_e2k::{E2kExporter, E2kOptions};
//!
//! let doc = E2kExporter::new(E2kOptions::default()).export(&model)?;
//! std::fs::write("model.e2k", &doc.text)?;
//! println!("{}", doc.summary);
//! ```

pub mod error;
pub mod export;
pub mod loads;
pub mod stories;
pub mod writer;

pub use error::{Error, Result};
pub use export::{E2kDocument, E2kExporter, E2kOptions, ExportSummary};
pub use loads::{default_patterns, resolve_patterns, LoadPattern};
pub use stories::{Story, StoryTable, BASE_STORY};
pub use writer::E2kWriter;
