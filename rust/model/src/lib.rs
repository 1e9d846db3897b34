// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Structlink Model
//!
//! The canonical structural building model shared by every converter in the
//! workspace. Each section of the model mirrors one top-level section of the
//! canonical schema:
//!
//! - **Project**: name and unit system ([`ProjectInfo`], [`Units`])
//! - **Layout**: grids, levels and floor types ([`ModelLayout`])
//! - **Properties**: materials plus frame, floor and wall properties
//! - **Elements**: beams, columns, braces, walls, floors, openings, footings, joints
//! - **Loads**: load definitions, surface loads and combinations
//!
//! Every element and property carries a string identifier that is unique
//! within one model. Identifiers are produced by a category-keyed
//! [`IdGenerator`] and are not stable across runs.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use structlink_model::{CanonicalModel, LengthUnit};
//!
//! let model = CanonicalModel::from_json(&json)?;
//! let model = model.with_length_unit(LengthUnit::Foot);
//! println!("{} floors", model.elements.floors.len());
//! ```

pub mod elements;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod layout;
pub mod loads;
pub mod model;
pub mod properties;
pub mod units;

pub use elements::{AreaElement, Elements, Footing, FrameMember, Joint, Opening};
pub use error::{Error, Result};
pub use geometry::Point2D;
pub use ids::{IdCategory, IdGenerator};
pub use layout::{FloorType, Grid, Level, LevelSequence, ModelLayout, GROUND_ELEVATION_TOLERANCE};
pub use loads::{LoadCombination, LoadDefinition, LoadFactor, LoadType, Loads, SurfaceLoad};
pub use model::{CanonicalModel, ProjectInfo};
pub use properties::{
    Catalog, FloorProperty, FrameProperty, Material, MaterialKind, NamedEntity, Properties,
    WallProperty,
};
pub use units::{ForceUnit, LengthUnit, Units};
