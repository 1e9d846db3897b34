// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Structlink Topology
//!
//! Deduplicated point and element identifiers for structural model export.
//!
//! Geometry drawn independently on different sides of a conversion rarely
//! shares exact coordinates. This crate snaps every coordinate into a
//! tolerance-aware [`PointStore`] and encodes each element in two phases:
//!
//! 1. **Connectivity**: the element's ordered point ids under a short emitted
//!    id (`F1`, `W3`, `B12`). Area shapes with the same corners collapse onto
//!    one id regardless of vertex order.
//! 2. **Assignment**: the emitted id bound to a story name and a property
//!    name, with flags for openings and diaphragms.
//!
//! Every source element ends with an [`ElementOutcome`], so skipped elements
//! are counted instead of silently dropped.
//!
//! ## Example
//!
//! ```rust,ignore
//! use structlink_topology::{
//!     AreaGroup, ContainsStoryResolver, DedupConfig, GroupContext, LineGroup, PointStore,
//! };
//!
//! let mut store = PointStore::new(DedupConfig::default())?;
//! let ctx = GroupContext {
//!     model: &model,
//!     stories: &story_names,
//!     resolver: &ContainsStoryResolver,
//!     diaphragm: Some("D1"),
//! };
//! let lines = LineGroup::new(ctx).run(&mut store);
//! let areas = AreaGroup::new(ctx).run(&mut store);
//! for (id, point) in store.export() {
//!     println!("{id}: {} {}", point.x, point.y);
//! }
//! ```

pub mod assignment;
pub mod connectivity;
pub mod error;
pub mod groups;
pub mod keys;
pub mod outcome;
pub mod point_store;
pub mod resolver;

pub use assignment::{
    AssignmentBuilder, AssignmentFlag, AssignmentOutput, AssignmentRecord, AssignmentSource,
    Placement,
};
pub use connectivity::{ConnectivityBuilder, ConnectivityRecord, ConnectivitySource, IdMapping, Shape};
pub use error::{Error, Result};
pub use groups::{AreaGroup, GroupContext, GroupOutput, KindSection, LineGroup};
pub use keys::{AreaKind, ElementId, ElementKind, LineKind, PointId};
pub use outcome::{ElementOutcome, OutcomeTally};
pub use point_store::{DedupConfig, PointKey, PointStore};
pub use resolver::{ContainsStoryResolver, ExactStoryResolver, StoryResolver};
