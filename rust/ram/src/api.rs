// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The RAM object-model boundary.
//!
//! RAM exposes its catalogs as count/get-by-index/add collections keyed by
//! integer UIDs. [`RamModel`] mirrors that surface so the exporter and the
//! level import can run against the native API or [`MemoryRamModel`].
//! Native lengths are inches.
//!
//! [`MemoryRamModel`]: crate::memory::MemoryRamModel

use std::fmt;
use std::path::Path;

use structlink_model::{LengthUnit, MaterialKind, Point2D};
use structlink_topology::{AreaKind, LineKind};

use crate::error::Result;

/// Length unit of every coordinate, height and elevation crossing the
/// boundary.
pub const RAM_LENGTH_UNIT: LengthUnit = LengthUnit::Inch;

/// Native object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RamUid(pub i64);

impl RamUid {
    /// Reserved key for the ground level and its floor type. RAM has no
    /// ground story, so nothing native ever carries this key.
    pub const GROUND: RamUid = RamUid(0);

    pub fn is_ground(self) -> bool {
        self == Self::GROUND
    }
}

impl fmt::Display for RamUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RamMaterial {
    pub uid: RamUid,
    pub name: String,
    pub kind: MaterialKind,
}

/// A frame section.
#[derive(Debug, Clone, PartialEq)]
pub struct RamSection {
    pub uid: RamUid,
    pub name: String,
    pub material: Option<RamUid>,
}

/// A shared framing layout. Stories reference one floor type each.
#[derive(Debug, Clone, PartialEq)]
pub struct RamFloorType {
    pub uid: RamUid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RamStory {
    pub uid: RamUid,
    pub name: String,
    pub floor_type: RamUid,
    /// Elevation of the story's floor above the base.
    pub elevation: f64,
    /// Distance to the story below, or to the base.
    pub height: f64,
}

/// Uniform surface load magnitudes as handed to RAM.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RamLoadValues {
    pub dead: f64,
    pub superimposed_dead: f64,
    pub live: f64,
}

/// A RAM model's catalogs and layout.
///
/// Layout objects live on floor types, so every story sharing a floor type
/// shares its members and areas. `add_*` calls fail with
/// [`Error::Native`](crate::Error::Native) when RAM rejects the object.
pub trait RamModel {
    fn material_count(&self) -> usize;
    fn material(&self, index: usize) -> Option<RamMaterial>;
    fn add_material(&mut self, name: &str, kind: MaterialKind) -> Result<RamUid>;

    fn section_count(&self) -> usize;
    fn section(&self, index: usize) -> Option<RamSection>;
    fn add_section(&mut self, name: &str, material: Option<RamUid>) -> Result<RamUid>;

    fn floor_type_count(&self) -> usize;
    fn floor_type(&self, index: usize) -> Option<RamFloorType>;
    fn add_floor_type(&mut self, name: &str) -> Result<RamUid>;

    fn story_count(&self) -> usize;
    fn story(&self, index: usize) -> Option<RamStory>;
    /// Adds a story at `elevation` above the base. Stories stay ordered by
    /// elevation; the story added and the one above it get their heights
    /// from their neighbors.
    fn add_story(&mut self, name: &str, floor_type: RamUid, elevation: f64) -> Result<RamUid>;

    fn add_member(
        &mut self,
        floor_type: RamUid,
        kind: LineKind,
        section: RamUid,
        start: Point2D,
        end: Point2D,
    ) -> Result<RamUid>;

    fn add_area(
        &mut self,
        floor_type: RamUid,
        kind: AreaKind,
        property: Option<&str>,
        points: &[Point2D],
    ) -> Result<RamUid>;

    fn add_surface_load_set(&mut self, name: &str, values: RamLoadValues) -> Result<RamUid>;
    fn add_surface_load(
        &mut self,
        floor_type: RamUid,
        load_set: RamUid,
        points: &[Point2D],
    ) -> Result<RamUid>;
}

pub fn materials(model: &dyn RamModel) -> impl Iterator<Item = RamMaterial> + '_ {
    (0..model.material_count()).filter_map(|i| model.material(i))
}

pub fn sections(model: &dyn RamModel) -> impl Iterator<Item = RamSection> + '_ {
    (0..model.section_count()).filter_map(|i| model.section(i))
}

pub fn floor_types(model: &dyn RamModel) -> impl Iterator<Item = RamFloorType> + '_ {
    (0..model.floor_type_count()).filter_map(|i| model.floor_type(i))
}

pub fn stories(model: &dyn RamModel) -> impl Iterator<Item = RamStory> + '_ {
    (0..model.story_count()).filter_map(|i| model.story(i))
}

/// A RAM database file.
///
/// At most one model is open at a time. `close` must be safe to call on a
/// database that is not open.
pub trait RamDatabase {
    fn create(&mut self, path: &Path) -> Result<()>;
    fn open(&mut self, path: &Path) -> Result<()>;
    fn is_open(&self) -> bool;
    fn model(&self) -> Option<&dyn RamModel>;
    fn model_mut(&mut self) -> Option<&mut dyn RamModel>;
    fn save(&mut self) -> Result<()>;
    fn close(&mut self);
}
