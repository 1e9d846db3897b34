// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Importing RAM stories as canonical levels.
//!
//! Each story walks a [`LevelReconciliation`] through
//! `Unresolved -> HasFloorTypeMapping -> HasElevationAssigned -> Finalized`.
//! A level is finalized by inserting it into a [`LevelSequence`]; the ground
//! level is synthesized first when no story sits at zero elevation.

use std::fmt;
use std::path::Path;

use structlink_model::{FloorType, IdCategory, IdGenerator, LengthUnit, Level, LevelSequence};

use crate::api::{self, RamDatabase, RamModel, RamUid, RAM_LENGTH_UNIT};
use crate::error::{Error, Result};
use crate::reconcile::{Category, IdentifierReconciler};
use crate::session::RamSession;

/// Name given to a synthesized ground level and its floor type.
pub const GROUND_NAME: &str = "Ground";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LevelState {
    Unresolved,
    HasFloorTypeMapping,
    HasElevationAssigned,
    Finalized,
}

impl fmt::Display for LevelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LevelState::Unresolved => "unresolved",
            LevelState::HasFloorTypeMapping => "has-floor-type-mapping",
            LevelState::HasElevationAssigned => "has-elevation-assigned",
            LevelState::Finalized => "finalized",
        })
    }
}

/// One story on its way to becoming a canonical level.
#[derive(Debug, Clone)]
pub struct LevelReconciliation {
    uid: RamUid,
    name: String,
    state: LevelState,
    floor_type_id: Option<String>,
    elevation: Option<f64>,
}

impl LevelReconciliation {
    pub fn new(uid: RamUid, name: impl Into<String>) -> Self {
        Self {
            uid,
            name: name.into(),
            state: LevelState::Unresolved,
            floor_type_id: None,
            elevation: None,
        }
    }

    pub fn uid(&self) -> RamUid {
        self.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> LevelState {
        self.state
    }

    /// Elevation in the canonical unit, once assigned.
    pub fn elevation(&self) -> Option<f64> {
        self.elevation
    }

    fn advance(&mut self, from: LevelState, to: LevelState) -> Result<()> {
        if self.state != from {
            return Err(Error::Precondition(format!(
                "level '{}' cannot move to {to} while {}",
                self.name, self.state
            )));
        }
        self.state = to;
        Ok(())
    }

    pub fn map_floor_type(&mut self, floor_type_id: impl Into<String>) -> Result<()> {
        self.advance(LevelState::Unresolved, LevelState::HasFloorTypeMapping)?;
        self.floor_type_id = Some(floor_type_id.into());
        Ok(())
    }

    /// Stores `native_elevation * factor`. Non-finite results are rejected.
    pub fn assign_elevation(&mut self, native_elevation: f64, factor: f64) -> Result<()> {
        let elevation = native_elevation * factor;
        if !elevation.is_finite() {
            return Err(Error::Precondition(format!(
                "level '{}' has non-finite elevation {native_elevation}",
                self.name
            )));
        }
        self.advance(
            LevelState::HasFloorTypeMapping,
            LevelState::HasElevationAssigned,
        )?;
        self.elevation = Some(elevation);
        Ok(())
    }

    /// Inserts the level into `sequence` under `id`.
    pub fn finalize(&mut self, id: String, sequence: &mut LevelSequence) -> Result<()> {
        self.advance(LevelState::HasElevationAssigned, LevelState::Finalized)?;
        sequence.insert(Level {
            id,
            name: self.name.clone(),
            elevation: self.elevation.unwrap_or_default(),
            floor_type_id: self.floor_type_id.clone(),
        });
        Ok(())
    }
}

/// Levels and floor types read from a RAM model.
#[derive(Debug, Clone, Default)]
pub struct ImportedLayout {
    pub floor_types: Vec<FloorType>,
    pub levels: LevelSequence,
}

/// Reads floor types and stories from `ram` into canonical form, in
/// `unit`.
///
/// Native entries already linked in `reconciler` keep their canonical ids;
/// the rest get fresh ids from `ids` and are linked. A story whose floor
/// type is unknown falls back to the first floor type and the fallback is
/// recorded as a degradation.
pub fn import_levels(
    ram: &dyn RamModel,
    unit: LengthUnit,
    reconciler: &mut IdentifierReconciler,
    ids: &mut IdGenerator,
) -> Result<ImportedLayout> {
    let factor = RAM_LENGTH_UNIT.conversion_factor(unit);
    let mut layout = ImportedLayout::default();

    for native in api::floor_types(ram) {
        let id = match reconciler.canonical_id_for(Category::FloorType, native.uid) {
            Some(id) => id.to_string(),
            None => {
                let id = ids.next_id(IdCategory::FloorType);
                reconciler.link(Category::FloorType, id.clone(), native.uid);
                id
            }
        };
        layout.floor_types.push(FloorType {
            id,
            name: native.name,
        });
    }

    let mut pending = Vec::new();
    for story in api::stories(ram) {
        let mut level = LevelReconciliation::new(story.uid, story.name);
        let floor_type_id = match reconciler.canonical_id_for(Category::FloorType, story.floor_type) {
            Some(id) => id.to_string(),
            None => {
                let fallback = layout
                    .floor_types
                    .first()
                    .map(|f| f.id.clone())
                    .ok_or(Error::MissingDefault(Category::FloorType))?;
                reconciler.degrade(Category::FloorType, &story.floor_type.to_string(), fallback.clone());
                fallback
            }
        };
        level.map_floor_type(floor_type_id)?;
        level.assign_elevation(story.elevation, factor)?;
        pending.push(level);
    }

    let has_ground = pending
        .iter()
        .filter_map(LevelReconciliation::elevation)
        .any(|e| e.abs() <= structlink_model::GROUND_ELEVATION_TOLERANCE);
    if !has_ground {
        let floor_type_id = match reconciler.canonical_id_for(Category::FloorType, RamUid::GROUND) {
            Some(id) => id.to_string(),
            None => {
                let id = ids.next_id(IdCategory::FloorType);
                reconciler.link(Category::FloorType, id.clone(), RamUid::GROUND);
                layout.floor_types.push(FloorType {
                    id: id.clone(),
                    name: GROUND_NAME.to_string(),
                });
                id
            }
        };
        let mut ground = LevelReconciliation::new(RamUid::GROUND, GROUND_NAME);
        ground.map_floor_type(floor_type_id)?;
        ground.assign_elevation(0.0, factor)?;
        tracing::debug!("ground level synthesized");
        pending.push(ground);
    }

    for level in &mut pending {
        let id = match reconciler.canonical_id_for(Category::Story, level.uid()) {
            Some(id) => id.to_string(),
            None => {
                let id = ids.next_id(IdCategory::Level);
                reconciler.link(Category::Story, id.clone(), level.uid());
                id
            }
        };
        level.finalize(id, &mut layout.levels)?;
    }

    tracing::info!(
        levels = layout.levels.len(),
        floor_types = layout.floor_types.len(),
        "RAM levels imported"
    );
    Ok(layout)
}

/// Opens the database at `path` and imports its levels with fresh tables.
/// The database is closed without saving.
pub fn import_layout<D: RamDatabase + ?Sized>(
    db: &mut D,
    path: &Path,
    unit: LengthUnit,
) -> Result<ImportedLayout> {
    let session = RamSession::open(db, path)?;
    let mut reconciler = IdentifierReconciler::new();
    let mut ids = IdGenerator::new();
    import_levels(session.model()?, unit, &mut reconciler, &mut ids)
}
