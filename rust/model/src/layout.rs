// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model layout: grids, levels and floor types.
//!
//! [`LevelSequence`] is the ascending-elevation ordering of levels that story
//! height calculations consume. Both the E2K stories section and the RAM
//! level reconciliation finalize levels by inserting them into a sequence.

use serde::{Deserialize, Serialize};

use crate::geometry::Point2D;
use crate::properties::NamedEntity;

/// Elevations within this distance of zero are treated as the ground level.
pub const GROUND_ELEVATION_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub id: String,
    pub name: String,
    pub start: Point2D,
    pub end: Point2D,
}

/// A horizontal building datum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: String,
    pub name: String,
    /// Elevation in the model's length unit.
    pub elevation: f64,
    #[serde(default)]
    pub floor_type_id: Option<String>,
}

impl Level {
    pub fn is_ground(&self) -> bool {
        self.elevation.abs() <= GROUND_ELEVATION_TOLERANCE
    }
}

/// A set of levels sharing the same framing layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorType {
    pub id: String,
    pub name: String,
}

impl NamedEntity for Level {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl NamedEntity for FloorType {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// The layout section of a canonical model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelLayout {
    #[serde(default)]
    pub grids: Vec<Grid>,
    #[serde(default)]
    pub levels: Vec<Level>,
    #[serde(default)]
    pub floor_types: Vec<FloorType>,
}

impl ModelLayout {
    pub fn level(&self, id: &str) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    pub fn floor_type(&self, id: &str) -> Option<&FloorType> {
        self.floor_types.iter().find(|f| f.id == id)
    }

    pub(crate) fn scale_lengths(&mut self, factor: f64) {
        for grid in &mut self.grids {
            grid.start = grid.start.scaled(factor);
            grid.end = grid.end.scaled(factor);
        }
        for level in &mut self.levels {
            level.elevation *= factor;
        }
    }
}

/// Levels ordered by ascending elevation.
///
/// Levels with equal elevation keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct LevelSequence {
    levels: Vec<Level>,
    synthesized_ground: bool,
}

impl LevelSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_levels<'a>(levels: impl IntoIterator<Item = &'a Level>) -> Self {
        let mut seq = Self::new();
        for level in levels {
            seq.insert(level.clone());
        }
        seq
    }

    /// Inserts a level at its ascending-elevation position.
    pub fn insert(&mut self, level: Level) {
        let pos = self
            .levels
            .partition_point(|l| l.elevation <= level.elevation);
        self.levels.insert(pos, level);
    }

    pub fn has_ground(&self) -> bool {
        self.levels.iter().any(Level::is_ground)
    }

    /// Inserts the level produced by `make` when no zero-elevation level is
    /// present. Returns `true` if a level was synthesized.
    pub fn ensure_ground(&mut self, make: impl FnOnce() -> Level) -> bool {
        if self.has_ground() {
            return false;
        }
        let mut ground = make();
        ground.elevation = 0.0;
        self.insert(ground);
        self.synthesized_ground = true;
        true
    }

    pub fn synthesized_ground(&self) -> bool {
        self.synthesized_ground
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Each level paired with its height above the level below it.
    ///
    /// The lowest level has a height of zero.
    pub fn story_heights(&self) -> Vec<(&Level, f64)> {
        let mut below: Option<f64> = None;
        self.levels
            .iter()
            .map(|level| {
                let height = below.map_or(0.0, |b| level.elevation - b);
                below = Some(level.elevation);
                (level, height)
            })
            .collect()
    }
}
