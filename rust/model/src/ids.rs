// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Category-keyed identifier generation for canonical entities.
//!
//! A generator is owned by one conversion; ids are unique within the model
//! it produces and are not stable across runs.

use rustc_hash::FxHashMap;

/// Entity category an identifier is minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdCategory {
    Level,
    FloorType,
    Grid,
    Material,
    FrameProperty,
    FloorProperty,
    WallProperty,
    Beam,
    Column,
    Brace,
    Wall,
    Floor,
    Opening,
    LoadDefinition,
    SurfaceLoad,
}

impl IdCategory {
    pub fn prefix(self) -> &'static str {
        match self {
            IdCategory::Level => "LVL",
            IdCategory::FloorType => "FT",
            IdCategory::Grid => "GRD",
            IdCategory::Material => "MAT",
            IdCategory::FrameProperty => "FP",
            IdCategory::FloorProperty => "FLP",
            IdCategory::WallProperty => "WP",
            IdCategory::Beam => "BM",
            IdCategory::Column => "COL",
            IdCategory::Brace => "BR",
            IdCategory::Wall => "WAL",
            IdCategory::Floor => "FLR",
            IdCategory::Opening => "OPN",
            IdCategory::LoadDefinition => "LD",
            IdCategory::SurfaceLoad => "SL",
        }
    }
}

/// Issues `"<PREFIX>-<n>"` identifiers with one counter per category.
#[derive(Debug, Default)]
pub struct IdGenerator {
    counters: FxHashMap<IdCategory, u64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, category: IdCategory) -> String {
        let counter = self.counters.entry(category).or_insert(0);
        *counter += 1;
        format!("{}-{}", category.prefix(), counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_per_category() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id(IdCategory::Level), "LVL-1");
        assert_eq!(ids.next_id(IdCategory::Level), "LVL-2");
        assert_eq!(ids.next_id(IdCategory::FloorType), "FT-1");
    }

    #[test]
    fn fresh_generators_restart() {
        let mut a = IdGenerator::new();
        a.next_id(IdCategory::Beam);
        let mut b = IdGenerator::new();
        assert_eq!(b.next_id(IdCategory::Beam), "BM-1");
    }
}
