// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Materials and section properties, plus the id-indexed [`Catalog`] view
//! used by the assignment builders and the identifier reconciler.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// An entity that carries a canonical id and a display name.
pub trait NamedEntity {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

/// Material family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    Steel,
    Concrete,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: MaterialKind,
}

/// Section used by beams, columns and braces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameProperty {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub material_id: Option<String>,
}

/// Slab/deck property used by floors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorProperty {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub material_id: Option<String>,
    #[serde(default)]
    pub thickness: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallProperty {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub material_id: Option<String>,
    #[serde(default)]
    pub thickness: Option<f64>,
}

/// The properties section of a canonical model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub frame_properties: Vec<FrameProperty>,
    #[serde(default)]
    pub floor_properties: Vec<FloorProperty>,
    #[serde(default)]
    pub wall_properties: Vec<WallProperty>,
}

impl Properties {
    pub(crate) fn scale_lengths(&mut self, factor: f64) {
        for p in &mut self.floor_properties {
            p.thickness = p.thickness.map(|t| t * factor);
        }
        for p in &mut self.wall_properties {
            p.thickness = p.thickness.map(|t| t * factor);
        }
    }
}

macro_rules! impl_named_entity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl NamedEntity for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn name(&self) -> &str {
                    &self.name
                }
            }
        )*
    };
}

impl_named_entity!(Material, FrameProperty, FloorProperty, WallProperty);

/// Id-indexed, read-only view over a slice of named entities.
///
/// When two entries share an id the first one wins.
#[derive(Debug)]
pub struct Catalog<'a, T> {
    by_id: FxHashMap<&'a str, &'a T>,
}

impl<'a, T: NamedEntity> Catalog<'a, T> {
    pub fn new(items: &'a [T]) -> Self {
        let mut by_id = FxHashMap::default();
        for item in items {
            by_id.entry(item.id()).or_insert(item);
        }
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&'a T> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
