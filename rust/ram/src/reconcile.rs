// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cross-system identifier reconciliation.
//!
//! Canonical ids and RAM UIDs are assigned independently. A
//! [`CrossSystemIdTable`] correlates the two per category by
//! case-insensitive name; [`IdentifierReconciler`] holds one table per
//! category and records every fallback to a category default.

use std::fmt;

use rustc_hash::FxHashMap;
use structlink_model::{CanonicalModel, NamedEntity};

use crate::api::{self, RamModel, RamUid};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Material,
    FrameSection,
    FloorType,
    Story,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Material => "material",
            Category::FrameSection => "frame section",
            Category::FloorType => "floor type",
            Category::Story => "story",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `RamUid <-> canonical id` for one category.
///
/// The default is the first non-ground native entry seen, matched or not.
#[derive(Debug, Clone)]
pub struct CrossSystemIdTable {
    category: Category,
    to_canonical: FxHashMap<RamUid, String>,
    to_native: FxHashMap<String, RamUid>,
    default: Option<RamUid>,
}

impl CrossSystemIdTable {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            to_canonical: FxHashMap::default(),
            to_native: FxHashMap::default(),
            default: None,
        }
    }

    /// Correlates `native` entries with `canonical` entities by
    /// case-insensitive name.
    ///
    /// The first canonical entity claims a name and the first native entry
    /// claims a canonical id. Native entries without a match stay unmapped.
    pub fn correlate<T: NamedEntity>(
        category: Category,
        canonical: &[T],
        native: impl IntoIterator<Item = (RamUid, String)>,
    ) -> Self {
        let mut index: FxHashMap<String, &str> = FxHashMap::default();
        for entity in canonical {
            index
                .entry(entity.name().to_lowercase())
                .or_insert(entity.id());
        }

        let mut table = Self::new(category);
        for (uid, name) in native {
            table.offer_default(uid);
            match index.get(name.to_lowercase().as_str()) {
                Some(&id) if !table.to_native.contains_key(id) => table.link(id, uid),
                _ => tracing::trace!(category = %category, %uid, name = %name, "native entry unmapped"),
            }
        }
        table
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Records a correlation, replacing any previous one for either key.
    pub fn link(&mut self, canonical_id: impl Into<String>, uid: RamUid) {
        let canonical_id = canonical_id.into();
        if let Some(old) = self.to_native.insert(canonical_id.clone(), uid) {
            self.to_canonical.remove(&old);
        }
        if let Some(old) = self.to_canonical.insert(uid, canonical_id) {
            if self.to_native.get(&old) == Some(&uid) {
                self.to_native.remove(&old);
            }
        }
        self.offer_default(uid);
    }

    fn offer_default(&mut self, uid: RamUid) {
        if self.default.is_none() && !uid.is_ground() {
            self.default = Some(uid);
        }
    }

    pub fn canonical_id_for(&self, uid: RamUid) -> Option<&str> {
        self.to_canonical.get(&uid).map(String::as_str)
    }

    pub fn native_id_for(&self, canonical_id: &str) -> Option<RamUid> {
        self.to_native.get(canonical_id).copied()
    }

    pub fn default(&self) -> Option<RamUid> {
        self.default
    }

    pub fn len(&self) -> usize {
        self.to_native.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_native.is_empty()
    }
}

/// A lookup that fell back to a category default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Degradation {
    pub category: Category,
    /// The id or name that did not resolve.
    pub key: String,
    /// What was used instead.
    pub fallback: String,
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' unresolved, using '{}'",
            self.category, self.key, self.fallback
        )
    }
}

/// One table per [`Category`], built once per conversion.
#[derive(Debug, Clone)]
pub struct IdentifierReconciler {
    materials: CrossSystemIdTable,
    sections: CrossSystemIdTable,
    floor_types: CrossSystemIdTable,
    stories: CrossSystemIdTable,
    degradations: Vec<Degradation>,
}

impl Default for IdentifierReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierReconciler {
    /// Empty tables.
    pub fn new() -> Self {
        Self {
            materials: CrossSystemIdTable::new(Category::Material),
            sections: CrossSystemIdTable::new(Category::FrameSection),
            floor_types: CrossSystemIdTable::new(Category::FloorType),
            stories: CrossSystemIdTable::new(Category::Story),
            degradations: Vec::new(),
        }
    }

    /// Correlates the model's catalogs with what `ram` already holds.
    ///
    /// A zero-elevation level with no native story is linked to
    /// [`RamUid::GROUND`].
    pub fn build(model: &CanonicalModel, ram: &dyn RamModel) -> Self {
        let props = &model.properties;
        let layout = &model.layout;
        let mut reconciler = Self {
            materials: CrossSystemIdTable::correlate(
                Category::Material,
                &props.materials,
                api::materials(ram).map(|m| (m.uid, m.name)),
            ),
            sections: CrossSystemIdTable::correlate(
                Category::FrameSection,
                &props.frame_properties,
                api::sections(ram).map(|s| (s.uid, s.name)),
            ),
            floor_types: CrossSystemIdTable::correlate(
                Category::FloorType,
                &layout.floor_types,
                api::floor_types(ram).map(|f| (f.uid, f.name)),
            ),
            stories: CrossSystemIdTable::correlate(
                Category::Story,
                &layout.levels,
                api::stories(ram).map(|s| (s.uid, s.name)),
            ),
            degradations: Vec::new(),
        };

        if let Some(ground) = layout.levels.iter().find(|l| l.is_ground()) {
            if reconciler.stories.native_id_for(&ground.id).is_none() {
                reconciler.stories.link(ground.id.clone(), RamUid::GROUND);
            }
        }

        tracing::debug!(
            materials = reconciler.materials.len(),
            sections = reconciler.sections.len(),
            floor_types = reconciler.floor_types.len(),
            stories = reconciler.stories.len(),
            "identifier tables built"
        );
        reconciler
    }

    pub fn table(&self, category: Category) -> &CrossSystemIdTable {
        match category {
            Category::Material => &self.materials,
            Category::FrameSection => &self.sections,
            Category::FloorType => &self.floor_types,
            Category::Story => &self.stories,
        }
    }

    pub fn table_mut(&mut self, category: Category) -> &mut CrossSystemIdTable {
        match category {
            Category::Material => &mut self.materials,
            Category::FrameSection => &mut self.sections,
            Category::FloorType => &mut self.floor_types,
            Category::Story => &mut self.stories,
        }
    }

    pub fn canonical_id_for(&self, category: Category, uid: RamUid) -> Option<&str> {
        self.table(category).canonical_id_for(uid)
    }

    pub fn native_id_for(&self, category: Category, canonical_id: &str) -> Option<RamUid> {
        self.table(category).native_id_for(canonical_id)
    }

    pub fn link(&mut self, category: Category, canonical_id: impl Into<String>, uid: RamUid) {
        self.table_mut(category).link(canonical_id, uid);
    }

    /// The native key for `canonical_id`, or the category default.
    ///
    /// Falling back records a [`Degradation`] and never links the two ids.
    pub fn resolve_or_default(&mut self, category: Category, canonical_id: &str) -> Result<RamUid> {
        let table = self.table(category);
        if let Some(uid) = table.native_id_for(canonical_id) {
            return Ok(uid);
        }
        let fallback = table.default().ok_or(Error::MissingDefault(category))?;
        self.degrade(category, canonical_id, fallback.to_string());
        Ok(fallback)
    }

    /// Records a fallback once per category and key.
    pub fn degrade(&mut self, category: Category, key: &str, fallback: String) {
        if self
            .degradations
            .iter()
            .any(|d| d.category == category && d.key == key)
        {
            return;
        }
        let degradation = Degradation {
            category,
            key: key.to_string(),
            fallback,
        };
        tracing::warn!(%degradation, "falling back to default");
        self.degradations.push(degradation);
    }

    pub fn degradations(&self) -> &[Degradation] {
        &self.degradations
    }
}
