// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Assignment records: binding emitted elements to a story and a property.
//!
//! Assignment runs after connectivity and only considers elements that
//! received an emitted id. Each unresolved lookup skips the element with an
//! [`ElementOutcome`] instead of failing the batch.

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use structlink_model::{AreaElement, Catalog, FrameMember, Level, NamedEntity, Opening};

use crate::connectivity::{ConnectivitySource, IdMapping};
use crate::keys::{AreaKind, ElementId, ElementKind};
use crate::outcome::{ElementOutcome, OutcomeTally};
use crate::resolver::StoryResolver;

/// Where an element sits vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement<'a> {
    /// Directly on a level, by level id.
    Level(&'a str),
    /// On the level of a host floor, by floor id.
    Host(&'a str),
}

/// Elements that can be bound to a story and a property.
pub trait AssignmentSource: ConnectivitySource {
    fn placement(&self) -> Placement<'_>;

    /// Property id, or `None` for elements that carry no property.
    fn property_id(&self) -> Option<&str>;
}

impl AssignmentSource for FrameMember {
    fn placement(&self) -> Placement<'_> {
        Placement::Level(&self.level_id)
    }

    fn property_id(&self) -> Option<&str> {
        Some(&self.frame_property_id)
    }
}

impl AssignmentSource for AreaElement {
    fn placement(&self) -> Placement<'_> {
        Placement::Level(&self.level_id)
    }

    fn property_id(&self) -> Option<&str> {
        Some(&self.property_id)
    }
}

impl AssignmentSource for Opening {
    fn placement(&self) -> Placement<'_> {
        Placement::Host(&self.floor_id)
    }

    fn property_id(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentFlag {
    Opening,
    Diaphragm(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentRecord {
    pub id: ElementId,
    pub story: String,
    pub property: Option<String>,
    pub flags: SmallVec<[AssignmentFlag; 2]>,
}

impl AssignmentRecord {
    pub fn is_opening(&self) -> bool {
        self.flags.contains(&AssignmentFlag::Opening)
    }

    pub fn diaphragm(&self) -> Option<&str> {
        self.flags.iter().find_map(|f| match f {
            AssignmentFlag::Diaphragm(name) => Some(name.as_str()),
            AssignmentFlag::Opening => None,
        })
    }
}

/// Result of one assignment pass.
#[derive(Debug, Clone, Default)]
pub struct AssignmentOutput<'a> {
    pub records: Vec<AssignmentRecord>,
    /// One entry per source element, in input order.
    pub outcomes: Vec<(&'a str, ElementOutcome)>,
}

impl AssignmentOutput<'_> {
    pub fn tally(&self) -> OutcomeTally {
        self.outcomes.iter().map(|&(_, o)| o).collect()
    }
}

/// Builds assignment records for one element kind.
pub struct AssignmentBuilder<'a, E> {
    kind: ElementKind,
    elements: &'a [E],
    levels: Catalog<'a, Level>,
    properties: FxHashMap<&'a str, &'a str>,
    hosts: FxHashMap<&'a str, &'a str>,
    diaphragm: Option<String>,
}

impl<'a, E: AssignmentSource> AssignmentBuilder<'a, E> {
    pub fn new(kind: impl Into<ElementKind>) -> Self {
        Self {
            kind: kind.into(),
            elements: &[],
            levels: Catalog::new(&[]),
            properties: FxHashMap::default(),
            hosts: FxHashMap::default(),
            diaphragm: None,
        }
    }

    pub fn set_data<P: NamedEntity>(
        &mut self,
        elements: &'a [E],
        levels: &'a [Level],
        properties: &'a [P],
    ) -> &mut Self {
        self.elements = elements;
        self.levels = Catalog::new(levels);
        self.properties = properties.iter().map(|p| (p.id(), p.name())).collect();
        self
    }

    /// Floors that openings resolve their level through.
    pub fn set_hosts(&mut self, floors: &'a [AreaElement]) -> &mut Self {
        self.hosts = floors
            .iter()
            .map(|f| (f.id.as_str(), f.level_id.as_str()))
            .collect();
        self
    }

    /// Diaphragm name attached to floor assignments.
    pub fn set_diaphragm(&mut self, name: Option<&str>) -> &mut Self {
        self.diaphragm = name.filter(|n| !n.is_empty()).map(str::to_string);
        self
    }

    pub fn export_assignments(
        &self,
        mapping: &IdMapping,
        stories: &[String],
        resolver: &dyn StoryResolver,
    ) -> AssignmentOutput<'a> {
        let mut out = AssignmentOutput::default();
        // Index into `out.records` per emitted shape and story.
        let mut emitted: FxHashMap<(ElementId, String), usize> = FxHashMap::default();

        for element in self.elements {
            let source_id = element.source_id();
            let outcome = match self.resolve(element, mapping, stories, resolver) {
                Ok(record) => match emitted.entry((record.id, record.story.clone())) {
                    Entry::Vacant(slot) => {
                        slot.insert(out.records.len());
                        out.records.push(record);
                        ElementOutcome::Exported
                    }
                    // Collapsed shapes on the same story produce one record.
                    Entry::Occupied(slot) => {
                        let kept = &out.records[*slot.get()];
                        if kept.property == record.property {
                            ElementOutcome::Exported
                        } else {
                            tracing::warn!(
                                element = source_id,
                                shape = %record.id,
                                story = %record.story,
                                kept = kept.property.as_deref().unwrap_or_default(),
                                dropped = record.property.as_deref().unwrap_or_default(),
                                "collapsed element has a conflicting property"
                            );
                            ElementOutcome::SkippedPropertyConflict
                        }
                    }
                },
                Err(outcome) => {
                    tracing::debug!(
                        element = source_id,
                        kind = %self.kind,
                        outcome = %outcome,
                        "assignment skipped"
                    );
                    outcome
                }
            };
            out.outcomes.push((source_id, outcome));
        }
        out
    }

    fn resolve(
        &self,
        element: &E,
        mapping: &IdMapping,
        stories: &[String],
        resolver: &dyn StoryResolver,
    ) -> Result<AssignmentRecord, ElementOutcome> {
        let id = mapping
            .get(element.source_id())
            .ok_or(ElementOutcome::SkippedMissingMapping)?;

        let level_id = match element.placement() {
            Placement::Level(level_id) => level_id,
            Placement::Host(floor_id) => *self
                .hosts
                .get(floor_id)
                .ok_or(ElementOutcome::SkippedMissingLevel)?,
        };
        let level = self
            .levels
            .get(level_id)
            .ok_or(ElementOutcome::SkippedMissingLevel)?;
        let story = resolver
            .resolve(&level.name, stories)
            .ok_or(ElementOutcome::SkippedMissingLevel)?;

        let mut flags = SmallVec::new();
        let property = match element.property_id() {
            Some(pid) => Some(
                self.properties
                    .get(pid)
                    .ok_or(ElementOutcome::SkippedMissingProperty)?
                    .to_string(),
            ),
            None => {
                flags.push(AssignmentFlag::Opening);
                None
            }
        };
        if self.kind == ElementKind::Area(AreaKind::Floor) {
            if let Some(name) = &self.diaphragm {
                flags.push(AssignmentFlag::Diaphragm(name.clone()));
            }
        }

        Ok(AssignmentRecord {
            id,
            story: story.to_string(),
            property,
            flags,
        })
    }
}
