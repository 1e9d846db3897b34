// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Area and line group coordinators.
//!
//! A coordinator runs connectivity then assignment for every kind of its
//! group, in the kind's declared order, against one shared [`PointStore`].

use structlink_model::{AreaElement, CanonicalModel, FloorProperty, NamedEntity};

use crate::assignment::{AssignmentBuilder, AssignmentRecord, AssignmentSource};
use crate::connectivity::{ConnectivityBuilder, ConnectivityRecord, IdMapping};
use crate::keys::{AreaKind, ElementKind, LineKind};
use crate::outcome::{ElementOutcome, OutcomeTally};
use crate::point_store::PointStore;
use crate::resolver::StoryResolver;

/// Inputs shared by every kind in a group.
#[derive(Clone, Copy)]
pub struct GroupContext<'a> {
    pub model: &'a CanonicalModel,
    /// Valid target story names.
    pub stories: &'a [String],
    pub resolver: &'a dyn StoryResolver,
    pub diaphragm: Option<&'a str>,
}

/// Connectivity and assignment output for one element kind.
#[derive(Debug, Clone)]
pub struct KindSection<'a> {
    pub kind: ElementKind,
    pub connectivities: Vec<ConnectivityRecord>,
    /// Source element id to emitted id.
    pub mapping: IdMapping,
    pub assignments: Vec<AssignmentRecord>,
    pub outcomes: Vec<(&'a str, ElementOutcome)>,
}

impl KindSection<'_> {
    pub fn tally(&self) -> OutcomeTally {
        self.outcomes.iter().map(|&(_, o)| o).collect()
    }

    /// Connectivity record of an exported source element.
    pub fn exported_shape(&self, source_id: &str) -> Option<&ConnectivityRecord> {
        let exported = self
            .outcomes
            .iter()
            .any(|&(id, o)| id == source_id && o.is_exported());
        if !exported {
            return None;
        }
        let id = self.mapping.get(source_id)?;
        self.connectivities.iter().find(|r| r.id == id)
    }
}

/// Sections of one group, in processing order.
#[derive(Debug, Clone, Default)]
pub struct GroupOutput<'a> {
    pub sections: Vec<KindSection<'a>>,
}

impl<'a> GroupOutput<'a> {
    pub fn connectivities(&self) -> impl Iterator<Item = &ConnectivityRecord> {
        self.sections.iter().flat_map(|s| s.connectivities.iter())
    }

    pub fn assignments(&self) -> impl Iterator<Item = &AssignmentRecord> {
        self.sections.iter().flat_map(|s| s.assignments.iter())
    }

    pub fn section(&self, kind: impl Into<ElementKind>) -> Option<&KindSection<'a>> {
        let kind = kind.into();
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn tally(&self) -> OutcomeTally {
        let mut total = OutcomeTally::default();
        for section in &self.sections {
            total.merge(&section.tally());
        }
        total
    }
}

fn run_kind<'a, E, P>(
    ctx: &GroupContext<'a>,
    store: &mut PointStore,
    kind: ElementKind,
    elements: &'a [E],
    properties: &'a [P],
    hosts: Option<&'a [AreaElement]>,
) -> KindSection<'a>
where
    E: AssignmentSource,
    P: NamedEntity,
{
    let model = ctx.model;
    let mut connectivity = ConnectivityBuilder::new(kind);
    connectivity.add_all(store, elements);

    let mut assignment = AssignmentBuilder::new(kind);
    assignment
        .set_data(elements, &model.layout.levels, properties)
        .set_diaphragm(ctx.diaphragm);
    if let Some(hosts) = hosts {
        assignment.set_hosts(hosts);
    }
    let assigned =
        assignment.export_assignments(connectivity.id_mapping(), ctx.stories, ctx.resolver);

    let (connectivities, mapping) = connectivity.into_parts();
    let section = KindSection {
        kind,
        connectivities,
        mapping,
        assignments: assigned.records,
        outcomes: assigned.outcomes,
    };
    tracing::debug!(
        kind = %kind,
        records = section.connectivities.len(),
        assignments = section.assignments.len(),
        outcomes = %section.tally(),
        "kind processed"
    );
    section
}

/// Runs floors, walls and openings.
pub struct AreaGroup<'a> {
    ctx: GroupContext<'a>,
}

impl<'a> AreaGroup<'a> {
    pub fn new(ctx: GroupContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn run(&self, store: &mut PointStore) -> GroupOutput<'a> {
        let model = self.ctx.model;
        let elements = &model.elements;
        let props = &model.properties;
        let sections = AreaKind::ORDER
            .iter()
            .map(|&kind| match kind {
                AreaKind::Floor => run_kind(
                    &self.ctx,
                    store,
                    kind.into(),
                    &elements.floors,
                    &props.floor_properties,
                    None,
                ),
                AreaKind::Wall => run_kind(
                    &self.ctx,
                    store,
                    kind.into(),
                    &elements.walls,
                    &props.wall_properties,
                    None,
                ),
                AreaKind::Opening => run_kind(
                    &self.ctx,
                    store,
                    kind.into(),
                    &elements.openings,
                    &[] as &[FloorProperty],
                    Some(elements.floors.as_slice()),
                ),
            })
            .collect();
        GroupOutput { sections }
    }
}

/// Runs columns, beams and braces.
pub struct LineGroup<'a> {
    ctx: GroupContext<'a>,
}

impl<'a> LineGroup<'a> {
    pub fn new(ctx: GroupContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn run(&self, store: &mut PointStore) -> GroupOutput<'a> {
        let model = self.ctx.model;
        let elements = &model.elements;
        let frames = &model.properties.frame_properties;
        let sections = LineKind::ORDER
            .iter()
            .map(|&kind| {
                let members = match kind {
                    LineKind::Column => &elements.columns,
                    LineKind::Beam => &elements.beams,
                    LineKind::Brace => &elements.braces,
                };
                run_kind(&self.ctx, store, kind.into(), members, frames, None)
            })
            .collect();
        GroupOutput { sections }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point_store::DedupConfig;
    use crate::resolver::ContainsStoryResolver;

    const MODEL: &str = r#"{
        "layout": { "levels": [
            { "id": "L1", "name": "Level 1", "elevation": 0.0 },
            { "id": "L2", "name": "Level 2", "elevation": 12.0 }
        ] },
        "properties": {
            "frame_properties": [{ "id": "FP1", "name": "W14X90" }],
            "floor_properties": [{ "id": "S1", "name": "Slab8" }],
            "wall_properties": [{ "id": "WP1", "name": "Wall12" }]
        },
        "elements": {
            "columns": [{ "id": "c", "start_point": {"x": 0.0, "y": 0.0},
                "end_point": {"x": 0.0, "y": 0.0}, "level_id": "L2",
                "frame_property_id": "FP1" }],
            "beams": [{ "id": "b", "start_point": {"x": 0.1, "y": 0.0},
                "end_point": {"x": 20.0, "y": 0.0}, "level_id": "L2",
                "frame_property_id": "FP1" }],
            "floors": [{ "id": "f", "points": [{"x": 0.0, "y": 0.0},
                {"x": 20.0, "y": 0.0}, {"x": 20.0, "y": 20.0}, {"x": 0.0, "y": 20.0}],
                "level_id": "L2", "property_id": "S1" }],
            "walls": [{ "id": "w", "points": [{"x": 0.0, "y": 0.01},
                {"x": 20.0, "y": 0.0}, {"x": 20.0, "y": 0.5}],
                "level_id": "L1", "property_id": "WP1" }],
            "openings": [{ "id": "o", "points": [{"x": 5.0, "y": 5.0},
                {"x": 8.0, "y": 5.0}, {"x": 8.0, "y": 8.0}], "floor_id": "f" }]
        }
    }"#;

    fn stories() -> Vec<String> {
        vec!["Story Level 1".to_string(), "Story Level 2".to_string()]
    }

    #[test]
    fn lines_then_areas_share_points() {
        let model = CanonicalModel::from_json(MODEL).unwrap();
        let stories = stories();
        let ctx = GroupContext {
            model: &model,
            stories: &stories,
            resolver: &ContainsStoryResolver,
            diaphragm: Some("D1"),
        };
        let mut store = PointStore::new(DedupConfig::default()).unwrap();

        let lines = LineGroup::new(ctx).run(&mut store);
        let areas = AreaGroup::new(ctx).run(&mut store);

        let kinds: Vec<_> = lines.sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LineKind::Column.into(),
                LineKind::Beam.into(),
                LineKind::Brace.into()
            ]
        );
        let kinds: Vec<_> = areas.sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AreaKind::Floor.into(),
                AreaKind::Wall.into(),
                AreaKind::Opening.into()
            ]
        );

        // Column base, beam start, floor corner and wall corner coincide.
        let column = &lines.section(LineKind::Column).unwrap().connectivities[0];
        let beam = &lines.section(LineKind::Beam).unwrap().connectivities[0];
        let floor = &areas.section(AreaKind::Floor).unwrap().connectivities[0];
        let wall = &areas.section(AreaKind::Wall).unwrap().connectivities[0];
        assert_eq!(column.point_ids[0], beam.point_ids[0]);
        assert_eq!(floor.point_ids[0], column.point_ids[0]);
        assert_eq!(wall.point_ids[0], column.point_ids[0]);

        assert_eq!(lines.tally().exported, 2);
        assert_eq!(areas.tally().exported, 3);
        assert_eq!(areas.assignments().count(), 3);
        let opening = &areas.section(AreaKind::Opening).unwrap().assignments[0];
        assert!(opening.is_opening());
        assert_eq!(opening.story, "Story Level 2");

        let floors = areas.section(AreaKind::Floor).unwrap();
        assert_eq!(floors.exported_shape("f"), Some(floor));
        assert_eq!(floors.exported_shape("missing"), None);
    }

    #[test]
    fn empty_model_yields_empty_sections() {
        let model = CanonicalModel::default();
        let ctx = GroupContext {
            model: &model,
            stories: &[],
            resolver: &ContainsStoryResolver,
            diaphragm: None,
        };
        let mut store = PointStore::new(DedupConfig::default()).unwrap();
        let out = AreaGroup::new(ctx).run(&mut store);
        assert_eq!(out.sections.len(), 3);
        assert_eq!(out.connectivities().count(), 0);
        assert_eq!(out.tally().total(), 0);
        assert!(store.is_empty());
    }
}
