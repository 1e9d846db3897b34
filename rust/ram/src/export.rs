// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical model to RAM.
//!
//! Translation order: materials, sections, floor types, stories, layout
//! (columns, beams, braces, floors, walls, openings), surface loads. Catalog
//! failures abort the export; a layout object RAM rejects is logged and
//! counted.

use std::fmt;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use structlink_model::{
    CanonicalModel, LevelSequence, Point2D, SurfaceLoad, GROUND_ELEVATION_TOLERANCE,
};
use structlink_topology::{
    AreaGroup, AreaKind, ConnectivityRecord, DedupConfig, ElementId, ElementKind, ExactStoryResolver,
    GroupContext, KindSection, LineGroup, OutcomeTally, PointId, PointStore,
};

use crate::api::{self, RamDatabase, RamLoadValues, RamModel, RamStory, RamUid, RAM_LENGTH_UNIT};
use crate::error::{Error, Result};
use crate::levels::GROUND_NAME;
use crate::reconcile::{Category, Degradation, IdentifierReconciler};
use crate::session::RamSession;

/// Multiplier applied to surface load magnitudes before they reach RAM.
///
/// Fragile: matches the unit handling of the RAM release the exporter was
/// calibrated against and must be rechecked when RAM is upgraded.
pub const RAM_SURFACE_LOAD_CORRECTION: f64 = 144_000.0;

#[derive(Debug, Clone)]
pub struct RamExportOptions {
    /// Point dedup, in inches.
    pub dedup: DedupConfig,
    /// Multiply surface loads by [`RAM_SURFACE_LOAD_CORRECTION`].
    pub correct_surface_loads: bool,
}

impl Default for RamExportOptions {
    fn default() -> Self {
        Self {
            dedup: DedupConfig::default(),
            correct_surface_loads: true,
        }
    }
}

/// Objects created in RAM and elements left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RamExportSummary {
    pub materials: usize,
    pub sections: usize,
    pub floor_types: usize,
    pub stories: usize,
    pub members: usize,
    pub areas: usize,
    pub surface_loads: usize,
    /// Layout objects RAM rejected.
    pub native_failures: usize,
    pub outcomes: Vec<(ElementKind, OutcomeTally)>,
    pub degradations: Vec<Degradation>,
}

impl RamExportSummary {
    pub fn tally(&self, kind: impl Into<ElementKind>) -> Option<OutcomeTally> {
        let kind = kind.into();
        self.outcomes
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, t)| *t)
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().map(|(_, t)| t.skipped()).sum()
    }
}

impl fmt::Display for RamExportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Created {} materials, {} sections, {} floor types, {} stories, {} members, \
             {} areas, {} surface loads",
            self.materials,
            self.sections,
            self.floor_types,
            self.stories,
            self.members,
            self.areas,
            self.surface_loads
        )?;
        for (kind, tally) in &self.outcomes {
            if tally.total() > 0 {
                writeln!(f, "  {kind}: {tally}")?;
            }
        }
        if self.native_failures > 0 {
            writeln!(f, "  {} objects rejected by RAM", self.native_failures)?;
        }
        for degradation in &self.degradations {
            writeln!(f, "  {degradation}")?;
        }
        Ok(())
    }
}

/// Outcome of a whole conversion, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub success: bool,
    pub message: String,
}

impl ConversionReport {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "succeeded" } else { "failed" };
        write!(f, "Conversion {status}: {}", self.message)
    }
}

/// Writes canonical models into RAM.
#[derive(Debug, Clone, Default)]
pub struct RamExporter {
    options: RamExportOptions,
}

/// Floor type per story name, plus the story names in ascending order.
#[derive(Default)]
struct StoryLayout {
    names: Vec<String>,
    floor_types: FxHashMap<String, RamUid>,
}

impl StoryLayout {
    fn insert(&mut self, name: &str, floor_type: RamUid) {
        self.floor_types.insert(name.to_string(), floor_type);
        self.names.push(name.to_string());
    }
}

impl RamExporter {
    pub fn new(options: RamExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RamExportOptions {
        &self.options
    }

    /// Creates a database at `path`, exports `model` into it and saves.
    ///
    /// The database is closed on every path; nothing is saved on failure.
    pub fn convert<D: RamDatabase + ?Sized>(
        &self,
        model: &CanonicalModel,
        db: &mut D,
        path: &Path,
    ) -> ConversionReport {
        match self.convert_inner(model, db, path) {
            Ok(summary) => ConversionReport::succeeded(summary.to_string()),
            Err(err) => {
                tracing::error!(error = %err, path = %path.display(), "RAM conversion failed");
                ConversionReport::failed(err.to_string())
            }
        }
    }

    fn convert_inner<D: RamDatabase + ?Sized>(
        &self,
        model: &CanonicalModel,
        db: &mut D,
        path: &Path,
    ) -> Result<RamExportSummary> {
        let mut session = RamSession::create(db, path)?;
        let summary = self.export(model, session.model_mut()?)?;
        session.finish()?;
        Ok(summary)
    }

    /// Exports `model` into an open RAM model.
    pub fn export(&self, model: &CanonicalModel, ram: &mut dyn RamModel) -> Result<RamExportSummary> {
        let mut store = PointStore::new(self.options.dedup)?;
        if model.layout.levels.iter().any(|l| !l.elevation.is_finite()) {
            return Err(Error::Precondition(
                "level elevations must be finite".to_string(),
            ));
        }
        let model = model.with_length_unit(RAM_LENGTH_UNIT);
        tracing::info!(
            project = %model.project.name,
            elements = model.elements.len(),
            levels = model.layout.levels.len(),
            "starting RAM export"
        );

        let mut reconciler = IdentifierReconciler::build(&model, ram);
        let mut summary = RamExportSummary::default();

        self.export_materials(&model, ram, &mut reconciler, &mut summary)?;
        self.export_sections(&model, ram, &mut reconciler, &mut summary)?;
        self.export_floor_types(&model, ram, &mut reconciler, &mut summary)?;
        let stories = self.export_stories(&model, ram, &mut reconciler, &mut summary)?;

        let resolver = ExactStoryResolver;
        let ctx = GroupContext {
            model: &model,
            stories: &stories.names,
            resolver: &resolver,
            diaphragm: None,
        };
        let lines = LineGroup::new(ctx).run(&mut store);
        let areas = AreaGroup::new(ctx).run(&mut store);

        let mut placed = FxHashSet::default();
        for section in lines.sections.iter().chain(&areas.sections) {
            summary.outcomes.push((section.kind, section.tally()));
            self.export_layout(
                &model,
                section,
                &store,
                &stories,
                ram,
                &mut reconciler,
                &mut placed,
                &mut summary,
            )?;
        }

        if let Some(floors) = areas.section(AreaKind::Floor) {
            self.export_surface_loads(&model, floors, &stories, &store, ram, &mut summary)?;
        }

        summary.degradations = reconciler.degradations().to_vec();
        let skipped = summary.skipped();
        if skipped > 0 {
            tracing::warn!(skipped, "some elements were not exported");
        }
        tracing::info!(
            members = summary.members,
            areas = summary.areas,
            failures = summary.native_failures,
            "RAM export finished"
        );
        Ok(summary)
    }

    fn export_materials(
        &self,
        model: &CanonicalModel,
        ram: &mut dyn RamModel,
        reconciler: &mut IdentifierReconciler,
        summary: &mut RamExportSummary,
    ) -> Result<()> {
        for material in &model.properties.materials {
            if reconciler.native_id_for(Category::Material, &material.id).is_some() {
                continue;
            }
            let uid = ram.add_material(&material.name, material.kind)?;
            reconciler.link(Category::Material, material.id.clone(), uid);
            summary.materials += 1;
        }
        Ok(())
    }

    fn export_sections(
        &self,
        model: &CanonicalModel,
        ram: &mut dyn RamModel,
        reconciler: &mut IdentifierReconciler,
        summary: &mut RamExportSummary,
    ) -> Result<()> {
        for property in &model.properties.frame_properties {
            if reconciler.native_id_for(Category::FrameSection, &property.id).is_some() {
                continue;
            }
            let material = match &property.material_id {
                Some(id) => match reconciler.resolve_or_default(Category::Material, id) {
                    Ok(uid) => Some(uid),
                    Err(Error::MissingDefault(_)) => {
                        tracing::debug!(section = %property.name, "no material to assign");
                        None
                    }
                    Err(err) => return Err(err),
                },
                None => None,
            };
            let uid = ram.add_section(&property.name, material)?;
            reconciler.link(Category::FrameSection, property.id.clone(), uid);
            summary.sections += 1;
        }
        Ok(())
    }

    fn export_floor_types(
        &self,
        model: &CanonicalModel,
        ram: &mut dyn RamModel,
        reconciler: &mut IdentifierReconciler,
        summary: &mut RamExportSummary,
    ) -> Result<()> {
        for floor_type in &model.layout.floor_types {
            if reconciler.native_id_for(Category::FloorType, &floor_type.id).is_some() {
                continue;
            }
            let uid = ram.add_floor_type(&floor_type.name)?;
            reconciler.link(Category::FloorType, floor_type.id.clone(), uid);
            summary.floor_types += 1;
        }
        Ok(())
    }

    /// Adds a story for every level above ground, bottom up.
    ///
    /// A level without a floor type gets its own, named after the level.
    /// Stories that already exist keep their native floor type. A level below
    /// ground falls back to the ground, and a level at the elevation of a
    /// story already present joins that story; both are degradations.
    fn export_stories(
        &self,
        model: &CanonicalModel,
        ram: &mut dyn RamModel,
        reconciler: &mut IdentifierReconciler,
        summary: &mut RamExportSummary,
    ) -> Result<StoryLayout> {
        let sequence = LevelSequence::from_levels(&model.layout.levels);
        let mut present: Vec<RamStory> = api::stories(ram).collect();

        let mut layout = StoryLayout::default();
        for level in sequence.levels() {
            if level.elevation <= GROUND_ELEVATION_TOLERANCE {
                if !level.is_ground() {
                    reconciler.degrade(Category::Story, &level.id, GROUND_NAME.to_string());
                }
                continue;
            }
            if let Some(uid) = reconciler.native_id_for(Category::Story, &level.id) {
                let native = present.iter().find(|s| s.uid == uid).ok_or_else(|| {
                    Error::Native(format!("story {uid} vanished from the model"))
                })?;
                layout.insert(&level.name, native.floor_type);
                continue;
            }
            if let Some(native) = present
                .iter()
                .find(|s| (s.elevation - level.elevation).abs() <= GROUND_ELEVATION_TOLERANCE)
            {
                reconciler.degrade(Category::Story, &level.id, native.name.clone());
                layout.insert(&level.name, native.floor_type);
                continue;
            }

            let floor_type = match &level.floor_type_id {
                Some(id) => reconciler.resolve_or_default(Category::FloorType, id)?,
                None => {
                    let uid = ram.add_floor_type(&level.name)?;
                    summary.floor_types += 1;
                    uid
                }
            };
            let uid = ram.add_story(&level.name, floor_type, level.elevation)?;
            reconciler.link(Category::Story, level.id.clone(), uid);
            summary.stories += 1;
            present = api::stories(ram).collect();
            layout.insert(&level.name, floor_type);
        }
        tracing::debug!(stories = layout.names.len(), "stories exported");
        Ok(layout)
    }

    #[allow(clippy::too_many_arguments)]
    fn export_layout(
        &self,
        model: &CanonicalModel,
        section: &KindSection<'_>,
        store: &PointStore,
        stories: &StoryLayout,
        ram: &mut dyn RamModel,
        reconciler: &mut IdentifierReconciler,
        placed: &mut FxHashSet<(ElementId, RamUid)>,
        summary: &mut RamExportSummary,
    ) -> Result<()> {
        let shapes: FxHashMap<ElementId, &ConnectivityRecord> = section
            .connectivities
            .iter()
            .map(|r| (r.id, r))
            .collect();
        let section_ids: FxHashMap<&str, &str> = model
            .properties
            .frame_properties
            .iter()
            .rev()
            .map(|p| (p.name.as_str(), p.id.as_str()))
            .collect();

        for record in &section.assignments {
            let (Some(&floor_type), Some(shape)) =
                (stories.floor_types.get(&record.story), shapes.get(&record.id))
            else {
                continue;
            };
            // Stories sharing a floor type share its layout.
            if !placed.insert((record.id, floor_type)) {
                continue;
            }
            let points: Vec<Point2D> = shape
                .point_ids
                .iter()
                .filter_map(|&p| store.get(p))
                .collect();

            let added = match record.id.kind() {
                ElementKind::Line(kind) => {
                    let &[start, end] = points.as_slice() else {
                        continue;
                    };
                    let property = record.property.as_deref().unwrap_or_default();
                    let property_id = section_ids.get(property).copied().unwrap_or(property);
                    let section_uid =
                        reconciler.resolve_or_default(Category::FrameSection, property_id)?;
                    ram.add_member(floor_type, kind, section_uid, start, end)
                        .map(|_| summary.members += 1)
                }
                ElementKind::Area(kind) => ram
                    .add_area(floor_type, kind, record.property.as_deref(), &points)
                    .map(|_| summary.areas += 1),
            };
            if let Err(err) = added {
                tracing::warn!(element = %record.id, story = %record.story, error = %err, "RAM rejected element");
                summary.native_failures += 1;
            }
        }
        Ok(())
    }

    /// One surface load per exported floor polygon and floor type. Floors
    /// that collapsed onto the same shape carry their load once.
    fn export_surface_loads(
        &self,
        model: &CanonicalModel,
        floors: &KindSection<'_>,
        stories: &StoryLayout,
        store: &PointStore,
        ram: &mut dyn RamModel,
        summary: &mut RamExportSummary,
    ) -> Result<()> {
        let loads: FxHashMap<&str, &SurfaceLoad> = model
            .loads
            .surface_loads
            .iter()
            .rev()
            .map(|l| (l.id.as_str(), l))
            .collect();
        let scale = if self.options.correct_surface_loads {
            RAM_SURFACE_LOAD_CORRECTION
        } else {
            1.0
        };
        let mut load_sets: FxHashMap<&str, RamUid> = FxHashMap::default();
        let mut placed: FxHashSet<(RamUid, &str, Vec<PointId>)> = FxHashSet::default();

        for floor in &model.elements.floors {
            let Some(load_id) = floor.surface_load_id.as_deref() else {
                continue;
            };
            let Some(load) = loads.get(load_id) else {
                tracing::debug!(floor = %floor.id, load = load_id, "unknown surface load");
                continue;
            };
            let Some(shape) = floors.exported_shape(&floor.id) else {
                continue;
            };
            let Some(&floor_type) = model
                .layout
                .level(&floor.level_id)
                .and_then(|level| stories.floor_types.get(&level.name))
            else {
                continue;
            };
            let points: Vec<Point2D> = shape
                .point_ids
                .iter()
                .filter_map(|&id| store.get(id))
                .collect();
            let mut key = shape.point_ids.to_vec();
            key.sort_unstable();
            if !placed.insert((floor_type, load_id, key)) {
                continue;
            }

            let load_set = match load_sets.get(load_id) {
                Some(&uid) => uid,
                None => {
                    let values = RamLoadValues {
                        dead: load.dead * scale,
                        superimposed_dead: load.superimposed_dead * scale,
                        live: load.live * scale,
                    };
                    let uid = ram.add_surface_load_set(&load.name, values)?;
                    load_sets.insert(load_id, uid);
                    uid
                }
            };
            match ram.add_surface_load(floor_type, load_set, &points) {
                Ok(_) => summary.surface_loads += 1,
                Err(err) => {
                    tracing::warn!(floor = %floor.id, error = %err, "RAM rejected surface load");
                    summary.native_failures += 1;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_display() {
        assert_eq!(
            ConversionReport::failed("cannot open").to_string(),
            "Conversion failed: cannot open"
        );
        assert!(ConversionReport::succeeded("ok").success);
    }

    #[test]
    fn default_options_correct_loads() {
        let options = RamExportOptions::default();
        assert!(options.correct_surface_loads);
        assert_eq!(options.dedup, DedupConfig::default());
    }

    #[test]
    fn summary_lists_failures_and_degradations() {
        let summary = RamExportSummary {
            members: 2,
            native_failures: 1,
            degradations: vec![Degradation {
                category: Category::FloorType,
                key: "FT-9".to_string(),
                fallback: "3".to_string(),
            }],
            ..Default::default()
        };
        let text = summary.to_string();
        assert!(text.starts_with("Created 0 materials, 0 sections"));
        assert!(text.contains("  1 objects rejected by RAM\n"));
        assert!(text.contains("  floor type 'FT-9' unresolved, using '3'\n"));
    }
}
