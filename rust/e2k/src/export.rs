// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Whole-model E2K export.

use std::fmt;

use structlink_model::CanonicalModel;
use structlink_topology::{
    AreaGroup, ContainsStoryResolver, DedupConfig, ElementKind, GroupContext, GroupOutput,
    LineGroup, OutcomeTally, PointStore, StoryResolver,
};

use crate::error::{Error, Result};
use crate::loads;
use crate::stories::StoryTable;
use crate::writer::{section, E2kWriter};

/// Export settings.
#[derive(Debug, Clone)]
pub struct E2kOptions {
    pub dedup: DedupConfig,
    /// Prepended to every level name to form its story name.
    pub story_prefix: String,
    /// Rigid diaphragm assigned to floors. `None` leaves floors unassigned.
    pub diaphragm: Option<String>,
    /// Raw E2K text appended after the generated sections.
    pub custom_text: Option<String>,
}

impl Default for E2kOptions {
    fn default() -> Self {
        Self {
            dedup: DedupConfig::default(),
            story_prefix: String::new(),
            diaphragm: Some("D1".to_string()),
            custom_text: None,
        }
    }
}

/// Counts of what an export wrote and skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportSummary {
    pub stories: usize,
    pub points: usize,
    pub lines: usize,
    pub areas: usize,
    pub line_assignments: usize,
    pub area_assignments: usize,
    pub load_patterns: usize,
    pub load_combinations: usize,
    /// Per-kind outcomes, lines first, each group in processing order.
    pub outcomes: Vec<(ElementKind, OutcomeTally)>,
}

impl ExportSummary {
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

impl fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Exported {} stories, {} points, {} lines, {} areas, {} line assignments, \
             {} area assignments, {} load patterns, {} load combinations",
            self.stories,
            self.points,
            self.lines,
            self.areas,
            self.line_assignments,
            self.area_assignments,
            self.load_patterns,
            self.load_combinations
        )?;
        for (kind, tally) in &self.outcomes {
            if tally.total() > 0 {
                writeln!(f, "  {kind}: {tally}")?;
            }
        }
        Ok(())
    }
}

/// Output of one export.
#[derive(Debug, Clone)]
pub struct E2kDocument {
    pub text: String,
    pub summary: ExportSummary,
}

/// Converts a canonical model into E2K text.
///
/// Each call to [`export`](Self::export) uses a fresh point store, so ids
/// restart at 1 for every document.
pub struct E2kExporter {
    options: E2kOptions,
    resolver: Box<dyn StoryResolver>,
}

impl E2kExporter {
    pub fn new(options: E2kOptions) -> Self {
        Self {
            options,
            resolver: Box::new(ContainsStoryResolver),
        }
    }

    /// Replaces the level-to-story matcher.
    pub fn with_resolver(mut self, resolver: impl StoryResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn options(&self) -> &E2kOptions {
        &self.options
    }

    pub fn export(&self, model: &CanonicalModel) -> Result<E2kDocument> {
        let mut store = PointStore::new(self.options.dedup)?;
        if model.layout.levels.iter().any(|l| !l.elevation.is_finite()) {
            return Err(Error::Precondition(
                "level elevations must be finite".to_string(),
            ));
        }
        tracing::info!(
            project = %model.project.name,
            elements = model.elements.len(),
            levels = model.layout.levels.len(),
            "starting E2K export"
        );

        let stories = StoryTable::from_levels(&model.layout.levels, &self.options.story_prefix);
        let diaphragm = self.options.diaphragm.as_deref().filter(|d| !d.is_empty());
        let ctx = GroupContext {
            model,
            stories: stories.names(),
            resolver: self.resolver.as_ref(),
            diaphragm,
        };
        // Lines first so column endpoints own the shared point ids.
        let lines = LineGroup::new(ctx).run(&mut store);
        let areas = AreaGroup::new(ctx).run(&mut store);

        let patterns = loads::resolve_patterns(&model.loads.load_definitions);
        let mut summary = ExportSummary {
            stories: stories.len(),
            points: store.len(),
            lines: lines.connectivities().count(),
            areas: areas.connectivities().count(),
            line_assignments: lines.assignments().count(),
            area_assignments: areas.assignments().count(),
            load_patterns: patterns.len(),
            load_combinations: 0,
            outcomes: outcomes(&lines).chain(outcomes(&areas)).collect(),
        };

        let mut w = E2kWriter::new();
        w.section(section::CONTROLS)?;
        let units = &model.project.units;
        w.units(units.force.e2k_token(), units.length.e2k_token())?;

        w.section(section::STORIES)?;
        stories.write(&mut w)?;

        if let Some(name) = diaphragm {
            w.section(section::DIAPHRAGMS)?;
            w.diaphragm(name)?;
        }

        w.section(section::POINTS)?;
        for (id, point) in store.export() {
            w.point(id, &point)?;
        }

        w.section(section::LINE_CONNECTIVITIES)?;
        for record in lines.connectivities() {
            w.connectivity(record)?;
        }
        w.section(section::AREA_CONNECTIVITIES)?;
        for record in areas.connectivities() {
            w.connectivity(record)?;
        }

        w.section(section::LINE_ASSIGNS)?;
        for record in lines.assignments() {
            w.assignment(record)?;
        }
        w.section(section::AREA_ASSIGNS)?;
        for record in areas.assignments() {
            w.assignment(record)?;
        }

        w.section(section::LOAD_PATTERNS)?;
        loads::write_patterns(&mut w, &patterns)?;
        w.section(section::LOAD_CASES)?;
        loads::write_cases(&mut w, &patterns)?;

        if !model.loads.load_combinations.is_empty() {
            w.section(section::LOAD_COMBINATIONS)?;
            summary.load_combinations = loads::write_combinations(
                &mut w,
                &model.loads.load_combinations,
                &model.loads.load_definitions,
            )?;
        }

        if let Some(text) = &self.options.custom_text {
            w.raw(text);
        }

        let skipped = summary.skipped();
        if skipped > 0 {
            tracing::warn!(skipped, "some elements were not exported");
        }
        tracing::info!(
            points = summary.points,
            lines = summary.lines,
            areas = summary.areas,
            "E2K export finished"
        );

        Ok(E2kDocument {
            text: w.finish(),
            summary,
        })
    }
}

fn outcomes<'g>(
    group: &'g GroupOutput<'_>,
) -> impl Iterator<Item = (ElementKind, OutcomeTally)> + 'g {
    group.sections.iter().map(|s| (s.kind, s.tally()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use structlink_topology::{AreaKind, LineKind};

    #[test]
    fn default_options() {
        let o = E2kOptions::default();
        assert_eq!(o.dedup, DedupConfig::default());
        assert_eq!(o.diaphragm.as_deref(), Some("D1"));
        assert!(o.story_prefix.is_empty());
    }

    #[test]
    fn invalid_tolerance_is_rejected() {
        let exporter = E2kExporter::new(E2kOptions {
            dedup: DedupConfig {
                grid_size: 1.0,
                tolerance: 0.1,
            },
            ..Default::default()
        });
        let err = exporter.export(&CanonicalModel::default()).unwrap_err();
        assert!(matches!(err, Error::Topology(_)));
    }

    #[test]
    fn empty_model_still_has_base_story_and_loads() {
        let doc = E2kExporter::new(E2kOptions::default())
            .export(&CanonicalModel::default())
            .unwrap();
        assert!(doc.text.starts_with("$ CONTROLS\nUNITS \"KIP\" \"FT\"\n"));
        assert!(doc.text.contains("STORY \"Base\" ELEV 0.00\n"));
        assert!(doc.text.contains("LOADPATTERN \"EQY\" TYPE \"Seismic\" SELFWEIGHT 0\n"));
        assert!(!doc.text.contains("$ LOAD COMBINATIONS"));
        assert_eq!(doc.summary.points, 0);
        assert_eq!(doc.summary.stories, 1);
        assert_eq!(doc.summary.load_patterns, 5);
        assert_eq!(doc.summary.outcomes.len(), 6);
        assert_eq!(doc.summary.outcomes[0].0, LineKind::Column.into());
        assert_eq!(doc.summary.outcomes[3].0, AreaKind::Floor.into());
    }

    #[test]
    fn summary_display_lists_kinds_with_elements() {
        let tally = OutcomeTally {
            exported: 2,
            missing_level: 1,
            ..Default::default()
        };
        let summary = ExportSummary {
            points: 4,
            lines: 2,
            outcomes: vec![
                (LineKind::Beam.into(), tally),
                (LineKind::Brace.into(), OutcomeTally::default()),
            ],
            ..Default::default()
        };
        let text = summary.to_string();
        assert!(text.starts_with("Exported 0 stories, 4 points, 2 lines"));
        assert!(text.contains("  Beam: 2 exported, 1 skipped (mapping 0, level 1, property 0)\n"));
        assert!(!text.contains("Brace"));
        assert_eq!(summary.skipped(), 1);
    }
}
