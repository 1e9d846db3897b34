// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line-level E2K formatting.
//!
//! One method per record type. Coordinates, heights and elevations are
//! written with two decimals.

use std::fmt::Write;

use structlink_model::Point2D;
use structlink_topology::{
    AreaKind, AssignmentRecord, ConnectivityRecord, ElementKind, LineKind, PointId,
};

use crate::error::Result;

/// Section marker names, in output order.
pub mod section {
    pub const CONTROLS: &str = "CONTROLS";
    pub const STORIES: &str = "STORIES - IN SEQUENCE FROM TOP";
    pub const DIAPHRAGMS: &str = "DIAPHRAGM NAMES";
    pub const POINTS: &str = "POINT COORDINATES";
    pub const LINE_CONNECTIVITIES: &str = "LINE CONNECTIVITIES";
    pub const AREA_CONNECTIVITIES: &str = "AREA CONNECTIVITIES";
    pub const LINE_ASSIGNS: &str = "LINE ASSIGNS";
    pub const AREA_ASSIGNS: &str = "AREA ASSIGNS";
    pub const LOAD_PATTERNS: &str = "LOAD PATTERNS";
    pub const LOAD_CASES: &str = "LOAD CASES";
    pub const LOAD_COMBINATIONS: &str = "LOAD COMBINATIONS";
}

/// Token following `LINE "<id>"`.
pub fn line_token(kind: LineKind) -> &'static str {
    match kind {
        LineKind::Column => "COLUMN",
        LineKind::Beam => "BEAM",
        LineKind::Brace => "BRACE",
    }
}

/// Number of stories a line spans: columns and braces reach down one story.
pub fn line_story_span(kind: LineKind) -> u8 {
    match kind {
        LineKind::Beam => 0,
        LineKind::Column | LineKind::Brace => 1,
    }
}

/// Story span of the vertex at `index` of an area with `count` vertices.
///
/// Walls list their base edge first: the first half of their vertices sit
/// one story down, the rest on the assigned story. Floors and openings lie
/// flat on the story.
pub fn area_story_span(kind: AreaKind, index: usize, count: usize) -> u8 {
    match kind {
        AreaKind::Wall if index < count / 2 => 1,
        AreaKind::Wall | AreaKind::Floor | AreaKind::Opening => 0,
    }
}

/// Token following `AREA "<id>"`. Openings are floor-type areas.
pub fn area_token(kind: AreaKind) -> &'static str {
    match kind {
        AreaKind::Wall => "PANEL",
        AreaKind::Floor | AreaKind::Opening => "FLOOR",
    }
}

/// Accumulates E2K text.
#[derive(Debug, Default)]
pub struct E2kWriter {
    out: String,
}

impl E2kWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a section with its `$ NAME` marker. A blank line separates it
    /// from the previous one.
    pub fn section(&mut self, name: &str) -> Result<()> {
        if !self.out.is_empty() {
            writeln!(self.out)?;
        }
        writeln!(self.out, "$ {name}")?;
        Ok(())
    }

    pub fn units(&mut self, force: &str, length: &str) -> Result<()> {
        writeln!(self.out, "UNITS \"{force}\" \"{length}\"")?;
        Ok(())
    }

    pub fn story_height(&mut self, name: &str, height: f64) -> Result<()> {
        writeln!(self.out, "STORY \"{name}\" HEIGHT {height:.2}")?;
        Ok(())
    }

    pub fn story_elevation(&mut self, name: &str, elevation: f64) -> Result<()> {
        writeln!(self.out, "STORY \"{name}\" ELEV {elevation:.2}")?;
        Ok(())
    }

    pub fn diaphragm(&mut self, name: &str) -> Result<()> {
        writeln!(self.out, "DIAPHRAGM \"{name}\" TYPE RIGID")?;
        Ok(())
    }

    pub fn point(&mut self, id: PointId, point: &Point2D) -> Result<()> {
        writeln!(self.out, "POINT \"{id}\" {:.2} {:.2}", point.x, point.y)?;
        Ok(())
    }

    /// Writes a `LINE` or `AREA` record depending on the record's kind.
    pub fn connectivity(&mut self, record: &ConnectivityRecord) -> Result<()> {
        match record.kind() {
            ElementKind::Line(kind) => {
                write!(self.out, "LINE \"{}\" {}", record.id, line_token(kind))?;
                for p in &record.point_ids {
                    write!(self.out, " \"{p}\"")?;
                }
                writeln!(self.out, " {}", line_story_span(kind))?;
            }
            ElementKind::Area(kind) => {
                write!(
                    self.out,
                    "AREA \"{}\" {} {}",
                    record.id,
                    area_token(kind),
                    record.point_ids.len()
                )?;
                for p in &record.point_ids {
                    write!(self.out, " \"{p}\"")?;
                }
                let count = record.point_ids.len();
                for index in 0..count {
                    write!(self.out, " {}", area_story_span(kind, index, count))?;
                }
                self.out.push('\n');
            }
        }
        Ok(())
    }

    /// Writes a `LINEASSIGN` or `AREAASSIGN` record.
    pub fn assignment(&mut self, record: &AssignmentRecord) -> Result<()> {
        let keyword = if record.id.kind().is_area() {
            "AREAASSIGN"
        } else {
            "LINEASSIGN"
        };
        write!(self.out, "{keyword} \"{}\" \"{}\"", record.id, record.story)?;
        if record.is_opening() {
            self.out.push_str(" OPENING \"Yes\"");
        } else if let Some(property) = &record.property {
            write!(self.out, " SECTION \"{property}\"")?;
        }
        if let Some(name) = record.diaphragm() {
            write!(self.out, " DIAPH \"{name}\"")?;
        }
        self.out.push('\n');
        Ok(())
    }

    pub fn load_pattern(&mut self, name: &str, kind: &str, self_weight: f64) -> Result<()> {
        writeln!(
            self.out,
            "LOADPATTERN \"{name}\" TYPE \"{kind}\" SELFWEIGHT {self_weight}"
        )?;
        Ok(())
    }

    /// A linear static case applying one pattern at unit scale.
    pub fn load_case(&mut self, name: &str, pattern: &str) -> Result<()> {
        writeln!(
            self.out,
            "LOADCASE \"{name}\" TYPE \"Linear Static\" INITCOND \"PRESET\""
        )?;
        writeln!(self.out, "LOADCASE \"{name}\" LOADPAT \"{pattern}\" SF 1")?;
        Ok(())
    }

    pub fn combo_header(&mut self, name: &str) -> Result<()> {
        writeln!(self.out, "COMBO \"{name}\" TYPE \"Linear Add\"")?;
        Ok(())
    }

    pub fn combo_factor(&mut self, name: &str, case: &str, factor: f64) -> Result<()> {
        writeln!(self.out, "COMBO \"{name}\" LOADCASE \"{case}\" SF {factor}")?;
        Ok(())
    }

    /// Appends caller-supplied text verbatim, newline-terminated.
    pub fn raw(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        self.out.push_str(text);
        if !text.ends_with('\n') {
            self.out.push('\n');
        }
    }

    pub fn finish(self) -> String {
        self.out
    }
}
