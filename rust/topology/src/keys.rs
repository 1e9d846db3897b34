// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier and element-kind types.
//!
//! Point and element identifiers are small typed values that render as the
//! short labels written to the target format (`"12"`, `"F3"`, `"OP1"`).

use std::fmt;

/// Identifier of a deduplicated point. Renders as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(u32);

impl PointId {
    /// Reserved id for a missing point. Never stored.
    pub const NULL: PointId = PointId(0);

    pub(crate) fn from_index(index: usize) -> Self {
        PointId(index as u32 + 1)
    }

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Position of this point in the store's insertion order.
    pub(crate) fn index(self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Area element kinds, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AreaKind {
    Floor,
    Wall,
    Opening,
}

impl AreaKind {
    /// Floors precede openings because openings resolve their level through
    /// the parent floor.
    pub const ORDER: [AreaKind; 3] = [AreaKind::Floor, AreaKind::Wall, AreaKind::Opening];

    pub fn prefix(self) -> &'static str {
        match self {
            AreaKind::Floor => "F",
            AreaKind::Wall => "W",
            AreaKind::Opening => "OP",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AreaKind::Floor => "Floor",
            AreaKind::Wall => "Wall",
            AreaKind::Opening => "Opening",
        }
    }
}

/// Line element kinds, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LineKind {
    Column,
    Beam,
    Brace,
}

impl LineKind {
    /// Columns first so shared endpoints are registered before beams and
    /// braces reach them.
    pub const ORDER: [LineKind; 3] = [LineKind::Column, LineKind::Beam, LineKind::Brace];

    pub fn prefix(self) -> &'static str {
        match self {
            LineKind::Column => "C",
            LineKind::Beam => "B",
            LineKind::Brace => "D",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineKind::Column => "Column",
            LineKind::Beam => "Beam",
            LineKind::Brace => "Brace",
        }
    }
}

/// Discriminant for every exported element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    Area(AreaKind),
    Line(LineKind),
}

impl ElementKind {
    pub fn prefix(self) -> &'static str {
        match self {
            ElementKind::Area(k) => k.prefix(),
            ElementKind::Line(k) => k.prefix(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Area(k) => k.as_str(),
            ElementKind::Line(k) => k.as_str(),
        }
    }

    pub fn is_area(self) -> bool {
        matches!(self, ElementKind::Area(_))
    }

    /// Minimum number of vertices an element of this kind needs.
    pub fn min_vertices(self) -> usize {
        match self {
            ElementKind::Area(_) => 3,
            ElementKind::Line(_) => 2,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AreaKind> for ElementKind {
    fn from(k: AreaKind) -> Self {
        ElementKind::Area(k)
    }
}

impl From<LineKind> for ElementKind {
    fn from(k: LineKind) -> Self {
        ElementKind::Line(k)
    }
}

/// Identifier of an emitted element: kind prefix plus a per-kind counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    kind: ElementKind,
    index: u32,
}

impl ElementId {
    pub(crate) fn new(kind: ElementKind, index: u32) -> Self {
        Self { kind, index }
    }

    pub fn kind(self) -> ElementKind {
        self.kind
    }

    pub fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_ids_render_as_numbers() {
        assert_eq!(PointId::NULL.to_string(), "0");
        assert_eq!(PointId::from_index(0).to_string(), "1");
        assert_eq!(PointId::from_index(41).to_string(), "42");
        assert!(PointId::NULL.is_null());
        assert_eq!(PointId::NULL.index(), None);
    }

    #[test]
    fn element_ids_carry_kind_prefix() {
        let id = ElementId::new(AreaKind::Opening.into(), 3);
        assert_eq!(id.to_string(), "OP3");
        assert_eq!(ElementId::new(LineKind::Brace.into(), 1).to_string(), "D1");
    }

    #[test]
    fn processing_orders() {
        assert_eq!(LineKind::ORDER[0], LineKind::Column);
        assert_eq!(AreaKind::ORDER[2], AreaKind::Opening);
    }

    #[test]
    fn min_vertices_per_kind() {
        assert_eq!(ElementKind::Area(AreaKind::Wall).min_vertices(), 3);
        assert_eq!(ElementKind::Line(LineKind::Beam).min_vertices(), 2);
    }
}
