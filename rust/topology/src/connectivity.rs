// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connectivity records: the point ids that bound each emitted element.
//!
//! Area shapes are deduplicated per kind by a canonical key built from their
//! sorted snapped vertices, so two polygons with the same corners in a
//! different traversal order share one record. Lines are never merged.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use structlink_model::{AreaElement, FrameMember, Opening, Point2D};

use crate::keys::{AreaKind, ElementId, ElementKind, LineKind, PointId};
use crate::point_store::{PointKey, PointStore};

/// Geometry an element contributes to connectivity.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    Polygon(Option<&'a [Point2D]>),
    Segment(Option<Point2D>, Option<Point2D>),
}

/// Elements that can be encoded as a connectivity record.
pub trait ConnectivitySource {
    fn source_id(&self) -> &str;
    fn shape(&self) -> Shape<'_>;
}

impl ConnectivitySource for FrameMember {
    fn source_id(&self) -> &str {
        &self.id
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Segment(self.start_point, self.end_point)
    }
}

impl ConnectivitySource for AreaElement {
    fn source_id(&self) -> &str {
        &self.id
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Polygon(self.points.as_deref())
    }
}

impl ConnectivitySource for Opening {
    fn source_id(&self) -> &str {
        &self.id
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Polygon(self.points.as_deref())
    }
}

/// One emitted element and its ordered point ids.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectivityRecord {
    pub id: ElementId,
    pub point_ids: SmallVec<[PointId; 4]>,
}

impl ConnectivityRecord {
    pub fn kind(&self) -> ElementKind {
        self.id.kind()
    }
}

/// Source element id to emitted id, for one element kind.
#[derive(Debug, Clone)]
pub struct IdMapping {
    kind: ElementKind,
    entries: FxHashMap<String, ElementId>,
}

impl IdMapping {
    pub fn new(kind: impl Into<ElementKind>) -> Self {
        Self {
            kind: kind.into(),
            entries: FxHashMap::default(),
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn get(&self, source_id: &str) -> Option<ElementId> {
        self.entries.get(source_id).copied()
    }

    pub fn contains(&self, source_id: &str) -> bool {
        self.entries.contains_key(source_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ElementId)> {
        self.entries.iter().map(|(k, &v)| (k.as_str(), v))
    }

    fn insert(&mut self, source_id: &str, id: ElementId) {
        self.entries.insert(source_id.to_string(), id);
    }
}

type ShapeKey = SmallVec<[PointKey; 8]>;

/// Builds connectivity records for one element kind.
///
/// Ids are `<prefix><n>` with `n` counting from 1 per builder.
#[derive(Debug)]
pub struct ConnectivityBuilder {
    kind: ElementKind,
    next_index: u32,
    shapes: FxHashMap<ShapeKey, ElementId>,
    records: Vec<ConnectivityRecord>,
    mapping: IdMapping,
    skipped: usize,
}

impl ConnectivityBuilder {
    pub fn new(kind: impl Into<ElementKind>) -> Self {
        let kind = kind.into();
        Self {
            kind,
            next_index: 0,
            shapes: FxHashMap::default(),
            records: Vec::new(),
            mapping: IdMapping::new(kind),
            skipped: 0,
        }
    }

    pub fn area(kind: AreaKind) -> Self {
        Self::new(kind)
    }

    pub fn line(kind: LineKind) -> Self {
        Self::new(kind)
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Encodes one element. Returns `None` when the element was skipped.
    pub fn add<E: ConnectivitySource + ?Sized>(
        &mut self,
        store: &mut PointStore,
        element: &E,
    ) -> Option<ElementId> {
        let source_id = element.source_id();
        let id = match (self.kind, element.shape()) {
            (ElementKind::Area(_), Shape::Polygon(points)) => {
                self.add_polygon(store, source_id, points)
            }
            (ElementKind::Line(_), Shape::Segment(start, end)) => {
                self.add_segment(store, source_id, start, end)
            }
            _ => {
                tracing::debug!(
                    element = source_id,
                    kind = %self.kind,
                    "shape does not match element kind, skipped"
                );
                None
            }
        };

        match id {
            Some(id) => self.mapping.insert(source_id, id),
            None => self.skipped += 1,
        }
        id
    }

    /// Encodes every element in order.
    pub fn add_all<'a, E, I>(&mut self, store: &mut PointStore, elements: I)
    where
        E: ConnectivitySource + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        for element in elements {
            self.add(store, element);
        }
    }

    fn add_polygon(
        &mut self,
        store: &mut PointStore,
        source_id: &str,
        points: Option<&[Point2D]>,
    ) -> Option<ElementId> {
        let points = match points {
            Some(points) if points.len() >= self.kind.min_vertices() => points,
            Some(points) => {
                tracing::debug!(
                    element = source_id,
                    vertices = points.len(),
                    "too few vertices, skipped"
                );
                return None;
            }
            None => {
                tracing::debug!(element = source_id, "no geometry, skipped");
                return None;
            }
        };
        if points.iter().any(|p| !p.is_finite()) {
            tracing::debug!(element = source_id, "non-finite vertex, skipped");
            return None;
        }

        // Canonical shape key: sorted snapped vertices (order-independent)
        let grid = store.config().grid_size;
        let mut key: ShapeKey = points
            .iter()
            .map(|p| PointKey::from_point(p, grid))
            .collect();
        key.sort_unstable();

        if let Some(&existing) = self.shapes.get(&key) {
            tracing::debug!(element = source_id, shared = %existing, "duplicate shape");
            return Some(existing);
        }

        let id = self.mint();
        let point_ids = points
            .iter()
            .map(|p| store.get_or_create_id(Some(*p)))
            .collect();
        self.shapes.insert(key, id);
        self.records.push(ConnectivityRecord { id, point_ids });
        Some(id)
    }

    fn add_segment(
        &mut self,
        store: &mut PointStore,
        source_id: &str,
        start: Option<Point2D>,
        end: Option<Point2D>,
    ) -> Option<ElementId> {
        let (start, end) = match (start, end) {
            (Some(s), Some(e)) if s.is_finite() && e.is_finite() => (s, e),
            _ => {
                tracing::debug!(element = source_id, "missing endpoint, skipped");
                return None;
            }
        };

        let id = self.mint();
        let mut point_ids = SmallVec::new();
        point_ids.push(store.get_or_create_id(Some(start)));
        point_ids.push(store.get_or_create_id(Some(end)));
        self.records.push(ConnectivityRecord { id, point_ids });
        Some(id)
    }

    fn mint(&mut self) -> ElementId {
        self.next_index += 1;
        ElementId::new(self.kind, self.next_index)
    }

    pub fn records(&self) -> &[ConnectivityRecord] {
        &self.records
    }

    pub fn id_mapping(&self) -> &IdMapping {
        &self.mapping
    }

    /// Number of elements skipped for unusable geometry.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn into_parts(self) -> (Vec<ConnectivityRecord>, IdMapping) {
        (self.records, self.mapping)
    }
}
