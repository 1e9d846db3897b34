// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tolerance-aware point pool.
//!
//! Every coordinate is snapped to a fixed grid and the snapped key is used as
//! the hash key. When the grid is finer than the merge tolerance, the
//! neighboring keys are probed so that points closer than the tolerance
//! still collapse onto one id.

use rustc_hash::FxHashMap;
use structlink_model::Point2D;

use crate::error::{Error, Result};
use crate::keys::PointId;

/// Grid and tolerance used to merge coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DedupConfig {
    /// Rounding grid. Must not exceed `tolerance`.
    pub grid_size: f64,
    /// Two points merge when both normalized deltas are below this value.
    pub tolerance: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            grid_size: 0.25,
            tolerance: 0.25,
        }
    }
}

impl DedupConfig {
    /// Grid and tolerance both set to `tolerance`.
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            grid_size: tolerance,
            tolerance,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.grid_size) || !positive(self.tolerance) {
            return Err(Error::NonFiniteTolerance {
                grid: self.grid_size,
                tolerance: self.tolerance,
            });
        }
        if self.grid_size > self.tolerance {
            return Err(Error::InvalidTolerance {
                grid: self.grid_size,
                tolerance: self.tolerance,
            });
        }
        Ok(())
    }

    /// Number of neighboring grid cells that can hold a point within
    /// tolerance. Zero when grid and tolerance coincide.
    fn probe_radius(&self) -> i64 {
        ((self.tolerance / self.grid_size).ceil() as i64 - 1).max(0)
    }
}

/// A point snapped to the dedup grid, in grid units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointKey {
    pub ix: i64,
    pub iy: i64,
}

impl PointKey {
    pub fn from_point(point: &Point2D, grid_size: f64) -> Self {
        Self {
            ix: (point.x / grid_size).round() as i64,
            iy: (point.y / grid_size).round() as i64,
        }
    }

    /// The snapped coordinate this key stands for.
    pub fn to_point(self, grid_size: f64) -> Point2D {
        Point2D::new(self.ix as f64 * grid_size, self.iy as f64 * grid_size)
    }

    /// True when both normalized deltas are strictly below the tolerance.
    pub fn within_tolerance(self, other: PointKey, config: &DedupConfig) -> bool {
        let dx = (self.ix - other.ix).abs() as f64 * config.grid_size;
        let dy = (self.iy - other.iy).abs() as f64 * config.grid_size;
        dx < config.tolerance && dy < config.tolerance
    }

    fn offset(self, dx: i64, dy: i64) -> Self {
        Self {
            ix: self.ix + dx,
            iy: self.iy + dy,
        }
    }
}

/// Pool of deduplicated points for one conversion.
///
/// Ids start at `"1"` and are never renumbered; `"0"` is reserved for
/// missing points.
#[derive(Debug)]
pub struct PointStore {
    config: DedupConfig,
    probe_radius: i64,
    index: FxHashMap<PointKey, PointId>,
    /// Snapped coordinates, indexed by `PointId` minus one.
    points: Vec<Point2D>,
    requests: usize,
}

impl PointStore {
    pub fn new(config: DedupConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            probe_radius: config.probe_radius(),
            config,
            index: FxHashMap::default(),
            points: Vec::new(),
            requests: 0,
        })
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Returns the id for `point`, minting a new one when no stored point is
    /// within tolerance.
    ///
    /// `None` and non-finite coordinates map to [`PointId::NULL`] and are not
    /// stored.
    pub fn get_or_create_id(&mut self, point: Option<Point2D>) -> PointId {
        let point = match point {
            Some(p) if p.is_finite() => p,
            Some(p) => {
                tracing::debug!(x = p.x, y = p.y, "non-finite point mapped to null id");
                return PointId::NULL;
            }
            None => return PointId::NULL,
        };
        self.requests += 1;

        let key = PointKey::from_point(&point, self.config.grid_size);
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        if let Some(id) = self.find_neighbor(key) {
            return id;
        }

        let id = PointId::from_index(self.points.len());
        self.points.push(key.to_point(self.config.grid_size));
        self.index.insert(key, id);
        id
    }

    /// Earliest-minted id among neighboring keys within tolerance.
    fn find_neighbor(&self, key: PointKey) -> Option<PointId> {
        let r = self.probe_radius;
        if r == 0 {
            return None;
        }

        let mut best: Option<PointId> = None;
        for dx in -r..=r {
            for dy in -r..=r {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let candidate = key.offset(dx, dy);
                if let Some(&id) = self.index.get(&candidate) {
                    if candidate.within_tolerance(key, &self.config)
                        && best.map_or(true, |b| id < b)
                    {
                        best = Some(id);
                    }
                }
            }
        }
        best
    }

    /// The snapped coordinate stored under `id`.
    pub fn get(&self, id: PointId) -> Option<Point2D> {
        id.index().and_then(|i| self.points.get(i)).copied()
    }

    /// `(id, snapped point)` pairs in insertion order.
    pub fn export(&self) -> impl Iterator<Item = (PointId, Point2D)> + '_ {
        self.points
            .iter()
            .enumerate()
            .map(|(i, &p)| (PointId::from_index(i), p))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of non-null point-producing calls since the last reset.
    pub fn request_count(&self) -> usize {
        self.requests
    }

    /// Clears all points for a new conversion. The configuration is kept.
    pub fn reset(&mut self) {
        self.index.clear();
        self.points.clear();
        self.requests = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn store() -> PointStore {
        PointStore::new(DedupConfig::default()).unwrap()
    }

    fn p(x: f64, y: f64) -> Option<Point2D> {
        Some(Point2D::new(x, y))
    }

    #[test]
    fn null_point_maps_to_sentinel() {
        let mut s = store();
        assert_eq!(s.get_or_create_id(None), PointId::NULL);
        assert_eq!(s.get_or_create_id(None).to_string(), "0");
        assert!(s.is_empty());
        assert_eq!(s.request_count(), 0);
    }

    #[test]
    fn non_finite_point_maps_to_sentinel() {
        let mut s = store();
        assert_eq!(s.get_or_create_id(p(f64::NAN, 1.0)), PointId::NULL);
        assert!(s.is_empty());
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let mut s = store();
        assert_eq!(s.get_or_create_id(p(0.0, 0.0)).to_string(), "1");
        assert_eq!(s.get_or_create_id(p(10.0, 0.0)).to_string(), "2");
        assert_eq!(s.get_or_create_id(p(10.0, 10.0)).to_string(), "3");
    }

    #[test]
    fn close_points_reuse_id() {
        let mut s = store();
        let a = s.get_or_create_id(p(0.0, 0.0));
        let b = s.get_or_create_id(p(0.0, 0.01));
        let c = s.get_or_create_id(p(-0.1, 0.1));
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(s.len(), 1);
        assert_eq!(s.request_count(), 3);
    }

    #[test]
    fn distinct_keys_get_distinct_ids() {
        let mut s = store();
        let a = s.get_or_create_id(p(0.0, 0.0));
        let b = s.get_or_create_id(p(0.2, 0.0));
        assert_ne!(a, b);
    }

    #[test]
    fn export_yields_snapped_points_in_order() {
        let mut s = store();
        s.get_or_create_id(p(1.1, 2.0));
        s.get_or_create_id(p(5.0, 4.9));
        let out: Vec<_> = s.export().collect();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].0.to_string(), "1");
        assert_relative_eq!(out[0].1.x, 1.0);
        assert_relative_eq!(out[1].1.y, 5.0);
    }

    #[test]
    fn get_returns_stored_point() {
        let mut s = store();
        let id = s.get_or_create_id(p(3.0, 4.0));
        assert_eq!(s.get(id), Some(Point2D::new(3.0, 4.0)));
        assert_eq!(s.get(PointId::NULL), None);
    }

    #[test]
    fn reset_restarts_numbering() {
        let mut s = store();
        s.get_or_create_id(p(1.0, 1.0));
        s.get_or_create_id(p(2.0, 2.0));
        s.reset();
        assert!(s.is_empty());
        assert_eq!(s.request_count(), 0);
        assert_eq!(s.get_or_create_id(p(2.0, 2.0)).to_string(), "1");
    }

    #[test]
    fn fine_grid_probes_neighbors() {
        let config = DedupConfig {
            grid_size: 0.01,
            tolerance: 0.05,
        };
        let mut s = PointStore::new(config).unwrap();
        let a = s.get_or_create_id(p(1.0, 1.0));
        let b = s.get_or_create_id(p(1.03, 0.98));
        let c = s.get_or_create_id(p(1.1, 1.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn neighbor_probe_prefers_earliest_id() {
        let config = DedupConfig {
            grid_size: 0.25,
            tolerance: 0.75,
        };
        let mut s = PointStore::new(config).unwrap();
        let first = s.get_or_create_id(p(0.0, 0.0));
        let second = s.get_or_create_id(p(1.0, 0.0));
        assert_ne!(first, second);
        // Equidistant from both stored points.
        assert_eq!(s.get_or_create_id(p(0.5, 0.0)), first);
        assert_eq!(s.get_or_create_id(p(1.5, 0.0)), second);
        // Exactly one tolerance away from the first point.
        assert_ne!(s.get_or_create_id(p(0.0, 0.75)), first);
    }

    #[test]
    fn within_tolerance_is_strict() {
        let config = DedupConfig::default();
        let a = PointKey { ix: 0, iy: 0 };
        assert!(a.within_tolerance(a, &config));
        assert!(!a.within_tolerance(PointKey { ix: 1, iy: 0 }, &config));
    }

    #[test]
    fn coarse_grid_is_rejected() {
        let err = PointStore::new(DedupConfig {
            grid_size: 0.5,
            tolerance: 0.25,
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidTolerance { .. }));
    }

    #[test]
    fn non_positive_values_are_rejected() {
        for (grid, tolerance) in [(0.0, 0.25), (0.25, -1.0), (f64::NAN, 0.25)] {
            let err = DedupConfig {
                grid_size: grid,
                tolerance,
            }
            .validate()
            .unwrap_err();
            assert!(matches!(err, Error::NonFiniteTolerance { .. }));
        }
    }

    #[test]
    fn probe_radius_matches_ratio() {
        assert_eq!(DedupConfig::default().probe_radius(), 0);
        let c = DedupConfig {
            grid_size: 0.25,
            tolerance: 1.0,
        };
        assert_eq!(c.probe_radius(), 3);
        let c = DedupConfig {
            grid_size: 0.25,
            tolerance: 0.6,
        };
        assert_eq!(c.probe_radius(), 2);
    }
}
