// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structural elements of the canonical model.
//!
//! Geometry is optional everywhere: the canonical schema allows elements
//! whose coordinates were never resolved. Converters skip such elements
//! instead of failing.

use serde::{Deserialize, Serialize};

use crate::geometry::Point2D;

/// A beam, column or brace.
///
/// Columns are vertical, so both endpoints usually share the same plan
/// coordinates; the level is the level at the top of the member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameMember {
    pub id: String,
    #[serde(default)]
    pub start_point: Option<Point2D>,
    #[serde(default)]
    pub end_point: Option<Point2D>,
    pub level_id: String,
    pub frame_property_id: String,
}

/// A wall or floor described by its plan polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaElement {
    pub id: String,
    #[serde(default)]
    pub points: Option<Vec<Point2D>>,
    pub level_id: String,
    pub property_id: String,
    #[serde(default)]
    pub surface_load_id: Option<String>,
}

/// A hole in a floor. Openings reference their parent floor instead of a
/// level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    pub id: String,
    #[serde(default)]
    pub points: Option<Vec<Point2D>>,
    pub floor_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footing {
    pub id: String,
    #[serde(default)]
    pub point: Option<Point2D>,
    pub level_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub id: String,
    #[serde(default)]
    pub point: Option<Point2D>,
}

/// The elements section of a canonical model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Elements {
    #[serde(default)]
    pub beams: Vec<FrameMember>,
    #[serde(default)]
    pub columns: Vec<FrameMember>,
    #[serde(default)]
    pub braces: Vec<FrameMember>,
    #[serde(default)]
    pub walls: Vec<AreaElement>,
    #[serde(default)]
    pub floors: Vec<AreaElement>,
    #[serde(default)]
    pub openings: Vec<Opening>,
    #[serde(default)]
    pub footings: Vec<Footing>,
    #[serde(default)]
    pub joints: Vec<Joint>,
}

impl Elements {
    /// Total number of elements across all kinds.
    pub fn len(&self) -> usize {
        self.beams.len()
            + self.columns.len()
            + self.braces.len()
            + self.walls.len()
            + self.floors.len()
            + self.openings.len()
            + self.footings.len()
            + self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn scale_lengths(&mut self, factor: f64) {
        let scale_opt = |p: &mut Option<Point2D>| *p = p.map(|p| p.scaled(factor));
        let scale_list = |pts: &mut Option<Vec<Point2D>>| {
            if let Some(pts) = pts {
                for p in pts.iter_mut() {
                    *p = p.scaled(factor);
                }
            }
        };

        for m in self
            .beams
            .iter_mut()
            .chain(self.columns.iter_mut())
            .chain(self.braces.iter_mut())
        {
            scale_opt(&mut m.start_point);
            scale_opt(&mut m.end_point);
        }
        for a in self.walls.iter_mut().chain(self.floors.iter_mut()) {
            scale_list(&mut a.points);
        }
        for o in &mut self.openings {
            scale_list(&mut o.points);
        }
        for f in &mut self.footings {
            scale_opt(&mut f.point);
        }
        for j in &mut self.joints {
            scale_opt(&mut j.point);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_geometry_deserializes_as_none() {
        let beam: FrameMember = serde_json::from_str(
            r#"{"id":"B1","level_id":"L1","frame_property_id":"FP1"}"#,
        )
        .unwrap();
        assert!(beam.start_point.is_none());
        assert!(beam.end_point.is_none());
    }

    #[test]
    fn scale_touches_every_kind() {
        let mut elements = Elements {
            floors: vec![AreaElement {
                id: "F1".into(),
                points: Some(vec![Point2D::new(1.0, 2.0)]),
                level_id: "L1".into(),
                property_id: "S1".into(),
                surface_load_id: None,
            }],
            joints: vec![Joint {
                id: "J1".into(),
                point: Some(Point2D::new(3.0, 0.0)),
            }],
            ..Default::default()
        };
        elements.scale_lengths(2.0);

        assert_eq!(
            elements.floors[0].points.as_ref().unwrap()[0],
            Point2D::new(2.0, 4.0)
        );
        assert_eq!(elements.joints[0].point, Some(Point2D::new(6.0, 0.0)));
        assert_eq!(elements.len(), 2);
    }
}
