// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The top-level canonical model.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::elements::Elements;
use crate::error::{Error, Result};
use crate::layout::ModelLayout;
use crate::loads::Loads;
use crate::properties::Properties;
use crate::units::{LengthUnit, Units};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub units: Units,
}

/// A complete canonical building model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalModel {
    #[serde(default)]
    pub project: ProjectInfo,
    #[serde(default)]
    pub layout: ModelLayout,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub elements: Elements,
    #[serde(default)]
    pub loads: Loads,
}

impl CanonicalModel {
    /// Decodes a model from canonical JSON and checks id uniqueness.
    pub fn from_json(json: &str) -> Result<Self> {
        let model: CanonicalModel = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that ids are unique within each category.
    pub fn validate(&self) -> Result<()> {
        fn unique<'a>(
            category: &'static str,
            ids: impl IntoIterator<Item = &'a str>,
        ) -> Result<()> {
            let mut seen = FxHashSet::default();
            for id in ids {
                if !seen.insert(id) {
                    return Err(Error::DuplicateId {
                        category,
                        id: id.to_string(),
                    });
                }
            }
            Ok(())
        }

        let layout = &self.layout;
        unique("level", layout.levels.iter().map(|l| l.id.as_str()))?;
        unique("floor type", layout.floor_types.iter().map(|f| f.id.as_str()))?;
        unique("grid", layout.grids.iter().map(|g| g.id.as_str()))?;

        let props = &self.properties;
        unique("material", props.materials.iter().map(|m| m.id.as_str()))?;
        unique(
            "frame property",
            props.frame_properties.iter().map(|p| p.id.as_str()),
        )?;
        unique(
            "floor property",
            props.floor_properties.iter().map(|p| p.id.as_str()),
        )?;
        unique(
            "wall property",
            props.wall_properties.iter().map(|p| p.id.as_str()),
        )?;

        let el = &self.elements;
        unique(
            "frame member",
            el.beams
                .iter()
                .chain(&el.columns)
                .chain(&el.braces)
                .map(|m| m.id.as_str()),
        )?;
        unique(
            "area element",
            el.walls.iter().chain(&el.floors).map(|a| a.id.as_str()),
        )?;
        unique("opening", el.openings.iter().map(|o| o.id.as_str()))?;

        unique(
            "load definition",
            self.loads.load_definitions.iter().map(|d| d.id.as_str()),
        )?;
        Ok(())
    }

    /// Returns a copy with every length expressed in `unit`.
    pub fn with_length_unit(&self, unit: LengthUnit) -> CanonicalModel {
        let factor = self.project.units.length.conversion_factor(unit);
        let mut scaled = self.clone();
        scaled.project.units.length = unit;
        if factor != 1.0 {
            scaled.layout.scale_lengths(factor);
            scaled.properties.scale_lengths(factor);
            scaled.elements.scale_lengths(factor);
        }
        scaled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SMALL_MODEL: &str = r#"{
        "project": { "name": "Demo", "units": { "length": "foot", "force": "kip" } },
        "layout": {
            "levels": [
                { "id": "L1", "name": "Level 1", "elevation": 0.0 },
                { "id": "L2", "name": "Level 2", "elevation": 12.0 }
            ]
        },
        "elements": {
            "beams": [
                {
                    "id": "B1",
                    "start_point": { "x": 0.0, "y": 0.0 },
                    "end_point": { "x": 20.0, "y": 0.0 },
                    "level_id": "L2",
                    "frame_property_id": "FP1"
                }
            ]
        }
    }"#;

    #[test]
    fn decodes_partial_model() {
        let model = CanonicalModel::from_json(SMALL_MODEL).unwrap();
        assert_eq!(model.project.name, "Demo");
        assert_eq!(model.layout.levels.len(), 2);
        assert_eq!(model.elements.beams.len(), 1);
        assert!(model.elements.floors.is_empty());
        assert!(model.loads.load_definitions.is_empty());
    }

    #[test]
    fn duplicate_level_ids_are_rejected() {
        let json = r#"{ "layout": { "levels": [
            { "id": "L1", "name": "a", "elevation": 0.0 },
            { "id": "L1", "name": "b", "elevation": 1.0 }
        ] } }"#;
        let err = CanonicalModel::from_json(json).unwrap_err();
        assert!(matches!(err, Error::DuplicateId { category: "level", .. }));
    }

    #[test]
    fn converts_feet_to_inches() {
        let model = CanonicalModel::from_json(SMALL_MODEL).unwrap();
        let inches = model.with_length_unit(LengthUnit::Inch);

        assert_eq!(inches.project.units.length, LengthUnit::Inch);
        assert_relative_eq!(inches.layout.levels[1].elevation, 144.0, epsilon = 1e-9);
        let end = inches.elements.beams[0].end_point.unwrap();
        assert_relative_eq!(end.x, 240.0, epsilon = 1e-9);
    }

    #[test]
    fn json_roundtrip_preserves_model() {
        let model = CanonicalModel::from_json(SMALL_MODEL).unwrap();
        let again = CanonicalModel::from_json(&model.to_json().unwrap()).unwrap();
        assert_eq!(model, again);
    }
}
