// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Load definitions, surface loads and load combinations.

use serde::{Deserialize, Serialize};

/// Load pattern classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadType {
    Dead,
    SuperDead,
    Live,
    Seismic,
    Wind,
    Other,
}

impl LoadType {
    /// Pattern type token used by E2K `LOADPATTERN` lines.
    pub fn e2k_token(self) -> &'static str {
        match self {
            LoadType::Dead => "Dead",
            LoadType::SuperDead => "Super Dead",
            LoadType::Live => "Live",
            LoadType::Seismic => "Seismic",
            LoadType::Wind => "Wind",
            LoadType::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadDefinition {
    pub id: String,
    pub name: String,
    pub load_type: LoadType,
    /// Self-weight multiplier; non-zero only for the self-weight dead pattern.
    #[serde(default)]
    pub self_weight: f64,
}

/// Uniform area load set assigned to floors, in force per length squared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceLoad {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub dead: f64,
    #[serde(default)]
    pub superimposed_dead: f64,
    #[serde(default)]
    pub live: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadFactor {
    pub load_definition_id: String,
    pub factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCombination {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub factors: Vec<LoadFactor>,
}

/// The loads section of a canonical model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Loads {
    #[serde(default)]
    pub load_definitions: Vec<LoadDefinition>,
    #[serde(default)]
    pub surface_loads: Vec<SurfaceLoad>,
    #[serde(default)]
    pub load_combinations: Vec<LoadCombination>,
}
