// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Load patterns, load cases and load combinations.

use rustc_hash::FxHashMap;
use structlink_model::{LoadCombination, LoadDefinition, LoadType};

use crate::error::Result;
use crate::writer::E2kWriter;

pub const SEISMIC_X: &str = "EQX";
pub const SEISMIC_Y: &str = "EQY";

/// One `LOADPATTERN` line. Each pattern also gets a same-named load case.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadPattern {
    pub name: String,
    pub load_type: LoadType,
    pub self_weight: f64,
}

impl LoadPattern {
    pub fn new(name: impl Into<String>, load_type: LoadType, self_weight: f64) -> Self {
        Self {
            name: name.into(),
            load_type,
            self_weight,
        }
    }
}

impl From<&LoadDefinition> for LoadPattern {
    fn from(def: &LoadDefinition) -> Self {
        Self::new(def.name.clone(), def.load_type, def.self_weight)
    }
}

/// Patterns written when the model defines none.
pub fn default_patterns() -> Vec<LoadPattern> {
    vec![
        LoadPattern::new("Dead", LoadType::Dead, 1.0),
        LoadPattern::new("Live", LoadType::Live, 0.0),
        LoadPattern::new("Super Dead", LoadType::SuperDead, 0.0),
        LoadPattern::new(SEISMIC_X, LoadType::Seismic, 0.0),
        LoadPattern::new(SEISMIC_Y, LoadType::Seismic, 0.0),
    ]
}

/// Patterns for `definitions`, or the defaults when there are none.
///
/// Seismic X and Y patterns are always present; missing ones are appended.
pub fn resolve_patterns(definitions: &[LoadDefinition]) -> Vec<LoadPattern> {
    if definitions.is_empty() {
        return default_patterns();
    }

    let mut patterns: Vec<LoadPattern> = definitions.iter().map(LoadPattern::from).collect();
    for name in [SEISMIC_X, SEISMIC_Y] {
        if !patterns.iter().any(|p| p.name.eq_ignore_ascii_case(name)) {
            tracing::debug!(pattern = name, "seismic pattern added");
            patterns.push(LoadPattern::new(name, LoadType::Seismic, 0.0));
        }
    }
    patterns
}

pub fn write_patterns(w: &mut E2kWriter, patterns: &[LoadPattern]) -> Result<()> {
    for p in patterns {
        w.load_pattern(&p.name, p.load_type.e2k_token(), p.self_weight)?;
    }
    Ok(())
}

pub fn write_cases(w: &mut E2kWriter, patterns: &[LoadPattern]) -> Result<()> {
    for p in patterns {
        w.load_case(&p.name, &p.name)?;
    }
    Ok(())
}

/// Writes combinations whose factors reference known load definitions.
/// Returns the number of combinations written.
pub fn write_combinations(
    w: &mut E2kWriter,
    combinations: &[LoadCombination],
    definitions: &[LoadDefinition],
) -> Result<usize> {
    let names: FxHashMap<&str, &str> = definitions
        .iter()
        .map(|d| (d.id.as_str(), d.name.as_str()))
        .collect();

    let mut written = 0;
    for combo in combinations {
        let factors: Vec<(&str, f64)> = combo
            .factors
            .iter()
            .filter_map(|f| match names.get(f.load_definition_id.as_str()) {
                Some(&case) => Some((case, f.factor)),
                None => {
                    tracing::debug!(
                        combination = %combo.name,
                        load = %f.load_definition_id,
                        "unknown load definition, factor dropped"
                    );
                    None
                }
            })
            .collect();
        if factors.is_empty() {
            continue;
        }

        w.combo_header(&combo.name)?;
        for (case, factor) in factors {
            w.combo_factor(&combo.name, case, factor)?;
        }
        written += 1;
    }
    Ok(written)
}
