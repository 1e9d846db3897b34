// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit system of a canonical model.
//!
//! All coordinates and elevations inside one model are expressed in a single
//! resolved length unit. Converters scale into their target unit with
//! [`LengthUnit::conversion_factor`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Length units understood by the converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Inch,
    #[default]
    Foot,
    Millimeter,
    Centimeter,
    Meter,
}

impl LengthUnit {
    /// Number of meters in one unit.
    #[inline]
    pub fn meters_per_unit(self) -> f64 {
        match self {
            LengthUnit::Inch => 0.0254,
            LengthUnit::Foot => 0.3048,
            LengthUnit::Millimeter => 1e-3,
            LengthUnit::Centimeter => 1e-2,
            LengthUnit::Meter => 1.0,
        }
    }

    /// Multiplier that converts a value in `self` into `target`.
    #[inline]
    pub fn conversion_factor(self, target: LengthUnit) -> f64 {
        if self == target {
            1.0
        } else {
            self.meters_per_unit() / target.meters_per_unit()
        }
    }

    /// Unit token used in the E2K `UNITS` line.
    pub fn e2k_token(self) -> &'static str {
        match self {
            LengthUnit::Inch => "IN",
            LengthUnit::Foot => "FT",
            LengthUnit::Millimeter => "MM",
            LengthUnit::Centimeter => "CM",
            LengthUnit::Meter => "M",
        }
    }

    /// Parses a unit name such as `"ft"`, `"feet"`, `"mm"` or `"meter"`.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "in" | "inch" | "inches" => Ok(LengthUnit::Inch),
            "ft" | "foot" | "feet" => Ok(LengthUnit::Foot),
            "mm" | "millimeter" | "millimeters" | "millimetre" => Ok(LengthUnit::Millimeter),
            "cm" | "centimeter" | "centimeters" | "centimetre" => Ok(LengthUnit::Centimeter),
            "m" | "meter" | "meters" | "metre" => Ok(LengthUnit::Meter),
            _ => Err(Error::UnknownLengthUnit(name.to_string())),
        }
    }
}

/// Force units understood by the converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceUnit {
    #[default]
    Kip,
    Pound,
    Kilonewton,
    Newton,
}

impl ForceUnit {
    /// Unit token used in the E2K `UNITS` line.
    pub fn e2k_token(self) -> &'static str {
        match self {
            ForceUnit::Kip => "KIP",
            ForceUnit::Pound => "LB",
            ForceUnit::Kilonewton => "KN",
            ForceUnit::Newton => "N",
        }
    }
}

/// Unit system of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Units {
    #[serde(default)]
    pub length: LengthUnit,
    #[serde(default)]
    pub force: ForceUnit,
}
