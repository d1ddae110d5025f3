//! Category Vocabularies and Casing Rules

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vehicle class served by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    /// Battery-electric vehicle
    Ev,
    /// Hydrogen fuel-cell vehicle
    Hv,
}

impl VehicleClass {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Ev => "ev",
            VehicleClass::Hv => "hv",
        }
    }

    /// Target column of the training/evaluation CSV
    pub fn target_column(&self) -> &'static str {
        match self {
            VehicleClass::Ev => "electric_range_km",
            VehicleClass::Hv => "range_in_km",
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ev" => Ok(VehicleClass::Ev),
            "hv" => Ok(VehicleClass::Hv),
            other => Err(format!("unknown vehicle class '{}', expected 'ev' or 'hv'", other)),
        }
    }
}

/// Ambient temperature bucket, ordinal-encoded for the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbientTemp {
    Cold,
    Mild,
    Hot,
}

impl AmbientTemp {
    /// Human-readable vocabulary for error messages
    pub const EXPECTED: &'static str = "'cold', 'mild', or 'hot'";

    /// Look up an already lower-cased token
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "cold" => Some(AmbientTemp::Cold),
            "mild" => Some(AmbientTemp::Mild),
            "hot" => Some(AmbientTemp::Hot),
            _ => None,
        }
    }

    /// Ordinal used as the `ambient_temp` feature
    pub fn ordinal(&self) -> u8 {
        match self {
            AmbientTemp::Cold => 0,
            AmbientTemp::Mild => 1,
            AmbientTemp::Hot => 2,
        }
    }

    /// Bucket a numeric reading in degrees Celsius
    pub fn from_celsius(celsius: f64) -> Self {
        if celsius < 5.0 {
            AmbientTemp::Cold
        } else if celsius <= 25.0 {
            AmbientTemp::Mild
        } else {
            AmbientTemp::Hot
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AmbientTemp::Cold => "cold",
            AmbientTemp::Mild => "mild",
            AmbientTemp::Hot => "hot",
        }
    }
}

/// Casing applied to a categorical token before encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Casing {
    /// `SPORT` -> `sport`
    Lower,
    /// `fwd` -> `FWD`
    Upper,
    /// `sPORT` -> `Sport`
    Capitalize,
}

impl Casing {
    /// Apply the casing rule
    pub fn apply(&self, token: &str) -> String {
        match self {
            Casing::Lower => token.to_lowercase(),
            Casing::Upper => token.to_uppercase(),
            Casing::Capitalize => {
                let mut chars = token.chars();
                match chars.next() {
                    Some(first) => {
                        let mut out: String = first.to_uppercase().collect();
                        out.push_str(&chars.as_str().to_lowercase());
                        out
                    }
                    None => String::new(),
                }
            }
        }
    }
}

/// How the HVAC flag is parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HvacPolicy {
    /// Boolean at the boundary; strings degrade to 0, never fails
    Lenient,
    /// `yes`/`no` strings; unknown values fail in single-record mode
    StrictYesNo,
}

/// Map a lower-cased `yes`/`no` token
pub fn yes_no(token: &str) -> Option<u8> {
    match token {
        "yes" => Some(1),
        "no" => Some(0),
        _ => None,
    }
}
