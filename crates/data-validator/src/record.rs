//! Raw Input Records
//!
//! Requests arrive as closed, typed records ([`EvInput`], [`HvInput`]); CSV rows
//! arrive as loosely-typed cells. Both are lowered into a [`RawRecord`] before
//! preprocessing so the serving and batch paths share one pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Loosely-typed scalar value of a raw field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean value (`true`/`false`)
    Flag(bool),
    /// Numeric value
    Number(f64),
    /// Free-form text
    Text(String),
}

impl Scalar {
    /// Parse a CSV cell. Empty cells are missing values.
    pub fn from_cell(cell: &str) -> Option<Self> {
        if cell.is_empty() {
            return None;
        }
        if cell.eq_ignore_ascii_case("true") {
            return Some(Scalar::Flag(true));
        }
        if cell.eq_ignore_ascii_case("false") {
            return Some(Scalar::Flag(false));
        }
        match cell.trim().parse::<f64>() {
            Ok(value) => Some(Scalar::Number(value)),
            Err(_) => Some(Scalar::Text(cell.to_string())),
        }
    }

    /// String form used by categorical normalization
    pub fn as_text(&self) -> String {
        match self {
            Scalar::Flag(true) => "True".to_string(),
            Scalar::Flag(false) => "False".to_string(),
            Scalar::Number(value) => value.to_string(),
            Scalar::Text(text) => text.clone(),
        }
    }

    /// Numeric coercion; unparseable text and NaN become 0.0
    pub fn to_f64(&self) -> f64 {
        let value = match self {
            Scalar::Flag(flag) => f64::from(u8::from(*flag)),
            Scalar::Number(value) => *value,
            Scalar::Text(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        };
        if value.is_nan() {
            0.0
        } else {
            value
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Flag(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

/// Field name to scalar mapping for one input row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: BTreeMap<String, Scalar>,
}

impl RawRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Scalar>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Remove a field, returning its previous value
    pub fn remove(&mut self, name: &str) -> Option<Scalar> {
        self.fields.remove(name)
    }

    /// Raw value of a field
    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.fields.get(name)
    }

    /// Whether the field is present
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Numeric view of a field. Booleans and non-numeric text are not numbers.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.fields.get(name)? {
            Scalar::Number(value) => Some(*value),
            Scalar::Text(text) => text.trim().parse::<f64>().ok(),
            Scalar::Flag(_) => None,
        }
    }

    /// Text view of a field
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(Scalar::as_text)
    }

    /// Iterate over fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Electric vehicle request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvInput {
    pub battery_percentage: f64,
    pub battery_age_years: f64,
    pub battery_capacity_kwh: f64,
    /// `cold`, `mild` or `hot`, any casing
    pub ambient_temp: String,
    pub terrain_slope: f64,
    pub speed_avg_kmph: f64,
    pub acceleration_level: f64,
    pub hvac_on: bool,
    pub driving_mode: String,
    pub drive_type: String,
    pub cargo_volume_liters: f64,
    pub top_speed_kmph: f64,
    pub total_power_kw: f64,
    pub total_torque_nm: f64,
}

impl From<&EvInput> for RawRecord {
    fn from(input: &EvInput) -> Self {
        RawRecord::new()
            .with("battery_percentage", input.battery_percentage)
            .with("battery_age_years", input.battery_age_years)
            .with("battery_capacity_kwh", input.battery_capacity_kwh)
            .with("ambient_temp", input.ambient_temp.as_str())
            .with("terrain_slope", input.terrain_slope)
            .with("speed_avg_kmph", input.speed_avg_kmph)
            .with("acceleration_level", input.acceleration_level)
            .with("hvac_on", input.hvac_on)
            .with("driving_mode", input.driving_mode.as_str())
            .with("drive_type", input.drive_type.as_str())
            .with("cargo_volume_liters", input.cargo_volume_liters)
            .with("top_speed_kmph", input.top_speed_kmph)
            .with("total_power_kw", input.total_power_kw)
            .with("total_torque_nm", input.total_torque_nm)
    }
}

/// Hydrogen fuel-cell vehicle request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HvInput {
    pub hydrogen_percentage: f64,
    pub fuel_cell_age_years: f64,
    pub fuel_cell_efficiency: f64,
    /// `cold`, `mild` or `hot`, any casing
    pub ambient_temp: String,
    pub terrain_slope: f64,
    pub speed_avg_kmph: f64,
    pub acceleration_level: f64,
    /// `yes` or `no`, any casing
    pub hvac_on: String,
    pub driving_mode: String,
    pub drive_type: String,
    pub cargo_volume_liters: f64,
    pub top_speed_kmph: f64,
    pub total_power_kw: f64,
    pub total_torque_nm: f64,
}

impl From<&HvInput> for RawRecord {
    fn from(input: &HvInput) -> Self {
        RawRecord::new()
            .with("hydrogen_percentage", input.hydrogen_percentage)
            .with("fuel_cell_age_years", input.fuel_cell_age_years)
            .with("fuel_cell_efficiency", input.fuel_cell_efficiency)
            .with("ambient_temp", input.ambient_temp.as_str())
            .with("terrain_slope", input.terrain_slope)
            .with("speed_avg_kmph", input.speed_avg_kmph)
            .with("acceleration_level", input.acceleration_level)
            .with("hvac_on", input.hvac_on.as_str())
            .with("driving_mode", input.driving_mode.as_str())
            .with("drive_type", input.drive_type.as_str())
            .with("cargo_volume_liters", input.cargo_volume_liters)
            .with("top_speed_kmph", input.top_speed_kmph)
            .with("total_power_kw", input.total_power_kw)
            .with("total_torque_nm", input.total_torque_nm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_parsing() {
        assert_eq!(Scalar::from_cell(""), None);
        assert_eq!(Scalar::from_cell("True"), Some(Scalar::Flag(true)));
        assert_eq!(Scalar::from_cell("false"), Some(Scalar::Flag(false)));
        assert_eq!(Scalar::from_cell("42.5"), Some(Scalar::Number(42.5)));
        assert_eq!(Scalar::from_cell("mild"), Some(Scalar::Text("mild".to_string())));
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Scalar::Flag(true).to_f64(), 1.0);
        assert_eq!(Scalar::Text("12.5".to_string()).to_f64(), 12.5);
        assert_eq!(Scalar::Text("n/a".to_string()).to_f64(), 0.0);
        assert_eq!(Scalar::Number(f64::NAN).to_f64(), 0.0);
        assert_eq!(Scalar::Text("nan".to_string()).to_f64(), 0.0);
    }

    #[test]
    fn test_ev_input_lowering() {
        let json = r#"{
            "battery_percentage": 80, "battery_age_years": 2, "battery_capacity_kwh": 60,
            "ambient_temp": "Mild", "terrain_slope": 1.5, "speed_avg_kmph": 70,
            "acceleration_level": 0.4, "hvac_on": true, "driving_mode": "eco",
            "drive_type": "fwd", "cargo_volume_liters": 400, "top_speed_kmph": 180,
            "total_power_kw": 150, "total_torque_nm": 300
        }"#;
        let input: EvInput = serde_json::from_str(json).unwrap();
        let record = RawRecord::from(&input);

        assert_eq!(record.len(), 14);
        assert_eq!(record.get("hvac_on"), Some(&Scalar::Flag(true)));
        assert_eq!(record.number("battery_capacity_kwh"), Some(60.0));
        assert_eq!(record.text("ambient_temp").as_deref(), Some("Mild"));
    }

    #[test]
    fn test_hv_input_rejects_boolean_hvac() {
        let json = r#"{
            "hydrogen_percentage": 50, "fuel_cell_age_years": 3, "fuel_cell_efficiency": 55,
            "ambient_temp": "hot", "terrain_slope": 0, "speed_avg_kmph": 60,
            "acceleration_level": 0.3, "hvac_on": true, "driving_mode": "normal",
            "drive_type": "AWD", "cargo_volume_liters": 500, "top_speed_kmph": 200,
            "total_power_kw": 120, "total_torque_nm": 400
        }"#;
        assert!(serde_json::from_str::<HvInput>(json).is_err());
    }

    #[test]
    fn test_record_number_view() {
        let record = RawRecord::new()
            .with("speed", "88")
            .with("flag", true)
            .with("mode", "eco");
        assert_eq!(record.number("speed"), Some(88.0));
        assert_eq!(record.number("flag"), None);
        assert_eq!(record.number("mode"), None);
        assert_eq!(record.number("absent"), None);
    }
}
