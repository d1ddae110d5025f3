//! Feature References
//!
//! The ordered column lists each trained model consumes. They are the
//! contract between training and serving and are never configurable.

use std::collections::{BTreeSet, HashSet};

use data_validator::VehicleClass;

use crate::SchemaError;

/// Columns of the EV range model, in training order
pub const EV_FEATURES: &[&str] = &[
    "battery_percentage",
    "battery_age_years",
    "ambient_temp",
    "terrain_slope",
    "speed_avg_kmph",
    "acceleration_level",
    "hvac_on",
    "cargo_volume_liters",
    "top_speed_kmph",
    "total_power_kw",
    "total_torque_nm",
    "battery_capacity_kwh",
    "battery_per_kWh",
    "battery_remaining_kWh",
    "eco_mode_flag",
    "driving_mode_Normal",
    "driving_mode_Sport",
    "driving_mode_Eco",
    "drive_type_FWD",
    "drive_type_RWD",
];

/// Columns of the HV range model, in training order
pub const HV_FEATURES: &[&str] = &[
    "hydrogen_percentage",
    "fuel_cell_age_years",
    "fuel_cell_efficiency",
    "ambient_temp",
    "terrain_slope",
    "speed_avg_kmph",
    "acceleration_level",
    "hvac_on",
    "cargo_volume_liters",
    "top_speed_kmph",
    "total_power_kw",
    "total_torque_nm",
    "speed_sq",
    "abs_slope",
    "hydrogen_per_year",
    "age_squared",
    "h2_x_efficiency",
    "h2_x_age",
    "driving_mode_normal",
    "driving_mode_sport",
    "driving_mode_eco",
    "drive_type_FWD",
    "drive_type_RWD",
    "drive_type_AWD",
];

pub static EV_REFERENCE: FeatureReference = FeatureReference::new(VehicleClass::Ev, EV_FEATURES);
pub static HV_REFERENCE: FeatureReference = FeatureReference::new(VehicleClass::Hv, HV_FEATURES);

/// Fixed, ordered feature vector layout of one model
#[derive(Debug, PartialEq, Eq)]
pub struct FeatureReference {
    vehicle: VehicleClass,
    columns: &'static [&'static str],
}

impl FeatureReference {
    /// Create a reference over a static column list
    pub const fn new(vehicle: VehicleClass, columns: &'static [&'static str]) -> Self {
        Self { vehicle, columns }
    }

    /// Reference for a vehicle class
    pub fn for_class(vehicle: VehicleClass) -> &'static FeatureReference {
        match vehicle {
            VehicleClass::Ev => &EV_REFERENCE,
            VehicleClass::Hv => &HV_REFERENCE,
        }
    }

    /// Vehicle class of the model
    pub fn vehicle(&self) -> VehicleClass {
        self.vehicle
    }

    /// Columns in model order
    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Position of a column
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }

    /// Whether the column is part of the reference
    pub fn contains(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    /// Reject duplicate columns
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in self.columns {
            if !seen.insert(*column) {
                return Err(SchemaError::DuplicateColumn {
                    vehicle: self.vehicle,
                    column: *column,
                });
            }
        }
        Ok(())
    }

    /// Compare the reference against the columns a pipeline emits
    pub fn reconcile(&self, emitted: &BTreeSet<String>) -> Result<(), SchemaError> {
        let missing: Vec<String> = self
            .columns
            .iter()
            .filter(|column| !emitted.contains(**column))
            .map(|column| column.to_string())
            .collect();
        let unreferenced: Vec<String> = emitted
            .iter()
            .filter(|column| !self.contains(column))
            .cloned()
            .collect();

        if missing.is_empty() && unreferenced.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Drift {
                vehicle: self.vehicle,
                missing,
                unreferenced,
            })
        }
    }
}
