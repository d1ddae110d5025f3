//! Per-Class Pipeline Profiles
//!
//! EV and HV share one pipeline skeleton; everything that differs between
//! them (casing, vocabularies, derived features, reference) lives here.

use std::collections::BTreeSet;
use std::fmt;

use data_validator::{Casing, HvacPolicy, NormalizerConfig, VehicleClass};

use crate::derived::{derive_ev, derive_hv, DeriveFn, EV_DERIVED, HV_DERIVED};
use crate::encoder::CategoricalEncoder;
use crate::reference::FeatureReference;
use crate::SchemaError;

/// Raw fields consumed by normalization and encoding rather than passed through
pub const CATEGORICAL_FIELDS: &[&str] = &["ambient_temp", "hvac_on", "driving_mode", "drive_type"];

/// Ordinal/flag columns written by normalization
pub const NORMALIZED_COLUMNS: &[&str] = &["ambient_temp", "hvac_on"];

const EV_NUMERIC: &[&str] = &[
    "battery_percentage",
    "battery_age_years",
    "battery_capacity_kwh",
    "terrain_slope",
    "speed_avg_kmph",
    "acceleration_level",
    "cargo_volume_liters",
    "top_speed_kmph",
    "total_power_kw",
    "total_torque_nm",
];

const HV_NUMERIC: &[&str] = &[
    "hydrogen_percentage",
    "fuel_cell_age_years",
    "fuel_cell_efficiency",
    "terrain_slope",
    "speed_avg_kmph",
    "acceleration_level",
    "cargo_volume_liters",
    "top_speed_kmph",
    "total_power_kw",
    "total_torque_nm",
];

/// Everything class-specific about preprocessing
#[derive(Clone)]
pub struct VehicleProfile {
    /// Vehicle class
    pub vehicle: VehicleClass,
    /// Category normalization rules
    pub normalizer: NormalizerConfig,
    /// Numeric source columns, synthesized as 0.0 when absent
    pub numeric_columns: &'static [&'static str],
    /// Columns written by `derive`
    pub derived_columns: &'static [&'static str],
    /// Derived feature calculator
    pub derive: DeriveFn,
    /// Driving mode encoder
    pub driving_mode: CategoricalEncoder,
    /// Drive type encoder
    pub drive_type: CategoricalEncoder,
    /// Model column layout
    pub reference: &'static FeatureReference,
}

impl fmt::Debug for VehicleProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VehicleProfile")
            .field("vehicle", &self.vehicle)
            .field("normalizer", &self.normalizer)
            .field("numeric_columns", &self.numeric_columns)
            .field("derived_columns", &self.derived_columns)
            .field("driving_mode", &self.driving_mode)
            .field("drive_type", &self.drive_type)
            .field("reference", &self.reference.vehicle())
            .finish_non_exhaustive()
    }
}

impl VehicleProfile {
    /// Battery-electric profile: capitalized driving modes, FWD/RWD only
    pub fn ev() -> Self {
        Self {
            vehicle: VehicleClass::Ev,
            normalizer: NormalizerConfig {
                vehicle: VehicleClass::Ev,
                hvac: HvacPolicy::Lenient,
                driving_mode: Casing::Capitalize,
                drive_type: Casing::Upper,
            },
            numeric_columns: EV_NUMERIC,
            derived_columns: EV_DERIVED,
            derive: derive_ev,
            driving_mode: CategoricalEncoder::new("driving_mode", &["Normal", "Sport", "Eco"]),
            drive_type: CategoricalEncoder::new("drive_type", &["FWD", "RWD"]),
            reference: FeatureReference::for_class(VehicleClass::Ev),
        }
    }

    /// Hydrogen profile: lower-case driving modes, FWD/RWD/AWD, strict yes/no HVAC
    pub fn hv() -> Self {
        Self {
            vehicle: VehicleClass::Hv,
            normalizer: NormalizerConfig {
                vehicle: VehicleClass::Hv,
                hvac: HvacPolicy::StrictYesNo,
                driving_mode: Casing::Lower,
                drive_type: Casing::Upper,
            },
            numeric_columns: HV_NUMERIC,
            derived_columns: HV_DERIVED,
            derive: derive_hv,
            driving_mode: CategoricalEncoder::new("driving_mode", &["normal", "sport", "eco"]),
            drive_type: CategoricalEncoder::new("drive_type", &["FWD", "RWD", "AWD"]),
            reference: FeatureReference::for_class(VehicleClass::Hv),
        }
    }

    /// Profile for a vehicle class
    pub fn for_class(vehicle: VehicleClass) -> Self {
        match vehicle {
            VehicleClass::Ev => Self::ev(),
            VehicleClass::Hv => Self::hv(),
        }
    }

    /// Columns the pipeline writes for every row of a well-formed record
    pub fn emitted_columns(&self) -> BTreeSet<String> {
        NORMALIZED_COLUMNS
            .iter()
            .chain(self.numeric_columns)
            .chain(self.derived_columns)
            .map(|column| column.to_string())
            .chain(self.driving_mode.columns())
            .chain(self.drive_type.columns())
            .collect()
    }

    /// Startup self-check: the reference is well-formed and matches what the pipeline emits
    pub fn self_check(&self) -> Result<(), SchemaError> {
        self.reference.validate()?;
        self.reference.reconcile(&self.emitted_columns())
    }
}
