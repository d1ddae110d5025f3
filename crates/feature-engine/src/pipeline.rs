//! Preprocessing Pipeline
//!
//! normalize -> derive -> encode -> align, shared by the serving path
//! (single record, strict) and the training/evaluation path (batch, lenient).

use metrics::counter;
use tracing::debug;

use data_validator::{
    CategoryNormalizer, CategoryWarnings, NormalizedCategories, RawRecord, ValidationError,
    VehicleClass,
};

use crate::aligner::{AlignmentReport, FeatureAligner};
use crate::derived::{ensure_numeric, pass_through};
use crate::profile::{VehicleProfile, CATEGORICAL_FIELDS};
use crate::reference::FeatureReference;
use crate::table::{AlignedTable, FeatureRow, FeatureTable};
use crate::SchemaError;

/// Result of batch preprocessing
#[derive(Debug, Clone)]
pub struct BatchOutput {
    /// One aligned row per input row, same order
    pub table: AlignedTable,
    /// Invalid category values that were defaulted (training batches only)
    pub warnings: CategoryWarnings,
    /// Alignment reconciliation
    pub report: AlignmentReport,
}

/// Preprocessing pipeline for one vehicle class
#[derive(Debug, Clone)]
pub struct PreprocessingPipeline {
    profile: VehicleProfile,
    normalizer: CategoryNormalizer,
    aligner: FeatureAligner,
}

impl PreprocessingPipeline {
    /// Create a pipeline from a profile
    pub fn new(profile: VehicleProfile) -> Self {
        Self {
            normalizer: CategoryNormalizer::new(profile.normalizer),
            aligner: FeatureAligner::new(profile.reference),
            profile,
        }
    }

    /// EV pipeline
    pub fn ev() -> Self {
        Self::new(VehicleProfile::ev())
    }

    /// HV pipeline
    pub fn hv() -> Self {
        Self::new(VehicleProfile::hv())
    }

    /// Pipeline for a vehicle class
    pub fn for_class(vehicle: VehicleClass) -> Self {
        Self::new(VehicleProfile::for_class(vehicle))
    }

    /// Vehicle class
    pub fn vehicle(&self) -> VehicleClass {
        self.profile.vehicle
    }

    /// Class profile
    pub fn profile(&self) -> &VehicleProfile {
        &self.profile
    }

    /// Model column layout
    pub fn reference(&self) -> &'static FeatureReference {
        self.profile.reference
    }

    /// Verify the reference against the columns this pipeline emits
    pub fn self_check(&self) -> Result<(), SchemaError> {
        self.profile.self_check()
    }

    /// Serving path: one record, invalid categories fail the call
    pub fn process_record(&self, record: &RawRecord) -> Result<AlignedTable, ValidationError> {
        let categories = self.normalizer.normalize_strict(record)?;
        let row = self.build_row(record, &categories);

        let mut table = FeatureTable::with_capacity(1);
        table.push(row);
        let (aligned, _report) = self.aligner.align(&table);
        Ok(aligned)
    }

    /// Training/evaluation path: never fails, never drops a row
    pub fn process_batch(&self, records: &[RawRecord], training: bool) -> BatchOutput {
        let mut warnings = CategoryWarnings::new();
        let table = self.intermediate_batch(records, &mut warnings);
        let (aligned, report) = self.aligner.align(&table);

        let vehicle = self.profile.vehicle.as_str();
        for field in warnings.fields() {
            counter!("category_defaulted_total", "vehicle" => vehicle, "field" => field)
                .increment(warnings.defaulted_rows(field) as u64);
        }
        if training {
            warnings.log(self.profile.vehicle);
        } else {
            warnings = CategoryWarnings::new();
        }

        debug!("[{}] Preprocessed batch of {} row(s)", vehicle, aligned.len());
        BatchOutput {
            table: aligned,
            warnings,
            report,
        }
    }

    /// Intermediate (pre-alignment) table of a batch, one row per record
    pub fn intermediate_batch(&self, records: &[RawRecord], warnings: &mut CategoryWarnings) -> FeatureTable {
        let mut table = FeatureTable::with_capacity(records.len());
        for record in records {
            let categories = self.normalizer.normalize_lenient(record, warnings);
            table.push(self.build_row(record, &categories));
        }
        table
    }

    fn build_row(&self, record: &RawRecord, categories: &NormalizedCategories) -> FeatureRow {

        let mut row = FeatureRow::new();
        pass_through(record, CATEGORICAL_FIELDS, &mut row);
        ensure_numeric(self.profile.numeric_columns, &mut row);
        row.insert("ambient_temp".to_string(), f64::from(categories.ambient_temp));
        row.insert("hvac_on".to_string(), f64::from(categories.hvac_on));

        (self.profile.derive)(&mut row, categories);

        if !self.profile.driving_mode.encode(&categories.driving_mode, &mut row) {
            debug!(
                "[{}] driving_mode '{}' outside vocabulary, indicators left at 0",
                self.profile.vehicle, categories.driving_mode
            );
        }
        if !self.profile.drive_type.encode(&categories.drive_type, &mut row) {
            debug!(
                "[{}] drive_type '{}' outside vocabulary, indicators left at 0",
                self.profile.vehicle, categories.drive_type
            );
        }

        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_validator::{EvInput, HvInput, Scalar};

    fn ev_input() -> EvInput {
        EvInput {
            battery_percentage: 50.0,
            battery_age_years: 3.0,
            battery_capacity_kwh: 50.0,
            ambient_temp: "Mild".to_string(),
            terrain_slope: -2.0,
            speed_avg_kmph: 80.0,
            acceleration_level: 0.4,
            hvac_on: true,
            driving_mode: "eco".to_string(),
            drive_type: "rwd".to_string(),
            cargo_volume_liters: 420.0,
            top_speed_kmph: 190.0,
            total_power_kw: 150.0,
            total_torque_nm: 310.0,
        }
    }

    fn hv_input() -> HvInput {
        HvInput {
            hydrogen_percentage: 60.0,
            fuel_cell_age_years: 4.0,
            fuel_cell_efficiency: 55.0,
            ambient_temp: "Cold".to_string(),
            terrain_slope: -3.0,
            speed_avg_kmph: 90.0,
            acceleration_level: 0.6,
            hvac_on: "No".to_string(),
            driving_mode: "SPORT".to_string(),
            drive_type: "awd".to_string(),
            cargo_volume_liters: 800.0,
            top_speed_kmph: 210.0,
            total_power_kw: 130.0,
            total_torque_nm: 500.0,
        }
    }

    #[test]
    fn test_ev_record_matches_reference() {
        let pipeline = PreprocessingPipeline::ev();
        let table = pipeline.process_record(&RawRecord::from(&ev_input())).unwrap();

        assert_eq!(table.columns(), pipeline.reference().columns());
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "battery_per_kWh"), Some(1.0));
        assert_eq!(table.get(0, "battery_remaining_kWh"), Some(25.0));
        assert_eq!(table.get(0, "eco_mode_flag"), Some(1.0));
        assert_eq!(table.get(0, "ambient_temp"), Some(1.0));
        assert_eq!(table.get(0, "hvac_on"), Some(1.0));
        assert_eq!(table.get(0, "driving_mode_Eco"), Some(1.0));
        assert_eq!(table.get(0, "driving_mode_Normal"), Some(0.0));
        assert_eq!(table.get(0, "drive_type_RWD"), Some(1.0));
        assert_eq!(table.get(0, "drive_type_FWD"), Some(0.0));
    }

    #[test]
    fn test_ev_zero_capacity_record() {
        let mut input = ev_input();
        input.battery_capacity_kwh = 0.0;
        let table = PreprocessingPipeline::ev()
            .process_record(&RawRecord::from(&input))
            .unwrap();

        assert_eq!(table.get(0, "battery_per_kWh"), Some(0.0));
        assert!(table.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_hv_record_normalization() {
        let pipeline = PreprocessingPipeline::hv();
        let table = pipeline.process_record(&RawRecord::from(&hv_input())).unwrap();

        assert_eq!(table.columns(), pipeline.reference().columns());
        assert_eq!(table.get(0, "ambient_temp"), Some(0.0));
        assert_eq!(table.get(0, "hvac_on"), Some(0.0));
        assert_eq!(table.get(0, "driving_mode_sport"), Some(1.0));
        assert_eq!(table.get(0, "driving_mode_normal"), Some(0.0));
        assert_eq!(table.get(0, "driving_mode_eco"), Some(0.0));
        assert_eq!(table.get(0, "drive_type_AWD"), Some(1.0));
        assert_eq!(table.get(0, "speed_sq"), Some(8100.0));
        assert_eq!(table.get(0, "abs_slope"), Some(3.0));
        assert_eq!(table.get(0, "hydrogen_per_year"), Some(0.0));
        assert_eq!(table.get(0, "h2_x_age"), Some(240.0));
    }

    #[test]
    fn test_hv_invalid_ambient_fails() {
        let mut input = hv_input();
        input.ambient_temp = "tropical".to_string();
        let err = PreprocessingPipeline::hv()
            .process_record(&RawRecord::from(&input))
            .unwrap_err();

        assert!(matches!(
            err,
            ValidationError::InvalidCategory { field: "ambient_temp", ref value, .. } if value == "tropical"
        ));
    }

    #[test]
    fn test_intermediate_columns_equal_emitted_columns() {
        for (pipeline, record) in [
            (PreprocessingPipeline::ev(), RawRecord::from(&ev_input())),
            (PreprocessingPipeline::hv(), RawRecord::from(&hv_input())),
        ] {
            let mut warnings = CategoryWarnings::new();
            let table = pipeline.intermediate_batch(&[record], &mut warnings);
            assert_eq!(table.columns(), pipeline.profile().emitted_columns());
        }
    }

    #[test]
    fn test_intermediate_batch_keeps_unusable_rows() {
        let pipeline = PreprocessingPipeline::hv();
        let records = [
            RawRecord::new(),
            RawRecord::new().with("ambient_temp", "arctic").with("hvac_on", "perhaps"),
        ];
        let mut warnings = CategoryWarnings::new();

        let table = pipeline.intermediate_batch(&records, &mut warnings);

        assert_eq!(table.len(), 2);
        assert_eq!(table.columns(), pipeline.profile().emitted_columns());
        assert_eq!(warnings.defaulted_rows("ambient_temp"), 2);
        assert_eq!(warnings.invalid_values("hvac_on"), vec!["perhaps"]);
    }

    #[test]
    fn test_batch_invalid_hvac_keeps_row_and_warns() {
        let good = RawRecord::from(&hv_input());
        let mut bad = good.clone();
        bad.insert("hvac_on", Scalar::from("sometimes"));

        let output = PreprocessingPipeline::hv().process_batch(&[good.clone(), bad, good], true);

        assert_eq!(output.table.len(), 3);
        assert_eq!(output.table.get(1, "hvac_on"), Some(0.0));
        assert_eq!(output.warnings.invalid_values("hvac_on"), vec!["sometimes"]);
        assert_eq!(output.warnings.defaulted_rows("hvac_on"), 1);
        assert!(output.report.is_exact());
    }

    #[test]
    fn test_non_training_batch_does_not_report_warnings() {
        let mut bad = RawRecord::from(&ev_input());
        bad.insert("ambient_temp", "arctic");

        let output = PreprocessingPipeline::ev().process_batch(&[bad], false);

        assert_eq!(output.table.get(0, "ambient_temp"), Some(0.0));
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_batch_synthesizes_missing_columns() {
        let sparse = RawRecord::new()
            .with("ambient_temp", "hot")
            .with("battery_percentage", "40")
            .with("driving_mode", "Sport")
            .with("drive_type", "FWD")
            .with("vin", "WVW-1");

        let output = PreprocessingPipeline::ev().process_batch(&[sparse], true);

        assert_eq!(output.table.get(0, "battery_percentage"), Some(40.0));
        assert_eq!(output.table.get(0, "battery_capacity_kwh"), Some(0.0));
        assert_eq!(output.table.get(0, "battery_per_kWh"), Some(0.0));
        assert_eq!(output.table.get(0, "hvac_on"), Some(0.0));
        assert_eq!(output.report.filled, Vec::<&str>::new());
        assert_eq!(output.report.dropped, vec!["vin".to_string()]);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_ev_batch_accepts_yes_no_strings() {
        let mut yes = RawRecord::from(&ev_input());
        yes.insert("hvac_on", "Yes");
        let mut no = RawRecord::from(&ev_input());
        no.insert("hvac_on", "no");

        let output = PreprocessingPipeline::ev().process_batch(&[yes, no], true);

        assert_eq!(output.table.get(0, "hvac_on"), Some(1.0));
        assert_eq!(output.table.get(1, "hvac_on"), Some(0.0));
    }
}
