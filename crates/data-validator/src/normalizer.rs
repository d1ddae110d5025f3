//! Category Normalization
//!
//! Canonicalizes the categorical fields of a raw record: ambient temperature
//! becomes its ordinal, the HVAC flag becomes 0/1, driving mode and drive type
//! get the casing the model was trained with.
//!
//! Single-record (serving) mode is strict: an out-of-vocabulary ambient
//! temperature, or an unknown HVAC token under [`HvacPolicy::StrictYesNo`],
//! fails the request. Batch mode never fails; offending values are mapped to 0
//! and collected into [`CategoryWarnings`].

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::error::ValidationError;
use crate::record::{RawRecord, Scalar};
use crate::vocabulary::{yes_no, AmbientTemp, Casing, HvacPolicy, VehicleClass};

/// Placeholder reported for an absent field
const MISSING: &str = "<missing>";

const HVAC_EXPECTED: &str = "'yes' or 'no'";

/// Raw reading of one categorical field
enum Reading {
    Valid(u8),
    Missing,
    Invalid(String),
}

fn invalid_ambient(value: String) -> ValidationError {
    ValidationError::InvalidCategory {
        field: "ambient_temp",
        value,
        expected: AmbientTemp::EXPECTED,
    }
}

fn invalid_hvac(value: String) -> ValidationError {
    ValidationError::InvalidCategory {
        field: "hvac_on",
        value,
        expected: HVAC_EXPECTED,
    }
}

/// Processing mode of a pipeline invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingMode {
    /// One request record, strict validation
    SingleRecord,
    /// Many rows, warn-and-default validation
    Batch {
        /// Training/evaluation data: invalid values are reported as warnings
        training: bool,
    },
}

/// Per-class normalization rules
#[derive(Debug, Clone, Copy)]
pub struct NormalizerConfig {
    /// Vehicle class (for log context)
    pub vehicle: VehicleClass,
    /// HVAC parsing policy
    pub hvac: HvacPolicy,
    /// Casing of `driving_mode`
    pub driving_mode: Casing,
    /// Casing of `drive_type`
    pub drive_type: Casing,
}

/// Canonical categorical values of one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCategories {
    /// Ordinal of the ambient temperature bucket (0 when defaulted)
    pub ambient_temp: u8,
    /// HVAC flag as 0/1
    pub hvac_on: u8,
    /// Cased driving mode token
    pub driving_mode: String,
    /// Cased drive type token
    pub drive_type: String,
}

/// Out-of-vocabulary values observed during batch normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryWarnings {
    /// Distinct invalid values per field
    invalid: BTreeMap<&'static str, BTreeSet<String>>,
    /// Number of defaulted rows per field
    defaulted: BTreeMap<&'static str, usize>,
}

impl CategoryWarnings {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an invalid value that was defaulted to 0
    pub fn record(&mut self, field: &'static str, value: impl Into<String>) {
        self.invalid.entry(field).or_default().insert(value.into());
        *self.defaulted.entry(field).or_insert(0) += 1;
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.invalid.is_empty()
    }

    /// Distinct invalid values seen for a field, sorted
    pub fn invalid_values(&self, field: &str) -> Vec<&str> {
        self.invalid
            .get(field)
            .map(|values| values.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Number of rows defaulted for a field
    pub fn defaulted_rows(&self, field: &str) -> usize {
        self.defaulted.get(field).copied().unwrap_or(0)
    }

    /// Fields with at least one defaulted row
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.invalid.keys().copied()
    }

    /// Emit one warning per affected field
    pub fn log(&self, vehicle: VehicleClass) {
        for (field, values) in &self.invalid {
            warn!(
                "[{}] Invalid {} values found: {:?}. {} row(s) mapped to 0.",
                vehicle,
                field,
                values,
                self.defaulted_rows(field)
            );
        }
    }
}

/// Category/unit normalizer for one vehicle class
#[derive(Debug, Clone)]
pub struct CategoryNormalizer {
    config: NormalizerConfig,
}

impl CategoryNormalizer {
    /// Create a normalizer with the given rules
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Rules in use
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize the categorical fields of one row
    pub fn normalize(
        &self,
        record: &RawRecord,
        mode: ProcessingMode,
        warnings: &mut CategoryWarnings,
    ) -> Result<NormalizedCategories, ValidationError> {
        match mode {
            ProcessingMode::SingleRecord => self.normalize_strict(record),
            ProcessingMode::Batch { .. } => Ok(self.normalize_lenient(record, warnings)),
        }
    }

    /// Single-record normalization; rejects invalid categories
    pub fn normalize_strict(&self, record: &RawRecord) -> Result<NormalizedCategories, ValidationError> {
        let ambient_temp = match self.ambient_temp(record) {
            Reading::Valid(value) => value,
            Reading::Missing => return Err(invalid_ambient(MISSING.to_string())),
            Reading::Invalid(token) => return Err(invalid_ambient(token)),
        };
        let hvac_on = match (self.hvac_on(record), self.config.hvac) {
            (Reading::Valid(value), _) => value,
            (Reading::Missing, HvacPolicy::StrictYesNo) => return Err(invalid_hvac(MISSING.to_string())),
            (Reading::Invalid(token), HvacPolicy::StrictYesNo) => return Err(invalid_hvac(token)),
            (_, HvacPolicy::Lenient) => 0,
        };
        Ok(self.categories(record, ambient_temp, hvac_on))
    }

    /// Batch normalization; invalid categories default to 0 and are recorded
    pub fn normalize_lenient(
        &self,
        record: &RawRecord,
        warnings: &mut CategoryWarnings,
    ) -> NormalizedCategories {
        let ambient_temp = match self.ambient_temp(record) {
            Reading::Valid(value) => value,
            Reading::Missing => {
                warnings.record("ambient_temp", MISSING);
                0
            }
            Reading::Invalid(token) => {
                warnings.record("ambient_temp", token);
                0
            }
        };
        let hvac_on = match self.hvac_on(record) {
            Reading::Valid(value) => value,
            Reading::Missing => 0,
            Reading::Invalid(token) => {
                warnings.record("hvac_on", token);
                0
            }
        };
        self.categories(record, ambient_temp, hvac_on)
    }

    fn categories(&self, record: &RawRecord, ambient_temp: u8, hvac_on: u8) -> NormalizedCategories {
        NormalizedCategories {
            ambient_temp,
            hvac_on,
            driving_mode: self.cased(record, "driving_mode", self.config.driving_mode),
            drive_type: self.cased(record, "drive_type", self.config.drive_type),
        }
    }

    fn ambient_temp(&self, record: &RawRecord) -> Reading {
        let Some(text) = record.text("ambient_temp") else {
            return Reading::Missing;
        };
        let token = text.to_lowercase();
        match AmbientTemp::parse(&token) {
            Some(bucket) => Reading::Valid(bucket.ordinal()),
            None => Reading::Invalid(token),
        }
    }

    fn hvac_on(&self, record: &RawRecord) -> Reading {
        let Some(value) = record.get("hvac_on") else {
            return Reading::Missing;
        };
        if let (HvacPolicy::Lenient, Scalar::Flag(flag)) = (self.config.hvac, value) {
            return Reading::Valid(u8::from(*flag));
        }

        let token = value.as_text().to_lowercase();
        match yes_no(&token) {
            Some(flag) => Reading::Valid(flag),
            None => Reading::Invalid(token),
        }
    }

    fn cased(&self, record: &RawRecord, field: &str, casing: Casing) -> String {
        record
            .text(field)
            .map(|text| casing.apply(&text))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev_normalizer() -> CategoryNormalizer {
        CategoryNormalizer::new(NormalizerConfig {
            vehicle: VehicleClass::Ev,
            hvac: HvacPolicy::Lenient,
            driving_mode: Casing::Capitalize,
            drive_type: Casing::Upper,
        })
    }

    fn hv_normalizer() -> CategoryNormalizer {
        CategoryNormalizer::new(NormalizerConfig {
            vehicle: VehicleClass::Hv,
            hvac: HvacPolicy::StrictYesNo,
            driving_mode: Casing::Lower,
            drive_type: Casing::Upper,
        })
    }

    fn record(ambient: &str, hvac: Scalar) -> RawRecord {
        RawRecord::new()
            .with("ambient_temp", ambient)
            .with("hvac_on", hvac)
            .with("driving_mode", "SPORT")
            .with("drive_type", "rwd")
    }

    #[test]
    fn test_mixed_case_ambient_is_accepted() {
        let mut warnings = CategoryWarnings::new();
        let out = hv_normalizer()
            .normalize(
                &record("Cold", Scalar::from("Yes")),
                ProcessingMode::SingleRecord,
                &mut warnings,
            )
            .unwrap();

        assert_eq!(out.ambient_temp, 0);
        assert_eq!(out.hvac_on, 1);
        assert_eq!(out.driving_mode, "sport");
        assert_eq!(out.drive_type, "RWD");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unknown_ambient_fails_single_record() {
        let mut warnings = CategoryWarnings::new();
        let err = hv_normalizer()
            .normalize(
                &record("tropical", Scalar::from("no")),
                ProcessingMode::SingleRecord,
                &mut warnings,
            )
            .unwrap_err();

        assert_eq!(
            err,
            ValidationError::InvalidCategory {
                field: "ambient_temp",
                value: "tropical".to_string(),
                expected: AmbientTemp::EXPECTED,
            }
        );
    }

    #[test]
    fn test_unknown_hvac_fails_hv_single_record() {
        let mut warnings = CategoryWarnings::new();
        let err = hv_normalizer()
            .normalize(
                &record("mild", Scalar::from("maybe")),
                ProcessingMode::SingleRecord,
                &mut warnings,
            )
            .unwrap_err();
        assert_eq!(err.field(), "hvac_on");
    }

    #[test]
    fn test_ev_hvac_never_fails() {
        let normalizer = ev_normalizer();
        let mut warnings = CategoryWarnings::new();

        let on = normalizer
            .normalize(&record("hot", Scalar::Flag(true)), ProcessingMode::SingleRecord, &mut warnings)
            .unwrap();
        assert_eq!(on.hvac_on, 1);
        assert_eq!(on.driving_mode, "Sport");

        let odd = normalizer
            .normalize(&record("hot", Scalar::from("maybe")), ProcessingMode::SingleRecord, &mut warnings)
            .unwrap();
        assert_eq!(odd.hvac_on, 0);

        let missing = normalizer
            .normalize(
                &RawRecord::new().with("ambient_temp", "hot"),
                ProcessingMode::SingleRecord,
                &mut warnings,
            )
            .unwrap();
        assert_eq!(missing.hvac_on, 0);
    }

    #[test]
    fn test_batch_defaults_and_records_warnings() {
        let normalizer = hv_normalizer();
        let mut warnings = CategoryWarnings::new();
        let mode = ProcessingMode::Batch { training: true };

        let out = normalizer
            .normalize(&record("tropical", Scalar::from("sometimes")), mode, &mut warnings)
            .unwrap();
        assert_eq!(out.ambient_temp, 0);
        assert_eq!(out.hvac_on, 0);

        normalizer
            .normalize(&record("TROPICAL", Scalar::from("yes")), mode, &mut warnings)
            .unwrap();

        assert_eq!(warnings.invalid_values("ambient_temp"), vec!["tropical"]);
        assert_eq!(warnings.defaulted_rows("ambient_temp"), 2);
        assert_eq!(warnings.invalid_values("hvac_on"), vec!["sometimes"]);
        assert_eq!(warnings.fields().collect::<Vec<_>>(), vec!["ambient_temp", "hvac_on"]);
    }

    #[test]
    fn test_batch_missing_ambient_is_defaulted() {
        let mut warnings = CategoryWarnings::new();
        let out = ev_normalizer()
            .normalize(&RawRecord::new(), ProcessingMode::Batch { training: false }, &mut warnings)
            .unwrap();

        assert_eq!(out.ambient_temp, 0);
        assert_eq!(out.driving_mode, "");
        assert_eq!(warnings.invalid_values("ambient_temp"), vec![MISSING]);
    }

    #[test]
    fn test_lenient_matches_batch_mode() {
        let normalizer = hv_normalizer();
        let record = record("Arctic", Scalar::from("perhaps"));

        let mut batch_warnings = CategoryWarnings::new();
        let batch = normalizer
            .normalize(&record, ProcessingMode::Batch { training: true }, &mut batch_warnings)
            .unwrap();
        let mut lenient_warnings = CategoryWarnings::new();
        let lenient = normalizer.normalize_lenient(&record, &mut lenient_warnings);

        assert_eq!(batch, lenient);
        assert_eq!(lenient.ambient_temp, 0);
        assert_eq!(lenient_warnings.invalid_values("ambient_temp"), vec!["arctic"]);
        assert_eq!(lenient_warnings.invalid_values("hvac_on"), vec!["perhaps"]);
    }

    #[test]
    fn test_strict_rejects_missing_hvac() {
        let err = hv_normalizer()
            .normalize_strict(&RawRecord::new().with("ambient_temp", "mild"))
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidCategory { field: "hvac_on", ref value, .. } if value == MISSING
        ));
    }
}
