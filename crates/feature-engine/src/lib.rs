//! Feature Engineering Engine
//!
//! Turns raw EV/HV records into model-ready tables: category normalization,
//! derived features, one-hot encoding and alignment to the per-class
//! feature reference the models were trained against.

mod aligner;
mod derived;
mod encoder;
mod pipeline;
mod profile;
mod reference;
mod table;

pub use aligner::{AlignmentReport, FeatureAligner};
pub use derived::{derive_ev, derive_hv, DeriveFn, EV_DERIVED, HV_DERIVED};
pub use encoder::CategoricalEncoder;
pub use pipeline::{BatchOutput, PreprocessingPipeline};
pub use profile::{VehicleProfile, CATEGORICAL_FIELDS, NORMALIZED_COLUMNS};
pub use reference::{FeatureReference, EV_FEATURES, EV_REFERENCE, HV_FEATURES, HV_REFERENCE};
pub use table::{AlignedTable, FeatureRow, FeatureTable};

use data_validator::VehicleClass;
use thiserror::Error;

/// Feature reference errors, raised by the startup self-check
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("[{vehicle}] Feature reference lists '{column}' more than once")]
    DuplicateColumn {
        vehicle: VehicleClass,
        column: &'static str,
    },

    #[error("[{vehicle}] Feature reference drift: missing {missing:?}, unreferenced {unreferenced:?}")]
    Drift {
        vehicle: VehicleClass,
        /// Reference columns the pipeline never emits
        missing: Vec<String>,
        /// Emitted columns absent from the reference
        unreferenced: Vec<String>,
    },
}
