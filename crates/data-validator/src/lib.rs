//! Raw Input Validation and Normalization
//!
//! Typed request records, loosely-typed batch rows, the per-class category
//! vocabularies and the category/unit normalizer that sits in front of the
//! feature pipeline.

mod error;
mod normalizer;
mod record;
mod vocabulary;

pub use error::ValidationError;
pub use normalizer::{
    CategoryNormalizer, CategoryWarnings, NormalizedCategories, NormalizerConfig, ProcessingMode,
};
pub use record::{EvInput, HvInput, RawRecord, Scalar};
pub use vocabulary::{yes_no, AmbientTemp, Casing, HvacPolicy, VehicleClass};
