//! Rule-Based Suggestion Engine
//!
//! Fixed, ordered threshold rules over a raw vehicle record. Independent of
//! the feature pipeline and the models.

mod rules;

pub use rules::{hvac_active, SuggestionEngine, SuggestionRule, EV_FALLBACK, HV_FALLBACK};
