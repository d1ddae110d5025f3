//! Categorical (One-Hot) Encoding

use crate::table::FeatureRow;

/// One-hot encoder over a fixed vocabulary.
///
/// Every vocabulary member gets an indicator column on every row, whether or
/// not the member occurs in the batch, so a batch of one produces the same
/// column set as a full training batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoricalEncoder {
    field: &'static str,
    vocabulary: &'static [&'static str],
}

impl CategoricalEncoder {
    /// Create an encoder for `field` over `vocabulary`
    pub const fn new(field: &'static str, vocabulary: &'static [&'static str]) -> Self {
        Self { field, vocabulary }
    }

    /// Source field name
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Vocabulary members in indicator order
    pub fn vocabulary(&self) -> &'static [&'static str] {
        self.vocabulary
    }

    /// Indicator column name of a member
    pub fn column_name(&self, member: &str) -> String {
        format!("{}_{}", self.field, member)
    }

    /// All indicator column names
    pub fn columns(&self) -> Vec<String> {
        self.vocabulary.iter().map(|m| self.column_name(m)).collect()
    }

    /// Write the indicator columns for `token`; returns whether it was in the vocabulary
    pub fn encode(&self, token: &str, row: &mut FeatureRow) -> bool {
        let mut matched = false;
        for member in self.vocabulary {
            let hit = *member == token;
            matched |= hit;
            row.insert(self.column_name(member), if hit { 1.0 } else { 0.0 });
        }
        matched
    }
}
