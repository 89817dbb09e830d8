//! Usage audit: which raw columns made it into the reconciled record.

use crate::reconcile::ReconciledRecord;
use crate::record::{CandidateSet, Source};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageMarker {
    pub field: String,
    pub used: bool,
}

/// One marker per column of a source set, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UsageMap {
    markers: Vec<UsageMarker>,
}

impl UsageMap {
    pub fn markers(&self) -> &[UsageMarker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// `false` for unknown fields.
    pub fn is_used(&self, field: &str) -> bool {
        self.markers.iter().any(|m| m.field == field && m.used)
    }

    pub fn used_fields(&self) -> impl Iterator<Item = &str> {
        self.markers
            .iter()
            .filter(|m| m.used)
            .map(|m| m.field.as_str())
    }

    /// Column names with used ones first, each group in schema order.
    pub fn used_first(&self) -> Vec<&str> {
        let unused = self.markers.iter().filter(|m| !m.used).map(|m| m.field.as_str());
        self.used_fields().chain(unused).collect()
    }
}

/// Mark each column of `source_rows` as used when `record` holds a non-missing
/// value for it under `source`.
pub fn audit(record: &ReconciledRecord, source_rows: &CandidateSet, source: Source) -> UsageMap {
    let markers = source_rows
        .schema()
        .iter()
        .map(|field| UsageMarker {
            field: field.clone(),
            used: record
                .get(field, source)
                .is_some_and(|f| !f.value.is_missing()),
        })
        .collect();

    UsageMap { markers }
}
