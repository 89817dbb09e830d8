//! Candidate rows and sets returned by the DVF and DPE sources.
//!
//! A [`CandidateSet`] is created fresh for each query, narrowed by value
//! through [`crate::reduce`], and read by [`crate::reconcile`] and
//! [`crate::audit`]. Nothing here is shared or persisted.

pub mod value;

pub use value::{FieldValue, Scalar};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Dataset a row or reconciled field comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// Historical sale records (demandes de valeurs foncières).
    #[serde(rename = "DVF")]
    Dvf,
    /// Energy-performance diagnostics.
    #[serde(rename = "DPE")]
    Dpe,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Dvf => "DVF",
            Source::Dpe => "DPE",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static NULL: FieldValue = FieldValue::Null;

/// Ordered mapping from field name to value, tagged with its source.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRow {
    source: Source,
    fields: Vec<(String, FieldValue)>,
}

impl CandidateRow {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            fields: Vec::new(),
        }
    }

    /// Builder form of [`CandidateRow::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Build a row from a JSON object, keeping key order.
    pub fn from_json_object(
        source: Source,
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        let mut row = Self::new(source);
        for (key, value) in object {
            row.insert(key.as_str(), FieldValue::from_json(value));
        }
        row
    }

    pub fn source(&self) -> Source {
        self.source
    }

    /// Value of `name`, or `Null` when the row has no such field.
    pub fn get(&self, name: &str) -> &FieldValue {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .unwrap_or(&NULL)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reorder fields to `schema`, filling absent names with `Null`.
    fn conform(mut self, source: Source, schema: &[String]) -> Self {
        let mut fields = Vec::with_capacity(schema.len());
        for name in schema {
            let value = match self.fields.iter().position(|(n, _)| n == name) {
                Some(i) => self.fields.swap_remove(i).1,
                None => FieldValue::Null,
            };
            fields.push((name.clone(), value));
        }
        Self { source, fields }
    }
}

impl Serialize for CandidateRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Rows from one source that matched the same address or coordinates.
///
/// Every row carries exactly the fields of `schema`, in schema order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSet {
    source: Source,
    schema: Vec<String>,
    rows: Vec<CandidateRow>,
}

impl CandidateSet {
    /// Empty set with no schema.
    pub fn new(source: Source) -> Self {
        Self {
            source,
            schema: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Empty set that still knows its columns.
    pub fn with_schema(source: Source, schema: Vec<String>) -> Self {
        Self {
            source,
            schema,
            rows: Vec::new(),
        }
    }

    /// Collect rows into a set. The schema is the union of all field names
    /// in first-seen order; missing cells become `Null`.
    pub fn from_rows(source: Source, rows: Vec<CandidateRow>) -> Self {
        let mut schema: Vec<String> = Vec::new();
        for row in &rows {
            for name in row.field_names() {
                if !schema.iter().any(|s| s == name) {
                    schema.push(name.to_string());
                }
            }
        }

        let rows = rows
            .into_iter()
            .map(|row| row.conform(source, &schema))
            .collect();

        Self {
            source,
            schema,
            rows,
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    pub fn rows(&self) -> &[CandidateRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep only the rows matching `keep`. Schema is unchanged.
    pub fn retain<F>(mut self, mut keep: F) -> Self
    where
        F: FnMut(&CandidateRow) -> bool,
    {
        self.rows.retain(|row| keep(row));
        self
    }

    /// Distinct non-null values of `field`, sorted ascending.
    ///
    /// Values that compare equal (e.g. two lists holding the same elements
    /// in different order) collapse to the first one seen, so the result
    /// keeps the original shape of that cell.
    pub fn distinct_values(&self, field: &str) -> Vec<FieldValue> {
        let mut values: Vec<FieldValue> = self
            .rows
            .iter()
            .map(|row| row.get(field))
            .filter(|v| !v.is_null())
            .cloned()
            .collect();
        // stable sort: the first-seen representative heads each run of equals
        values.sort();
        values.dedup();
        values
    }
}
