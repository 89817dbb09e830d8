//! Field reconciliation.
//!
//! Merges the reduced DVF and DPE sets into one [`ReconciledRecord`]: one
//! entry per tracked field name and source, holding the single distinct
//! value, every distinct value when the sources disagree, or nothing.

use crate::record::{CandidateSet, FieldValue, Source};
use serde::{Serialize, Serializer};
use std::fmt;

/// Outcome for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconciledValue {
    /// No row had a value.
    Missing,
    /// Exactly one distinct value (which may itself be a list cell).
    Single(FieldValue),
    /// Several distinct values, sorted ascending. The user picks one at
    /// display time.
    Multiple(Vec<FieldValue>),
}

impl ReconciledValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, ReconciledValue::Missing)
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, ReconciledValue::Multiple(_))
    }

    /// Candidate values, empty when missing.
    pub fn candidates(&self) -> &[FieldValue] {
        match self {
            ReconciledValue::Missing => &[],
            ReconciledValue::Single(v) => std::slice::from_ref(v),
            ReconciledValue::Multiple(vs) => vs,
        }
    }

    fn from_distinct(mut distinct: Vec<FieldValue>) -> Self {
        match distinct.len() {
            0 => ReconciledValue::Missing,
            1 => ReconciledValue::Single(distinct.remove(0)),
            _ => ReconciledValue::Multiple(distinct),
        }
    }
}

impl Serialize for ReconciledValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ReconciledValue::Missing => serializer.serialize_none(),
            ReconciledValue::Single(v) => v.serialize(serializer),
            ReconciledValue::Multiple(vs) => vs.serialize(serializer),
        }
    }
}

impl fmt::Display for ReconciledValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconciledValue::Missing => f.write_str("-"),
            ReconciledValue::Single(v) => write!(f, "{}", v),
            ReconciledValue::Multiple(vs) => {
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", v)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledField {
    pub name: String,
    pub value: ReconciledValue,
    pub source: Source,
}

/// Fields in tracking order: transaction fields first, then diagnostic
/// fields. A name tracked by both sources appears twice.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReconciledRecord {
    fields: Vec<ReconciledField>,
}

impl ReconciledRecord {
    pub fn fields(&self) -> &[ReconciledField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str, source: Source) -> Option<&ReconciledField> {
        self.fields
            .iter()
            .find(|f| f.name == name && f.source == source)
    }

    pub fn by_source(&self, source: Source) -> impl Iterator<Item = &ReconciledField> {
        self.fields.iter().filter(move |f| f.source == source)
    }

    /// Fields still holding several candidate values.
    pub fn ambiguous(&self) -> impl Iterator<Item = &ReconciledField> {
        self.fields.iter().filter(|f| f.value.is_multiple())
    }

    /// Settle a multi-valued field on one of its candidates.
    ///
    /// Returns `false` (and changes nothing) when the field does not exist,
    /// is not multi-valued, or `index` is out of range.
    pub fn select(&mut self, name: &str, source: Source, index: usize) -> bool {
        let Some(field) = self
            .fields
            .iter_mut()
            .find(|f| f.name == name && f.source == source)
        else {
            return false;
        };

        match &mut field.value {
            ReconciledValue::Multiple(values) if index < values.len() => {
                let chosen = values.swap_remove(index);
                field.value = ReconciledValue::Single(chosen);
                true
            }
            _ => false,
        }
    }
}

/// Reconcile one field of `rows`.
pub fn reconcile_field(name: &str, rows: &CandidateSet, source: Source) -> ReconciledField {
    ReconciledField {
        name: name.to_string(),
        value: ReconciledValue::from_distinct(rows.distinct_values(name)),
        source,
    }
}

/// Merge the reduced sets into one record.
///
/// Pure and deterministic: the same inputs always produce the same record,
/// with multi-valued entries sorted ascending.
pub fn reconcile<T, D>(
    transaction_rows: &CandidateSet,
    diagnostic_rows: &CandidateSet,
    transaction_fields: &[T],
    diagnostic_fields: &[D],
) -> ReconciledRecord
where
    T: AsRef<str>,
    D: AsRef<str>,
{
    let transactions = transaction_fields
        .iter()
        .map(|name| reconcile_field(name.as_ref(), transaction_rows, Source::Dvf));
    let diagnostics = diagnostic_fields
        .iter()
        .map(|name| reconcile_field(name.as_ref(), diagnostic_rows, Source::Dpe));

    ReconciledRecord {
        fields: transactions.chain(diagnostics).collect(),
    }
}

/// Configured diagnostic fields, followed by every other column of `set`
/// when `include_all_columns` is on.
pub fn diagnostic_field_list(
    configured: &[String],
    include_all_columns: bool,
    set: &CandidateSet,
) -> Vec<String> {
    let mut fields = configured.to_vec();
    if include_all_columns {
        for column in set.schema() {
            if !fields.contains(column) {
                fields.push(column.clone());
            }
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CandidateRow, Scalar};
    use serde_json::json;

    fn dvf_fields() -> Vec<&'static str> {
        vec!["surface_reelle_bati", "nombre_pieces_principales", "surface_terrain"]
    }

    fn dvf_row(bati: i64, pieces: i64) -> CandidateRow {
        CandidateRow::new(Source::Dvf)
            .with("surface_reelle_bati", bati)
            .with("nombre_pieces_principales", pieces)
            .with("surface_terrain", FieldValue::Null)
    }

    #[test]
    fn test_single_missing_and_multiple() {
        let dvf = CandidateSet::from_rows(Source::Dvf, vec![dvf_row(80, 3), dvf_row(80, 4)]);
        let dpe = CandidateSet::new(Source::Dpe);
        let record = reconcile(&dvf, &dpe, &dvf_fields(), &["surface_habitable_logement"]);

        assert_eq!(record.len(), 4);
        assert_eq!(
            record.get("surface_reelle_bati", Source::Dvf).unwrap().value,
            ReconciledValue::Single(FieldValue::from(80i64))
        );
        assert_eq!(
            record.get("nombre_pieces_principales", Source::Dvf).unwrap().value,
            ReconciledValue::Multiple(vec![FieldValue::from(3i64), FieldValue::from(4i64)])
        );
        assert!(record.get("surface_terrain", Source::Dvf).unwrap().value.is_missing());
        assert!(record
            .get("surface_habitable_logement", Source::Dpe)
            .unwrap()
            .value
            .is_missing());
    }

    #[test]
    fn test_order_and_duplicate_names() {
        let dvf = CandidateSet::from_rows(Source::Dvf, vec![dvf_row(80, 3)]);
        let dpe = CandidateSet::from_rows(
            Source::Dpe,
            vec![CandidateRow::new(Source::Dpe).with("surface", 81i64)],
        );
        let record = reconcile(&dvf, &dpe, &["surface", "b"], &["surface", "a"]);

        let names: Vec<(&str, Source)> = record
            .fields()
            .iter()
            .map(|f| (f.name.as_str(), f.source))
            .collect();
        assert_eq!(
            names,
            vec![
                ("surface", Source::Dvf),
                ("b", Source::Dvf),
                ("surface", Source::Dpe),
                ("a", Source::Dpe),
            ]
        );
        assert!(record.get("surface", Source::Dvf).unwrap().value.is_missing());
        assert_eq!(
            record.get("surface", Source::Dpe).unwrap().value,
            ReconciledValue::Single(FieldValue::from(81i64))
        );
    }

    #[test]
    fn test_list_cells_restored_in_original_shape() {
        let original = FieldValue::List(vec![Scalar::from("gaz"), Scalar::from("electricite")]);
        let permuted = FieldValue::List(vec![Scalar::from("electricite"), Scalar::from("gaz")]);
        let dpe = CandidateSet::from_rows(
            Source::Dpe,
            vec![
                CandidateRow::new(Source::Dpe).with("energies", original.clone()),
                CandidateRow::new(Source::Dpe).with("energies", permuted),
            ],
        );
        let no_fields: [&str; 0] = [];
        let record = reconcile(&CandidateSet::new(Source::Dvf), &dpe, &no_fields, &["energies"]);

        match &record.get("energies", Source::Dpe).unwrap().value {
            ReconciledValue::Single(FieldValue::List(items)) => {
                assert_eq!(items, &vec![Scalar::from("gaz"), Scalar::from("electricite")]);
            }
            other => panic!("expected single list, got {:?}", other),
        }
    }

    #[test]
    fn test_select_settles_multiple() {
        let dvf = CandidateSet::from_rows(Source::Dvf, vec![dvf_row(80, 3), dvf_row(95, 3)]);
        let no_fields: [&str; 0] = [];
        let mut record = reconcile(&dvf, &CandidateSet::new(Source::Dpe), &dvf_fields(), &no_fields);

        assert_eq!(record.ambiguous().count(), 1);
        assert!(!record.select("surface_reelle_bati", Source::Dpe, 0));
        assert!(!record.select("surface_reelle_bati", Source::Dvf, 9));
        assert!(record.select("surface_reelle_bati", Source::Dvf, 1));
        assert_eq!(
            record.get("surface_reelle_bati", Source::Dvf).unwrap().value,
            ReconciledValue::Single(FieldValue::from(95i64))
        );
        assert!(!record.select("nombre_pieces_principales", Source::Dvf, 0));
        assert_eq!(record.ambiguous().count(), 0);
    }

    #[test]
    fn test_large_numbers_reconcile_regardless_of_row_order() {
        let values = [
            FieldValue::from(1i64 << 53),
            FieldValue::from((1u64 << 53) as f64),
            FieldValue::from((1i64 << 53) + 1),
        ];
        let rows = |order: &[usize]| {
            CandidateSet::from_rows(
                Source::Dvf,
                order
                    .iter()
                    .map(|&i| CandidateRow::new(Source::Dvf).with("prix", values[i].clone()))
                    .collect(),
            )
        };
        let no_fields: [&str; 0] = [];
        let empty = CandidateSet::new(Source::Dpe);

        let forward = reconcile(&rows(&[0, 1, 2]), &empty, &["prix"], &no_fields);
        let backward = reconcile(&rows(&[2, 1, 0]), &empty, &["prix"], &no_fields);
        assert_eq!(forward, backward);

        let candidates = forward.get("prix", Source::Dvf).unwrap().value.candidates().to_vec();
        assert_eq!(candidates.len(), 2);
        assert!(candidates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_serialized_shape() {
        let dvf = CandidateSet::from_rows(Source::Dvf, vec![dvf_row(80, 3), dvf_row(80, 4)]);
        let no_fields: [&str; 0] = [];
        let record = reconcile(&dvf, &CandidateSet::new(Source::Dpe), &dvf_fields(), &no_fields);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!([
                {"name": "surface_reelle_bati", "value": 80, "source": "DVF"},
                {"name": "nombre_pieces_principales", "value": [3, 4], "source": "DVF"},
                {"name": "surface_terrain", "value": null, "source": "DVF"},
            ])
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ReconciledValue::Missing.to_string(), "-");
        assert_eq!(
            ReconciledValue::Multiple(vec![FieldValue::from(1i64), FieldValue::from(2i64)])
                .to_string(),
            "1 | 2"
        );
    }

    #[test]
    fn test_diagnostic_field_list() {
        let dpe = CandidateSet::from_rows(
            Source::Dpe,
            vec![CandidateRow::new(Source::Dpe)
                .with("numero_dpe", "A")
                .with("etiquette_dpe", "D")
                .with("extra", 1i64)],
        );
        let configured = vec!["etiquette_dpe".to_string(), "numero_dpe".to_string()];

        assert_eq!(diagnostic_field_list(&configured, false, &dpe), configured);
        assert_eq!(
            diagnostic_field_list(&configured, true, &dpe),
            vec!["etiquette_dpe", "numero_dpe", "extra"]
        );
    }
}
