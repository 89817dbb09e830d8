//! Field values carried by candidate rows.
//!
//! Source data mixes numbers, dates, free text and the occasional
//! list-shaped cell in the same column, so every cell is a [`FieldValue`]:
//! `Null`, a single [`Scalar`], or a `List` of scalars.

use chrono::NaiveDate;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// A single typed cell value.
///
/// Ordering is total: integers and floats compare numerically with each
/// other (so `80` and `80.0` are the same value), dates chronologically,
/// text lexicographically. Across kinds: `Bool < number < Date < Text`.
#[derive(Debug, Clone)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
}

impl Scalar {
    fn kind_rank(&self) -> u8 {
        match self {
            Scalar::Bool(_) => 0,
            Scalar::Int(_) | Scalar::Float(_) => 1,
            Scalar::Date(_) => 2,
            Scalar::Text(_) => 3,
        }
    }

    /// Parse a raw text cell. Returns `None` for blank input.
    ///
    /// Integers with a leading zero (postal codes, INSEE codes) stay text
    /// so they keep their digits. Exponent notation is not treated as a
    /// number because diagnostic ids such as `2175E3…` would otherwise be
    /// read as floats.
    pub fn parse(raw: &str) -> Option<Scalar> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }

        match s {
            "true" => return Some(Scalar::Bool(true)),
            "false" => return Some(Scalar::Bool(false)),
            _ => {}
        }

        if looks_numeric(s) {
            let digits = s.trim_start_matches(['-', '+']);
            let leading_zero =
                digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.");
            if !leading_zero {
                if let Ok(i) = s.parse::<i64>() {
                    return Some(Scalar::Int(i));
                }
                if let Ok(f) = s.parse::<f64>() {
                    if f.is_finite() {
                        return Some(Scalar::Float(f));
                    }
                }
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(Scalar::Date(date));
        }

        Some(Scalar::Text(s.to_string()))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }
}

fn looks_numeric(s: &str) -> bool {
    let body = s.strip_prefix(['-', '+']).unwrap_or(s);
    !body.is_empty()
        && body.chars().any(|c| c.is_ascii_digit())
        && body.chars().all(|c| c.is_ascii_digit() || c == '.')
        && body.chars().filter(|&c| c == '.').count() <= 1
}

/// Exact order between an integer and a float.
///
/// Integers above 2^53 round when cast, so a tie on the cast is settled
/// on the integral value of the float.
fn cmp_int_float(a: i64, b: f64) -> Ordering {
    match (a as f64).total_cmp(&b) {
        Ordering::Equal => i128::from(a).cmp(&(b as i128)),
        ord => ord,
    }
}

impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => a.cmp(b),
            (Scalar::Int(a), Scalar::Int(b)) => a.cmp(b),
            (Scalar::Int(a), Scalar::Float(b)) => cmp_int_float(*a, *b),
            (Scalar::Float(a), Scalar::Int(b)) => cmp_int_float(*b, *a).reverse(),
            (Scalar::Float(a), Scalar::Float(b)) => a.total_cmp(b),
            (Scalar::Date(a), Scalar::Date(b)) => a.cmp(b),
            (Scalar::Text(a), Scalar::Text(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scalar {}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::Float(x) => serializer.serialize_f64(*x),
            Scalar::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            Scalar::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<NaiveDate> for Scalar {
    fn from(v: NaiveDate) -> Self {
        Scalar::Date(v)
    }
}

/// One cell of a candidate row.
#[derive(Debug, Clone, Default)]
pub enum FieldValue {
    #[default]
    Null,
    Scalar(Scalar),
    /// Multi-valued cell. Element order is kept as received; equality and
    /// ordering ignore it.
    List(Vec<Scalar>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Parse a CSV cell.
    pub fn from_cell(raw: &str) -> Self {
        Scalar::parse(raw).map_or(FieldValue::Null, FieldValue::Scalar)
    }

    /// Convert a JSON value from a dataset API response.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Array(items) => {
                let scalars: Vec<Scalar> = items.iter().filter_map(json_scalar).collect();
                if scalars.is_empty() {
                    FieldValue::Null
                } else {
                    FieldValue::List(scalars)
                }
            }
            other => json_scalar(other).map_or(FieldValue::Null, FieldValue::Scalar),
        }
    }

    /// Order-independent view of the value, used for equality and sorting.
    fn comparable(&self) -> Comparable<'_> {
        match self {
            FieldValue::Null => Comparable::Null,
            FieldValue::Scalar(s) => Comparable::Scalar(s),
            FieldValue::List(items) => {
                let mut sorted: Vec<&Scalar> = items.iter().collect();
                sorted.sort();
                Comparable::List(sorted)
            }
        }
    }
}

fn json_scalar(value: &serde_json::Value) -> Option<Scalar> {
    use serde_json::Value;

    match value {
        Value::Null => None,
        Value::Bool(b) => Some(Scalar::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Scalar::Int(i)),
            None => n.as_f64().map(Scalar::Float),
        },
        Value::String(s) => Scalar::parse(s),
        nested => Some(Scalar::Text(nested.to_string())),
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum Comparable<'a> {
    Null,
    Scalar(&'a Scalar),
    List(Vec<&'a Scalar>),
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.comparable().cmp(&other.comparable())
    }
}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Scalar(s) => write!(f, "{}", s),
            FieldValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_none(),
            FieldValue::Scalar(s) => s.serialize(serializer),
            FieldValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl From<Scalar> for FieldValue {
    fn from(v: Scalar) -> Self {
        FieldValue::Scalar(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Scalar(Scalar::Int(v))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Scalar(Scalar::Float(v))
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Scalar(Scalar::Text(v.to_string()))
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        FieldValue::Scalar(Scalar::Date(v))
    }
}
