//! Derived feature values and per-patient output rows

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::PatientId;

/// A scalar value in a derived feature table
///
/// Every flag derived relative to an anchor date is a plain `Bool` and is
/// `false` when the anchor is absent; dates, numbers and categories carry
/// their absence as `None` and serialize to an empty field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FeatureValue {
    /// Boolean flag
    Bool(bool),
    /// Date column, possibly absent
    Date(Option<NaiveDate>),
    /// Integer column, possibly absent
    Int(Option<i64>),
    /// Categorical column, possibly absent
    Category(Option<String>),
}

impl FeatureValue {
    /// The value as a boolean, if it is one
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as a date, if it is a present date
    #[must_use]
    pub const fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => *d,
            _ => None,
        }
    }

    /// The value as an integer, if it is a present integer
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => *i,
            _ => None,
        }
    }

    /// The value as a category, if it is a present category
    #[must_use]
    pub fn as_category(&self) -> Option<&str> {
        match self {
            Self::Category(c) => c.as_deref(),
            _ => None,
        }
    }

    /// Render the value as a CSV output field
    #[must_use]
    pub fn to_output_field(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Date(Some(d)) => d.format("%Y-%m-%d").to_string(),
            Self::Int(Some(i)) => i.to_string(),
            Self::Category(Some(c)) => c.clone(),
            Self::Date(None) | Self::Int(None) | Self::Category(None) => String::new(),
        }
    }
}

/// One output row: a patient identifier plus named feature values
///
/// Column order is fixed by the dataset definition and identical for every
/// row of a table.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureRow {
    /// Patient this row describes
    pub patient_id: PatientId,
    values: Vec<(String, FeatureValue)>,
}

impl FeatureRow {
    /// Create an empty row for a patient
    #[must_use]
    pub fn new(patient_id: PatientId) -> Self {
        Self {
            patient_id,
            values: Vec::new(),
        }
    }

    /// Append a named value
    pub fn push(&mut self, name: impl Into<String>, value: FeatureValue) {
        self.values.push((name.into(), value));
    }

    /// Look up a value by column name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Column names in definition order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
    }

    /// Values in definition order
    pub fn values(&self) -> impl Iterator<Item = &FeatureValue> {
        self.values.iter().map(|(_, v)| v)
    }

    /// Number of feature columns (excluding the patient id)
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row carries no feature columns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
