// src/types.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved key the scoring service adds to every returned row.
pub const PREDICTION_KEY: &str = "prediction";

/// A single CSV cell after type inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// A cell becomes a number only if the number prints back exactly as
    /// written. `00123`, `1.50` or values outside `i64` stay text.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            if i.to_string() == trimmed {
                return Scalar::Integer(i);
            }
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() && f.to_string() == trimmed => Scalar::Float(f),
            _ => Scalar::Text(raw.to_string()),
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        match s {
            Scalar::Integer(i) => Value::from(i),
            Scalar::Float(f) => Value::from(f),
            Scalar::Text(t) => Value::String(t),
        }
    }
}

/// One parsed data row: column name to cell, in header order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowRecord(Map<String, Value>);

impl RowRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Scalar) {
        self.0.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Scalar)> for RowRecord {
    fn from_iter<I: IntoIterator<Item = (K, Scalar)>>(iter: I) -> Self {
        let mut row = RowRecord::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// Binary churn outcome. Wire values: `1` churn, `0` no churn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prediction {
    NoChurn,
    Churn,
}

impl Prediction {
    pub fn label(&self) -> &'static str {
        match self {
            Prediction::NoChurn => "No Churn",
            Prediction::Churn => "Will Churn",
        }
    }

    /// Accepts `0`/`1`, also as `0.0`/`1.0` since some serializers emit floats.
    pub fn from_value(v: &Value) -> Option<Self> {
        if let Some(n) = v.as_u64() {
            return match n {
                0 => Some(Prediction::NoChurn),
                1 => Some(Prediction::Churn),
                _ => None,
            };
        }
        match v.as_f64() {
            Some(f) if f == 0.0 => Some(Prediction::NoChurn),
            Some(f) if f == 1.0 => Some(Prediction::Churn),
            _ => None,
        }
    }
}

/// A row as returned by the scoring service, `prediction` field included.
/// The object is kept exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PredictionRecord {
    raw: Map<String, Value>,
    #[serde(skip)]
    prediction: Prediction,
}

impl PredictionRecord {
    pub fn prediction(&self) -> Prediction {
        self.prediction
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.raw.get(column)
    }

    /// Input fields only, in response order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.raw
            .iter()
            .filter(|(k, _)| k.as_str() != PREDICTION_KEY)
            .map(|(k, v)| (k.as_str(), v))
    }
}

impl TryFrom<Value> for PredictionRecord {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let raw = match value {
            Value::Object(map) => map,
            other => return Err(format!("expected an object, got {other}")),
        };
        let prediction = match raw.get(PREDICTION_KEY) {
            None => return Err(format!("missing `{PREDICTION_KEY}` field")),
            Some(v) => Prediction::from_value(v)
                .ok_or_else(|| format!("`{PREDICTION_KEY}` must be 0 or 1, got {v}"))?,
        };
        Ok(Self { raw, prediction })
    }
}

/// Ordered predictions from one completed run; response order is display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionSet {
    records: Vec<PredictionRecord>,
    received_at: Option<DateTime<Utc>>,
}

impl PredictionSet {
    pub fn new(records: Vec<PredictionRecord>) -> Self {
        Self {
            records,
            received_at: Some(Utc::now()),
        }
    }

    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PredictionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// When the backend answered; `None` until a run has completed.
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        self.received_at
    }

    /// Table columns: the first record's keys without `prediction`.
    pub fn columns(&self) -> Vec<String> {
        self.records
            .first()
            .map(|r| r.fields().map(|(k, _)| k.to_string()).collect())
            .unwrap_or_default()
    }
}

impl<'a> IntoIterator for &'a PredictionSet {
    type Item = &'a PredictionRecord;
    type IntoIter = std::slice::Iter<'a, PredictionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// `customer_id` → `CUSTOMER ID`.
pub fn column_label(column: &str) -> String {
    column.replace('_', " ").to_uppercase()
}
