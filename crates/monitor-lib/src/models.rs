//! Core data models for the water quality monitor

use serde::{Deserialize, Serialize};

/// Ordered set of named measurements submitted to the classifier.
///
/// The scoring wire format splits names and values into parallel
/// arrays, so insertion order is preserved exactly as given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    entries: Vec<(String, f64)>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a record from name/value pairs, keeping their order.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            entries: pairs.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }

    /// Append a measurement at the end of the record.
    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.entries.push((name.into(), value));
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Values in the same order as `field_names`.
    pub fn value_row(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The nine measurements of the water potability model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterReadings {
    pub ph: f64,
    pub hardness: f64,
    pub solids: f64,
    pub chloramines: f64,
    pub sulfate: f64,
    pub conductivity: f64,
    pub organic_carbon: f64,
    pub trihalomethanes: f64,
    pub turbidity: f64,
}

impl WaterReadings {
    /// Convert to a feature record using the model's field names, in
    /// the order the deployed model was trained with.
    pub fn to_record(&self) -> FeatureRecord {
        FeatureRecord::from_pairs([
            ("ph", self.ph),
            ("Hardness", self.hardness),
            ("Solids", self.solids),
            ("Chloramines", self.chloramines),
            ("Sulfate", self.sulfate),
            ("Conductivity", self.conductivity),
            ("Organic_carbon", self.organic_carbon),
            ("Trihalomethanes", self.trihalomethanes),
            ("Turbidity", self.turbidity),
        ])
    }
}

/// Outcome of one scoring call.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    /// Predicted class label, kept as received.
    pub label: serde_json::Value,
    /// Full response envelope for raw display.
    pub response: serde_json::Value,
    pub generated_at: i64,
}

/// Binary potability verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Potability {
    Potable,
    NonPotable,
}

impl Potability {
    /// Interpret a raw class label. Potable only when the label equals
    /// 1 numerically; every other value, numeric or not, reads as
    /// non-potable.
    pub fn from_label(label: &serde_json::Value) -> Self {
        match label.as_f64() {
            Some(v) if v == 1.0 => Potability::Potable,
            _ => Potability::NonPotable,
        }
    }

    pub fn is_potable(self) -> bool {
        self == Potability::Potable
    }
}
