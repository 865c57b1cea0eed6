//! Potability verdict interpretation.
//!
//! Pure mapping from a prediction to a displayable assessment. Each
//! prediction is assessed on its own; there is no alert history and
//! no suppression window.

use crate::models::{FeatureRecord, Potability, Prediction};

/// Outcome of interpreting one prediction.
#[derive(Debug, Clone, PartialEq)]
pub enum Assessment {
    /// Water predicted safe to drink. Nothing needs surfacing.
    Potable,
    /// Water predicted unsafe. Carries the submitted readings so every
    /// field can be surfaced for inspection.
    NonPotable { readings: FeatureRecord },
}

impl Assessment {
    pub fn is_potable(&self) -> bool {
        matches!(self, Assessment::Potable)
    }

    /// Headline shared by the CLI and the dashboard.
    pub fn headline(&self) -> &'static str {
        match self {
            Assessment::Potable => "Water is predicted to be POTABLE (safe for consumption)",
            Assessment::NonPotable { .. } => {
                "Water is predicted to be NON-POTABLE (not safe for consumption)"
            }
        }
    }
}

/// Interpret a prediction against the record that produced it.
pub fn assess(prediction: &Prediction, record: &FeatureRecord) -> Assessment {
    if Potability::from_label(&prediction.label).is_potable() {
        Assessment::Potable
    } else {
        Assessment::NonPotable {
            readings: record.clone(),
        }
    }
}
