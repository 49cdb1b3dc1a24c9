//! Averages normalized z-scores and maps the mean onto a risk category.

use serde::Serialize;
use tracing::warn;
use ts_rs::TS;

use caresense_core::models::risk::RiskCategory;

use crate::ComponentZ;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct CompositeRisk {
    pub mean_z: f64,
    pub category: RiskCategory,
    pub contributions: Vec<ComponentZ>,
}

/// Unweighted mean. Absent tests are simply not in `values`; `None` when
/// there is nothing to average.
pub fn mean_z(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Upper bounds are inclusive: exactly -2.0 is CRITICAL, exactly -1.5 HIGH,
/// exactly -1.0 MODERATE.
pub fn classify(mean: f64) -> RiskCategory {
    if mean <= -2.0 {
        RiskCategory::Critical
    } else if mean <= -1.5 {
        RiskCategory::High
    } else if mean <= -1.0 {
        RiskCategory::Moderate
    } else {
        RiskCategory::Low
    }
}

/// Classify from whichever components were scored.
pub fn composite(scores: &[ComponentZ]) -> Option<CompositeRisk> {
    let contributions: Vec<ComponentZ> = scores
        .iter()
        .filter(|s| {
            let finite = s.normalized_z.is_finite();
            if !finite {
                warn!(component = %s.component, "dropping non-finite z-score from composite");
            }
            finite
        })
        .copied()
        .collect();

    let values: Vec<f64> = contributions.iter().map(|s| s.normalized_z).collect();
    let mean = mean_z(&values)?;
    Some(CompositeRisk {
        mean_z: mean,
        category: classify(mean),
        contributions,
    })
}
