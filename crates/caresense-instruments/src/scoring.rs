use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use caresense_core::models::results::TestKind;

/// Whether a higher raw value is a better or a worse outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Polarity {
    /// Higher raw = better (scores, item tallies).
    Performance,
    /// Lower raw = better (completion times).
    Time,
}

/// A single standardized measure. TMT contributes two, every other test one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ScoreComponent {
    DigitSpan,
    TmtA,
    TmtB,
    Stroop,
    Meem,
    ClockDrawing,
}

impl ScoreComponent {
    pub const ALL: [ScoreComponent; 6] = [
        ScoreComponent::DigitSpan,
        ScoreComponent::TmtA,
        ScoreComponent::TmtB,
        ScoreComponent::Stroop,
        ScoreComponent::Meem,
        ScoreComponent::ClockDrawing,
    ];

    /// Key used in the normative table.
    pub fn id(&self) -> &'static str {
        match self {
            Self::DigitSpan => "digit_span",
            Self::TmtA => "tmt_a",
            Self::TmtB => "tmt_b",
            Self::Stroop => "stroop",
            Self::Meem => "meem",
            Self::ClockDrawing => "clock_drawing",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    pub fn polarity(&self) -> Polarity {
        match self {
            Self::DigitSpan | Self::Meem | Self::ClockDrawing => Polarity::Performance,
            Self::TmtA | Self::TmtB | Self::Stroop => Polarity::Time,
        }
    }

    pub fn test_kind(&self) -> TestKind {
        match self {
            Self::DigitSpan => TestKind::DigitSpan,
            Self::TmtA | Self::TmtB => TestKind::Tmt,
            Self::Stroop => TestKind::Stroop,
            Self::Meem => TestKind::Meem,
            Self::ClockDrawing => TestKind::ClockDrawing,
        }
    }
}

impl std::fmt::Display for ScoreComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// `(raw - mean) / sd`. A zero deviation carries no normative spread, so
/// the score is 0 rather than an error.
pub fn z_score(raw: f64, mean: f64, standard_deviation: f64) -> f64 {
    if standard_deviation == 0.0 {
        return 0.0;
    }
    (raw - mean) / standard_deviation
}

/// Fold a raw z-score so that negative always means deficit.
///
/// Performance scores pass through. For time scores only the slow side is
/// folded (`-|z|` when `z > 0`); a faster-than-norm time keeps its
/// non-positive value.
pub fn normalize(z: f64, polarity: Polarity) -> f64 {
    match polarity {
        Polarity::Performance => z,
        Polarity::Time => {
            if z > 0.0 {
                -z.abs()
            } else {
                z
            }
        }
    }
}

/// Clinical reading of one normalized score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ZBand {
    Normal,
    Borderline,
    Mild,
    Moderate,
    Severe,
}

impl ZBand {
    pub fn for_z(z: f64) -> Self {
        if z >= -0.5 {
            Self::Normal
        } else if z >= -1.0 {
            Self::Borderline
        } else if z >= -1.5 {
            Self::Mild
        } else if z >= -2.0 {
            Self::Moderate
        } else {
            Self::Severe
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Borderline => "Limítrofe",
            Self::Mild => "Déficit Leve",
            Self::Moderate => "Déficit Moderado",
            Self::Severe => "Déficit Severo",
        }
    }
}

/// Approximate percentile rank of a z-score under the standard normal.
pub fn percentile(z: f64) -> u8 {
    let cdf = 0.5 * (1.0 + statrs::function::erf::erf(z / std::f64::consts::SQRT_2));
    (cdf * 100.0).round().clamp(0.0, 100.0) as u8
}

/// An input field outside its allowed range.
#[derive(Debug, Clone, Serialize, Deserialize, TS, Error)]
#[ts(export)]
#[error("{message}")]
pub struct ValidationError {
    pub field: String,
    pub value: f64,
    pub min: f64,
    pub max: Option<f64>,
    pub message: String,
}

impl ValidationError {
    pub(crate) fn check_range(
        test: &str,
        field: &str,
        value: f64,
        min: f64,
        max: Option<f64>,
    ) -> Option<Self> {
        let within = value.is_finite() && value >= min && max.is_none_or(|max| value <= max);
        if within {
            return None;
        }
        let bound = match max {
            Some(max) => format!("[{min}, {max}]"),
            None => format!(">= {min}"),
        };
        Some(Self {
            field: field.to_string(),
            value,
            min,
            max,
            message: format!("{test}: {field} {value} is outside {bound}"),
        })
    }
}
