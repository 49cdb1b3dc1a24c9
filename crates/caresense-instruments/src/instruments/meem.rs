use serde::{Deserialize, Serialize};
use ts_rs::TS;

use caresense_core::models::results::{MeemResult, TestKind};

use crate::demographics::{Demographics, EducationBracket};
use crate::norms::NormativeEntry;
use crate::scoring::{ScoreComponent, ValidationError};
use crate::{ComponentZ, NeuroTest, z_for};

/// Brucki et al. (2003) estimates, used when the normative table carries
/// no MEEM data.
pub const HIGH_EDUCATION_NORM: NormativeEntry = NormativeEntry::new(28.5, 1.8);
pub const LOW_EDUCATION_NORM: NormativeEntry = NormativeEntry::new(25.2, 2.3);

/// Mini-Mental State Exam, 0–30; higher is better.
pub struct Meem;

impl NeuroTest for Meem {
    type Result = MeemResult;

    fn kind(&self) -> TestKind {
        TestKind::Meem
    }

    fn name(&self) -> &str {
        "Mini-Mental State Exam"
    }

    // Items are binary by construction; there is nothing to range-check.
    fn validate(&self, _result: &MeemResult) -> Vec<ValidationError> {
        Vec::new()
    }

    fn raw_values(&self, result: &MeemResult) -> Vec<(ScoreComponent, f64)> {
        vec![(ScoreComponent::Meem, f64::from(result.total_score()))]
    }

    fn fallback_norm(
        &self,
        _component: ScoreComponent,
        demographics: &Demographics,
    ) -> Option<NormativeEntry> {
        Some(match demographics.education_bracket() {
            EducationBracket::High => HIGH_EDUCATION_NORM,
            EducationBracket::Low => LOW_EDUCATION_NORM,
        })
    }

    fn store_scores(&self, result: &mut MeemResult, scores: &[ComponentZ]) {
        result.z_score = z_for(scores, ScoreComponent::Meem);
    }
}

/// Education-adjusted cutoff for a normal MEEM total.
pub fn cutoff_for_years(education_years: u8) -> u32 {
    match education_years {
        0 => 20,
        1..=4 => 25,
        5..=8 => 26,
        9..=11 => 28,
        _ => 29,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum MeemInterpretation {
    Normal,
    MildImpairment,
    ModerateImpairment,
    SevereImpairment,
    /// No cutoff applies: the patient's years of study are unknown, or the
    /// total is below the lowest graded band.
    RequiresFurtherEvaluation,
}

impl MeemInterpretation {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::MildImpairment => "Comprometimento Leve",
            Self::ModerateImpairment => "Comprometimento Moderado",
            Self::SevereImpairment => "Comprometimento Grave",
            Self::RequiresFurtherEvaluation => "Requer Avaliação Adicional",
        }
    }
}

/// Bands descend from the cutoff: `[cutoff, 30]` normal, then 3, 6 and 10
/// points below it.
pub fn interpret(total_score: u32, cutoff: u32) -> MeemInterpretation {
    let score = i64::from(total_score);
    let cutoff = i64::from(cutoff);
    if score >= cutoff {
        MeemInterpretation::Normal
    } else if score >= cutoff - 3 {
        MeemInterpretation::MildImpairment
    } else if score >= cutoff - 6 {
        MeemInterpretation::ModerateImpairment
    } else if score >= cutoff - 10 {
        MeemInterpretation::SevereImpairment
    } else {
        MeemInterpretation::RequiresFurtherEvaluation
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct MeemSummary {
    pub total_score: u32,
    pub domain_scores: Vec<(String, u32)>,
    pub cutoff: Option<u32>,
    pub interpretation: MeemInterpretation,
}

pub fn summarize(result: &MeemResult, demographics: &Demographics) -> MeemSummary {
    let total_score = result.total_score();
    let cutoff = demographics.education_years.map(cutoff_for_years);
    let interpretation = match cutoff {
        Some(cutoff) => interpret(total_score, cutoff),
        None => {
            tracing::debug!("education years unknown, MEEM cutoff not applied");
            MeemInterpretation::RequiresFurtherEvaluation
        }
    };
    MeemSummary {
        total_score,
        domain_scores: result
            .domain_scores()
            .iter()
            .map(|(domain, points)| (domain.to_string(), *points))
            .collect(),
        cutoff,
        interpretation,
    }
}
