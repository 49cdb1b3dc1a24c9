//! Maps a patient's age and schooling onto the normative lookup keys.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use caresense_core::models::patient::{EducationLevel, Patient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum AgeBracket {
    #[serde(rename = "50-59")]
    Fifties,
    #[serde(rename = "60-69")]
    Sixties,
    #[serde(rename = "70-79")]
    Seventies,
    #[serde(rename = "80+")]
    EightyPlus,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 4] = [
        AgeBracket::Fifties,
        AgeBracket::Sixties,
        AgeBracket::Seventies,
        AgeBracket::EightyPlus,
    ];

    /// Total over all ages: anything outside 50–79 lands in `80+`.
    pub fn for_age(age: i32) -> Self {
        match age {
            50..=59 => Self::Fifties,
            60..=69 => Self::Sixties,
            70..=79 => Self::Seventies,
            _ => Self::EightyPlus,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fifties => "50-59",
            Self::Sixties => "60-69",
            Self::Seventies => "70-79",
            Self::EightyPlus => "80+",
        }
    }

    pub(crate) fn ordinal(&self) -> i32 {
        match self {
            Self::Fifties => 0,
            Self::Sixties => 1,
            Self::Seventies => 2,
            Self::EightyPlus => 3,
        }
    }
}

impl std::str::FromStr for AgeBracket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| format!("unknown age bracket '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum EducationBracket {
    #[serde(rename = "low_education")]
    Low,
    #[serde(rename = "high_education")]
    High,
}

impl EducationBracket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low_education",
            Self::High => "high_education",
        }
    }

    pub fn from_level(level: EducationLevel) -> Self {
        match level {
            EducationLevel::None | EducationLevel::Fundamental | EducationLevel::Medio => Self::Low,
            EducationLevel::Graduacao | EducationLevel::Posgrad => Self::High,
        }
    }

    /// Legacy years-of-study threshold: more than 7 years is high.
    pub fn from_years(years: u8) -> Self {
        if years > 7 { Self::High } else { Self::Low }
    }
}

impl std::str::FromStr for EducationBracket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low_education" | "low" => Ok(Self::Low),
            "high_education" | "high" => Ok(Self::High),
            other => Err(format!("unknown education bracket '{other}'")),
        }
    }
}

/// The patient attributes scoring depends on, fixed for one scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Demographics {
    pub age: i32,
    pub education_level: Option<EducationLevel>,
    pub education_years: Option<u8>,
}

impl Demographics {
    /// Snapshot a patient's demographics as of `evaluated_on`.
    pub fn from_patient(patient: &Patient, evaluated_on: Date) -> Self {
        Self {
            age: patient.age_on(evaluated_on),
            education_level: patient.education_level,
            education_years: patient.education_years,
        }
    }

    pub fn age_bracket(&self) -> AgeBracket {
        AgeBracket::for_age(self.age)
    }

    /// The categorical level wins; legacy years are the fallback; with
    /// neither, low education.
    pub fn education_bracket(&self) -> EducationBracket {
        if let Some(level) = self.education_level {
            return EducationBracket::from_level(level);
        }
        match self.education_years {
            Some(years) => EducationBracket::from_years(years),
            None => EducationBracket::Low,
        }
    }
}
