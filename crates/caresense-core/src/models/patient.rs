use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Highest completed schooling level, as recorded on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum EducationLevel {
    /// No formal schooling.
    None,
    Fundamental,
    Medio,
    Graduacao,
    Posgrad,
}

impl EducationLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "Sem escolaridade",
            Self::Fundamental => "Fundamental",
            Self::Medio => "Ensino Médio",
            Self::Graduacao => "Graduação",
            Self::Posgrad => "Pós-graduação",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Patient {
    pub id: Uuid,
    pub full_name: String,
    pub birth_date: Date,
    #[serde(default)]
    pub education_level: Option<EducationLevel>,
    /// Legacy years-of-study value (0–30). Only consulted when
    /// `education_level` is absent, and by the clock-drawing norms.
    #[serde(default)]
    pub education_years: Option<u8>,
    #[serde(default)]
    pub room_number: Option<String>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl Patient {
    /// Age in whole years on `date`.
    pub fn age_on(&self, date: Date) -> i32 {
        let years = i32::from(date.year()) - i32::from(self.birth_date.year());
        let before_birthday =
            (date.month(), date.day()) < (self.birth_date.month(), self.birth_date.day());
        if before_birthday { years - 1 } else { years }
    }
}
