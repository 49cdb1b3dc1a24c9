//! Normative means and standard deviations, keyed by score component, age
//! bracket and education bracket.
//!
//! A table is loaded once at startup, from a JSON file when one is
//! configured and from the built-in defaults otherwise, and is read-only
//! afterwards.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::demographics::{AgeBracket, EducationBracket};
use crate::error::InstrumentError;
use crate::scoring::ScoreComponent;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NormativeEntry {
    pub mean: f64,
    #[serde(rename = "sd", alias = "standard_deviation")]
    pub standard_deviation: f64,
}

impl NormativeEntry {
    pub const fn new(mean: f64, standard_deviation: f64) -> Self {
        Self {
            mean,
            standard_deviation,
        }
    }
}

/// Where the active table came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NormSource {
    File { path: PathBuf },
    BuiltIn,
}

type BracketGrid = BTreeMap<AgeBracket, BTreeMap<EducationBracket, NormativeEntry>>;

/// On-disk shape: `test -> age bracket -> education bracket -> {mean, sd}`.
type RawTable = BTreeMap<String, BTreeMap<String, BTreeMap<String, NormativeEntry>>>;

#[derive(Debug, Clone)]
pub struct NormativeTable {
    source: NormSource,
    entries: BTreeMap<ScoreComponent, BracketGrid>,
}

impl NormativeTable {
    /// Parse a table from its JSON text. Unknown test ids are skipped with a
    /// warning; unknown bracket keys and negative deviations are errors.
    pub fn from_json(json: &str) -> Result<Self, InstrumentError> {
        let raw: RawTable = serde_json::from_str(json)?;
        let mut entries = BTreeMap::new();

        for (test_id, ages) in raw {
            let Some(component) = ScoreComponent::from_id(&test_id) else {
                warn!(test = %test_id, "ignoring normative data for unknown test");
                continue;
            };
            let mut grid = BracketGrid::new();
            for (age_key, educations) in ages {
                let age: AgeBracket = age_key.parse().map_err(invalid_key)?;
                for (education_key, entry) in educations {
                    let education: EducationBracket =
                        education_key.parse().map_err(invalid_key)?;
                    if entry.standard_deviation < 0.0 {
                        return Err(InstrumentError::NegativeDeviation {
                            test: test_id.clone(),
                            age: age_key.clone(),
                            education: education_key,
                            sd: entry.standard_deviation,
                        });
                    }
                    grid.entry(age).or_default().insert(education, entry);
                }
            }
            entries.insert(component, grid);
        }

        Ok(Self {
            source: NormSource::BuiltIn,
            entries,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, InstrumentError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| InstrumentError::NormsIo {
                path: path.to_path_buf(),
                source,
            })?;
        let mut table = Self::from_json(&contents)?;
        table.source = NormSource::File {
            path: path.to_path_buf(),
        };
        Ok(table)
    }

    /// Load from `path`, falling back to the built-in table on any failure.
    /// Never fails.
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            info!("no normative data file configured, using built-in table");
            return Self::builtin();
        };
        match Self::from_path(path) {
            Ok(table) => {
                info!(
                    path = %path.display(),
                    tests = table.entries.len(),
                    "normative data loaded"
                );
                table
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "could not load normative data, using built-in table"
                );
                Self::builtin()
            }
        }
    }

    /// Reference norms shipped with the engine.
    pub fn builtin() -> Self {
        use AgeBracket::{EightyPlus, Seventies, Sixties};
        use ScoreComponent::{DigitSpan, Stroop, TmtA, TmtB};

        // (component, age, low education, high education)
        const ROWS: [(ScoreComponent, AgeBracket, NormativeEntry, NormativeEntry); 12] = [
            (TmtA, Sixties, NormativeEntry::new(38.5, 15.2), NormativeEntry::new(29.8, 10.1)),
            (TmtA, Seventies, NormativeEntry::new(55.1, 21.3), NormativeEntry::new(40.2, 14.7)),
            (TmtA, EightyPlus, NormativeEntry::new(70.8, 28.9), NormativeEntry::new(58.4, 22.1)),
            (TmtB, Sixties, NormativeEntry::new(95.2, 35.4), NormativeEntry::new(70.1, 25.8)),
            (TmtB, Seventies, NormativeEntry::new(135.7, 48.2), NormativeEntry::new(98.3, 32.1)),
            (TmtB, EightyPlus, NormativeEntry::new(180.5, 65.7), NormativeEntry::new(140.2, 45.3)),
            (DigitSpan, Sixties, NormativeEntry::new(10.8, 2.1), NormativeEntry::new(12.4, 2.3)),
            (DigitSpan, Seventies, NormativeEntry::new(9.5, 2.4), NormativeEntry::new(11.2, 2.6)),
            (DigitSpan, EightyPlus, NormativeEntry::new(8.1, 2.8), NormativeEntry::new(9.8, 2.9)),
            (Stroop, Sixties, NormativeEntry::new(45.2, 12.3), NormativeEntry::new(35.8, 9.1)),
            (Stroop, Seventies, NormativeEntry::new(58.7, 16.8), NormativeEntry::new(44.2, 12.4)),
            (Stroop, EightyPlus, NormativeEntry::new(75.3, 22.1), NormativeEntry::new(58.9, 16.7)),
        ];

        let mut entries: BTreeMap<ScoreComponent, BracketGrid> = BTreeMap::new();
        for (component, age, low, high) in ROWS {
            let cell = entries.entry(component).or_default().entry(age).or_default();
            cell.insert(EducationBracket::Low, low);
            cell.insert(EducationBracket::High, high);
        }

        Self {
            source: NormSource::BuiltIn,
            entries,
        }
    }

    pub fn source(&self) -> &NormSource {
        &self.source
    }

    pub fn has_component(&self, component: ScoreComponent) -> bool {
        self.entries.contains_key(&component)
    }

    pub fn components(&self) -> impl Iterator<Item = ScoreComponent> + '_ {
        self.entries.keys().copied()
    }

    /// Exact-cell lookup.
    pub fn get(
        &self,
        component: ScoreComponent,
        age: AgeBracket,
        education: EducationBracket,
    ) -> Option<NormativeEntry> {
        self.entries
            .get(&component)?
            .get(&age)?
            .get(&education)
            .copied()
    }

    /// Lookup that tolerates an age bracket the component's data does not
    /// cover by taking the nearest populated bracket (younger on ties).
    /// `None` only when the component has no data for `education` at all.
    pub fn lookup(
        &self,
        component: ScoreComponent,
        age: AgeBracket,
        education: EducationBracket,
    ) -> Option<NormativeEntry> {
        if let Some(entry) = self.get(component, age, education) {
            return Some(entry);
        }
        let grid = self.entries.get(&component)?;
        let (nearest, entry) = grid
            .iter()
            .filter_map(|(bracket, cells)| cells.get(&education).map(|e| (*bracket, *e)))
            .min_by_key(|(bracket, _)| (bracket.ordinal() - age.ordinal()).abs())?;
        debug!(
            component = %component,
            requested = age.as_str(),
            used = nearest.as_str(),
            "age bracket not in normative data, using nearest"
        );
        Some(entry)
    }

    /// Serialize back to the on-disk shape.
    pub fn to_json_value(&self) -> serde_json::Value {
        let raw: RawTable = self
            .entries
            .iter()
            .map(|(component, grid)| {
                let ages = grid
                    .iter()
                    .map(|(age, cells)| {
                        let educations = cells
                            .iter()
                            .map(|(education, entry)| (education.as_str().to_string(), *entry))
                            .collect();
                        (age.as_str().to_string(), educations)
                    })
                    .collect();
                (component.id().to_string(), ages)
            })
            .collect();
        serde_json::to_value(raw).unwrap_or(serde_json::Value::Null)
    }
}

fn invalid_key(message: String) -> InstrumentError {
    InstrumentError::NormsFormat(serde::de::Error::custom(message))
}
