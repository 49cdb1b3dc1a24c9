use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use caresense_core::models::results::TestKind;
use caresense_instruments::engine::EngineSettings;

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareSenseConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    /// Bucket holding patients, assessments and results.
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// Normative table JSON. Unset means the built-in table.
    #[serde(default)]
    pub norms_path: Option<PathBuf>,
    /// Added in v1.
    pub required_tests: Vec<TestKind>,
    /// Added in v2.
    pub log_format: LogFormat,
}

impl Default for CareSenseConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            bucket: None,
            region: None,
            norms_path: None,
            required_tests: EngineSettings::default().required_tests,
            log_format: LogFormat::default(),
        }
    }
}

impl CareSenseConfig {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            required_tests: self.required_tests.clone(),
        }
    }

    /// `CARESENSE_BUCKET`, `CARESENSE_NORMS` and `AWS_REGION` win over the
    /// file.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bucket) = lookup("CARESENSE_BUCKET").filter(|v| !v.is_empty()) {
            self.bucket = Some(bucket);
        }
        if let Some(norms) = lookup("CARESENSE_NORMS").filter(|v| !v.is_empty()) {
            self.norms_path = Some(PathBuf::from(norms));
        }
        if let Some(region) = lookup("AWS_REGION").filter(|v| !v.is_empty()) {
            self.region = Some(region);
        }
    }

    pub fn require_bucket(&self) -> eyre::Result<&str> {
        self.bucket.as_deref().ok_or_else(|| {
            eyre::eyre!("no bucket configured; set CARESENSE_BUCKET or `bucket` in the config file")
        })
    }
}

pub fn default_config_path() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("caresense").join("config.json"))
}

/// Load the config at `path`, or the defaults when no file exists there.
pub fn load_config(path: &Path) -> eyre::Result<CareSenseConfig> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no config file, using defaults");
        return Ok(CareSenseConfig::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = match json.get("config_version") {
        None => 0,
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| eyre::eyre!("config_version {v} is not a valid version"))?,
    };

    let migrated = migrate(json, on_disk_version)?;
    let config: CareSenseConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

/// The `log_format` recorded in the file at `path`, if any. Read before the
/// subscriber exists, so failures are silent; `load_config` reports them.
pub fn peek_log_format(path: &Path) -> Option<LogFormat> {
    let contents = std::fs::read_to_string(path).ok()?;
    let json: serde_json::Value = serde_json::from_str(&contents).ok()?;
    serde_json::from_value(json.get("log_format")?.clone()).ok()
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION})"
        ));
    }

    let obj = json
        .as_object_mut()
        .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;

    // v0 → v1: auto-completion set becomes configurable.
    if from_version < 1 {
        let required = serde_json::to_value(EngineSettings::default().required_tests)?;
        obj.entry("required_tests").or_insert(required);
        obj.insert("config_version".to_string(), 1.into());
        tracing::info!("migrated config v0 → v1 (added required_tests)");
    }

    // v1 → v2: log format, formerly always JSON.
    if from_version < 2 {
        obj.entry("log_format").or_insert("json".into());
        obj.insert("config_version".to_string(), 2.into());
        tracing::info!("migrated config v1 → v2 (added log_format)");
    }

    Ok(json)
}

pub fn save_config(config: &CareSenseConfig, path: &Path) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("config path {} has no parent", path.display()))?;
    std::fs::create_dir_all(dir)?;

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;
    let json = serde_json::to_string_pretty(&stamped)?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;
    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
