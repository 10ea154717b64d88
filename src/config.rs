use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GlossaryError, Result};
use crate::loader::{DataSource, GoogleSheet};

// The published World Bank digital glossary
pub const DEFAULT_SHEET_ID: &str = "12IsT3AZ1wrN1ECn3snwPf5M9oYP5geb1";
pub const DEFAULT_GID: &str = "1289983907";

pub const DEFAULT_CACHE_TTL_SECS: u64 = 10;
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Where to read the glossary from, as written in the config file
///
/// ```json
/// { "google_sheet": { "sheet_id": "...", "gid": "..." } }
/// { "sheet_url": "https://docs.google.com/spreadsheets/d/.../edit#gid=..." }
/// { "local_file": "data/glossary.xlsx" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceConfig {
    GoogleSheet(GoogleSheet),
    SheetUrl(String),
    LocalFile(PathBuf),
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::GoogleSheet(GoogleSheet::new(DEFAULT_SHEET_ID, DEFAULT_GID))
    }
}

impl SourceConfig {
    pub fn to_source(&self) -> Result<DataSource> {
        Ok(match self {
            SourceConfig::GoogleSheet(sheet) => DataSource::GoogleSheet(sheet.clone()),
            SourceConfig::SheetUrl(url) => DataSource::GoogleSheet(GoogleSheet::from_url(url)?),
            SourceConfig::LocalFile(path) => DataSource::LocalFile(path.clone()),
        })
    }
}

/// Server settings. Every field has a default, so an empty object is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub cache_ttl_secs: u64,
    pub bind: String,
    pub static_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            source: SourceConfig::default(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            bind: DEFAULT_BIND.to_string(),
            static_dir: PathBuf::from("static"),
        }
    }
}

impl AppConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| GlossaryError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            GlossaryError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs.min(u32::MAX as u64) as i64)
    }
}
