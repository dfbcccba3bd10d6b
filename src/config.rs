//! Study engine configuration

use crate::compare::TranslationId;
use crate::tokens::ScriptMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable that overrides `api_base`.
pub const API_BASE_ENV: &str = "LECTIO_API_BASE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Base URL of the scripture backend
    pub api_base: String,
    pub request_timeout_secs: u64,
    /// Number of passages kept in the LRU cache
    pub passage_cache_capacity: usize,
    /// Request phrase alignment for single-verse passages
    pub alignment_enabled: bool,
    /// Translations shown by `compare` when none are given
    pub compare_sources: Vec<TranslationId>,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:5000".to_string(),
            request_timeout_secs: 15,
            passage_cache_capacity: 256,
            alignment_enabled: true,
            compare_sources: vec![
                TranslationId::Kjv,
                TranslationId::TanakhEnglish,
                TranslationId::Septuagint,
                TranslationId::TextusReceptus,
            ],
        }
    }
}

impl StudyConfig {
    /// Load from `path`, else from the user config file if it exists, else
    /// defaults. `LECTIO_API_BASE` is applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match config_path().filter(|p| p.exists()) {
                Some(default_path) => Self::from_file(&default_path)?,
                None => {
                    debug!("no config file, using defaults");
                    Self::default()
                }
            },
        };

        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                config.api_base = base.trim().to_string();
            }
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {:?}", path))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config at {:?}", path))?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Tokenization mode for displayed passages.
    pub fn script_mode(&self) -> ScriptMode {
        if self.alignment_enabled {
            ScriptMode::Multilingual
        } else {
            ScriptMode::English
        }
    }
}

/// `<config_dir>/lectio/config.json`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lectio").join("config.json"))
}
