//! Runtime configuration resolved from environment variables.
//!
//! # Invariants
//! - Blank variables count as unset.
//! - The API key is never included in `Debug` output.

use crate::assistant::gemini::DEFAULT_GEMINI_MODEL;
use crate::logging::{default_log_level, parse_level};
use crate::service::project_store::DEFAULT_STORAGE_KEY;
use std::fmt::{Debug, Formatter};
use std::path::PathBuf;

pub const ENV_STORAGE_KEY: &str = "ARCHSKETCH_STORAGE_KEY";
pub const ENV_GEMINI_API_KEY: &str = "ARCHSKETCH_GEMINI_API_KEY";
pub const ENV_GEMINI_API_KEY_FALLBACK: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "ARCHSKETCH_GEMINI_MODEL";
pub const ENV_DB_PATH: &str = "ARCHSKETCH_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "ARCHSKETCH_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ARCHSKETCH_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "archsketch.sqlite3";

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub storage_key: String,
    pub db_path: PathBuf,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub log_level: &'static str,
    /// File logging is off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Debug for AppConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("storage_key", &self.storage_key)
            .field("db_path", &self.db_path)
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "<redacted>"))
            .field("gemini_model", &self.gemini_model)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl AppConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through `lookup`, one variable at a time.
    ///
    /// # Errors
    /// - Returns a readable message when `ARCHSKETCH_LOG_LEVEL` is not a
    ///   known level.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let log_level = match read(ENV_LOG_LEVEL) {
            Some(raw) => parse_level(&raw).map_err(|err| format!("{ENV_LOG_LEVEL}: {err}"))?,
            None => default_log_level(),
        };

        Ok(Self {
            storage_key: read(ENV_STORAGE_KEY).unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string()),
            db_path: read(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            gemini_api_key: read(ENV_GEMINI_API_KEY).or_else(|| read(ENV_GEMINI_API_KEY_FALLBACK)),
            gemini_model: read(ENV_GEMINI_MODEL).unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            log_level,
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        })
    }
}
