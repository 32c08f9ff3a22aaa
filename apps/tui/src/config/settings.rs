use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

pub const SERVER_URL_VAR: &str = "ANALYSIS_SERVER_URL";
pub const EXPORT_DIR_VAR: &str = "CHART_EXPORT_DIR";
pub const LOG_FILE_VAR: &str = "LOG_FILE";
pub const DEBUG_VAR: &str = "DEBUG";

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_EXPORT_DIR: &str = "./charts";

/// Runtime settings, resolved from `.env`, the environment and CLI overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server_url: String,
    pub export_dir: PathBuf,
    pub log_file: Option<PathBuf>,
    pub debug: bool,
}

impl AppConfig {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            server_url: non_empty(SERVER_URL_VAR)
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            export_dir: non_empty(EXPORT_DIR_VAR)
                .map_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR), PathBuf::from),
            log_file: non_empty(LOG_FILE_VAR).map(PathBuf::from),
            debug: non_empty(DEBUG_VAR).is_some_and(|value| value != "0"),
        }
    }
}
