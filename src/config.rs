use std::path::PathBuf;

pub const LOG_ENV: &str = "QUICKADDD_LOG";
pub const WORKSPACE_ENV: &str = "QUICKADDD_WORKSPACE";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings key holding the metadata-line regexes used by the roster parser.
pub const METADATA_PATTERNS_KEY: &str = "roster.metadataPatterns";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub log_level: String,
    pub workspace: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let log_level = get(LOG_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let workspace = get(WORKSPACE_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self {
            log_level,
            workspace,
        }
    }
}

/// Logs go to stderr; stdout carries the protocol.
pub fn init_logging(level: &str) {
    let _ = env_logger::Builder::new()
        .parse_filters(level)
        .target(env_logger::Target::Stderr)
        .try_init();
}
