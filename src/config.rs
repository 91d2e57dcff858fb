//! Configuration resolution for the server and bridge binaries.
//!
//! Environment variables win; an optional `reelbrief.toml` in the
//! working directory fills the gaps. The file is tolerated when absent
//! or malformed (the env contract is the source of truth), but a
//! missing DB URL is a hard, actionable startup diagnostic.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};

pub const ENV_DB_URL: &str = "REELBRIEF_DB_URL";
pub const ENV_DB_NAME: &str = "REELBRIEF_DB_NAME";
pub const ENV_API_TOKEN: &str = "REELBRIEF_API_TOKEN";
pub const ENV_TOKENS: &str = "REELBRIEF_TOKENS";
pub const ENV_LISTEN: &str = "REELBRIEF_LISTEN";

pub const DEFAULT_DB_NAME: &str = "reelbrief";
const CONFIG_FILE: &str = "reelbrief.toml";

/// Optional on-disk configuration.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    pub db_url: Option<String>,
    pub db_name: Option<String>,
    pub api_token: Option<String>,
    pub tokens: Option<String>,
    pub listen: Option<String>,
}

impl FileConfig {
    /// Load a config file if present. Absent files are an empty config;
    /// malformed files warn and fall back, they never abort startup.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return Self::default(),
        };
        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                Self::default()
            }
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Document-store connection URL; absence is tolerated until a
    /// component actually needs the store, which then fails fast.
    pub db_url: Option<String>,
    pub db_name: String,
    /// Session bearer for the stdio transport.
    pub api_token: Option<String>,
    /// `token=user` pairs overriding the seed's token table.
    pub tokens: Option<String>,
    /// HTTP listen address for the hosted variant.
    pub listen: Option<String>,
}

impl Config {
    /// Resolve from the process environment over `reelbrief.toml`.
    pub fn resolve() -> Self {
        let file = FileConfig::load(Path::new(CONFIG_FILE));
        Self::from_sources(&file, |key| std::env::var(key).ok())
    }

    fn from_sources(file: &FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            db_url: env(ENV_DB_URL).or_else(|| file.db_url.clone()),
            db_name: env(ENV_DB_NAME)
                .or_else(|| file.db_name.clone())
                .unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
            api_token: env(ENV_API_TOKEN).or_else(|| file.api_token.clone()),
            tokens: env(ENV_TOKENS).or_else(|| file.tokens.clone()),
            listen: env(ENV_LISTEN).or_else(|| file.listen.clone()),
        }
    }

    /// The DB URL, or the actionable startup diagnostic.
    pub fn require_db_url(&self) -> Result<&str> {
        self.db_url.as_deref().ok_or_else(|| {
            Error::Config(format!(
                "{} is not set; point it at the document store (file://path/to/seed.json \
                 for a local fixture) and restart",
                ENV_DB_URL
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn environment_wins_over_file() {
        let file = FileConfig {
            db_url: Some("file://from-file.json".to_string()),
            db_name: Some("filedb".to_string()),
            ..FileConfig::default()
        };
        let env = env_of(&[(ENV_DB_URL, "file://from-env.json")]);

        let config = Config::from_sources(&file, |key| env.get(key).cloned());
        assert_eq!(config.db_url.as_deref(), Some("file://from-env.json"));
        assert_eq!(config.db_name, "filedb");
    }

    #[test]
    fn db_name_has_a_default() {
        let config = Config::from_sources(&FileConfig::default(), |_| None);
        assert_eq!(config.db_name, DEFAULT_DB_NAME);
        assert!(config.db_url.is_none());
    }

    #[test]
    fn missing_db_url_names_the_env_var() {
        let config = Config::from_sources(&FileConfig::default(), |_| None);
        let err = config.require_db_url().unwrap_err();
        assert!(err.to_string().contains(ENV_DB_URL));
    }

    #[test]
    fn malformed_file_is_ignored() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "db_url = [not toml").unwrap();
        let config = FileConfig::load(file.path());
        assert!(config.db_url.is_none());
    }

    #[test]
    fn file_values_are_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "db_url = \"file://seed.json\"\nlisten = \"127.0.0.1:8787\"\n"
        )
        .unwrap();
        let config = FileConfig::load(file.path());
        assert_eq!(config.db_url.as_deref(), Some("file://seed.json"));
        assert_eq!(config.listen.as_deref(), Some("127.0.0.1:8787"));
    }
}
