/// Service configuration.
///
/// Settings come from an optional TOML file (`orcamon.toml` by default).
/// Credentials never live in that file: the sightings API token is read
/// from the environment, after loading a `.env` file if one exists.
///
/// ```toml
/// data_dir = "./data/acartia/"
/// first_year = 2018
/// on_bad_timestamp = "skip"
/// keywords_file = "keywords.toml"
/// ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::analysis::partition::DEFAULT_FIRST_YEAR;
use crate::annotate::TimestampPolicy;
use crate::ingest::acartia::ACARTIA_SIGHTINGS_URL;
use crate::keywords::KeywordTables;
use crate::model::FetchError;

pub const DEFAULT_CONFIG_PATH: &str = "orcamon.toml";
pub const DEFAULT_DATA_DIR: &str = "./data/acartia/";
pub const DEFAULT_TOKEN_ENV: &str = "ACARTIA_TOKEN";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory for the fetched feed, the annotated table and the extracts.
    pub data_dir: PathBuf,
    pub feed_url: String,
    /// Environment variable holding the API bearer token.
    pub token_env: String,
    pub first_year: i32,
    pub on_bad_timestamp: TimestampPolicy,
    pub request_timeout_secs: u64,
    /// Optional keyword overrides, relative to the working directory.
    pub keywords_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            feed_url: ACARTIA_SIGHTINGS_URL.to_string(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            first_year: DEFAULT_FIRST_YEAR,
            on_bad_timestamp: TimestampPolicy::Fail,
            request_timeout_secs: 30,
            keywords_file: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// A config or keywords file could not be read.
    Io { path: String, message: String },
    /// A config or keywords file is not valid TOML for its schema.
    Parse { path: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, message } => write!(f, "Cannot read {}: {}", path, message),
            ConfigError::Parse { path, message } => write!(f, "Invalid config {}: {}", path, message),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn parse_error(path: &Path, err: toml::de::Error) -> ConfigError {
    ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Parses a config document. `path` is only used in error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    toml::from_str(text).map_err(|e| parse_error(path, e))
}

/// Loads configuration.
///
/// With an explicit `path` the file must exist. Without one,
/// `orcamon.toml` is used if present and defaults apply otherwise.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => parse_config(&read_file(path)?, path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                parse_config(&read_file(default_path)?, default_path)
            } else {
                Ok(Config::default())
            }
        }
    }
}

/// Builds the keyword tables, applying `keywords_file` overrides if set.
pub fn load_keywords(config: &Config) -> Result<KeywordTables, ConfigError> {
    match &config.keywords_file {
        Some(path) => {
            let tables = KeywordTables::from_toml_str(&read_file(path)?).map_err(|e| parse_error(path, e))?;
            match tables.blank_category() {
                Some(category) => Err(ConfigError::Parse {
                    path: path.display().to_string(),
                    message: format!("blank keyword in {}", category),
                }),
                None => Ok(tables),
            }
        }
        None => Ok(KeywordTables::default()),
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Loads `.env` into the process environment if present.
pub fn load_env() {
    dotenv::dotenv().ok();
}

/// Reads the API token named by `config.token_env`.
pub fn api_token(config: &Config) -> Result<String, FetchError> {
    match std::env::var(&config.token_env) {
        Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(FetchError::MissingToken(config.token_env.clone())),
    }
}
