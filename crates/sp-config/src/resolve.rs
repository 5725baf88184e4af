//! Settings resolution: CLI → environment → config file → defaults.

use crate::settings::{LogFormat, Settings};
use crate::validate::{validate, ValidationError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the input path.
pub const ENV_INPUT: &str = "SALES_PIPELINE_INPUT";

/// Environment variable overriding the database path.
pub const ENV_DATABASE: &str = "SALES_PIPELINE_DB";

/// Environment variable overriding the log format.
pub const ENV_LOG_FORMAT: &str = "SALES_PIPELINE_LOG_FORMAT";

const CONFIG_DIR_NAME: &str = "sales_pipeline";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors from settings resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value in {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl From<ConfigError> for sp_common::Error {
    fn from(err: ConfigError) -> Self {
        sp_common::Error::Config(err.to_string())
    }
}

/// Values given on the command line. `None` defers to lower layers.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub log_format: Option<LogFormat>,
}

/// Which layer a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Cli,
    Env,
    File,
    Default,
}

/// Validated settings plus provenance.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSettings {
    pub settings: Settings,
    pub config_file: Option<PathBuf>,
    pub input_source: Source,
    pub database_source: Source,
}

/// Default config file location: `<config_dir>/sales_pipeline/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Resolve settings from the process environment and the default config path.
pub fn resolve_settings(overrides: &Overrides) -> Result<ResolvedSettings, ConfigError> {
    resolve_with(overrides, |var| std::env::var(var).ok(), default_config_path())
}

/// Resolve settings with an explicit environment lookup and default file.
///
/// An explicitly requested config file must exist; the default one is used
/// only when present.
pub fn resolve_with<F>(
    overrides: &Overrides,
    env: F,
    default_file: Option<PathBuf>,
) -> Result<ResolvedSettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let config_file = match &overrides.config {
        Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.clone())),
        Some(path) => Some(path.clone()),
        None => default_file.filter(|path| path.is_file()),
    };

    let mut settings = match &config_file {
        Some(path) => load_file(path)?,
        None => Settings::default(),
    };
    let file_or_default = if config_file.is_some() {
        Source::File
    } else {
        Source::Default
    };
    let mut input_source = file_or_default;
    let mut database_source = file_or_default;

    if let Some(value) = env(ENV_INPUT).filter(|v| !v.is_empty()) {
        settings.input = PathBuf::from(value);
        input_source = Source::Env;
    }
    if let Some(value) = env(ENV_DATABASE).filter(|v| !v.is_empty()) {
        settings.database = PathBuf::from(value);
        database_source = Source::Env;
    }
    if let Some(value) = env(ENV_LOG_FORMAT).filter(|v| !v.is_empty()) {
        settings.logging.format = value.parse().map_err(|reason| ConfigError::Env {
            var: ENV_LOG_FORMAT,
            reason,
        })?;
    }

    if let Some(input) = &overrides.input {
        settings.input = input.clone();
        input_source = Source::Cli;
    }
    if let Some(database) = &overrides.database {
        settings.database = database.clone();
        database_source = Source::Cli;
    }
    if let Some(format) = overrides.log_format {
        settings.logging.format = format;
    }

    validate(&settings)?;

    Ok(ResolvedSettings {
        settings,
        config_file,
        input_source,
        database_source,
    })
}

fn load_file(path: &Path) -> Result<Settings, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Settings::from_toml_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
