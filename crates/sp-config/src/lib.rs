//! Sales pipeline configuration loading and validation.
//!
//! This crate provides:
//! - Typed settings deserialized from `config.toml`
//! - Settings resolution (CLI → env → config file → defaults)
//! - Semantic validation of resolved settings

pub mod resolve;
pub mod settings;
pub mod validate;

pub use resolve::{
    default_config_path, resolve_settings, ConfigError, Overrides, ResolvedSettings, Source,
};
pub use settings::{LogFormat, LoggingSettings, Settings};
pub use validate::{validate, ValidationError};
