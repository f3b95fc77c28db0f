use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

use super::{types::Config, ConfigError};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "MOVIEFINDER_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "moviefinder.toml";

const ENV_PREFIX: &str = "MOVIEFINDER_";

/// Load configuration from file with environment variable overrides
///
/// Nested keys are separated by `__` in variable names, e.g.
/// `MOVIEFINDER_TMDB__API_KEY`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }
    extract(Figment::new().merge(Toml::file(path)), ENV_PREFIX)
}

/// Load configuration from the default location.
///
/// The file is optional here; without it only defaults and environment
/// variables apply.
pub fn load_default_config() -> Result<(Config, Option<PathBuf>), ConfigError> {
    let path = std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    if path.exists() {
        Ok((load_config(&path)?, Some(path)))
    } else if std::env::var(CONFIG_PATH_ENV).is_ok() {
        // An explicitly named file must exist
        Err(ConfigError::FileNotFound(path.display().to_string()))
    } else {
        Ok((extract(Figment::new(), ENV_PREFIX)?, None))
    }
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn extract(figment: Figment, env_prefix: &str) -> Result<Config, ConfigError> {
    figment
        .merge(Env::prefixed(env_prefix).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}
