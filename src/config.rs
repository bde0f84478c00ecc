// Configuration loading and parsing (config/pitchboard.toml).
//
// The config file is optional: when absent, built-in defaults are used so the
// binary runs out of the box. When present, it is parsed and validated the
// same way regardless of which sections it fills in.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub validator: ValidatorSettings,
    pub providers: ProviderSettings,
    pub cache: CacheTtls,
}

/// Settings for the fallback validator.
///
/// `average_columns` is the explicit list of column names treated as
/// batting-average columns (matched case-insensitively, exact name). The role
/// columns name where derivable inputs live when no average column exists.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidatorSettings {
    pub cache_duration_hours: i64,
    pub average_columns: Vec<String>,
    pub hits_column: String,
    pub at_bats_column: String,
    pub events_column: String,
    pub player_column: String,
    pub player_id_column: String,
    pub derived_column: String,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            cache_duration_hours: 24,
            average_columns: vec![
                "batting_avg".to_string(),
                "avg".to_string(),
                "average".to_string(),
                "season_avg".to_string(),
                "calculated_avg".to_string(),
            ],
            hits_column: "hits".to_string(),
            at_bats_column: "at_bats".to_string(),
            events_column: "events".to_string(),
            player_column: "player_name".to_string(),
            player_id_column: "player_id".to_string(),
            derived_column: "calculated_avg".to_string(),
        }
    }
}

/// Base URLs and timeout for the two external providers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub savant_base_url: String,
    pub statsapi_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            savant_base_url: "https://baseballsavant.mlb.com".to_string(),
            statsapi_base_url: "https://statsapi.mlb.com".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// TTLs for the process-wide response cache, in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheTtls {
    pub games_secs: u64,
    pub live_game_secs: u64,
    pub player_stats_secs: u64,
    pub standings_secs: u64,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            games_secs: 300,
            live_game_secs: 30,
            player_stats_secs: 3600,
            standings_secs: 14400,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

const CONFIG_RELATIVE_PATH: &str = "config/pitchboard.toml";

/// Load configuration from `config/pitchboard.toml` under `base_dir`.
///
/// A missing file yields the built-in defaults; an unreadable or malformed
/// file is an error (a present-but-broken config should never silently fall
/// back to defaults).
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join(CONFIG_RELATIVE_PATH);

    let config = if path.exists() {
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseError {
            path: path.clone(),
            source: e,
        })?
    } else {
        Config::default()
    };

    validate(&config)?;
    Ok(config)
}

/// Convenience wrapper: loads config relative to the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|e| ConfigError::Io {
        path: PathBuf::from("."),
        source: e,
    })?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.validator.cache_duration_hours <= 0 {
        return Err(ConfigError::ValidationError {
            field: "validator.cache_duration_hours".into(),
            message: format!(
                "must be > 0, got {}",
                config.validator.cache_duration_hours
            ),
        });
    }

    if config.validator.average_columns.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "validator.average_columns".into(),
            message: "must list at least one column name".into(),
        });
    }

    let text_fields: &[(&str, &str)] = &[
        ("validator.hits_column", &config.validator.hits_column),
        ("validator.at_bats_column", &config.validator.at_bats_column),
        ("validator.events_column", &config.validator.events_column),
        ("validator.player_column", &config.validator.player_column),
        (
            "validator.player_id_column",
            &config.validator.player_id_column,
        ),
        ("validator.derived_column", &config.validator.derived_column),
        ("providers.savant_base_url", &config.providers.savant_base_url),
        (
            "providers.statsapi_base_url",
            &config.providers.statsapi_base_url,
        ),
    ];
    for (name, val) in text_fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    if config.providers.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "providers.request_timeout_secs".into(),
            message: "must be > 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
