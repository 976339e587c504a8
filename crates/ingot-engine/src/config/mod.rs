//! Configuration module for the execution engine.
//!
//! Provides YAML configuration loading, validation, and environment
//! variable interpolation for the scheduler and router.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ingot_engine::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! let scheduler_config = config.scheduler_config();
//! ```

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::application::services::{RouterConfig, SchedulerConfig};
use crate::domain::execution::Algorithm;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Scheduler configuration.
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    /// Router configuration.
    #[serde(default)]
    pub router: RouterSettings,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl EngineConfig {
    /// Build the scheduler's runtime configuration.
    #[must_use]
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            tick_interval: Duration::from_millis(self.scheduler.tick_interval_ms),
            default_algorithm: self.scheduler.default_algorithm,
            max_slippage_pips: self.scheduler.max_slippage_pips,
            min_slice_volume: self.scheduler.min_slice_volume,
        }
    }

    /// Build the router's runtime configuration.
    ///
    /// The iceberg peak floor reuses the scheduler's minimum slice
    /// volume.
    #[must_use]
    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            large_order_threshold: self.router.large_order_threshold,
            high_spread_pips: self.router.high_spread_pips,
            session_start: self.router.session_start,
            session_end: self.router.session_end,
            base_slice_count: self.router.base_slice_count,
            max_slice_count: self.router.max_slice_count,
            base_duration_minutes: self.router.base_duration_minutes,
            max_duration_minutes: self.router.max_duration_minutes,
            iceberg_visible_fraction: self.router.iceberg_visible_fraction,
            min_slice_volume: self.scheduler.min_slice_volume,
        }
    }
}

/// Scheduler configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Interval between scheduler ticks, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Algorithm used when a request names none.
    #[serde(default = "default_algorithm")]
    pub default_algorithm: Algorithm,
    /// Slippage budget per slice, in pips.
    #[serde(default = "default_max_slippage_pips")]
    pub max_slippage_pips: Decimal,
    /// Smallest volume worth submitting as its own slice.
    #[serde(default = "default_min_slice_volume")]
    pub min_slice_volume: Decimal,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            default_algorithm: default_algorithm(),
            max_slippage_pips: default_max_slippage_pips(),
            min_slice_volume: default_min_slice_volume(),
        }
    }
}

const fn default_tick_interval_ms() -> u64 {
    1000
}
const fn default_algorithm() -> Algorithm {
    Algorithm::Market
}
fn default_max_slippage_pips() -> Decimal {
    Decimal::new(20, 0)
}
fn default_min_slice_volume() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

/// Router configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterSettings {
    /// Volume at or above which an order is always sliced.
    #[serde(default = "default_large_order_threshold")]
    pub large_order_threshold: Decimal,
    /// Spread (in pips) above which small orders are worked passively.
    #[serde(default = "default_high_spread_pips")]
    pub high_spread_pips: Decimal,
    /// Start of the high-liquidity session window (UTC).
    #[serde(default = "default_session_start")]
    pub session_start: NaiveTime,
    /// End of the high-liquidity session window (UTC).
    #[serde(default = "default_session_end")]
    pub session_end: NaiveTime,
    /// Slice count for an order right at the large-order threshold.
    #[serde(default = "default_base_slice_count")]
    pub base_slice_count: u32,
    /// Upper bound on derived slice counts.
    #[serde(default = "default_max_slice_count")]
    pub max_slice_count: u32,
    /// Execution window for an order right at the large-order threshold.
    #[serde(default = "default_base_duration_minutes")]
    pub base_duration_minutes: u32,
    /// Upper bound on derived execution windows.
    #[serde(default = "default_max_duration_minutes")]
    pub max_duration_minutes: u32,
    /// Fraction of total volume shown per iceberg peak.
    #[serde(default = "default_iceberg_visible_fraction")]
    pub iceberg_visible_fraction: Decimal,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            large_order_threshold: default_large_order_threshold(),
            high_spread_pips: default_high_spread_pips(),
            session_start: default_session_start(),
            session_end: default_session_end(),
            base_slice_count: default_base_slice_count(),
            max_slice_count: default_max_slice_count(),
            base_duration_minutes: default_base_duration_minutes(),
            max_duration_minutes: default_max_duration_minutes(),
            iceberg_visible_fraction: default_iceberg_visible_fraction(),
        }
    }
}

fn default_large_order_threshold() -> Decimal {
    Decimal::ONE
}
fn default_high_spread_pips() -> Decimal {
    Decimal::new(30, 0)
}
fn default_session_start() -> NaiveTime {
    NaiveTime::from_hms_opt(7, 0, 0).unwrap_or_default()
}
fn default_session_end() -> NaiveTime {
    NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default()
}
const fn default_base_slice_count() -> u32 {
    4
}
const fn default_max_slice_count() -> u32 {
    12
}
const fn default_base_duration_minutes() -> u32 {
    10
}
const fn default_max_duration_minutes() -> u32 {
    60
}
fn default_iceberg_visible_fraction() -> Decimal {
    Decimal::new(15, 2) // 0.15
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON-formatted log lines.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<EngineConfig, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    let interpolated = interpolate_env_vars(&contents);
    let config: EngineConfig = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;

    Ok(config)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<EngineConfig, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: EngineConfig = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    let mut result = input.to_string();
    for cap in re.captures_iter(input) {
        let Some((full_match, var_match)) = cap.get(0).zip(cap.get(1)) else {
            continue;
        };
        let default_value = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_match.as_str()) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        };

        result = result.replace(full_match.as_str(), &value);
    }

    result
}

/// Validate configuration values.
fn validate_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.scheduler.tick_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "tick_interval_ms must be positive".to_string(),
        ));
    }
    if config.scheduler.max_slippage_pips <= Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "max_slippage_pips must be positive".to_string(),
        ));
    }
    if config.scheduler.min_slice_volume <= Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "min_slice_volume must be positive".to_string(),
        ));
    }

    if config.router.large_order_threshold <= Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "large_order_threshold must be positive".to_string(),
        ));
    }
    if config.router.base_slice_count == 0 {
        return Err(ConfigError::ValidationError(
            "base_slice_count must be at least 1".to_string(),
        ));
    }
    if config.router.base_slice_count > config.router.max_slice_count {
        return Err(ConfigError::ValidationError(
            "base_slice_count must not exceed max_slice_count".to_string(),
        ));
    }
    if config.router.base_duration_minutes == 0 {
        return Err(ConfigError::ValidationError(
            "base_duration_minutes must be at least 1".to_string(),
        ));
    }
    if config.router.base_duration_minutes > config.router.max_duration_minutes {
        return Err(ConfigError::ValidationError(
            "base_duration_minutes must not exceed max_duration_minutes".to_string(),
        ));
    }
    if config.router.iceberg_visible_fraction <= Decimal::ZERO
        || config.router.iceberg_visible_fraction > Decimal::ONE
    {
        return Err(ConfigError::ValidationError(
            "iceberg_visible_fraction must be in (0, 1]".to_string(),
        ));
    }

    Ok(())
}
