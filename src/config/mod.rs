#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::ConfigError;
use crate::utils::validation::{validate_positive_number, validate_range, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which of a doctor's existing bookings take part in overlap detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapScope {
    /// Every appointment the doctor has ever had.
    #[default]
    All,
    /// Only appointments that may still be running at request time.
    Upcoming,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    pub min_duration_minutes: u32,
    pub max_duration_minutes: u32,
    pub max_reason_length: usize,
    pub overlap_scope: OverlapScope,
    pub store_timeout_ms: u64,
    pub lock_timeout_ms: u64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            min_duration_minutes: 15,
            max_duration_minutes: 180,
            max_reason_length: 200,
            overlap_scope: OverlapScope::All,
            store_timeout_ms: 2_000,
            lock_timeout_ms: 5_000,
        }
    }
}

impl BookingConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub json: bool,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ConfigError::ParseError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${STORE_TIMEOUT_MS})
    fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError {
            message: format!("environment pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for BookingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_range(
            "booking.min_duration_minutes",
            self.min_duration_minutes,
            1,
            24 * 60,
        )?;
        validate_range(
            "booking.max_duration_minutes",
            self.max_duration_minutes,
            self.min_duration_minutes,
            24 * 60,
        )?;
        validate_positive_number("booking.max_reason_length", self.max_reason_length as u64, 1)?;
        validate_positive_number("booking.store_timeout_ms", self.store_timeout_ms, 1)?;
        validate_positive_number("booking.lock_timeout_ms", self.lock_timeout_ms, 1)?;
        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.booking.validate()
    }
}
