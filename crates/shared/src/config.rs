//! Application configuration management.

use std::ops::RangeInclusive;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Ledger rule configuration.
    #[serde(default)]
    pub ledger: LedgerSettings,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tunable rules of the balance engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerSettings {
    /// Earliest year an accounting period may belong to.
    #[serde(default = "default_earliest_year")]
    pub earliest_year: i32,
    /// Latest year an accounting period may belong to.
    #[serde(default = "default_latest_year")]
    pub latest_year: i32,
    /// How many months an event date may sit away from its period's month.
    #[serde(default = "default_adjacent_month_window")]
    pub adjacent_month_window: u32,
}

fn default_earliest_year() -> i32 {
    2020
}

fn default_latest_year() -> i32 {
    2050
}

fn default_adjacent_month_window() -> u32 {
    1
}

impl LedgerSettings {
    /// Years an accounting period may be created for.
    #[must_use]
    pub fn period_years(&self) -> RangeInclusive<i32> {
        self.earliest_year..=self.latest_year
    }
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            earliest_year: default_earliest_year(),
            latest_year: default_latest_year(),
            adjacent_month_window: default_adjacent_month_window(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "fundledger=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FUNDLEDGER").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
