// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Host Configuration
//!
//! Typed configuration for services embedding the engine: database URL,
//! log level, and the engine tunables. Loadable from a TOML file with
//! `GAUGE_` environment-variable overrides, or assembled through the
//! builder. Validation happens once at build time so the engine only ever
//! sees a coherent [`CoreSettings`].

use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use gauge_lifecycle::infrastructure::config::CoreSettings;
use gauge_lifecycle_domain::EquipmentType;

/// Configuration loading and validation failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Read(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl LogLevel {
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Raw file shape; durations are plain numbers in the file.
#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    database_url: String,
    #[serde(default)]
    log_level: LogLevel,
    #[serde(default = "defaults::query_timeout_secs")]
    query_timeout_secs: u64,
    #[serde(default = "defaults::acquire_timeout_secs")]
    acquire_timeout_secs: u64,
    #[serde(default = "defaults::retry_attempts")]
    retry_attempts: u32,
    #[serde(default = "defaults::retry_backoff_ms")]
    retry_backoff_ms: u64,
    #[serde(default = "defaults::audit_retention_days")]
    audit_retention_days: i64,
    #[serde(default = "defaults::set_id_prefix")]
    set_id_prefix: String,
    #[serde(default = "defaults::set_id_width")]
    set_id_width: usize,
    #[serde(default)]
    qc_on_return: Vec<String>,
}

mod defaults {
    pub fn query_timeout_secs() -> u64 {
        15
    }
    pub fn acquire_timeout_secs() -> u64 {
        30
    }
    pub fn retry_attempts() -> u32 {
        3
    }
    pub fn retry_backoff_ms() -> u64 {
        500
    }
    pub fn audit_retention_days() -> i64 {
        730
    }
    pub fn set_id_prefix() -> String {
        "SP".to_string()
    }
    pub fn set_id_width() -> usize {
        4
    }
}

/// Validated host configuration.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    database_url: String,
    log_level: LogLevel,
    settings: CoreSettings,
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Loads from a TOML file, applying `GAUGE_`-prefixed environment
    /// overrides (e.g. `GAUGE_DATABASE_URL`).
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("GAUGE"))
            .build()
            .map_err(|e| ConfigError::Read(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let mut qc_on_return = HashSet::new();
        for name in &raw.qc_on_return {
            let et: EquipmentType = name.parse().map_err(|_| {
                ConfigError::Invalid(format!("unknown equipment type in qc_on_return: {}", name))
            })?;
            qc_on_return.insert(et);
        }

        CoreConfigBuilder {
            database_url: Some(raw.database_url),
            log_level: raw.log_level,
            query_timeout: Duration::from_secs(raw.query_timeout_secs),
            acquire_timeout: Duration::from_secs(raw.acquire_timeout_secs),
            retry_attempts: raw.retry_attempts,
            retry_backoff: Duration::from_millis(raw.retry_backoff_ms),
            audit_retention_days: raw.audit_retention_days,
            set_id_prefix: raw.set_id_prefix,
            set_id_width: raw.set_id_width,
            qc_on_return,
        }
        .build()
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// The engine-facing settings slice.
    pub fn settings(&self) -> CoreSettings {
        self.settings.clone()
    }
}

/// Builder with the same defaults as the engine.
#[derive(Debug, Clone)]
pub struct CoreConfigBuilder {
    database_url: Option<String>,
    log_level: LogLevel,
    query_timeout: Duration,
    acquire_timeout: Duration,
    retry_attempts: u32,
    retry_backoff: Duration,
    audit_retention_days: i64,
    set_id_prefix: String,
    set_id_width: usize,
    qc_on_return: HashSet<EquipmentType>,
}

impl Default for CoreConfigBuilder {
    fn default() -> Self {
        let defaults = CoreSettings::default();
        Self {
            database_url: None,
            log_level: LogLevel::default(),
            query_timeout: defaults.query_timeout,
            acquire_timeout: defaults.acquire_timeout,
            retry_attempts: defaults.retry_attempts,
            retry_backoff: defaults.retry_backoff,
            audit_retention_days: defaults.audit_retention_days,
            set_id_prefix: defaults.set_id_prefix,
            set_id_width: defaults.set_id_width,
            qc_on_return: defaults.qc_on_return,
        }
    }
}

impl CoreConfigBuilder {
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn audit_retention_days(mut self, days: i64) -> Self {
        self.audit_retention_days = days;
        self
    }

    pub fn set_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.set_id_prefix = prefix.into();
        self
    }

    pub fn set_id_width(mut self, width: usize) -> Self {
        self.set_id_width = width;
        self
    }

    pub fn qc_on_return(mut self, types: impl IntoIterator<Item = EquipmentType>) -> Self {
        self.qc_on_return = types.into_iter().collect();
        self
    }

    pub fn build(self) -> Result<CoreConfig, ConfigError> {
        let database_url = self
            .database_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ConfigError::Invalid("database_url is required".to_string()))?;
        if self.retry_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry_attempts must be at least 1".to_string(),
            ));
        }
        if self.audit_retention_days <= 0 {
            return Err(ConfigError::Invalid(
                "audit_retention_days must be positive".to_string(),
            ));
        }
        if self.set_id_prefix.is_empty()
            || !self.set_id_prefix.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(ConfigError::Invalid(
                "set_id_prefix must be alphabetic".to_string(),
            ));
        }
        if self.set_id_width == 0 || self.set_id_width > 10 {
            return Err(ConfigError::Invalid("set_id_width must be 1-10".to_string()));
        }

        Ok(CoreConfig {
            database_url,
            log_level: self.log_level,
            settings: CoreSettings {
                query_timeout: self.query_timeout,
                acquire_timeout: self.acquire_timeout,
                retry_attempts: self.retry_attempts,
                retry_backoff: self.retry_backoff,
                audit_retention_days: self.audit_retention_days,
                set_id_prefix: self.set_id_prefix,
                set_id_width: self.set_id_width,
                qc_on_return: self.qc_on_return,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builder_requires_database_url() {
        assert!(CoreConfig::builder().build().is_err());
        let config = CoreConfig::builder()
            .database_url("sqlite://gauges.db")
            .build()
            .unwrap();
        assert_eq!(config.database_url(), "sqlite://gauges.db");
        assert_eq!(config.settings().retry_attempts, 3);
    }

    #[test]
    fn test_builder_validation() {
        assert!(CoreConfig::builder()
            .database_url("sqlite://x.db")
            .retry_attempts(0)
            .build()
            .is_err());
        assert!(CoreConfig::builder()
            .database_url("sqlite://x.db")
            .set_id_prefix("S1")
            .build()
            .is_err());
        assert!(CoreConfig::builder()
            .database_url("sqlite://x.db")
            .audit_retention_days(0)
            .build()
            .is_err());
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "database_url = \"sqlite://shop.db\"\n\
             log_level = \"debug\"\n\
             query_timeout_secs = 5\n\
             qc_on_return = [\"large_equipment\"]"
        )
        .unwrap();

        let config = CoreConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.database_url(), "sqlite://shop.db");
        assert_eq!(config.log_level(), LogLevel::Debug);
        let settings = config.settings();
        assert_eq!(settings.query_timeout, Duration::from_secs(5));
        assert!(settings.qc_on_return.contains(&EquipmentType::LargeEquipment));
    }

    #[test]
    fn test_unknown_qc_type_rejected() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "database_url = \"sqlite://shop.db\"\nqc_on_return = [\"wrench\"]"
        )
        .unwrap();
        assert!(CoreConfig::load(file.path().to_str().unwrap()).is_err());
    }
}
