// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Logger abstraction for bootstrap-phase reporting.
//!
//! Host binaries log through [`BootstrapLogger`] before and during engine
//! start-up so early failures (bad config, unreachable database) reach the
//! operator even when tracing isn't fully configured yet. The engine's own
//! logging is plain `tracing`.

use tracing_subscriber::EnvFilter;

/// Abstraction over bootstrap-phase logging.
pub trait BootstrapLogger: Send + Sync {
    fn error(&self, message: &str);

    fn warn(&self, message: &str);

    fn info(&self, message: &str);

    fn debug(&self, message: &str);
}

/// Tracing-backed console logger with a component prefix.
pub struct ConsoleLogger {
    prefix: String,
}

impl ConsoleLogger {
    pub fn new() -> Self {
        Self::with_prefix("bootstrap")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl BootstrapLogger for ConsoleLogger {
    fn error(&self, message: &str) {
        tracing::error!(target: "bootstrap", "[{}] {}", self.prefix, message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "bootstrap", "[{}] {}", self.prefix, message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "bootstrap", "[{}] {}", self.prefix, message);
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: "bootstrap", "[{}] {}", self.prefix, message);
    }
}

/// Silent logger for tests and library embedders that install their own
/// subscriber.
pub struct NoOpLogger;

impl NoOpLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl BootstrapLogger for NoOpLogger {
    fn error(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn debug(&self, _message: &str) {}
}

/// Installs a global tracing subscriber honoring `RUST_LOG`, falling back
/// to the supplied default directive (e.g. `"info"`).
///
/// Returns an error string when a subscriber is already installed; hosts
/// that set up their own tracing can ignore it.
pub fn init_tracing(default_directive: &str) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_logger_is_silent() {
        let logger = NoOpLogger::new();
        logger.error("nothing happens");
        logger.warn("nothing happens");
        logger.info("nothing happens");
        logger.debug("nothing happens");
    }

    #[test]
    fn test_console_logger_constructs() {
        let logger = ConsoleLogger::with_prefix("test");
        logger.info("constructed");
    }
}
