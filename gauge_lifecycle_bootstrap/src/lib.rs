// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Gauge Lifecycle Bootstrap
//!
//! Embedding support for services that host the engine: a logger
//! abstraction with a tracing-backed console implementation, and typed
//! configuration loading (TOML file with environment overrides) that
//! resolves into the engine's [`CoreSettings`].
//!
//! The engine itself never reads files or installs subscribers; hosts call
//! into this crate once at startup.
//!
//! [`CoreSettings`]: gauge_lifecycle::infrastructure::config::CoreSettings

pub mod config;
pub mod logger;

pub use config::{ConfigError, CoreConfig, CoreConfigBuilder, LogLevel};
pub use logger::{init_tracing, BootstrapLogger, ConsoleLogger, NoOpLogger};
