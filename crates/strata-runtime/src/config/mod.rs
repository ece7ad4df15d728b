//! Configuration module for Strata applications.
//!
//! This module provides figment-based configuration loading and validation
//! for the settings an application built on Strata needs at startup.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, load_config, load_config_from_file};
pub use schema::{LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig, StrataConfig};
pub use validation::validate_config;
