//! Strata Runtime - application setup for the Strata middleware engine.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `load_config`)
//! - Configuration validation (`validate_config`)
//! - Logging setup driven by that configuration (`LoggingBuilder`, `init_from_config`)
//!
//! ```ignore
//! use strata_runtime::{config::load_config, logging};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     logging::init_from_config(&config.logging);
//!     // build and run chains...
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod logging;

pub use config::{ConfigError, ConfigLoader, ConfigResult, LoggingConfig, StrataConfig};
pub use logging::{LoggingBuilder, SpanEvents, init_from_config};
