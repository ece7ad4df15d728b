//! # Strata
//!
//! Composable async middleware chains for Rust.
//!
//! ## Overview
//!
//! A middleware is an async function of a shared context and a continuation.
//! Strata composes a sequence of them into a single middleware with onion
//! semantics, and offers a library of combinators for the common control-flow
//! shapes: conditional branches, gates, observers, background work, error
//! trapping and concurrent fan-out.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────────────────┐     ┌───────────────┐
//! │ ChainBuilder │────▶│ compose: a ─▶ b ─▶ c ─▶ next │────▶│ tower Service │
//! │ combinators  │     │          a ◀─ b ◀─ c ◀─ next │     │ / Layer       │
//! └──────────────┘     └──────────────────────────────┘     └───────────────┘
//! ```
//!
//! - **Core**: middleware erasure, continuations, the invocation guard and the dispatcher
//! - **Framework**: conditions, combinators, the builder and tower adapters
//! - **Runtime**: configuration loading and logging setup
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strata::prelude::*;
//!
//! let chain = ChainBuilder::new()
//!     .with(log_start)
//!     .filter(Condition::when(|req: &Request| req.token == "valid"), authenticate)
//!     .with(handle)
//!     .compose();
//!
//! chain.invoke(Arc::new(request)).await?;
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use strata_core as core;
pub use strata_framework as framework;
pub use strata_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use strata::prelude::*;
/// ```
pub mod prelude {
    // Engine
    pub use strata_core::{
        ChainError, ChainResult, IntoMiddleware, Middleware, Next, compose, try_compose,
    };

    // Composition
    pub use strata_framework::combinators::*;
    pub use strata_framework::{ChainBuilder, ChainLayer, ChainService, Condition};

    // Setup
    pub use strata_runtime::config::{ConfigLoader, StrataConfig, load_config};
    pub use strata_runtime::logging::{LoggingBuilder, init_from_config};
}
