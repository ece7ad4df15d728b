//! # Strata Framework
//!
//! Higher-level building blocks on top of `strata-core`.
//!
//! This layer provides:
//! - Conditions evaluated against the context ([`Condition`])
//! - The combinator library ([`combinators`])
//! - A chainable builder that composes on demand ([`ChainBuilder`])
//! - Tower adapters ([`ChainService`], [`ChainLayer`])
//!
//! Nothing here adds dispatch state of its own. Every combinator returns an
//! ordinary [`Middleware`](strata_core::Middleware) that can be composed,
//! nested or wrapped again.

pub mod builder;
pub mod combinators;
pub mod condition;
pub mod service;

pub use builder::ChainBuilder;
pub use combinators::{
    after, before, branch, caught, concurrency, enforce, filter, fork, lazy, optional, skip, stop,
    tap,
};
pub use condition::Condition;
pub use service::{ChainLayer, ChainLayerService, ChainService};

/// Prelude for common imports.
pub mod prelude {
    pub use super::{ChainBuilder, Condition};
    pub use strata_core::prelude::*;
}
