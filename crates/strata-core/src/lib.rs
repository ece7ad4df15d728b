//! # Strata Core
//!
//! The dispatch engine of the Strata middleware framework.
//!
//! This crate provides the building blocks every other layer relies on:
//!
//! - **Middleware**: a type-erased async function of a shared context and a
//!   continuation ([`Middleware`], [`IntoMiddleware`])
//! - **Continuation**: the handle that advances a chain ([`Next`])
//! - **Invocation guard**: detects whether a middleware continued without
//!   exposing the rest of the chain ([`InvocationGuard`], [`wrap_next_call`])
//! - **Dispatcher**: onion composition of a middleware sequence ([`compose`])
//!
//! The context type is opaque to the engine. It is shared as an `Arc<T>` by
//! every stage of one invocation and never inspected.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use strata_core::{Middleware, Next, compose};
//!
//! let chain = compose([
//!     Middleware::from_fn(|ctx: Arc<Request>, next: Next| async move {
//!         tracing::info!("before");
//!         next.run().await?;
//!         tracing::info!("after");
//!         Ok(())
//!     }),
//!     Middleware::from_fn(|ctx: Arc<Request>, next: Next| next.run()),
//! ]);
//!
//! chain.invoke(Arc::new(request)).await?;
//! ```

pub mod compose;
pub mod error;
pub mod guard;
pub mod middleware;
pub mod next;

pub use compose::{compose, try_compose};
pub use error::{BoxError, ChainError, ChainResult};
pub use guard::{InvocationGuard, wrap_next_call};
pub use middleware::{IntoMiddleware, Middleware};
pub use next::Next;

pub use futures::future::BoxFuture;

/// Prelude for common imports.
pub mod prelude {
    pub use super::{ChainError, ChainResult, IntoMiddleware, Middleware, Next, compose};
}
