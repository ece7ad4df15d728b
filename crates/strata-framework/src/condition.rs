//! Branch conditions.
//!
//! A [`Condition`] is either fixed when the combinator is built or evaluated
//! against the context on every invocation.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use strata_core::ChainResult;

type PredicateFn<T> = dyn Fn(Arc<T>) -> BoxFuture<'static, ChainResult<bool>> + Send + Sync;

/// The decision behind `branch`, `optional` and `filter`.
pub enum Condition<T> {
    /// Decided once, when the combinator is built.
    Static(bool),
    /// Decided per invocation from the context.
    Dynamic(Arc<PredicateFn<T>>),
}

impl<T> Clone for Condition<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(value) => Self::Static(*value),
            Self::Dynamic(predicate) => Self::Dynamic(Arc::clone(predicate)),
        }
    }
}

impl<T> fmt::Debug for Condition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl<T> From<bool> for Condition<T> {
    fn from(value: bool) -> Self {
        Self::Static(value)
    }
}

impl<T: Send + Sync + 'static> Condition<T> {
    /// Creates a condition from a synchronous predicate.
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::Dynamic(Arc::new(move |ctx: Arc<T>| {
            future::ready(Ok(predicate(&ctx))).boxed()
        }))
    }

    /// Creates a condition from an asynchronous, fallible predicate.
    ///
    /// An error from the predicate fails the invocation.
    pub fn when_async<F, Fut>(predicate: F) -> Self
    where
        F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ChainResult<bool>> + Send + 'static,
    {
        Self::Dynamic(Arc::new(move |ctx: Arc<T>| predicate(ctx).boxed()))
    }

    /// Evaluates the condition against `ctx`.
    pub fn evaluate(&self, ctx: Arc<T>) -> BoxFuture<'static, ChainResult<bool>> {
        match self {
            Self::Static(value) => future::ready(Ok(*value)).boxed(),
            Self::Dynamic(predicate) => predicate(ctx),
        }
    }
}
