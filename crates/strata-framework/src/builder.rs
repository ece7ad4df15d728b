//! Chain builder.
//!
//! [`ChainBuilder`] collects middleware in order, optionally wrapping each
//! through one of the [combinators](crate::combinators), and hands the
//! sequence to [`compose`] when finished.
//!
//! ```rust,ignore
//! use strata_framework::{ChainBuilder, Condition};
//!
//! let chain = ChainBuilder::new()
//!     .with(log_start)
//!     .filter(Condition::when(|req: &Request| req.token == "valid"), authenticate)
//!     .caught(render_error)
//!     .with(handle)
//!     .compose();
//!
//! chain.invoke(Arc::new(request)).await?;
//! ```
//!
//! The builder holds no dispatch state. Cloning it copies the sequence, so
//! the clone and the original can be extended independently.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use strata_core::{ChainError, ChainResult, IntoMiddleware, Middleware, compose};

use crate::combinators;
use crate::condition::Condition;

/// A chainable collector of middleware.
pub struct ChainBuilder<T, R = ()> {
    stack: Vec<Middleware<T, R>>,
}

impl<T, R> Clone for ChainBuilder<T, R> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
        }
    }
}

impl<T, R> Default for ChainBuilder<T, R> {
    fn default() -> Self {
        Self { stack: Vec::new() }
    }
}

impl<T, R> fmt::Debug for ChainBuilder<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainBuilder")
            .field("len", &self.stack.len())
            .finish()
    }
}

impl<T, R> ChainBuilder<T, R>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
{
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware (builder pattern).
    pub fn with(mut self, middleware: impl IntoMiddleware<T, R>) -> Self {
        self.stack.push(middleware.into_middleware());
        self
    }

    /// Appends a middleware in place.
    pub fn push(&mut self, middleware: impl IntoMiddleware<T, R>) -> &mut Self {
        self.stack.push(middleware.into_middleware());
        self
    }

    /// Appends a middleware under a name used in dispatch traces.
    pub fn named(
        self,
        name: impl Into<Cow<'static, str>>,
        middleware: impl IntoMiddleware<T, R>,
    ) -> Self {
        self.with(middleware.into_middleware().with_name(name))
    }

    /// Appends [`skip`](combinators::skip).
    pub fn skip(self) -> Self {
        self.with(combinators::skip())
    }

    /// Appends [`stop`](combinators::stop).
    pub fn stop(self) -> Self
    where
        R: Default,
    {
        self.with(combinators::stop())
    }

    /// Appends a middleware resolved on first use. See [`lazy`](combinators::lazy).
    pub fn lazy<F, Fut>(self, factory: F) -> Self
    where
        F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ChainResult<Middleware<T, R>>> + Send + 'static,
    {
        self.with(combinators::lazy(factory))
    }

    /// Appends an observer. See [`tap`](combinators::tap).
    pub fn tap(self, middleware: impl IntoMiddleware<T, R>) -> Self
    where
        R: Default,
    {
        self.with(combinators::tap(middleware))
    }

    /// Appends a background middleware. See [`fork`](combinators::fork).
    pub fn fork(self, middleware: impl IntoMiddleware<T, R>) -> Self
    where
        R: Default,
    {
        self.with(combinators::fork(middleware))
    }

    /// Appends a two-way branch. See [`branch`](combinators::branch).
    pub fn branch(
        self,
        condition: impl Into<Condition<T>>,
        on_true: impl IntoMiddleware<T, R>,
        on_false: impl IntoMiddleware<T, R>,
    ) -> Self {
        self.with(combinators::branch(condition, on_true, on_false))
    }

    /// Appends a middleware that only runs when `condition` holds.
    /// See [`optional`](combinators::optional).
    pub fn optional(
        self,
        condition: impl Into<Condition<T>>,
        middleware: impl IntoMiddleware<T, R>,
    ) -> Self {
        self.with(combinators::optional(condition, middleware))
    }

    /// Appends a middleware that ends the chain unless `condition` holds.
    /// See [`filter`](combinators::filter).
    pub fn filter(
        self,
        condition: impl Into<Condition<T>>,
        middleware: impl IntoMiddleware<T, R>,
    ) -> Self
    where
        R: Default,
    {
        self.with(combinators::filter(condition, middleware))
    }

    /// Appends `middleware` gated by `gate`. See [`before`](combinators::before).
    pub fn before(
        self,
        gate: impl IntoMiddleware<T, R>,
        middleware: impl IntoMiddleware<T, R>,
    ) -> Self
    where
        R: Default,
    {
        self.with(combinators::before(gate, middleware))
    }

    /// Appends `middleware` followed by `follow_up`. See [`after`](combinators::after).
    pub fn after(
        self,
        middleware: impl IntoMiddleware<T, R>,
        follow_up: impl IntoMiddleware<T, R>,
    ) -> Self
    where
        R: Default,
    {
        self.with(combinators::after(middleware, follow_up))
    }

    /// Appends a three-stage gate. See [`enforce`](combinators::enforce).
    pub fn enforce(
        self,
        gate: impl IntoMiddleware<T, R>,
        middleware: impl IntoMiddleware<T, R>,
        follow_up: impl IntoMiddleware<T, R>,
    ) -> Self
    where
        R: Default,
    {
        self.with(combinators::enforce(gate, middleware, follow_up))
    }

    /// Appends an error trap for every later stage. See [`caught`](combinators::caught).
    pub fn caught<F, Fut>(self, on_error: F) -> Self
    where
        F: Fn(Arc<T>, ChainError) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ChainResult<R>> + Send + 'static,
    {
        self.with(combinators::caught(on_error))
    }

    /// Appends a concurrent fan-out. See [`concurrency`](combinators::concurrency).
    pub fn concurrency<I>(self, middleware: I) -> Self
    where
        R: Default,
        I: IntoIterator,
        I::Item: IntoMiddleware<T, R>,
    {
        self.with(combinators::concurrency(middleware))
    }

    /// Returns the number of collected middleware.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Returns `true` if nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Composes the collected sequence.
    ///
    /// The builder stays usable; later additions do not affect middleware
    /// composed earlier.
    pub fn compose(&self) -> Middleware<T, R> {
        compose(self.stack.iter().cloned())
    }
}

impl<T, R> IntoMiddleware<T, R> for ChainBuilder<T, R>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
{
    fn into_middleware(self) -> Middleware<T, R> {
        compose(self.stack)
    }
}

impl<T, R> FromIterator<Middleware<T, R>> for ChainBuilder<T, R> {
    fn from_iter<I: IntoIterator<Item = Middleware<T, R>>>(iter: I) -> Self {
        Self {
            stack: iter.into_iter().collect(),
        }
    }
}

impl<T, R> Extend<Middleware<T, R>> for ChainBuilder<T, R> {
    fn extend<I: IntoIterator<Item = Middleware<T, R>>>(&mut self, iter: I) {
        self.stack.extend(iter);
    }
}
