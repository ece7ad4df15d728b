//! Type-erased middleware.
//!
//! A middleware receives the shared context of one invocation and the
//! continuation of its stage:
//!
//! ```text
//! (Arc<T>, Next<R>) -> BoxFuture<'static, ChainResult<R>>
//! ```
//!
//! Any closure with that shape converts into a [`Middleware`] through
//! [`IntoMiddleware`], in the same spirit as axum-style handler erasure:
//!
//! ```rust,ignore
//! use strata_core::{Middleware, Next};
//!
//! let log = Middleware::from_fn(|ctx: Arc<Request>, next: Next| async move {
//!     tracing::info!(path = %ctx.path, "request started");
//!     next.run().await
//! });
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::ChainResult;
use crate::next::Next;

type MiddlewareFn<T, R> = dyn Fn(Arc<T>, Next<R>) -> BoxFuture<'static, ChainResult<R>> + Send + Sync;

/// A clonable, type-erased middleware.
///
/// Cloning is one atomic increment; every clone calls the same function.
pub struct Middleware<T, R = ()> {
    inner: Arc<MiddlewareFn<T, R>>,
    name: Option<Cow<'static, str>>,
}

impl<T, R> Clone for Middleware<T, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            name: self.name.clone(),
        }
    }
}

impl<T, R> fmt::Debug for Middleware<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("name", &self.name.as_deref())
            .finish_non_exhaustive()
    }
}

impl<T, R> Middleware<T, R>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
{
    /// Creates a middleware from an async closure.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<T>, Next<R>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ChainResult<R>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |ctx, next| f(ctx, next).boxed()),
            name: None,
        }
    }

    /// Attaches a name that shows up in dispatch traces.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the name of this middleware, if set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Runs the middleware with an explicit continuation.
    pub fn call(&self, ctx: Arc<T>, next: Next<R>) -> BoxFuture<'static, ChainResult<R>> {
        (self.inner)(ctx, next)
    }
}

impl<T, R> Middleware<T, R>
where
    T: Send + Sync + 'static,
    R: Default + Send + 'static,
{
    /// Runs the middleware with a terminal continuation that does nothing.
    pub fn invoke(&self, ctx: Arc<T>) -> BoxFuture<'static, ChainResult<R>> {
        self.call(ctx, Next::noop())
    }
}

/// Conversion into a [`Middleware`].
///
/// Implemented for `Middleware` itself and for every closure of the shape
/// `Fn(Arc<T>, Next<R>) -> impl Future<Output = ChainResult<R>>`.
pub trait IntoMiddleware<T, R = ()> {
    /// Performs the conversion.
    fn into_middleware(self) -> Middleware<T, R>;
}

impl<T, R> IntoMiddleware<T, R> for Middleware<T, R> {
    fn into_middleware(self) -> Middleware<T, R> {
        self
    }
}

impl<F, Fut, T, R> IntoMiddleware<T, R> for F
where
    F: Fn(Arc<T>, Next<R>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ChainResult<R>> + Send + 'static,
    T: Send + Sync + 'static,
    R: Send + 'static,
{
    fn into_middleware(self) -> Middleware<T, R> {
        Middleware::from_fn(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Trace(Mutex<Vec<&'static str>>);

    fn into<M: IntoMiddleware<Trace>>(m: M) -> Middleware<Trace> {
        m.into_middleware()
    }

    #[tokio::test]
    async fn test_closure_conversion() {
        let passthrough = into(|_ctx: Arc<Trace>, next: Next| next.run());
        passthrough.invoke(Arc::new(Trace::default())).await.unwrap();
    }

    #[tokio::test]
    async fn test_onion_order_within_one_stage() {
        let middleware = Middleware::from_fn(|ctx: Arc<Trace>, next: Next| async move {
            ctx.0.lock().push("before");
            next.run().await?;
            ctx.0.lock().push("after");
            Ok(())
        });

        let ctx = Arc::new(Trace::default());
        let next = {
            let ctx = Arc::clone(&ctx);
            Next::from_fn(move || {
                ctx.0.lock().push("terminal");
                async { Ok(()) }
            })
        };
        middleware.call(Arc::clone(&ctx), next).await.unwrap();

        assert_eq!(*ctx.0.lock(), vec!["before", "terminal", "after"]);
    }

    #[tokio::test]
    async fn test_invoke_uses_noop_terminal() {
        let middleware: Middleware<Trace, u8> =
            Middleware::from_fn(|_ctx, next: Next<u8>| async move {
                let inner = next.run().await?;
                Ok(inner + 1)
            });

        let out = middleware.invoke(Arc::new(Trace::default())).await.unwrap();
        assert_eq!(out, 1);
    }

    #[test]
    fn test_name() {
        let middleware: Middleware<Trace> =
            Middleware::from_fn(|_ctx, next: Next| next.run()).with_name("auth");
        assert_eq!(middleware.name(), Some("auth"));
        assert_eq!(middleware.clone().name(), Some("auth"));
    }

    #[test]
    fn test_debug_shows_name() {
        let named: Middleware<Trace> =
            Middleware::from_fn(|_ctx, next: Next| next.run()).with_name("auth");
        let anonymous: Middleware<Trace> = Middleware::from_fn(|_ctx, next: Next| next.run());

        assert_eq!(format!("{named:?}"), r#"Middleware { name: Some("auth"), .. }"#);
        assert_eq!(format!("{anonymous:?}"), "Middleware { name: None, .. }");
    }
}
