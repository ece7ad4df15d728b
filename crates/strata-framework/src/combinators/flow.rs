//! Unconditional flow control: `skip`, `stop`, `lazy`, `tap` and `fork`.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future;
use strata_core::{ChainError, ChainResult, IntoMiddleware, Middleware, Next};
use tokio::runtime::Handle;
use tokio::sync::OnceCell;
use tracing::{trace, warn};

/// Continues immediately.
pub fn skip<T, R>() -> Middleware<T, R>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
{
    Middleware::from_fn(|_ctx, next: Next<R>| next.run()).with_name("skip")
}

/// Ends the chain here, resolving with `R::default()`.
pub fn stop<T, R>() -> Middleware<T, R>
where
    T: Send + Sync + 'static,
    R: Default + Send + 'static,
{
    Middleware::from_fn(|_ctx, _next: Next<R>| future::ready(Ok(R::default()))).with_name("stop")
}

/// Resolves the middleware to run on first use and reuses it afterwards.
///
/// The factory sees the context of the first invocation. Its result is cached
/// in this combinator instance, not per context: every later invocation, with
/// any context, runs the same middleware. Concurrent first invocations share
/// one factory run. A factory error fails that invocation and is not cached.
pub fn lazy<T, R, F, Fut>(factory: F) -> Middleware<T, R>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ChainResult<Middleware<T, R>>> + Send + 'static,
{
    let factory = Arc::new(factory);
    let resolved: Arc<OnceCell<Middleware<T, R>>> = Arc::new(OnceCell::new());

    Middleware::from_fn(move |ctx: Arc<T>, next: Next<R>| {
        let factory = Arc::clone(&factory);
        let resolved = Arc::clone(&resolved);
        async move {
            let middleware = resolved
                .get_or_try_init(|| {
                    trace!("resolving lazy middleware");
                    factory(Arc::clone(&ctx))
                })
                .await?
                .clone();
            middleware.call(ctx, next).await
        }
    })
}

/// Runs `middleware` for its side effects, then continues.
///
/// The tapped middleware receives a continuation that does nothing, so it can
/// neither advance nor halt the chain. Its errors still propagate.
pub fn tap<T, R>(middleware: impl IntoMiddleware<T, R>) -> Middleware<T, R>
where
    T: Send + Sync + 'static,
    R: Default + Send + 'static,
{
    let middleware = middleware.into_middleware();
    Middleware::from_fn(move |ctx: Arc<T>, next: Next<R>| {
        let tapped = middleware.call(Arc::clone(&ctx), Next::noop());
        async move {
            tapped.await?;
            next.run().await
        }
    })
}

/// Schedules `middleware` on the tokio runtime and continues without waiting.
///
/// The forked middleware starts on a later scheduler turn with a continuation
/// that does nothing. Its result is never observed by the chain; failures are
/// reported through `tracing` at `WARN` level. Invoking a fork outside a tokio
/// runtime fails with [`ChainError::NoRuntime`].
pub fn fork<T, R>(middleware: impl IntoMiddleware<T, R>) -> Middleware<T, R>
where
    T: Send + Sync + 'static,
    R: Default + Send + 'static,
{
    let middleware = middleware.into_middleware();
    Middleware::from_fn(move |ctx: Arc<T>, next: Next<R>| {
        let Ok(handle) = Handle::try_current() else {
            return future::ready(Err(ChainError::NoRuntime)).boxed();
        };

        let forked = middleware.clone();
        handle.spawn(async move {
            if let Err(error) = forked.call(ctx, Next::noop()).await {
                warn!(
                    middleware = forked.name().unwrap_or("anonymous"),
                    %error,
                    "forked middleware failed"
                );
            }
        });

        next.run()
    })
}
