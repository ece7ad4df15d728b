//! Error trapping.

use std::future::Future;
use std::sync::Arc;

use strata_core::{ChainError, ChainResult, Middleware, Next};
use tracing::debug;

/// Continues, and hands any error raised downstream to `on_error`.
///
/// Whatever `on_error` returns becomes the result of this stage. An error
/// returned by `on_error` itself propagates to the caller.
pub fn caught<T, R, F, Fut>(on_error: F) -> Middleware<T, R>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(Arc<T>, ChainError) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ChainResult<R>> + Send + 'static,
{
    let on_error = Arc::new(on_error);
    Middleware::from_fn(move |ctx: Arc<T>, next: Next<R>| {
        let downstream = next.run();
        let on_error = Arc::clone(&on_error);
        async move {
            match downstream.await {
                Ok(value) => Ok(value),
                Err(error) => {
                    debug!(%error, "caught chain error");
                    on_error(ctx, error).await
                }
            }
        }
    })
}
