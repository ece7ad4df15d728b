//! Invocation guard.
//!
//! Answers "did this middleware choose to continue?" without handing it the
//! rest of the chain. The guarded continuation resolves immediately with
//! `R::default()` on its first call and fails on any later call.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future;

use crate::error::{ChainError, ChainResult};
use crate::middleware::Middleware;
use crate::next::Next;

/// Records whether the continuation it hands out was called.
#[derive(Debug, Clone, Default)]
pub struct InvocationGuard {
    called: Arc<AtomicBool>,
}

impl InvocationGuard {
    /// Creates a guard whose continuation has not been called yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the guarded continuation.
    ///
    /// Every continuation returned by the same guard shares one flag, so only
    /// the first call across all of them succeeds.
    pub fn next<R>(&self) -> Next<R>
    where
        R: Default + Send + 'static,
    {
        let called = Arc::clone(&self.called);
        Next::from_fn(move || {
            let first = !called.swap(true, Ordering::SeqCst);
            future::ready(if first {
                Ok(R::default())
            } else {
                Err(ChainError::NextCalledMultipleTimes)
            })
        })
    }

    /// Returns `true` once the continuation has been called.
    pub fn was_called(&self) -> bool {
        self.called.load(Ordering::SeqCst)
    }
}

/// Runs `middleware` against `ctx` behind an [`InvocationGuard`].
///
/// Resolves to whether the middleware called its continuation. Errors raised
/// by the middleware, including a second call of the continuation, are
/// propagated. The middleware starts running when this function is called.
pub fn wrap_next_call<T, R>(
    middleware: &Middleware<T, R>,
    ctx: Arc<T>,
) -> impl Future<Output = ChainResult<bool>> + Send + use<T, R>
where
    T: Send + Sync + 'static,
    R: Default + Send + 'static,
{
    let guard = InvocationGuard::new();
    let running = middleware.call(ctx, guard.next());
    async move {
        running.await?;
        Ok(guard.was_called())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ctx;

    fn continuing() -> Middleware<Ctx> {
        Middleware::from_fn(|_ctx, next: Next| next.run())
    }

    fn halting() -> Middleware<Ctx> {
        Middleware::from_fn(|_ctx, _next: Next| async { Ok(()) })
    }

    #[tokio::test]
    async fn test_reports_continue() {
        assert!(wrap_next_call(&continuing(), Arc::new(Ctx)).await.unwrap());
    }

    #[tokio::test]
    async fn test_reports_halt() {
        assert!(!wrap_next_call(&halting(), Arc::new(Ctx)).await.unwrap());
    }

    #[tokio::test]
    async fn test_second_call_fails() {
        let twice = Middleware::from_fn(|_ctx: Arc<Ctx>, next: Next| async move {
            next.run().await?;
            next.run().await
        });

        let err = wrap_next_call(&twice, Arc::new(Ctx)).await.unwrap_err();
        assert!(err.is_multiple_next());
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let failing = Middleware::from_fn(|_ctx: Arc<Ctx>, next: Next| async move {
            next.run().await?;
            Err(ChainError::msg("denied"))
        });

        let err = wrap_next_call(&failing, Arc::new(Ctx)).await.unwrap_err();
        assert_eq!(err.to_string(), "denied");
    }

    #[tokio::test]
    async fn test_outlives_borrowed_middleware() {
        let running = {
            let middleware = continuing();
            wrap_next_call(&middleware, Arc::new(Ctx))
        };
        let spawned = tokio::spawn(running);
        assert!(spawned.await.unwrap().unwrap());
    }

    #[test]
    fn test_guard_flag_shared_by_clones() {
        let guard = InvocationGuard::new();
        let first: Next = guard.next();
        let second: Next = guard.clone().next();

        assert!(!guard.was_called());
        assert!(tokio_test::block_on(first.run()).is_ok());
        assert!(guard.was_called());
        assert!(tokio_test::block_on(second.run()).unwrap_err().is_multiple_next());
    }
}
