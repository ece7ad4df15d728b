//! Gated sequencing: `before`, `after` and `enforce`.
//!
//! Each gate runs a middleware behind an [`InvocationGuard`](strata_core::InvocationGuard).
//! When a gated middleware does not continue, the combinator resolves with
//! `R::default()` without running anything further. A halted gate is not an
//! error.

use std::sync::Arc;

use strata_core::{IntoMiddleware, Middleware, Next, wrap_next_call};
use tracing::trace;

/// Runs `middleware` only if `gate` continues.
pub fn before<T, R>(
    gate: impl IntoMiddleware<T, R>,
    middleware: impl IntoMiddleware<T, R>,
) -> Middleware<T, R>
where
    T: Send + Sync + 'static,
    R: Default + Send + 'static,
{
    let gate = gate.into_middleware();
    let middleware = middleware.into_middleware();

    Middleware::from_fn(move |ctx: Arc<T>, next: Next<R>| {
        let passed = wrap_next_call(&gate, Arc::clone(&ctx));
        let middleware = middleware.clone();
        async move {
            if !passed.await? {
                trace!("before gate halted the chain");
                return Ok(R::default());
            }
            middleware.call(ctx, next).await
        }
    })
}

/// Runs `follow_up` only if `middleware` continues.
///
/// `follow_up` receives the real continuation.
pub fn after<T, R>(
    middleware: impl IntoMiddleware<T, R>,
    follow_up: impl IntoMiddleware<T, R>,
) -> Middleware<T, R>
where
    T: Send + Sync + 'static,
    R: Default + Send + 'static,
{
    before(middleware, follow_up)
}

/// Runs `gate`, then `middleware`, then `follow_up`, each only if the
/// previous one continued. `follow_up` receives the real continuation.
pub fn enforce<T, R>(
    gate: impl IntoMiddleware<T, R>,
    middleware: impl IntoMiddleware<T, R>,
    follow_up: impl IntoMiddleware<T, R>,
) -> Middleware<T, R>
where
    T: Send + Sync + 'static,
    R: Default + Send + 'static,
{
    let gate = gate.into_middleware();
    let middleware = middleware.into_middleware();
    let follow_up = follow_up.into_middleware();

    Middleware::from_fn(move |ctx: Arc<T>, next: Next<R>| {
        let gate = gate.clone();
        let middleware = middleware.clone();
        let follow_up = follow_up.clone();
        async move {
            if !wrap_next_call(&gate, Arc::clone(&ctx)).await? {
                trace!("enforce gate halted the chain");
                return Ok(R::default());
            }
            if !wrap_next_call(&middleware, Arc::clone(&ctx)).await? {
                trace!("enforced middleware halted the chain");
                return Ok(R::default());
            }
            follow_up.call(ctx, next).await
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::test_support::{Trace, fail, halt, pass, terminal};

    #[tokio::test]
    async fn test_before_passes() {
        let ctx = Arc::new(Trace::default());
        before(pass("gate"), pass("main"))
            .call(Arc::clone(&ctx), terminal(&ctx))
            .await
            .unwrap();
        assert_eq!(ctx.steps(), ["gate", "main", "next"]);
    }

    #[tokio::test]
    async fn test_before_halts() {
        let ctx = Arc::new(Trace::default());
        before(halt("gate"), pass("main"))
            .call(Arc::clone(&ctx), terminal(&ctx))
            .await
            .unwrap();
        assert_eq!(ctx.steps(), ["gate"]);
    }

    #[tokio::test]
    async fn test_before_gate_error() {
        let ctx = Arc::new(Trace::default());
        let err = before(fail("gate"), pass("main"))
            .call(Arc::clone(&ctx), terminal(&ctx))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "gate failed");
        assert_eq!(ctx.steps(), ["gate"]);
    }

    #[tokio::test]
    async fn test_after_runs_follow_up() {
        let ctx = Arc::new(Trace::default());
        after(pass("main"), pass("audit"))
            .call(Arc::clone(&ctx), terminal(&ctx))
            .await
            .unwrap();
        assert_eq!(ctx.steps(), ["main", "audit", "next"]);
    }

    #[tokio::test]
    async fn test_after_halts() {
        let ctx = Arc::new(Trace::default());
        after(halt("main"), pass("audit"))
            .call(Arc::clone(&ctx), terminal(&ctx))
            .await
            .unwrap();
        assert_eq!(ctx.steps(), ["main"]);
    }

    #[tokio::test]
    async fn test_enforce_all_pass() {
        let ctx = Arc::new(Trace::default());
        enforce(pass("gate"), pass("main"), pass("audit"))
            .call(Arc::clone(&ctx), terminal(&ctx))
            .await
            .unwrap();
        assert_eq!(ctx.steps(), ["gate", "main", "audit", "next"]);
    }

    #[tokio::test]
    async fn test_enforce_gate_halts() {
        let ctx = Arc::new(Trace::default());
        enforce(halt("gate"), pass("main"), pass("audit"))
            .call(Arc::clone(&ctx), terminal(&ctx))
            .await
            .unwrap();
        assert_eq!(ctx.steps(), ["gate"]);
    }

    #[tokio::test]
    async fn test_enforce_middleware_error() {
        let ctx = Arc::new(Trace::default());
        let err = enforce(pass("gate"), fail("main"), pass("audit"))
            .call(Arc::clone(&ctx), terminal(&ctx))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "main failed");
        assert_eq!(ctx.steps(), ["gate", "main"]);
    }

    #[tokio::test]
    async fn test_enforce_follow_up_error() {
        let ctx = Arc::new(Trace::default());
        let err = enforce(pass("gate"), pass("main"), fail("audit"))
            .call(Arc::clone(&ctx), terminal(&ctx))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "audit failed");
        assert_eq!(ctx.steps(), ["gate", "main", "audit"]);
    }

    #[tokio::test]
    async fn test_enforce_middle_halts() {
        let ctx = Arc::new(Trace::default());
        enforce(pass("gate"), halt("main"), pass("audit"))
            .call(Arc::clone(&ctx), terminal(&ctx))
            .await
            .unwrap();
        assert_eq!(ctx.steps(), ["gate", "main"]);
    }

    #[tokio::test]
    async fn test_enforce_follow_up_decides() {
        let ctx = Arc::new(Trace::default());
        enforce(pass("gate"), pass("main"), halt("audit"))
            .call(Arc::clone(&ctx), terminal(&ctx))
            .await
            .unwrap();
        assert_eq!(ctx.steps(), ["gate", "main", "audit"]);
    }
}
