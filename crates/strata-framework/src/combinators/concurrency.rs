//! Concurrent fan-out.

use std::sync::Arc;

use futures::future::try_join_all;
use strata_core::{IntoMiddleware, Middleware, Next, wrap_next_call};
use tracing::trace;

/// Runs every middleware concurrently against the same context and continues
/// only if all of them continued.
///
/// Each middleware runs behind its own invocation guard, so none of them can
/// reach the rest of the chain. All of them start before the first is polled;
/// no order among them is guaranteed.
///
/// The first error fails the whole combinator. The remaining middleware are
/// polled by the same future, so they are dropped at their current suspension
/// point: they are neither awaited nor rolled back, and side effects they
/// already performed remain. An empty set continues immediately.
pub fn concurrency<T, R, I>(middleware: I) -> Middleware<T, R>
where
    T: Send + Sync + 'static,
    R: Default + Send + 'static,
    I: IntoIterator,
    I::Item: IntoMiddleware<T, R>,
{
    let set: Arc<[Middleware<T, R>]> = middleware
        .into_iter()
        .map(IntoMiddleware::into_middleware)
        .collect();

    Middleware::from_fn(move |ctx: Arc<T>, next: Next<R>| {
        let running: Vec<_> = set
            .iter()
            .map(|m| wrap_next_call(m, Arc::clone(&ctx)))
            .collect();
        async move {
            let continued = try_join_all(running).await?;
            if continued.iter().all(|&c| c) {
                next.run().await
            } else {
                trace!(
                    halted = continued.iter().filter(|&&c| !c).count(),
                    "concurrent middleware halted the chain"
                );
                Ok(R::default())
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::test_support::{Trace, fail, halt, pass, terminal};
    use std::time::Duration;
    use strata_core::ChainError;
    use tokio::sync::Barrier;

    #[tokio::test]
    async fn test_all_continue() {
        let ctx = Arc::new(Trace::default());
        concurrency([pass("a"), pass("b"), pass("c")])
            .call(Arc::clone(&ctx), terminal(&ctx))
            .await
            .unwrap();

        let steps = ctx.steps();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps.last().map(String::as_str), Some("next"));
        assert_eq!(steps.iter().filter(|s| *s == "next").count(), 1);
    }

    #[tokio::test]
    async fn test_next_runs_once_after_suspended_members() {
        let sleeper = |name: &'static str, millis: u64| {
            Middleware::from_fn(move |ctx: Arc<Trace>, next: Next| async move {
                tokio::time::sleep(Duration::from_millis(millis)).await;
                ctx.push(name);
                next.run().await
            })
        };

        let ctx = Arc::new(Trace::default());
        concurrency([sleeper("slow", 30), sleeper("medium", 10), sleeper("fast", 0)])
            .call(Arc::clone(&ctx), terminal(&ctx))
            .await
            .unwrap();

        assert_eq!(ctx.steps(), ["fast", "medium", "slow", "next"]);
    }

    #[tokio::test]
    async fn test_one_halts() {
        let ctx = Arc::new(Trace::default());
        concurrency([pass("a"), halt("b"), pass("c")])
            .call(Arc::clone(&ctx), terminal(&ctx))
            .await
            .unwrap();

        assert_eq!(ctx.steps(), ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_one_fails() {
        let ctx = Arc::new(Trace::default());
        let err = concurrency([pass("a"), fail("b"), pass("c")])
            .call(Arc::clone(&ctx), terminal(&ctx))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "b failed");
        assert!(!ctx.steps().contains(&"next".to_string()));
    }

    #[tokio::test]
    async fn test_empty_continues() {
        let ctx = Arc::new(Trace::default());
        concurrency(Vec::<Middleware<Trace>>::new())
            .call(Arc::clone(&ctx), terminal(&ctx))
            .await
            .unwrap();
        assert_eq!(ctx.steps(), ["next"]);
    }

    #[tokio::test]
    async fn test_runs_concurrently() {
        // Both members wait on the same barrier; this only completes if they
        // are in flight at the same time.
        let barrier = Arc::new(Barrier::new(2));
        let member = |name: &'static str| {
            let barrier = Arc::clone(&barrier);
            Middleware::from_fn(move |ctx: Arc<Trace>, next: Next| {
                let barrier = Arc::clone(&barrier);
                async move {
                    barrier.wait().await;
                    ctx.push(name);
                    next.run().await
                }
            })
        };

        let ctx = Arc::new(Trace::default());
        let fan_out = concurrency([member("a"), member("b")]);
        tokio::time::timeout(
            Duration::from_secs(1),
            fan_out.call(Arc::clone(&ctx), terminal(&ctx)),
        )
        .await
        .expect("members did not run concurrently")
        .unwrap();

        assert_eq!(ctx.steps().last().map(String::as_str), Some("next"));
    }

    #[tokio::test]
    async fn test_error_drops_slow_sibling() {
        let slow = Middleware::from_fn(|ctx: Arc<Trace>, next: Next| async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            ctx.push("slow");
            next.run().await
        });
        let failing = Middleware::from_fn(|_ctx: Arc<Trace>, _next: Next| async {
            tokio::task::yield_now().await;
            Err(ChainError::msg("fast failure"))
        });

        let ctx = Arc::new(Trace::default());
        let err = concurrency([slow, failing])
            .call(Arc::clone(&ctx), terminal(&ctx))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "fast failure");
        assert!(ctx.steps().is_empty());
    }
}
