//! Conditional combinators: `branch`, `optional` and `filter`.

use std::sync::Arc;

use strata_core::{IntoMiddleware, Middleware, Next};
use tracing::trace;

use super::flow::{skip, stop};
use crate::condition::Condition;

/// Runs `on_true` or `on_false` depending on `condition`.
///
/// A [`Condition::Static`] picks the branch once, here; the returned
/// middleware *is* the chosen branch. A dynamic condition is evaluated against
/// the context on every invocation. The chosen branch receives the real
/// continuation, so its result and its decision to continue are those of the
/// combinator.
pub fn branch<T, R>(
    condition: impl Into<Condition<T>>,
    on_true: impl IntoMiddleware<T, R>,
    on_false: impl IntoMiddleware<T, R>,
) -> Middleware<T, R>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
{
    let on_true = on_true.into_middleware();
    let on_false = on_false.into_middleware();

    match condition.into() {
        Condition::Static(true) => on_true,
        Condition::Static(false) => on_false,
        dynamic @ Condition::Dynamic(_) => Middleware::from_fn(move |ctx: Arc<T>, next: Next<R>| {
            let decision = dynamic.evaluate(Arc::clone(&ctx));
            let on_true = on_true.clone();
            let on_false = on_false.clone();
            async move {
                let chosen = if decision.await? { on_true } else { on_false };
                trace!(
                    branch = chosen.name().unwrap_or("anonymous"),
                    "branch selected"
                );
                chosen.call(ctx, next).await
            }
        }),
    }
}

/// Runs `middleware` when `condition` holds; otherwise continues.
pub fn optional<T, R>(
    condition: impl Into<Condition<T>>,
    middleware: impl IntoMiddleware<T, R>,
) -> Middleware<T, R>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
{
    branch(condition, middleware, skip())
}

/// Runs `middleware` when `condition` holds; otherwise ends the chain.
pub fn filter<T, R>(
    condition: impl Into<Condition<T>>,
    middleware: impl IntoMiddleware<T, R>,
) -> Middleware<T, R>
where
    T: Send + Sync + 'static,
    R: Default + Send + 'static,
{
    branch(condition, middleware, stop())
}
