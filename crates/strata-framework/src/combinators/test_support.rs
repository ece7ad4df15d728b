//! Shared fixtures for combinator tests.

use std::sync::Arc;

use parking_lot::Mutex;
use strata_core::{ChainError, Middleware, Next};

/// A context that records which stages ran, in order.
#[derive(Default)]
pub(crate) struct Trace {
    steps: Mutex<Vec<String>>,
}

impl Trace {
    pub(crate) fn push(&self, step: impl Into<String>) {
        self.steps.lock().push(step.into());
    }

    pub(crate) fn steps(&self) -> Vec<String> {
        self.steps.lock().clone()
    }
}

/// Records `name` and continues.
pub(crate) fn pass(name: &'static str) -> Middleware<Trace> {
    Middleware::from_fn(move |ctx: Arc<Trace>, next: Next| {
        ctx.push(name);
        next.run()
    })
}

/// Records `name` and halts.
pub(crate) fn halt(name: &'static str) -> Middleware<Trace> {
    Middleware::from_fn(move |ctx: Arc<Trace>, _next: Next| {
        ctx.push(name);
        async { Ok(()) }
    })
}

/// Records `name` and fails.
pub(crate) fn fail(name: &'static str) -> Middleware<Trace> {
    Middleware::from_fn(move |ctx: Arc<Trace>, _next: Next| {
        ctx.push(name);
        async move { Err(ChainError::msg(format!("{name} failed"))) }
    })
}

/// A terminal continuation that records `"next"`.
pub(crate) fn terminal(ctx: &Arc<Trace>) -> Next {
    let ctx = Arc::clone(ctx);
    Next::from_fn(move || {
        ctx.push("next");
        async { Ok(()) }
    })
}
