//! Onion dispatch.
//!
//! [`compose`] turns an ordered sequence of middleware into one middleware.
//! The first element is the outermost layer: it runs first, and whatever it
//! does after `next.run().await` runs after every later stage has finished.
//!
//! ```text
//!  compose([a, b, c])(ctx, terminal)
//!
//!  a ──next──▶ b ──next──▶ c ──next──▶ terminal
//!  a ◀──────── b ◀──────── c ◀──────── terminal
//! ```
//!
//! Each invocation of the composed middleware owns a fresh high-water mark
//! recording the highest stage index dispatched so far. Dispatching an index
//! that is not above the mark fails with
//! [`ChainError::NextCalledMultipleTimes`]. Concurrent invocations never
//! share a mark.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use parking_lot::Mutex;
use tracing::{Instrument, debug, debug_span, trace};

use crate::error::{ChainError, ChainResult};
use crate::middleware::Middleware;
use crate::next::Next;

/// Composes `middleware` into a single middleware.
///
/// - An empty sequence yields a middleware that calls the terminal `next`
///   directly.
/// - A single middleware is returned as is.
/// - Longer sequences are dispatched stage by stage as described in the
///   [module documentation](self).
pub fn compose<T, R, I>(middleware: I) -> Middleware<T, R>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
    I: IntoIterator<Item = Middleware<T, R>>,
{
    let stack: Vec<Middleware<T, R>> = middleware.into_iter().collect();

    match <[Middleware<T, R>; 1]>::try_from(stack) {
        Ok([single]) => single,
        Err(stack) if stack.is_empty() => Middleware::from_fn(|_ctx, next: Next<R>| next.run()),
        Err(stack) => onion(stack),
    }
}

/// Composes a sequence whose slots may be empty.
///
/// Fails with [`ChainError::NotCallable`] naming the first empty slot, before
/// anything runs.
pub fn try_compose<T, R, I>(slots: I) -> ChainResult<Middleware<T, R>>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
    I: IntoIterator<Item = Option<Middleware<T, R>>>,
{
    let stack = slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.ok_or(ChainError::NotCallable { index }))
        .collect::<ChainResult<Vec<_>>>()?;

    Ok(compose(stack))
}

fn onion<T, R>(stack: Vec<Middleware<T, R>>) -> Middleware<T, R>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
{
    let stack: Arc<[Middleware<T, R>]> = stack.into();

    Middleware::from_fn(move |ctx: Arc<T>, next: Next<R>| {
        let span = debug_span!("compose", stages = stack.len());
        let dispatch = Arc::new(Dispatch {
            stack: Arc::clone(&stack),
            ctx,
            terminal: next,
            high_water: Mutex::new(None),
        });

        span.in_scope(|| dispatch.dispatch(0)).instrument(span)
    })
}

/// Dispatch state for one invocation of a composed middleware.
struct Dispatch<T, R> {
    stack: Arc<[Middleware<T, R>]>,
    ctx: Arc<T>,
    terminal: Next<R>,
    high_water: Mutex<Option<usize>>,
}

impl<T, R> Dispatch<T, R>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
{
    fn dispatch(self: &Arc<Self>, index: usize) -> BoxFuture<'static, ChainResult<R>> {
        {
            let mut high_water = self.high_water.lock();
            if high_water.is_some_and(|last| index <= last) {
                debug!(stage = index, "next() called multiple times");
                return future::ready(Err(ChainError::NextCalledMultipleTimes)).boxed();
            }
            *high_water = Some(index);
        }

        let Some(middleware) = self.stack.get(index) else {
            trace!("reached terminal continuation");
            return self.terminal.run();
        };

        trace!(
            stage = index,
            middleware = middleware.name().unwrap_or("anonymous"),
            "entering middleware"
        );

        let this = Arc::clone(self);
        let next = Next::from_boxed(move || this.dispatch(index + 1));
        middleware.call(Arc::clone(&self.ctx), next)
    }
}
