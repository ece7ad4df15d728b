//! The continuation handed to every middleware.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};

use crate::error::ChainResult;

type NextFn<R> = dyn Fn() -> BoxFuture<'static, ChainResult<R>> + Send + Sync;

/// Hands control to the next stage of a chain.
///
/// `Next` is cheap to clone, and every clone refers to the same stage.
/// Calling [`run`](Next::run) more than once for the same stage of one
/// invocation is a protocol violation: the dispatcher answers the second call
/// with [`ChainError::NextCalledMultipleTimes`](crate::ChainError).
///
/// The dispatch step happens when `run` is called. The returned future only
/// drives the downstream stages that were already selected.
pub struct Next<R = ()> {
    inner: Arc<NextFn<R>>,
}

impl<R> Clone for Next<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> fmt::Debug for Next<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

impl<R: Send + 'static> Next<R> {
    /// Creates a continuation from a closure.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ChainResult<R>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move || f().boxed()),
        }
    }

    /// Creates a continuation from a closure that already returns a boxed future.
    pub fn from_boxed<F>(f: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, ChainResult<R>> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Advances the chain.
    pub fn run(&self) -> BoxFuture<'static, ChainResult<R>> {
        (self.inner)()
    }
}

impl<R: Default + Send + 'static> Next<R> {
    /// A terminal continuation that resolves immediately with `R::default()`.
    pub fn noop() -> Self {
        Self::from_boxed(|| future::ready(Ok(R::default())).boxed())
    }
}

impl<R: Default + Send + 'static> Default for Next<R> {
    fn default() -> Self {
        Self::noop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_noop_resolves_default() {
        let next: Next<u32> = Next::noop();
        assert_eq!(next.run().await.unwrap(), 0);
    }

    #[test]
    fn test_run_is_eager() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let next: Next = Next::from_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        });

        // The closure runs on `run`, before anything polls the future.
        let pending = next.run();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        drop(pending);
    }

    #[test]
    fn test_clones_share_target() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let next: Next = Next::from_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        });

        let other = next.clone();
        tokio_test::block_on(next.run()).unwrap();
        tokio_test::block_on(other.run()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
