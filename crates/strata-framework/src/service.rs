//! Tower integration.
//!
//! - [`ChainService`] exposes a composed middleware as a
//!   `tower::Service<Arc<T>>` whose chain ends in a no-op continuation.
//! - [`ChainLayer`] wraps an inner service: the chain runs first and its
//!   terminal continuation calls the inner service, so a halting stage keeps
//!   the request from reaching it.
//!
//! ```rust,ignore
//! use tower::ServiceBuilder;
//! use tower::timeout::TimeoutLayer;
//!
//! let service = ServiceBuilder::new()
//!     .layer(TimeoutLayer::new(Duration::from_secs(5)))
//!     .layer(ChainLayer::new(auth_chain))
//!     .service(handler);
//! ```

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::TryFutureExt;
use futures::future::BoxFuture;
use strata_core::{BoxError, ChainError, ChainResult, IntoMiddleware, Middleware, Next};
use tower::{Service, ServiceExt};
use tower_layer::Layer;

/// A composed middleware served through `tower::Service`.
pub struct ChainService<T, R = ()> {
    chain: Middleware<T, R>,
}

impl<T, R> ChainService<T, R>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
{
    /// Wraps a middleware (or a [`ChainBuilder`](crate::ChainBuilder)) as a service.
    pub fn new(chain: impl IntoMiddleware<T, R>) -> Self {
        Self {
            chain: chain.into_middleware(),
        }
    }
}

impl<T, R> Clone for ChainService<T, R> {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
        }
    }
}

impl<T, R> Service<Arc<T>> for ChainService<T, R>
where
    T: Send + Sync + 'static,
    R: Default + Send + 'static,
{
    type Response = R;
    type Error = ChainError;
    type Future = BoxFuture<'static, ChainResult<R>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, ctx: Arc<T>) -> Self::Future {
        self.chain.invoke(ctx)
    }
}

/// A [`Layer`] that runs a middleware chain in front of the wrapped service.
pub struct ChainLayer<T, R = ()> {
    chain: Middleware<T, R>,
}

impl<T, R> ChainLayer<T, R>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
{
    /// Creates a layer that runs `chain` before the wrapped service.
    pub fn new(chain: impl IntoMiddleware<T, R>) -> Self {
        Self {
            chain: chain.into_middleware(),
        }
    }
}

impl<T, R> Clone for ChainLayer<T, R> {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
        }
    }
}

impl<T, R, S> Layer<S> for ChainLayer<T, R> {
    type Service = ChainLayerService<T, R, S>;

    fn layer(&self, inner: S) -> Self::Service {
        ChainLayerService {
            chain: self.chain.clone(),
            inner,
        }
    }
}

/// The service produced by [`ChainLayer`].
///
/// Errors from the inner service surface as [`ChainError::Handler`], so a
/// `caught` stage in the chain can intercept them.
pub struct ChainLayerService<T, R, S> {
    chain: Middleware<T, R>,
    inner: S,
}

impl<T, R, S> Clone for ChainLayerService<T, R, S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<T, R, S> Service<Arc<T>> for ChainLayerService<T, R, S>
where
    T: Send + Sync + 'static,
    R: Send + 'static,
    S: Service<Arc<T>, Response = R> + Clone + Send + Sync + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
{
    type Response = R;
    type Error = ChainError;
    type Future = BoxFuture<'static, ChainResult<R>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(ChainError::handler)
    }

    fn call(&mut self, ctx: Arc<T>) -> Self::Future {
        let inner = self.inner.clone();
        let request = Arc::clone(&ctx);
        let terminal = Next::from_fn(move || {
            inner
                .clone()
                .oneshot(Arc::clone(&request))
                .map_err(ChainError::handler)
        });

        self.chain.call(ctx, terminal)
    }
}
