//! Ordered middleware chain over [`RequestContext`].
//!
//! A [`Pipeline`] is a stack of tower layers ending in a dispatch step that
//! hands the finished [`Request`](crate::Request) to an [`HttpClient`]. The
//! first layer added is the outermost one: it sees the request first and the
//! response last.
//!
//! ```ignore
//! use keyward::{HyperTransport, Pipeline};
//!
//! let pipeline = Pipeline::builder()
//!     .with_logging()
//!     .with_bearer_auth(tokens.clone())
//!     .build(HyperTransport::default());
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use tower::util::BoxCloneService;
use tower::{Layer, ServiceExt};
use tower_service::Service;

use crate::auth::TokenSource;
use crate::middleware::{BearerAuthLayer, LoggingLayer};
use crate::{Error, HttpClient, RequestContext, Response, Result};

/// Type-erased middleware stack.
pub type BoxedService = BoxCloneService<RequestContext, Response, Error>;

/// Future returned by the pipeline and the bundled middlewares.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response>> + Send + 'static>>;

type LayerFn = Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>;

/// Innermost service: drops the call metadata and sends the request.
#[derive(Debug, Clone)]
struct Dispatch<T> {
    transport: T,
}

impl<T> Service<RequestContext> for Dispatch<T>
where
    T: HttpClient + Clone + 'static,
{
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, ctx: RequestContext) -> Self::Future {
        let transport = self.transport.clone();
        Box::pin(async move { transport.execute(ctx.into_request()).await })
    }
}

/// A built middleware chain.
///
/// Cloning is cheap; every call clones the stack out of a shared mutex so the
/// pipeline is `Sync` and calls never hold the lock across an await.
#[derive(Clone)]
pub struct Pipeline {
    service: Arc<Mutex<BoxedService>>,
    layers: Arc<[&'static str]>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Create a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Names of the configured layers, outermost first.
    #[must_use]
    pub fn layer_names(&self) -> &[&'static str] {
        &self.layers
    }

    /// Run one call through the chain.
    pub fn call(&self, ctx: RequestContext) -> ServiceFuture {
        let service = self
            .service
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        Box::pin(service.oneshot(ctx))
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    layers: Vec<(&'static str, LayerFn)>,
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.layers.iter().map(|(name, _)| *name).collect();
        f.debug_struct("PipelineBuilder")
            .field("layers", &names)
            .finish()
    }
}

impl PipelineBuilder {
    /// Add a tower layer. First added = outermost.
    #[must_use]
    pub fn layer<L>(self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<RequestContext, Response = Response, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<RequestContext>>::Future: Send + 'static,
    {
        self.named_layer(std::any::type_name::<L>(), layer)
    }

    /// Add a tower layer under an explicit name (shown by [`Pipeline::layer_names`]).
    #[must_use]
    pub fn named_layer<L>(mut self, name: &'static str, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<RequestContext, Response = Response, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<RequestContext>>::Future: Send + 'static,
    {
        self.layers.push((
            name,
            Arc::new(move |service| BoxCloneService::new(layer.layer(service))),
        ));
        self
    }

    /// Add call logging at info level.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.named_layer("logging", LoggingLayer::new())
    }

    /// Add call logging at debug level.
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.named_layer("logging", LoggingLayer::debug())
    }

    /// Add bearer token injection from `source`.
    #[must_use]
    pub fn with_bearer_auth(self, source: impl TokenSource + 'static) -> Self {
        self.named_layer("bearer_auth", BearerAuthLayer::new(source))
    }

    /// The standard admin chain: logging, then bearer token injection.
    ///
    /// Logging runs first, so the logged request does not show the
    /// `Authorization` header.
    #[must_use]
    pub fn with_defaults(self, source: impl TokenSource + 'static) -> Self {
        self.with_logging().with_bearer_auth(source)
    }

    /// Build the pipeline on top of `transport`.
    #[must_use]
    pub fn build<T>(self, transport: T) -> Pipeline
    where
        T: HttpClient + Clone + 'static,
    {
        let names: Arc<[&'static str]> = self.layers.iter().map(|(name, _)| *name).collect();

        let mut service: BoxedService = BoxCloneService::new(Dispatch { transport });
        for (_, layer_fn) in self.layers.into_iter().rev() {
            service = layer_fn(service);
        }

        Pipeline {
            service: Arc::new(Mutex::new(service)),
            layers: names,
        }
    }
}
