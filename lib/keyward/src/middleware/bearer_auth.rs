//! Bearer token injection middleware.
//!
//! The token is read from a [`TokenSource`] at dispatch time, so a refreshed
//! token is picked up by the next call and a cleared session sends none.

use std::sync::Arc;
use std::task::{Context, Poll};

use tower::{Layer, Service};

use crate::auth::TokenSource;
use crate::pipeline::ServiceFuture;
use crate::{Error, RequestContext, Response, Result};

/// Layer that adds bearer token authentication to calls.
///
/// # Example
///
/// ```ignore
/// use keyward::middleware::BearerAuthLayer;
///
/// let layer = BearerAuthLayer::new(tokens.clone());
/// ```
#[derive(Clone)]
pub struct BearerAuthLayer {
    source: Arc<dyn TokenSource>,
}

impl std::fmt::Debug for BearerAuthLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuthLayer").finish_non_exhaustive()
    }
}

impl BearerAuthLayer {
    /// Create a layer reading tokens from `source`.
    pub fn new(source: impl TokenSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }
}

impl<S> Layer<S> for BearerAuthLayer {
    type Service = BearerAuth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerAuth {
            inner,
            source: Arc::clone(&self.source),
        }
    }
}

/// Service that adds bearer token authentication to calls.
#[derive(Clone)]
pub struct BearerAuth<S> {
    inner: S,
    source: Arc<dyn TokenSource>,
}

impl<S> std::fmt::Debug for BearerAuth<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuth").finish_non_exhaustive()
    }
}

impl<S> Service<RequestContext> for BearerAuth<S>
where
    S: Service<RequestContext, Response = Response, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut ctx: RequestContext) -> Self::Future {
        if let Some(token) = self.source.token() {
            let headers = ctx.request_mut().headers_mut();
            headers.retain(|name, _| !name.eq_ignore_ascii_case("authorization"));
            headers.insert("Authorization".to_string(), format!("Bearer {token}"));
        }

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move { inner.call(ctx).await })
    }
}
