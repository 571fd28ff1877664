//! Call logging middleware.
//!
//! Logs the endpoint, operation, parameters, HTTP method and URL before the
//! call, and the status, elapsed time and response body after it. The body is
//! read from a clone of the buffered response; the caller gets the original.
//! Headers are never logged.

use std::task::{Context, Poll};
use std::time::Instant;

use tower::{Layer, Service};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::pipeline::ServiceFuture;
use crate::{Error, RequestContext, Response, Result};

/// Layer that adds call logging.
///
/// # Example
///
/// ```ignore
/// use keyward::middleware::LoggingLayer;
///
/// let pipeline = Pipeline::builder()
///     .layer(LoggingLayer::new())
///     .build(HyperTransport::default());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
}

/// Level of the request and response summary lines.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogLevel {
    /// Summaries at debug level.
    Debug,
    /// Summaries at info level.
    #[default]
    Info,
}

impl LoggingLayer {
    /// Create a new logging layer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging layer that logs summaries at debug level.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Service that logs calls.
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    level: LogLevel,
}

impl<S> Service<RequestContext> for Logging<S>
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

    fn call(&mut self, ctx: RequestContext) -> Self::Future {
        let endpoint = ctx.endpoint();
        let operation = ctx.operation_name();
        let params = ctx.params().to_string();
        let method = ctx.request().method();
        let url = ctx.request().url().to_string();
        let level = self.level;

        let span = info_span!("admin_call", endpoint, operation);

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(
            async move {
                let start = Instant::now();

                match level {
                    LogLevel::Debug => debug!(
                        %params, %method, %url,
                        "calling {endpoint} {operation}"
                    ),
                    LogLevel::Info => info!(
                        %params, %method, %url,
                        "calling {endpoint} {operation}"
                    ),
                }

                let result = inner.call(ctx).await;
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                match &result {
                    Ok(response) => {
                        let status = response.status();
                        if !response.is_success() {
                            warn!(status, elapsed_ms, "{endpoint} {operation} returned an HTTP error");
                        } else if matches!(level, LogLevel::Debug) {
                            debug!(status, elapsed_ms, "{endpoint} {operation} completed");
                        } else {
                            info!(status, elapsed_ms, "{endpoint} {operation} completed");
                        }

                        let observed = response.clone();
                        debug!(body = %observed.text_lossy(), "{endpoint} {operation} response body");
                    }
                    Err(err) => {
                        warn!(error = %err, elapsed_ms, "{endpoint} {operation} failed");
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}
