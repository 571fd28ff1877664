//! Tower middleware layers for the admin call pipeline.
//!
//! Every layer wraps a `Service<RequestContext>`; they are composed by
//! [`PipelineBuilder`](crate::PipelineBuilder), first added = outermost.
//!
//! # Available Layers
//!
//! - [`LoggingLayer`] - Logs each call (endpoint, operation, params, status, body) using `tracing`
//! - [`BearerAuthLayer`] - Adds `Authorization: Bearer <token>` when a token is available
//!
//! # Writing a middleware
//!
//! A middleware may change the [`RequestContext`](crate::RequestContext) before
//! calling the inner service, look at the response afterwards, or answer
//! without calling the inner service at all.
//!
//! ```ignore
//! use keyward::middleware::{Layer, ServiceBuilder};
//!
//! let pipeline = Pipeline::builder()
//!     .with_logging()
//!     .layer(MyAuditLayer::new())
//!     .build(HyperTransport::default());
//! ```

mod bearer_auth;
mod logging;

pub use bearer_auth::{BearerAuth, BearerAuthLayer};
pub use logging::{LogLevel, Logging, LoggingLayer};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
