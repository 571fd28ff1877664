//! Per-call request context threaded through the middleware chain.

use crate::{Operation, Params, Request};

/// Everything known about one call while it travels through the middleware chain.
///
/// Middlewares may rewrite the outgoing [`Request`] (headers in particular);
/// the operation and parameters are read-only once the context is built.
#[derive(Debug, Clone)]
pub struct RequestContext {
    operation: Operation,
    params: Params,
    request: Request,
}

impl RequestContext {
    /// Create a context for `operation` carrying the already-built `request`.
    #[must_use]
    pub fn new(operation: Operation, params: Params, request: Request) -> Self {
        Self {
            operation,
            params,
            request,
        }
    }

    /// Operation being called.
    #[must_use]
    pub const fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Endpoint (service) name.
    #[must_use]
    pub const fn endpoint(&self) -> &'static str {
        self.operation.endpoint()
    }

    /// Operation name within the endpoint.
    #[must_use]
    pub const fn operation_name(&self) -> &'static str {
        self.operation.name()
    }

    /// Call parameters.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Outgoing request.
    #[must_use]
    pub const fn request(&self) -> &Request {
        &self.request
    }

    /// Mutable access to the outgoing request.
    #[must_use]
    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    /// Drop the call metadata and keep the request for dispatch.
    #[must_use]
    pub fn into_request(self) -> Request {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;

    #[test]
    fn context_exposes_call_metadata() {
        let op = Operation::new("UserService", "delete", Method::Delete, "/users/id/{user_id}");
        let url = url::Url::parse("https://lsadf.example/api/v1/admin/users/id/42").expect("url");
        let mut ctx = RequestContext::new(
            op,
            Params::new().path("user_id", "42"),
            Request::builder(Method::Delete, url).build(),
        );

        ctx.request_mut()
            .headers_mut()
            .insert("X-Trace".to_string(), "1".to_string());

        assert_eq!(ctx.endpoint(), "UserService");
        assert_eq!(ctx.operation_name(), "delete");
        assert_eq!(ctx.params().path_value("user_id"), Some("42"));
        assert_eq!(ctx.into_request().header("X-Trace"), Some("1"));
    }
}
