//! Transport trait.

use std::future::Future;

use crate::{Request, Response, Result};

/// Sends a fully built [`Request`] over the network.
///
/// This is the innermost step of the middleware chain and the channel the
/// identity provider client uses for its token endpoints.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the buffered response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the response cannot be read:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    ///
    /// Non-2xx statuses are *not* errors at this level.
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}
