//! Identity provider capability.

use std::future::Future;

use super::{Credentials, TokenResponse};
use crate::Result;

/// Login, refresh and logout against an identity provider.
///
/// The provider's protocol is opaque to the rest of the crate; only these
/// three capabilities are used. [`KeycloakProvider`](super::KeycloakProvider)
/// is the production implementation; tests substitute their own.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Exchange credentials for tokens.
    fn login(&self, credentials: &Credentials)
    -> impl Future<Output = Result<TokenResponse>> + Send;

    /// Exchange a refresh token for fresh tokens.
    fn refresh(&self, refresh_token: &str) -> impl Future<Output = Result<TokenResponse>> + Send;

    /// End the session at the provider.
    ///
    /// Called with `None` when the session never received a refresh token.
    fn logout(&self, refresh_token: Option<&str>) -> impl Future<Output = Result<()>> + Send;
}
