//! Operator authentication and session token lifecycle.
//!
//! - [`IdentityProvider`] - login, refresh and logout against an identity provider
//! - [`KeycloakProvider`] - OpenID Connect implementation for a Keycloak realm
//! - [`TokenProvider`] - owns the current [`Session`] and keeps it fresh
//! - [`TokenSource`] - read-only view of the current token used by
//!   [`BearerAuthLayer`](crate::middleware::BearerAuthLayer)

mod identity;
mod keycloak;
mod provider;
mod session;

use std::sync::Arc;

pub use identity::IdentityProvider;
pub use keycloak::KeycloakProvider;
pub use provider::{AuthOutcome, LogoutReason, RefreshHandle, SessionEvent, TokenProvider};
pub use session::{Credentials, Session, TokenResponse};

/// Something that can tell which bearer token to send right now.
pub trait TokenSource: Send + Sync {
    /// The current access token, or `None` for an anonymous call.
    fn token(&self) -> Option<String>;
}

impl TokenSource for String {
    fn token(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl TokenSource for &'static str {
    fn token(&self) -> Option<String> {
        Some((*self).to_string())
    }
}

impl TokenSource for Option<String> {
    fn token(&self) -> Option<String> {
        self.clone()
    }
}

impl<T: TokenSource + ?Sized> TokenSource for Arc<T> {
    fn token(&self) -> Option<String> {
        (**self).token()
    }
}
