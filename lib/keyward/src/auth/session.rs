//! Session token, token endpoint payloads and login credentials.

use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;

/// Token endpoint response (RFC 6749 section 5.1, with Keycloak's refresh expiry).
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer access token.
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// Refresh token, if the grant issued one.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Refresh token lifetime in seconds.
    #[serde(default)]
    pub refresh_expires_in: Option<u64>,
    /// Token type, normally `Bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
    /// Granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"***")
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("refresh_expires_in", &self.refresh_expires_in)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .finish()
    }
}

/// How an operator proves who they are.
#[derive(Clone)]
pub enum Credentials {
    /// Resource owner password grant.
    Password {
        /// Operator username (an email address).
        username: String,
        /// Operator password.
        password: String,
    },
    /// Authorization code returned to the redirect URI after a browser login.
    AuthorizationCode {
        /// The `code` query parameter.
        code: String,
    },
}

impl Credentials {
    /// Password credentials.
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Password {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Authorization code credentials.
    pub fn authorization_code(code: impl Into<String>) -> Self {
        Self::AuthorizationCode { code: code.into() }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::AuthorizationCode { .. } => f
                .debug_struct("AuthorizationCode")
                .field("code", &"***")
                .finish(),
        }
    }
}

/// The live session token of an authenticated operator.
#[derive(Clone)]
pub struct Session {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Instant,
    refresh_expires_at: Option<Instant>,
    generation: u64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("expires_at", &self.expires_at)
            .field("refresh_expires_at", &self.refresh_expires_at)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build a session from a token response received at `now`.
    #[must_use]
    pub fn from_response(response: TokenResponse, now: Instant, generation: u64) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: now + Duration::from_secs(response.expires_in),
            refresh_expires_at: response
                .refresh_expires_in
                .map(|secs| now + Duration::from_secs(secs)),
            generation,
        }
    }

    /// Replace the tokens after a refresh, keeping the session identity.
    ///
    /// A refresh response without a refresh token keeps the previous one.
    #[must_use]
    pub fn refreshed(self, response: TokenResponse, now: Instant) -> Self {
        let refresh_token = response.refresh_token.clone().or(self.refresh_token);
        Self {
            refresh_token,
            ..Self::from_response(response, now, self.generation)
        }
    }

    /// Bearer access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Refresh token, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Identifies one authentication; kept across refreshes.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Time left before the access token expires (zero once expired).
    #[must_use]
    pub fn remaining_validity(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }

    /// Whether the access token has expired.
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Whether a refresh can still succeed as far as the client can tell.
    #[must_use]
    pub fn can_refresh(&self, now: Instant) -> bool {
        self.refresh_token.is_some() && self.refresh_expires_at.is_none_or(|at| now < at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(access: &str, refresh: Option<&str>) -> TokenResponse {
        TokenResponse {
            access_token: access.to_string(),
            expires_in: 300,
            refresh_token: refresh.map(str::to_string),
            refresh_expires_in: Some(1800),
            token_type: Some("Bearer".to_string()),
            scope: None,
        }
    }

    #[test]
    fn remaining_validity_saturates() {
        let now = Instant::now();
        let session = Session::from_response(response("a1", Some("r1")), now, 1);

        assert_eq!(session.remaining_validity(now), Duration::from_secs(300));
        assert_eq!(
            session.remaining_validity(now + Duration::from_secs(400)),
            Duration::ZERO
        );
        assert!(session.is_expired(now + Duration::from_secs(300)));
        assert!(session.can_refresh(now));
        assert!(!session.can_refresh(now + Duration::from_secs(1800)));
    }

    #[test]
    fn refreshed_keeps_generation_and_old_refresh_token() {
        let now = Instant::now();
        let session = Session::from_response(response("a1", Some("r1")), now, 7);
        let later = now + Duration::from_secs(100);

        let refreshed = session.refreshed(response("a2", None), later);

        assert_eq!(refreshed.access_token(), "a2");
        assert_eq!(refreshed.refresh_token(), Some("r1"));
        assert_eq!(refreshed.generation(), 7);
        assert_eq!(refreshed.remaining_validity(later), Duration::from_secs(300));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let now = Instant::now();
        let session = Session::from_response(response("a1", Some("r1")), now, 1);
        let creds = Credentials::password("toto@toto.com", "hunter2");

        assert!(!format!("{session:?}").contains("a1"));
        assert!(!format!("{:?}", response("a1", Some("r1"))).contains("r1"));
        let creds = format!("{creds:?}");
        assert!(creds.contains("toto@toto.com"));
        assert!(!creds.contains("hunter2"));
    }

    #[test]
    fn token_response_decodes_keycloak_payload() {
        let json = br#"{"access_token":"eyJ","expires_in":300,"refresh_expires_in":1800,
            "refresh_token":"eyR","token_type":"Bearer","not-before-policy":0,
            "session_state":"abc","scope":"openid profile"}"#;
        let token: TokenResponse = keyward_core::from_json(json).expect("decode");
        assert_eq!(token.access_token, "eyJ");
        assert_eq!(token.refresh_token.as_deref(), Some("eyR"));
    }
}
