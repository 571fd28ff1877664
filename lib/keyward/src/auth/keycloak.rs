//! OpenID Connect client for a Keycloak realm.
//!
//! Token and logout calls go straight to the transport, not through the
//! admin pipeline, so credentials never reach the logging middleware.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::{Credentials, IdentityProvider, TokenResponse};
use crate::{Error, HttpClient, HyperTransport, IdentityConfig, Method, Request, Response, Result};

/// OAuth error body (RFC 6749 section 5.2).
#[derive(Debug, Deserialize)]
struct OAuthError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Form body of a token request.
#[derive(Serialize)]
struct TokenForm<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_uri: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<&'a str>,
}

/// Form body of a logout request.
#[derive(Serialize)]
struct LogoutForm<'a> {
    client_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<&'a str>,
    refresh_token: &'a str,
}

/// [`IdentityProvider`] for a Keycloak realm.
#[derive(Debug, Clone)]
pub struct KeycloakProvider<C = HyperTransport> {
    transport: C,
    config: IdentityConfig,
}

impl KeycloakProvider<HyperTransport> {
    /// Create a provider with a default transport.
    #[must_use]
    pub fn new(config: IdentityConfig) -> Self {
        Self::with_transport(config, HyperTransport::default())
    }
}

impl<C> KeycloakProvider<C> {
    /// Create a provider sending its requests over `transport`.
    #[must_use]
    pub fn with_transport(config: IdentityConfig, transport: C) -> Self {
        Self { transport, config }
    }

    /// Provider configuration.
    #[must_use]
    pub const fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// Token endpoint URL.
    pub fn token_endpoint(&self) -> Result<Url> {
        Ok(Url::parse(&format!("{}/token", self.config.realm_root()))?)
    }

    /// Logout endpoint URL.
    pub fn logout_endpoint(&self) -> Result<Url> {
        Ok(Url::parse(&format!("{}/logout", self.config.realm_root()))?)
    }

    /// Where to send the browser to start an interactive login.
    ///
    /// After login the provider redirects to the configured redirect URI with
    /// `code` and `state` query parameters; pass the code to
    /// [`Credentials::authorization_code`].
    pub fn authorization_url(&self, state: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/auth", self.config.realm_root()))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scope)
            .append_pair("state", state);
        Ok(url)
    }

    fn grant<'a>(&'a self, grant_type: &'a str) -> TokenForm<'a> {
        TokenForm {
            grant_type,
            client_id: &self.config.client_id,
            client_secret: self.config.client_secret.as_deref(),
            username: None,
            password: None,
            code: None,
            redirect_uri: None,
            refresh_token: None,
            scope: None,
        }
    }
}

impl<C: HttpClient> KeycloakProvider<C> {
    async fn post_form<T: Serialize>(&self, url: Url, form: &T) -> Result<Response> {
        let request = Request::builder(Method::Post, url)
            .header("Accept", "application/json")
            .form(form)?
            .build();

        let response = self.transport.execute(request).await?;
        if response.is_success() {
            return Ok(response);
        }

        let status = response.status();
        match response.json::<OAuthError>() {
            Ok(err) => {
                warn!(status, error = %err.error, "identity provider rejected the request");
                Err(Error::auth(err.error, err.error_description))
            }
            Err(_) => {
                warn!(status, "identity provider returned an unexpected error");
                Err(Error::http_with_body(
                    status,
                    "identity provider error",
                    response.into_body(),
                ))
            }
        }
    }

    async fn request_token(&self, form: TokenForm<'_>) -> Result<TokenResponse> {
        debug!(grant_type = form.grant_type, "requesting token");
        let response = self.post_form(self.token_endpoint()?, &form).await?;
        response.json()
    }
}

impl<C> IdentityProvider for KeycloakProvider<C>
where
    C: HttpClient + 'static,
{
    async fn login(&self, credentials: &Credentials) -> Result<TokenResponse> {
        let form = match credentials {
            Credentials::Password { username, password } => TokenForm {
                username: Some(username),
                password: Some(password),
                scope: Some(&self.config.scope),
                ..self.grant("password")
            },
            Credentials::AuthorizationCode { code } => TokenForm {
                code: Some(code),
                redirect_uri: Some(&self.config.redirect_uri),
                ..self.grant("authorization_code")
            },
        };
        self.request_token(form).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        let form = TokenForm {
            refresh_token: Some(refresh_token),
            ..self.grant("refresh_token")
        };
        self.request_token(form).await
    }

    async fn logout(&self, refresh_token: Option<&str>) -> Result<()> {
        let Some(refresh_token) = refresh_token else {
            debug!("no refresh token, nothing to end at the identity provider");
            return Ok(());
        };

        let form = LogoutForm {
            client_id: &self.config.client_id,
            client_secret: self.config.client_secret.as_deref(),
            refresh_token,
        };
        self.post_form(self.logout_endpoint()?, &form).await?;
        Ok(())
    }
}
