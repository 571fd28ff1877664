//! Client and identity provider configuration.

use std::time::Duration;

/// Path prefix of every admin endpoint on the backend.
pub const DEFAULT_API_PREFIX: &str = "/api/v1/admin";

/// Scopes requested from the identity provider.
pub const DEFAULT_SCOPE: &str = "openid profile";

/// Configuration for the backend HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, e.g. `https://lsadf.example`.
    pub base_url: String,
    /// Path prefix prepended to every operation path.
    pub api_prefix: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// Connection timeout duration.
    pub connect_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_idle_per_host: usize,
    /// Idle connection timeout.
    pub pool_idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Base URL and prefix joined, without a trailing slash.
    #[must_use]
    pub fn api_root(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_prefix.trim_matches('/')
        )
        .trim_end_matches('/')
        .to_string()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    api_prefix: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    pool_idle_per_host: Option<usize>,
    pool_idle_timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Set the backend origin.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the API path prefix.
    #[must_use]
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = Some(prefix.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.pool_idle_per_host = Some(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            api_prefix: self.api_prefix.unwrap_or(defaults.api_prefix),
            timeout: self.timeout.unwrap_or(defaults.timeout),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            pool_idle_per_host: self
                .pool_idle_per_host
                .unwrap_or(defaults.pool_idle_per_host),
            pool_idle_timeout: self.pool_idle_timeout.unwrap_or(defaults.pool_idle_timeout),
        }
    }
}

/// Identity provider (Keycloak realm) settings.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Identity provider origin, e.g. `https://auth.lsadf.example`.
    pub url: String,
    /// Realm holding the operators.
    pub realm: String,
    /// OAuth client identifier.
    pub client_id: String,
    /// OAuth client secret, for confidential clients.
    pub client_secret: Option<String>,
    /// Where the provider sends the browser back after login.
    pub redirect_uri: String,
    /// Requested scopes, space separated.
    pub scope: String,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("url", &self.url)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .finish()
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8081".to_string(),
            realm: "lsadf".to_string(),
            client_id: "lsadf-admin".to_string(),
            client_secret: None,
            redirect_uri: "http://localhost:8080/".to_string(),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }
}

impl IdentityConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> IdentityConfigBuilder {
        IdentityConfigBuilder::default()
    }

    /// OpenID Connect endpoint root of the realm.
    #[must_use]
    pub fn realm_root(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect",
            self.url.trim_end_matches('/'),
            self.realm
        )
    }
}

/// Builder for [`IdentityConfig`].
#[derive(Debug, Clone, Default)]
pub struct IdentityConfigBuilder {
    url: Option<String>,
    realm: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
    scope: Option<String>,
}

impl IdentityConfigBuilder {
    /// Set the identity provider origin.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the realm.
    #[must_use]
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// Set the client identifier.
    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set the client secret.
    #[must_use]
    pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Set the post-login redirect URI.
    #[must_use]
    pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Set the requested scopes.
    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> IdentityConfig {
        let defaults = IdentityConfig::default();
        IdentityConfig {
            url: self.url.unwrap_or(defaults.url),
            realm: self.realm.unwrap_or(defaults.realm),
            client_id: self.client_id.unwrap_or(defaults.client_id),
            client_secret: self.client_secret.or(defaults.client_secret),
            redirect_uri: self.redirect_uri.unwrap_or(defaults.redirect_uri),
            scope: self.scope.unwrap_or(defaults.scope),
        }
    }
}
