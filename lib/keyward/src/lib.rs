//! Authenticated client for the LSADF admin API.
//!
//! Operators authenticate against a Keycloak realm; the resulting session is
//! owned by a [`TokenProvider`](auth::TokenProvider) that refreshes it in the
//! background. Every admin call goes through an ordered tower [`Pipeline`]
//! (logging, then bearer token injection) before reaching the transport.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//!
//! use keyward::auth::{Credentials, KeycloakProvider, TokenProvider};
//! use keyward::services::GameSaveService;
//! use keyward::{AdminClient, ClientConfig, IdentityConfig};
//!
//! let tokens = TokenProvider::new(KeycloakProvider::new(IdentityConfig::default()));
//! tokens
//!     .authenticate(&Credentials::password("admin@lsadf.com", "secret"))
//!     .await?;
//! let _refresh = tokens.schedule_refresh(Duration::from_secs(60), Duration::from_secs(70));
//!
//! let client = AdminClient::with_config(&ClientConfig::default(), tokens.clone())?;
//! let saves = GameSaveService::new(client).find_all(&["nickname"]).await?;
//! ```

mod api_client;
pub mod auth;
mod config;
pub mod middleware;
mod pipeline;
pub mod prelude;
pub mod services;
mod transport;

pub use api_client::AdminClient;
pub use config::{
    ClientConfig, ClientConfigBuilder, DEFAULT_API_PREFIX, DEFAULT_SCOPE, IdentityConfig,
    IdentityConfigBuilder,
};
pub use pipeline::{BoxedService, Pipeline, PipelineBuilder, ServiceFuture};
pub use transport::HyperTransport;

// Re-export tower for custom middlewares
pub use tower;

// Re-export core types
pub use keyward_core::{
    ApiResponse, ContentType, Error, HttpClient, Method, Operation, Params, Request,
    RequestBuilder, RequestContext, Response, Result, from_json, to_form, to_json,
};

// Re-export http types for status codes and headers
pub use keyward_core::{StatusCode, header};
