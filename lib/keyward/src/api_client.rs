//! Admin API client.
//!
//! [`AdminClient`] turns an [`Operation`] and its [`Params`] into a
//! [`RequestContext`] and runs it through a [`Pipeline`].

use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::TokenSource;
use crate::{
    ApiResponse, ClientConfig, Error, HyperTransport, Operation, Params, Pipeline, Request,
    RequestContext, Response, Result, StatusCode,
};

/// Client for the backend admin API.
///
/// # Example
///
/// ```ignore
/// use keyward::{AdminClient, ClientConfig};
/// use keyward::services::GameSaveService;
///
/// let client = AdminClient::with_config(&ClientConfig::default(), tokens.clone())?;
/// let saves = GameSaveService::new(client).find_all(&["nickname"]).await?;
/// ```
#[derive(Debug, Clone)]
pub struct AdminClient {
    pipeline: Pipeline,
    api_root: String,
}

impl AdminClient {
    /// Create a client sending calls through `pipeline` to `api_root`
    /// (base URL plus prefix, e.g. `http://localhost:8080/api/v1/admin`).
    ///
    /// # Errors
    ///
    /// Returns an error if `api_root` is not an absolute URL.
    pub fn new(pipeline: Pipeline, api_root: impl AsRef<str>) -> Result<Self> {
        let api_root = api_root.as_ref().trim_end_matches('/');
        Url::parse(api_root)?;
        Ok(Self {
            pipeline,
            api_root: api_root.to_string(),
        })
    }

    /// Create a client with the default chain (logging, then bearer auth
    /// from `tokens`) over a [`HyperTransport`] built from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL is invalid.
    pub fn with_config(config: &ClientConfig, tokens: impl TokenSource + 'static) -> Result<Self> {
        let pipeline = Pipeline::builder()
            .with_defaults(tokens)
            .build(HyperTransport::new(config));
        Self::new(pipeline, config.api_root())
    }

    /// Base URL plus prefix, without a trailing slash.
    #[must_use]
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// The middleware chain.
    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run `operation` and return the raw response.
    ///
    /// # Errors
    ///
    /// [`Error::Http`] for non-2xx statuses (the body is kept), transport
    /// errors as they come back from the chain, or [`Error::InvalidRequest`]
    /// when a path parameter is missing.
    pub async fn call(&self, operation: &Operation, params: Params) -> Result<Response> {
        let ctx = self.context(operation, params)?;
        let response = self.pipeline.call(ctx).await?;

        if response.is_success() {
            return Ok(response);
        }

        let status = response.status();
        let reason = StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("unexpected status");
        Err(Error::http_with_body(status, reason, response.into_body()))
    }

    /// Run `operation` and decode the `data` field of the response envelope.
    ///
    /// # Errors
    ///
    /// Same as [`call`](Self::call), plus [`Error::JsonDeserialization`] with
    /// the JSON path when the body does not match `T`.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        operation: &Operation,
        params: Params,
    ) -> Result<T> {
        let response = self.call(operation, params).await?;
        response.json::<ApiResponse<T>>()?.into_data()
    }

    /// Run `operation`, checking the status only.
    ///
    /// # Errors
    ///
    /// Same as [`call`](Self::call).
    pub async fn call_unit(&self, operation: &Operation, params: Params) -> Result<()> {
        self.call(operation, params).await.map(drop)
    }

    fn context(&self, operation: &Operation, params: Params) -> Result<RequestContext> {
        let path = operation.resolve_path(&params)?;
        let url = Url::parse(&format!("{}{path}", self.api_root))?;

        let mut builder = Request::builder(operation.method(), url)
            .header("Accept", "application/json")
            .query_pairs(params.query_pairs());
        if let Some(body) = params.json_body() {
            builder = builder.json(body)?;
        }

        Ok(RequestContext::new(*operation, params, builder.build()))
    }
}
