//! Static operation descriptors and per-call parameters.
//!
//! An [`Operation`] names one backend call: the service (endpoint) it belongs
//! to, the operation name, the HTTP method and a path template such as
//! `/game_saves/id/{game_save_id}`. [`Params`] carries the values for one call.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Serialize;

use crate::{Error, Method, Result};

/// Characters escaped when substituting a value into a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Descriptor of a single backend operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    endpoint: &'static str,
    name: &'static str,
    method: Method,
    path: &'static str,
}

impl Operation {
    /// Create a new operation descriptor.
    #[must_use]
    pub const fn new(
        endpoint: &'static str,
        name: &'static str,
        method: Method,
        path: &'static str,
    ) -> Self {
        Self {
            endpoint,
            name,
            method,
            path,
        }
    }

    /// Service the operation belongs to, e.g. `GameSaveService`.
    #[must_use]
    pub const fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    /// Operation name, e.g. `findAll`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Path template relative to the API prefix.
    #[must_use]
    pub const fn path_template(&self) -> &'static str {
        self.path
    }

    /// Substitute `{name}` placeholders with the matching path parameters.
    ///
    /// Values are percent-encoded as path segments. A placeholder without a
    /// value, or with an empty, `.` or `..` value, is an
    /// [`Error::InvalidRequest`]: URL parsing would collapse those segments.
    pub fn resolve_path(&self, params: &Params) -> Result<String> {
        let mut resolved = String::with_capacity(self.path.len());
        let mut rest = self.path;

        while let Some(start) = rest.find('{') {
            let (head, tail) = rest.split_at(start);
            resolved.push_str(head);

            let end = tail.find('}').ok_or_else(|| {
                Error::invalid_request(format!("unclosed placeholder in '{}'", self.path))
            })?;
            let name = tail.get(1..end).unwrap_or_default();
            let value = params.path_value(name).ok_or_else(|| {
                Error::invalid_request(format!(
                    "missing path parameter '{name}' for {} {}",
                    self.endpoint, self.name
                ))
            })?;
            if matches!(value, "" | "." | "..") {
                return Err(Error::invalid_request(format!(
                    "path parameter '{name}' cannot be '{value}' for {} {}",
                    self.endpoint, self.name
                )));
            }
            resolved.extend(utf8_percent_encode(value, PATH_SEGMENT));

            rest = tail.get(end + 1..).unwrap_or_default();
        }
        resolved.push_str(rest);

        Ok(resolved)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.endpoint, self.name)
    }
}

/// Parameters of a single call: path values, query pairs and an optional JSON body.
///
/// `Display` renders the parameters as compact JSON, which is what the logging
/// middleware records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Params {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    path: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    query: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<serde_json::Value>,
}

impl Params {
    /// Empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path parameter.
    #[must_use]
    pub fn path(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path.push((name.into(), value.into()));
        self
    }

    /// Add a query parameter. Repeated names produce repeated pairs.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Add one query pair per value.
    #[must_use]
    pub fn query_all<I, V>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.query
            .extend(values.into_iter().map(|v| (name.to_string(), v.into())));
        self
    }

    /// Set the JSON body.
    pub fn body<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Value of a path parameter.
    #[must_use]
    pub fn path_value(&self, name: &str) -> Option<&str> {
        self.path
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Query pairs in insertion order.
    pub fn query_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// JSON body, if any.
    #[must_use]
    pub const fn json_body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

impl std::fmt::Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}
