//! Body serialization helpers.

use bytes::Bytes;

use crate::Result;

/// Content type of a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// `application/json`, used for every backend call.
    Json,
    /// `application/x-www-form-urlencoded`, used by the identity provider endpoints.
    FormUrlEncoded,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialize a value to JSON bytes.
///
/// # Example
///
/// ```
/// use keyward_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Nickname { nickname: String }
///
/// let bytes = to_json(&Nickname { nickname: "toto".to_string() }).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"nickname":"toto"}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Serialize a value to form URL-encoded bytes.
///
/// Fields set to `None` are skipped when the field carries
/// `#[serde(skip_serializing_if = "Option::is_none")]`.
pub fn to_form<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_html_form::to_string(value)
        .map(|s| Bytes::from(s.into_bytes()))
        .map_err(Into::into)
}

/// Deserialize JSON bytes, reporting the path of the offending field on failure.
///
/// # Example
///
/// ```
/// use keyward_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct Stage { current_stage: u64 }
///
/// let err = from_json::<Stage>(br#"{"current_stage":"one"}"#).expect_err("bad type");
/// assert!(err.to_string().contains("current_stage"));
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}
