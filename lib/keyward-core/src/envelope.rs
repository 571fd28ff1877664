//! The backend's JSON response envelope.

use serde::{Deserialize, Serialize};

/// Envelope wrapping every admin API payload: `{"status", "message", "data"}`.
///
/// `data` is absent for calls returning nothing (deletes, toggles).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// HTTP status echoed by the backend.
    pub status: Option<u16>,
    /// Human readable message.
    pub message: Option<String>,
    /// Payload.
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Take the payload, failing when the backend sent none.
    pub fn into_data(self) -> crate::Result<T> {
        self.data
            .ok_or_else(|| crate::Error::json_deserialization("data", "missing field `data`"))
    }
}
