//! Backend-wide counters.

use serde::{Deserialize, Serialize};

use super::Timestamp;
use crate::{AdminClient, Method, Operation, Params, Result};

/// Overview figures shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalInfo {
    /// Server time of the snapshot.
    #[serde(default)]
    pub now: Option<Timestamp>,
    /// Number of game saves.
    #[serde(default)]
    pub game_save_counter: i64,
    /// Number of registered users.
    #[serde(default)]
    pub user_counter: i64,
}

/// Admin dashboard information.
#[derive(Debug, Clone)]
pub struct GlobalInfoService {
    client: AdminClient,
}

impl GlobalInfoService {
    /// `GET /global_info`
    pub const GET: Operation =
        Operation::new("GlobalInfoService", "getGlobalInfo", Method::Get, "/global_info");

    /// Create the service.
    #[must_use]
    pub const fn new(client: AdminClient) -> Self {
        Self { client }
    }

    /// Current counters.
    pub async fn get(&self) -> Result<GlobalInfo> {
        self.client.call_json(&Self::GET, Params::new()).await
    }
}
