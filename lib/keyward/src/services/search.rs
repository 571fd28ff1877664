//! Filtered listing of users and game saves.

use serde::{Deserialize, Serialize};

use super::{GameSave, ORDER_BY, User};
use crate::{AdminClient, Method, Operation, Params, Result};

/// One equality criterion, e.g. `{"type": "nickname", "value": "toto"}`.
///
/// Users accept `id`, `first_name`, `last_name`, `username`, `user_email` and
/// `user_roles` (matches any role); game saves accept `id`, `user_email` and
/// `nickname`. The backend answers 400 for any other type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Field the criterion applies to.
    #[serde(rename = "type")]
    pub filter_type: String,
    /// Expected value.
    pub value: String,
}

impl Filter {
    /// Create a filter.
    pub fn new(filter_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            filter_type: filter_type.into(),
            value: value.into(),
        }
    }
}

/// Body of the search operations. All filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Criteria, combined with AND.
    pub filters: Vec<Filter>,
}

impl SearchRequest {
    /// A request with the given filters.
    #[must_use]
    pub fn new(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self {
            filters: filters.into_iter().collect(),
        }
    }
}

/// Admin search over users and game saves.
#[derive(Debug, Clone)]
pub struct SearchService {
    client: AdminClient,
}

impl SearchService {
    /// `POST /search/users`
    pub const SEARCH_USERS: Operation =
        Operation::new("SearchService", "searchUsers", Method::Post, "/search/users");
    /// `POST /search/game_saves`
    pub const SEARCH_GAME_SAVES: Operation = Operation::new(
        "SearchService",
        "searchGameSaves",
        Method::Post,
        "/search/game_saves",
    );

    /// Create the service.
    #[must_use]
    pub const fn new(client: AdminClient) -> Self {
        Self { client }
    }

    /// Users matching every filter of `request`, sorted by the given fields.
    pub async fn search_users(
        &self,
        request: &SearchRequest,
        order_by: &[&str],
    ) -> Result<Vec<User>> {
        let params = Params::new()
            .query_all(ORDER_BY, order_by.iter().copied())
            .body(request)?;
        self.client.call_json(&Self::SEARCH_USERS, params).await
    }

    /// Game saves matching every filter of `request`, sorted by the given fields.
    pub async fn search_game_saves(
        &self,
        request: &SearchRequest,
        order_by: &[&str],
    ) -> Result<Vec<GameSave>> {
        let params = Params::new()
            .query_all(ORDER_BY, order_by.iter().copied())
            .body(request)?;
        self.client.call_json(&Self::SEARCH_GAME_SAVES, params).await
    }
}
