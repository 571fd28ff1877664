//! User administration.

use serde::{Deserialize, Serialize};

use super::{ORDER_BY, Timestamp};
use crate::{AdminClient, Method, Operation, Params, Result};

/// A user account of the identity realm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User id (UUID).
    pub id: String,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Username (an email address).
    pub username: String,
    /// Whether the account can log in.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Whether the email was verified.
    #[serde(default)]
    pub email_verified: Option<bool>,
    /// Realm roles, e.g. `USER`, `ADMIN`.
    #[serde(default)]
    pub user_roles: Vec<String>,
    /// Account creation date.
    #[serde(default)]
    pub created_timestamp: Option<Timestamp>,
}

/// Body of [`UserService::create`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreationRequest {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Username (an email address).
    pub username: String,
    /// Initial password.
    pub password: String,
    /// Whether the account can log in.
    pub enabled: bool,
    /// Whether the email was verified.
    pub email_verified: bool,
    /// Realm roles, e.g. `USER`, `ADMIN`.
    pub user_roles: Vec<String>,
}

impl std::fmt::Debug for UserCreationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCreationRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("username", &self.username)
            .field("password", &"***")
            .field("enabled", &self.enabled)
            .field("email_verified", &self.email_verified)
            .field("user_roles", &self.user_roles)
            .finish()
    }
}

/// Body of [`UserService::update`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdateRequest {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Whether the account can log in.
    pub enabled: bool,
    /// Whether the email was verified.
    pub email_verified: bool,
    /// Realm roles, e.g. `USER`, `ADMIN`.
    pub user_roles: Vec<String>,
}

/// Admin operations on users.
#[derive(Debug, Clone)]
pub struct UserService {
    client: AdminClient,
}

impl UserService {
    /// `GET /users`
    pub const FIND_ALL: Operation = Operation::new("UserService", "findAll", Method::Get, "/users");
    /// `GET /users/id/{user_id}`
    pub const FIND_BY_ID: Operation =
        Operation::new("UserService", "findById", Method::Get, "/users/id/{user_id}");
    /// `GET /users/username/{username}`
    pub const FIND_BY_USERNAME: Operation = Operation::new(
        "UserService",
        "findByUsername",
        Method::Get,
        "/users/username/{username}",
    );
    /// `POST /users`
    pub const CREATE: Operation = Operation::new("UserService", "create", Method::Post, "/users");
    /// `POST /users/id/{user_id}`
    pub const UPDATE: Operation =
        Operation::new("UserService", "update", Method::Post, "/users/id/{user_id}");
    /// `DELETE /users/id/{user_id}`
    pub const DELETE: Operation =
        Operation::new("UserService", "delete", Method::Delete, "/users/id/{user_id}");

    /// Create the service.
    #[must_use]
    pub const fn new(client: AdminClient) -> Self {
        Self { client }
    }

    /// All users, sorted by the given fields.
    pub async fn find_all(&self, order_by: &[&str]) -> Result<Vec<User>> {
        let params = Params::new().query_all(ORDER_BY, order_by.iter().copied());
        self.client.call_json(&Self::FIND_ALL, params).await
    }

    /// A user by id.
    pub async fn find_by_id(&self, user_id: &str) -> Result<User> {
        let params = Params::new().path("user_id", user_id);
        self.client.call_json(&Self::FIND_BY_ID, params).await
    }

    /// A user by username (email).
    pub async fn find_by_username(&self, username: &str) -> Result<User> {
        let params = Params::new().path("username", username);
        self.client.call_json(&Self::FIND_BY_USERNAME, params).await
    }

    /// Create a user.
    pub async fn create(&self, request: &UserCreationRequest) -> Result<User> {
        let params = Params::new().body(request)?;
        self.client.call_json(&Self::CREATE, params).await
    }

    /// Update a user.
    pub async fn update(&self, user_id: &str, request: &UserUpdateRequest) -> Result<User> {
        let params = Params::new().path("user_id", user_id).body(request)?;
        self.client.call_json(&Self::UPDATE, params).await
    }

    /// Delete a user.
    pub async fn delete(&self, user_id: &str) -> Result<()> {
        let params = Params::new().path("user_id", user_id);
        self.client.call_unit(&Self::DELETE, params).await
    }
}
