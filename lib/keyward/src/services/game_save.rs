//! Game save administration.

use serde::{Deserialize, Serialize};

use super::{ORDER_BY, Timestamp};
use crate::{AdminClient, Method, Operation, Params, Result};

/// Combat characteristics of a game save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristics {
    /// Attack points.
    pub attack: i64,
    /// Critical hit chance.
    pub crit_chance: i64,
    /// Critical hit damage.
    pub crit_damage: i64,
    /// Health points.
    pub health: i64,
    /// Damage resistance.
    pub resistance: i64,
}

/// Currency balances of a game save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// Gold balance.
    pub gold: i64,
    /// Diamond balance.
    pub diamond: i64,
    /// Emerald balance.
    pub emerald: i64,
    /// Amethyst balance.
    pub amethyst: i64,
}

/// Stage progression of a game save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Stage being played.
    pub current_stage: i64,
    /// Highest stage reached.
    pub max_stage: i64,
}

/// A player's game save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSave {
    /// Game save id (UUID).
    pub id: String,
    /// Owner's email.
    pub user_email: String,
    /// Displayed player name.
    pub nickname: String,
    /// Creation date.
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    /// Last update date.
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    /// Combat characteristics.
    pub characteristics: Characteristics,
    /// Currency balances.
    pub currency: Currency,
    /// Stage progression.
    pub stage: Stage,
}

/// Body of [`GameSaveService::create`].
///
/// Without `id` the backend generates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSaveCreationRequest {
    /// Game save id (UUID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Owner's email.
    pub user_email: String,
    /// Displayed player name.
    pub nickname: String,
    /// Combat characteristics.
    pub characteristics: Characteristics,
    /// Currency balances.
    pub currency: Currency,
    /// Stage progression.
    pub stage: Stage,
}

/// Body of [`GameSaveService::update`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSaveUpdateRequest {
    /// Displayed player name.
    pub nickname: String,
    /// Combat characteristics.
    pub characteristics: Characteristics,
    /// Currency balances.
    pub currency: Currency,
    /// Stage progression.
    pub stage: Stage,
}

/// Admin operations on game saves.
#[derive(Debug, Clone)]
pub struct GameSaveService {
    client: AdminClient,
}

impl GameSaveService {
    /// `GET /game_saves`
    pub const FIND_ALL: Operation =
        Operation::new("GameSaveService", "findAll", Method::Get, "/game_saves");
    /// `GET /game_saves/id/{game_save_id}`
    pub const FIND_BY_ID: Operation = Operation::new(
        "GameSaveService",
        "findById",
        Method::Get,
        "/game_saves/id/{game_save_id}",
    );
    /// `GET /game_saves/user/{username}`
    pub const FIND_BY_USER: Operation = Operation::new(
        "GameSaveService",
        "findByUser",
        Method::Get,
        "/game_saves/user/{username}",
    );
    /// `POST /game_saves`
    pub const CREATE: Operation =
        Operation::new("GameSaveService", "create", Method::Post, "/game_saves");
    /// `POST /game_saves/id/{game_save_id}`
    pub const UPDATE: Operation = Operation::new(
        "GameSaveService",
        "update",
        Method::Post,
        "/game_saves/id/{game_save_id}",
    );
    /// `DELETE /game_saves/id/{game_save_id}`
    pub const DELETE: Operation = Operation::new(
        "GameSaveService",
        "delete",
        Method::Delete,
        "/game_saves/id/{game_save_id}",
    );

    /// Create the service.
    #[must_use]
    pub const fn new(client: AdminClient) -> Self {
        Self { client }
    }

    /// All game saves, sorted by the given fields.
    pub async fn find_all(&self, order_by: &[&str]) -> Result<Vec<GameSave>> {
        let params = Params::new().query_all(ORDER_BY, order_by.iter().copied());
        self.client.call_json(&Self::FIND_ALL, params).await
    }

    /// A game save by id.
    pub async fn find_by_id(&self, game_save_id: &str) -> Result<GameSave> {
        let params = Params::new().path("game_save_id", game_save_id);
        self.client.call_json(&Self::FIND_BY_ID, params).await
    }

    /// The game saves of a user, by username (email).
    pub async fn find_by_user(&self, username: &str) -> Result<Vec<GameSave>> {
        let params = Params::new().path("username", username);
        self.client.call_json(&Self::FIND_BY_USER, params).await
    }

    /// Create a game save.
    pub async fn create(&self, request: &GameSaveCreationRequest) -> Result<GameSave> {
        let params = Params::new().body(request)?;
        self.client.call_json(&Self::CREATE, params).await
    }

    /// Overwrite a game save.
    pub async fn update(
        &self,
        game_save_id: &str,
        request: &GameSaveUpdateRequest,
    ) -> Result<GameSave> {
        let params = Params::new()
            .path("game_save_id", game_save_id)
            .body(request)?;
        self.client.call_json(&Self::UPDATE, params).await
    }

    /// Delete a game save.
    pub async fn delete(&self, game_save_id: &str) -> Result<()> {
        let params = Params::new().path("game_save_id", game_save_id);
        self.client.call_unit(&Self::DELETE, params).await
    }
}
