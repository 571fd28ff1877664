//! Typed admin services.
//!
//! Each service wraps an [`AdminClient`](crate::AdminClient) and exposes one
//! method per backend operation. The [`Operation`](crate::Operation)
//! descriptors are public constants so other layers can log or match on them.

mod cache;
mod game_save;
mod global_info;
mod search;
mod user;

use serde::{Deserialize, Serialize};

pub use cache::CacheService;
pub use game_save::{
    Characteristics, Currency, GameSave, GameSaveCreationRequest, GameSaveService,
    GameSaveUpdateRequest, Stage,
};
pub use global_info::{GlobalInfo, GlobalInfoService};
pub use search::{Filter, SearchRequest, SearchService};
pub use user::{User, UserCreationRequest, UserService, UserUpdateRequest};

/// Query parameter used for sorting list operations.
pub const ORDER_BY: &str = "order_by";

/// A date as sent by the backend: epoch milliseconds or a formatted string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// Formatted date, e.g. `2022-01-01 00:00:00.000`.
    Text(String),
}
