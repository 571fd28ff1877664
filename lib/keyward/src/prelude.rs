//! Prelude module for convenient imports.
//!
//! ```ignore
//! use keyward::prelude::*;
//! ```

pub use crate::auth::{Credentials, KeycloakProvider, SessionEvent, TokenProvider, TokenSource};
pub use crate::services::{
    CacheService, GameSaveService, GlobalInfoService, SearchService, UserService,
};
pub use crate::{
    AdminClient, ApiResponse, ClientConfig, Error, HttpClient, HyperTransport, IdentityConfig,
    Method, Operation, Params, Pipeline, RequestContext, Response, Result, StatusCode,
};
