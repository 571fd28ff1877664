//! Prelude module for convenient imports.
//!
//! ```ignore
//! use keyward_core::prelude::*;
//! ```

pub use crate::{
    ApiResponse, Error, HttpClient, Method, Operation, Params, Request, RequestContext, Response,
    Result, from_json, to_json,
};
