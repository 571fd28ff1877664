//! Core types and traits for the keyward admin API client.
//!
//! This crate provides the wire-level building blocks shared by the client:
//! - [`Method`] - HTTP method enum
//! - [`Request`] and [`RequestBuilder`] - outgoing HTTP request
//! - [`Response`] - buffered HTTP response
//! - [`RequestContext`] - per-call value threaded through the middleware chain
//! - [`Operation`] and [`Params`] - static call descriptors and their arguments
//! - [`ApiResponse`] - the backend's JSON envelope
//! - [`Error`] and [`Result`] - error handling
//! - [`HttpClient`] - transport trait

mod body;
mod client;
mod context;
mod envelope;
mod error;
mod method;
mod operation;
pub mod prelude;
mod request;
mod response;

pub use body::{ContentType, from_json, to_form, to_json};
pub use client::HttpClient;
pub use context::RequestContext;
pub use envelope::ApiResponse;
pub use error::{Error, Result};
pub use method::Method;
pub use operation::{Operation, Params};
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
