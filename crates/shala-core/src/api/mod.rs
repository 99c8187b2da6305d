//! REST API client module for the marketplace backend.
//!
//! This module provides the `ApiClient` for JSON-over-HTTP calls. Requests
//! carry the in-memory bearer credential when one is held and the refresh
//! cookie always; an expired credential is renewed once per call.

pub mod client;
pub mod error;
pub mod request;

pub use client::ApiClient;
pub use error::{ApiError, FailureKind};
pub use request::ApiRequest;
