//! Authentication module for credentials and session state.
//!
//! This module provides:
//! - `CredentialSlot`: the in-memory holder for the bearer token
//! - `AuthStore`: front-end mirror of who is logged in
//! - validation helpers for auth forms
//!
//! Nothing here touches disk; a new process always starts logged out.

pub mod credential;
pub mod store;
pub mod validation;

pub use credential::{AccessToken, CredentialSlot};
pub use store::{AuthError, AuthState, AuthStore};
pub use validation::ValidationError;
