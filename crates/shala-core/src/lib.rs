//! Core library for the shala booking marketplace client.
//!
//! - [`api`]: authenticated JSON client with one-shot credential renewal
//! - [`auth`]: credential slot, auth state container, form validation
//! - [`config`]: base URL and timeout from the environment
//! - [`models`]: wire types for the auth endpoints

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, ApiRequest};
pub use auth::{AccessToken, AuthStore, CredentialSlot};
pub use config::Config;
