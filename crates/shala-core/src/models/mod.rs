//! Wire models for the marketplace backend.
//!
//! - `User`, `Role`: the authenticated account as returned by `GET /me`
//! - Auth request bodies and the small acknowledgement responses

pub mod auth;
pub mod user;

pub use auth::{
    Credentials, ForgotPasswordRequest, MessageResponse, ResetPasswordRequest, SuccessResponse,
    TokenResponse,
};
pub use user::{Role, User};
