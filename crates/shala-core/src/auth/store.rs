//! Client-side mirror of authentication state.
//!
//! The backend (refresh cookie + `GET /me`) is the source of truth. The store
//! only remembers who the last successful check said we are, for routing and
//! display, and keeps the credential slot in step with it.

use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{Credentials, MessageResponse, SuccessResponse, User};

use super::validation::{self, ValidationError};
use super::AccessToken;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AuthError {
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            AuthError::Api(e) => Some(e),
            AuthError::Validation(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    /// True until the first bootstrap or auth action settles
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Clone)]
pub struct AuthStore {
    api: ApiClient,
    state: Arc<RwLock<AuthState>>,
}

impl AuthStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(AuthState::default())),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Snapshot of the current state
    pub fn state(&self) -> AuthState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state().user
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn set_user(&self, user: User) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = AuthState {
            user: Some(user),
            loading: false,
        };
    }

    pub fn clear_user(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = AuthState {
            user: None,
            loading: false,
        };
    }

    /// Resolve the current user on startup.
    ///
    /// With no credential held, the `/me` call answers 401 and the client
    /// renews through the refresh cookie. Any failure means logged out and
    /// drops both the user and the credential.
    pub async fn bootstrap(&self) -> Option<User> {
        match self.api.me().await {
            Ok(user) => {
                debug!(user_id = %user.id, "Session restored");
                self.set_user(user.clone());
                Some(user)
            }
            Err(e) => {
                debug!(error = %e, "No active session");
                self.api.set_credential(None);
                self.clear_user();
                None
            }
        }
    }

    /// Reload the current user from `GET /me`.
    ///
    /// A 401 that survives renewal means the session is gone and clears the
    /// user and credential; other failures leave the state as it was.
    pub async fn refresh_user(&self) -> Result<User, ApiError> {
        match self.api.me().await {
            Ok(user) => {
                self.set_user(user.clone());
                Ok(user)
            }
            Err(e) => {
                if e.is_unauthorized() {
                    self.api.set_credential(None);
                    self.clear_user();
                }
                Err(e)
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let credentials = validation::validate_login(email, password)?;
        let tokens = self.api.login(&credentials).await?;
        self.establish(&credentials, tokens.access_token).await
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let credentials = validation::validate_signup(email, password)?;
        let tokens = self.api.signup(&credentials).await?;
        self.establish(&credentials, tokens.access_token).await
    }

    async fn establish(&self, credentials: &Credentials, token: String) -> Result<User, AuthError> {
        self.api.set_credential(Some(AccessToken::new(token)));
        let user = match self.api.me().await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Signed in but could not load the user, dropping session");
                self.api.set_credential(None);
                self.clear_user();
                return Err(e.into());
            }
        };
        info!(email = %credentials.email, role = ?user.role, "Signed in");
        self.set_user(user.clone());
        Ok(user)
    }

    /// Best-effort backend logout; local state is cleared either way
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "Logout request failed, clearing local session anyway");
        }
        self.api.set_credential(None);
        self.clear_user();
    }

    pub async fn verify_email(&self, token: &str) -> Result<MessageResponse, AuthError> {
        let token = validation::validate_token(token)?;
        Ok(self.api.verify_email(&token).await?)
    }

    pub async fn resend_verification(&self) -> Result<MessageResponse, AuthError> {
        Ok(self.api.resend_verification().await?)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<SuccessResponse, AuthError> {
        let body = validation::validate_forgot_password(email)?;
        Ok(self.api.forgot_password(&body).await?)
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<SuccessResponse, AuthError> {
        let body = validation::validate_reset_password(token, new_password)?;
        Ok(self.api.reset_password(&body).await?)
    }
}
