//! API client for the marketplace backend.
//!
//! `ApiClient` sends JSON requests with the current bearer credential and,
//! when the backend reports the credential expired (401), renews it once via
//! the refresh cookie before giving up.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::auth::{AccessToken, CredentialSlot};
use crate::config::Config;
use crate::models::{
    Credentials, ForgotPasswordRequest, MessageResponse, ResetPasswordRequest, SuccessResponse,
    TokenResponse, User,
};

use super::error::truncate_body;
use super::{ApiError, ApiRequest};

// ============================================================================
// Constants
// ============================================================================

/// Endpoint that mints a new access token from the refresh cookie
const REFRESH_PATH: &str = "/auth/refresh";

/// Credential renewals allowed per logical call.
/// A 401 on the replayed request is final, so a call can never loop.
const MAX_RENEWALS_PER_CALL: u32 = 1;

type RenewalFuture = Shared<BoxFuture<'static, bool>>;

/// Authenticated API client.
/// Clone is cheap and clones share the connection pool, cookie jar,
/// credential slot and in-flight renewal.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    credential: CredentialSlot,
    renewal: Arc<Mutex<Option<RenewalFuture>>>,
}

impl ApiClient {
    /// Create a client bound to `credential`.
    ///
    /// The underlying HTTP client keeps an in-memory cookie store, which is
    /// what carries the backend's refresh cookie between calls.
    pub fn new(config: &Config, credential: CredentialSlot) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: Arc::from(config.base_url.as_str()),
            credential,
            renewal: Arc::new(Mutex::new(None)),
        })
    }

    /// Replace the held credential; `None` makes subsequent calls unauthenticated
    pub fn set_credential(&self, token: Option<AccessToken>) {
        self.credential.set(token);
    }

    pub fn credential(&self) -> &CredentialSlot {
        &self.credential
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn headers_for(&self, request: &ApiRequest) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        if let Some(token) = self.credential.get() {
            match HeaderValue::from_str(&token.bearer()) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(_) => warn!("Held credential is not a valid header value, sending without it"),
            }
        }
        for (name, value) in &request.headers {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }

    async fn send(&self, request: &ApiRequest) -> Result<reqwest::Response, ApiError> {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url_for(&request.path))
            .headers(self.headers_for(request));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.body(body.to_string());
        }

        Ok(builder.send().await?)
    }

    /// Perform one logical call.
    ///
    /// States: send the request; on 2xx decode the body; on 401 (renewal
    /// allowed, budget left) renew the credential and send again; anything
    /// else fails with the backend's error payload. Transport errors are
    /// returned as `ApiError::Network` without any retry.
    pub async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let mut renewals = 0;

        loop {
            let response = self.send(&request).await?;
            let status = response.status();

            if status.is_success() {
                return Self::decode(response, &request).await;
            }

            let body = response.text().await.unwrap_or_default();
            debug!(
                method = %request.method,
                path = %request.path,
                status = status.as_u16(),
                body = %truncate_body(&body),
                "Request failed"
            );
            let failure = ApiError::from_status(status, &body);

            if status == StatusCode::UNAUTHORIZED
                && request.allow_renewal
                && renewals < MAX_RENEWALS_PER_CALL
            {
                renewals += 1;
                if self.renew().await {
                    debug!(path = %request.path, "Replaying request with renewed credential");
                    continue;
                }
            }

            return Err(failure);
        }
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        request: &ApiRequest,
    ) -> Result<T, ApiError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ApiError::Decode(format!(
                "Failed to parse JSON response from {} {}: {}",
                request.method, request.path, e
            ))
        })
    }

    /// Renew the access token using the refresh cookie.
    ///
    /// Callers arriving while a renewal is already running wait for that one
    /// instead of starting their own. Never fails; the outcome is the bool.
    pub async fn refresh(&self) -> bool {
        self.renew().await
    }

    async fn renew(&self) -> bool {
        let renewal = {
            let mut in_flight = self.renewal.lock().unwrap_or_else(PoisonError::into_inner);
            match in_flight.as_ref() {
                Some(existing) => {
                    debug!("Joining in-flight credential renewal");
                    existing.clone()
                }
                None => {
                    let fresh = refresh_credential(
                        self.client.clone(),
                        self.url_for(REFRESH_PATH),
                        self.credential.clone(),
                    )
                    .boxed()
                    .shared();
                    *in_flight = Some(fresh.clone());
                    fresh
                }
            }
        };

        let renewed = renewal.clone().await;

        let mut in_flight = self.renewal.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight
            .as_ref()
            .is_some_and(|current| current.ptr_eq(&renewal))
        {
            *in_flight = None;
        }

        renewed
    }

    // ===== Auth Endpoints =====

    pub async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        self.call(ApiRequest::post("/auth/login").json(credentials)?.without_renewal())
            .await
    }

    pub async fn signup(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        self.call(ApiRequest::post("/auth/register").json(credentials)?.without_renewal())
            .await
    }

    pub async fn logout(&self) -> Result<SuccessResponse, ApiError> {
        self.call(ApiRequest::post("/auth/logout")).await
    }

    /// Fetch the authenticated user
    pub async fn me(&self) -> Result<User, ApiError> {
        self.call(ApiRequest::get("/me")).await
    }

    pub async fn verify_email(&self, token: &str) -> Result<MessageResponse, ApiError> {
        self.call(ApiRequest::get("/auth/verify-email").query("token", token))
            .await
    }

    pub async fn resend_verification(&self) -> Result<MessageResponse, ApiError> {
        self.call(ApiRequest::post("/auth/resend-verification"))
            .await
    }

    pub async fn forgot_password(
        &self,
        body: &ForgotPasswordRequest,
    ) -> Result<SuccessResponse, ApiError> {
        self.call(ApiRequest::post("/auth/forgot-password").json(body)?.without_renewal())
            .await
    }

    pub async fn reset_password(
        &self,
        body: &ResetPasswordRequest,
    ) -> Result<SuccessResponse, ApiError> {
        self.call(ApiRequest::post("/auth/reset-password").json(body)?.without_renewal())
            .await
    }
}

/// Cookie-bearing `POST /auth/refresh` with no body.
/// Any failure clears the slot so a dead token is not sent again.
async fn refresh_credential(client: Client, url: String, credential: CredentialSlot) -> bool {
    let response = match client.post(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Credential renewal request failed");
            credential.clear();
            return false;
        }
    };

    let status = response.status();
    if !status.is_success() {
        warn!(status = status.as_u16(), "Credential renewal rejected");
        credential.clear();
        return false;
    }

    match response.json::<TokenResponse>().await {
        Ok(tokens) => {
            credential.set(Some(AccessToken::new(tokens.access_token)));
            info!("Access token renewed");
            true
        }
        Err(e) => {
            warn!(error = %e, "Failed to parse renewal response");
            credential.clear();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        let config = Config::new("http://localhost:4000/").unwrap();
        ApiClient::new(&config, CredentialSlot::new()).unwrap()
    }

    #[test]
    fn test_url_for_joins_base_and_path() {
        let api = client();
        assert_eq!(api.base_url(), "http://localhost:4000");
        assert_eq!(api.url_for("/auth/refresh"), "http://localhost:4000/auth/refresh");
    }

    #[test]
    fn test_headers_without_credential() {
        let api = client();
        let headers = api.headers_for(&ApiRequest::get("/me"));
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert!(!headers.contains_key(header::AUTHORIZATION));
    }

    #[test]
    fn test_headers_with_credential() {
        let api = client();
        api.set_credential(Some("tok-1".into()));
        let headers = api.headers_for(&ApiRequest::get("/me"));
        assert_eq!(headers[header::AUTHORIZATION], "Bearer tok-1");

        api.set_credential(None);
        let headers = api.headers_for(&ApiRequest::get("/me"));
        assert!(!headers.contains_key(header::AUTHORIZATION));
    }

    #[test]
    fn test_caller_headers_override_defaults() {
        let api = client();
        api.set_credential(Some("tok-1".into()));
        let request = ApiRequest::post("/upload")
            .header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .header(header::AUTHORIZATION, HeaderValue::from_static("Bearer other"));
        let headers = api.headers_for(&request);
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(headers[header::AUTHORIZATION], "Bearer other");
    }

    #[test]
    fn test_clones_share_credential() {
        let api = client();
        let other = api.clone();
        api.set_credential(Some("shared".into()));
        assert_eq!(other.credential().get().unwrap().as_str(), "shared");
    }
}
