use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// No response was received; the transport error is passed through as-is.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("Request failed with status {status}: {}", describe(.status, .body))]
    RequestFailed { status: StatusCode, body: Value },

    #[error("Invalid response: {0}")]
    Decode(String),
}

/// Coarse classification of a failed status, for callers that branch on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    RateLimited,
    Server,
    Client,
}

/// Maximum length for error response bodies in log lines
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Build a `RequestFailed` from a raw error body.
    /// Bodies that are not JSON degrade to an empty object.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let body = serde_json::from_str(body).unwrap_or_else(|_| Value::Object(Default::default()));
        ApiError::RequestFailed { status, body }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::RequestFailed { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            ApiError::Decode(_) => None,
        }
    }

    /// Backend-provided error payload, if any
    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiError::RequestFailed { body, .. } => Some(body),
            _ => None,
        }
    }

    /// The backend's `message` field, if present
    pub fn message(&self) -> Option<&str> {
        self.body()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
    }

    pub fn kind(&self) -> Option<FailureKind> {
        let status = match self {
            ApiError::RequestFailed { status, .. } => *status,
            _ => return None,
        };
        Some(match status.as_u16() {
            401 => FailureKind::Unauthorized,
            403 => FailureKind::Forbidden,
            404 => FailureKind::NotFound,
            409 => FailureKind::Conflict,
            429 => FailureKind::RateLimited,
            500..=599 => FailureKind::Server,
            _ => FailureKind::Client,
        })
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == Some(FailureKind::Unauthorized)
    }

    /// 403. What it means depends on the endpoint; on `GET /me` and the
    /// dashboards it signals an account whose email is not yet verified.
    pub fn is_forbidden(&self) -> bool {
        self.kind() == Some(FailureKind::Forbidden)
    }
}

/// Truncate a response body to avoid logging excessive data
pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        body.to_string()
    } else {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }
}

fn describe(status: &StatusCode, body: &Value) -> String {
    match body.get("message").and_then(Value::as_str) {
        Some(message) => message.to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_status_keeps_backend_fields() {
        let err = ApiError::from_status(
            StatusCode::FORBIDDEN,
            r#"{"message":"Email not verified","code":"EMAIL_UNVERIFIED"}"#,
        );
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(err.message(), Some("Email not verified"));
        assert_eq!(err.body().unwrap()["code"], "EMAIL_UNVERIFIED");
        assert!(err.is_forbidden());
        assert_eq!(
            err.to_string(),
            "Request failed with status 403 Forbidden: Email not verified"
        );
    }

    #[test]
    fn test_unparseable_body_becomes_empty_object() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(err.body(), Some(&json!({})));
        assert_eq!(err.message(), None);
        assert_eq!(err.kind(), Some(FailureKind::Server));
        assert_eq!(
            err.to_string(),
            "Request failed with status 502 Bad Gateway: Bad Gateway"
        );
    }

    #[test]
    fn test_kind_classification() {
        let kind = |code: u16| {
            ApiError::from_status(StatusCode::from_u16(code).unwrap(), "").kind()
        };
        assert_eq!(kind(400), Some(FailureKind::Client));
        assert_eq!(kind(401), Some(FailureKind::Unauthorized));
        assert_eq!(kind(404), Some(FailureKind::NotFound));
        assert_eq!(kind(409), Some(FailureKind::Conflict));
        assert_eq!(kind(429), Some(FailureKind::RateLimited));
        assert_eq!(kind(503), Some(FailureKind::Server));
        assert_eq!(ApiError::Decode("x".into()).kind(), None);
    }

    #[test]
    fn test_truncate_body() {
        let short = "short body";
        assert_eq!(truncate_body(short), short);

        let long = "é".repeat(400);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("(truncated, 800 total bytes)"));
    }
}
