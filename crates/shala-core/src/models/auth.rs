use serde::{Deserialize, Serialize};

/// Body for `POST /auth/login` and `POST /auth/register`
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Issued by login, register and refresh
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reset_password_body_is_camel_case() {
        let body = ResetPasswordRequest {
            token: "t".to_string(),
            new_password: "longenough".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"token": "t", "newPassword": "longenough"})
        );
    }

    #[test]
    fn test_token_response() {
        let parsed: TokenResponse = serde_json::from_str(r#"{"accessToken":"abc"}"#).unwrap();
        assert_eq!(parsed.access_token, "abc");
    }
}
