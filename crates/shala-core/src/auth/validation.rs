//! Client-side input checks run before any auth request is sent.

use thiserror::Error;

use crate::models::{Credentials, ForgotPasswordRequest, ResetPasswordRequest};

/// Minimum password length accepted at signup
const SIGNUP_PASSWORD_MIN_LEN: usize = 6;

/// Minimum password length accepted when resetting a password
const RESET_PASSWORD_MIN_LEN: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Loose structural email check: one `@`, a non-empty local part, and a
/// dotted domain with no empty labels.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }
    domain.split('.').all(|label| !label.is_empty())
}

fn check_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    if is_valid_email(email) {
        Ok(email.to_string())
    } else {
        Err(ValidationError::new("email", "Invalid email address"))
    }
}

fn check_min_len(
    field: &'static str,
    value: &str,
    min: usize,
    label: &str,
) -> Result<(), ValidationError> {
    if value.chars().count() < min {
        return Err(ValidationError::new(
            field,
            format!("{} must be at least {} characters", label, min),
        ));
    }
    Ok(())
}

pub fn validate_login(email: &str, password: &str) -> Result<Credentials, ValidationError> {
    let email = check_email(email)?;
    if password.is_empty() {
        return Err(ValidationError::new("password", "Password is required"));
    }
    Ok(Credentials {
        email,
        password: password.to_string(),
    })
}

pub fn validate_signup(email: &str, password: &str) -> Result<Credentials, ValidationError> {
    let email = check_email(email)?;
    check_min_len("password", password, SIGNUP_PASSWORD_MIN_LEN, "Password")?;
    Ok(Credentials {
        email,
        password: password.to_string(),
    })
}

pub fn validate_forgot_password(email: &str) -> Result<ForgotPasswordRequest, ValidationError> {
    Ok(ForgotPasswordRequest {
        email: check_email(email)?,
    })
}

/// One-time tokens from verification and reset links
pub fn validate_token(token: &str) -> Result<String, ValidationError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ValidationError::new("token", "Invalid token"));
    }
    Ok(token.to_string())
}

pub fn validate_reset_password(
    token: &str,
    new_password: &str,
) -> Result<ResetPasswordRequest, ValidationError> {
    let token = validate_token(token)?;
    check_min_len("newPassword", new_password, RESET_PASSWORD_MIN_LEN, "Password")?;
    Ok(ResetPasswordRequest {
        token,
        new_password: new_password.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("asha@example.com"));
        assert!(is_valid_email("a.b+tag@mail.example.co.in"));

        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("asha@localhost"));
        assert!(!is_valid_email("asha@example..com"));
        assert!(!is_valid_email("asha@@example.com"));
        assert!(!is_valid_email("asha @example.com"));
    }

    #[test]
    fn test_login_rules() {
        let creds = validate_login("  asha@example.com ", "x").unwrap();
        assert_eq!(creds.email, "asha@example.com");

        let err = validate_login("asha@example.com", "").unwrap_err();
        assert_eq!(err.field, "password");
        assert_eq!(err.message, "Password is required");

        let err = validate_login("asha", "secret").unwrap_err();
        assert_eq!(err.to_string(), "Invalid email address");
    }

    #[test]
    fn test_signup_password_length() {
        assert!(validate_signup("asha@example.com", "123456").is_ok());
        let err = validate_signup("asha@example.com", "12345").unwrap_err();
        assert_eq!(err.message, "Password must be at least 6 characters");
    }

    #[test]
    fn test_reset_password_rules() {
        let err = validate_reset_password(" ", "longenough").unwrap_err();
        assert_eq!(err.field, "token");

        let err = validate_reset_password("tok", "short").unwrap_err();
        assert_eq!(err.field, "newPassword");
        assert_eq!(err.message, "Password must be at least 8 characters");

        let body = validate_reset_password("tok", "longenough").unwrap();
        assert_eq!(body.token, "tok");
    }

    #[test]
    fn test_forgot_password_rules() {
        assert!(validate_forgot_password("asha@example.com").is_ok());
        assert!(validate_forgot_password("nope").is_err());
    }
}
