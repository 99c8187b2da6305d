use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Instructor,
    Admin,
}

impl Role {
    pub fn is_instructor(&self) -> bool {
        matches!(self, Role::Instructor)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn display(&self) -> &'static str {
        match self {
            Role::User => "Student",
            Role::Instructor => "Instructor",
            Role::Admin => "Admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub is_email_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl User {
    /// Display name, falling back to the email address
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_me_response() {
        let json = r#"{"id":"u_1","email":"asha@example.com","role":"INSTRUCTOR","isEmailVerified":true}"#;
        let user: User = serde_json::from_str(json).expect("Failed to parse user JSON");
        assert_eq!(user.id, "u_1");
        assert!(user.role.is_instructor());
        assert!(!user.role.is_admin());
        assert!(user.is_email_verified);
        assert_eq!(user.name, None);
        assert_eq!(user.display_name(), "asha@example.com");
    }

    #[test]
    fn test_display_name_prefers_name() {
        let json = r#"{"id":"u_2","email":"ravi@example.com","role":"USER","isEmailVerified":false,"name":"Ravi"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.display_name(), "Ravi");
        assert_eq!(user.role.display(), "Student");
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let json = r#"{"id":"u_3","email":"x@example.com","role":"OWNER","isEmailVerified":true}"#;
        assert!(serde_json::from_str::<User>(json).is_err());
    }
}
