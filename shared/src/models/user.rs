//! User account models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::{validate_email_address, validate_name};

/// Avatar assigned to social accounts whose provider returns no picture
pub const DEFAULT_AVATAR: &str = "/images/default-avatar.png";

/// A customer or administrator account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// `None` for accounts created through Google/Facebook sign-in
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub is_admin: bool,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public profile returned by `/api/users/profile`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub avatar: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            avatar: user.avatar.clone(),
        }
    }
}

/// Profile plus a bearer token, returned by login/register/profile update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithToken {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub token: String,
}

/// Compact user reference embedded in order listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Input for registering a new account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(custom = "validate_name")]
    pub name: String,
    #[validate(custom = "validate_email_address")]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Input for email/password login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Partial profile update; empty strings leave the field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
}

/// Normalize an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            password_hash: Some("$2b$12$hash".to_string()),
            is_admin: true,
            avatar: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["isAdmin"], true);
        assert!(json.get("_id").is_some());
    }

    #[test]
    fn test_user_with_token_is_flat() {
        let user = sample_user();
        let body = UserWithToken {
            profile: UserProfile::from(&user),
            token: "abc".to_string(),
        };
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["token"], "abc");
        assert_eq!(json["email"], "jane@example.com");
        assert_eq!(json["_id"], user.id.to_string());
    }

    #[test]
    fn test_register_input_validation() {
        let ok = RegisterInput {
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(ok.validate().is_ok());

        let short = RegisterInput {
            password: "123".to_string(),
            ..ok.clone()
        };
        assert!(short.validate().is_err());

        let bad_email = RegisterInput {
            email: "not-an-email".to_string(),
            ..ok
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_register_rejects_blank_name() {
        let input = RegisterInput {
            name: "   ".to_string(),
            email: "jane@example.com".to_string(),
            password: "secret1".to_string(),
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["name"][0].message.as_deref(), Some("Name is required"));
    }

    #[test]
    fn test_register_accepts_padded_email() {
        let input = RegisterInput {
            name: "Jane".to_string(),
            email: "  Jane@Example.com ".to_string(),
            password: "secret1".to_string(),
        };
        assert!(input.validate().is_ok());
        assert_eq!(normalize_email(&input.email), "jane@example.com");
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane@Example.COM "), "jane@example.com");
    }
}
