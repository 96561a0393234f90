//! User domain entity and related types.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// Registration email shape: something@something.something, no whitespace
pub static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\S+@\S+\.\S+$").expect("registration email pattern is valid")
});

/// Login email shape; additionally forbids a second `@`
pub static LOGIN_EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("login email pattern is valid")
});

const MIN_PASSWORD_LENGTH: usize = 6;

/// Canonical stored form of an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Vendor / display name
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub stall_address: Option<String>,
    pub profile_picture: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to insert a new account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Registration request
///
/// Only the first failing check is reported: missing fields, then the
/// password confirmation, then the email shape, then the password length.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    #[serde(default)]
    #[schema(example = "Green Stall")]
    pub username: String,
    #[serde(default)]
    #[schema(example = "vendor@example.com")]
    pub email: String,
    #[serde(default)]
    #[schema(example = "secret1", min_length = 6)]
    pub password: String,
    #[serde(default)]
    #[schema(example = "secret1")]
    pub confirm_password: String,
}

impl RegisterUser {
    /// Field and message of the first check this request fails.
    pub fn first_failure(&self) -> Option<(&'static str, &'static str)> {
        let required = [
            ("username", &self.username),
            ("email", &self.email),
            ("password", &self.password),
            ("confirm_password", &self.confirm_password),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Some((*field, "Please provide all required fields"));
        }
        if self.password != self.confirm_password {
            return Some(("confirm_password", "Passwords do not match"));
        }
        if !EMAIL_REGEX.is_match(&self.email) {
            return Some(("email", "Please provide a valid email address"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Some(("password", "Password must be at least 6 characters long"));
        }
        None
    }
}

impl Validate for RegisterUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let Some((field, message)) = self.first_failure() else {
            return Ok(());
        };

        let mut error = ValidationError::new("register");
        error.message = Some(Cow::Borrowed(message));
        let mut errors = ValidationErrors::new();
        errors.add(field, error);
        Err(errors)
    }
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginUser {
    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide both email and password"))]
    #[schema(example = "vendor@example.com")]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide both email and password"))]
    #[schema(example = "secret1")]
    pub password: String,
}

/// Profile update request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username and email are required"))]
    pub username: String,
    #[serde(default)]
    #[validate(
        length(min = 1, message = "Username and email are required"),
        regex(path = *EMAIL_REGEX, message = "Please provide a valid email address")
    )]
    pub email: String,
    pub stall_address: Option<String>,
}

/// Public user profile (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    #[schema(example = "Green Stall")]
    pub username: String,
    #[schema(example = "vendor@example.com")]
    pub email: String,
    pub phone: Option<String>,
    pub stall_address: Option<String>,
    pub profile_picture: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.name,
            email: user.email,
            phone: user.phone,
            stall_address: user.stall_address,
            profile_picture: user.profile_picture,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

/// Seller attribution attached to public listings
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SellerSummary {
    pub id: Uuid,
    pub name: String,
}

impl From<&User> for SellerSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str, confirm: &str) -> RegisterUser {
        RegisterUser {
            username: "Green Stall".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Vendor@Example.COM "), "vendor@example.com");
    }

    #[test]
    fn test_register_valid() {
        assert!(register("a@b.co", "secret1", "secret1").validate().is_ok());
    }

    #[test]
    fn test_register_password_mismatch() {
        let errors = register("a@b.co", "secret1", "secret2")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("confirm_password"));
    }

    #[test]
    fn test_register_short_password() {
        let errors = register("a@b.co", "12345", "12345").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_register_bad_email() {
        let errors = register("not an email", "secret1", "secret1")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_register_reports_only_the_first_failure() {
        let input = RegisterUser {
            username: String::new(),
            ..register("not an email", "123", "456")
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();

        assert_eq!(fields.len(), 1);
        let messages: Vec<String> = fields
            .values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .collect();
        assert_eq!(messages, vec!["Please provide all required fields"]);
    }

    #[test]
    fn test_register_check_order() {
        assert_eq!(
            register("not an email", "123", "456").first_failure(),
            Some(("confirm_password", "Passwords do not match"))
        );
        assert_eq!(
            register("not an email", "123", "123").first_failure(),
            Some(("email", "Please provide a valid email address"))
        );
        assert_eq!(
            register("a@b.co", "123", "123").first_failure(),
            Some(("password", "Password must be at least 6 characters long"))
        );
        assert_eq!(register("a@b.co", "secret1", "secret1").first_failure(), None);
    }

    #[test]
    fn test_login_email_rejects_double_at() {
        assert!(LOGIN_EMAIL_REGEX.is_match("a@b.co"));
        assert!(!LOGIN_EMAIL_REGEX.is_match("a@b@c.co"));
        assert!(EMAIL_REGEX.is_match("a@b@c.co"));
    }

    #[test]
    fn test_profile_hides_password_hash() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: "Green Stall".to_string(),
            email: "vendor@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            phone: None,
            stall_address: Some("Row 4".to_string()),
            profile_picture: None,
            last_login: Some(now),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(UserProfile::from(user)).unwrap();
        assert_eq!(json["username"], "Green Stall");
        assert_eq!(json["stallAddress"], "Row 4");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
