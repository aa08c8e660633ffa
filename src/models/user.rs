use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{self, FieldErrors, Presence, TextRule};

const USERNAME_MAX: usize = 150;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub date_joined: String,
}

/// Username/password pair, used both for registration and token requests.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Registration rules: bounded length and a restricted character set.
    pub fn for_registration(body: &Value) -> Result<Self, FieldErrors> {
        let obj = validation::object(body)?;
        let mut errors = FieldErrors::new();

        let username = validation::text(
            obj,
            "username",
            Presence::Required,
            TextRule::bounded(USERNAME_MAX),
            &mut errors,
        );
        if let Some(name) = &username {
            if !is_valid_username(name) {
                errors.add(
                    "username",
                    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
                );
            }
        }
        let password = validation::text(
            obj,
            "password",
            Presence::Required,
            TextRule::secret(),
            &mut errors,
        );

        match (username, password) {
            (Some(username), Some(password)) if errors.is_empty() => {
                Ok(Credentials { username, password })
            }
            _ => Err(errors),
        }
    }

    /// Login only checks presence; anything else is just a failed match.
    pub fn for_login(body: &Value) -> Result<Self, FieldErrors> {
        let obj = validation::object(body)?;
        let mut errors = FieldErrors::new();

        let username = validation::text(
            obj,
            "username",
            Presence::Required,
            TextRule::unbounded(),
            &mut errors,
        );
        let password = validation::text(
            obj,
            "password",
            Presence::Required,
            TextRule::secret(),
            &mut errors,
        );

        match (username, password) {
            (Some(username), Some(password)) if errors.is_empty() => {
                Ok(Credentials { username, password })
            }
            _ => Err(errors),
        }
    }
}

fn is_valid_username(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registration_missing_password() {
        let errors = Credentials::for_registration(&json!({"username": "testuser"})).unwrap_err();
        assert_eq!(errors.get("password").unwrap(), [validation::REQUIRED]);
        assert!(!errors.contains("username"));
    }

    #[test]
    fn test_registration_rejects_bad_username_characters() {
        let errors =
            Credentials::for_registration(&json!({"username": "bad name!", "password": "x"}))
                .unwrap_err();
        assert!(errors.contains("username"));
    }

    #[test]
    fn test_registration_accepts_email_like_usernames() {
        let creds = Credentials::for_registration(
            &json!({"username": "jane.doe+work@example.com", "password": " keep spaces "}),
        )
        .unwrap();
        assert_eq!(creds.username, "jane.doe+work@example.com");
        assert_eq!(creds.password, " keep spaces ");
    }

    #[test]
    fn test_user_never_serializes_hash() {
        let user = User {
            id: 1,
            username: "testuser".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            date_joined: "2025-06-01T00:00:00.000Z".to_string(),
        };
        let json = serde_json::to_value(user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "testuser");
    }
}
