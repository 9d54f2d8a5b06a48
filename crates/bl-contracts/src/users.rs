//! User contracts

use std::sync::LazyLock;

use bl_core::error::ValidationErrors;
use bl_models::{Role, User};
use regex::Regex;
use validator::Validate;

use crate::base::{merge_derived, validate_presence, Contract, ValidationResult};

/// Letters, digits, dots, dashes and underscores; starts with a letter or digit
static USERNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("username pattern compiles")
});

const MIN_USERNAME: usize = 3;
const MAX_USERNAME: usize = 64;

/// Validates a user before registration or update
///
/// Uniqueness of username and email needs storage access and is enforced by
/// the lifecycle service.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserContract;

impl UserContract {
    pub fn validate_username(&self, username: &str, errors: &mut ValidationErrors) {
        if !validate_presence("username", username, errors) {
            return;
        }

        let length = username.chars().count();
        if length < MIN_USERNAME {
            errors.add(
                "username",
                format!("is too short (minimum is {} characters)", MIN_USERNAME),
            );
        } else if length > MAX_USERNAME {
            errors.add(
                "username",
                format!("is too long (maximum is {} characters)", MAX_USERNAME),
            );
        } else if !USERNAME_PATTERN.is_match(username) {
            errors.add(
                "username",
                "is invalid. Only letters, numbers, periods, dashes and underscores allowed",
            );
        }
    }
}

impl Contract<User> for UserContract {
    fn validate(&self, user: &User) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        self.validate_username(&user.username, &mut errors);
        validate_presence("email", &user.email, &mut errors);
        validate_presence("password_hash", &user.password_hash, &mut errors);

        merge_derived(&mut errors, user.validate());
        errors.into_result()
    }
}

/// Only a product owner may own a project
#[derive(Debug, Default, Clone, Copy)]
pub struct ProductOwnerContract;

impl Contract<User> for ProductOwnerContract {
    fn validate(&self, user: &User) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        if user.role != Role::ProductOwner {
            errors.add(
                "role",
                format!(
                    "must be {} to own a project (is {})",
                    Role::ProductOwner.as_str(),
                    user.role.as_str()
                ),
            );
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, email: &str) -> User {
        let mut user = User::new(username, email, Role::Developer);
        user.password_hash = "hash".to_string();
        user
    }

    #[test]
    fn test_valid_user() {
        assert!(UserContract.validate(&user("ada.l", "ada@example.com")).is_ok());
    }

    #[test]
    fn test_invalid_username() {
        let errors = UserContract
            .validate(&user("ada lovelace", "ada@example.com"))
            .unwrap_err();
        assert!(errors.has_error("username"));

        let errors = UserContract.validate(&user("ad", "ada@example.com")).unwrap_err();
        assert!(errors.has_error("username"));
    }

    #[test]
    fn test_invalid_email() {
        let errors = UserContract.validate(&user("ada", "nope")).unwrap_err();
        assert!(errors.has_error("email"));
        assert!(!errors.has_error("username"));
    }

    #[test]
    fn test_missing_password_hash() {
        let mut candidate = user("ada", "ada@example.com");
        candidate.password_hash.clear();
        assert!(UserContract
            .validate(&candidate)
            .unwrap_err()
            .has_error("password_hash"));
    }

    #[test]
    fn test_product_owner_role() {
        let mut candidate = user("ada", "ada@example.com");
        assert!(ProductOwnerContract.validate(&candidate).is_err());

        candidate.role = Role::ProductOwner;
        assert!(ProductOwnerContract.validate(&candidate).is_ok());
    }
}
