//! Core error types for Backlog RS
//!
//! Three kinds matter to callers of the engine: a referenced id that does not
//! resolve, malformed input, and a state invariant that would be violated.
//! Everything else is an ambient failure of the storage or configuration layer.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::traits::{Entity, Id};

/// Core error type for all backlog operations
#[derive(Error, Debug)]
pub enum BlError {
    #[error("Not found: {entity} with id={id}")]
    NotFound { entity: &'static str, id: Id },

    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ValidationErrors),

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BlError {
    /// A lookup of `T` by `id` came back empty
    pub fn not_found<T: Entity>(id: Id) -> Self {
        BlError::NotFound {
            entity: T::TYPE_NAME,
            id,
        }
    }

    /// Single-field invalid argument
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        BlError::InvalidArgument(errors)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        BlError::Conflict {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BlError::NotFound { .. })
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, BlError::InvalidArgument(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, BlError::Conflict { .. })
    }

    /// HTTP status code a calling API layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            BlError::NotFound { .. } => 404,
            BlError::InvalidArgument(_) => 422,
            BlError::Conflict { .. } => 409,
            BlError::Database(_) | BlError::Internal(_) | BlError::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            BlError::NotFound { .. } => "not_found",
            BlError::InvalidArgument(_) => "invalid_argument",
            BlError::Conflict { .. } => "conflict",
            BlError::Database(_) => "database_error",
            BlError::Config(_) => "configuration_error",
            BlError::Internal(_) => "internal_error",
        }
    }
}

/// Validation errors collection keyed by field name
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> messages
    pub errors: BTreeMap<String, Vec<String>>,
    /// Errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    /// `Ok(())` when empty, otherwise the collected errors
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_messages().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_collect_by_field() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add("name", "can't be blank");
        errors.add("name", "is too long");
        errors.add_base("sprint is locked");

        assert!(errors.has_error("name"));
        assert!(!errors.has_error("start_date"));
        assert_eq!(errors.get("name").map(Vec::len), Some(2));
        assert_eq!(
            errors.full_messages(),
            vec![
                "sprint is locked".to_string(),
                "name can't be blank".to_string(),
                "name is too long".to_string(),
            ]
        );
    }

    #[test]
    fn test_merge() {
        let mut a = ValidationErrors::new();
        a.add("title", "can't be blank");
        let mut b = ValidationErrors::new();
        b.add("title", "is too long");
        b.add("hours", "must be positive");

        a.merge(b);
        assert_eq!(a.get("title").map(Vec::len), Some(2));
        assert!(a.has_error("hours"));
    }

    #[test]
    fn test_status_codes() {
        let not_found = BlError::NotFound {
            entity: "Sprint",
            id: 7,
        };
        assert_eq!(not_found.status_code(), 404);
        assert_eq!(not_found.error_code(), "not_found");
        assert_eq!(not_found.to_string(), "Not found: Sprint with id=7");

        let invalid = BlError::invalid("end_date", "must be on or after start date");
        assert!(invalid.is_invalid_argument());
        assert_eq!(invalid.status_code(), 422);

        let conflict = BlError::conflict("sprint dates overlap");
        assert!(conflict.is_conflict());
        assert_eq!(conflict.status_code(), 409);
    }
}
