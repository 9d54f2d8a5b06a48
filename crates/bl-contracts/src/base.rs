//! Base contract system

use std::collections::HashSet;

use bl_core::error::ValidationErrors;

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// Base contract trait
pub trait Contract<T>: Send + Sync {
    /// Validate the entity
    fn validate(&self, entity: &T) -> ValidationResult;
}

/// Adds "can't be blank" for an empty or whitespace-only value
pub fn validate_presence(field: &str, value: &str, errors: &mut ValidationErrors) -> bool {
    if value.trim().is_empty() {
        errors.add(field, "can't be blank");
        false
    } else {
        true
    }
}

/// Presence plus an upper bound on the character count
pub fn validate_required_text(field: &str, value: &str, max: usize, errors: &mut ValidationErrors) {
    if validate_presence(field, value, errors) && value.chars().count() > max {
        errors.add(
            field,
            format!("is too long (maximum is {} characters)", max),
        );
    }
}

/// Folds the outcome of a `validator::Validate` derive into `errors`
///
/// Fields that already carry a message are skipped so a blank title is
/// reported once, not once per rule.
pub fn merge_derived(
    errors: &mut ValidationErrors,
    derived: Result<(), validator::ValidationErrors>,
) {
    let Err(derived) = derived else {
        return;
    };

    let mut fields: Vec<_> = derived.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    for (field, field_errors) in fields {
        if errors.has_error(field) {
            continue;
        }
        for error in field_errors {
            let message = match &error.message {
                Some(message) => message.to_string(),
                None => describe_code(&error.code).to_string(),
            };
            errors.add(field, message);
        }
    }
}

fn describe_code(code: &str) -> &'static str {
    match code {
        "length" => "has an invalid length",
        "email" => "is not a valid email address",
        "range" => "is out of range",
        "regex" => "is invalid",
        _ => "is invalid",
    }
}

/// Change tracking for partial updates
#[derive(Debug, Default, Clone)]
pub struct ChangeTracker {
    changed_attributes: HashSet<&'static str>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_changed(&mut self, attribute: &'static str) {
        self.changed_attributes.insert(attribute);
    }

    pub fn is_changed(&self, attribute: &str) -> bool {
        self.changed_attributes.contains(attribute)
    }

    pub fn is_empty(&self) -> bool {
        self.changed_attributes.is_empty()
    }

    /// Changed attribute names in a stable order, for logging
    pub fn changed_attributes(&self) -> Vec<&'static str> {
        let mut attributes: Vec<_> = self.changed_attributes.iter().copied().collect();
        attributes.sort_unstable();
        attributes
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_tracker() {
        let mut tracker = ChangeTracker::new();
        assert!(tracker.is_empty());
        assert!(!tracker.is_changed("name"));

        tracker.mark_changed("start_date");
        tracker.mark_changed("name");
        assert!(tracker.is_changed("name"));
        assert!(!tracker.is_changed("end_date"));
        assert_eq!(tracker.changed_attributes(), vec!["name", "start_date"]);
    }

    #[test]
    fn test_presence_rejects_whitespace() {
        let mut errors = ValidationErrors::new();
        assert!(!validate_presence("title", "   ", &mut errors));
        assert_eq!(errors.get("title").unwrap(), &vec!["can't be blank".to_string()]);

        let mut errors = ValidationErrors::new();
        assert!(validate_presence("title", "Backlog", &mut errors));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_required_text_length() {
        let mut errors = ValidationErrors::new();
        validate_required_text("name", &"x".repeat(256), 255, &mut errors);
        assert!(errors.has_error("name"));
    }
}
