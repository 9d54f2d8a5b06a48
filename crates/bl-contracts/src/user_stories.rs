//! User story contract

use bl_core::error::ValidationErrors;
use bl_models::UserStory;
use validator::Validate;

use crate::base::{merge_derived, validate_required_text, Contract, ValidationResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct UserStoryContract;

impl Contract<UserStory> for UserStoryContract {
    fn validate(&self, story: &UserStory) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        validate_required_text("title", &story.title, 255, &mut errors);

        // Narrative parts are optional, but a given part must say something
        for (field, value) in [
            ("as_a", &story.as_a),
            ("i_want", &story.i_want),
            ("so_that", &story.so_that),
        ] {
            if matches!(value, Some(text) if text.trim().is_empty()) {
                errors.add(field, "can't be blank when given");
            }
        }

        merge_derived(&mut errors, story.validate());
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_required() {
        let errors = UserStoryContract.validate(&UserStory::new("")).unwrap_err();
        assert!(errors.has_error("title"));
    }

    #[test]
    fn test_blank_narrative_part() {
        let mut story = UserStory::new("Login");
        story.i_want = Some("   ".to_string());
        let errors = UserStoryContract.validate(&story).unwrap_err();
        assert!(errors.has_error("i_want"));
        assert!(!errors.has_error("title"));
    }
}
