//! Comment contract

use bl_core::error::ValidationErrors;
use bl_models::Comment;

use crate::base::{validate_presence, Contract, ValidationResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct CommentContract;

impl Contract<Comment> for CommentContract {
    fn validate(&self, comment: &Comment) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_presence("content", &comment.content, &mut errors);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_content() {
        assert!(CommentContract.validate(&Comment::new(1, 2, " ")).is_err());
        assert!(CommentContract.validate(&Comment::new(1, 2, "LGTM")).is_ok());
    }
}
