//! Project contract

use bl_core::error::ValidationErrors;
use bl_models::Project;
use validator::Validate;

use crate::base::{merge_derived, validate_required_text, Contract, ValidationResult};

/// Validates a project before it is saved
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectContract;

impl ProjectContract {
    pub fn new() -> Self {
        Self
    }
}

impl Contract<Project> for ProjectContract {
    fn validate(&self, project: &Project) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        validate_required_text("name", &project.name, 255, &mut errors);
        merge_derived(&mut errors, project.validate());

        errors.into_result()
    }
}
