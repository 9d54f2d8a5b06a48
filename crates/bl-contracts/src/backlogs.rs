//! Contracts for the titled containers: product backlogs, sprint backlogs
//! and epics

use bl_core::error::ValidationErrors;
use bl_models::{Epic, ProductBacklog, SprintBacklog};
use validator::Validate;

use crate::base::{merge_derived, validate_required_text, Contract, ValidationResult};

const MAX_TITLE: usize = 255;

fn validate_titled<T: Validate>(entity: &T, title: &str) -> ValidationResult {
    let mut errors = ValidationErrors::new();
    validate_required_text("title", title, MAX_TITLE, &mut errors);
    merge_derived(&mut errors, entity.validate());
    errors.into_result()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProductBacklogContract;

impl Contract<ProductBacklog> for ProductBacklogContract {
    fn validate(&self, backlog: &ProductBacklog) -> ValidationResult {
        validate_titled(backlog, &backlog.title)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SprintBacklogContract;

impl Contract<SprintBacklog> for SprintBacklogContract {
    fn validate(&self, backlog: &SprintBacklog) -> ValidationResult {
        validate_titled(backlog, &backlog.title)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EpicContract;

impl Contract<Epic> for EpicContract {
    fn validate(&self, epic: &Epic) -> ValidationResult {
        validate_titled(epic, &epic.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titles_required() {
        assert!(ProductBacklogContract
            .validate(&ProductBacklog::new(""))
            .unwrap_err()
            .has_error("title"));
        assert!(SprintBacklogContract
            .validate(&SprintBacklog::new("\t"))
            .unwrap_err()
            .has_error("title"));
        assert!(EpicContract.validate(&Epic::new(" ")).is_err());
    }

    #[test]
    fn test_valid_titles() {
        assert!(ProductBacklogContract.validate(&ProductBacklog::new("Main")).is_ok());
        assert!(SprintBacklogContract.validate(&SprintBacklog::new("Q1")).is_ok());
        assert!(EpicContract.validate(&Epic::new("Checkout")).is_ok());
    }
}
