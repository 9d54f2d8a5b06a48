//! Task contract

use bl_core::error::ValidationErrors;
use bl_models::Task;
use validator::Validate;

use crate::base::{merge_derived, validate_required_text, Contract, ValidationResult};

/// Validates title and hour fields of a task
#[derive(Debug, Default, Clone, Copy)]
pub struct TaskContract;

impl TaskContract {
    fn validate_hours(field: &str, hours: f64, errors: &mut ValidationErrors) {
        if !hours.is_finite() {
            errors.add(field, "must be a finite number");
        } else if hours < 0.0 {
            errors.add(field, "must be greater than or equal to 0");
        }
    }
}

impl Contract<Task> for TaskContract {
    fn validate(&self, task: &Task) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        validate_required_text("title", &task.title, 255, &mut errors);
        if let Some(estimate) = task.estimated_hours {
            Self::validate_hours("estimated_hours", estimate, &mut errors);
        }
        Self::validate_hours("logged_hours", task.logged_hours, &mut errors);

        merge_derived(&mut errors, task.validate());
        errors.into_result()
    }
}

/// An amount of work to add to a task: finite and strictly positive
pub fn validate_logged_hours(hours: f64) -> ValidationResult {
    let mut errors = ValidationErrors::new();
    if !hours.is_finite() {
        errors.add("hours", "must be a finite number");
    } else if hours <= 0.0 {
        errors.add("hours", "must be greater than 0");
    }
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_estimate() {
        let mut task = Task::new("Wire up CI");
        task.estimated_hours = Some(-1.0);
        let errors = TaskContract.validate(&task).unwrap_err();
        assert!(errors.has_error("estimated_hours"));
        assert_eq!(errors.get("estimated_hours").unwrap().len(), 1);
    }

    #[test]
    fn test_nan_estimate() {
        let mut task = Task::new("Wire up CI");
        task.estimated_hours = Some(f64::NAN);
        assert!(TaskContract.validate(&task).unwrap_err().has_error("estimated_hours"));
    }

    #[test]
    fn test_valid_task() {
        let mut task = Task::new("Wire up CI");
        task.estimated_hours = Some(3.0);
        assert!(TaskContract.validate(&task).is_ok());
    }

    #[test]
    fn test_logged_hours_must_be_positive() {
        assert!(validate_logged_hours(1.5).is_ok());
        assert!(validate_logged_hours(0.0).is_err());
        assert!(validate_logged_hours(-2.0).is_err());
        assert!(validate_logged_hours(f64::INFINITY).is_err());
        assert!(validate_logged_hours(f64::NAN).is_err());
    }
}
