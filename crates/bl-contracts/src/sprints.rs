//! Sprint contract

use bl_core::error::ValidationErrors;
use bl_models::Sprint;
use chrono::NaiveDate;
use validator::Validate;

use crate::base::{merge_derived, validate_required_text, Contract, ValidationResult};

/// True only when both dates are present and `end >= start`
///
/// A one-day sprint (`start == end`) is valid.
pub fn is_date_range_valid(start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    matches!((start, end), (Some(start), Some(end)) if end >= start)
}

/// Adds errors for a missing or inverted date range
pub fn validate_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    errors: &mut ValidationErrors,
) {
    if start.is_none() {
        errors.add("start_date", "can't be blank");
    }
    if end.is_none() {
        errors.add("end_date", "can't be blank");
    }
    if start.is_some() && end.is_some() && !is_date_range_valid(start, end) {
        errors.add("end_date", "must be on or after the start date");
    }
}

/// Validates name and date order of a sprint
///
/// Overlap with sibling sprints needs storage access and is checked by the
/// scheduler, not here.
#[derive(Debug, Default, Clone, Copy)]
pub struct SprintContract;

impl Contract<Sprint> for SprintContract {
    fn validate(&self, sprint: &Sprint) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        validate_required_text("name", &sprint.name, 255, &mut errors);
        validate_date_range(Some(sprint.start_date), Some(sprint.end_date), &mut errors);
        merge_derived(&mut errors, sprint.validate());

        errors.into_result()
    }
}
