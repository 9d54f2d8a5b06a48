//! Scheduler inputs

use bl_core::traits::Id;
use chrono::NaiveDate;
use serde::Deserialize;

/// Parameters for creating a sprint
///
/// Dates are optional so a missing one is reported as a validation error
/// rather than rejected by the type system at the edge.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSprintParams {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sprint_backlog_id: Id,
}

impl CreateSprintParams {
    pub fn new(name: impl Into<String>, sprint_backlog_id: Id) -> Self {
        Self {
            name: name.into(),
            sprint_backlog_id,
            ..Default::default()
        }
    }

    pub fn with_dates(mut self, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self.end_date = Some(end_date);
        self
    }
}

/// Partial update of a sprint; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintChanges {
    /// A blank name counts as not provided
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl SprintChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn touches_dates(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && !self.touches_dates()
    }
}
