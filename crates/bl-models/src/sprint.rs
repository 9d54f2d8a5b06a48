//! Sprint model
//!
//! Table: sprints

use bl_core::traits::Id;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A dated iteration attached to at most one sprint backlog
///
/// A sprint without a backlog is *unscheduled*: it takes part in no overlap
/// checks until it is attached again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    pub start_date: NaiveDate,

    /// Inclusive last day of the sprint
    pub end_date: NaiveDate,

    pub sprint_backlog_id: Option<Id>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl_entity!(Sprint, "sprints", "Sprint");

impl Sprint {
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: None,
            name: name.into(),
            start_date,
            end_date,
            sprint_backlog_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn in_backlog(mut self, sprint_backlog_id: Id) -> Self {
        self.sprint_backlog_id = Some(sprint_backlog_id);
        self
    }

    pub fn is_scheduled(&self) -> bool {
        self.sprint_backlog_id.is_some()
    }

    /// Closed-interval intersection with `[start, end]`
    ///
    /// Sharing a single day counts as an overlap.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end_date && end >= self.start_date
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Length in calendar days, both ends included
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}
