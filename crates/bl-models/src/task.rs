//! Task model
//!
//! Table: tasks

use bl_core::traits::Id;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::status::{Priority, TaskStatus};

/// Actionable work item under a user story
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub priority: Priority,

    #[validate(range(min = 0.0))]
    pub estimated_hours: Option<f64>,

    /// Accumulated work; never decreases
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub logged_hours: f64,

    pub user_story_id: Option<Id>,

    /// Assigned user
    pub assignee_id: Option<Id>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl_entity!(Task, "tasks", "Task");

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn for_user_story(mut self, user_story_id: Id) -> Self {
        self.user_story_id = Some(user_story_id);
        self
    }

    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }

    /// Estimated minus logged hours, floored at zero
    pub fn remaining_hours(&self) -> Option<f64> {
        self.estimated_hours
            .map(|estimate| (estimate - self.logged_hours).max(0.0))
    }
}

/// Input for creating a task
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub estimated_hours: Option<f64>,
    pub user_story_id: Option<Id>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_estimate(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn for_user_story(mut self, user_story_id: Id) -> Self {
        self.user_story_id = Some(user_story_id);
        self
    }
}

impl From<NewTask> for Task {
    fn from(input: NewTask) -> Self {
        Self {
            title: input.title,
            description: input.description,
            status: input.status.unwrap_or_default(),
            due_date: input.due_date,
            priority: input.priority.unwrap_or_default(),
            estimated_hours: input.estimated_hours,
            user_story_id: input.user_story_id,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_hours() {
        let mut task: Task = NewTask::new("Write migration").with_estimate(4.0).into();
        task.logged_hours = 1.5;
        assert_eq!(task.remaining_hours(), Some(2.5));

        task.logged_hours = 6.0;
        assert_eq!(task.remaining_hours(), Some(0.0));

        assert_eq!(Task::new("No estimate").remaining_hours(), None);
    }

    #[test]
    fn test_is_done() {
        assert!(Task::new("t").with_status(TaskStatus::Finished).is_done());
        assert!(!Task::new("t").with_status(TaskStatus::InReview).is_done());
    }
}
