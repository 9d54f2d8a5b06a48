//! User story model
//!
//! Table: user_stories

use bl_core::traits::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::status::{Priority, Statut};

/// A unit of desired functionality ("as a / I want / so that")
///
/// Optionally linked to an epic, a product backlog and a sprint backlog. A
/// story outlives the sprint backlog it was planned into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserStory {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    pub as_a: Option<String>,
    pub i_want: Option<String>,
    pub so_that: Option<String>,
    pub description: Option<String>,
    pub acceptance_criteria: Option<String>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub status: Statut,

    pub epic_id: Option<Id>,
    pub product_backlog_id: Option<Id>,
    pub sprint_backlog_id: Option<Id>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl_entity!(UserStory, "user_stories", "UserStory");

impl UserStory {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: Statut) -> Self {
        self.status = status;
        self
    }

    pub fn in_sprint_backlog(mut self, sprint_backlog_id: Id) -> Self {
        self.sprint_backlog_id = Some(sprint_backlog_id);
        self
    }

    /// Renders the classic "As a ..., I want ..., so that ..." sentence when
    /// all three parts are present
    pub fn narrative(&self) -> Option<String> {
        match (&self.as_a, &self.i_want, &self.so_that) {
            (Some(role), Some(goal), Some(benefit)) => Some(format!(
                "As a {}, I want {}, so that {}",
                role, goal, benefit
            )),
            _ => None,
        }
    }
}

/// Input for creating a user story
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserStory {
    pub title: String,
    pub as_a: Option<String>,
    pub i_want: Option<String>,
    pub so_that: Option<String>,
    pub description: Option<String>,
    pub acceptance_criteria: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Statut>,
}

impl NewUserStory {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_narrative(
        mut self,
        as_a: impl Into<String>,
        i_want: impl Into<String>,
        so_that: impl Into<String>,
    ) -> Self {
        self.as_a = Some(as_a.into());
        self.i_want = Some(i_want.into());
        self.so_that = Some(so_that.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_status(mut self, status: Statut) -> Self {
        self.status = Some(status);
        self
    }
}

impl From<NewUserStory> for UserStory {
    fn from(input: NewUserStory) -> Self {
        Self {
            title: input.title,
            as_a: input.as_a,
            i_want: input.i_want,
            so_that: input.so_that,
            description: input.description,
            acceptance_criteria: input.acceptance_criteria,
            priority: input.priority.unwrap_or_default(),
            status: input.status.unwrap_or_default(),
            ..Default::default()
        }
    }
}
