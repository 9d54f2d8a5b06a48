//! Sprint backlog model
//!
//! Table: sprint_backlogs

use bl_core::traits::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Container for user stories slated for iteration work, and for the sprints
/// that time-box that work
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SprintBacklog {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    pub description: Option<String>,

    pub product_backlog_id: Option<Id>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl_entity!(SprintBacklog, "sprint_backlogs", "SprintBacklog");

impl SprintBacklog {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn belongs_to(&self, product_backlog_id: Id) -> bool {
        self.product_backlog_id == Some(product_backlog_id)
    }
}
