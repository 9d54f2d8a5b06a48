//! Product backlog model
//!
//! Table: product_backlogs

use bl_core::traits::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Ranked container of epics and sprint backlogs for one project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductBacklog {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    pub description: Option<String>,

    /// Mirror of `Project::product_backlog_id`
    pub project_id: Option<Id>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl_entity!(ProductBacklog, "product_backlogs", "ProductBacklog");

impl ProductBacklog {
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
}
