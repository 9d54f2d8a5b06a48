//! Project model
//!
//! Table: projects

use bl_core::traits::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Project entity
///
/// Owning side of the 1:1 edge with its product backlog; the backlog mirrors
/// the link in `ProductBacklog::project_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Option<Id>,

    /// Display name
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    pub description: Option<String>,

    /// Linked product backlog
    pub product_backlog_id: Option<Id>,

    /// Product owner of the project
    pub owner_id: Option<Id>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl_entity!(Project, "projects", "Project");

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn has_backlog(&self) -> bool {
        self.product_backlog_id.is_some()
    }

    pub fn has_owner(&self) -> bool {
        self.owner_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bl_core::traits::{Identifiable, Timestamped};

    #[test]
    fn test_project_new() {
        let project = Project::new("Apollo");
        assert_eq!(project.name, "Apollo");
        assert!(project.is_new_record());
        assert!(!project.has_backlog());
        assert!(!project.has_owner());
    }

    #[test]
    fn test_touch_keeps_creation_time() {
        let mut project = Project::new("Apollo");
        let first = Utc::now();
        project.touch(first);
        let later = first + chrono::Duration::seconds(5);
        project.touch(later);

        assert_eq!(project.created_at(), Some(first));
        assert_eq!(project.updated_at(), Some(later));
    }
}
