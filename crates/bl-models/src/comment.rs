//! Comment model
//!
//! Table: comments

use bl_core::traits::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A note left on a task. Immutable once created: there is no update path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Option<Id>,

    #[validate(length(min = 1))]
    pub content: String,

    pub task_id: Id,

    pub author_id: Id,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl_entity!(Comment, "comments", "Comment");

impl Comment {
    /// New comment stamped with the current time
    pub fn new(task_id: Id, author_id: Id, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            content: content.into(),
            task_id,
            author_id,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}
