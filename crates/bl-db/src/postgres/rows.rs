//! Row mappings between PostgreSQL tables and domain models
//!
//! Enumerations are stored as text and parsed on the way out; an unknown
//! value surfaces as `RepositoryError::Validation`.

use std::str::FromStr;

use bl_models::{
    Comment, Epic, ProductBacklog, Project, Sprint, SprintBacklog, Task, User, UserStory,
};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::repository::RepositoryError;

fn parse<T: FromStr<Err = String>>(value: &str) -> Result<T, RepositoryError> {
    value.parse().map_err(RepositoryError::Validation)
}

#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub product_backlog_id: Option<i64>,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: Some(row.id),
            name: row.name,
            description: row.description,
            product_backlog_id: row.product_backlog_id,
            owner_id: row.owner_id,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ProductBacklogRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub project_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductBacklogRow> for ProductBacklog {
    fn from(row: ProductBacklogRow) -> Self {
        ProductBacklog {
            id: Some(row.id),
            title: row.title,
            description: row.description,
            project_id: row.project_id,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

/// Shared shape of `epics` and `sprint_backlogs`
#[derive(Debug, Clone, FromRow)]
pub struct BacklogChildRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub product_backlog_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BacklogChildRow> for Epic {
    fn from(row: BacklogChildRow) -> Self {
        Epic {
            id: Some(row.id),
            title: row.title,
            description: row.description,
            product_backlog_id: row.product_backlog_id,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

impl From<BacklogChildRow> for SprintBacklog {
    fn from(row: BacklogChildRow) -> Self {
        SprintBacklog {
            id: Some(row.id),
            title: row.title,
            description: row.description,
            product_backlog_id: row.product_backlog_id,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct SprintRow {
    pub id: i64,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub sprint_backlog_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SprintRow> for Sprint {
    fn from(row: SprintRow) -> Self {
        Sprint {
            id: Some(row.id),
            name: row.name,
            start_date: row.start_date,
            end_date: row.end_date,
            sprint_backlog_id: row.sprint_backlog_id,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserStoryRow {
    pub id: i64,
    pub title: String,
    pub as_a: Option<String>,
    pub i_want: Option<String>,
    pub so_that: Option<String>,
    pub description: Option<String>,
    pub acceptance_criteria: Option<String>,
    pub priority: String,
    pub status: String,
    pub epic_id: Option<i64>,
    pub product_backlog_id: Option<i64>,
    pub sprint_backlog_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserStoryRow> for UserStory {
    type Error = RepositoryError;

    fn try_from(row: UserStoryRow) -> Result<Self, Self::Error> {
        Ok(UserStory {
            id: Some(row.id),
            title: row.title,
            as_a: row.as_a,
            i_want: row.i_want,
            so_that: row.so_that,
            description: row.description,
            acceptance_criteria: row.acceptance_criteria,
            priority: parse(&row.priority)?,
            status: parse(&row.status)?,
            epic_id: row.epic_id,
            product_backlog_id: row.product_backlog_id,
            sprint_backlog_id: row.sprint_backlog_id,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub priority: String,
    pub estimated_hours: Option<f64>,
    pub logged_hours: f64,
    pub user_story_id: Option<i64>,
    pub assignee_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = RepositoryError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: Some(row.id),
            title: row.title,
            description: row.description,
            status: parse(&row.status)?,
            due_date: row.due_date,
            priority: parse(&row.priority)?,
            estimated_hours: row.estimated_hours,
            logged_hours: row.logged_hours,
            user_story_id: row.user_story_id,
            assignee_id: row.assignee_id,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub content: String,
    pub task_id: i64,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: Some(row.id),
            content: row.content,
            task_id: row.task_id,
            author_id: row.author_id,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: Some(row.id),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role: parse(&row.role)?,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bl_models::{Role, Statut, TaskStatus};

    #[test]
    fn test_unknown_status_is_validation_error() {
        let now = Utc::now();
        let row = TaskRow {
            id: 1,
            title: "t".into(),
            description: None,
            status: "DONE".into(),
            due_date: None,
            priority: "LOW".into(),
            estimated_hours: None,
            logged_hours: 0.0,
            user_story_id: None,
            assignee_id: None,
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(
            Task::try_from(row.clone()),
            Err(RepositoryError::Validation(_))
        ));

        let task = Task::try_from(TaskRow {
            status: TaskStatus::InReview.as_str().into(),
            ..row
        })
        .unwrap();
        assert_eq!(task.status, TaskStatus::InReview);
    }

    #[test]
    fn test_enum_text_columns() {
        let now = Utc::now();
        let user = User::try_from(UserRow {
            id: 3,
            username: "ada".into(),
            email: "ada@example.com".into(),
            password_hash: "h".into(),
            role: "SCRUM_MASTER".into(),
            created_at: now,
            updated_at: now,
        })
        .unwrap();
        assert_eq!(user.role, Role::ScrumMaster);

        let story = UserStory::try_from(UserStoryRow {
            id: 1,
            title: "Login".into(),
            as_a: None,
            i_want: None,
            so_that: None,
            description: None,
            acceptance_criteria: None,
            priority: "HIGH".into(),
            status: Statut::InTesting.as_str().into(),
            epic_id: None,
            product_backlog_id: None,
            sprint_backlog_id: Some(2),
            created_at: now,
            updated_at: now,
        })
        .unwrap();
        assert_eq!(story.status, Statut::InTesting);
    }
}
