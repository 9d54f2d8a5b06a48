//! Task service: creation, time logging, status and comments

use bl_contracts::{validate_logged_hours, CommentContract, TaskContract};
use bl_core::error::BlError;
use bl_core::result::BlResult;
use bl_core::traits::Id;
use bl_db::Repositories;
use bl_models::{Comment, NewTask, Task, TaskStatus};
use tracing::{info, warn};

use crate::base::{found, validate_with};

#[derive(Clone)]
pub struct TaskService {
    repos: Repositories,
}

impl TaskService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Create a task, optionally under an existing user story
    pub async fn create_task(&self, input: NewTask) -> BlResult<Task> {
        let mut task = Task::from(input);
        task.title = task.title.trim().to_string();
        validate_with(&TaskContract, &task)?;

        if let Some(user_story_id) = task.user_story_id {
            found(
                self.repos.user_stories.find_by_id(user_story_id).await?,
                user_story_id,
            )?;
        }

        let task = self.repos.tasks.save(task).await?;
        info!(task_id = ?task.id, user_story_id = ?task.user_story_id, "task created");
        Ok(task)
    }

    /// Add worked hours to a task
    pub async fn log_hours(&self, task_id: Id, hours: f64) -> BlResult<Task> {
        validate_logged_hours(hours).map_err(|errors| {
            warn!(task_id, hours, "rejected hours");
            BlError::InvalidArgument(errors)
        })?;

        let mut task = found(self.repos.tasks.find_by_id(task_id).await?, task_id)?;
        task.logged_hours += hours;

        let task = self.repos.tasks.save(task).await?;
        info!(task_id, hours, total = task.logged_hours, "hours logged");
        Ok(task)
    }

    pub async fn set_task_status(&self, task_id: Id, status: TaskStatus) -> BlResult<Task> {
        let mut task = found(self.repos.tasks.find_by_id(task_id).await?, task_id)?;
        if task.status == status {
            return Ok(task);
        }

        let previous = std::mem::replace(&mut task.status, status);
        let task = self.repos.tasks.save(task).await?;
        info!(task_id, from = %previous, to = %status, "task status changed");
        Ok(task)
    }

    pub async fn add_comment(
        &self,
        task_id: Id,
        author_id: Id,
        content: impl Into<String>,
    ) -> BlResult<Comment> {
        let content: String = content.into();
        let comment = Comment::new(task_id, author_id, content.trim());
        validate_with(&CommentContract, &comment)?;

        found(self.repos.tasks.find_by_id(task_id).await?, task_id)?;
        found(self.repos.users.find_by_id(author_id).await?, author_id)?;

        let comment = self.repos.comments.save(comment).await?;
        info!(comment_id = ?comment.id, task_id, author_id, "comment added");
        Ok(comment)
    }

    /// Comments on a task, oldest first
    pub async fn comments_for_task(&self, task_id: Id) -> BlResult<Vec<Comment>> {
        found(self.repos.tasks.find_by_id(task_id).await?, task_id)?;

        let mut comments = self.repos.comments.find_by_task(task_id).await?;
        comments.sort_by_key(|comment| (comment.created_at, comment.id));
        Ok(comments)
    }
}
