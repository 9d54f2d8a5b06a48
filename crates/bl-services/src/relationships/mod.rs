//! Relationship consistency manager
//!
//! Every cross-entity link goes through [`RelationshipManager`]. The 1:1
//! Project↔ProductBacklog edge stores both ends, so both are written together;
//! at 1:N edges the child's foreign key is the single source of truth.
//!
//! Attempt-style operations return `false` when an endpoint is missing;
//! must-succeed operations return the parent and fail with `NotFound`.
//! Every lookup happens before the first write.

mod edges;

pub use edges::ForeignKey;

use bl_contracts::ProductOwnerContract;
use bl_core::result::BlResult;
use bl_core::traits::Id;
use bl_db::Repositories;
use bl_models::{Epic, ProductBacklog, SprintBacklog, Task, UserStory};
use tracing::info;

use crate::base::{found, validate_with};
use crate::deletion::{DeletionReport, DeletionService, EntityRef};
use edges::{attach, detach};

fn sprint_backlog_parent(backlog: &mut SprintBacklog) -> &mut Option<Id> {
    &mut backlog.product_backlog_id
}

fn epic_parent(epic: &mut Epic) -> &mut Option<Id> {
    &mut epic.product_backlog_id
}

fn story_sprint_backlog(story: &mut UserStory) -> &mut Option<Id> {
    &mut story.sprint_backlog_id
}

fn story_epic(story: &mut UserStory) -> &mut Option<Id> {
    &mut story.epic_id
}

fn story_product_backlog(story: &mut UserStory) -> &mut Option<Id> {
    &mut story.product_backlog_id
}

fn task_user_story(task: &mut Task) -> &mut Option<Id> {
    &mut task.user_story_id
}

/// Owner of every link operation
#[derive(Clone)]
pub struct RelationshipManager {
    repos: Repositories,
    deletion: DeletionService,
}

impl RelationshipManager {
    pub fn new(repos: Repositories) -> Self {
        Self {
            deletion: DeletionService::new(repos.clone()),
            repos,
        }
    }

    // ------------------------------------------------------------------
    // Project ↔ ProductBacklog (1:1)
    // ------------------------------------------------------------------

    /// Link a project and a product backlog, displacing any previous partners
    pub async fn link_project_to_backlog(&self, project_id: Id, backlog_id: Id) -> BlResult<bool> {
        let projects = &self.repos.projects;
        let backlogs = &self.repos.product_backlogs;

        let Some(mut project) = projects.find_by_id(project_id).await? else {
            return Ok(false);
        };
        let Some(mut backlog) = backlogs.find_by_id(backlog_id).await? else {
            return Ok(false);
        };

        if project.product_backlog_id == Some(backlog_id) && backlog.project_id == Some(project_id)
        {
            return Ok(true);
        }

        let displaced_project = projects
            .find_by_product_backlog(backlog_id)
            .await?
            .filter(|other| other.id != Some(project_id));
        let displaced_backlog = match project.product_backlog_id {
            Some(previous) if previous != backlog_id => backlogs
                .find_by_id(previous)
                .await?
                .filter(|other| other.project_id == Some(project_id)),
            _ => None,
        };

        if let Some(mut other) = displaced_project {
            other.product_backlog_id = None;
            projects.save(other).await?;
        }
        if let Some(mut other) = displaced_backlog {
            other.project_id = None;
            backlogs.save(other).await?;
        }

        project.product_backlog_id = Some(backlog_id);
        backlog.project_id = Some(project_id);
        projects.save(project).await?;
        backlogs.save(backlog).await?;

        info!(project_id, backlog_id, "project linked to product backlog");
        Ok(true)
    }

    /// Clear both sides of the project's backlog link
    pub async fn unlink_project_from_backlog(&self, project_id: Id) -> BlResult<bool> {
        let Some(mut project) = self.repos.projects.find_by_id(project_id).await? else {
            return Ok(false);
        };
        let Some(backlog_id) = project.product_backlog_id else {
            return Ok(false);
        };
        let backlog = self
            .repos
            .product_backlogs
            .find_by_id(backlog_id)
            .await?
            .filter(|backlog| backlog.project_id == Some(project_id));

        project.product_backlog_id = None;
        self.repos.projects.save(project).await?;
        if let Some(mut backlog) = backlog {
            backlog.project_id = None;
            self.repos.product_backlogs.save(backlog).await?;
        }

        info!(project_id, backlog_id, "project unlinked from product backlog");
        Ok(true)
    }

    // ------------------------------------------------------------------
    // User ↔ Project (owner)
    // ------------------------------------------------------------------

    /// Make a product owner the owner of a project
    ///
    /// `InvalidArgument` if the user is not a product owner.
    pub async fn assign_user_to_project(&self, project_id: Id, user_id: Id) -> BlResult<bool> {
        let Some(mut project) = self.repos.projects.find_by_id(project_id).await? else {
            return Ok(false);
        };
        let Some(user) = self.repos.users.find_by_id(user_id).await? else {
            return Ok(false);
        };
        validate_with(&ProductOwnerContract, &user)?;

        if project.owner_id != Some(user_id) {
            project.owner_id = Some(user_id);
            self.repos.projects.save(project).await?;
            info!(project_id, user_id, "project owner assigned");
        }
        Ok(true)
    }

    pub async fn remove_user_from_project(&self, project_id: Id) -> BlResult<bool> {
        let Some(mut project) = self.repos.projects.find_by_id(project_id).await? else {
            return Ok(false);
        };
        if project.owner_id.take().is_none() {
            return Ok(false);
        }
        self.repos.projects.save(project).await?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // ProductBacklog children
    // ------------------------------------------------------------------

    pub async fn add_sprint_backlog_to_product_backlog(
        &self,
        product_backlog_id: Id,
        sprint_backlog_id: Id,
    ) -> BlResult<ProductBacklog> {
        attach(
            &*self.repos.product_backlogs,
            &*self.repos.sprint_backlogs,
            product_backlog_id,
            sprint_backlog_id,
            sprint_backlog_parent,
        )
        .await
    }

    pub async fn remove_sprint_backlog_from_product_backlog(
        &self,
        product_backlog_id: Id,
        sprint_backlog_id: Id,
    ) -> BlResult<ProductBacklog> {
        detach(
            &*self.repos.product_backlogs,
            &*self.repos.sprint_backlogs,
            product_backlog_id,
            sprint_backlog_id,
            sprint_backlog_parent,
        )
        .await
    }

    pub async fn add_epic_to_product_backlog(
        &self,
        product_backlog_id: Id,
        epic_id: Id,
    ) -> BlResult<ProductBacklog> {
        attach(
            &*self.repos.product_backlogs,
            &*self.repos.epics,
            product_backlog_id,
            epic_id,
            epic_parent,
        )
        .await
    }

    pub async fn remove_epic_from_product_backlog(
        &self,
        product_backlog_id: Id,
        epic_id: Id,
    ) -> BlResult<ProductBacklog> {
        detach(
            &*self.repos.product_backlogs,
            &*self.repos.epics,
            product_backlog_id,
            epic_id,
            epic_parent,
        )
        .await
    }

    pub async fn add_user_story_to_product_backlog(
        &self,
        product_backlog_id: Id,
        user_story_id: Id,
    ) -> BlResult<ProductBacklog> {
        attach(
            &*self.repos.product_backlogs,
            &*self.repos.user_stories,
            product_backlog_id,
            user_story_id,
            story_product_backlog,
        )
        .await
    }

    pub async fn remove_user_story_from_product_backlog(
        &self,
        product_backlog_id: Id,
        user_story_id: Id,
    ) -> BlResult<ProductBacklog> {
        detach(
            &*self.repos.product_backlogs,
            &*self.repos.user_stories,
            product_backlog_id,
            user_story_id,
            story_product_backlog,
        )
        .await
    }

    // ------------------------------------------------------------------
    // UserStory parents
    // ------------------------------------------------------------------

    /// Plan a story into a sprint backlog
    pub async fn add_user_story_to_sprint_backlog(
        &self,
        sprint_backlog_id: Id,
        user_story_id: Id,
    ) -> BlResult<SprintBacklog> {
        attach(
            &*self.repos.sprint_backlogs,
            &*self.repos.user_stories,
            sprint_backlog_id,
            user_story_id,
            story_sprint_backlog,
        )
        .await
    }

    /// Take a story out of a sprint backlog; no write unless it is planned there
    pub async fn remove_user_story_from_sprint_backlog(
        &self,
        sprint_backlog_id: Id,
        user_story_id: Id,
    ) -> BlResult<SprintBacklog> {
        detach(
            &*self.repos.sprint_backlogs,
            &*self.repos.user_stories,
            sprint_backlog_id,
            user_story_id,
            story_sprint_backlog,
        )
        .await
    }

    pub async fn link_user_story_to_epic(&self, epic_id: Id, user_story_id: Id) -> BlResult<Epic> {
        attach(
            &*self.repos.epics,
            &*self.repos.user_stories,
            epic_id,
            user_story_id,
            story_epic,
        )
        .await
    }

    pub async fn unlink_user_story_from_epic(
        &self,
        epic_id: Id,
        user_story_id: Id,
    ) -> BlResult<Epic> {
        detach(
            &*self.repos.epics,
            &*self.repos.user_stories,
            epic_id,
            user_story_id,
            story_epic,
        )
        .await
    }

    /// Stories not planned into any sprint backlog
    pub async fn unassigned_user_stories(&self) -> BlResult<Vec<UserStory>> {
        Ok(self.repos.user_stories.find_without_sprint_backlog().await?)
    }

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    pub async fn add_task_to_user_story(
        &self,
        user_story_id: Id,
        task_id: Id,
    ) -> BlResult<UserStory> {
        attach(
            &*self.repos.user_stories,
            &*self.repos.tasks,
            user_story_id,
            task_id,
            task_user_story,
        )
        .await
    }

    pub async fn remove_task_from_user_story(
        &self,
        user_story_id: Id,
        task_id: Id,
    ) -> BlResult<UserStory> {
        detach(
            &*self.repos.user_stories,
            &*self.repos.tasks,
            user_story_id,
            task_id,
            task_user_story,
        )
        .await
    }

    pub async fn assign_task_to_user(&self, task_id: Id, user_id: Id) -> BlResult<Task> {
        let mut task = found(self.repos.tasks.find_by_id(task_id).await?, task_id)?;
        found(self.repos.users.find_by_id(user_id).await?, user_id)?;

        if task.assignee_id == Some(user_id) {
            return Ok(task);
        }
        task.assignee_id = Some(user_id);
        Ok(self.repos.tasks.save(task).await?)
    }

    pub async fn unassign_task(&self, task_id: Id) -> BlResult<Task> {
        let mut task = found(self.repos.tasks.find_by_id(task_id).await?, task_id)?;
        if task.assignee_id.take().is_none() {
            return Ok(task);
        }
        Ok(self.repos.tasks.save(task).await?)
    }

    // ------------------------------------------------------------------
    // Deletion
    // ------------------------------------------------------------------

    /// Delete a sprint backlog, leaving its stories and sprints unplanned
    pub async fn delete_sprint_backlog(&self, sprint_backlog_id: Id) -> BlResult<DeletionReport> {
        self.deletion
            .delete(EntityRef::sprint_backlog(sprint_backlog_id))
            .await
    }
}
