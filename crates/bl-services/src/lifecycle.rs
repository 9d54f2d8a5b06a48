//! Creation and field updates of backlog entities
//!
//! Links between entities are made afterwards through the
//! [`RelationshipManager`](crate::RelationshipManager); everything created here
//! starts detached.

use bl_contracts::{
    EpicContract, ProductBacklogContract, ProjectContract, SprintBacklogContract, UserContract,
    UserStoryContract,
};
use bl_core::error::BlError;
use bl_core::result::BlResult;
use bl_core::traits::Id;
use bl_db::Repositories;
use bl_models::{
    Epic, NewUser, NewUserStory, ProductBacklog, Project, Role, SprintBacklog, Statut, User,
    UserStory,
};
use tracing::{info, warn};

use crate::base::{found, non_blank, validate_with};

#[derive(Clone)]
pub struct LifecycleService {
    repos: Repositories,
}

impl LifecycleService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create_project(
        &self,
        name: &str,
        description: Option<String>,
    ) -> BlResult<Project> {
        let mut project = Project::new(name.trim());
        project.description = non_blank(description);
        validate_with(&ProjectContract, &project)?;

        let project = self.repos.projects.save(project).await?;
        info!(project_id = ?project.id, name = %project.name, "project created");
        Ok(project)
    }

    pub async fn create_product_backlog(
        &self,
        title: &str,
        description: Option<String>,
    ) -> BlResult<ProductBacklog> {
        let mut backlog = ProductBacklog::new(title.trim());
        backlog.description = non_blank(description);
        validate_with(&ProductBacklogContract, &backlog)?;

        let backlog = self.repos.product_backlogs.save(backlog).await?;
        info!(product_backlog_id = ?backlog.id, "product backlog created");
        Ok(backlog)
    }

    pub async fn create_epic(
        &self,
        title: &str,
        description: Option<String>,
    ) -> BlResult<Epic> {
        let mut epic = Epic::new(title.trim());
        epic.description = non_blank(description);
        validate_with(&EpicContract, &epic)?;

        let epic = self.repos.epics.save(epic).await?;
        info!(epic_id = ?epic.id, "epic created");
        Ok(epic)
    }

    pub async fn create_sprint_backlog(
        &self,
        title: &str,
        description: Option<String>,
    ) -> BlResult<SprintBacklog> {
        let mut backlog = SprintBacklog::new(title.trim());
        backlog.description = non_blank(description);
        validate_with(&SprintBacklogContract, &backlog)?;

        let backlog = self.repos.sprint_backlogs.save(backlog).await?;
        info!(sprint_backlog_id = ?backlog.id, "sprint backlog created");
        Ok(backlog)
    }

    pub async fn create_user_story(&self, input: NewUserStory) -> BlResult<UserStory> {
        let mut story = UserStory::from(input);
        story.title = story.title.trim().to_string();
        story.description = non_blank(story.description.take());
        story.acceptance_criteria = non_blank(story.acceptance_criteria.take());
        validate_with(&UserStoryContract, &story)?;

        let story = self.repos.user_stories.save(story).await?;
        info!(user_story_id = ?story.id, priority = %story.priority.as_str(), "user story created");
        Ok(story)
    }

    /// Register a user; usernames and emails are unique
    pub async fn register_user(&self, input: NewUser) -> BlResult<User> {
        let mut user = User::from(input);
        user.username = user.username.trim().to_string();
        user.email = user.email.trim().to_lowercase();
        validate_with(&UserContract, &user)?;

        if self
            .repos
            .users
            .find_by_username(&user.username)
            .await?
            .is_some()
        {
            warn!(username = %user.username, "username taken");
            return Err(BlError::conflict(format!(
                "username '{}' is already taken",
                user.username
            )));
        }
        if self.repos.users.find_by_email(&user.email).await?.is_some() {
            warn!(email = %user.email, "email taken");
            return Err(BlError::conflict(format!(
                "email '{}' is already taken",
                user.email
            )));
        }

        let user = self.repos.users.save(user).await?;
        info!(user_id = ?user.id, role = %user.role.as_str(), "user registered");
        Ok(user)
    }

    pub async fn set_user_story_status(
        &self,
        user_story_id: Id,
        status: Statut,
    ) -> BlResult<UserStory> {
        let mut story = found(
            self.repos.user_stories.find_by_id(user_story_id).await?,
            user_story_id,
        )?;
        if story.status == status {
            return Ok(story);
        }

        let previous = std::mem::replace(&mut story.status, status);
        let story = self.repos.user_stories.save(story).await?;
        info!(user_story_id, from = %previous, to = %status, "user story status changed");
        Ok(story)
    }

    pub async fn change_user_role(&self, user_id: Id, role: Role) -> BlResult<User> {
        let mut user = found(self.repos.users.find_by_id(user_id).await?, user_id)?;
        if user.role == role {
            return Ok(user);
        }

        user.role = role;
        let user = self.repos.users.save(user).await?;
        info!(user_id, role = %role.as_str(), "user role changed");
        Ok(user)
    }
}
