//! Repository traits
//!
//! One generic CRUD trait plus one trait per entity carrying the filtered
//! queries the engine needs. Implementations must be `Send + Sync`; the engine
//! holds them behind `Arc<dyn …>`.

use std::sync::Arc;

use async_trait::async_trait;
use bl_core::error::{BlError, ValidationErrors};
use bl_core::traits::{Entity, Id};
use bl_models::{
    Comment, Epic, ProductBacklog, Project, Sprint, SprintBacklog, Task, User, UserStory,
};

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {entity} with id={id}")]
    NotFound { entity: &'static str, id: Id },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl RepositoryError {
    pub fn not_found<T: Entity>(id: Id) -> Self {
        RepositoryError::NotFound {
            entity: T::TYPE_NAME,
            id,
        }
    }
}

impl From<RepositoryError> for BlError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => BlError::NotFound { entity, id },
            RepositoryError::Conflict(message) => BlError::Conflict { message },
            RepositoryError::Validation(message) => {
                let mut errors = ValidationErrors::new();
                errors.add_base(message);
                BlError::InvalidArgument(errors)
            }
            RepositoryError::Database(e) => BlError::Database(e.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Base repository trait for CRUD operations
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Find an entity by ID
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<T>>;

    /// All entities, ordered by id
    async fn find_all(&self) -> RepositoryResult<Vec<T>>;

    /// Insert (when `id` is `None`) or update, returning the stored record
    ///
    /// Identity is assigned on the first save and stable afterwards.
    async fn save(&self, entity: T) -> RepositoryResult<T>;

    /// Delete an entity by ID
    async fn delete(&self, id: Id) -> RepositoryResult<()>;

    /// Count all entities
    async fn count(&self) -> RepositoryResult<u64>;

    /// Check if an entity exists
    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

#[async_trait]
pub trait ProjectRepository: Repository<Project> {
    async fn find_by_owner(&self, user_id: Id) -> RepositoryResult<Vec<Project>>;

    /// Project linked to the given product backlog, if any
    async fn find_by_product_backlog(
        &self,
        product_backlog_id: Id,
    ) -> RepositoryResult<Option<Project>>;
}

pub trait ProductBacklogRepository: Repository<ProductBacklog> {}

#[async_trait]
pub trait EpicRepository: Repository<Epic> {
    async fn find_by_product_backlog(&self, product_backlog_id: Id) -> RepositoryResult<Vec<Epic>>;
}

#[async_trait]
pub trait SprintBacklogRepository: Repository<SprintBacklog> {
    async fn find_by_product_backlog(
        &self,
        product_backlog_id: Id,
    ) -> RepositoryResult<Vec<SprintBacklog>>;
}

#[async_trait]
pub trait SprintRepository: Repository<Sprint> {
    /// Live sibling set of a sprint backlog
    async fn find_by_sprint_backlog(&self, sprint_backlog_id: Id) -> RepositoryResult<Vec<Sprint>>;
}

#[async_trait]
pub trait UserStoryRepository: Repository<UserStory> {
    async fn find_by_sprint_backlog(
        &self,
        sprint_backlog_id: Id,
    ) -> RepositoryResult<Vec<UserStory>>;

    async fn count_by_sprint_backlog(&self, sprint_backlog_id: Id) -> RepositoryResult<u64>;

    /// Stories not planned into any sprint backlog
    async fn find_without_sprint_backlog(&self) -> RepositoryResult<Vec<UserStory>>;

    async fn find_by_epic(&self, epic_id: Id) -> RepositoryResult<Vec<UserStory>>;

    async fn find_by_product_backlog(
        &self,
        product_backlog_id: Id,
    ) -> RepositoryResult<Vec<UserStory>>;
}

#[async_trait]
pub trait TaskRepository: Repository<Task> {
    async fn find_by_user_story(&self, user_story_id: Id) -> RepositoryResult<Vec<Task>>;

    async fn find_by_assignee(&self, user_id: Id) -> RepositoryResult<Vec<Task>>;
}

#[async_trait]
pub trait CommentRepository: Repository<Comment> {
    /// Comments on a task in creation order
    async fn find_by_task(&self, task_id: Id) -> RepositoryResult<Vec<Comment>>;

    async fn find_by_author(&self, user_id: Id) -> RepositoryResult<Vec<Comment>>;
}

#[async_trait]
pub trait UserRepository: Repository<User> {
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
}

/// The full set of repositories the engine is constructed with
#[derive(Clone)]
pub struct Repositories {
    pub projects: Arc<dyn ProjectRepository>,
    pub product_backlogs: Arc<dyn ProductBacklogRepository>,
    pub epics: Arc<dyn EpicRepository>,
    pub sprint_backlogs: Arc<dyn SprintBacklogRepository>,
    pub sprints: Arc<dyn SprintRepository>,
    pub user_stories: Arc<dyn UserStoryRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Serve every repository from one store
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: ProjectRepository
            + ProductBacklogRepository
            + EpicRepository
            + SprintBacklogRepository
            + SprintRepository
            + UserStoryRepository
            + TaskRepository
            + CommentRepository
            + UserRepository
            + 'static,
    {
        Self {
            projects: store.clone(),
            product_backlogs: store.clone(),
            epics: store.clone(),
            sprint_backlogs: store.clone(),
            sprints: store.clone(),
            user_stories: store.clone(),
            tasks: store.clone(),
            comments: store.clone(),
            users: store,
        }
    }
}
