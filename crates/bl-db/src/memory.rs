//! In-memory store
//!
//! One `parking_lot::RwLock`-guarded table per entity with its own id
//! sequence. Mirrors the PostgreSQL store closely enough for the engine's
//! tests: ids start at 1 per table, usernames and emails are unique, deleting
//! a missing row is `NotFound`. No foreign keys are enforced.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use async_trait::async_trait;
use bl_core::traits::{Entity, Id};
use bl_models::{
    Comment, Epic, ProductBacklog, Project, Sprint, SprintBacklog, Task, User, UserStory,
};
use chrono::Utc;
use parking_lot::RwLock;

use crate::repository::*;

mod table {
    use super::*;

    pub struct Table<T> {
        pub rows: RwLock<BTreeMap<Id, T>>,
        pub next_id: AtomicI64,
    }

    impl<T: Entity> Table<T> {
        pub fn new() -> Self {
            Self {
                rows: RwLock::new(BTreeMap::new()),
                next_id: AtomicI64::new(1),
            }
        }

        pub fn get(&self, id: Id) -> Option<T> {
            self.rows.read().get(&id).cloned()
        }

        pub fn select(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
            self.rows
                .read()
                .values()
                .filter(|row| predicate(row))
                .cloned()
                .collect()
        }

        pub fn first(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
            self.rows.read().values().find(|row| predicate(row)).cloned()
        }

        pub fn count_where(&self, predicate: impl Fn(&T) -> bool) -> u64 {
            self.rows.read().values().filter(|row| predicate(row)).count() as u64
        }
    }

    /// Routes a generic repository call to the table holding `T`
    pub trait HasTable<T: Entity>: Send + Sync {
        fn table(&self) -> &Table<T>;

        /// Unique-constraint check, run under the table's write lock
        fn conflict(_rows: &BTreeMap<Id, T>, _candidate: &T) -> Option<String> {
            None
        }
    }
}

use table::{HasTable, Table};

/// In-memory implementation of every repository trait
pub struct MemoryStore {
    projects: Table<Project>,
    product_backlogs: Table<ProductBacklog>,
    epics: Table<Epic>,
    sprint_backlogs: Table<SprintBacklog>,
    sprints: Table<Sprint>,
    user_stories: Table<UserStory>,
    tasks: Table<Task>,
    comments: Table<Comment>,
    users: Table<User>,
    writes: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            projects: Table::new(),
            product_backlogs: Table::new(),
            epics: Table::new(),
            sprint_backlogs: Table::new(),
            sprints: Table::new(),
            user_stories: Table::new(),
            tasks: Table::new(),
            comments: Table::new(),
            users: Table::new(),
            writes: AtomicU64::new(0),
        }
    }

    /// Number of saves and deletes performed so far
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }
}

macro_rules! has_table {
    ($ty:ty, $field:ident) => {
        impl HasTable<$ty> for MemoryStore {
            fn table(&self) -> &Table<$ty> {
                &self.$field
            }
        }
    };
}

has_table!(Project, projects);
has_table!(ProductBacklog, product_backlogs);
has_table!(Epic, epics);
has_table!(SprintBacklog, sprint_backlogs);
has_table!(Sprint, sprints);
has_table!(UserStory, user_stories);
has_table!(Task, tasks);
has_table!(Comment, comments);

impl HasTable<User> for MemoryStore {
    fn table(&self) -> &Table<User> {
        &self.users
    }

    fn conflict(rows: &BTreeMap<Id, User>, candidate: &User) -> Option<String> {
        rows.values()
            .filter(|existing| existing.id != candidate.id)
            .find_map(|existing| {
                if existing.username == candidate.username {
                    Some(format!("username '{}' is already taken", candidate.username))
                } else if existing.email == candidate.email {
                    Some(format!("email '{}' is already taken", candidate.email))
                } else {
                    None
                }
            })
    }
}

#[async_trait]
impl<T> Repository<T> for MemoryStore
where
    T: Entity,
    MemoryStore: HasTable<T>,
{
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<T>> {
        Ok(HasTable::<T>::table(self).get(id))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<T>> {
        Ok(HasTable::<T>::table(self).rows.read().values().cloned().collect())
    }

    async fn save(&self, mut entity: T) -> RepositoryResult<T> {
        let table = HasTable::<T>::table(self);
        let mut rows = table.rows.write();

        if let Some(message) = <Self as HasTable<T>>::conflict(&rows, &entity) {
            return Err(RepositoryError::Conflict(message));
        }

        let id = match entity.id() {
            Some(id) => id,
            None => {
                let id = table.next_id.fetch_add(1, Ordering::SeqCst);
                entity.set_id(id);
                id
            }
        };
        entity.touch(Utc::now());
        rows.insert(id, entity.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);

        tracing::trace!(table = T::TABLE_NAME, id, "saved");
        Ok(entity)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let removed = HasTable::<T>::table(self).rows.write().remove(&id);
        match removed {
            Some(_) => {
                self.writes.fetch_add(1, Ordering::SeqCst);
                tracing::trace!(table = T::TABLE_NAME, id, "deleted");
                Ok(())
            }
            None => Err(RepositoryError::not_found::<T>(id)),
        }
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(HasTable::<T>::table(self).rows.read().len() as u64)
    }
}

#[async_trait]
impl ProjectRepository for MemoryStore {
    async fn find_by_owner(&self, user_id: Id) -> RepositoryResult<Vec<Project>> {
        Ok(self.projects.select(|p| p.owner_id == Some(user_id)))
    }

    async fn find_by_product_backlog(
        &self,
        product_backlog_id: Id,
    ) -> RepositoryResult<Option<Project>> {
        Ok(self
            .projects
            .first(|p| p.product_backlog_id == Some(product_backlog_id)))
    }
}

impl ProductBacklogRepository for MemoryStore {}

#[async_trait]
impl EpicRepository for MemoryStore {
    async fn find_by_product_backlog(&self, product_backlog_id: Id) -> RepositoryResult<Vec<Epic>> {
        Ok(self
            .epics
            .select(|e| e.product_backlog_id == Some(product_backlog_id)))
    }
}

#[async_trait]
impl SprintBacklogRepository for MemoryStore {
    async fn find_by_product_backlog(
        &self,
        product_backlog_id: Id,
    ) -> RepositoryResult<Vec<SprintBacklog>> {
        Ok(self
            .sprint_backlogs
            .select(|sb| sb.product_backlog_id == Some(product_backlog_id)))
    }
}

#[async_trait]
impl SprintRepository for MemoryStore {
    async fn find_by_sprint_backlog(&self, sprint_backlog_id: Id) -> RepositoryResult<Vec<Sprint>> {
        Ok(self
            .sprints
            .select(|s| s.sprint_backlog_id == Some(sprint_backlog_id)))
    }
}

#[async_trait]
impl UserStoryRepository for MemoryStore {
    async fn find_by_sprint_backlog(
        &self,
        sprint_backlog_id: Id,
    ) -> RepositoryResult<Vec<UserStory>> {
        Ok(self
            .user_stories
            .select(|us| us.sprint_backlog_id == Some(sprint_backlog_id)))
    }

    async fn count_by_sprint_backlog(&self, sprint_backlog_id: Id) -> RepositoryResult<u64> {
        Ok(self
            .user_stories
            .count_where(|us| us.sprint_backlog_id == Some(sprint_backlog_id)))
    }

    async fn find_without_sprint_backlog(&self) -> RepositoryResult<Vec<UserStory>> {
        Ok(self.user_stories.select(|us| us.sprint_backlog_id.is_none()))
    }

    async fn find_by_epic(&self, epic_id: Id) -> RepositoryResult<Vec<UserStory>> {
        Ok(self.user_stories.select(|us| us.epic_id == Some(epic_id)))
    }

    async fn find_by_product_backlog(
        &self,
        product_backlog_id: Id,
    ) -> RepositoryResult<Vec<UserStory>> {
        Ok(self
            .user_stories
            .select(|us| us.product_backlog_id == Some(product_backlog_id)))
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn find_by_user_story(&self, user_story_id: Id) -> RepositoryResult<Vec<Task>> {
        Ok(self.tasks.select(|t| t.user_story_id == Some(user_story_id)))
    }

    async fn find_by_assignee(&self, user_id: Id) -> RepositoryResult<Vec<Task>> {
        Ok(self.tasks.select(|t| t.assignee_id == Some(user_id)))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn find_by_task(&self, task_id: Id) -> RepositoryResult<Vec<Comment>> {
        Ok(self.comments.select(|c| c.task_id == task_id))
    }

    async fn find_by_author(&self, user_id: Id) -> RepositoryResult<Vec<Comment>> {
        Ok(self.comments.select(|c| c.author_id == user_id))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        Ok(self.users.first(|u| u.username == username))
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self.users.first(|u| u.email == email))
    }
}
