//! Deletion policy engine
//!
//! Every parent→child edge of the entity graph carries a policy: either the
//! child is deleted with its parent, or the child's reference to the parent is
//! cleared and the child survives. [`DeletionService::delete`] walks [`EDGES`]
//! for the target's kind, recursing through cascades, then removes the target.

use std::fmt;

use bl_core::error::BlError;
use bl_core::result::BlResult;
use bl_core::traits::{Entity, Id, Identifiable};
use bl_db::Repositories;
use bl_models::{
    Comment, Epic, ProductBacklog, Project, Sprint, SprintBacklog, Task, User, UserStory,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use tracing::{debug, info};

/// Kind of node in the entity graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EntityKind {
    Project,
    ProductBacklog,
    Epic,
    SprintBacklog,
    Sprint,
    UserStory,
    Task,
    Comment,
    User,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => Project::TYPE_NAME,
            Self::ProductBacklog => ProductBacklog::TYPE_NAME,
            Self::Epic => Epic::TYPE_NAME,
            Self::SprintBacklog => SprintBacklog::TYPE_NAME,
            Self::Sprint => Sprint::TYPE_NAME,
            Self::UserStory => UserStory::TYPE_NAME,
            Self::Task => Task::TYPE_NAME,
            Self::Comment => Comment::TYPE_NAME,
            Self::User => User::TYPE_NAME,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed reference to one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: Id,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: Id) -> Self {
        Self { kind, id }
    }

    pub fn project(id: Id) -> Self {
        Self::new(EntityKind::Project, id)
    }

    pub fn product_backlog(id: Id) -> Self {
        Self::new(EntityKind::ProductBacklog, id)
    }

    pub fn epic(id: Id) -> Self {
        Self::new(EntityKind::Epic, id)
    }

    pub fn sprint_backlog(id: Id) -> Self {
        Self::new(EntityKind::SprintBacklog, id)
    }

    pub fn sprint(id: Id) -> Self {
        Self::new(EntityKind::Sprint, id)
    }

    pub fn user_story(id: Id) -> Self {
        Self::new(EntityKind::UserStory, id)
    }

    pub fn task(id: Id) -> Self {
        Self::new(EntityKind::Task, id)
    }

    pub fn comment(id: Id) -> Self {
        Self::new(EntityKind::Comment, id)
    }

    pub fn user(id: Id) -> Self {
        Self::new(EntityKind::User, id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

/// What happens to a child when its parent is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeletionPolicy {
    CascadeDelete,
    DetachOnDelete,
}

/// One parent→child edge and its policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub parent: EntityKind,
    pub child: EntityKind,
    pub policy: DeletionPolicy,
}

const fn edge(parent: EntityKind, child: EntityKind, policy: DeletionPolicy) -> Edge {
    Edge {
        parent,
        child,
        policy,
    }
}

use DeletionPolicy::{CascadeDelete, DetachOnDelete};

/// The policy table, in processing order
pub const EDGES: &[Edge] = &[
    edge(EntityKind::Project, EntityKind::ProductBacklog, DetachOnDelete),
    edge(EntityKind::User, EntityKind::Project, DetachOnDelete),
    edge(EntityKind::User, EntityKind::Task, DetachOnDelete),
    edge(EntityKind::User, EntityKind::Comment, CascadeDelete),
    edge(EntityKind::ProductBacklog, EntityKind::Epic, CascadeDelete),
    edge(EntityKind::ProductBacklog, EntityKind::SprintBacklog, CascadeDelete),
    edge(EntityKind::ProductBacklog, EntityKind::UserStory, DetachOnDelete),
    edge(EntityKind::Epic, EntityKind::UserStory, DetachOnDelete),
    edge(EntityKind::SprintBacklog, EntityKind::UserStory, DetachOnDelete),
    edge(EntityKind::SprintBacklog, EntityKind::Sprint, DetachOnDelete),
    edge(EntityKind::UserStory, EntityKind::Task, CascadeDelete),
    edge(EntityKind::Task, EntityKind::Comment, CascadeDelete),
];

/// Policy of the `parent → child` edge, if the graph has one
pub fn policy_for(parent: EntityKind, child: EntityKind) -> Option<DeletionPolicy> {
    EDGES
        .iter()
        .find(|e| e.parent == parent && e.child == child)
        .map(|e| e.policy)
}

/// Everything a deletion touched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionReport {
    /// Removed entities, children before parents, the target last
    pub deleted: Vec<EntityRef>,
    /// Surviving entities whose reference to a deleted entity was cleared
    pub detached: Vec<EntityRef>,
}

impl DeletionReport {
    pub fn was_deleted(&self, entity: EntityRef) -> bool {
        self.deleted.contains(&entity)
    }

    pub fn was_detached(&self, entity: EntityRef) -> bool {
        self.detached.contains(&entity)
    }

    fn record_detached(&mut self, entity: EntityRef) {
        if !self.detached.contains(&entity) {
            self.detached.push(entity);
        }
    }
}

/// Deletes entities according to [`EDGES`]
#[derive(Clone)]
pub struct DeletionService {
    repos: Repositories,
}

impl DeletionService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Delete `target` and apply the policy of every edge below it
    ///
    /// `NotFound` if the target does not exist.
    pub async fn delete(&self, target: EntityRef) -> BlResult<DeletionReport> {
        if !self.exists(target).await? {
            return Err(BlError::NotFound {
                entity: target.kind.as_str(),
                id: target.id,
            });
        }

        let mut report = DeletionReport::default();
        self.delete_recursive(target, &mut report).await?;

        info!(
            target = %target,
            deleted = report.deleted.len(),
            detached = report.detached.len(),
            "entity deleted"
        );
        Ok(report)
    }

    fn delete_recursive<'a>(
        &'a self,
        target: EntityRef,
        report: &'a mut DeletionReport,
    ) -> BoxFuture<'a, BlResult<()>> {
        async move {
            // Reached twice through different cascades
            if report.was_deleted(target) || !self.exists(target).await? {
                debug!(target = %target, "already gone");
                return Ok(());
            }

            for edge in EDGES.iter().filter(|e| e.parent == target.kind) {
                for child_id in self.children(edge, target.id).await? {
                    let child = EntityRef::new(edge.child, child_id);
                    match edge.policy {
                        CascadeDelete => self.delete_recursive(child, report).await?,
                        DetachOnDelete => {
                            if self.detach(edge, child_id).await? {
                                report.record_detached(child);
                            }
                        }
                    }
                }
            }

            self.clear_mirror(target, report).await?;
            self.remove(target).await?;
            debug!(target = %target, "removed");
            report.deleted.push(target);
            Ok(())
        }
        .boxed()
    }

    async fn exists(&self, target: EntityRef) -> BlResult<bool> {
        let repos = &self.repos;
        let id = target.id;
        let exists = match target.kind {
            EntityKind::Project => repos.projects.exists(id).await?,
            EntityKind::ProductBacklog => repos.product_backlogs.exists(id).await?,
            EntityKind::Epic => repos.epics.exists(id).await?,
            EntityKind::SprintBacklog => repos.sprint_backlogs.exists(id).await?,
            EntityKind::Sprint => repos.sprints.exists(id).await?,
            EntityKind::UserStory => repos.user_stories.exists(id).await?,
            EntityKind::Task => repos.tasks.exists(id).await?,
            EntityKind::Comment => repos.comments.exists(id).await?,
            EntityKind::User => repos.users.exists(id).await?,
        };
        Ok(exists)
    }

    async fn remove(&self, target: EntityRef) -> BlResult<()> {
        let repos = &self.repos;
        let id = target.id;
        match target.kind {
            EntityKind::Project => repos.projects.delete(id).await?,
            EntityKind::ProductBacklog => repos.product_backlogs.delete(id).await?,
            EntityKind::Epic => repos.epics.delete(id).await?,
            EntityKind::SprintBacklog => repos.sprint_backlogs.delete(id).await?,
            EntityKind::Sprint => repos.sprints.delete(id).await?,
            EntityKind::UserStory => repos.user_stories.delete(id).await?,
            EntityKind::Task => repos.tasks.delete(id).await?,
            EntityKind::Comment => repos.comments.delete(id).await?,
            EntityKind::User => repos.users.delete(id).await?,
        }
        Ok(())
    }

    /// Ids of the children of `parent_id` along `edge`
    async fn children(&self, edge: &Edge, parent_id: Id) -> BlResult<Vec<Id>> {
        let repos = &self.repos;
        let ids = match (edge.parent, edge.child) {
            (EntityKind::Project, EntityKind::ProductBacklog) => {
                let backlog_id = repos
                    .projects
                    .find_by_id(parent_id)
                    .await?
                    .and_then(|p| p.product_backlog_id);
                backlog_id.into_iter().collect()
            }
            (EntityKind::User, EntityKind::Project) => {
                ids(repos.projects.find_by_owner(parent_id).await?)
            }
            (EntityKind::User, EntityKind::Task) => {
                ids(repos.tasks.find_by_assignee(parent_id).await?)
            }
            (EntityKind::User, EntityKind::Comment) => {
                ids(repos.comments.find_by_author(parent_id).await?)
            }
            (EntityKind::ProductBacklog, EntityKind::Epic) => {
                ids(repos.epics.find_by_product_backlog(parent_id).await?)
            }
            (EntityKind::ProductBacklog, EntityKind::SprintBacklog) => {
                ids(repos.sprint_backlogs.find_by_product_backlog(parent_id).await?)
            }
            (EntityKind::ProductBacklog, EntityKind::UserStory) => {
                ids(repos.user_stories.find_by_product_backlog(parent_id).await?)
            }
            (EntityKind::Epic, EntityKind::UserStory) => {
                ids(repos.user_stories.find_by_epic(parent_id).await?)
            }
            (EntityKind::SprintBacklog, EntityKind::UserStory) => {
                ids(repos.user_stories.find_by_sprint_backlog(parent_id).await?)
            }
            (EntityKind::SprintBacklog, EntityKind::Sprint) => {
                ids(repos.sprints.find_by_sprint_backlog(parent_id).await?)
            }
            (EntityKind::UserStory, EntityKind::Task) => {
                ids(repos.tasks.find_by_user_story(parent_id).await?)
            }
            (EntityKind::Task, EntityKind::Comment) => {
                ids(repos.comments.find_by_task(parent_id).await?)
            }
            (parent, child) => {
                return Err(BlError::Internal(format!(
                    "no traversal for edge {} -> {}",
                    parent, child
                )))
            }
        };
        Ok(ids)
    }

    /// Clear the child's reference along `edge`; false if the child is gone
    async fn detach(&self, edge: &Edge, child_id: Id) -> BlResult<bool> {
        let repos = &self.repos;
        match (edge.parent, edge.child) {
            (EntityKind::Project, EntityKind::ProductBacklog) => {
                let Some(mut backlog) = repos.product_backlogs.find_by_id(child_id).await? else {
                    return Ok(false);
                };
                backlog.project_id = None;
                repos.product_backlogs.save(backlog).await?;
            }
            (EntityKind::User, EntityKind::Project) => {
                let Some(mut project) = repos.projects.find_by_id(child_id).await? else {
                    return Ok(false);
                };
                project.owner_id = None;
                repos.projects.save(project).await?;
            }
            (EntityKind::User, EntityKind::Task) => {
                let Some(mut task) = repos.tasks.find_by_id(child_id).await? else {
                    return Ok(false);
                };
                task.assignee_id = None;
                repos.tasks.save(task).await?;
            }
            (
                EntityKind::ProductBacklog | EntityKind::Epic | EntityKind::SprintBacklog,
                EntityKind::UserStory,
            ) => {
                let Some(mut story) = repos.user_stories.find_by_id(child_id).await? else {
                    return Ok(false);
                };
                match edge.parent {
                    EntityKind::ProductBacklog => story.product_backlog_id = None,
                    EntityKind::Epic => story.epic_id = None,
                    _ => story.sprint_backlog_id = None,
                }
                repos.user_stories.save(story).await?;
            }
            (EntityKind::SprintBacklog, EntityKind::Sprint) => {
                let Some(mut sprint) = repos.sprints.find_by_id(child_id).await? else {
                    return Ok(false);
                };
                sprint.sprint_backlog_id = None;
                repos.sprints.save(sprint).await?;
            }
            (parent, child) => {
                return Err(BlError::Internal(format!(
                    "edge {} -> {} cannot be detached",
                    parent, child
                )))
            }
        }
        Ok(true)
    }

    /// The 1:1 project link is stored on both sides; deleting the backlog
    /// side must clear the project's copy too
    async fn clear_mirror(&self, target: EntityRef, report: &mut DeletionReport) -> BlResult<()> {
        if target.kind != EntityKind::ProductBacklog {
            return Ok(());
        }

        if let Some(mut project) = self
            .repos
            .projects
            .find_by_product_backlog(target.id)
            .await?
        {
            let project_id = project.id();
            project.product_backlog_id = None;
            self.repos.projects.save(project).await?;
            if let Some(project_id) = project_id {
                report.record_detached(EntityRef::project(project_id));
            }
        }
        Ok(())
    }
}

fn ids<T: Identifiable>(entities: Vec<T>) -> Vec<Id> {
    entities.iter().filter_map(Identifiable::id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use bl_models::{Role, TaskStatus};

    #[test]
    fn test_policy_table() {
        assert_eq!(
            policy_for(EntityKind::ProductBacklog, EntityKind::Epic),
            Some(CascadeDelete)
        );
        assert_eq!(
            policy_for(EntityKind::SprintBacklog, EntityKind::UserStory),
            Some(DetachOnDelete)
        );
        assert_eq!(
            policy_for(EntityKind::SprintBacklog, EntityKind::Sprint),
            Some(DetachOnDelete)
        );
        assert_eq!(policy_for(EntityKind::Sprint, EntityKind::Task), None);
        assert_eq!(EDGES.len(), 12);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let (_, repos) = memory_repos();
        let err = DeletionService::new(repos)
            .delete(EntityRef::epic(3))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_sprint_backlog_detaches_stories_and_sprints() {
        let (_, repos) = memory_repos();
        let sb = sprint_backlog(&repos, "SB").await.id.unwrap();
        let s1 = story(&repos, "a", Some(sb)).await.id.unwrap();
        let s2 = story(&repos, "b", Some(sb)).await.id.unwrap();
        let sp = sprint(&repos, "S1", date(2025, 1, 1), date(2025, 1, 14), Some(sb))
            .await
            .id
            .unwrap();

        let report = DeletionService::new(repos.clone())
            .delete(EntityRef::sprint_backlog(sb))
            .await
            .unwrap();

        assert_eq!(report.deleted, vec![EntityRef::sprint_backlog(sb)]);
        assert!(report.was_detached(EntityRef::user_story(s1)));
        assert!(report.was_detached(EntityRef::user_story(s2)));
        assert!(report.was_detached(EntityRef::sprint(sp)));

        assert!(repos.sprint_backlogs.find_by_id(sb).await.unwrap().is_none());
        for id in [s1, s2] {
            let story = repos.user_stories.find_by_id(id).await.unwrap().unwrap();
            assert_eq!(story.sprint_backlog_id, None);
        }
        let sprint = repos.sprints.find_by_id(sp).await.unwrap().unwrap();
        assert!(!sprint.is_scheduled());
    }

    #[tokio::test]
    async fn test_product_backlog_cascade() {
        let (_, repos) = memory_repos();
        let project = project(&repos, "Apollo").await;
        let mut pb = product_backlog(&repos, "Main").await;
        let pb_id = pb.id.unwrap();

        let mut linked = project.clone();
        linked.product_backlog_id = Some(pb_id);
        let project_id = repos.projects.save(linked).await.unwrap().id.unwrap();
        pb.project_id = Some(project_id);
        repos.product_backlogs.save(pb).await.unwrap();

        let mut epic = Epic::new("Checkout");
        epic.product_backlog_id = Some(pb_id);
        let epic_id = repos.epics.save(epic).await.unwrap().id.unwrap();

        let mut sb = SprintBacklog::new("SB");
        sb.product_backlog_id = Some(pb_id);
        let sb_id = repos.sprint_backlogs.save(sb).await.unwrap().id.unwrap();

        let mut planned = UserStory::new("planned").in_sprint_backlog(sb_id);
        planned.product_backlog_id = Some(pb_id);
        planned.epic_id = Some(epic_id);
        let story_id = repos.user_stories.save(planned).await.unwrap().id.unwrap();

        let report = DeletionService::new(repos.clone())
            .delete(EntityRef::product_backlog(pb_id))
            .await
            .unwrap();

        assert!(report.was_deleted(EntityRef::epic(epic_id)));
        assert!(report.was_deleted(EntityRef::sprint_backlog(sb_id)));
        assert_eq!(report.deleted.last(), Some(&EntityRef::product_backlog(pb_id)));
        assert!(report.was_detached(EntityRef::user_story(story_id)));
        assert!(report.was_detached(EntityRef::project(project_id)));

        let story = repos.user_stories.find_by_id(story_id).await.unwrap().unwrap();
        assert_eq!(story.product_backlog_id, None);
        assert_eq!(story.epic_id, None);
        assert_eq!(story.sprint_backlog_id, None);

        let project = repos.projects.find_by_id(project_id).await.unwrap().unwrap();
        assert_eq!(project.product_backlog_id, None);
        assert_eq!(repos.epics.count().await.unwrap(), 0);
        assert_eq!(repos.sprint_backlogs.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_user_story_cascades_to_tasks_and_comments() {
        let (_, repos) = memory_repos();
        let author = user(&repos, "ada", Role::Developer).await.id.unwrap();
        let story_id = story(&repos, "Login", None).await.id.unwrap();
        let task_id = task(&repos, story_id, TaskStatus::ToDo).await.id.unwrap();
        let comment_id = repos
            .comments
            .save(Comment::new(task_id, author, "first"))
            .await
            .unwrap()
            .id
            .unwrap();

        let report = DeletionService::new(repos.clone())
            .delete(EntityRef::user_story(story_id))
            .await
            .unwrap();

        assert_eq!(
            report.deleted,
            vec![
                EntityRef::comment(comment_id),
                EntityRef::task(task_id),
                EntityRef::user_story(story_id),
            ]
        );
        assert_eq!(repos.tasks.count().await.unwrap(), 0);
        assert_eq!(repos.comments.count().await.unwrap(), 0);
        assert!(repos.users.exists(author).await.unwrap());
    }

    #[tokio::test]
    async fn test_user_deletion() {
        let (_, repos) = memory_repos();
        let owner = user(&repos, "ada", Role::ProductOwner).await.id.unwrap();

        let mut owned = Project::new("Apollo");
        owned.owner_id = Some(owner);
        let project_id = repos.projects.save(owned).await.unwrap().id.unwrap();

        let story_id = story(&repos, "Login", None).await.id.unwrap();
        let mut assigned = task(&repos, story_id, TaskStatus::InProgress).await;
        assigned.assignee_id = Some(owner);
        let task_id = repos.tasks.save(assigned).await.unwrap().id.unwrap();
        repos
            .comments
            .save(Comment::new(task_id, owner, "mine"))
            .await
            .unwrap();

        let report = DeletionService::new(repos.clone())
            .delete(EntityRef::user(owner))
            .await
            .unwrap();

        assert!(report.was_detached(EntityRef::project(project_id)));
        assert!(report.was_detached(EntityRef::task(task_id)));
        assert_eq!(repos.comments.count().await.unwrap(), 0);

        let project = repos.projects.find_by_id(project_id).await.unwrap().unwrap();
        assert_eq!(project.owner_id, None);
        let task = repos.tasks.find_by_id(task_id).await.unwrap().unwrap();
        assert_eq!(task.assignee_id, None);
    }
}
