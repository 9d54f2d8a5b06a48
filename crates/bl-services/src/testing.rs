//! Fixtures for service tests

use std::sync::Arc;

use bl_core::traits::Id;
use bl_db::{MemoryStore, Repositories};
use bl_models::{
    Epic, ProductBacklog, Project, Role, Sprint, SprintBacklog, Task, TaskStatus, User, UserStory,
};
use chrono::NaiveDate;

pub fn memory_repos() -> (Arc<MemoryStore>, Repositories) {
    let store = Arc::new(MemoryStore::new());
    (store.clone(), Repositories::from_store(store))
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn project(repos: &Repositories, name: &str) -> Project {
    repos.projects.save(Project::new(name)).await.unwrap()
}

pub async fn product_backlog(repos: &Repositories, title: &str) -> ProductBacklog {
    repos
        .product_backlogs
        .save(ProductBacklog::new(title))
        .await
        .unwrap()
}

pub async fn sprint_backlog(repos: &Repositories, title: &str) -> SprintBacklog {
    repos
        .sprint_backlogs
        .save(SprintBacklog::new(title))
        .await
        .unwrap()
}

pub async fn epic(repos: &Repositories, title: &str) -> Epic {
    repos.epics.save(Epic::new(title)).await.unwrap()
}

pub async fn story(repos: &Repositories, title: &str, sprint_backlog_id: Option<Id>) -> UserStory {
    let mut story = UserStory::new(title);
    story.sprint_backlog_id = sprint_backlog_id;
    repos.user_stories.save(story).await.unwrap()
}

pub async fn task(repos: &Repositories, story_id: Id, status: TaskStatus) -> Task {
    repos
        .tasks
        .save(Task::new("task").for_user_story(story_id).with_status(status))
        .await
        .unwrap()
}

pub async fn sprint(
    repos: &Repositories,
    name: &str,
    start: NaiveDate,
    end: NaiveDate,
    sprint_backlog_id: Option<Id>,
) -> Sprint {
    let mut sprint = Sprint::new(name, start, end);
    sprint.sprint_backlog_id = sprint_backlog_id;
    repos.sprints.save(sprint).await.unwrap()
}

pub async fn user(repos: &Repositories, username: &str, role: Role) -> User {
    let mut user = User::new(username, format!("{}@example.com", username), role);
    user.password_hash = "hash".to_string();
    repos.users.save(user).await.unwrap()
}
