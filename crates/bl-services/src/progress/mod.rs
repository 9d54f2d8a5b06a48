//! Progress aggregator
//!
//! Read-only summaries over the entity graph. Status summaries carry one entry
//! per variant, zero-filled. Sprint-backlog-scoped queries fail with
//! `NotFound` for an unknown backlog.

mod statistics;

pub use statistics::{EffortSummary, ProductBacklogStatistics, ProjectStatistics};

use std::collections::BTreeMap;

use bl_core::result::BlResult;
use bl_core::traits::Id;
use bl_db::Repositories;
use bl_models::{Statut, Task, TaskStatus};
use futures::future::try_join_all;
use tracing::debug;

use crate::base::found;

/// Percentage of finished tasks; exactly `0.0` when there are none
fn completion(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let finished = tasks.iter().filter(|task| task.is_done()).count();
    (finished as f64 / tasks.len() as f64 * 100.0).clamp(0.0, 100.0)
}

/// Status summaries and completion figures
#[derive(Clone)]
pub struct ProgressAggregator {
    repos: Repositories,
}

impl ProgressAggregator {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    async fn ensure_sprint_backlog(&self, sprint_backlog_id: Id) -> BlResult<()> {
        found(
            self.repos.sprint_backlogs.find_by_id(sprint_backlog_id).await?,
            sprint_backlog_id,
        )?;
        Ok(())
    }

    /// Every task of every story planned into the backlog
    async fn backlog_tasks(&self, sprint_backlog_id: Id) -> BlResult<Vec<Task>> {
        self.ensure_sprint_backlog(sprint_backlog_id).await?;

        let stories = self
            .repos
            .user_stories
            .find_by_sprint_backlog(sprint_backlog_id)
            .await?;
        let per_story = try_join_all(
            stories
                .iter()
                .filter_map(|story| story.id)
                .map(|story_id| self.repos.tasks.find_by_user_story(story_id)),
        )
        .await?;

        Ok(per_story.into_iter().flatten().collect())
    }

    pub async fn task_status_summary(
        &self,
        sprint_backlog_id: Id,
    ) -> BlResult<BTreeMap<TaskStatus, u64>> {
        let tasks = self.backlog_tasks(sprint_backlog_id).await?;

        let mut summary: BTreeMap<TaskStatus, u64> =
            TaskStatus::ALL.iter().map(|status| (*status, 0)).collect();
        for task in &tasks {
            *summary.entry(task.status).or_default() += 1;
        }
        Ok(summary)
    }

    pub async fn user_story_status_summary(
        &self,
        sprint_backlog_id: Id,
    ) -> BlResult<BTreeMap<Statut, u64>> {
        self.ensure_sprint_backlog(sprint_backlog_id).await?;
        let stories = self
            .repos
            .user_stories
            .find_by_sprint_backlog(sprint_backlog_id)
            .await?;

        let mut summary: BTreeMap<Statut, u64> =
            Statut::ALL.iter().map(|status| (*status, 0)).collect();
        for story in &stories {
            *summary.entry(story.status).or_default() += 1;
        }
        Ok(summary)
    }

    pub async fn tasks_by_status(
        &self,
        sprint_backlog_id: Id,
        status: TaskStatus,
    ) -> BlResult<Vec<Task>> {
        let mut tasks = self.backlog_tasks(sprint_backlog_id).await?;
        tasks.retain(|task| task.status == status);
        Ok(tasks)
    }

    pub async fn count_total_user_stories(&self, sprint_backlog_id: Id) -> BlResult<u64> {
        self.ensure_sprint_backlog(sprint_backlog_id).await?;
        Ok(self
            .repos
            .user_stories
            .count_by_sprint_backlog(sprint_backlog_id)
            .await?)
    }

    pub async fn count_total_tasks(&self, sprint_backlog_id: Id) -> BlResult<u64> {
        Ok(self.backlog_tasks(sprint_backlog_id).await?.len() as u64)
    }

    /// Share of finished tasks in the backlog, in percent
    pub async fn calculate_sprint_progress(&self, sprint_backlog_id: Id) -> BlResult<f64> {
        let tasks = self.backlog_tasks(sprint_backlog_id).await?;
        let progress = completion(&tasks);
        debug!(sprint_backlog_id, tasks = tasks.len(), progress, "sprint progress");
        Ok(progress)
    }

    /// Share of finished tasks of one story, in percent
    pub async fn user_story_progress(&self, user_story_id: Id) -> BlResult<f64> {
        found(
            self.repos.user_stories.find_by_id(user_story_id).await?,
            user_story_id,
        )?;
        let tasks = self.repos.tasks.find_by_user_story(user_story_id).await?;
        Ok(completion(&tasks))
    }

    pub async fn effort_summary(&self, sprint_backlog_id: Id) -> BlResult<EffortSummary> {
        let tasks = self.backlog_tasks(sprint_backlog_id).await?;

        Ok(tasks.iter().fold(EffortSummary::default(), |mut effort, task| {
            if let Some(estimate) = task.estimated_hours {
                effort.estimated_hours += estimate;
                effort.estimated_tasks += 1;
            }
            effort.logged_hours += task.logged_hours;
            effort
        }))
    }

    /// Totals below a product backlog; all zeros for an unknown id
    pub async fn product_backlog_sprint_statistics(
        &self,
        product_backlog_id: Id,
    ) -> BlResult<ProductBacklogStatistics> {
        let sprint_backlogs = self
            .repos
            .sprint_backlogs
            .find_by_product_backlog(product_backlog_id)
            .await?;

        let mut stats = ProductBacklogStatistics {
            total_sprint_backlogs: sprint_backlogs.len() as u64,
            ..Default::default()
        };
        for sprint_backlog_id in sprint_backlogs.iter().filter_map(|sb| sb.id) {
            stats.total_user_stories += self
                .repos
                .user_stories
                .count_by_sprint_backlog(sprint_backlog_id)
                .await?;
            stats.total_sprints += self
                .repos
                .sprints
                .find_by_sprint_backlog(sprint_backlog_id)
                .await?
                .len() as u64;
        }
        Ok(stats)
    }

    pub async fn project_statistics(&self) -> BlResult<ProjectStatistics> {
        let projects = self.repos.projects.find_all().await?;

        let with_backlog = projects.iter().filter(|p| p.has_backlog()).count() as u64;
        Ok(ProjectStatistics {
            total_projects: projects.len() as u64,
            projects_with_backlog: with_backlog,
            projects_without_backlog: projects.len() as u64 - with_backlog,
            projects_with_owner: projects.iter().filter(|p| p.has_owner()).count() as u64,
        })
    }
}
