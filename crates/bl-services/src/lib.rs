//! # bl-services
//!
//! The backlog engine: services that keep the entity graph consistent.
//!
//! - [`RelationshipManager`]: the single choke point for every cross-entity
//!   link, keeping both ends of an edge in agreement
//! - [`SprintScheduler`]: sprint date validation, overlap detection and
//!   attachment to sprint backlogs
//! - [`ProgressAggregator`]: read-only status summaries and completion figures
//! - [`DeletionService`]: cascade/detach deletion driven by a per-edge policy
//!   table
//! - [`LifecycleService`] and [`TaskService`]: creation and field updates
//!
//! Every service is built from a [`Repositories`](bl_db::Repositories) bundle
//! and spawns nothing; the only suspension points are storage calls.

pub mod base;
pub mod deletion;
pub mod lifecycle;
pub mod progress;
pub mod relationships;
pub mod scheduling;
pub mod tasks;

#[cfg(test)]
pub(crate) mod testing;

use bl_core::config::SchedulingConfig;
use bl_db::Repositories;

pub use deletion::{DeletionPolicy, DeletionReport, DeletionService, EntityKind, EntityRef};
pub use lifecycle::LifecycleService;
pub use progress::{EffortSummary, ProductBacklogStatistics, ProgressAggregator, ProjectStatistics};
pub use relationships::RelationshipManager;
pub use scheduling::{CreateSprintParams, SprintBacklogLocks, SprintChanges, SprintScheduler};
pub use tasks::TaskService;

/// All engine services over one set of repositories
#[derive(Clone)]
pub struct Engine {
    pub relationships: RelationshipManager,
    pub scheduler: SprintScheduler,
    pub progress: ProgressAggregator,
    pub deletion: DeletionService,
    pub lifecycle: LifecycleService,
    pub tasks: TaskService,
}

impl Engine {
    pub fn new(repos: Repositories, scheduling: &SchedulingConfig) -> Self {
        Self {
            relationships: RelationshipManager::new(repos.clone()),
            scheduler: SprintScheduler::with_config(repos.clone(), scheduling),
            progress: ProgressAggregator::new(repos.clone()),
            deletion: DeletionService::new(repos.clone()),
            lifecycle: LifecycleService::new(repos.clone()),
            tasks: TaskService::new(repos),
        }
    }
}
