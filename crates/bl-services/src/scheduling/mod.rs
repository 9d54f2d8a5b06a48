//! Sprint scheduler
//!
//! A sprint is *scheduled* while it belongs to a sprint backlog and
//! *unscheduled* otherwise. Scheduled sprints of one backlog never share a
//! day: overlap is the closed-interval test of [`Sprint::overlaps`] and is
//! re-derived from the live sibling set on every mutation.
//!
//! When `lock_per_sprint_backlog` is enabled, mutations hold
//! [`SprintBacklogLocks`] entries across their check-then-write sequence: the
//! sprint's own key first, then every backlog the sprint leaves or joins.

mod locks;
mod params;

pub use locks::{LockGuard, LockKey, SprintBacklogLocks};
pub use params::{CreateSprintParams, SprintChanges};

use bl_contracts::sprints::validate_date_range;
use bl_contracts::{is_date_range_valid, validate_presence, ChangeTracker, SprintContract};
use bl_core::config::SchedulingConfig;
use bl_core::error::{BlError, ValidationErrors};
use bl_core::result::BlResult;
use bl_core::traits::Id;
use bl_db::Repositories;
use bl_models::Sprint;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::base::{found, validate_with};

/// Sprint date validation, overlap detection and backlog attachment
#[derive(Clone)]
pub struct SprintScheduler {
    repos: Repositories,
    locks: Option<SprintBacklogLocks>,
}

impl SprintScheduler {
    /// Scheduler with per-backlog locking enabled
    pub fn new(repos: Repositories) -> Self {
        Self {
            repos,
            locks: Some(SprintBacklogLocks::new()),
        }
    }

    pub fn with_config(repos: Repositories, config: &SchedulingConfig) -> Self {
        Self {
            repos,
            locks: config
                .lock_per_sprint_backlog
                .then(SprintBacklogLocks::new),
        }
    }

    async fn lock(&self, keys: impl IntoIterator<Item = LockKey>) -> Vec<LockGuard> {
        match &self.locks {
            Some(locks) => locks.lock_all(keys).await,
            None => Vec::new(),
        }
    }

    /// Lock a sprint, then its current backlog and `joining`, and load it
    ///
    /// The sprint is reloaded under the backlog locks; if it moved meanwhile
    /// the backlog locks are released and taken again for the new backlog.
    async fn lock_sprint(
        &self,
        sprint_id: Id,
        joining: Option<Id>,
    ) -> BlResult<(Sprint, Vec<LockGuard>)> {
        let mut guards = self.lock([LockKey::Sprint(sprint_id)]).await;
        let mut sprint = found(self.repos.sprints.find_by_id(sprint_id).await?, sprint_id)?;

        loop {
            let leaving = sprint.sprint_backlog_id;
            let backlog_guards = self
                .lock(leaving.into_iter().chain(joining).map(LockKey::SprintBacklog))
                .await;
            let current = found(self.repos.sprints.find_by_id(sprint_id).await?, sprint_id)?;
            if current.sprint_backlog_id == leaving {
                guards.extend(backlog_guards);
                return Ok((current, guards));
            }
            debug!(sprint_id, "sprint moved while locking");
            sprint = current;
        }
    }

    /// Both dates present and `end >= start`
    pub fn is_sprint_date_range_valid(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> bool {
        is_date_range_valid(start, end)
    }

    /// Whether `[start, end]` intersects a sprint of the backlog other than
    /// `exclude_sprint_id`
    pub async fn is_sprint_overlapping(
        &self,
        sprint_backlog_id: Id,
        start: NaiveDate,
        end: NaiveDate,
        exclude_sprint_id: Option<Id>,
    ) -> BlResult<bool> {
        let siblings = self
            .repos
            .sprints
            .find_by_sprint_backlog(sprint_backlog_id)
            .await?;

        let overlapping = siblings
            .iter()
            .filter(|sibling| exclude_sprint_id.is_none() || sibling.id != exclude_sprint_id)
            .find(|sibling| sibling.overlaps(start, end));

        if let Some(sibling) = overlapping {
            debug!(
                sprint_backlog_id,
                sibling_id = ?sibling.id,
                %start,
                %end,
                "overlapping sprint found"
            );
        }
        Ok(overlapping.is_some())
    }

    async fn ensure_no_overlap(
        &self,
        sprint_backlog_id: Id,
        start: NaiveDate,
        end: NaiveDate,
        exclude_sprint_id: Option<Id>,
    ) -> BlResult<()> {
        if self
            .is_sprint_overlapping(sprint_backlog_id, start, end, exclude_sprint_id)
            .await?
        {
            warn!(sprint_backlog_id, %start, %end, "sprint overlap rejected");
            return Err(BlError::conflict(format!(
                "sprint {} to {} overlaps another sprint of sprint backlog {}",
                start, end, sprint_backlog_id
            )));
        }
        Ok(())
    }

    /// Create a sprint in a sprint backlog
    pub async fn create_sprint(&self, params: CreateSprintParams) -> BlResult<Sprint> {
        let mut errors = ValidationErrors::new();
        let name = params.name.trim();
        validate_presence("name", name, &mut errors);
        validate_date_range(params.start_date, params.end_date, &mut errors);

        let (start, end) = match (params.start_date, params.end_date) {
            (Some(start), Some(end)) if errors.is_empty() => (start, end),
            _ => {
                warn!(errors = %errors, "sprint rejected");
                return Err(BlError::InvalidArgument(errors));
            }
        };

        let sprint_backlog_id = params.sprint_backlog_id;
        let sprint = Sprint::new(name, start, end).in_backlog(sprint_backlog_id);
        validate_with(&SprintContract, &sprint)?;

        found(
            self.repos.sprint_backlogs.find_by_id(sprint_backlog_id).await?,
            sprint_backlog_id,
        )?;

        let _guards = self.lock([LockKey::SprintBacklog(sprint_backlog_id)]).await;
        self.ensure_no_overlap(sprint_backlog_id, start, end, None)
            .await?;
        let sprint = self.repos.sprints.save(sprint).await?;

        info!(
            sprint_id = ?sprint.id,
            sprint_backlog_id,
            %start,
            %end,
            "sprint created"
        );
        Ok(sprint)
    }

    /// Apply a partial update; nothing is written when a check fails or no
    /// field actually changes
    pub async fn update_sprint(&self, id: Id, changes: SprintChanges) -> BlResult<Sprint> {
        let (mut sprint, _guards) = self.lock_sprint(id, None).await?;

        let start = changes.start_date.unwrap_or(sprint.start_date);
        let end = changes.end_date.unwrap_or(sprint.end_date);

        if changes.touches_dates() {
            let mut errors = ValidationErrors::new();
            validate_date_range(Some(start), Some(end), &mut errors);
            if !errors.is_empty() {
                warn!(sprint_id = id, errors = %errors, "sprint update rejected");
                return Err(BlError::InvalidArgument(errors));
            }
            if let Some(sprint_backlog_id) = sprint.sprint_backlog_id {
                self.ensure_no_overlap(sprint_backlog_id, start, end, Some(id))
                    .await?;
            }
        }

        let mut tracker = ChangeTracker::new();
        let name = changes
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        if let Some(name) = name {
            if name != sprint.name {
                sprint.name = name.to_string();
                tracker.mark_changed("name");
            }
        }
        if start != sprint.start_date {
            sprint.start_date = start;
            tracker.mark_changed("start_date");
        }
        if end != sprint.end_date {
            sprint.end_date = end;
            tracker.mark_changed("end_date");
        }

        if tracker.is_empty() {
            debug!(sprint_id = id, "sprint unchanged");
            return Ok(sprint);
        }
        validate_with(&SprintContract, &sprint)?;

        let sprint = self.repos.sprints.save(sprint).await?;
        info!(
            sprint_id = id,
            changed = ?tracker.changed_attributes(),
            "sprint updated"
        );
        Ok(sprint)
    }

    /// Move a sprint into a sprint backlog, keeping its dates
    pub async fn assign_sprint_to_sprint_backlog(
        &self,
        sprint_id: Id,
        sprint_backlog_id: Id,
    ) -> BlResult<Sprint> {
        let (mut sprint, _guards) = self
            .lock_sprint(sprint_id, Some(sprint_backlog_id))
            .await?;
        found(
            self.repos.sprint_backlogs.find_by_id(sprint_backlog_id).await?,
            sprint_backlog_id,
        )?;
        if sprint.sprint_backlog_id == Some(sprint_backlog_id) {
            return Ok(sprint);
        }

        self.ensure_no_overlap(
            sprint_backlog_id,
            sprint.start_date,
            sprint.end_date,
            Some(sprint_id),
        )
        .await?;

        let previous = sprint.sprint_backlog_id.replace(sprint_backlog_id);
        let sprint = self.repos.sprints.save(sprint).await?;
        info!(
            sprint_id,
            sprint_backlog_id,
            previous_sprint_backlog_id = ?previous,
            "sprint scheduled"
        );
        Ok(sprint)
    }

    /// Unschedule a sprint
    pub async fn remove_sprint_from_sprint_backlog(&self, sprint_id: Id) -> BlResult<Sprint> {
        let (mut sprint, _guards) = self.lock_sprint(sprint_id, None).await?;
        let previous = sprint.sprint_backlog_id.take();

        let sprint = self.repos.sprints.save(sprint).await?;
        info!(
            sprint_id,
            previous_sprint_backlog_id = ?previous,
            "sprint unscheduled"
        );
        Ok(sprint)
    }

    /// Sprints of a backlog ordered by start date
    pub async fn sprints_in_backlog(&self, sprint_backlog_id: Id) -> BlResult<Vec<Sprint>> {
        found(
            self.repos.sprint_backlogs.find_by_id(sprint_backlog_id).await?,
            sprint_backlog_id,
        )?;

        let mut sprints = self
            .repos
            .sprints
            .find_by_sprint_backlog(sprint_backlog_id)
            .await?;
        sprints.sort_by_key(|sprint| (sprint.start_date, sprint.id));
        Ok(sprints)
    }

    /// The sprint of the backlog running on `on`, if any
    pub async fn current_sprint(
        &self,
        sprint_backlog_id: Id,
        on: NaiveDate,
    ) -> BlResult<Option<Sprint>> {
        let sprints = self.sprints_in_backlog(sprint_backlog_id).await?;
        Ok(sprints.into_iter().find(|sprint| sprint.contains(on)))
    }

    pub async fn delete_sprint(&self, sprint_id: Id) -> BlResult<()> {
        let (_, _guards) = self.lock_sprint(sprint_id, None).await?;
        self.repos.sprints.delete(sprint_id).await?;
        info!(sprint_id, "sprint deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use bl_db::{Repository, RepositoryResult, SprintRepository};

    use super::*;
    use crate::testing::*;

    /// Sprint store whose sibling reads stall, widening check-then-write gaps
    struct SlowSprints {
        inner: Arc<dyn SprintRepository>,
        delay: Duration,
    }

    #[async_trait]
    impl Repository<Sprint> for SlowSprints {
        async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Sprint>> {
            self.inner.find_by_id(id).await
        }

        async fn find_all(&self) -> RepositoryResult<Vec<Sprint>> {
            self.inner.find_all().await
        }

        async fn save(&self, entity: Sprint) -> RepositoryResult<Sprint> {
            self.inner.save(entity).await
        }

        async fn delete(&self, id: Id) -> RepositoryResult<()> {
            self.inner.delete(id).await
        }

        async fn count(&self) -> RepositoryResult<u64> {
            self.inner.count().await
        }
    }

    #[async_trait]
    impl SprintRepository for SlowSprints {
        async fn find_by_sprint_backlog(
            &self,
            sprint_backlog_id: Id,
        ) -> RepositoryResult<Vec<Sprint>> {
            tokio::time::sleep(self.delay).await;
            self.inner.find_by_sprint_backlog(sprint_backlog_id).await
        }
    }

    fn slowed(mut repos: Repositories) -> Repositories {
        repos.sprints = Arc::new(SlowSprints {
            inner: repos.sprints.clone(),
            delay: Duration::from_millis(50),
        });
        repos
    }

    async fn scheduler_with_backlog() -> (SprintScheduler, Repositories, Id) {
        let (_, repos) = memory_repos();
        let sb = sprint_backlog(&repos, "SB1").await.id.unwrap();
        (SprintScheduler::new(repos.clone()), repos, sb)
    }

    #[test]
    fn test_date_range_validity() {
        let (_, repos) = memory_repos();
        let scheduler = SprintScheduler::new(repos);
        let jan = |d| Some(date(2025, 1, d));
        assert!(scheduler.is_sprint_date_range_valid(jan(1), jan(1)));
        assert!(!scheduler.is_sprint_date_range_valid(jan(2), jan(1)));
        assert!(!scheduler.is_sprint_date_range_valid(None, jan(1)));
    }

    fn params(name: &str, sb: Id, start: NaiveDate, end: NaiveDate) -> CreateSprintParams {
        CreateSprintParams::new(name, sb).with_dates(start, end)
    }

    #[tokio::test]
    async fn test_create_sprint_scenario() {
        let (scheduler, _, sb) = scheduler_with_backlog().await;

        let first = scheduler
            .create_sprint(params("Sprint 1", sb, date(2025, 1, 1), date(2025, 1, 14)))
            .await
            .unwrap();
        assert!(first.is_scheduled());

        let err = scheduler
            .create_sprint(params("Sprint 2", sb, date(2025, 1, 10), date(2025, 1, 20)))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        scheduler
            .create_sprint(params("Sprint 3", sb, date(2025, 1, 15), date(2025, 1, 20)))
            .await
            .unwrap();

        let sprints = scheduler.sprints_in_backlog(sb).await.unwrap();
        let names: Vec<_> = sprints.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Sprint 1", "Sprint 3"]);
    }

    #[tokio::test]
    async fn test_create_sprint_validation_order() {
        let (scheduler, _, sb) = scheduler_with_backlog().await;

        let err = scheduler
            .create_sprint(params("  ", sb, date(2025, 1, 14), date(2025, 1, 1)))
            .await
            .unwrap_err();
        match err {
            BlError::InvalidArgument(errors) => {
                assert!(errors.has_error("name"));
                assert!(errors.has_error("end_date"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = scheduler
            .create_sprint(CreateSprintParams::new("No dates", sb))
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());

        let err = scheduler
            .create_sprint(params("Orphan", 404, date(2025, 1, 1), date(2025, 1, 2)))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_overlap_is_symmetric() {
        let (_, repos) = memory_repos();
        let scheduler = SprintScheduler::new(repos.clone());
        let ranges = [
            (date(2025, 1, 1), date(2025, 1, 14)),
            (date(2025, 1, 14), date(2025, 1, 20)),
            (date(2025, 1, 21), date(2025, 1, 31)),
            (date(2025, 1, 5), date(2025, 1, 25)),
        ];

        // every pair stored alone in its own backlog
        for a in 0..ranges.len() {
            for b in (a + 1)..ranges.len() {
                let sb = sprint_backlog(&repos, "Pair").await.id.unwrap();
                let (a_start, a_end) = ranges[a];
                let (b_start, b_end) = ranges[b];
                let a_id = sprint(&repos, "A", a_start, a_end, Some(sb)).await.id;
                let b_id = sprint(&repos, "B", b_start, b_end, Some(sb)).await.id;

                let a_hits_b = scheduler
                    .is_sprint_overlapping(sb, a_start, a_end, a_id)
                    .await
                    .unwrap();
                let b_hits_a = scheduler
                    .is_sprint_overlapping(sb, b_start, b_end, b_id)
                    .await
                    .unwrap();
                assert_eq!(a_hits_b, b_hits_a, "ranges {} and {}", a, b);
            }
        }

        let sb = sprint_backlog(&repos, "Shared").await.id.unwrap();
        let mut ids = Vec::new();
        for (start, end) in &ranges[..3] {
            ids.push(sprint(&repos, "S", *start, *end, Some(sb)).await.id);
        }

        // shared endpoint day overlaps, adjacent days do not
        assert!(scheduler
            .is_sprint_overlapping(sb, date(2025, 1, 14), date(2025, 1, 14), ids[0])
            .await
            .unwrap());
        assert!(!scheduler
            .is_sprint_overlapping(sb, date(2025, 1, 21), date(2025, 1, 31), ids[2])
            .await
            .unwrap());
        // a sprint never collides with itself
        assert!(!scheduler
            .is_sprint_overlapping(sb, date(2025, 1, 1), date(2025, 1, 13), ids[0])
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_sprint_rejects_inverted_range() {
        let (scheduler, repos, sb) = scheduler_with_backlog().await;
        let stored = sprint(&repos, "S1", date(2025, 1, 1), date(2025, 1, 10), Some(sb)).await;
        let id = stored.id.unwrap();

        let err = scheduler
            .update_sprint(id, SprintChanges::new().with_start_date(date(2025, 2, 1)))
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());

        let reloaded = repos.sprints.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(reloaded.start_date, date(2025, 1, 1));
    }

    #[tokio::test]
    async fn test_update_sprint_overlap_and_rename() {
        let (scheduler, repos, sb) = scheduler_with_backlog().await;
        let first = sprint(&repos, "S1", date(2025, 1, 1), date(2025, 1, 14), Some(sb)).await;
        let second = sprint(&repos, "S2", date(2025, 1, 15), date(2025, 1, 28), Some(sb)).await;
        let second_id = second.id.unwrap();

        let err = scheduler
            .update_sprint(second_id, SprintChanges::new().with_start_date(date(2025, 1, 14)))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        // moving within its own range does not collide with itself
        let moved = scheduler
            .update_sprint(second_id, SprintChanges::new().with_end_date(date(2025, 1, 25)))
            .await
            .unwrap();
        assert_eq!(moved.end_date, date(2025, 1, 25));

        let renamed = scheduler
            .update_sprint(
                first.id.unwrap(),
                SprintChanges::new()
                    .with_name("  ")
                    .with_end_date(date(2025, 1, 10)),
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "S1");
        assert_eq!(renamed.end_date, date(2025, 1, 10));

        let err = scheduler
            .update_sprint(99, SprintChanges::new().with_name("x"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_without_changes_issues_no_write() {
        let (store, repos) = memory_repos();
        let stored = sprint(&repos, "S1", date(2025, 1, 1), date(2025, 1, 10), None).await;
        let scheduler = SprintScheduler::new(repos);
        let writes = store.write_count();

        scheduler
            .update_sprint(stored.id.unwrap(), SprintChanges::new().with_name("S1"))
            .await
            .unwrap();
        assert_eq!(store.write_count(), writes);
    }

    #[tokio::test]
    async fn test_unscheduled_sprint_skips_overlap() {
        let (scheduler, repos, sb) = scheduler_with_backlog().await;
        sprint(&repos, "Scheduled", date(2025, 1, 1), date(2025, 1, 14), Some(sb)).await;
        let loose = sprint(&repos, "Loose", date(2025, 3, 1), date(2025, 3, 5), None).await;

        let updated = scheduler
            .update_sprint(
                loose.id.unwrap(),
                SprintChanges::new()
                    .with_start_date(date(2025, 1, 5))
                    .with_end_date(date(2025, 1, 6)),
            )
            .await
            .unwrap();
        assert!(!updated.is_scheduled());
    }

    #[tokio::test]
    async fn test_assign_and_remove() {
        let (scheduler, repos, sb) = scheduler_with_backlog().await;
        sprint(&repos, "Existing", date(2025, 1, 1), date(2025, 1, 14), Some(sb)).await;
        let clash = sprint(&repos, "Clash", date(2025, 1, 7), date(2025, 1, 9), None).await;
        let fits = sprint(&repos, "Fits", date(2025, 2, 1), date(2025, 2, 14), None).await;

        let err = scheduler
            .assign_sprint_to_sprint_backlog(clash.id.unwrap(), sb)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        let err = scheduler
            .assign_sprint_to_sprint_backlog(fits.id.unwrap(), 42)
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let assigned = scheduler
            .assign_sprint_to_sprint_backlog(fits.id.unwrap(), sb)
            .await
            .unwrap();
        assert_eq!(assigned.sprint_backlog_id, Some(sb));

        let removed = scheduler
            .remove_sprint_from_sprint_backlog(fits.id.unwrap())
            .await
            .unwrap();
        assert!(!removed.is_scheduled());
        assert!(scheduler
            .remove_sprint_from_sprint_backlog(999)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_current_sprint_and_delete() {
        let (scheduler, repos, sb) = scheduler_with_backlog().await;
        let first = sprint(&repos, "S1", date(2025, 1, 1), date(2025, 1, 14), Some(sb)).await;
        sprint(&repos, "S2", date(2025, 1, 15), date(2025, 1, 28), Some(sb)).await;

        let current = scheduler.current_sprint(sb, date(2025, 1, 14)).await.unwrap();
        assert_eq!(current.map(|s| s.name), Some("S1".to_string()));
        assert!(scheduler.current_sprint(sb, date(2025, 3, 1)).await.unwrap().is_none());
        assert!(scheduler.sprints_in_backlog(77).await.unwrap_err().is_not_found());

        scheduler.delete_sprint(first.id.unwrap()).await.unwrap();
        assert!(scheduler.delete_sprint(first.id.unwrap()).await.unwrap_err().is_not_found());
        assert_eq!(scheduler.sprints_in_backlog(sb).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_yield_one_success() {
        let (_, repos) = memory_repos();
        let sb = sprint_backlog(&repos, "SB1").await.id.unwrap();
        let scheduler = Arc::new(SprintScheduler::new(repos.clone()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let scheduler = scheduler.clone();
                tokio::spawn(async move {
                    scheduler
                        .create_sprint(
                            CreateSprintParams::new(format!("Sprint {}", i), sb)
                                .with_dates(date(2025, 1, 1), date(2025, 1, 14)),
                        )
                        .await
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(err) => assert!(err.is_conflict()),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(repos.sprints.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_racing_reassign_keeps_both_writes() {
        let (_, repos) = memory_repos();
        let from = sprint_backlog(&repos, "A").await.id.unwrap();
        let to = sprint_backlog(&repos, "B").await.id.unwrap();
        let id = sprint(&repos, "S1", date(2025, 1, 1), date(2025, 1, 14), Some(from))
            .await
            .id
            .unwrap();
        let repos = slowed(repos);
        let scheduler = SprintScheduler::new(repos.clone());

        let (assigned, updated) = tokio::join!(
            scheduler.assign_sprint_to_sprint_backlog(id, to),
            scheduler.update_sprint(id, SprintChanges::new().with_end_date(date(2025, 1, 10))),
        );
        assigned.unwrap();
        updated.unwrap();

        let stored = repos.sprints.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.sprint_backlog_id, Some(to));
        assert_eq!(stored.end_date, date(2025, 1, 10));
    }

    #[tokio::test]
    async fn test_remove_racing_update_keeps_both_writes() {
        let (_, repos) = memory_repos();
        let sb = sprint_backlog(&repos, "A").await.id.unwrap();
        let id = sprint(&repos, "S1", date(2025, 1, 1), date(2025, 1, 14), Some(sb))
            .await
            .id
            .unwrap();
        let repos = slowed(repos);
        let scheduler = SprintScheduler::new(repos.clone());

        let (updated, removed) = tokio::join!(
            scheduler.update_sprint(id, SprintChanges::new().with_end_date(date(2025, 1, 10))),
            scheduler.remove_sprint_from_sprint_backlog(id),
        );
        updated.unwrap();
        removed.unwrap();

        let stored = repos.sprints.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.sprint_backlog_id, None);
        assert_eq!(stored.end_date, date(2025, 1, 10));
    }

    #[tokio::test]
    async fn test_locks_released_after_each_operation() {
        let (_, repos) = memory_repos();
        let sb = sprint_backlog(&repos, "SB1").await.id.unwrap();
        let locks = SprintBacklogLocks::new();
        let scheduler = SprintScheduler {
            repos: repos.clone(),
            locks: Some(locks.clone()),
        };

        let created = scheduler
            .create_sprint(params("Sprint 1", sb, date(2025, 1, 1), date(2025, 1, 14)))
            .await
            .unwrap();
        scheduler
            .update_sprint(created.id.unwrap(), SprintChanges::new().with_name("Renamed"))
            .await
            .unwrap();
        scheduler.delete_sprint(created.id.unwrap()).await.unwrap();

        assert!(locks.is_empty());
    }
}
