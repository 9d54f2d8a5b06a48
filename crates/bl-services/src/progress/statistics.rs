//! Aggregate figures returned by the progress aggregator

use serde::Serialize;

/// Sprint backlog, story and sprint totals below one product backlog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductBacklogStatistics {
    pub total_sprint_backlogs: u64,
    pub total_user_stories: u64,
    pub total_sprints: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatistics {
    pub total_projects: u64,
    pub projects_with_backlog: u64,
    pub projects_without_backlog: u64,
    pub projects_with_owner: u64,
}

/// Estimated against logged hours over a set of tasks
///
/// Tasks without an estimate contribute nothing to `estimated_hours`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffortSummary {
    pub estimated_hours: f64,
    pub logged_hours: f64,
    pub estimated_tasks: u64,
}

impl EffortSummary {
    /// Estimated hours not yet logged, never negative
    pub fn remaining_hours(&self) -> f64 {
        (self.estimated_hours - self.logged_hours).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case() {
        let stats = ProductBacklogStatistics {
            total_sprint_backlogs: 2,
            total_user_stories: 0,
            total_sprints: 2,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["totalSprintBacklogs"], 2);
        assert_eq!(json["totalSprints"], 2);
    }

    #[test]
    fn test_remaining_hours() {
        let effort = EffortSummary {
            estimated_hours: 8.0,
            logged_hours: 10.5,
            estimated_tasks: 2,
        };
        assert_eq!(effort.remaining_hours(), 0.0);
    }
}
