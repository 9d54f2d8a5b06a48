//! Status and priority enumerations
//!
//! Both status enums expose `ALL`, the fixed variant list. Aggregations iterate
//! it so that zero-count statuses still show up in summaries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// User story status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Statut {
    #[default]
    ToDo,
    InProgress,
    InTesting,
    Blocked,
    Finished,
}

impl Statut {
    pub const ALL: [Statut; 5] = [
        Statut::ToDo,
        Statut::InProgress,
        Statut::InTesting,
        Statut::Blocked,
        Statut::Finished,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToDo => "toDo",
            Self::InProgress => "inProgress",
            Self::InTesting => "inTesting",
            Self::Blocked => "blocked",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for Statut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Statut {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Statut::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown user story status: {}", s))
    }
}

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    ToDo,
    InProgress,
    InReview,
    Blocked,
    Finished,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::ToDo,
        TaskStatus::InProgress,
        TaskStatus::InReview,
        TaskStatus::Blocked,
        TaskStatus::Finished,
    ];

    /// The single status that counts as done for progress
    pub const DONE: TaskStatus = TaskStatus::Finished;

    pub fn is_done(&self) -> bool {
        *self == Self::DONE
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToDo => "TO_DO",
            Self::InProgress => "IN_PROGRESS",
            Self::InReview => "IN_REVIEW",
            Self::Blocked => "BLOCKED",
            Self::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown task status: {}", s))
    }
}

/// Priority of user stories and tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_done_status() {
        let done: Vec<_> = TaskStatus::ALL.iter().filter(|s| s.is_done()).collect();
        assert_eq!(done, vec![&TaskStatus::Finished]);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Statut::InTesting).unwrap(), "\"inTesting\"");
        assert_eq!(serde_json::to_string(&TaskStatus::ToDo).unwrap(), "\"TO_DO\"");
        assert_eq!(serde_json::to_string(&Priority::Critical).unwrap(), "\"CRITICAL\"");
    }

    #[test]
    fn test_as_str_matches_from_str() {
        for status in Statut::ALL {
            assert_eq!(status.as_str().parse::<Statut>(), Ok(status));
        }
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>(), Ok(status));
        }
        assert!("DONE".parse::<TaskStatus>().is_err());
    }
}
