//! # bl-contracts
//!
//! Contract validation for Backlog RS.
//!
//! Contracts validate entities before they are persisted. Each one collects
//! every problem it finds into a `ValidationErrors` instead of stopping at the
//! first, so a caller sees the full picture in one `InvalidArgument`.

pub mod backlogs;
pub mod base;
pub mod comments;
pub mod projects;
pub mod sprints;
pub mod tasks;
pub mod user_stories;
pub mod users;

pub use base::*;
pub use backlogs::{EpicContract, ProductBacklogContract, SprintBacklogContract};
pub use comments::CommentContract;
pub use projects::ProjectContract;
pub use sprints::{is_date_range_valid, SprintContract};
pub use tasks::{validate_logged_hours, TaskContract};
pub use user_stories::UserStoryContract;
pub use users::{ProductOwnerContract, UserContract};
