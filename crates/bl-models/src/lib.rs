//! # bl-models
//!
//! The entity graph of Backlog RS: plain data records for projects, backlogs,
//! sprints, user stories, tasks, comments and users, plus their enumerations.
//!
//! Associations are stored as identifier fields (`*_id`), never as live
//! references. Keeping both ends of an edge consistent is the job of the
//! services crate; these types only store fields.

pub use bl_core::traits::{Entity, Id, Identifiable, Timestamped};

/// Implements `Identifiable`, `Timestamped` and `Entity` for a record with
/// `id`, `created_at` and `updated_at` fields.
macro_rules! impl_entity {
    ($ty:ty, $table:literal, $name:literal) => {
        impl bl_core::traits::Identifiable for $ty {
            fn id(&self) -> Option<bl_core::traits::Id> {
                self.id
            }

            fn set_id(&mut self, id: bl_core::traits::Id) {
                self.id = Some(id);
            }
        }

        impl bl_core::traits::Timestamped for $ty {
            fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
                self.created_at
            }

            fn updated_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
                self.updated_at
            }

            fn touch(&mut self, now: chrono::DateTime<chrono::Utc>) {
                if self.created_at.is_none() {
                    self.created_at = Some(now);
                }
                self.updated_at = Some(now);
            }
        }

        impl bl_core::traits::Entity for $ty {
            const TABLE_NAME: &'static str = $table;
            const TYPE_NAME: &'static str = $name;
        }
    };
}

pub mod comment;
pub mod epic;
pub mod product_backlog;
pub mod project;
pub mod sprint;
pub mod sprint_backlog;
pub mod status;
pub mod task;
pub mod user;
pub mod user_story;

// Re-exports for convenience
pub use comment::Comment;
pub use epic::Epic;
pub use product_backlog::ProductBacklog;
pub use project::Project;
pub use sprint::Sprint;
pub use sprint_backlog::SprintBacklog;
pub use status::{Priority, Statut, TaskStatus};
pub use task::{NewTask, Task};
pub use user::{NewUser, Role, User};
pub use user_story::{NewUserStory, UserStory};
