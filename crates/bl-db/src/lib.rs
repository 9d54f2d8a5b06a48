//! # bl-db
//!
//! Storage layer for Backlog RS.
//!
//! The engine talks to storage only through the traits in [`repository`].
//! Two implementations are provided:
//!
//! - [`MemoryStore`]: lock-guarded in-process tables, used by tests and
//!   embedders that do not need durability
//! - [`PgStore`]: PostgreSQL through SQLx
//!
//! ## Example
//!
//! ```ignore
//! use bl_core::config::DatabaseConfig;
//! use bl_db::{Database, PgStore, Repositories};
//!
//! let db = Database::connect(&DatabaseConfig::with_url(url)).await?;
//! bl_db::postgres::migrate(db.pool()).await?;
//! let repos = Repositories::from_store(Arc::new(PgStore::new(db.pool().clone())));
//! ```

pub mod memory;
pub mod pool;
pub mod postgres;
pub mod repository;

// Re-exports
pub use memory::MemoryStore;
pub use pool::Database;
pub use postgres::PgStore;
pub use repository::{
    CommentRepository, EpicRepository, ProductBacklogRepository, ProjectRepository,
    Repositories, Repository, RepositoryError, RepositoryResult, SprintBacklogRepository,
    SprintRepository, TaskRepository, UserRepository, UserStoryRepository,
};
