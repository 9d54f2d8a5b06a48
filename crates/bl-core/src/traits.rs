//! Core traits shared by every entity of the backlog graph

use chrono::{DateTime, Utc};

/// Primary key type
pub type Id = i64;

/// Trait for entities that have a primary key
pub trait Identifiable {
    fn id(&self) -> Option<Id>;

    /// Assign the store-generated identity
    fn set_id(&mut self, id: Id);

    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }

    fn is_new_record(&self) -> bool {
        !self.is_persisted()
    }
}

/// Trait for entities with timestamps (created_at, updated_at)
pub trait Timestamped {
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn updated_at(&self) -> Option<DateTime<Utc>>;

    /// Stamp a save: sets `created_at` on first save and `updated_at` always
    fn touch(&mut self, now: DateTime<Utc>);
}

/// Base trait for all domain entities
pub trait Entity: Identifiable + Timestamped + Clone + Send + Sync + 'static {
    /// The database table name
    const TABLE_NAME: &'static str;

    /// Human-readable type name for error messages
    const TYPE_NAME: &'static str;
}
