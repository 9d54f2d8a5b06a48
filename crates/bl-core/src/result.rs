//! Result type alias

use crate::error::BlError;

/// Standard Result type for backlog operations
pub type BlResult<T> = Result<T, BlError>;
