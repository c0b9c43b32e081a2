//! User domain type.

use chrono::{DateTime, Utc};

use tasklists_core::{UserId, Username};

/// An account that can own lists.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name.
    pub username: Username,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
