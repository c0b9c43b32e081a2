//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use tasklists_core::{UserId, Username};

/// Session-stored user identity.
///
/// This is the "requester" every list and task operation is scoped to.
/// Handlers receive it from the `RequireAuth` extractor and pass `id`
/// explicitly to the ownership filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's login name.
    pub username: Username,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for queued one-shot notifications.
    pub const FLASH_MESSAGES: &str = "flash_messages";
}
