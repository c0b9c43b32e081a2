//! Business logic services.
//!
//! - `auth` - Account registration and password login
//! - `ownership` - The authorization filter applied before every list/task operation

pub mod auth;
pub mod ownership;

pub use auth::{AuthError, AuthService};
pub use ownership::Ownership;
