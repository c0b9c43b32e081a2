//! Domain models for the to-do application.
//!
//! These types are validated domain objects, separate from the database row
//! types in [`crate::db`].

pub mod flash;
pub mod list;
pub mod session;
pub mod task;
pub mod user;

pub use flash::{FlashLevel, FlashMessage};
pub use list::{NewList, TodoList};
pub use session::{CurrentUser, keys as session_keys};
pub use task::{NewTask, Task, TaskChanges};
pub use user::User;
