//! Core types for Tasklists.
//!
//! This module provides type-safe wrappers for the domain's identifiers and
//! user-supplied text.

pub mod id;
pub mod text;
pub mod username;

pub use id::*;
pub use text::{ListName, TaskTitle, TextError};
pub use username::{Username, UsernameError};
