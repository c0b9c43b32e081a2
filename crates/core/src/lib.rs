//! Tasklists Core - Shared domain types.
//!
//! This crate provides the types used across all Tasklists components:
//! - `web` - The server-rendered to-do list application
//! - `cli` - Command-line tools for migrations and user management
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. Database encoding for IDs is opt-in via the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, usernames, and bounded text fields

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
