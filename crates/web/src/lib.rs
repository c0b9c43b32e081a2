//! Tasklists web application library.
//!
//! Per-user to-do lists served as server-rendered HTML. The binary in
//! `main.rs` wires these modules into a running server; exposing them as a
//! library lets the router be driven directly from tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
