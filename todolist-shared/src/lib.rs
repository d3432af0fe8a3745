//! # Todo List Shared Library
//!
//! Domain types, storage and authentication used by the todo list API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their queries
//! - `store`: Storage traits with PostgreSQL and in-memory implementations
//! - `accounts`: Registration and login
//! - `auth`: Password hashing, access tokens and request authorization
//! - `validation`: Request payload validation
//! - `pagination`: Offset/limit paging
//! - `db`: Connection pool and migrations

pub mod accounts;
pub mod auth;
pub mod db;
pub mod models;
pub mod pagination;
pub mod store;
pub mod validation;

/// Current version of the todo list shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
