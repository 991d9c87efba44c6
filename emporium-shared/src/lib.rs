//! # Emporium Shared Library
//!
//! Types, persistence and authentication used by the Emporium API server.
//!
//! ## Module Organization
//!
//! - `auth`: passwords, session tokens, principals and role checks
//! - `db`: connection pool and migrations
//! - `models`: database models and their queries

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Emporium shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
