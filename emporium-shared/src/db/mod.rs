//! Database layer
//!
//! - `pool`: connection pool construction, health checks and statistics
//! - `migrations`: embedded schema migrations
//!
//! Models and their SQL live in [`crate::models`].

pub mod migrations;
pub mod pool;
