/// Middleware modules for the API server
///
/// - Security headers on every response
/// - Internal error detail in development mode
/// - Session token authentication

pub mod auth;
pub mod error_detail;
pub mod security;
