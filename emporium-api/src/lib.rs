//! # Emporium API Server Library
//!
//! HTTP layer of the Emporium shop backend: customers browse the catalog,
//! fill a cart and check out, staff manage products, stock and orders.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from environment variables
//! - `error`: Error handling and the failure envelope
//! - `extract`: Request extractors that reject with the failure envelope
//! - `middleware`: Token authentication, security headers, error detail
//! - `response`: The success envelope
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod response;
pub mod routes;
