//! Database models and their SQL
//!
//! - `customer`, `employee`, `supplier`: the three identity tables
//! - `category`, `product`: the catalog
//! - `warehouse`: warehouses and stock levels
//! - `cart`: per-customer carts with set-quantity lines
//! - `order`: transactional checkout, order lines and status updates
//!
//! Every operation takes a `&PgPool` and returns `sqlx::Error` (or a domain
//! error wrapping it), leaving HTTP mapping to the API crate.

pub mod cart;
pub mod category;
pub mod customer;
pub mod employee;
pub mod order;
pub mod product;
pub mod supplier;
pub mod warehouse;
