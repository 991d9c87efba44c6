/// API route handlers
///
/// One module per resource:
///
/// - `health`: welcome banner and health check
/// - `auth`: registration, login, profile, logout, staff registration
/// - `products`, `categories`, `warehouses`, `suppliers`: catalog and inventory
/// - `cart`: the customer's cart
/// - `orders`: checkout, listing and status updates
/// - `payments`: simulated payment links and verification
/// - `admin`: customer and employee listings

pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod health;
pub mod orders;
pub mod payments;
pub mod products;
pub mod suppliers;
pub mod warehouses;
