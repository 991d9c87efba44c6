/// Integration tests for carts, checkout, stock and token resolution
///
/// Require PostgreSQL via `DATABASE_URL`; skipped otherwise.

mod common;

use common::{create_customer, create_employee, create_product, test_pool};
use emporium_shared::auth::principal::{self, Principal};
use emporium_shared::auth::token::SessionToken;
use emporium_shared::models::cart::{Cart, CartChange};
use emporium_shared::models::customer::Customer;
use emporium_shared::models::employee::{CreateEmployee, Employee, EmployeeRole};
use emporium_shared::models::order::{Order, OrderError};
use emporium_shared::models::product::{Product, ProductInput};
use emporium_shared::models::warehouse::{Warehouse, WarehouseInput};
use rust_decimal::Decimal;

#[tokio::test]
async fn test_cart_set_is_idempotent_and_zero_removes() {
    let Some(pool) = test_pool().await else { return };
    let customer = create_customer(&pool).await;
    let product = create_product(&pool, 1000).await;

    let cart = Cart::get_or_create(&pool, customer.id).await.unwrap();
    let again = Cart::get_or_create(&pool, customer.id).await.unwrap();
    assert_eq!(cart.id, again.id, "one cart per customer");

    Cart::set_item_quantity(&pool, cart.id, product.id, 3).await.unwrap();
    let change = Cart::set_item_quantity(&pool, cart.id, product.id, 3).await.unwrap();
    assert_eq!(change, CartChange::Set { quantity: 3 });

    let lines = Cart::lines(&pool, cart.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 3);
    assert_eq!(lines[0].line_total, Decimal::new(3000, 2));

    let removed = Cart::set_item_quantity(&pool, cart.id, product.id, 0).await.unwrap();
    assert_eq!(removed, CartChange::Removed { existed: true });
    assert!(Cart::lines(&pool, cart.id).await.unwrap().is_empty());

    let noop = Cart::set_item_quantity(&pool, cart.id, product.id, -2).await.unwrap();
    assert_eq!(noop, CartChange::Removed { existed: false });
}

#[tokio::test]
async fn test_checkout_of_empty_cart_writes_nothing() {
    let Some(pool) = test_pool().await else { return };
    let customer = create_customer(&pool).await;

    // No cart at all
    let result = Order::create_from_cart(&pool, customer.id).await;
    assert!(matches!(result, Err(OrderError::EmptyCart)));

    // Cart with no lines
    Cart::get_or_create(&pool, customer.id).await.unwrap();
    let result = Order::create_from_cart(&pool, customer.id).await;
    assert!(matches!(result, Err(OrderError::EmptyCart)));

    let orders = Order::list_by_customer(&pool, customer.id).await.unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn test_checkout_totals_snapshots_and_clears_cart() {
    let Some(pool) = test_pool().await else { return };
    let customer = create_customer(&pool).await;
    let ten = create_product(&pool, 1000).await;
    let five = create_product(&pool, 500).await;

    let cart = Cart::get_or_create(&pool, customer.id).await.unwrap();
    Cart::set_item_quantity(&pool, cart.id, ten.id, 2).await.unwrap();
    Cart::set_item_quantity(&pool, cart.id, five.id, 1).await.unwrap();

    let placed = Order::create_from_cart(&pool, customer.id).await.unwrap();
    assert_eq!(placed.order.status, "pending");
    assert_eq!(placed.order.total_amount, Decimal::new(2500, 2));
    assert_eq!(placed.items.len(), 2);
    assert!(Cart::lines(&pool, cart.id).await.unwrap().is_empty());

    // Repricing the product leaves the order line untouched
    Product::update(
        &pool,
        ten.id,
        ProductInput {
            name: ten.name.clone(),
            description: ten.description.clone(),
            price: Decimal::new(9900, 2),
            category_id: None,
            image: None,
        },
    )
    .await
    .unwrap();

    let items = Order::items(&pool, placed.order.id).await.unwrap();
    let line = items
        .iter()
        .find(|item| item.product_id == Some(ten.id))
        .expect("line for repriced product");
    assert_eq!(line.price, Decimal::new(1000, 2));
    assert_eq!(line.quantity, 2);

    // Deleting the product keeps the line with a NULL reference
    assert!(Product::delete(&pool, five.id).await.unwrap());
    let items = Order::items(&pool, placed.order.id).await.unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().any(|item| item.product_id.is_none() && item.name.is_none()));
}

#[tokio::test]
async fn test_checkout_total_beyond_column_leaves_cart() {
    let Some(pool) = test_pool().await else { return };
    let customer = create_customer(&pool).await;
    let pricey = create_product(&pool, 99_999_999).await;

    let cart = Cart::get_or_create(&pool, customer.id).await.unwrap();
    Cart::set_item_quantity(&pool, cart.id, pricey.id, i32::MAX).await.unwrap();

    let result = Order::create_from_cart(&pool, customer.id).await;
    assert!(matches!(result, Err(OrderError::TotalTooLarge)));

    assert_eq!(Cart::lines(&pool, cart.id).await.unwrap().len(), 1);
    assert!(Order::list_by_customer(&pool, customer.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_email_registry_spans_account_tables() {
    let Some(pool) = test_pool().await else { return };
    let customer = create_customer(&pool).await;
    let staff = create_employee(&pool, EmployeeRole::OfficeStaff).await;

    assert!(principal::email_in_use(&pool, &customer.email).await.unwrap());
    assert!(principal::email_in_use(&pool, &staff.email).await.unwrap());
    assert!(!principal::email_in_use(&pool, "nobody@example.com").await.unwrap());

    let err = Employee::create(
        &pool,
        CreateEmployee {
            name: "Shadow".to_string(),
            email: customer.email.clone(),
            password_hash: "unused".to_string(),
            role: EmployeeRole::Admin,
            designation: None,
            auth_token_hash: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, sqlx::Error::Database(ref db) if db.is_unique_violation()));
}

#[tokio::test]
async fn test_update_status_stores_any_value() {
    let Some(pool) = test_pool().await else { return };
    let customer = create_customer(&pool).await;
    let product = create_product(&pool, 250).await;

    let cart = Cart::get_or_create(&pool, customer.id).await.unwrap();
    Cart::set_item_quantity(&pool, cart.id, product.id, 1).await.unwrap();
    let placed = Order::create_from_cart(&pool, customer.id).await.unwrap();

    let updated = Order::update_status(&pool, placed.order.id, "out-for-delivery")
        .await
        .unwrap()
        .expect("order exists");
    assert_eq!(updated.status, "out-for-delivery");

    let missing = Order::update_status(&pool, uuid::Uuid::new_v4(), "shipped")
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_stock_intake_accumulates() {
    let Some(pool) = test_pool().await else { return };
    let product = create_product(&pool, 100).await;
    let warehouse = Warehouse::create(
        &pool,
        WarehouseInput {
            name: "North".to_string(),
            location: Some("Dock 4".to_string()),
        },
    )
    .await
    .unwrap();

    Warehouse::add_stock(&pool, warehouse.id, product.id, 5).await.unwrap();
    let stock = Warehouse::add_stock(&pool, warehouse.id, product.id, 3).await.unwrap();
    assert_eq!(stock.quantity, 8);

    let lines = Warehouse::stock(&pool, warehouse.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 8);
}

#[tokio::test]
async fn test_token_resolution_and_revocation() {
    let Some(pool) = test_pool().await else { return };
    let employee = create_employee(&pool, EmployeeRole::DeliveryStaff).await;

    let token = SessionToken::generate();
    Employee::set_token_hash(&pool, employee.id, Some(token.hash().as_str())).await.unwrap();

    let resolved = principal::resolve(&pool, token.as_str()).await.unwrap();
    assert_eq!(
        resolved,
        Some(Principal::Employee { id: employee.id, role: EmployeeRole::DeliveryStaff })
    );

    let holder = resolved.unwrap();
    assert!(principal::revoke(&pool, &holder).await.unwrap());
    assert_eq!(principal::resolve(&pool, token.as_str()).await.unwrap(), None);
}

#[tokio::test]
async fn test_token_collision_prefers_customer() {
    let Some(pool) = test_pool().await else { return };
    let customer = create_customer(&pool).await;
    let employee = create_employee(&pool, EmployeeRole::Admin).await;

    let token = SessionToken::generate();
    let digest = token.hash();
    Employee::set_token_hash(&pool, employee.id, Some(digest.as_str())).await.unwrap();
    Customer::set_token_hash(&pool, customer.id, Some(digest.as_str())).await.unwrap();

    let resolved = principal::resolve(&pool, token.as_str()).await.unwrap();
    assert_eq!(resolved, Some(Principal::Customer { id: customer.id }));
}
