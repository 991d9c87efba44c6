//! Shared setup for API tests that run against PostgreSQL
//!
//! The router is driven in-process through `tower::Service`. Without a
//! `DATABASE_URL` the context is `None` and tests return early.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use emporium_api::app::{build_router, AppState};
use emporium_api::config::Config;
use emporium_shared::auth::password::hash_password;
use emporium_shared::db::migrations::{ensure_database_exists, run_migrations};
use emporium_shared::db::pool::{create_pool, DatabaseConfig};
use emporium_shared::models::employee::{CreateEmployee, Employee, EmployeeRole};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

pub const PASSWORD: &str = "password123";

/// Router plus the pool behind it
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
}

/// Status and decoded envelope of one call
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

/// A logged-in account
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

impl TestContext {
    pub async fn new() -> Option<Self> {
        let url = std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty())?;

        ensure_database_exists(&url)
            .await
            .expect("Failed to create test database");

        let db = create_pool(DatabaseConfig {
            url: url.clone(),
            max_connections: 5,
            min_connections: 1,
            ..Default::default()
        })
        .await
        .expect("Failed to create pool");

        run_migrations(&db).await.expect("Failed to run migrations");

        let app = build_router(AppState::new(db.clone(), Config::for_database(url)));

        Some(Self { db, app })
    }

    /// Sends a request with an optional JSON body and `auth-token`
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("auth-token", token);
        }

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .call(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send("POST", uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send("PUT", uri, token, Some(body)).await
    }

    /// Registers a fresh customer through the API
    pub async fn register_customer(&self) -> Account {
        let email = unique_email("customer");
        let response = self
            .post(
                "/api/auth/register",
                None,
                json!({ "name": "Test Customer", "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        Account {
            id: response.data()["customerId"].as_str().unwrap().parse().unwrap(),
            email,
            token: response.data()["token"].as_str().unwrap().to_string(),
        }
    }

    /// Inserts an employee and logs in through the API
    pub async fn login_employee(&self, role: EmployeeRole) -> Account {
        let employee = Employee::create(
            &self.db,
            CreateEmployee {
                name: format!("Test {}", role),
                email: unique_email("staff"),
                password_hash: hash_password(PASSWORD).unwrap(),
                role,
                designation: None,
                auth_token_hash: None,
            },
        )
        .await
        .unwrap();

        let token = self.login(&employee.email, PASSWORD).await;

        Account {
            id: employee.id,
            email: employee.email,
            token,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);

        response.data()["token"].as_str().unwrap().to_string()
    }

    /// Creates a product as a fresh admin and returns its id
    pub async fn create_product(&self, price: &str) -> Uuid {
        let admin = self.login_employee(EmployeeRole::Admin).await;
        let response = self
            .post(
                "/api/products",
                Some(admin.token.as_str()),
                json!({ "name": format!("Product {}", Uuid::new_v4()), "price": price }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        response.data()["id"].as_str().unwrap().parse().unwrap()
    }
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4())
}
