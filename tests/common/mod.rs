//! Common test utilities

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use bank_ledger::api::{self, AppState};
use bank_ledger::store::MemoryLedgerStore;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use uuid::Uuid;

pub const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

pub fn account_types() -> Vec<String> {
    vec!["Savings".to_string(), "Checking".to_string(), "Business".to_string()]
}

/// Full application router over a fresh in-memory store
pub fn memory_app() -> Router {
    api::build_router(AppState::new(MemoryLedgerStore::new(), account_types()))
}

/// Setup test database - apply the schema and truncate every table
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    pool.execute(SCHEMA).await.expect("Failed to apply schema");

    pool
}

/// Remove every row; run once per test binary before seeding
pub async fn truncate_all(pool: &PgPool) {
    sqlx::query("TRUNCATE TABLE transactions, accounts, clients CASCADE")
        .execute(pool)
        .await
        .expect("Failed to clean up DB");
}

/// Build a JSON request, optionally on behalf of a client
pub fn json_request(method: &str, uri: &str, client_id: Option<Uuid>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(client_id) = client_id {
        builder = builder.header("X-Client-Id", client_id.to_string());
    }

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Money fields are serialized as decimal strings
pub fn money(value: &Value) -> Decimal {
    value.as_str().expect("money is a string").parse().unwrap()
}

pub fn client_body(tax_id: &str, account_type: &str) -> Value {
    json!({
        "name": "Ana",
        "lastName": "Lopez",
        "taxId": tax_id,
        "email": "ana@example.com",
        "password": "Str0ng!Pwd",
        "dateOfBirth": "1990-05-17",
        "gender": "F",
        "income": "2500.00",
        "accountType": account_type
    })
}
