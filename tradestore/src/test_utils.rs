//! Test utilities for integration testing (available with `test-utils` feature).

use crate::config::{Config, DatabaseConfig, PoolSettings};
use crate::db::models::{
    order_items::OrderItemCreateDBRequest, orders::OrderCreateDBRequest, products::ProductCreateDBRequest,
    suppliers::SupplierCreateDBRequest,
};
use crate::db::schema::Catalog;
use crate::types::{OrderId, ProductId, SupplierId};
use sqlx::PgPool;

/// Create every table of the standard catalog in the test database
pub async fn setup_schema(pool: &PgPool) {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Catalog::standard()
        .create_tables(&mut conn)
        .await
        .expect("Failed to create tables");
}

/// Configuration pointing at `url` with a small pool and no database bootstrap
pub fn create_test_config(url: &str) -> Config {
    Config {
        database_url: None,
        database: DatabaseConfig {
            url: Some(url.to_string()),
            allow_default_url: false,
            create_if_missing: false,
            pool: PoolSettings {
                max_connections: 2,
                acquire_timeout_secs: 5,
                ..Default::default()
            },
            ..Default::default()
        },
    }
}

pub fn sample_supplier() -> SupplierCreateDBRequest {
    SupplierCreateDBRequest::builder()
        .name("Trade")
        .contact_person("Ivan Ivanov")
        .phone("+79991234567")
        .email("supplier@example.com")
        .address("Moscow, Lenina 1")
        .build()
}

pub fn sample_product(supplier_id: SupplierId) -> ProductCreateDBRequest {
    ProductCreateDBRequest::builder()
        .name("Laptop")
        .description("Gaming laptop")
        .price(50000.0)
        .quantity(10)
        .supplier_id(supplier_id)
        .build()
}

pub fn sample_order() -> OrderCreateDBRequest {
    OrderCreateDBRequest::builder()
        .customer_name("P. Petrov")
        .customer_phone("+79998765432")
        .customer_email("customer@example.com")
        .status("processing")
        .total_amount(50000.0)
        .build()
}

pub fn sample_order_item(order_id: OrderId, product_id: ProductId) -> OrderItemCreateDBRequest {
    OrderItemCreateDBRequest::builder()
        .order_id(order_id)
        .product_id(product_id)
        .quantity(1)
        .price(50000.0)
        .build()
}
