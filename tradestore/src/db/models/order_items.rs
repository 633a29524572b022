//! Database models for order items.

use crate::db::models::{FromMapping, Projection, projection};
use crate::db::schema::Table;
use crate::types::{OrderId, OrderItemId, ProductId};
use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Database representation of an order item.
///
/// `price` is the product price at the time the order was placed; it does not follow later
/// changes to the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: f64,
}

/// Request to create a new order item
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderItemCreateDBRequest {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: f64,
}

/// Response from database after creating or fetching an order item
pub type OrderItemDBResponse = OrderItem;

impl FromMapping for OrderItemCreateDBRequest {
    const ENTITY: &'static str = "order item";
}

impl Table for OrderItem {
    const NAME: &'static str = "order_items";
    const DEPENDS_ON: &'static [&'static str] = &["orders", "products"];
    const DDL: &'static [&'static str] = &[
        r#"
        CREATE TABLE IF NOT EXISTS order_items (
            id INTEGER GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
            order_id INTEGER NOT NULL REFERENCES orders(id) DEFERRABLE INITIALLY DEFERRED,
            product_id INTEGER NOT NULL REFERENCES products(id) DEFERRABLE INITIALLY DEFERRED,
            quantity INTEGER NOT NULL,
            price DOUBLE PRECISION NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_order_items_order_id ON order_items(order_id)",
        "CREATE INDEX IF NOT EXISTS idx_order_items_product_id ON order_items(product_id)",
    ];
}

impl Projection for OrderItem {
    fn to_dict(&self) -> Map<String, Value> {
        projection([
            ("id", json!(self.id)),
            ("order_id", json!(self.order_id)),
            ("product_id", json!(self.product_id)),
            ("quantity", json!(self.quantity)),
            ("price", json!(self.price)),
        ])
    }
}
