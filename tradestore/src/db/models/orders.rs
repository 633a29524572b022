//! Database models for customer orders.

use crate::db::models::{FromMapping, Projection, projection};
use crate::db::schema::Table;
use crate::types::OrderId;
use bon::Builder;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Database representation of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub order_date: DateTime<Utc>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub status: String,
    pub total_amount: f64,
}

/// Request to create a new order
///
/// Omitted `order_date`, `status` and `total_amount` take the column defaults (creation time,
/// [`DEFAULT_ORDER_STATUS`](crate::types::DEFAULT_ORDER_STATUS) and 0).
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderCreateDBRequest {
    pub order_date: Option<DateTime<Utc>>,
    #[builder(into)]
    pub customer_name: String,
    #[builder(into)]
    pub customer_phone: Option<String>,
    #[builder(into)]
    pub customer_email: Option<String>,
    #[builder(into)]
    pub status: Option<String>,
    pub total_amount: Option<f64>,
}

/// Response from database after creating or fetching an order
pub type OrderDBResponse = Order;

impl FromMapping for OrderCreateDBRequest {
    const ENTITY: &'static str = "order";
}

impl Table for Order {
    const NAME: &'static str = "orders";
    const DEPENDS_ON: &'static [&'static str] = &[];
    const DDL: &'static [&'static str] = &[r#"
        CREATE TABLE IF NOT EXISTS orders (
            id INTEGER GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
            order_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            customer_name VARCHAR(100) NOT NULL,
            customer_phone VARCHAR(20),
            customer_email VARCHAR(100),
            status VARCHAR(50) NOT NULL DEFAULT 'created',
            total_amount DOUBLE PRECISION NOT NULL DEFAULT 0
        )
        "#];
}

impl Projection for Order {
    fn to_dict(&self) -> Map<String, Value> {
        projection([
            ("id", json!(self.id)),
            ("order_date", json!(self.order_date.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
            ("customer_name", json!(self.customer_name)),
            ("customer_phone", json!(self.customer_phone)),
            ("customer_email", json!(self.customer_email)),
            ("status", json!(self.status)),
            ("total_amount", json!(self.total_amount)),
        ])
    }
}
