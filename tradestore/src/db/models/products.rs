//! Database models for products.

use crate::db::models::{FromMapping, Projection, projection};
use crate::db::schema::Table;
use crate::types::{ProductId, SupplierId};
use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Database representation of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i32,
    pub supplier_id: Option<SupplierId>,
}

/// Request to create a new product
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductCreateDBRequest {
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub description: Option<String>,
    pub price: f64,
    /// Units in stock (defaults to 0)
    pub quantity: Option<i32>,
    pub supplier_id: Option<SupplierId>,
}

/// Response from database after creating or fetching a product
pub type ProductDBResponse = Product;

impl FromMapping for ProductCreateDBRequest {
    const ENTITY: &'static str = "product";
}

impl Table for Product {
    const NAME: &'static str = "products";
    const DEPENDS_ON: &'static [&'static str] = &["suppliers"];
    const DDL: &'static [&'static str] = &[
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id INTEGER GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            description VARCHAR(500),
            price DOUBLE PRECISION NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 0,
            supplier_id INTEGER REFERENCES suppliers(id) DEFERRABLE INITIALLY DEFERRED
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_products_supplier_id ON products(supplier_id)",
    ];
}

impl Projection for Product {
    fn to_dict(&self) -> Map<String, Value> {
        projection([
            ("id", json!(self.id)),
            ("name", json!(self.name)),
            ("description", json!(self.description)),
            ("price", json!(self.price)),
            ("quantity", json!(self.quantity)),
            ("supplier_id", json!(self.supplier_id)),
        ])
    }
}
