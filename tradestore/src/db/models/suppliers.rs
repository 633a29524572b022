//! Database models for suppliers.

use crate::db::models::{FromMapping, Projection, projection};
use crate::db::schema::Table;
use crate::types::SupplierId;
use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Database representation of a supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Request to create a new supplier
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SupplierCreateDBRequest {
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub contact_person: Option<String>,
    #[builder(into)]
    pub phone: Option<String>,
    #[builder(into)]
    pub email: Option<String>,
    #[builder(into)]
    pub address: Option<String>,
}

/// Response from database after creating or fetching a supplier
pub type SupplierDBResponse = Supplier;

impl FromMapping for SupplierCreateDBRequest {
    const ENTITY: &'static str = "supplier";
}

impl Table for Supplier {
    const NAME: &'static str = "suppliers";
    const DEPENDS_ON: &'static [&'static str] = &[];
    const DDL: &'static [&'static str] = &[r#"
        CREATE TABLE IF NOT EXISTS suppliers (
            id INTEGER GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            contact_person VARCHAR(100),
            phone VARCHAR(20),
            email VARCHAR(100),
            address VARCHAR(200)
        )
        "#];
}

impl Projection for Supplier {
    fn to_dict(&self) -> Map<String, Value> {
        projection([
            ("id", json!(self.id)),
            ("name", json!(self.name)),
            ("contact_person", json!(self.contact_person)),
            ("phone", json!(self.phone)),
            ("email", json!(self.email)),
            ("address", json!(self.address)),
        ])
    }
}
