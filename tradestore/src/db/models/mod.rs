//! Database record models matching table schemas.
//!
//! Each entity module contains:
//!
//! - the row struct (derives `sqlx::FromRow`), returned by repositories
//! - a `*CreateDBRequest` with a typed builder, accepted by repositories
//! - the [`Table`](crate::db::schema::Table) definition used by the schema catalog
//! - its [`Projection`] implementation
//!
//! # Entities
//!
//! - [`suppliers`]: Suppliers of products
//! - [`products`]: Products, optionally linked to a supplier
//! - [`orders`]: Customer orders
//! - [`order_items`]: Lines of an order, each pointing at a product with a price snapshot
//!
//! # Building create requests
//!
//! Prefer the builders, which check field names at compile time:
//!
//! ```ignore
//! use tradestore::db::models::suppliers::SupplierCreateDBRequest;
//!
//! let request = SupplierCreateDBRequest::builder().name("Trade").phone("+79991234567").build();
//! ```
//!
//! When the input is an untyped JSON object, [`FromMapping::from_mapping`] deserializes it and
//! rejects unknown or missing required keys instead of dropping them.

pub mod order_items;
pub mod orders;
pub mod products;
pub mod suppliers;

use crate::errors::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A flat, serializable view of an entity's fields.
///
/// Every declared column is present, `NULL` columns map to `null` and timestamps are rendered as
/// RFC 3339 (ISO-8601) strings.
pub trait Projection {
    fn to_dict(&self) -> Map<String, Value>;
}

/// Construction of a create request from an untyped mapping of field name to value.
pub trait FromMapping: DeserializeOwned {
    /// Entity name used in validation errors
    const ENTITY: &'static str;

    fn from_mapping(mapping: Value) -> Result<Self> {
        if !mapping.is_object() {
            return Err(Error::Validation {
                entity: Self::ENTITY,
                message: "expected a mapping of field names to values".to_string(),
            });
        }

        serde_json::from_value(mapping).map_err(|e| Error::Validation {
            entity: Self::ENTITY,
            message: e.to_string(),
        })
    }
}

pub(crate) fn projection<const N: usize>(fields: [(&str, Value); N]) -> Map<String, Value> {
    fields.into_iter().map(|(name, value)| (name.to_string(), value)).collect()
}
