//! # tradestore: typed PostgreSQL persistence for a small trading schema
//!
//! `tradestore` stores suppliers, the products they supply, customer orders and the items of
//! those orders in PostgreSQL. It owns the whole life of the database handle: resolving the
//! connection string, creating the database and its tables when they are missing, and running
//! work in sessions that commit on success and roll back on failure.
//!
//! ## Architecture
//!
//! The **configuration layer** ([`config`]) merges a YAML file, `TRADESTORE_`-prefixed
//! environment variables and `DATABASE_URL`, and resolves the connection string before anything
//! touches the network.
//!
//! The **database layer** ([`db`]) is built on SQLx. [`DatabaseConnection`] wraps the pool,
//! creates tables from an explicit [`Catalog`](db::schema::Catalog) and hands out
//! [`Session`](db::Session)s. Each session is one transaction; repositories obtained from it
//! ([`db::handlers`]) insert and read typed rows ([`db::models`]). Every row type can be
//! projected to a flat JSON object with [`Projection::to_dict`](db::models::Projection::to_dict).
//!
//! Entities are only ever created and read. There are no update or delete operations and no
//! migrations: table creation is additive and leaves existing tables alone.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tradestore::db::handlers::Repository;
//! use tradestore::db::models::{Projection, suppliers::SupplierCreateDBRequest};
//! use tradestore::{Config, Error};
//!
//! # async fn example(args: tradestore::config::Args) -> anyhow::Result<()> {
//! let config = Config::load(&args)?;
//! let db = tradestore::bootstrap(&config).await?;
//! db.create_tables().await?;
//!
//! let supplier = db
//!     .with_session(|session| {
//!         Box::pin(async move {
//!             let request = SupplierCreateDBRequest::builder().name("Trade").build();
//!             Ok::<_, Error>(session.suppliers().create(&request).await?)
//!         })
//!     })
//!     .await?;
//!
//! println!("{}", serde_json::Value::Object(supplier.to_dict()));
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod config;
pub mod db;
pub mod errors;
pub mod telemetry;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

#[cfg(test)]
mod test;

pub use config::Config;
pub use db::DatabaseConnection;
pub use errors::{Error, Result};

use db::bootstrap::ensure_database;
use db::connection::connect_options;
use tracing::instrument;

/// Prepare the database described by `config` and connect to it.
///
/// When `database.create_if_missing` is set, the database is first created through the
/// administrative database if it doesn't exist. That step never fails the call; if it didn't work,
/// connecting reports the real problem.
#[instrument(skip(config), err)]
pub async fn bootstrap(config: &Config) -> Result<DatabaseConnection> {
    let url = config.database_url()?;

    if config.database.create_if_missing {
        ensure_database(&connect_options(&url)?, &config.database.admin_database).await;
    }

    DatabaseConnection::from_config(config).await
}
