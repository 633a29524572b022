//! Database layer for data persistence and access.
//!
//! Built on SQLx with PostgreSQL, following the repository pattern.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │ DatabaseConnection │  (db::connection - pool, table creation, sessions)
//! └─────────┬──────────┘
//!           │
//!           ↓
//! ┌────────────────────┐
//! │      Session       │  (db::session - one transaction, commit or rollback)
//! └─────────┬──────────┘
//!           │
//!           ↓
//! ┌────────────────────┐
//! │    Repositories    │  (db::handlers - queries per table)
//! └─────────┬──────────┘
//!           │
//!           ↓
//! ┌────────────────────┐
//! │       Models       │  (db::models - rows, create requests, projections)
//! └─────────┬──────────┘
//!           │
//!           ↓
//! ┌────────────────────┐
//! │     PostgreSQL     │
//! └────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`connection`]: [`DatabaseConnection`], the entry point
//! - [`session`]: scoped units of work
//! - [`schema`]: table catalog and idempotent table creation
//! - [`bootstrap`]: creates the database itself when it is missing
//! - [`handlers`]: repository implementations
//! - [`models`]: database record structures matching table schemas
//! - [`errors`]: database-specific error types
//!
//! # Schema
//!
//! There are no migrations. Tables are created on startup by
//! [`DatabaseConnection::create_tables`], which only adds tables that are missing and never
//! alters existing ones.

pub mod bootstrap;
pub mod connection;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod schema;
pub mod session;

pub use connection::DatabaseConnection;
pub use session::Session;
