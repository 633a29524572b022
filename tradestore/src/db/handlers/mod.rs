//! Repository implementations for database access.
//!
//! One repository per table, each implementing [`Repository`]:
//!
//! - [`Suppliers`]: supplier records, plus the products they supply
//! - [`Products`]: catalog items, plus their supplier and order items
//! - [`Orders`]: customer orders, plus their items
//! - [`OrderItems`]: order lines
//!
//! Repositories borrow a `PgConnection`. Inside a [`Session`](crate::db::session::Session) they
//! see and contribute to the session's transaction:
//!
//! ```ignore
//! use tradestore::db::handlers::Repository;
//!
//! db.with_session(|session| Box::pin(async move {
//!     let supplier = session.suppliers().create(&request).await?;
//!     let products = session.suppliers().products(supplier.id).await?;
//!     Ok::<_, tradestore::Error>(products)
//! }))
//! .await?;
//! ```

pub mod order_items;
pub mod orders;
pub mod products;
pub mod repository;
pub mod suppliers;

pub use order_items::OrderItems;
pub use orders::Orders;
pub use products::Products;
pub use repository::Repository;
pub use suppliers::Suppliers;
