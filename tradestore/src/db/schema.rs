//! Schema catalog and table bootstrap.
//!
//! A [`Catalog`] is an owned list of table definitions. Entities describe their table by
//! implementing [`Table`]; the catalog decides the creation order and issues the DDL.
//! There is no process-wide registry: whoever builds the catalog owns it.
//!
//! ```ignore
//! let catalog = Catalog::standard();
//! let created = catalog.create_tables(&mut conn).await?;
//! ```
//!
//! Creation is additive only. Tables that already exist are left exactly as they are; nothing is
//! ever dropped or altered.

use crate::db::errors::{DbError, Result};
use crate::db::models::{order_items::OrderItem, orders::Order, products::Product, suppliers::Supplier};
use sqlx::{Acquire, PgConnection};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Storage definition of one entity table.
pub trait Table {
    /// Table name in the current schema
    const NAME: &'static str;
    /// Tables referenced by foreign keys, which must be created first
    const DEPENDS_ON: &'static [&'static str];
    /// Statements creating the table and its indexes. Each must be safe to re-run.
    const DDL: &'static [&'static str];
}

/// A registered table definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub depends_on: &'static [&'static str],
    pub ddl: &'static [&'static str],
}

impl TableDef {
    pub fn of<T: Table>() -> Self {
        Self {
            name: T::NAME,
            depends_on: T::DEPENDS_ON,
            ddl: T::DDL,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: Vec<TableDef>,
}

impl Catalog {
    /// An empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog of every entity in this crate, in dependency order
    pub fn standard() -> Self {
        Self::new()
            .register::<Supplier>()
            .register::<Product>()
            .register::<Order>()
            .register::<OrderItem>()
    }

    /// Append a table. Registering the same table twice keeps the first registration.
    pub fn register<T: Table>(mut self) -> Self {
        if !self.contains(T::NAME) {
            self.tables.push(TableDef::of::<T>());
        }
        self
    }

    pub fn tables(&self) -> &[TableDef] {
        &self.tables
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.iter().any(|t| t.name == name)
    }

    /// Check that every dependency is registered before the table that needs it.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for table in &self.tables {
            for dependency in table.depends_on {
                if !seen.contains(dependency) {
                    let reason = if self.contains(dependency) {
                        "is registered after it"
                    } else {
                        "is not registered"
                    };
                    return Err(DbError::Other(anyhow::anyhow!(
                        "table '{}' depends on '{}', which {}",
                        table.name,
                        dependency,
                        reason
                    )));
                }
            }
            seen.insert(table.name);
        }
        Ok(())
    }

    /// Names of the catalog's tables that already exist in the connection's current schema
    #[instrument(skip(self, conn), err)]
    pub async fn existing_tables(&self, conn: &mut PgConnection) -> Result<HashSet<String>> {
        let names: Vec<&str> = self.tables.iter().map(|t| t.name).collect();

        let existing: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT table_name::TEXT FROM information_schema.tables
            WHERE table_schema = current_schema() AND table_name = ANY($1)
            "#,
        )
        .bind(names.as_slice())
        .fetch_all(&mut *conn)
        .await?;

        Ok(existing.into_iter().collect())
    }

    /// Create every registered table that doesn't exist yet.
    ///
    /// Runs in a single transaction, so either all missing tables appear or none do. Returns the
    /// names of the tables that were created, in creation order; an empty list means the schema
    /// was already complete.
    #[instrument(skip(self, conn), fields(tables = self.tables.len()), err)]
    pub async fn create_tables(&self, conn: &mut PgConnection) -> Result<Vec<&'static str>> {
        self.validate()?;

        let mut tx = conn.begin().await?;
        let existing = self.existing_tables(&mut tx).await?;

        let mut created = Vec::new();
        for table in &self.tables {
            if existing.contains(table.name) {
                debug!("Table {} already exists", table.name);
                continue;
            }

            for statement in table.ddl {
                sqlx::query(statement).execute(&mut *tx).await?;
            }
            created.push(table.name);
        }

        tx.commit().await?;

        if created.is_empty() {
            debug!("Schema up to date");
        } else {
            info!("Created tables: {}", created.join(", "));
        }

        Ok(created)
    }
}
