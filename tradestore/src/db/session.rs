//! Scoped sessions.
//!
//! A [`Session`] is one PostgreSQL transaction on one pooled connection. Repositories obtained
//! from it read and write inside that transaction. The transaction ends exactly once: by
//! [`Session::commit`], by [`Session::rollback`], or by dropping the session, which rolls back and
//! returns the connection to the pool.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::{OrderItems, Orders, Products, Suppliers};
use futures::future::BoxFuture;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::{debug, instrument, warn};

pub struct Session {
    tx: Transaction<'static, Postgres>,
}

impl Session {
    pub(crate) async fn begin(pool: &PgPool) -> Result<Self> {
        let tx = pool.begin().await?;
        Ok(Self { tx })
    }

    pub fn suppliers(&mut self) -> Suppliers<'_> {
        Suppliers::new(&mut self.tx)
    }

    pub fn products(&mut self) -> Products<'_> {
        Products::new(&mut self.tx)
    }

    pub fn orders(&mut self) -> Orders<'_> {
        Orders::new(&mut self.tx)
    }

    pub fn order_items(&mut self) -> OrderItems<'_> {
        OrderItems::new(&mut self.tx)
    }

    /// The session's connection, for queries no repository covers
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    /// Commit all writes. Deferred constraint violations are reported here.
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Discard all writes
    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }

    /// Run `f` in this session, then commit on `Ok` or roll back on `Err`.
    #[instrument(skip_all, name = "session")]
    pub(crate) async fn run<F, T, E>(mut self, f: F) -> std::result::Result<T, E>
    where
        F: for<'s> FnOnce(&'s mut Session) -> BoxFuture<'s, std::result::Result<T, E>>,
        E: From<DbError>,
    {
        let outcome = f(&mut self).await;
        match outcome {
            Ok(value) => {
                self.commit().await.map_err(E::from)?;
                debug!("Session committed");
                Ok(value)
            }
            Err(err) => {
                // The caller's error wins; a failed rollback still releases the connection on drop
                if let Err(rollback_err) = self.rollback().await {
                    warn!(error = %rollback_err, "Failed to roll back session");
                } else {
                    debug!("Session rolled back");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::db::connection::DatabaseConnection;
    use crate::db::errors::DbError;
    use crate::db::handlers::Repository;
    use crate::db::handlers::suppliers::SupplierFilter;
    use crate::db::models::{
        order_items::OrderItemCreateDBRequest, orders::OrderCreateDBRequest, suppliers::SupplierCreateDBRequest,
    };
    use crate::errors::Error;
    use crate::test_utils::setup_schema;
    use sqlx::PgPool;
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
    use std::time::Duration;

    async fn supplier_count(db: &DatabaseConnection) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM suppliers")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    fn abort_session() -> Result<(), Error> {
        panic!("session body panicked")
    }

    fn trade() -> SupplierCreateDBRequest {
        SupplierCreateDBRequest::builder().name("Trade").build()
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_committed_writes_are_visible_to_later_sessions(pool: PgPool) {
        setup_schema(&pool).await;
        let db = DatabaseConnection::from_pool(pool);

        let created = db
            .with_session(|session| {
                Box::pin(async move {
                    let supplier = session.suppliers().create(&trade()).await?;
                    Ok::<_, Error>(supplier)
                })
            })
            .await
            .unwrap();

        let id = created.id;
        let fetched = db
            .with_session(move |session| Box::pin(async move { Ok::<_, Error>(session.suppliers().get_by_id(id).await?) }))
            .await
            .unwrap();

        assert_eq!(fetched, Some(created));
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_error_rolls_back_and_is_returned_unchanged(pool: PgPool) {
        setup_schema(&pool).await;
        let db = DatabaseConnection::from_pool(pool);

        let err = db
            .with_session(|session| {
                Box::pin(async move {
                    session.suppliers().create(&trade()).await?;
                    session.suppliers().create(&trade()).await?;
                    Err::<(), _>(Error::Validation {
                        entity: "supplier",
                        message: "caller gave up".to_string(),
                    })
                })
            })
            .await
            .unwrap_err();

        match err {
            Error::Validation { entity, message } => {
                assert_eq!(entity, "supplier");
                assert_eq!(message, "caller gave up");
            }
            other => panic!("expected the caller's error, got {other:?}"),
        }
        assert_eq!(supplier_count(&db).await, 0);
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_storage_error_rolls_back_earlier_writes(pool: PgPool) {
        setup_schema(&pool).await;
        let db = DatabaseConnection::from_pool(pool);

        let err = db
            .with_session(|session| {
                Box::pin(async move {
                    session.suppliers().create(&trade()).await?;
                    sqlx::query("INSERT INTO suppliers (name) VALUES (NULL)")
                        .execute(session.connection())
                        .await?;
                    Ok::<_, Error>(())
                })
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err, Error::Database(DbError::NotNullViolation { .. })),
            "unexpected error: {err:?}"
        );
        assert_eq!(supplier_count(&db).await, 0);
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_dangling_foreign_key_fails_at_commit(pool: PgPool) {
        setup_schema(&pool).await;
        let db = DatabaseConnection::from_pool(pool);

        let err = db
            .with_session(|session| {
                Box::pin(async move {
                    let order = session
                        .orders()
                        .create(&OrderCreateDBRequest::builder().customer_name("P. Petrov").build())
                        .await?;
                    session
                        .order_items()
                        .create(
                            &OrderItemCreateDBRequest::builder()
                                .order_id(order.id)
                                .product_id(12345)
                                .quantity(1)
                                .price(50000.0)
                                .build(),
                        )
                        .await?;
                    Ok::<_, Error>(order)
                })
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err, Error::Database(DbError::ForeignKeyViolation { .. })),
            "unexpected error: {err:?}"
        );

        let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orders, 0);
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_single_connection_pool_survives_failed_session(pool_options: PgPoolOptions, connect_options: PgConnectOptions) {
        let pool = pool_options
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(connect_options)
            .await
            .unwrap();
        setup_schema(&pool).await;
        let db = DatabaseConnection::from_pool(pool);

        let failed = db
            .with_session(|session| {
                Box::pin(async move {
                    session.suppliers().create(&trade()).await?;
                    Err::<(), _>(Error::Other(anyhow::anyhow!("boom")))
                })
            })
            .await;
        assert!(failed.is_err());

        // Would time out acquiring if the failed session had kept the only connection
        let listed = db
            .with_session(|session| {
                Box::pin(async move {
                    session.suppliers().create(&trade()).await?;
                    Ok::<_, Error>(session.suppliers().list(&SupplierFilter::new(0, 10)).await?)
                })
            })
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_panic_inside_session_releases_connection(pool_options: PgPoolOptions, connect_options: PgConnectOptions) {
        let pool = pool_options
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(connect_options)
            .await
            .unwrap();
        setup_schema(&pool).await;
        let db = DatabaseConnection::from_pool(pool);

        let panicking = db.clone();
        let joined = tokio::spawn(async move {
            panicking
                .with_session(|session| {
                    Box::pin(async move {
                        session.suppliers().create(&trade()).await?;
                        abort_session()
                    })
                })
                .await
        })
        .await;
        assert!(joined.unwrap_err().is_panic());

        assert_eq!(supplier_count(&db).await, 0);
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_explicit_commit_and_drop(pool: PgPool) {
        setup_schema(&pool).await;
        let db = DatabaseConnection::from_pool(pool);

        let mut dropped = db.begin().await.unwrap();
        dropped.suppliers().create(&trade()).await.unwrap();
        drop(dropped);
        assert_eq!(supplier_count(&db).await, 0);

        let mut rolled_back = db.begin().await.unwrap();
        rolled_back.suppliers().create(&trade()).await.unwrap();
        rolled_back.rollback().await.unwrap();
        assert_eq!(supplier_count(&db).await, 0);

        let mut committed = db.begin().await.unwrap();
        committed.suppliers().create(&trade()).await.unwrap();
        committed.commit().await.unwrap();
        assert_eq!(supplier_count(&db).await, 1);
    }
}
