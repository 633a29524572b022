//! One-time creation of the application database.
//!
//! Before the pool is opened, [`ensure_database`] connects to an administrative database on the
//! same server, checks `pg_database` and creates the application database if it is missing. The
//! step is best effort: every failure is logged and reported as [`DatabaseStatus::Failed`], and the
//! caller carries on. A real problem (server down, wrong credentials) surfaces again when the pool
//! connects.

use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, Executor, PgConnection};
use tracing::{info, instrument, warn};

/// SQLSTATE `duplicate_database`, raised when another process created the database first
const DUPLICATE_DATABASE: &str = "42P04";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseStatus {
    Created,
    AlreadyExists,
    /// The database could not be checked or created; the reason is for logs only
    Failed(String),
}

/// Make sure the database named by `options` exists, creating it through `admin_database`.
#[instrument(skip(options), fields(database = options.get_database().unwrap_or_default()))]
pub async fn ensure_database(options: &PgConnectOptions, admin_database: &str) -> DatabaseStatus {
    let Some(name) = options.get_database() else {
        warn!("Connection options don't name a database, skipping bootstrap");
        return DatabaseStatus::Failed("no database name in connection options".to_string());
    };

    match create_if_missing(options, admin_database, name).await {
        Ok(status) => {
            match status {
                DatabaseStatus::Created => info!("Created database {}", name),
                _ => info!("Database {} already exists", name),
            }
            status
        }
        Err(e) => {
            warn!(error = %e, "Could not ensure database {} exists, continuing", name);
            DatabaseStatus::Failed(e.to_string())
        }
    }
}

async fn create_if_missing(options: &PgConnectOptions, admin_database: &str, name: &str) -> Result<DatabaseStatus, sqlx::Error> {
    let admin_options = options.clone().database(admin_database);
    let mut conn = PgConnection::connect_with(&admin_options).await?;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(name)
        .fetch_one(&mut conn)
        .await?;

    let status = if exists {
        DatabaseStatus::AlreadyExists
    } else {
        match conn.execute(format!("CREATE DATABASE {}", quote_identifier(name)).as_str()).await {
            Ok(_) => DatabaseStatus::Created,
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some(DUPLICATE_DATABASE) => {
                DatabaseStatus::AlreadyExists
            }
            Err(e) => return Err(e),
        }
    };

    conn.close().await?;
    Ok(status)
}

/// Quote a name for use as an SQL identifier. `CREATE DATABASE` can't take a bind parameter.
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
