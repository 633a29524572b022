//! Connection manager: owns the pool and hands out sessions.
//!
//! A [`DatabaseConnection`] is built once per process from an explicit connection string, the
//! loaded [`Config`], or an existing pool. It is cheap to clone; clones share the pool.
//!
//! ```ignore
//! let db = DatabaseConnection::connect(None).await?;
//! db.create_tables().await?;
//!
//! let supplier = db
//!     .with_session(|session| Box::pin(async move {
//!         let supplier = session.suppliers().create(&request).await?;
//!         Ok::<_, tradestore::Error>(supplier)
//!     }))
//!     .await?;
//! ```

use crate::config::{Config, DATABASE_URL_ENV, PoolSettings, resolve_database_url};
use crate::db::errors::{DbError, Result as DbResult};
use crate::db::schema::Catalog;
use crate::db::session::Session;
use crate::errors::Result;
use crate::types::mask_password;
use futures::future::BoxFuture;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::{info, instrument};
use url::Url;

/// Handle to the application database.
#[derive(Clone, Debug)]
pub struct DatabaseConnection {
    pool: PgPool,
    /// Connection string with the password masked
    url: String,
}

/// Pool options matching the configured settings
pub fn pool_options(settings: &PoolSettings) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout())
        .idle_timeout(settings.idle_timeout())
        .max_lifetime(settings.max_lifetime())
}

/// Connection options for an already validated URL
pub fn connect_options(url: &Url) -> Result<PgConnectOptions> {
    Ok(url.as_str().parse::<PgConnectOptions>()?)
}

impl DatabaseConnection {
    /// Connect using `explicit` if given, otherwise `DATABASE_URL`, otherwise the built-in default.
    ///
    /// Uses the default pool settings. Fails with a configuration error before any network access
    /// if the chosen connection string is unusable.
    pub async fn connect(explicit: Option<&str>) -> Result<Self> {
        let env = std::env::var(DATABASE_URL_ENV).ok();
        let url = resolve_database_url(explicit, env.as_deref(), true)?;
        Self::open(&url, &PoolSettings::default()).await
    }

    /// Connect with the URL and pool settings from a loaded configuration
    pub async fn from_config(config: &Config) -> Result<Self> {
        let url = config.database_url()?;
        Self::open(&url, &config.database.pool).await
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        let url = {
            let options = pool.connect_options();
            format!(
                "postgresql://{}@{}:{}/{}",
                options.get_username(),
                options.get_host(),
                options.get_port(),
                options.get_database().unwrap_or_default()
            )
        };
        Self { pool, url }
    }

    #[instrument(skip(url, settings), fields(url = %mask_password(url.as_str())), err)]
    async fn open(url: &Url, settings: &PoolSettings) -> Result<Self> {
        let pool = pool_options(settings).connect_with(connect_options(url)?).await?;

        let url = mask_password(url.as_str());
        info!("Connected to {}", url);
        Ok(Self { pool, url })
    }

    /// Create every table of the standard catalog that doesn't exist yet.
    ///
    /// Safe to call on every startup. Returns the names of the tables created by this call.
    pub async fn create_tables(&self) -> DbResult<Vec<&'static str>> {
        let mut conn = self.pool.acquire().await?;
        Catalog::standard().create_tables(&mut conn).await
    }

    /// Start a session. The caller commits or rolls back; dropping it uncommitted rolls back.
    pub async fn begin(&self) -> DbResult<Session> {
        Session::begin(&self.pool).await
    }

    /// Run `f` as one unit of work.
    ///
    /// Commits if `f` returns `Ok` and rolls back if it returns `Err`, handing back `f`'s error
    /// unchanged. A failed commit (including a deferred foreign key violation) is returned as
    /// `E::from(DbError)`. The pooled connection is released on every path, including a panic
    /// inside `f`.
    pub async fn with_session<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: for<'s> FnOnce(&'s mut Session) -> BoxFuture<'s, std::result::Result<T, E>>,
        E: From<DbError>,
    {
        let session = self.begin().await.map_err(E::from)?;
        session.run(f).await
    }

    /// The connection string in use, with the password masked
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the pool, waiting for checked-out connections to be returned
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
