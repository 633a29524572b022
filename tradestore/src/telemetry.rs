//! Logging initialization.
//!
//! Uses `tracing-subscriber` with a fmt layer writing to stderr. The filter is read from `RUST_LOG`
//! and defaults to `info`:
//!
//! ```bash
//! RUST_LOG=tradestore=debug,sqlx=warn tradestore -f config.yaml
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global subscriber.
///
/// Fails if a global subscriber is already set, e.g. when called twice.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}
