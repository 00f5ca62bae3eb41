//! Tracing subscriber setup for the binary

use anyhow::{Result, anyhow};
use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, fmt::MakeWriter, util::SubscriberInitExt};

use crate::config::AppConfig;

/// `RUST_LOG` when set, else `default_level`
pub fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Plain-text subscriber writing to `writer`
pub fn subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static
{
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_target(false).finish()
}

/// Install the global subscriber at the level configured in `config`.
///
/// Runs before anything else is loaded so the loading itself is logged.
pub fn init(config: &AppConfig) -> Result<()> {
    let settings = config.load()?;
    subscriber(filter(&settings.log_level), std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to install the tracing subscriber: {}", e))
}
