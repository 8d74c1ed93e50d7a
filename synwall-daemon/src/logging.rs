//! Logging initialization for synwall-daemon.
//!
//! Builds the `tracing-subscriber` stack from the `[general]` section of
//! `SynwallConfig`. The output format is the closed [`LogFormat`] enum,
//! so an unknown format can never reach this point -- it is rejected when
//! the config is parsed.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use synwall_core::config::{GeneralConfig, LogFormat};

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
/// `RUST_LOG` takes precedence over the configured log level.
///
/// # Formats
///
/// * [`LogFormat::Json`] - machine-parseable JSON lines (production default)
/// * [`LogFormat::Pretty`] - human-readable output (for development)
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(env_filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    }
    .map_err(|e| {
        anyhow::anyhow!(
            "failed to initialize {} tracing subscriber: {}",
            config.log_format,
            e
        )
    })
}
