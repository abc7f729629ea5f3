//! Tracing subscriber setup.

use anyhow::Result;
use tracing_subscriber::{
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::config::{LogConfig, LogFormat};

/// Install the global subscriber. Events go to stderr so command output on
/// stdout stays parseable.
pub fn init(config: &LogConfig, verbose: bool, json: bool) -> Result<()> {
    let format = if json { LogFormat::Json } else { config.format };
    let level = if verbose { "debug" } else { config.level.as_str() };

    match format {
        LogFormat::Human => init_subscriber(
            level,
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(verbose)
                .with_writer(std::io::stderr),
        ),
        LogFormat::Json => init_subscriber(
            level,
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true)
                .with_writer(std::io::stderr),
        ),
    }
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn init_subscriber<L>(level: &str, fmt_layer: L) -> Result<()>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(build_env_filter(level))
        .try_init()?;
    Ok(())
}
