use anyhow::Context;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LoggingConfig};

/// Level asked for by the `-v` count; `0` asks for nothing.
fn verbosity_level(verbose: u8) -> Option<LevelFilter> {
    match verbose {
        0 => None,
        1 => Some(LevelFilter::INFO),
        2 => Some(LevelFilter::DEBUG),
        _ => Some(LevelFilter::TRACE),
    }
}

/// Global level set by a directive list: the last bare level wins, and a
/// list without one leaves `EnvFilter` at `error`.
fn default_level(directives: &str) -> LevelFilter {
    directives
        .split(',')
        .rev()
        .find_map(|d| d.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::ERROR)
}

/// Filter from `RUST_LOG` if set, else from `logging.level` raised by `-v`.
///
/// `-v` never lowers the configured level.
fn build_filter(config: &LoggingConfig, verbose: u8) -> anyhow::Result<EnvFilter> {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return EnvFilter::try_from_default_env().context("invalid RUST_LOG directive");
    }

    let filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("invalid logging.level directive '{}'", config.level))?;
    Ok(match verbosity_level(verbose) {
        Some(level) if level > default_level(&config.level) => filter.add_directive(level.into()),
        _ => filter,
    })
}

/// Install the global subscriber, writing to stderr.
///
/// # Errors
/// Returns an error for a malformed `RUST_LOG` or `logging.level`, or if a
/// subscriber is already installed.
pub fn init(config: &LoggingConfig, verbose: u8) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(build_filter(config, verbose)?);

    match config.format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    }
    .context("failed to install the log subscriber")
}
