//! Structured logging setup using the `tracing` ecosystem.
//!
//! Configures a `tracing-subscriber` with either JSON output (for
//! production and process managers collecting stdout) or pretty-printed
//! output (for TTY / local dev). Format is auto-detected from the
//! terminal but can be forced via `--json` or `--pretty`.

use tracing_subscriber::filter::Targets;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::LogLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[must_use]
pub fn resolve_format(pretty: bool, json: bool) -> LogFormat {
    if json {
        LogFormat::Json
    } else if pretty || std::io::IsTerminal::is_terminal(&std::io::stdout()) {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

pub fn init(level: &LogLevel, format: LogFormat) {
    // hyper and rustls are chatty at debug; keep them at warn unless tracing.
    let noisy_floor = match level {
        LogLevel::Trace => tracing::Level::TRACE,
        _ => level.to_tracing_level().min(tracing::Level::WARN),
    };
    let filter = Targets::new()
        .with_default(level.to_tracing_level())
        .with_target("hyper_util", noisy_floor)
        .with_target("rustls", noisy_floor);

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(false))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
}
