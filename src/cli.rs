//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, health), and their argument structs. Every `run`
//! flag has an environment variable equivalent, so the gateway can be
//! configured entirely from the environment or a `.env` file.

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "fetchgate",
    version,
    about = "HTTP forwarding gateway with bounded outbound concurrency",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        NODE_ENV=development fetchgate run     Start without auth on :3000\n  \
        ACCESS_KEY=secret fetchgate run        Start in production mode\n  \
        fetchgate health                       Check a running instance"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the gateway
    Run(Box<RunArgs>),

    /// Check health of a running instance
    Health(HealthArgs),
}

#[derive(Args, Clone, Debug)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        fetchgate run --mode development --pretty                 Local dev mode\n  \
        fetchgate run --proxy-url http://squid:3128               Relay via a forward proxy\n  \
        fetchgate run --max-connections 8 --max-waiting 64        Bound the wait queue")]
pub struct RunArgs {
    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Run mode; `development` disables bearer auth, anything else is production
    #[arg(long, env = "NODE_ENV", default_value = "production")]
    pub mode: String,

    /// Bearer token required on every request in production mode
    #[arg(long, env = "ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// Forward proxy for outbound fetches (http://host:port)
    #[arg(long, env = "PROXY_URL", hide_env_values = true)]
    pub proxy_url: Option<String>,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Tuning --
    /// Maximum concurrent outbound fetches (invalid values fall back to 4)
    #[arg(
        long,
        env = "MAX_CONNECTIONS",
        default_value = "4",
        help_heading = "Tuning"
    )]
    pub max_connections: String,

    /// Maximum callers queued for a fetch slot [default: unbounded]
    #[arg(long, env = "MAX_WAITING", help_heading = "Tuning")]
    pub max_waiting: Option<usize>,

    /// Give up waiting for a fetch slot after this many milliseconds [default: wait forever]
    #[arg(long, env = "ACQUIRE_TIMEOUT_MS", help_heading = "Tuning")]
    pub acquire_timeout_ms: Option<u64>,

    /// Abort an upstream fetch after this many milliseconds [default: no timeout]
    #[arg(long, env = "UPSTREAM_TIMEOUT_MS", help_heading = "Tuning")]
    pub upstream_timeout_ms: Option<u64>,
}

#[derive(Args)]
pub struct HealthArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:3000")]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}
