//! Runtime settings resolved from the parsed CLI / environment.
//!
//! [`Settings::from_args`] turns [`RunArgs`] into validated, typed
//! settings. The only fatal conditions are a missing access key in
//! production mode and an unusable forward proxy URL; a bad
//! `MAX_CONNECTIONS` value falls back to [`DEFAULT_MAX_CONNECTIONS`].

use std::fmt;
use std::time::Duration;

use tokio::sync::Semaphore;
use url::Url;

use crate::cli::RunArgs;
use crate::error::GatewayError;
use crate::gate::GateLimits;

pub const DEFAULT_MAX_CONNECTIONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Production,
    Development,
}

impl RunMode {
    /// Only the exact value `development` turns auth off.
    #[must_use]
    pub fn from_env_value(value: &str) -> Self {
        if value == "development" {
            Self::Development
        } else {
            Self::Production
        }
    }

    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Production => "production",
            Self::Development => "development",
        })
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub mode: RunMode,
    pub access_key: Option<String>,
    pub forward_proxy: Option<Url>,
    pub max_connections: usize,
    pub gate_limits: GateLimits,
    pub upstream_timeout: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            mode: RunMode::Development,
            access_key: None,
            forward_proxy: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            gate_limits: GateLimits::default(),
            upstream_timeout: None,
        }
    }
}

impl Settings {
    pub fn from_args(args: &RunArgs) -> Result<Self, GatewayError> {
        let mode = RunMode::from_env_value(&args.mode);
        let access_key = args.access_key.clone().filter(|k| !k.is_empty());

        if mode.is_production() && access_key.is_none() {
            return Err(GatewayError::MissingAccessKey);
        }

        let forward_proxy = args
            .proxy_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .map(parse_forward_proxy)
            .transpose()?;

        let max_connections = parse_max_connections(&args.max_connections).unwrap_or_else(|| {
            tracing::warn!(
                value = %args.max_connections,
                fallback = DEFAULT_MAX_CONNECTIONS,
                "invalid MAX_CONNECTIONS, using default"
            );
            DEFAULT_MAX_CONNECTIONS
        });

        Ok(Self {
            host: args.host.clone(),
            port: args.port,
            mode,
            access_key,
            forward_proxy,
            max_connections,
            gate_limits: GateLimits {
                max_waiting: args.max_waiting,
                acquire_timeout: args.acquire_timeout_ms.map(Duration::from_millis),
            },
            upstream_timeout: args.upstream_timeout_ms.map(Duration::from_millis),
        })
    }

    /// The token the auth guard enforces; `None` in development mode.
    #[must_use]
    pub fn required_access_key(&self) -> Option<&str> {
        if self.mode.is_production() {
            self.access_key.as_deref()
        } else {
            None
        }
    }
}

/// Positive integer the semaphore can hold, or `None` when the value
/// cannot be used as a capacity.
#[must_use]
pub fn parse_max_connections(raw: &str) -> Option<usize> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=Semaphore::MAX_PERMITS).contains(n))
}

/// Forward proxies are reached over plain HTTP and tunnelled with `CONNECT`.
pub fn parse_forward_proxy(raw: &str) -> Result<Url, GatewayError> {
    let invalid = |reason: String| GatewayError::InvalidProxyUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" {
        return Err(invalid(format!(
            "unsupported scheme '{}' (expected http)",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".into()));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(invalid("proxy credentials are not supported".into()));
    }
    Ok(url)
}
