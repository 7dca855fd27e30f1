//! `fetchgate run`: start the gateway.
//!
//! Resolves [`Settings`] from flags and environment, builds the shared
//! state (admission gate and upstream clients), and serves the Axum
//! router until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config::Settings;
use crate::error::GatewayError;
use crate::logging;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), GatewayError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let settings = Settings::from_args(&args).inspect_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
    })?;

    let state = Arc::new(AppState::from_settings(&settings)?);
    let router = server::build_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        mode = %settings.mode,
        max_connections = settings.max_connections,
        max_waiting = ?settings.gate_limits.max_waiting,
        acquire_timeout = ?settings.gate_limits.acquire_timeout,
        forward_proxy = settings.forward_proxy.is_some(),
        "fetchgate started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("fetchgate stopped");
    Ok(())
}
