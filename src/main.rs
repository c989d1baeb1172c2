//! Devtools HTTP server - main entry point.
//!
//! Serves tool discovery and invocation over HTTP, with a background task
//! sweeping expired rate-limit windows.

use clap::Parser;
use devtools_core::api::{create_router, AppState};
use devtools_core::types::ENV_LISTEN_ADDR;
use devtools_core::{Config, Orchestrator};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(name = "devtools-server", version, about = "Developer utility tool server")]
struct Args {
    /// YAML configuration file.
    #[arg(long, env = "DEVTOOLS_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind, overriding the configuration file.
    #[arg(long, env = ENV_LISTEN_ADDR)]
    listen_addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(addr) = args.listen_addr {
        config.server.listen_addr = addr;
    }

    devtools_core::observability::init_tracing(&config.observability);

    let orchestrator = Arc::new(Orchestrator::from_config(&config)?);

    let cancel = CancellationToken::new();
    let sweeper = orchestrator
        .limiter()
        .spawn_sweeper(config.rate_limit.sweep_interval, cancel.clone());

    let app = create_router(
        AppState {
            orchestrator: Arc::clone(&orchestrator),
            trust_forwarded_headers: config.server.trust_forwarded_headers,
        },
        config.server.max_body_bytes,
    );

    let addr: SocketAddr = config.server.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Devtools server starting on {}", addr);
    tracing::info!(
        "  tools={}, rate_limit={} per {:?}, trust_forwarded_headers={}",
        orchestrator.registry().len(),
        config.rate_limit.max_requests,
        config.rate_limit.window,
        config.server.trust_forwarded_headers
    );

    let shutdown = cancel.clone();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("ctrl_c_listener_failed: {}", e);
        }
        tracing::info!("Shutdown signal received");
        shutdown.cancel();
    })
    .await?;

    cancel.cancel();
    sweeper.await?;
    Ok(())
}
