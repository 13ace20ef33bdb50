//! Service host.
//!
//! Loads a host configuration, starts the configured servers through the
//! lifecycle controller, waits for SIGINT/SIGTERM and stops them again.
//!
//! ```text
//! config → logging/metrics → Server::start (each) → ready probe
//!        → wait for signal → Server::stop (each) → exit
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::{routing::get, Router};
use clap::Parser;

use server_lifecycle::config::{load_config, HostConfig};
use server_lifecycle::lifecycle::signals::wait_for_shutdown_signal;
use server_lifecycle::net::resolve::lookup_local_ip;
use server_lifecycle::observability::{logging, metrics};
use server_lifecycle::{with_handler, with_shutdown_timeout, with_tls, HttpOption, Server};

#[derive(Parser)]
#[command(name = "service-host")]
#[command(about = "Runs HTTP and RPC servers with a uniform start/ready/stop lifecycle", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override http.bind_address.
    #[arg(long)]
    http_addr: Option<String>,

    /// Override rpc.bind_address (also enables the RPC server).
    #[arg(long)]
    rpc_addr: Option<String>,
}

fn http_options(config: &HostConfig) -> Vec<HttpOption> {
    let handler = Router::new().route("/", get(|| async { concat!("service-host ", env!("CARGO_PKG_VERSION")) }));

    let mut options = vec![
        with_handler(handler),
        with_shutdown_timeout(Duration::from_secs(config.http.shutdown_timeout_secs)),
    ];
    if !config.http.cert_path.is_empty() || !config.http.key_path.is_empty() {
        options.push(with_tls(&config.http.cert_path, &config.http.key_path));
    }
    options
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HostConfig::default(),
    };
    if let Some(addr) = cli.http_addr {
        config.http.bind_address = addr;
    }
    if let Some(addr) = cli.rpc_addr {
        config.rpc.enabled = true;
        config.rpc.bind_address = addr;
    }

    logging::init_logging(&config.observability.log_level, config.observability.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        local_ip = ?lookup_local_ip().await,
        "service-host starting"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let mut http = config.http.enabled.then(|| Server::http(http_options(&config)));
    let mut rpc = config.rpc.enabled.then(|| Server::rpc([]));

    if let Some(server) = http.as_mut() {
        server.start(&config.http.bind_address).await?;
        match server.ready().await {
            Ok(ready) => tracing::info!(address = ?server.local_addr(), ready, "HTTP server ready check"),
            Err(e) => tracing::warn!(error = %e, "HTTP server not ready"),
        }
    }

    if let Some(server) = rpc.as_mut() {
        if let Err(e) = server.start(&config.rpc.bind_address).await {
            if let Some(http) = &http {
                let _ = http.stop().await;
            }
            return Err(e.into());
        }
        match server.ready().await {
            Ok(ready) => tracing::info!(address = ?server.local_addr(), ready, "RPC server ready check"),
            Err(e) => tracing::warn!(error = %e, "RPC server not ready"),
        }
    }

    wait_for_shutdown_signal().await?;
    tracing::info!("Shutting down");

    if let Some(server) = &rpc {
        if let Err(e) = server.stop().await {
            tracing::error!(error = %e, "RPC server stop failed");
        }
    }
    if let Some(server) = &http {
        if let Err(e) = server.stop().await {
            tracing::error!(error = %e, "HTTP server stop failed");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
