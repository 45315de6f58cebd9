use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sancert_core::config::load_config;
use sancert_core::tracing_init::{DEFAULT_FILTER, init_tracing};
use sancert_server::backend::{SupabaseClient, SupabaseConfig};
use sancert_server::routes::{AppState, build_router};
use tracing::info;

#[derive(Parser)]
#[command(version, about = "Media sanitization certificate service")]
struct Args {
    /// JSON config file
    #[arg(long, env = "SANCERT_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Backend project URL
    #[arg(long)]
    supabase_url: Option<String>,

    /// Storage bucket for certificate PDFs
    #[arg(long)]
    bucket: Option<String>,

    /// Table holding certificate records
    #[arg(long)]
    table: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(addr) = args.addr {
        config.server.listen_addr = addr;
    }
    if let Some(url) = args.supabase_url {
        config.backend.url = url;
    }
    if let Some(bucket) = args.bucket {
        config.backend.bucket = bucket;
    }
    if let Some(table) = args.table {
        config.backend.table = table;
    }
    config.server.log_json |= args.log_json;

    init_tracing(DEFAULT_FILTER, config.server.log_json)?;
    config.validate()?;

    let client = SupabaseClient::new(&SupabaseConfig::from_service_config(&config))
        .context("failed to build backend client")?;
    let state = AppState::new(Arc::new(client), config.server.max_body_bytes);

    info!(
        addr = %config.server.listen_addr,
        bucket = %config.backend.bucket,
        table = %config.backend.table,
        "starting sancert-server"
    );

    let listener = tokio::net::TcpListener::bind(config.server.listen_addr).await?;
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("sancert-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
