#![forbid(unsafe_code)]

mod error;
mod routes;

use std::net::SocketAddr;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use momentum_core::Clock;
use services::AppServices;

/// Habit and earnings tracker backend.
#[derive(Debug, Parser)]
#[command(name = "momentum", version)]
struct Args {
    /// SQLite database URL.
    #[arg(
        long,
        env = "MOMENTUM_DATABASE_URL",
        default_value = "sqlite:momentum.db?mode=rwc"
    )]
    database_url: String,

    /// Address to listen on.
    #[arg(long, env = "MOMENTUM_LISTEN_ADDR", default_value = "127.0.0.1:4000")]
    listen_addr: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let services = AppServices::new_sqlite(&args.database_url, Clock::default_clock()).await?;
    let router = routes::build_router(services);

    let listener = tokio::net::TcpListener::bind(args.listen_addr).await?;
    info!("listening on http://{}", args.listen_addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
    }
}
