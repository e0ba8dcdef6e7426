use anyhow::Result;
use clap::Parser;
use infrastructure::ServerConfig;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gallery_server::{api, setup_app_state};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding default.toml and per-RUN_MODE overrides
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// API Port (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Item document path (overrides config)
    #[arg(long)]
    data_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,gallery_server=debug,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!("🖼️ Gallery Server Starting...");

    let mut config = ServerConfig::load(&args.config_dir)?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(data_file) = args.data_file {
        config.data_file = data_file;
    }

    info!(data_file = ?config.data_file, "Using data file");
    info!(public_dir = ?config.public_dir, "Serving static files");
    info!(uploads_dir = ?config.uploads_dir, "Uploading images");

    let addr = config.bind_addr();
    let state = setup_app_state(config).await?;

    match state.report_missing_images().await {
        Ok(0) => {}
        Ok(n) => warn!("⚠️ {} item(s) reference missing image files", n),
        Err(e) => warn!("Failed to check item images: {}", e),
    }

    let app = api::create_router(state);
    info!("🚀 API Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
