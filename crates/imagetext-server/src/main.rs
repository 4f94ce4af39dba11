use anyhow::{Context, Result};
use clap::Parser;
use imagetext_service::LocalService;
use tokio::net::TcpListener;
use tracing::{info, warn};

use imagetext_server::config::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;
    config.validate()?;

    let ocr = imagetext_ocr::create_engine(&config.ocr_config());

    if let Some(Commands::Ocr { path }) = cli.command {
        let text = imagetext_server::run_ocr(ocr.as_ref(), &path).await?;
        println!("{text}");
        return Ok(());
    }

    if let Err(e) = ocr.preflight_check().await {
        warn!("{} not usable, uploads will fail until it is: {e}", ocr.name());
    }

    let db = imagetext_db::open_database(&config.db_config())
        .await
        .context("failed to open database")?;

    let service = LocalService::new(db, ocr);
    let state = imagetext_server::app_state(service, &config);

    let addr = config.addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("imagetext-server listening on http://{addr}");

    imagetext_server::serve(listener, state).await
}
