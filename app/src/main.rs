//! Main entry point for the Galleria photo gallery server.

use clap::Parser;
use drive_client::DriveClient;
use importer::{DriveImporter, LocalImporter};
use server::AppState;
use std::path::PathBuf;
use store::PhotoStore;
use tokio::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{AppConfig, AppConfigOverrides};

#[derive(Parser)]
#[command(name = "galleria", author, version, about = "Photo gallery server with Google Drive sync")]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override log level (e.g. info, debug)
    #[arg(long)]
    log_level: Option<String>,
    /// Override HTTP port
    #[arg(long)]
    port: Option<u16>,
    /// Override the watched import folder
    #[arg(long)]
    watch_folder: Option<PathBuf>,
    /// Override the uploads directory
    #[arg(long)]
    uploads_dir: Option<PathBuf>,
    /// Override the metadata database path
    #[arg(long)]
    db_path: Option<PathBuf>,
    /// Google Drive folder to sync from
    #[arg(long)]
    drive_folder_id: Option<String>,
    /// Override the background sync interval in seconds
    #[arg(long)]
    sync_interval_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = AppConfigOverrides {
        log_level: cli.log_level,
        port: cli.port,
        watch_folder: cli.watch_folder,
        uploads_dir: cli.uploads_dir,
        db_path: cli.db_path,
        drive_folder_id: cli.drive_folder_id,
        sync_interval_secs: cli.sync_interval_secs,
    };
    let cfg = AppConfig::load_from(cli.config).apply_overrides(&overrides);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level)),
        )
        .init();

    if let Some(parent) = cfg.db_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let store = PhotoStore::new(&cfg.db_path)?;
    info!(db = %cfg.db_path.display(), "Photo store opened");

    let local = LocalImporter::new(
        store.clone(),
        cfg.watch_folder.clone(),
        cfg.uploads_dir.clone(),
    );

    let (drive_client, drive) = match &cfg.drive_folder_id {
        Some(folder_id) => match std::env::var("GOOGLE_ACCESS_TOKEN") {
            Ok(token) => {
                let client = DriveClient::new(token);
                let importer =
                    DriveImporter::new(client.clone(), store.clone(), folder_id.clone());
                info!(%folder_id, "Google Drive sync enabled");
                (Some(client), Some(importer))
            }
            Err(_) => {
                warn!("GOOGLE_ACCESS_TOKEN is not set, Google Drive sync disabled");
                (None, None)
            }
        },
        None => {
            info!("No Drive folder configured, serving local photos only");
            (None, None)
        }
    };

    let (sync_handle, shutdown_tx) = importer::start_periodic_sync(
        local.clone(),
        drive.clone(),
        Duration::from_secs(cfg.sync_interval_secs),
    );

    let state = AppState {
        store,
        local,
        drive,
        drive_client,
        uploads_dir: cfg.uploads_dir.clone(),
    };
    server::serve(state, cfg.port).await?;

    let _ = shutdown_tx.send(());
    sync_handle.await?;
    Ok(())
}
