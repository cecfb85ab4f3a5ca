//! Importers that feed the photo store.
//!
//! [`LocalImporter`] scans a watched directory for new image files and
//! copies them into the served uploads directory. [`DriveImporter`] diffs a
//! Google Drive folder listing against the store. Both are append-only and
//! dedup before writing, so running them repeatedly is idempotent.

use chrono::{SecondsFormat, Utc};
use std::path::Path;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use uuid::Uuid;

mod drive;
mod local;

pub use drive::{record_from_drive_file, DriveImporter, DriveSyncOutcome};
pub use local::{LocalImporter, LocalSyncOutcome};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Configuration Error: {0}")]
    Configuration(String),
    #[error("Google Drive Error: {0}")]
    Drive(#[from] drive_client::DriveClientError),
    #[error("Store Error: {0}")]
    Store(#[from] store::StoreError),
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extensions accepted by the local importer, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|known| *known == ext)
        })
        .unwrap_or(false)
}

/// Locally generated record id: unix millis plus a short random suffix.
pub fn synthesize_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}", millis, &suffix[..6])
}

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Run both importers on a fixed interval until the returned sender fires.
///
/// A failed tick is logged and dropped; the next tick simply retries. There
/// is no backoff and no cancellation of an in-flight sync.
pub fn start_periodic_sync(
    local: LocalImporter,
    drive: Option<DriveImporter>,
    interval: Duration,
) -> (JoinHandle<()>, oneshot::Sender<()>) {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    break;
                }
                _ = async {
                    match local.sync().await {
                        Ok(outcome) => {
                            tracing::info!(photos = outcome.photos.len(), "{}", outcome.message)
                        }
                        Err(e) => tracing::error!(error = %e, "Local folder sync failed"),
                    }
                    if let Some(drive) = &drive {
                        match drive.sync().await {
                            Ok(outcome) => {
                                tracing::info!(photos = outcome.photos.len(), "{}", outcome.message)
                            }
                            Err(e) => tracing::error!(error = %e, "Google Drive sync failed"),
                        }
                    }
                    sleep(interval).await;
                } => {}
            }
        }
    });
    (handle, shutdown_tx)
}
