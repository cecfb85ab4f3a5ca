use drive_client::DriveClient;
use importer::{DriveImporter, LocalImporter};
use std::path::PathBuf;
use store::PhotoStore;

/// Shared handler state. The Drive pieces are optional: without a folder id
/// and token the sync route reports a configuration error and the proxy
/// serves the placeholder.
#[derive(Clone)]
pub struct AppState {
    pub store: PhotoStore,
    pub local: LocalImporter,
    pub drive: Option<DriveImporter>,
    pub drive_client: Option<DriveClient>,
    pub uploads_dir: PathBuf,
}
