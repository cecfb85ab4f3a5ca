//! Google Drive folder import.

use crate::{now_rfc3339, ImportError};
use drive_client::{folder_url, DriveClient, DriveFile};
use store::{DriveData, PhotoRecord, PhotoStore};

#[derive(Debug, Clone)]
pub struct DriveSyncOutcome {
    pub message: String,
    pub folder_url: String,
    pub photos: Vec<PhotoRecord>,
}

/// Map one Drive listing entry onto the persisted record shape.
///
/// The Drive file id doubles as both `id` and `filename`; `driveData`
/// carries the links the resolver needs.
pub fn record_from_drive_file(file: &DriveFile) -> PhotoRecord {
    let size = file
        .size
        .as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(0);
    PhotoRecord {
        id: file.id.clone(),
        name: file.name.clone(),
        filename: file.id.clone(),
        upload_date: file.created_time.clone().unwrap_or_else(now_rfc3339),
        size,
        drive_data: Some(DriveData {
            file_id: Some(file.id.clone()),
            web_view_link: file.web_view_link.clone(),
            thumbnail_link: file.thumbnail_link.clone(),
            mime_type: file.mime_type.clone(),
        }),
    }
}

#[derive(Clone)]
pub struct DriveImporter {
    client: DriveClient,
    store: PhotoStore,
    folder_id: String,
}

impl DriveImporter {
    pub fn new(client: DriveClient, store: PhotoStore, folder_id: String) -> Self {
        DriveImporter {
            client,
            store,
            folder_id,
        }
    }

    /// Diff the Drive folder listing against the store and append what is new.
    ///
    /// The complete listing is collected before anything is written, so a
    /// failed or partial listing never leaves a partially-updated store.
    pub async fn sync(&self) -> Result<DriveSyncOutcome, ImportError> {
        tracing::info!(folder = %self.folder_id, "Starting Google Drive sync");

        let mut files: Vec<DriveFile> = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let (page, next_page_token) = self
                .client
                .list_folder_images(&self.folder_id, page_token)
                .await?;
            files.extend(page);
            if next_page_token.is_none() {
                break;
            }
            page_token = next_page_token;
        }

        let known = self.store.ids_async().await?;
        let mut appended: u64 = 0;
        for file in &files {
            if known.contains(&file.id) {
                continue;
            }
            self.store
                .append_async(record_from_drive_file(file))
                .await?;
            appended += 1;
        }

        let message = if appended == 0 {
            "Google Drive folder is up to date".to_string()
        } else {
            format!("Synced {} new photos from Google Drive", appended)
        };
        tracing::info!(listed = files.len(), appended, "Google Drive sync finished");

        Ok(DriveSyncOutcome {
            message,
            folder_url: folder_url(&self.folder_id),
            photos: self.store.get_all_async().await?,
        })
    }
}
