//! Watch-folder import into the served uploads directory.

use crate::{is_image_file, now_rfc3339, synthesize_id, ImportError};
use std::path::PathBuf;
use store::{PhotoRecord, PhotoStore};
use tokio::fs;

#[derive(Debug, Clone)]
pub struct LocalSyncOutcome {
    pub message: String,
    pub photos: Vec<PhotoRecord>,
    pub watch_folder: String,
}

#[derive(Clone)]
pub struct LocalImporter {
    store: PhotoStore,
    watch_dir: PathBuf,
    uploads_dir: PathBuf,
}

impl LocalImporter {
    pub fn new(store: PhotoStore, watch_dir: PathBuf, uploads_dir: PathBuf) -> Self {
        LocalImporter {
            store,
            watch_dir,
            uploads_dir,
        }
    }

    pub fn watch_dir(&self) -> &PathBuf {
        &self.watch_dir
    }

    /// Import every previously-unseen image file from the watch folder.
    ///
    /// New files are copied into the uploads directory under their original
    /// filename, which is also the dedup key against the store. The record's
    /// `uploadDate` is the copy time, not the source file's own timestamp.
    /// Any I/O error aborts the call; files already copied by the same call
    /// stay in place.
    pub async fn sync(&self) -> Result<LocalSyncOutcome, ImportError> {
        let watch_folder = self.watch_dir.display().to_string();

        if fs::metadata(&self.watch_dir).await.is_err() {
            fs::create_dir_all(&self.watch_dir).await?;
            tracing::info!(folder = %watch_folder, "Created watch folder");
            return Ok(LocalSyncOutcome {
                message: "Watch folder created, add images to it".to_string(),
                photos: self.store.get_all_async().await?,
                watch_folder,
            });
        }

        fs::create_dir_all(&self.uploads_dir).await?;
        let known = self.store.filenames_async().await?;

        let mut imported: u64 = 0;
        let mut entries = fs::read_dir(&self.watch_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() || !is_image_file(&path) {
                continue;
            }
            let file_name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => {
                    tracing::warn!(path = %path.display(), "Skipping non-UTF-8 filename");
                    continue;
                }
            };
            if known.contains(&file_name) {
                continue;
            }

            let dest = self.uploads_dir.join(&file_name);
            fs::copy(&path, &dest).await?;
            let size = fs::metadata(&dest).await?.len() as i64;

            let record = PhotoRecord {
                id: synthesize_id(),
                name: file_name.clone(),
                filename: file_name,
                upload_date: now_rfc3339(),
                size,
                drive_data: None,
            };
            self.store.append_async(record).await?;
            imported += 1;
        }

        let message = if imported == 0 {
            "Watch folder is up to date".to_string()
        } else {
            format!("Imported {} new photos from watch folder", imported)
        };
        tracing::info!(imported, folder = %watch_folder, "Local folder sync finished");

        Ok(LocalSyncOutcome {
            message,
            photos: self.store.get_all_async().await?,
            watch_folder,
        })
    }
}
