//! Persistent photo-metadata store backed by SQLite.
//!
//! The store is an insertion-ordered, append-only collection of
//! [`PhotoRecord`]s. Importers never update or delete records; each append
//! is a single atomic INSERT, so overlapping sync calls cannot lose each
//! other's writes.

use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database Error: {0}")]
    Database(String),
    #[error("Duplicate photo id: {0}")]
    DuplicateId(String),
    #[error("Other Error: {0}")]
    Other(String),
}

/// Drive-side details of a remote-sourced record.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DriveData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// One photo, local or Drive-sourced.
///
/// Local records have `drive_data == None` and a `filename` that resolves
/// under the served uploads directory. Drive records carry the Drive file
/// id as their `id` and keep the Drive links in `drive_data`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    pub id: String,
    pub name: String,
    pub filename: String,
    pub upload_date: String,
    pub size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_data: Option<DriveData>,
}

impl PhotoRecord {
    pub fn is_remote(&self) -> bool {
        self.drive_data.is_some()
    }
}

#[derive(Clone)]
pub struct PhotoStore {
    conn: Arc<Mutex<Connection>>,
}

fn apply_migrations(conn: &mut Connection) -> Result<(), StoreError> {
    let migrations = Migrations::new(vec![M::up(
        "CREATE TABLE IF NOT EXISTS photos (\
             id TEXT PRIMARY KEY,\
             name TEXT NOT NULL,\
             filename TEXT NOT NULL,\
             upload_date TEXT NOT NULL,\
             size INTEGER NOT NULL,\
             drive_file_id TEXT,\
             web_view_link TEXT,\
             thumbnail_link TEXT,\
             drive_mime_type TEXT\
         );\
         CREATE INDEX IF NOT EXISTS idx_photos_filename ON photos (filename);",
    )]);
    migrations
        .to_latest(conn)
        .map_err(|e| StoreError::Database(format!("Failed to apply migrations: {}", e)))
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<PhotoRecord> {
    let drive_file_id: Option<String> = row.get(5)?;
    let web_view_link: Option<String> = row.get(6)?;
    let thumbnail_link: Option<String> = row.get(7)?;
    let drive_mime_type: Option<String> = row.get(8)?;

    let drive_data = if drive_file_id.is_some()
        || web_view_link.is_some()
        || thumbnail_link.is_some()
        || drive_mime_type.is_some()
    {
        Some(DriveData {
            file_id: drive_file_id,
            web_view_link,
            thumbnail_link,
            mime_type: drive_mime_type,
        })
    } else {
        None
    };

    Ok(PhotoRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        filename: row.get(2)?,
        upload_date: row.get(3)?,
        size: row.get(4)?,
        drive_data,
    })
}

const RECORD_COLUMNS: &str = "id, name, filename, upload_date, size, \
     drive_file_id, web_view_link, thumbnail_link, drive_mime_type";

impl PhotoStore {
    pub fn new(db_path: &Path) -> Result<Self, StoreError> {
        let mut conn = Connection::open(db_path)
            .map_err(|e| StoreError::Database(format!("Failed to open database: {}", e)))?;
        apply_migrations(&mut conn)?;
        Ok(PhotoStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Other("Poisoned lock".into()))
    }

    /// All records in insertion order. A fresh database yields an empty
    /// vec, not an error.
    pub fn get_all(&self) -> Result<Vec<PhotoRecord>, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM photos ORDER BY rowid",
                RECORD_COLUMNS
            ))
            .map_err(|e| StoreError::Database(format!("Failed to prepare statement: {}", e)))?;

        let iter = stmt
            .query_map([], row_to_record)
            .map_err(|e| StoreError::Database(format!("Failed to query photos: {}", e)))?;

        let mut records = Vec::new();
        for record in iter {
            records.push(record.map_err(|e| {
                StoreError::Database(format!("Failed to read photo row: {}", e))
            })?);
        }
        Ok(records)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<PhotoRecord>, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM photos WHERE id = ?1",
                RECORD_COLUMNS
            ))
            .map_err(|e| StoreError::Database(format!("Failed to prepare statement: {}", e)))?;

        stmt.query_row(params![id], row_to_record)
            .optional()
            .map_err(|e| StoreError::Database(format!("Failed to query photo: {}", e)))
    }

    /// Append one record. Fails with [`StoreError::DuplicateId`] when the
    /// id is already present; importers dedup before calling this.
    pub fn append(&self, record: &PhotoRecord) -> Result<(), StoreError> {
        let drive = record.drive_data.as_ref();
        let conn = self.lock_conn()?;
        let result = conn.execute(
            "INSERT INTO photos (\
                 id, name, filename, upload_date, size,\
                 drive_file_id, web_view_link, thumbnail_link, drive_mime_type\
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id,
                record.name,
                record.filename,
                record.upload_date,
                record.size,
                drive.and_then(|d| d.file_id.clone()),
                drive.and_then(|d| d.web_view_link.clone()),
                drive.and_then(|d| d.thumbnail_link.clone()),
                drive.and_then(|d| d.mime_type.clone()),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateId(record.id.clone()))
            }
            Err(e) => Err(StoreError::Database(format!(
                "Failed to insert photo: {}",
                e
            ))),
        }
    }

    /// Filenames already present, the dedup key for local import.
    pub fn filenames(&self) -> Result<HashSet<String>, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn
            .prepare("SELECT filename FROM photos")
            .map_err(|e| StoreError::Database(format!("Failed to prepare statement: {}", e)))?;
        let iter = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::Database(format!("Failed to query filenames: {}", e)))?;

        let mut names = HashSet::new();
        for name in iter {
            names.insert(name.map_err(|e| {
                StoreError::Database(format!("Failed to read filename row: {}", e))
            })?);
        }
        Ok(names)
    }

    /// Record ids already present, the dedup key for Drive import.
    pub fn ids(&self) -> Result<HashSet<String>, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn
            .prepare("SELECT id FROM photos")
            .map_err(|e| StoreError::Database(format!("Failed to prepare statement: {}", e)))?;
        let iter = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::Database(format!("Failed to query ids: {}", e)))?;

        let mut ids = HashSet::new();
        for id in iter {
            ids.insert(
                id.map_err(|e| StoreError::Database(format!("Failed to read id row: {}", e)))?,
            );
        }
        Ok(ids)
    }

    pub fn contains_id(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.get_by_id(id)?.is_some())
    }

    pub async fn get_all_async(&self) -> Result<Vec<PhotoRecord>, StoreError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.get_all())
            .await
            .map_err(|e| StoreError::Other(e.to_string()))?
    }

    pub async fn get_by_id_async(&self, id: String) -> Result<Option<PhotoRecord>, StoreError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.get_by_id(&id))
            .await
            .map_err(|e| StoreError::Other(e.to_string()))?
    }

    pub async fn append_async(&self, record: PhotoRecord) -> Result<(), StoreError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.append(&record))
            .await
            .map_err(|e| StoreError::Other(e.to_string()))?
    }

    pub async fn filenames_async(&self) -> Result<HashSet<String>, StoreError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.filenames())
            .await
            .map_err(|e| StoreError::Other(e.to_string()))?
    }

    pub async fn ids_async(&self) -> Result<HashSet<String>, StoreError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.ids())
            .await
            .map_err(|e| StoreError::Other(e.to_string()))?
    }
}
