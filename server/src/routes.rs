use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use importer::ImportError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use store::PhotoRecord;

pub(crate) const PLACEHOLDER_SVG: &str = include_str!("../assets/placeholder-image.svg");
const GALLERY_PAGE: &str = include_str!("../assets/index.html");

#[derive(Debug, Deserialize)]
pub struct PhotoFilter {
    pub name: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub photo: PhotoRecord,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveSyncResponse {
    pub message: String,
    pub photos: Vec<PhotoRecord>,
    pub folder_url: String,
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchResponse {
    pub message: String,
    pub photos: Vec<PhotoRecord>,
    pub watch_folder: String,
}

/// `GET /photos?name=&date=`
pub async fn list_photos(
    State(state): State<AppState>,
    Query(filter): Query<PhotoFilter>,
) -> Result<Json<Vec<PhotoRecord>>, ApiError> {
    let name = filter.name.unwrap_or_default();
    let date = filter.date.unwrap_or_default();

    let photos = state
        .store
        .get_all_async()
        .await?
        .into_iter()
        .filter(|p| gallery::matches_name(p, &name) && gallery::matches_date(p, &date))
        .collect();
    Ok(Json(photos))
}

/// `POST /photos` — multipart form with a single `file` field.
pub async fn upload_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadUpload(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ApiError::BadUpload("file field has no filename".into()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadUpload(e.to_string()))?;

        let id = importer::synthesize_id();
        // Prefix with the id so uploads never collide with each other or
        // with watch-folder imports.
        let filename = format!("{}_{}", id, name);
        tokio::fs::create_dir_all(&state.uploads_dir).await?;
        tokio::fs::write(state.uploads_dir.join(&filename), &bytes).await?;

        let photo = PhotoRecord {
            id,
            name,
            filename,
            upload_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            size: bytes.len() as i64,
            drive_data: None,
        };
        state.store.append_async(photo.clone()).await?;
        tracing::info!(id = %photo.id, name = %photo.name, size = photo.size, "Photo uploaded");

        return Ok(Json(UploadResponse {
            message: "Photo uploaded successfully".to_string(),
            photo,
        }));
    }
    Err(ApiError::BadUpload("missing 'file' field".into()))
}

/// `GET /photos/{id}`
pub async fn get_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PhotoRecord>, ApiError> {
    state
        .store
        .get_by_id_async(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// `DELETE /photos/{id}` — acknowledged but not performed; deletion
/// semantics (including whether the backing file goes too) are still open.
pub async fn delete_photo(Path(id): Path<String>) -> Json<serde_json::Value> {
    Json(json!({ "message": format!("Photo {} deleted successfully", id) }))
}

/// `GET /photos/drive-sync`
pub async fn drive_sync(
    State(state): State<AppState>,
) -> Result<Json<DriveSyncResponse>, ApiError> {
    let importer = state.drive.as_ref().ok_or_else(|| {
        ApiError::Import(ImportError::Configuration(
            "Google Drive folder is not configured".into(),
        ))
    })?;
    let outcome = importer.sync().await?;
    Ok(Json(DriveSyncResponse {
        message: outcome.message,
        photos: outcome.photos,
        folder_url: outcome.folder_url,
        success: true,
    }))
}

/// `GET /photos/watch`
pub async fn watch(State(state): State<AppState>) -> Result<Json<WatchResponse>, ApiError> {
    let outcome = state.local.sync().await?;
    Ok(Json(WatchResponse {
        message: outcome.message,
        photos: outcome.photos,
        watch_folder: outcome.watch_folder,
    }))
}

/// `GET /drive-image/{fileId}` — server-side proxy for Drive file content.
///
/// Successful responses carry the Drive-reported content type and a 24-hour
/// cache directive; any failure degrades to the placeholder SVG with a 404.
pub async fn drive_image(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Response {
    let client = match &state.drive_client {
        Some(client) => client,
        None => {
            tracing::warn!(%file_id, "Drive image requested without a configured client");
            return placeholder_not_found();
        }
    };

    match client.download_file(&file_id).await {
        Ok((bytes, mime_type)) => (
            [
                (header::CONTENT_TYPE, mime_type),
                (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, %file_id, "Failed to proxy Drive image");
            placeholder_not_found()
        }
    }
}

fn placeholder_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "image/svg+xml")],
        PLACEHOLDER_SVG,
    )
        .into_response()
}

/// `GET /placeholder-image.svg` — final step of every fallback chain.
pub async fn placeholder_image() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], PLACEHOLDER_SVG)
}

/// `GET /` — the embedded gallery page.
pub async fn gallery_page() -> Html<&'static str> {
    Html(GALLERY_PAGE)
}
