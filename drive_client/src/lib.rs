//! REST client for the Google Drive v3 API.
//!
//! Covers the three calls the gallery needs: listing the image files of a
//! folder, fetching a single file's metadata and downloading file content.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One file entry as reported by `files.list` / `files.get`.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: Option<String>,
    pub created_time: Option<String>,
    /// Drive reports sizes as decimal strings.
    pub size: Option<String>,
    pub web_view_link: Option<String>,
    pub thumbnail_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFilesResponse {
    files: Option<Vec<DriveFile>>,
    next_page_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum DriveClientError {
    #[error("Request Error: {0}")]
    Request(String),
    #[error("Google Drive API Error: {0}")]
    Api(String),
    #[error("Other Error: {0}")]
    Other(String),
}

const FILE_FIELDS: &str = "id, name, mimeType, createdTime, size, webViewLink, thumbnailLink";

/// Human-viewable URL of a Drive folder.
pub fn folder_url(folder_id: &str) -> String {
    format!("https://drive.google.com/drive/folders/{}", folder_id)
}

#[derive(Debug, Clone)]
pub struct DriveClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl DriveClient {
    pub fn new(access_token: String) -> Self {
        DriveClient {
            client: reqwest::Client::new(),
            access_token,
            base_url: "https://www.googleapis.com".to_string(),
        }
    }

    /// Create a client with a custom API base URL. Mainly used for testing.
    pub fn with_base_url(access_token: String, base_url: String) -> Self {
        DriveClient {
            client: reqwest::Client::new(),
            access_token,
            base_url,
        }
    }

    pub fn set_access_token(&mut self, token: String) {
        self.access_token = token;
    }

    /// List one page of non-trashed image files in `folder_id`, newest first.
    pub async fn list_folder_images(
        &self,
        folder_id: &str,
        page_token: Option<String>,
    ) -> Result<(Vec<DriveFile>, Option<String>), DriveClientError> {
        let url = format!("{}/drive/v3/files", self.base_url);
        let query = format!(
            "'{}' in parents and mimeType contains 'image/' and trashed = false",
            folder_id
        );
        let fields = format!("nextPageToken, files({})", FILE_FIELDS);

        let mut request = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .query(&[
                ("q", query.as_str()),
                ("orderBy", "createdTime desc"),
                ("pageSize", "100"),
                ("fields", fields.as_str()),
            ]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DriveClientError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DriveClientError::Api(error_text));
        }

        let list_response = response
            .json::<ListFilesResponse>()
            .await
            .map_err(|e| DriveClientError::Request(e.to_string()))?;

        Ok((
            list_response.files.unwrap_or_default(),
            list_response.next_page_token,
        ))
    }

    /// Fetch metadata for a single file.
    pub async fn get_file(&self, file_id: &str) -> Result<DriveFile, DriveClientError> {
        let url = format!("{}/drive/v3/files/{}", self.base_url, file_id);
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .query(&[("fields", FILE_FIELDS)])
            .send()
            .await
            .map_err(|e| DriveClientError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DriveClientError::Api(error_text));
        }

        response
            .json::<DriveFile>()
            .await
            .map_err(|e| DriveClientError::Request(e.to_string()))
    }

    /// Download the binary content of a file (`alt=media`).
    ///
    /// Returns the bytes and the content type reported by Drive, falling
    /// back to `image/jpeg` when the header is missing or unreadable.
    pub async fn download_file(
        &self,
        file_id: &str,
    ) -> Result<(Vec<u8>, String), DriveClientError> {
        let url = format!("{}/drive/v3/files/{}", self.base_url, file_id);
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(|e| DriveClientError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DriveClientError::Api(error_text));
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DriveClientError::Request(e.to_string()))?;

        Ok((bytes.to_vec(), mime_type))
    }
}
