use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Photo not found")]
    NotFound,

    #[error("Invalid upload: {0}")]
    BadUpload(String),

    #[error(transparent)]
    Import(#[from] importer::ImportError),

    #[error(transparent)]
    Store(#[from] store::StoreError),

    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::Import(_) | ApiError::Store(_) | ApiError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Sync failures carry the explicit success flag the gallery checks.
        let body = match &self {
            ApiError::Import(_) => json!({ "error": self.to_string(), "success": false }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
