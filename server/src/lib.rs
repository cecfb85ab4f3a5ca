//! HTTP surface of the gallery service.
//!
//! Thin axum handlers over the store and the importers; all photo logic
//! lives in the `store`, `importer` and `gallery` crates.

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    // The literal /photos/* routes must not be captured by /photos/:id.
    Router::new()
        .route("/", get(routes::gallery_page))
        .route(
            "/photos",
            get(routes::list_photos).post(routes::upload_photo),
        )
        .route("/photos/drive-sync", get(routes::drive_sync))
        .route("/photos/watch", get(routes::watch))
        .route(
            "/photos/:id",
            get(routes::get_photo).delete(routes::delete_photo),
        )
        .route("/drive-image/:file_id", get(routes::drive_image))
        .route("/placeholder-image.svg", get(routes::placeholder_image))
        .nest_service("/uploads", ServeDir::new(state.uploads_dir.clone()))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(state: AppState, port: u16) -> std::io::Result<()> {
    let app = router(state);

    let address = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
