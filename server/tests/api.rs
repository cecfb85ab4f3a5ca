use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use drive_client::DriveClient;
use http_body_util::BodyExt;
use importer::LocalImporter;
use mockito::{Matcher, Server};
use server::AppState;
use store::{PhotoRecord, PhotoStore};
use tempfile::{tempdir, NamedTempFile, TempDir};
use tower::ServiceExt;

struct TestEnv {
    state: AppState,
    _db: NamedTempFile,
    _dirs: TempDir,
}

fn test_env() -> TestEnv {
    let db = NamedTempFile::new().expect("create temp db");
    let store = PhotoStore::new(db.path()).expect("create store");
    let dirs = tempdir().expect("create temp dirs");
    let watch = dirs.path().join("watch");
    let uploads = dirs.path().join("uploads");
    std::fs::create_dir_all(&watch).unwrap();
    std::fs::create_dir_all(&uploads).unwrap();

    let state = AppState {
        store: store.clone(),
        local: LocalImporter::new(store, watch, uploads.clone()),
        drive: None,
        drive_client: None,
        uploads_dir: uploads,
    };
    TestEnv {
        state,
        _db: db,
        _dirs: dirs,
    }
}

fn local_record(id: &str, name: &str, upload_date: &str) -> PhotoRecord {
    PhotoRecord {
        id: id.into(),
        name: name.into(),
        filename: name.into(),
        upload_date: upload_date.into(),
        size: 1,
        drive_data: None,
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn empty_store_lists_empty_array() {
    let env = test_env();
    let app = server::router(env.state.clone());

    let response = app
        .oneshot(Request::builder().uri("/photos").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn upload_then_list_roundtrip() {
    let env = test_env();
    let app = server::router(env.state.clone());

    let boundary = "XBOUNDARY";
    let payload = "a".repeat(1024);
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"vacation.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         {payload}\r\n\
         --{boundary}--\r\n"
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/photos")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let uploaded = body_json(response).await;
    assert_eq!(uploaded["message"], "Photo uploaded successfully");
    assert_eq!(uploaded["photo"]["name"], "vacation.png");
    assert_eq!(uploaded["photo"]["size"], 1024);
    let id = uploaded["photo"]["id"].as_str().unwrap();
    assert!(!id.is_empty());

    // The stored file lands under the uploads directory.
    let filename = uploaded["photo"]["filename"].as_str().unwrap();
    assert!(env.state.uploads_dir.join(filename).is_file());

    let response = app
        .oneshot(Request::builder().uri("/photos").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let photos = body_json(response).await;
    let photos = photos.as_array().unwrap();
    assert_eq!(photos.len(), 1);
    assert_eq!(photos[0]["name"], "vacation.png");
    assert_eq!(photos[0]["size"], 1024);
    assert!(photos[0].get("driveData").is_none());
}

#[tokio::test]
async fn filters_apply_to_listing() {
    let env = test_env();
    env.state
        .store
        .append(&local_record("1", "Sunset.jpg", "2024-05-01T10:00:00Z"))
        .unwrap();
    env.state
        .store
        .append(&local_record("2", "Beach.png", "2024-05-02T09:00:00Z"))
        .unwrap();
    let app = server::router(env.state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/photos?name=sun")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let photos = body_json(response).await;
    assert_eq!(photos.as_array().unwrap().len(), 1);
    assert_eq!(photos[0]["name"], "Sunset.jpg");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/photos?date=2024-05-02")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let photos = body_json(response).await;
    assert_eq!(photos.as_array().unwrap().len(), 1);
    assert_eq!(photos[0]["name"], "Beach.png");
}

#[tokio::test]
async fn get_photo_by_id_and_not_found() {
    let env = test_env();
    env.state
        .store
        .append(&local_record("p1", "a.jpg", "2024-05-01T10:00:00Z"))
        .unwrap();
    let app = server::router(env.state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/photos/p1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], "p1");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/photos/missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "error": "Photo not found" })
    );
}

#[tokio::test]
async fn delete_is_a_stub() {
    let env = test_env();
    env.state
        .store
        .append(&local_record("p1", "a.jpg", "2024-05-01T10:00:00Z"))
        .unwrap();
    let app = server::router(env.state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/photos/p1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("p1"));

    // Nothing actually removed.
    assert_eq!(env.state.store.get_all().unwrap().len(), 1);
}

#[tokio::test]
async fn drive_sync_without_configuration_is_an_error() {
    let env = test_env();
    let app = server::router(env.state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/photos/drive-sync")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("not configured"));

    // Never a partially-written store.
    assert!(env.state.store.get_all().unwrap().is_empty());
}

#[tokio::test]
async fn watch_route_reports_folder() {
    let env = test_env();
    let app = server::router(env.state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/photos/watch")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["watchFolder"].as_str().unwrap().contains("watch"));
    assert_eq!(body["photos"], serde_json::json!([]));
}

#[tokio::test]
async fn drive_image_proxies_bytes_with_cache_header() {
    let mut mock_drive = Server::new_async().await;
    let _m = mock_drive
        .mock("GET", "/drive/v3/files/abc")
        .match_query(Matcher::UrlEncoded("alt".into(), "media".into()))
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body("pngbytes")
        .create_async()
        .await;

    let mut env = test_env();
    env.state.drive_client = Some(DriveClient::with_base_url(
        "token".into(),
        mock_drive.url(),
    ));
    let app = server::router(env.state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/drive-image/abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE.as_str()],
        "image/png"
    );
    assert_eq!(
        response.headers()[header::CACHE_CONTROL.as_str()],
        "public, max-age=86400"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"pngbytes");
}

#[tokio::test]
async fn drive_image_failure_returns_placeholder_svg() {
    let env = test_env();
    let app = server::router(env.state.clone());

    // No Drive client configured at all.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/drive-image/abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE.as_str()],
        "image/svg+xml"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(std::str::from_utf8(&bytes).unwrap().contains("<svg"));
}

#[tokio::test]
async fn placeholder_route_serves_svg() {
    let env = test_env();
    let app = server::router(env.state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/placeholder-image.svg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE.as_str()],
        "image/svg+xml"
    );
}
