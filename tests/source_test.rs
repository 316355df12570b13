mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use helpers::{blobs_doc, memories_doc, metadata_doc, MockSource};
use keepsake::config::{DataConfig, KeepsakeConfig};
use keepsake::error::{LoadError, Resource};
use keepsake::health::{check_health, ResourceStatus};
use keepsake::service::TimelineService;
use keepsake::source::create_source;
use tempfile::TempDir;

fn write_data_dir(dir: &std::path::Path) {
    std::fs::write(dir.join("memories.json"), memories_doc(4).to_string()).unwrap();
    std::fs::write(dir.join("image_metadata.json"), metadata_doc(&[1, 2]).to_string()).unwrap();
    std::fs::write(dir.join("images.json"), blobs_doc(&[1, 2]).to_string()).unwrap();
}

#[tokio::test]
async fn filesystem_source_serves_the_timeline() {
    let tmp = TempDir::new().unwrap();
    write_data_dir(tmp.path());

    let mut config = KeepsakeConfig::default();
    config.data.base = tmp.path().to_string_lossy().into_owned();

    let service = TimelineService::from_config(&config).unwrap();
    let page = service.timeline_page(1).await;
    assert_eq!(page.total, 4);
    assert_eq!(page.events.len(), 1);
    assert!(!page.has_more);

    assert_eq!(
        service.resolve_image_by_id("2").await,
        "data:image/jpeg;base64,/9j/jpeg-2"
    );
}

#[tokio::test]
async fn filesystem_source_reports_missing_file() {
    let tmp = TempDir::new().unwrap();
    let config = DataConfig {
        base: tmp.path().to_string_lossy().into_owned(),
        ..DataConfig::default()
    };
    let source = create_source(&config).unwrap();

    let err = source.fetch(Resource::Memories).await.unwrap_err();
    assert!(matches!(err, LoadError::Io { resource: Resource::Memories, .. }));
    assert!(source.describe(Resource::Memories).ends_with("memories.json"));
}

async fn spawn_static_host() -> String {
    let router = Router::new()
        .route("/data/memories.json", get(|| async { memories_doc(5).to_string() }))
        .route(
            "/data/image_metadata.json",
            get(|| async { metadata_doc(&[3]).to_string() }),
        )
        .route(
            "/data/images.json",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/data/")
}

#[tokio::test]
async fn http_source_fetches_and_maps_status_errors() {
    let base = spawn_static_host().await;
    let mut config = KeepsakeConfig::default();
    config.data.base = base;

    let service = TimelineService::from_config(&config).unwrap();
    assert_eq!(service.load_metadata().await.total, 5);

    // The blob document answers 500: no image, no panic.
    assert_eq!(service.resolve_image_by_id("3").await, "");

    let source = create_source(&config.data).unwrap();
    let err = source.fetch(Resource::ImageBlobs).await.unwrap_err();
    assert!(matches!(
        err,
        LoadError::Status { resource: Resource::ImageBlobs, status: 500, .. }
    ));
}

#[tokio::test]
async fn health_check_flags_dangling_references() {
    let source = Arc::new(
        MockSource::new()
            .with(Resource::Memories, memories_doc(2))
            .with(Resource::ImageMetadata, metadata_doc(&[1, 2, 9]))
            .with(Resource::ImageBlobs, blobs_doc(&[1, 9])),
    );

    let report = check_health(source.as_ref()).await;
    assert_eq!(report.memories, ResourceStatus::Ok { entries: 2 });
    assert_eq!(report.image_metadata, ResourceStatus::Ok { entries: 3 });
    assert_eq!(report.image_blobs, ResourceStatus::Ok { entries: 2 });
    assert_eq!(report.unknown_memories, vec![9]);
    assert_eq!(report.missing_blobs, vec![(2, "img-2".to_string())]);
    assert!(!report.is_healthy());
}

#[tokio::test]
async fn health_check_reports_unreachable_documents() {
    let source = Arc::new(MockSource::new().with(Resource::Memories, memories_doc(1)));

    let report = check_health(source.as_ref()).await;
    assert!(report.memories.is_ok());
    assert!(matches!(report.image_metadata, ResourceStatus::Failed { .. }));
    assert!(matches!(report.image_blobs, ResourceStatus::Failed { .. }));
    assert!(report.unknown_memories.is_empty());
    assert!(!report.is_healthy());
}

#[tokio::test]
async fn health_check_passes_on_consistent_data() {
    let source = Arc::new(helpers::full_source(3));
    assert!(check_health(source.as_ref()).await.is_healthy());
}
