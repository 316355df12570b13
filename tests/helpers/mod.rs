#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use keepsake::config::KeepsakeConfig;
use keepsake::error::{LoadError, Resource};
use keepsake::service::TimelineService;
use keepsake::source::DataSource;
use serde_json::{json, Value};

/// In-memory data source that counts fetches per resource.
#[derive(Default)]
pub struct MockSource {
    bodies: Mutex<HashMap<Resource, Vec<u8>>>,
    delays: Mutex<HashMap<Resource, Duration>>,
    fetches: HashMap<Resource, AtomicUsize>,
}

impl MockSource {
    pub fn new() -> Self {
        let fetches = [Resource::Memories, Resource::ImageMetadata, Resource::ImageBlobs]
            .into_iter()
            .map(|r| (r, AtomicUsize::new(0)))
            .collect();
        Self {
            fetches,
            ..Self::default()
        }
    }

    pub fn with(self, resource: Resource, body: Value) -> Self {
        self.set(resource, body);
        self
    }

    pub fn with_delay(self, resource: Resource, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(resource, delay);
        self
    }

    /// Replace the body served for `resource`.
    pub fn set(&self, resource: Resource, body: Value) {
        self.bodies
            .lock()
            .unwrap()
            .insert(resource, serde_json::to_vec(&body).unwrap());
    }

    /// Serve bytes that are not valid JSON.
    pub fn set_raw(&self, resource: Resource, body: &str) {
        self.bodies
            .lock()
            .unwrap()
            .insert(resource, body.as_bytes().to_vec());
    }

    /// Make `resource` fail with a not-found error.
    pub fn remove(&self, resource: Resource) {
        self.bodies.lock().unwrap().remove(&resource);
    }

    pub fn fetches(&self, resource: Resource) -> usize {
        self.fetches[&resource].load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for MockSource {
    async fn fetch(&self, resource: Resource) -> Result<Vec<u8>, LoadError> {
        self.fetches[&resource].fetch_add(1, Ordering::SeqCst);

        let delay = self.delays.lock().unwrap().get(&resource).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let body = self.bodies.lock().unwrap().get(&resource).cloned();
        body.ok_or_else(|| LoadError::Io {
            resource,
            location: format!("mock://{resource}"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        })
    }

    fn describe(&self, resource: Resource) -> String {
        format!("mock://{resource}")
    }
}

/// `{"memories": [...]}` with `count` records, ids 1..=count, dated in
/// ascending order.
pub fn memories_doc(count: usize) -> Value {
    let memories: Vec<Value> = (1..=count)
        .map(|i| {
            json!({
                "id": i,
                "title": format!("Memory {i}"),
                "date": format!("2022-01-{:02}", i),
                "category": "daily",
                "content": format!("What happened on day {i}"),
                "emotions": ["happy"],
            })
        })
        .collect();
    json!({ "memories": memories })
}

/// Metadata linking memory `n` to image `img-n` for each listed id.
pub fn metadata_doc(memory_ids: &[i64]) -> Value {
    let refs: Vec<Value> = memory_ids
        .iter()
        .map(|id| json!({ "associated_memory_id": id, "image_id": format!("img-{id}") }))
        .collect();
    json!({ "image_references": refs })
}

/// Blobs `img-n` with a raw JPEG-looking payload for each listed id.
pub fn blobs_doc(memory_ids: &[i64]) -> Value {
    let blobs: Vec<Value> = memory_ids
        .iter()
        .map(|id| json!({ "id": format!("img-{id}"), "image": format!("/9j/jpeg-{id}") }))
        .collect();
    Value::Array(blobs)
}

/// Source populated with `count` memories, each with an image.
pub fn full_source(count: usize) -> MockSource {
    let ids: Vec<i64> = (1..=count as i64).collect();
    MockSource::new()
        .with(Resource::Memories, memories_doc(count))
        .with(Resource::ImageMetadata, metadata_doc(&ids))
        .with(Resource::ImageBlobs, blobs_doc(&ids))
}

/// Service over `source` with default config (page size 3).
pub fn service(source: Arc<MockSource>) -> TimelineService {
    TimelineService::new(source, &KeepsakeConfig::default())
}

/// Service with a custom image wait timeout.
pub fn service_with_timeout(source: Arc<MockSource>, timeout: Duration) -> TimelineService {
    let mut config = KeepsakeConfig::default();
    config.cache.image_wait_timeout_ms = timeout.as_millis() as u64;
    TimelineService::new(source, &config)
}
