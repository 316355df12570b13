//! Lazy image resolver with single-flight loading.
//!
//! [`ImageResolver::resolve_image`] maps a timeline event to a data URI:
//! memory id → image id through the metadata document, then image id →
//! payload through the blob document, then [`normalize_image_payload`].
//! Both documents are fetched at most once per cache generation.
//!
//! Per key, at most one resolution runs at a time. The first caller spawns
//! it and stores a shared handle in the in-flight map; later callers await
//! the same handle. The resolution is bounded by the configured wait timeout
//! and always removes its in-flight entry when it finishes, fails, or times
//! out, so every waiter is released.
//!
//! The two documents load in their own spawned tasks behind the same kind of
//! shared handle. A resolution that times out stops waiting for a document
//! but never cancels its fetch, so other keys pick up the result.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};

use super::catalog::{BlobIndex, ImageBlob, ImageMetadata, ImageMetadataDocument};
use super::normalize::normalize_image_payload;
use crate::error::{LoadError, Resource};
use crate::memory::types::TimelineEvent;
use crate::source::{fetch_json, DataSource};

type PendingImage = Shared<BoxFuture<'static, String>>;

/// A document load shared by every resolution that needs it.
type DocumentLoad<T> = Shared<BoxFuture<'static, Result<Arc<T>, Arc<LoadError>>>>;

type DocumentSlot<T> = fn(&mut ResolverState) -> &mut Option<DocumentLoad<T>>;

#[derive(Default)]
struct ResolverState {
    /// Running or finished metadata load. Reset on failure so the next
    /// resolution retries.
    metadata: Option<DocumentLoad<ImageMetadata>>,
    blobs: Option<DocumentLoad<BlobIndex>>,
    resolved: HashMap<String, String>,
    in_flight: HashMap<String, PendingImage>,
    /// Bumped by `clear`; resolutions that started earlier must not write back.
    generation: u64,
}

fn metadata_slot(state: &mut ResolverState) -> &mut Option<DocumentLoad<ImageMetadata>> {
    &mut state.metadata
}

fn blobs_slot(state: &mut ResolverState) -> &mut Option<DocumentLoad<BlobIndex>> {
    &mut state.blobs
}

fn lock_state(state: &Mutex<ResolverState>) -> MutexGuard<'_, ResolverState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Resolves and caches image data URIs for timeline events.
pub struct ImageResolver {
    source: Arc<dyn DataSource>,
    wait_timeout: Duration,
    state: Arc<Mutex<ResolverState>>,
}

impl ImageResolver {
    pub fn new(source: Arc<dyn DataSource>, wait_timeout: Duration) -> Self {
        Self {
            source,
            wait_timeout,
            state: Arc::new(Mutex::new(ResolverState::default())),
        }
    }

    /// Resolve the image for `event`. Returns `""` when it is unavailable.
    pub async fn resolve_image(&self, event: &TimelineEvent) -> String {
        self.resolve(&event.id).await
    }

    /// Resolve the image for a memory id (the event id, stringified).
    ///
    /// Never fails: missing references, missing blobs, load errors and
    /// timeouts are logged and yield `""`. Only non-empty results are cached.
    pub async fn resolve(&self, memory_id: &str) -> String {
        let key = memory_id.trim().to_string();

        let pending = {
            let mut state = lock_state(&self.state);
            if let Some(hit) = state.resolved.get(&key) {
                tracing::debug!(memory_id = %key, "image cache hit");
                return hit.clone();
            }
            if let Some(pending) = state.in_flight.get(&key).cloned() {
                tracing::debug!(memory_id = %key, "joining in-flight image request");
                pending
            } else {
                let pending = self.start_resolution(&state, key.clone());
                state.in_flight.insert(key, pending.clone());
                pending
            }
        };

        pending.await
    }

    /// Spawn the resolution for `key`. The caller holds the state lock and
    /// registers the returned handle before releasing it, so the task cannot
    /// clear its in-flight entry before the entry exists.
    fn start_resolution(&self, state: &ResolverState, key: String) -> PendingImage {
        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.state);
        let timeout = self.wait_timeout;
        let guard = InFlightGuard {
            state: Arc::clone(&self.state),
            key: key.clone(),
            generation: state.generation,
        };

        let task = tokio::spawn(async move {
            let lookup = lookup_image(&source, &shared, &guard.key);
            let image = match tokio::time::timeout(timeout, lookup).await {
                Ok(image) => image,
                Err(_) => {
                    tracing::warn!(
                        memory_id = %guard.key,
                        timeout_ms = timeout.as_millis() as u64,
                        "image resolution timed out"
                    );
                    String::new()
                }
            };
            if !image.is_empty() {
                guard.store(&image);
            }
            image
        });

        async move {
            task.await.unwrap_or_else(|e| {
                tracing::error!(memory_id = %key, error = %e, "image resolution task failed");
                String::new()
            })
        }
        .boxed()
        .shared()
    }

    /// The cached image for `memory_id`, without any I/O.
    pub fn cached(&self, memory_id: &str) -> Option<String> {
        lock_state(&self.state).resolved.get(memory_id.trim()).cloned()
    }

    /// Number of keys with a resolution currently running.
    pub fn in_flight(&self) -> usize {
        lock_state(&self.state).in_flight.len()
    }

    /// Drop the metadata map, blob index, resolved images and in-flight set.
    ///
    /// Resolutions already running still complete for their own callers but
    /// no longer write into the caches.
    pub fn clear(&self) {
        let mut state = lock_state(&self.state);
        let generation = state.generation.wrapping_add(1);
        *state = ResolverState {
            generation,
            ..ResolverState::default()
        };
    }
}

/// Clears the in-flight entry for one key when its resolution ends, however
/// it ends.
struct InFlightGuard {
    state: Arc<Mutex<ResolverState>>,
    key: String,
    generation: u64,
}

impl InFlightGuard {
    fn store(&self, image: &str) {
        let mut state = lock_state(&self.state);
        if state.generation == self.generation {
            state.resolved.insert(self.key.clone(), image.to_string());
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut state = lock_state(&self.state);
        if state.generation == self.generation {
            state.in_flight.remove(&self.key);
        }
    }
}

/// Join the running load in `slot`, or spawn one and register it.
///
/// The load runs in its own task, so dropping the returned handle does not
/// cancel it. A failed load clears the slot (when the generation still
/// matches) before any waiter sees the error.
fn document_load<T, F, Fut>(
    state: &Arc<Mutex<ResolverState>>,
    slot: DocumentSlot<T>,
    resource: Resource,
    load: F,
) -> DocumentLoad<T>
where
    T: Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Arc<T>, LoadError>> + Send + 'static,
{
    let mut guard = lock_state(state);
    if let Some(running) = slot(&mut *guard).as_ref() {
        return running.clone();
    }

    let generation = guard.generation;
    let forget = {
        let state = Arc::clone(state);
        move || {
            let mut state = lock_state(&state);
            if state.generation == generation {
                *slot(&mut *state) = None;
            }
        }
    };

    let fut = load();
    let task = tokio::spawn({
        let forget = forget.clone();
        async move {
            let result = fut.await.map_err(Arc::new);
            if result.is_err() {
                forget();
            }
            result
        }
    });

    let handle = async move {
        task.await.unwrap_or_else(|e| {
            forget();
            Err(Arc::new(LoadError::Interrupted {
                resource,
                message: e.to_string(),
            }))
        })
    }
    .boxed()
    .shared();

    *slot(&mut *guard) = Some(handle.clone());
    handle
}

async fn lookup_image(
    source: &Arc<dyn DataSource>,
    state: &Arc<Mutex<ResolverState>>,
    key: &str,
) -> String {
    let Ok(memory_id) = key.parse::<i64>() else {
        tracing::warn!(memory_id = %key, "memory id is not numeric, no image to look up");
        return String::new();
    };

    let metadata = {
        let source = Arc::clone(source);
        document_load(state, metadata_slot, Resource::ImageMetadata, move || async move {
            load_metadata(source.as_ref()).await
        })
    };
    let metadata = match metadata.await {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::error!(
                resource = %Resource::ImageMetadata,
                location = %source.describe(Resource::ImageMetadata),
                memory_id,
                error = %e,
                "failed to load image metadata"
            );
            return String::new();
        }
    };

    let Some(image_id) = metadata.image_for(memory_id).cloned() else {
        tracing::warn!(memory_id, "no image reference for memory");
        return String::new();
    };

    let blobs = {
        let source = Arc::clone(source);
        document_load(state, blobs_slot, Resource::ImageBlobs, move || async move {
            load_blobs(source.as_ref()).await
        })
    };
    let blobs = match blobs.await {
        Ok(blobs) => blobs,
        Err(e) => {
            tracing::error!(
                resource = %Resource::ImageBlobs,
                location = %source.describe(Resource::ImageBlobs),
                memory_id,
                image_id = %image_id,
                error = %e,
                "failed to load image blobs"
            );
            return String::new();
        }
    };

    let Some(payload) = blobs.payload(&image_id) else {
        tracing::warn!(memory_id, image_id = %image_id, "image blob not found");
        return String::new();
    };

    tracing::debug!(memory_id, image_id = %image_id, "image resolved");
    normalize_image_payload(payload)
}

async fn load_metadata(source: &dyn DataSource) -> Result<Arc<ImageMetadata>, LoadError> {
    let doc: ImageMetadataDocument = fetch_json(source, Resource::ImageMetadata).await?;
    let metadata = ImageMetadata::from_references(doc.image_references);
    tracing::info!(references = metadata.len(), "image metadata loaded");
    Ok(Arc::new(metadata))
}

async fn load_blobs(source: &dyn DataSource) -> Result<Arc<BlobIndex>, LoadError> {
    let blobs: Vec<ImageBlob> = fetch_json(source, Resource::ImageBlobs).await?;
    let index = BlobIndex::from_blobs(blobs);
    tracing::info!(blobs = index.len(), "image blobs loaded");
    Ok(Arc::new(index))
}
