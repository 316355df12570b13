//! The timeline service: one explicitly constructed instance per session.
//!
//! [`TimelineService`] owns a [`MemoryStore`] and an [`ImageResolver`] that
//! share only the data source. Consumers receive it by reference (or in an
//! `Arc`) instead of reaching for global state, so tests build isolated
//! instances.

use std::sync::Arc;

use crate::config::KeepsakeConfig;
use crate::error::LoadError;
use crate::images::ImageResolver;
use crate::memory::stats::{memory_stats, CatalogStats};
use crate::memory::types::{CatalogSummary, MemoryPage, TimelineEvent, TimelinePage};
use crate::memory::MemoryStore;
use crate::source::{create_source, DataSource};

pub struct TimelineService {
    store: MemoryStore,
    images: ImageResolver,
}

impl TimelineService {
    pub fn new(source: Arc<dyn DataSource>, config: &KeepsakeConfig) -> Self {
        Self {
            store: MemoryStore::new(
                Arc::clone(&source),
                config.cache.page_size,
                config.cache.highlight_keywords.clone(),
            ),
            images: ImageResolver::new(source, config.cache.image_wait_timeout()),
        }
    }

    /// Build the service with the data source named in `config`.
    pub fn from_config(config: &KeepsakeConfig) -> anyhow::Result<Self> {
        let source = create_source(&config.data)?;
        Ok(Self::new(source, config))
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn images(&self) -> &ImageResolver {
        &self.images
    }

    pub async fn load_metadata(&self) -> CatalogSummary {
        self.store.load_metadata().await
    }

    pub async fn load_page(&self, page: usize) -> MemoryPage {
        self.store.load_page(page).await
    }

    pub async fn timeline_page(&self, page: usize) -> TimelinePage {
        self.store.timeline_page(page).await
    }

    pub async fn resolve_image(&self, event: &TimelineEvent) -> String {
        self.images.resolve_image(event).await
    }

    /// Resolve by memory id, for callers that only hold the id.
    pub async fn resolve_image_by_id(&self, memory_id: &str) -> String {
        self.images.resolve(memory_id).await
    }

    /// Statistics over the whole catalog; `None` when it cannot be loaded.
    pub async fn stats(&self) -> Option<CatalogStats> {
        let records = self.store.records().await?;
        Some(memory_stats(&records, self.store.highlight_keywords()))
    }

    pub fn last_load_error(&self) -> Option<Arc<LoadError>> {
        self.store.last_load_error()
    }

    /// Drop every cache: document, pages, image metadata, blobs, resolved
    /// images and in-flight requests. No I/O.
    pub fn clear_cache(&self) {
        self.store.clear();
        self.images.clear();
        tracing::info!("timeline caches cleared");
    }
}
