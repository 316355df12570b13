//! Paginated memory store.
//!
//! [`MemoryStore`] loads the memory document at most once, serves fixed-size
//! pages as views into it, and converts pages into timeline events. Load
//! failures are logged and degrade to empty results; the most recent one is
//! kept in [`MemoryStore::last_load_error`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::OnceCell;

use super::convert::to_sorted_events;
use super::types::{CatalogSummary, MemoryDocument, MemoryPage, MemoryRecord, TimelinePage};
use crate::error::{LoadError, Resource};
use crate::source::{fetch_json, DataSource};

type Document = Arc<[MemoryRecord]>;

#[derive(Default)]
struct StoreState {
    document: Arc<OnceCell<Document>>,
    pages: HashMap<usize, MemoryPage>,
    last_error: Option<Arc<LoadError>>,
    /// Bumped by `clear`; loads that started earlier must not write back.
    generation: u64,
}

/// Serves the memory catalog as stable, fixed-size pages.
pub struct MemoryStore {
    source: Arc<dyn DataSource>,
    page_size: usize,
    highlight_keywords: Vec<String>,
    state: Mutex<StoreState>,
}

impl MemoryStore {
    /// `page_size` must be non-zero; it is clamped to 1 otherwise.
    pub fn new(
        source: Arc<dyn DataSource>,
        page_size: usize,
        highlight_keywords: Vec<String>,
    ) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            highlight_keywords,
            state: Mutex::new(StoreState::default()),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the memory document once and return the cached copy afterwards.
    /// Concurrent first calls share a single fetch.
    async fn document(&self) -> Option<Document> {
        let (cell, generation) = {
            let state = self.lock();
            (Arc::clone(&state.document), state.generation)
        };

        let result = cell
            .get_or_try_init(|| async {
                let doc: MemoryDocument =
                    fetch_json(self.source.as_ref(), Resource::Memories).await?;
                tracing::info!(total = doc.memories.len(), "memory document loaded");
                Ok::<_, LoadError>(Document::from(doc.memories))
            })
            .await;

        match result {
            Ok(document) => {
                let document = Arc::clone(document);
                let mut state = self.lock();
                if state.generation == generation {
                    state.last_error = None;
                }
                Some(document)
            }
            Err(e) => {
                tracing::error!(
                    resource = %Resource::Memories,
                    location = %self.source.describe(Resource::Memories),
                    error = %e,
                    "failed to load memory document"
                );
                let mut state = self.lock();
                if state.generation == generation {
                    state.last_error = Some(Arc::new(e));
                }
                None
            }
        }
    }

    /// Ensure the memory document is loaded and report its size.
    ///
    /// Returns a zero summary when loading fails; check
    /// [`last_load_error`](Self::last_load_error) to tell that apart from an
    /// empty document.
    pub async fn load_metadata(&self) -> CatalogSummary {
        match self.document().await {
            Some(document) => CatalogSummary {
                total: document.len(),
                page_count: document.len().div_ceil(self.page_size),
            },
            None => CatalogSummary::default(),
        }
    }

    /// Records `[page * page_size, min((page + 1) * page_size, total))`.
    ///
    /// Computed pages are cached, so repeated calls are idempotent. Pages past
    /// the end are empty and never cached, as is every page while the document
    /// cannot be loaded.
    pub async fn load_page(&self, page: usize) -> MemoryPage {
        if let Some(cached) = self.lock().pages.get(&page) {
            tracing::debug!(page, "page cache hit");
            return cached.clone();
        }

        let generation = self.lock().generation;
        let Some(document) = self.document().await else {
            return MemoryPage::empty();
        };

        let total = document.len();
        let start = page.saturating_mul(self.page_size);
        if start >= total {
            tracing::debug!(page, total, "page past the end of the catalog");
            return MemoryPage::empty();
        }
        let end = page
            .saturating_add(1)
            .saturating_mul(self.page_size)
            .min(total);
        let computed = MemoryPage::new(document, start..end);

        let mut state = self.lock();
        if state.generation == generation {
            state.pages.insert(page, computed.clone());
        }
        computed
    }

    /// Load, convert, and date-sort one page of timeline events.
    ///
    /// Sorting covers this page only. `has_more` is
    /// `(page + 1) * page_size < total`.
    pub async fn timeline_page(&self, page: usize) -> TimelinePage {
        let summary = self.load_metadata().await;
        let records = self.load_page(page).await;
        let events = to_sorted_events(records.records(), &self.highlight_keywords);
        let has_more = page.saturating_add(1).saturating_mul(self.page_size) < summary.total;

        tracing::debug!(page, events = events.len(), has_more, "timeline page served");

        TimelinePage {
            events,
            has_more,
            total: summary.total,
        }
    }

    /// The full cached document, loading it if necessary.
    pub async fn records(&self) -> Option<Arc<[MemoryRecord]>> {
        self.document().await
    }

    /// Number of pages currently held in the page cache.
    pub fn cached_pages(&self) -> usize {
        self.lock().pages.len()
    }

    /// The failure of the most recent document load, if it failed.
    pub fn last_load_error(&self) -> Option<Arc<LoadError>> {
        self.lock().last_error.clone()
    }

    pub fn highlight_keywords(&self) -> &[String] {
        &self.highlight_keywords
    }

    /// Drop the cached document, every computed page, and the last error.
    pub fn clear(&self) {
        let mut state = self.lock();
        let generation = state.generation.wrapping_add(1);
        *state = StoreState {
            generation,
            ..StoreState::default()
        };
    }
}
