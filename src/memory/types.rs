//! Core memory type definitions.
//!
//! Defines [`MemoryRecord`] (one entry of the memory document), [`TimelineEvent`]
//! (its display projection), [`MemoryPage`] (a view into the cached document),
//! and the page/summary responses served to the timeline.

use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A memory record as stored in the memory document. Read-only after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRecord {
    /// Unique, stable across loads.
    pub id: i64,
    pub title: String,
    /// `YYYY-MM-DD`; absent records sort last within a page.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Narrative body.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub emotions: Vec<String>,
    /// Image references carried by the document. Image linkage actually goes
    /// through the image metadata document, so these are kept opaque.
    #[serde(default)]
    pub images: Vec<serde_json::Value>,
    #[serde(default)]
    pub significance: Option<String>,
    /// Explicit highlight override.
    #[serde(default)]
    pub is_highlight: Option<bool>,
}

/// Top-level shape of the memory document.
#[derive(Debug, Deserialize)]
pub struct MemoryDocument {
    pub memories: Vec<MemoryRecord>,
}

/// Display-facing projection of a [`MemoryRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    /// The record id, stringified.
    pub id: String,
    pub title: String,
    /// Empty when the record has no date.
    pub date: String,
    pub description: String,
    /// Empty until resolved through the image resolver.
    pub image: String,
    pub is_highlight: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub emotions: Vec<String>,
}

/// A contiguous slice of the cached memory document.
///
/// Pages share the document; they never hold their own copy of the records.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryPage {
    document: Arc<[MemoryRecord]>,
    range: Range<usize>,
}

impl MemoryPage {
    pub(crate) fn new(document: Arc<[MemoryRecord]>, range: Range<usize>) -> Self {
        debug_assert!(range.end <= document.len());
        Self { document, range }
    }

    /// A page with no records, used for out-of-range indexes and load failures.
    pub fn empty() -> Self {
        Self {
            document: Arc::from(Vec::new()),
            range: 0..0,
        }
    }

    pub fn records(&self) -> &[MemoryRecord] {
        &self.document[self.range.clone()]
    }

    /// Position of this page inside the full document.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Result of loading the memory document: record and page counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    pub total: usize,
    pub page_count: usize,
}

/// One page of converted, date-sorted timeline events.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePage {
    pub events: Vec<TimelineEvent>,
    pub has_more: bool,
    pub total: usize,
}
