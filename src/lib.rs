//! Timeline memory service: a paginated memory catalog with lazily resolved,
//! single-flight image loading.
//!
//! Keepsake serves a timeline of memories from three static JSON documents:
//!
//! | Document | Shape | Used by |
//! |----------|-------|---------|
//! | **Memories** | `{"memories": [MemoryRecord, ...]}` | [`memory::MemoryStore`] |
//! | **Image metadata** | `{"image_references": [{associated_memory_id, image_id}, ...]}` | [`images::ImageResolver`] |
//! | **Image blobs** | `[{id, image}, ...]` (large) | [`images::ImageResolver`] |
//!
//! Each document is fetched at most once until the caches are cleared. Pages
//! are views into the cached memory document; images are resolved per event
//! on demand, with at most one resolution in flight per memory id.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`error`] — Load failures for the three documents
//! - [`source`] — Fetching documents from a directory or a static web host
//! - [`memory`] — Records, pagination, conversion to timeline events, statistics
//! - [`images`] — Image metadata ingestion, payload normalization, resolution
//! - [`health`] — Reachability and consistency checks for the documents
//! - [`service`] — The session-scoped [`service::TimelineService`]

pub mod config;
pub mod error;
pub mod health;
pub mod images;
pub mod memory;
pub mod service;
pub mod source;
