//! Reachability and consistency checks over the three documents.
//!
//! [`check_health`] bypasses every cache: it fetches each document once and
//! cross-checks the image references against the memories and the blobs.

use std::collections::HashSet;

use crate::error::Resource;
use crate::images::catalog::{BlobIndex, ImageBlob, ImageMetadata, ImageMetadataDocument};
use crate::memory::types::MemoryDocument;
use crate::source::{fetch_json, DataSource};

/// Outcome for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceStatus {
    /// Loaded and parsed; holds the number of entries.
    Ok { entries: usize },
    Failed { error: String },
}

impl ResourceStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

#[derive(Debug, Clone)]
pub struct HealthReport {
    pub memories: ResourceStatus,
    pub image_metadata: ResourceStatus,
    pub image_blobs: ResourceStatus,
    /// Memory ids referenced by the metadata that are not in the memory document.
    pub unknown_memories: Vec<i64>,
    /// `(memory id, image id)` references whose image id has no blob.
    pub missing_blobs: Vec<(i64, String)>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.memories.is_ok()
            && self.image_metadata.is_ok()
            && self.image_blobs.is_ok()
            && self.unknown_memories.is_empty()
            && self.missing_blobs.is_empty()
    }
}

/// Fetch every document and report what loads and what dangles.
pub async fn check_health(source: &dyn DataSource) -> HealthReport {
    let memories = fetch_json::<MemoryDocument>(source, Resource::Memories).await;
    let metadata = fetch_json::<ImageMetadataDocument>(source, Resource::ImageMetadata)
        .await
        .map(|doc| ImageMetadata::from_references(doc.image_references));
    let blobs = fetch_json::<Vec<ImageBlob>>(source, Resource::ImageBlobs)
        .await
        .map(BlobIndex::from_blobs);

    let mut unknown_memories = Vec::new();
    let mut missing_blobs = Vec::new();

    if let Ok(metadata) = &metadata {
        if let Ok(doc) = &memories {
            let known: HashSet<i64> = doc.memories.iter().map(|m| m.id).collect();
            unknown_memories = metadata
                .iter()
                .map(|(memory_id, _)| memory_id)
                .filter(|id| !known.contains(id))
                .collect();
            unknown_memories.sort_unstable();
        }
        if let Ok(blobs) = &blobs {
            missing_blobs = metadata
                .iter()
                .filter(|(_, image_id)| !blobs.contains(image_id))
                .map(|(memory_id, image_id)| (memory_id, image_id.to_string()))
                .collect();
            missing_blobs.sort_unstable();
        }
    }

    HealthReport {
        memories: status(memories.map(|doc| doc.memories.len())),
        image_metadata: status(metadata.map(|m| m.len())),
        image_blobs: status(blobs.map(|b| b.len())),
        unknown_memories,
        missing_blobs,
    }
}

fn status(result: Result<usize, crate::error::LoadError>) -> ResourceStatus {
    match result {
        Ok(entries) => ResourceStatus::Ok { entries },
        Err(e) => {
            tracing::error!(resource = %e.resource(), error = %e, "health check failed to load resource");
            ResourceStatus::Failed {
                error: e.to_string(),
            }
        }
    }
}
