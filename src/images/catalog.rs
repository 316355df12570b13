//! Ingestion of the image metadata and image blob documents.
//!
//! Image ids appear as JSON strings in one document and sometimes as numbers
//! in the other. Every id is coerced to one canonical string form
//! ([`canonical_id`]) while loading, so lookups are plain map hits.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer};

/// An image id in canonical form.
///
/// JSON numbers with an integral value become their decimal representation,
/// so `7` matches `"7"`. Strings are only trimmed: `"007"` and `"+7"` stay
/// distinct from `7`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(raw: &str) -> Self {
        Self(canonical_id(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical string form of an id written as a string.
pub fn canonical_id(raw: &str) -> String {
    raw.trim().to_string()
}

impl<'de> Deserialize<'de> for ImageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Float(f64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => Self(n.to_string()),
            RawId::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Self((f as i64).to_string())
            }
            RawId::Float(f) => Self(f.to_string()),
            RawId::Text(s) => Self::new(&s),
        })
    }
}

/// One `{associated_memory_id, image_id}` pair.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageReference {
    pub associated_memory_id: i64,
    pub image_id: ImageId,
}

/// Top-level shape of the image metadata document.
#[derive(Debug, Deserialize)]
pub struct ImageMetadataDocument {
    pub image_references: Vec<ImageReference>,
}

/// One entry of the image blob document.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageBlob {
    pub id: ImageId,
    #[serde(default)]
    pub image: String,
}

/// Memory id → image id.
#[derive(Debug, Default)]
pub struct ImageMetadata {
    by_memory: HashMap<i64, ImageId>,
}

impl ImageMetadata {
    /// Build the map. A memory id listed more than once keeps its last entry.
    pub fn from_references(references: Vec<ImageReference>) -> Self {
        let mut by_memory = HashMap::with_capacity(references.len());
        for reference in references {
            if let Some(previous) =
                by_memory.insert(reference.associated_memory_id, reference.image_id.clone())
            {
                tracing::warn!(
                    memory_id = reference.associated_memory_id,
                    replaced = %previous,
                    image_id = %reference.image_id,
                    "duplicate image reference, keeping the last one"
                );
            }
        }
        Self { by_memory }
    }

    pub fn image_for(&self, memory_id: i64) -> Option<&ImageId> {
        self.by_memory.get(&memory_id)
    }

    pub fn len(&self) -> usize {
        self.by_memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_memory.is_empty()
    }

    /// Every `(memory id, image id)` pair, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &ImageId)> {
        self.by_memory.iter().map(|(m, i)| (*m, i))
    }
}

/// Image id → raw payload.
#[derive(Debug, Default)]
pub struct BlobIndex {
    by_id: HashMap<ImageId, String>,
}

impl BlobIndex {
    /// Index the blob array. When an id repeats, the first entry wins.
    pub fn from_blobs(blobs: Vec<ImageBlob>) -> Self {
        let mut by_id = HashMap::with_capacity(blobs.len());
        for blob in blobs {
            by_id.entry(blob.id).or_insert(blob.image);
        }
        Self { by_id }
    }

    pub fn payload(&self, id: &ImageId) -> Option<&str> {
        self.by_id.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &ImageId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
