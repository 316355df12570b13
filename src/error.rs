//! Load failures for the three static JSON resources.
//!
//! Errors stay inside the crate's operations: the public store and resolver
//! APIs log a [`LoadError`] and degrade to an empty result instead of
//! returning it.

use std::fmt;

use thiserror::Error;

/// The static JSON documents the timeline is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// `{ "memories": [...] }`
    Memories,
    /// `{ "image_references": [...] }`
    ImageMetadata,
    /// `[ { "id": ..., "image": ... }, ... ]`
    ImageBlobs,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memories => "memories",
            Self::ImageMetadata => "image_metadata",
            Self::ImageBlobs => "image_blobs",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fetch or parse failure on one resource.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request for {resource} at {location} failed: {source}")]
    Request {
        resource: Resource,
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{resource} at {location} returned HTTP {status}")]
    Status {
        resource: Resource,
        location: String,
        status: u16,
    },

    #[error("failed to read {resource} from {location}: {source}")]
    Io {
        resource: Resource,
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {resource}: {source}")]
    Parse {
        resource: Resource,
        #[source]
        source: serde_json::Error,
    },

    #[error("loading {resource} was interrupted: {message}")]
    Interrupted { resource: Resource, message: String },
}

impl LoadError {
    /// The resource this failure belongs to.
    pub fn resource(&self) -> Resource {
        match self {
            Self::Request { resource, .. }
            | Self::Status { resource, .. }
            | Self::Io { resource, .. }
            | Self::Parse { resource, .. }
            | Self::Interrupted { resource, .. } => *resource,
        }
    }
}
