//! Fetching of the static JSON documents.
//!
//! Provides the [`DataSource`] trait and two implementations: [`http::HttpSource`]
//! for a static web host and [`fs::FsSource`] for a local directory. The source
//! is created via [`create_source`] from configuration.

pub mod fs;
pub mod http;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::config::DataConfig;
use crate::error::{LoadError, Resource};

/// Trait for fetching the raw bytes of one JSON resource.
///
/// Implementations perform exactly one read per call; caching is the caller's
/// job.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch the full body of `resource`.
    async fn fetch(&self, resource: Resource) -> Result<Vec<u8>, LoadError>;

    /// Human-readable location of `resource`, used in logs.
    fn describe(&self, resource: Resource) -> String;
}

/// Fetch `resource` and deserialize it as JSON.
pub async fn fetch_json<T: DeserializeOwned>(
    source: &dyn DataSource,
    resource: Resource,
) -> Result<T, LoadError> {
    let body = source.fetch(resource).await?;
    serde_json::from_slice(&body).map_err(|source| LoadError::Parse { resource, source })
}

/// File name configured for `resource`.
pub fn resource_file(config: &DataConfig, resource: Resource) -> &str {
    match resource {
        Resource::Memories => &config.memories,
        Resource::ImageMetadata => &config.image_metadata,
        Resource::ImageBlobs => &config.image_blobs,
    }
}

/// Create a data source from config.
///
/// `http://` and `https://` bases use [`http::HttpSource`]; anything else is
/// treated as a directory.
pub fn create_source(config: &DataConfig) -> Result<Arc<dyn DataSource>> {
    if config.is_remote() {
        let source = http::HttpSource::new(config)?;
        Ok(Arc::new(source))
    } else {
        Ok(Arc::new(fs::FsSource::new(config)))
    }
}
