//! Local directory data source.

use std::path::PathBuf;

use async_trait::async_trait;

use super::{resource_file, DataSource};
use crate::config::{expand_tilde, DataConfig};
use crate::error::{LoadError, Resource};

/// Reads resources from files under a base directory.
pub struct FsSource {
    root: PathBuf,
    config: DataConfig,
}

impl FsSource {
    pub fn new(config: &DataConfig) -> Self {
        let root = expand_tilde(&config.base);
        tracing::info!(root = %root.display(), "using filesystem data source");
        Self {
            root,
            config: config.clone(),
        }
    }

    fn path(&self, resource: Resource) -> PathBuf {
        self.root.join(resource_file(&self.config, resource))
    }
}

#[async_trait]
impl DataSource for FsSource {
    async fn fetch(&self, resource: Resource) -> Result<Vec<u8>, LoadError> {
        let path = self.path(resource);
        tracing::debug!(resource = %resource, path = %path.display(), "reading resource");

        tokio::fs::read(&path).await.map_err(|source| LoadError::Io {
            resource,
            location: path.display().to_string(),
            source,
        })
    }

    fn describe(&self, resource: Resource) -> String {
        self.path(resource).display().to_string()
    }
}
