//! Static web host data source.

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::{resource_file, DataSource};
use crate::config::DataConfig;
use crate::error::{LoadError, Resource};

/// Fetches resources with a plain HTTP GET relative to a base URL.
pub struct HttpSource {
    client: reqwest::Client,
    base: String,
    config: DataConfig,
}

impl HttpSource {
    pub fn new(config: &DataConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("failed to build HTTP client")?;

        tracing::info!(base = %config.base, "using HTTP data source");

        Ok(Self {
            client,
            base: config.base.trim_end_matches('/').to_string(),
            config: config.clone(),
        })
    }

    fn url(&self, resource: Resource) -> String {
        let file = resource_file(&self.config, resource).trim_start_matches('/');
        format!("{}/{}", self.base, file)
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch(&self, resource: Resource) -> Result<Vec<u8>, LoadError> {
        let url = self.url(resource);
        tracing::debug!(resource = %resource, url = %url, "fetching resource");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| LoadError::Request {
                resource,
                location: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                resource,
                location: url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| LoadError::Request {
            resource,
            location: url.clone(),
            source,
        })?;

        tracing::debug!(resource = %resource, bytes = body.len(), "resource fetched");
        Ok(body.to_vec())
    }

    fn describe(&self, resource: Resource) -> String {
        self.url(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_base_and_file() {
        let config = DataConfig {
            base: "https://example.org/data/".into(),
            ..DataConfig::default()
        };
        let source = HttpSource::new(&config).unwrap();
        assert_eq!(
            source.describe(Resource::Memories),
            "https://example.org/data/memories.json"
        );
        assert_eq!(
            source.describe(Resource::ImageBlobs),
            "https://example.org/data/images.json"
        );
    }
}
