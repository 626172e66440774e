//! Where tiles come from.

use std::time::Duration;

use async_trait::async_trait;
use geology_map_models::BasemapProvider;
use geology_map_models::config::BasemapConfig;

use crate::BasemapError;
use crate::retry::{self, FetchFailure, RetryPolicy};
use crate::tiles::TileId;

/// A provider of encoded (PNG/JPEG) raster tiles.
#[async_trait]
pub trait TileSource: Send + Sync {
    /// Deepest zoom level this source serves.
    fn max_zoom(&self) -> u8;

    /// Attribution text to print on the sheet.
    fn attribution(&self) -> &str;

    /// Fetches one tile's encoded image bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BasemapError::Unavailable`] if the tile cannot be
    /// obtained.
    async fn fetch_tile(&self, tile: TileId) -> Result<Vec<u8>, BasemapError>;
}

/// Fetches tiles from a public XYZ service over HTTP, retrying transient
/// failures.
pub struct HttpTileSource {
    client: reqwest::Client,
    provider: BasemapProvider,
    policy: RetryPolicy,
}

impl HttpTileSource {
    /// Builds a source for the configured provider.
    ///
    /// # Errors
    ///
    /// * [`BasemapError::InvalidRequest`] if the provider is
    ///   [`BasemapProvider::None`]
    /// * [`BasemapError::Client`] if the HTTP client cannot be built
    pub fn new(config: &BasemapConfig) -> Result<Self, BasemapError> {
        if config.provider.url_template().is_none() {
            return Err(BasemapError::InvalidRequest {
                message: format!("provider '{}' serves no tiles", config.provider),
            });
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            provider: config.provider,
            policy: RetryPolicy::from_config(config),
        })
    }

    async fn try_fetch(&self, url: &str) -> Result<Vec<u8>, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| retry::classify_error(&e))?;

        if let Some(failure) = retry::classify_status(response.status()) {
            return Err(failure);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| retry::classify_error(&e))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl TileSource for HttpTileSource {
    fn max_zoom(&self) -> u8 {
        self.provider.max_zoom()
    }

    fn attribution(&self) -> &str {
        self.provider.attribution()
    }

    async fn fetch_tile(&self, tile: TileId) -> Result<Vec<u8>, BasemapError> {
        let url = self
            .provider
            .tile_url(tile.z, tile.x, tile.y)
            .ok_or_else(|| BasemapError::InvalidRequest {
                message: format!("provider '{}' serves no tiles", self.provider),
            })?;

        let url = url.as_str();
        retry::with_retry(&self.policy, url, move || self.try_fetch(url))
            .await
            .map_err(|failure| BasemapError::Unavailable {
                message: format!("tile {tile} from {url}: {}", failure.message()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_provider_is_rejected() {
        let config = BasemapConfig {
            provider: BasemapProvider::None,
            ..BasemapConfig::default()
        };
        assert!(matches!(
            HttpTileSource::new(&config),
            Err(BasemapError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn reports_provider_metadata() {
        let config = BasemapConfig {
            provider: BasemapProvider::OpenTopoMap,
            ..BasemapConfig::default()
        };
        let source = HttpTileSource::new(&config).unwrap();
        assert_eq!(source.max_zoom(), 17);
        assert!(source.attribution().contains("OpenTopoMap"));
    }
}
