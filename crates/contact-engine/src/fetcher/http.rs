//! JSON-over-HTTP matrix source.
//!
//! `POST {base}/matrix` with the wire request body, and
//! `GET {base}/sites/{enzyme}/{chromosome}` for restriction cut sites.

use std::time::Duration;

use async_trait::async_trait;
use hic_common::{HicError, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{MatrixQuery, MatrixResponse, MatrixSource};
use crate::config::EngineConfig;

/// Matrix source backed by a remote server.
pub struct HttpMatrixSource {
    client: Client,
    base_url: String,
}

impl HttpMatrixSource {
    /// Create a source for `base_url` with the configured request timeout.
    pub fn new(base_url: &str, config: &EngineConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.fetch_timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| HicError::InvalidConfig(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn matrix_url(&self) -> String {
        format!("{}/matrix", self.base_url)
    }

    fn sites_url(&self, chromosome: &str, enzyme: &str) -> String {
        format!("{}/sites/{}/{}", self.base_url, enzyme, chromosome)
    }

    async fn read_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            return Err(HicError::transport(format!(
                "{} returned {}",
                response.url(),
                status
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| HicError::transport(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MatrixSource for HttpMatrixSource {
    #[instrument(skip(self, query), fields(mode = query.mode_name(), resolution = query.resolution()))]
    async fn fetch(&self, query: &MatrixQuery) -> Result<MatrixResponse> {
        let response = self
            .client
            .post(self.matrix_url())
            .json(&query.to_wire())
            .send()
            .await
            .map_err(|e| HicError::transport(e.to_string()))?;

        let body = Self::read_json(response).await?;
        let decoded = MatrixResponse::from_value(&body)?;
        debug!(items = decoded.len(), "Fetched matrix");
        Ok(decoded)
    }

    #[instrument(skip(self))]
    async fn restriction_sites(&self, chromosome: &str, enzyme: &str) -> Result<Vec<u64>> {
        let response = self
            .client
            .get(self.sites_url(chromosome, enzyme))
            .send()
            .await
            .map_err(|e| HicError::transport(e.to_string()))?;

        let body = Self::read_json(response).await?;
        let sites: Vec<u64> = serde_json::from_value(body)?;
        debug!(sites = sites.len(), "Fetched restriction sites");
        Ok(sites)
    }
}
