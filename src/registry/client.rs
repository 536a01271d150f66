//! HTTP client for the national provider registry API.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::types::{RegistryRecord, RegistryResponse};
use crate::identity::RegistrySearch;
use crate::TARGET_WEB_REQUEST;

pub const REGISTRY_API_URL: &str = "https://npiregistry.cms.hhs.gov/api/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const RESULT_LIMIT: usize = 50;

/// Individual-provider enumeration type; the registry also indexes
/// organizations, which are never dossier subjects.
const ENUMERATION_TYPE: &str = "NPI-1";

pub struct RegistryClient {
    client: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: REGISTRY_API_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl RegistrySearch for RegistryClient {
    async fn search(
        &self,
        first: &str,
        last: &str,
        state: Option<&str>,
        city: Option<&str>,
    ) -> Result<Vec<RegistryRecord>> {
        let mut params: Vec<(&str, String)> = vec![
            ("version", "2.1".to_string()),
            ("first_name", first.to_string()),
            ("last_name", last.to_string()),
            ("limit", RESULT_LIMIT.to_string()),
            ("enumeration_type", ENUMERATION_TYPE.to_string()),
        ];
        if let Some(state) = state {
            params.push(("state", state.to_string()));
        }
        if let Some(city) = city {
            params.push(("city", city.to_string()));
        }

        debug!(
            target: TARGET_WEB_REQUEST,
            "Registry search for {} {} (state={:?}, city={:?})", first, last, state, city
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "registry returned status {}",
                response.status()
            ));
        }

        let parsed: RegistryResponse = response.json().await?;
        debug!(
            target: TARGET_WEB_REQUEST,
            "Registry returned {} candidates", parsed.results.len()
        );

        Ok(parsed.results)
    }
}
