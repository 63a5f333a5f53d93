//! # crates.io Registry Client
//!
//! Fetches the version list of a crate, including each version's feature
//! map, from the [crates.io](https://crates.io) web API.
//!
//! ## API Details
//!
//! - **Endpoint**: `GET /api/v1/crates/{crate_name}`
//! - **Authentication**: none, but a descriptive `User-Agent` is required
//! - **Response**: `versions[]`, newest first, each with `num` and
//!   `features` (feature name to the list of names it enables)
//!
//! ## Error Handling
//!
//! Exactly one request is made per call, bounded by the HTTP client's
//! timeout. Transport errors, non-success statuses and undecodable bodies
//! are returned as [`FeatureError`]; nothing is retried.

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;

use crate::error::FeatureError;

use super::http_client::{DEFAULT_TIMEOUT, create_shared_client};
use super::{Registry, RemoteVersionRecord};

/// Base URL of the crates.io web API
pub const CRATES_IO_API_URL: &str = "https://crates.io/api/v1";

/// Client for the crates.io registry
pub struct CratesIoRegistry {
    client: Arc<Client>,
    base_url: String,
}

impl CratesIoRegistry {
    /// Creates a CratesIoRegistry that uses the provided shared HTTP client.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use std::sync::Arc;
    /// use crate_features_lsp::registries::crates_io::CratesIoRegistry;
    /// use crate_features_lsp::registries::http_client::{DEFAULT_TIMEOUT, create_shared_client};
    ///
    /// let client = create_shared_client(DEFAULT_TIMEOUT).expect("failed to create client");
    /// let registry = CratesIoRegistry::with_client(client);
    /// ```
    pub fn with_client(client: Arc<Client>) -> Self {
        Self {
            client,
            base_url: CRATES_IO_API_URL.to_string(),
        }
    }

    /// Point the client at another API root (a mirror, or a mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn http_client(&self) -> Arc<Client> {
        Arc::clone(&self.client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for CratesIoRegistry {
    /// # Panics
    ///
    /// Panics if the shared HTTP client cannot be created.
    fn default() -> Self {
        Self::with_client(create_shared_client(DEFAULT_TIMEOUT).expect("Failed to create HTTP client"))
    }
}

// API response structures
#[derive(Debug, Deserialize)]
struct CrateResponse {
    #[serde(default)]
    versions: Vec<RemoteVersionRecord>,
}

impl Registry for CratesIoRegistry {
    async fn get_versions(
        &self,
        crate_name: &str,
    ) -> Result<Vec<RemoteVersionRecord>, FeatureError> {
        let url = format!("{}/crates/{}", self.base_url, crate_name);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FeatureError::Request {
                crate_name: crate_name.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeatureError::Status {
                crate_name: crate_name.to_string(),
                status,
            });
        }

        let crate_response: CrateResponse =
            response
                .json()
                .await
                .map_err(|source| FeatureError::Decode {
                    crate_name: crate_name.to_string(),
                    source,
                })?;

        Ok(crate_response.versions)
    }
}
