//! Registry clients for fetching published versions and their features

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::FeatureError;

pub mod crates_io;
pub mod http_client;
pub mod version_utils;

/// One published version of a crate, as listed by the registry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteVersionRecord {
    /// Version number, e.g. `1.0.200`
    pub num: String,
    /// Feature name to the names it enables. Ordered by feature name.
    #[serde(default)]
    pub features: BTreeMap<String, Vec<String>>,
}

impl RemoteVersionRecord {
    pub fn new(num: impl Into<String>) -> Self {
        Self {
            num: num.into(),
            features: BTreeMap::new(),
        }
    }

    pub fn with_feature(mut self, name: &str, enables: &[&str]) -> Self {
        self.features.insert(
            name.to_string(),
            enables.iter().map(|s| s.to_string()).collect(),
        );
        self
    }
}

/// Trait for registry clients
/// Note: async_fn_in_trait is allowed because this trait is internal and already bounds Send + Sync
#[allow(async_fn_in_trait)]
pub trait Registry: Send + Sync {
    /// Published versions of `crate_name`, newest first
    async fn get_versions(&self, crate_name: &str)
    -> Result<Vec<RemoteVersionRecord>, FeatureError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// In-memory registry that counts how often it is asked
    #[derive(Default)]
    pub(crate) struct StaticRegistry {
        versions: BTreeMap<String, Vec<RemoteVersionRecord>>,
        calls: AtomicUsize,
    }

    impl StaticRegistry {
        pub(crate) fn with_crate(mut self, name: &str, versions: Vec<RemoteVersionRecord>) -> Self {
            self.versions.insert(name.to_string(), versions);
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Registry for StaticRegistry {
        async fn get_versions(
            &self,
            crate_name: &str,
        ) -> Result<Vec<RemoteVersionRecord>, FeatureError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.versions
                .get(crate_name)
                .cloned()
                .ok_or_else(|| FeatureError::Status {
                    crate_name: crate_name.to_string(),
                    status: reqwest::StatusCode::NOT_FOUND,
                })
        }
    }
}
