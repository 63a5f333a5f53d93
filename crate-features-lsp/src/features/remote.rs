//! Features of registry dependencies
//!
//! A lookup picks the published version matching the manifest requirement
//! and turns its feature map into [`FeatureInfo`] records sorted by name.
//! Successful lookups are cached under [`cache_key`]; failures are not, so
//! the next request tries the registry again.

use crate::cache::{MemoryCache, WriteCache, cache_key};
use crate::error::FeatureError;
use crate::registries::version_utils::select_version;
use crate::registries::{Registry, RemoteVersionRecord};

use super::{FeatureInfo, FeatureLookup, is_private_feature};

/// Resolves features through a [`Registry`], caching the results
pub struct RemoteFeatureSource<R, C = MemoryCache> {
    registry: R,
    cache: C,
}

impl<R: Registry, C: WriteCache> RemoteFeatureSource<R, C> {
    pub fn new(registry: R, cache: C) -> Self {
        Self { registry, cache }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Public features of `crate_name` at the version matching `requirement`
    pub async fn lookup(&self, crate_name: &str, requirement: Option<&str>) -> FeatureLookup {
        let key = cache_key(crate_name, requirement);
        if let Some(features) = self.cache.get(&key) {
            tracing::debug!("Feature cache hit for {}", key);
            return FeatureLookup::Resolved(features);
        }
        tracing::debug!("Feature cache miss for {}", key);

        let versions = match self.registry.get_versions(crate_name).await {
            Ok(versions) => versions,
            Err(e) => {
                tracing::warn!("Failed to fetch features for {}: {}", crate_name, e);
                return FeatureLookup::Unavailable(e);
            }
        };

        let Some(selected) = select_version(&versions, requirement) else {
            tracing::warn!("Crate {} has no published versions", crate_name);
            return FeatureLookup::Unavailable(FeatureError::NoVersions {
                crate_name: crate_name.to_string(),
            });
        };

        let features = public_features(selected);
        tracing::debug!(
            "Resolved {} features for {} {}",
            features.len(),
            crate_name,
            selected.num
        );

        self.cache.insert(key, features.clone());
        FeatureLookup::Resolved(features)
    }
}

/// Features of one published version, without private names, sorted by name
pub fn public_features(version: &RemoteVersionRecord) -> Vec<FeatureInfo> {
    version
        .features
        .iter()
        .filter(|(name, _)| !is_private_feature(name))
        .map(|(name, enables)| FeatureInfo::new(name.clone(), enables.clone()))
        .collect()
}
