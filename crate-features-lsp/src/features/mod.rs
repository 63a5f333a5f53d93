//! Feature sources: a dependency's own manifest on disk, or the registry

use crate::error::FeatureError;

pub mod local;
pub mod remote;

pub use local::LocalFeatureSource;
pub use remote::RemoteFeatureSource;

/// A feature of a dependency and what turning it on also turns on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureInfo {
    pub name: String,
    /// Features, `dep:` entries and `crate/feature` entries enabled by this one
    pub enables: Vec<String>,
}

impl FeatureInfo {
    pub fn new(name: impl Into<String>, enables: Vec<String>) -> Self {
        Self {
            name: name.into(),
            enables,
        }
    }
}

/// Names starting with `_` are private by convention and never suggested
pub fn is_private_feature(name: &str) -> bool {
    name.starts_with('_')
}

/// Outcome of a feature lookup.
///
/// `Unavailable` keeps the reason for logging and tests. Callers that only
/// care about suggestions use [`FeatureLookup::into_features`].
#[derive(Debug)]
pub enum FeatureLookup {
    Resolved(Vec<FeatureInfo>),
    Unavailable(FeatureError),
}

impl FeatureLookup {
    /// The resolved features, or an empty list when the lookup failed
    pub fn into_features(self) -> Vec<FeatureInfo> {
        match self {
            FeatureLookup::Resolved(features) => features,
            FeatureLookup::Unavailable(_) => Vec::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, FeatureLookup::Resolved(_))
    }
}
