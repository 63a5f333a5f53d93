//! Features of path dependencies, read straight from disk
//!
//! Local manifests can change between two keystrokes, so nothing read here
//! is cached.

use std::io::ErrorKind;
use std::path::Path;

use crate::error::FeatureError;
use crate::parsers::manifest::parse_features_section;

use super::FeatureLookup;

/// File name of the manifest expected inside a path dependency's directory
pub const MANIFEST_FILE_NAME: &str = "Cargo.toml";

/// Reads `<dir>/Cargo.toml` of path dependencies
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFeatureSource;

impl LocalFeatureSource {
    pub fn new() -> Self {
        Self
    }

    /// Features declared in `<dir>/Cargo.toml`, in file order
    pub fn lookup(&self, dir: &Path) -> FeatureLookup {
        let manifest = dir.join(MANIFEST_FILE_NAME);

        let content = match std::fs::read_to_string(&manifest) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No manifest at {}", manifest.display());
                return FeatureLookup::Unavailable(FeatureError::ManifestNotFound(
                    dir.to_path_buf(),
                ));
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", manifest.display(), e);
                return FeatureLookup::Unavailable(FeatureError::ManifestRead {
                    path: manifest,
                    source: e,
                });
            }
        };

        let features = parse_features_section(&content);
        tracing::debug!(
            "Read {} features from {}",
            features.len(),
            manifest.display()
        );
        FeatureLookup::Resolved(features)
    }
}
