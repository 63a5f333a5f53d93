//! Errors raised while resolving the features of a dependency
//!
//! None of these reach the editor: the completion provider turns every
//! failure into an empty suggestion list after logging it.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("no Cargo.toml in {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    ManifestRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("request for crate `{crate_name}` failed: {source}")]
    Request {
        crate_name: String,
        source: reqwest::Error,
    },

    #[error("registry returned {status} for crate `{crate_name}`")]
    Status {
        crate_name: String,
        status: StatusCode,
    },

    #[error("invalid registry response for crate `{crate_name}`: {source}")]
    Decode {
        crate_name: String,
        source: reqwest::Error,
    },

    #[error("crate `{crate_name}` has no published versions")]
    NoVersions { crate_name: String },
}

impl FeatureError {
    /// Whether the failure came from the registry rather than the local disk
    pub fn is_remote(&self) -> bool {
        !matches!(
            self,
            FeatureError::ManifestNotFound(_) | FeatureError::ManifestRead { .. }
        )
    }
}
