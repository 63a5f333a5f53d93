//! Open manifest documents
//!
//! The server uses full text sync, so each document is simply its latest
//! content plus the directory relative `path` values are resolved against.

use std::path::PathBuf;

use tower_lsp::lsp_types::Url;

use crate::features::local::MANIFEST_FILE_NAME;

pub struct DocumentState {
    /// Latest full text of the document
    pub content: String,
    /// Directory containing the manifest, when the URI is a local file
    pub manifest_dir: Option<PathBuf>,
}

impl DocumentState {
    pub fn new(uri: &Url, content: String) -> Self {
        let manifest_dir = uri
            .to_file_path()
            .ok()
            .and_then(|path| path.parent().map(|dir| dir.to_path_buf()));
        Self {
            content,
            manifest_dir,
        }
    }

    /// Absolute directory relative `path` values are resolved against.
    ///
    /// Documents without a file URI (e.g. `untitled:`) fall back to the
    /// server's working directory.
    pub fn base_dir(&self) -> Option<PathBuf> {
        match &self.manifest_dir {
            Some(dir) => Some(dir.clone()),
            None => std::env::current_dir()
                .inspect_err(|e| tracing::warn!("No working directory for path lookups: {}", e))
                .ok(),
        }
    }
}

/// Whether `uri` names a Cargo manifest
pub fn is_cargo_manifest(uri: &Url) -> bool {
    let path = uri.path();
    let filename = path.rsplit('/').next().unwrap_or(path);
    filename == MANIFEST_FILE_NAME
}
