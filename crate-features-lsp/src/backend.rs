use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use reqwest::Client as HttpClient;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::cache::MemoryCache;
use crate::config::Config;
use crate::document::{DocumentState, is_cargo_manifest};
use crate::features::RemoteFeatureSource;
use crate::providers::completion::{FeatureCompleter, get_completions};
use crate::registries::crates_io::CratesIoRegistry;
use crate::registries::http_client::{DEFAULT_TIMEOUT, create_shared_client};

type Completer = FeatureCompleter<CratesIoRegistry>;

pub struct FeaturesBackend {
    client: Client,
    /// Configuration
    config: RwLock<Config>,
    /// Open manifests, keyed by URI
    documents: DashMap<Url, DocumentState>,
    /// Registry features shared by every completer built for this server
    cache: MemoryCache,
    /// Replaced when initialization options change the registry
    completer: RwLock<Arc<Completer>>,
}

impl FeaturesBackend {
    /// Create a backend talking to crates.io with the default timeout.
    ///
    /// The registry URL and timeout are reconfigured in `initialize`.
    pub fn new(client: Client) -> Self {
        Self::with_http_client(client, None)
    }

    pub fn with_http_client(client: Client, http_client: Option<Arc<HttpClient>>) -> Self {
        let http_client = http_client.unwrap_or_else(|| {
            create_shared_client(DEFAULT_TIMEOUT).expect("Failed to create shared HTTP client")
        });
        let cache = MemoryCache::new();
        let completer = Self::build_completer(CratesIoRegistry::with_client(http_client), &cache);

        Self {
            client,
            config: RwLock::new(Config::default()),
            documents: DashMap::new(),
            cache,
            completer: RwLock::new(Arc::new(completer)),
        }
    }

    fn build_completer(registry: CratesIoRegistry, cache: &MemoryCache) -> Completer {
        FeatureCompleter::new(RemoteFeatureSource::new(registry, cache.clone()))
    }

    /// Point the completer at the configured registry
    fn apply_registry_config(&self, config: &Config) {
        let http_client = match create_shared_client(config.registry.timeout()) {
            Ok(client) => client,
            Err(e) => {
                tracing::error!("Failed to create HTTP client, keeping defaults: {}", e);
                return;
            }
        };
        let registry =
            CratesIoRegistry::with_client(http_client).with_base_url(config.registry.url.as_str());
        tracing::info!("Using registry {}", registry.base_url());

        let completer = Self::build_completer(registry, &self.cache);
        if let Ok(mut current) = self.completer.write() {
            *current = Arc::new(completer);
        }
    }

    fn update_document(&self, uri: Url, content: String) {
        if !is_cargo_manifest(&uri) {
            tracing::debug!("Ignoring non-manifest document: {}", uri);
            return;
        }
        let doc = DocumentState::new(&uri, content);
        self.documents.insert(uri, doc);
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for FeaturesBackend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let config = Config::from_init_options(params.initialization_options);
        tracing::info!("Configuration: {:?}", config);

        self.apply_registry_config(&config);
        if let Ok(mut cfg) = self.config.write() {
            *cfg = config;
        }

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "crate-features-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec!["\"".to_string(), "'".to_string()]),
                    ..Default::default()
                }),
                ..Default::default()
            },
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "crate-features-lsp initialized")
            .await;
        tracing::info!("crate-features-lsp initialized");
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!(
            "crate-features-lsp shutting down ({} cached feature lists)",
            self.cache.len()
        );
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::debug!("Document opened: {}", uri);
        self.update_document(uri, params.text_document.text);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;

        // With FULL sync, we get the entire document content
        if let Some(change) = params.content_changes.into_iter().last() {
            tracing::debug!("Document changed: {}", uri);
            self.update_document(uri, change.text);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::debug!("Document closed: {}", uri);
        self.documents.remove(&uri);
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        // Copy out of the map so no shard lock is held across the lookup
        let Some((content, manifest_dir)) = self
            .documents
            .get(uri)
            .and_then(|doc| Some((doc.content.clone(), doc.base_dir()?)))
        else {
            return Ok(None);
        };

        let config = match self.config.read() {
            Ok(config) => config.clone(),
            Err(_) => Config::default(),
        };
        let completer = match self.completer.read() {
            Ok(completer) => Arc::clone(&completer),
            Err(_) => return Ok(None),
        };

        let items = get_completions(&completer, &config, &content, position, &manifest_dir).await;
        Ok(items.map(CompletionResponse::Array))
    }
}
