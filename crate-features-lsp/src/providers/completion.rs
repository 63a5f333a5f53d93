//! Completion provider for feature names
//!
//! A request goes through three steps:
//!
//! 1. [`completion_context`] checks that the cursor just opened a string in
//!    a `features = [` list, finds the owning dependency and collects the
//!    features already listed. This part is synchronous and pure.
//! 2. [`FeatureCompleter::suggest`] resolves the dependency's features from
//!    its path or from the registry and drops the ones already listed.
//! 3. [`create_completion_items`] turns the suggestions into LSP items.

use std::collections::HashSet;
use std::path::Path;

use tower_lsp::lsp_types::*;

use crate::cache::{LATEST, MemoryCache, WriteCache};
use crate::config::Config;
use crate::features::{
    FeatureInfo, FeatureLookup, LocalFeatureSource, RemoteFeatureSource, is_private_feature,
};
use crate::parsers::DependencyReference;
use crate::parsers::context::resolve_dependency;
use crate::parsers::existing::existing_features;
use crate::parsers::trigger::is_feature_trigger;
use crate::registries::Registry;
use crate::registries::version_utils::normalize_requirement;
use crate::utils::{truncate_string, utf16_to_byte_offset};

/// Longest "enables ..." summary shown next to a label
const MAX_ENABLES_CHARS: usize = 40;

/// What a completion request is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionContext {
    pub dependency: DependencyReference,
    /// Features already present in the list being edited
    pub existing: HashSet<String>,
}

/// Build the context for a completion at `position`, or `None` when the
/// cursor is not at the start of a feature name inside a dependency.
pub fn completion_context(
    content: &str,
    position: Position,
    manifest_dir: &Path,
) -> Option<CompletionContext> {
    let line = content.lines().nth(position.line as usize)?;
    let prefix = &line[..utf16_to_byte_offset(line, position.character)];
    if !is_feature_trigger(prefix) {
        return None;
    }

    let dependency = resolve_dependency(content, position.line as usize, manifest_dir)?;
    Some(CompletionContext {
        dependency,
        existing: existing_features(line),
    })
}

/// Where a suggested feature was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureOrigin {
    /// The dependency's own manifest on disk
    Local { crate_name: String },
    /// The registry, at a requirement or `latest`
    Remote { crate_name: String, version: String },
}

impl FeatureOrigin {
    pub fn for_dependency(dependency: &DependencyReference) -> Self {
        let crate_name = dependency.crate_name.clone();
        if dependency.path.is_some() {
            return FeatureOrigin::Local { crate_name };
        }
        let version = dependency
            .version
            .as_deref()
            .map(normalize_requirement)
            .filter(|v| !v.is_empty())
            .unwrap_or(LATEST)
            .to_string();
        FeatureOrigin::Remote {
            crate_name,
            version,
        }
    }

    /// Short annotation shown next to each suggestion
    pub fn describe(&self) -> String {
        match self {
            FeatureOrigin::Local { crate_name } => format!("local {crate_name}"),
            FeatureOrigin::Remote {
                crate_name,
                version,
            } => format!("crates.io {crate_name} {version}"),
        }
    }
}

/// A feature offered for completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSuggestion {
    pub feature: FeatureInfo,
    pub origin: FeatureOrigin,
}

/// Resolves features for completion contexts
pub struct FeatureCompleter<R, C = MemoryCache> {
    local: LocalFeatureSource,
    remote: RemoteFeatureSource<R, C>,
}

impl<R: Registry, C: WriteCache> FeatureCompleter<R, C> {
    pub fn new(remote: RemoteFeatureSource<R, C>) -> Self {
        Self {
            local: LocalFeatureSource::new(),
            remote,
        }
    }

    pub fn remote(&self) -> &RemoteFeatureSource<R, C> {
        &self.remote
    }

    /// All public features of `dependency`: read from disk for path
    /// dependencies, from the registry otherwise
    pub async fn lookup(&self, dependency: &DependencyReference) -> FeatureLookup {
        match &dependency.path {
            Some(path) => self.local.lookup(path),
            None => {
                self.remote
                    .lookup(&dependency.crate_name, dependency.version.as_deref())
                    .await
            }
        }
    }

    /// Features of the context's dependency that are not listed yet
    pub async fn suggest(&self, context: &CompletionContext) -> Vec<FeatureSuggestion> {
        let origin = FeatureOrigin::for_dependency(&context.dependency);
        let features = self.lookup(&context.dependency).await.into_features();

        let suggestions: Vec<FeatureSuggestion> = features
            .into_iter()
            .filter(|f| !is_private_feature(&f.name) && !context.existing.contains(&f.name))
            .map(|feature| FeatureSuggestion {
                feature,
                origin: origin.clone(),
            })
            .collect();

        tracing::debug!(
            "{} suggestions for {}",
            suggestions.len(),
            origin.describe()
        );
        suggestions
    }
}

/// Convert suggestions into completion items, keeping their order
pub fn create_completion_items(
    suggestions: &[FeatureSuggestion],
    show_enables: bool,
) -> Vec<CompletionItem> {
    suggestions
        .iter()
        .enumerate()
        .map(|(i, suggestion)| {
            let feature = &suggestion.feature;
            let show = show_enables && !feature.enables.is_empty();

            CompletionItem {
                label: feature.name.clone(),
                kind: Some(CompletionItemKind::ENUM_MEMBER),
                detail: Some(suggestion.origin.describe()),
                label_details: show.then(|| CompletionItemLabelDetails {
                    detail: None,
                    description: Some(truncate_string(
                        &format!("enables {}", feature.enables.join(", ")),
                        MAX_ENABLES_CHARS,
                    )),
                }),
                documentation: show.then(|| {
                    let lines: Vec<String> = feature
                        .enables
                        .iter()
                        .map(|name| format!("- `{name}`"))
                        .collect();
                    Documentation::MarkupContent(MarkupContent {
                        kind: MarkupKind::Markdown,
                        value: format!("**Enables**\n\n{}", lines.join("\n")),
                    })
                }),
                sort_text: Some(format!("{i:04}")),
                insert_text: Some(feature.name.clone()),
                insert_text_format: Some(InsertTextFormat::PLAIN_TEXT),
                ..Default::default()
            }
        })
        .collect()
}

/// Completion items for `position` in `content`, or `None` when the cursor
/// is not in a feature list or the dependency is ignored
pub async fn get_completions<R: Registry, C: WriteCache>(
    completer: &FeatureCompleter<R, C>,
    config: &Config,
    content: &str,
    position: Position,
    manifest_dir: &Path,
) -> Option<Vec<CompletionItem>> {
    if !config.completion.enabled {
        return None;
    }

    let context = completion_context(content, position, manifest_dir)?;
    if config.is_ignored(&context.dependency.crate_name) {
        tracing::debug!("Skipping ignored crate {}", context.dependency.crate_name);
        return None;
    }

    let suggestions = completer.suggest(&context).await;
    Some(create_completion_items(
        &suggestions,
        config.completion.show_enables,
    ))
}
