//! Integration tests for crate-features-lsp

use std::path::Path;

use serde_json::json;
use tower_lsp::lsp_types::{CompletionItem, Documentation, Position};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate_features_lsp::cache::{MemoryCache, ReadCache};
use crate_features_lsp::config::Config;
use crate_features_lsp::features::RemoteFeatureSource;
use crate_features_lsp::providers::completion::{
    FeatureCompleter, completion_context, get_completions,
};
use crate_features_lsp::registries::crates_io::CratesIoRegistry;
use crate_features_lsp::registries::http_client::{DEFAULT_TIMEOUT, create_shared_client};

const MANIFEST: &str = r#"[package]
name = "my-awesome-app"
version = "0.1.0"
edition = "2024"

[dependencies]
tokio = { version = "1.35", features = ["rt", ""] }
helpers = { path = "../helpers", features = [""] }

[dependencies.serde]
version = "^1.0"
default-features = false
features = ['']

[dev-dependencies]
criterion = "0.5"
"#;

fn completer_for(server: &MockServer) -> FeatureCompleter<CratesIoRegistry> {
    let client = create_shared_client(DEFAULT_TIMEOUT).unwrap();
    let registry = CratesIoRegistry::with_client(client).with_base_url(server.uri());
    FeatureCompleter::new(RemoteFeatureSource::new(registry, MemoryCache::new()))
}

/// Position just after the last opening quote on `line`
fn cursor_after_last_quote(content: &str, line: u32) -> Position {
    let text = content.lines().nth(line as usize).unwrap();
    let idx = text.rfind(['"', '\'']).unwrap();
    let prev = text[..idx].rfind(['"', '\'']).unwrap();
    assert_eq!(idx, prev + 1, "expected an empty string on line {line}");
    Position {
        line,
        character: prev as u32 + 1,
    }
}

fn labels(items: &[CompletionItem]) -> Vec<&str> {
    items.iter().map(|item| item.label.as_str()).collect()
}

async fn mount_tokio(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/crates/tokio"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "crate": { "name": "tokio" },
            "versions": [
                {
                    "num": "1.40.0",
                    "features": {
                        "full": ["rt", "macros", "sync"],
                        "macros": ["tokio-macros"],
                        "rt": [],
                        "sync": [],
                        "test-util": ["rt"]
                    }
                },
                {
                    "num": "1.35.1",
                    "features": {
                        "full": ["rt", "macros"],
                        "macros": [],
                        "rt": [],
                        "__internal": []
                    }
                },
                {
                    "num": "0.3.0",
                    "features": {}
                }
            ]
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Full pipeline for an inline registry dependency
#[tokio::test]
async fn test_inline_dependency_against_registry() {
    let server = MockServer::start().await;
    mount_tokio(&server, 1).await;
    let completer = completer_for(&server);

    let position = cursor_after_last_quote(MANIFEST, 6);
    let items = get_completions(
        &completer,
        &Config::default(),
        MANIFEST,
        position,
        Path::new("/work/app"),
    )
    .await
    .unwrap();

    // 1.35 selects 1.35.1; `rt` is already listed and `__internal` is private
    assert_eq!(labels(&items), vec!["full", "macros"]);
    assert_eq!(items[0].detail.as_deref(), Some("crates.io tokio 1.35"));
    match &items[0].documentation {
        Some(Documentation::MarkupContent(markup)) => {
            assert!(markup.value.contains("`rt`"));
            assert!(markup.value.contains("`macros`"));
        }
        other => panic!("unexpected documentation: {other:?}"),
    }
    assert!(items[1].documentation.is_none());
}

/// Repeated requests for the same crate and version hit the registry once
#[tokio::test]
async fn test_repeated_completion_fetches_once() {
    let server = MockServer::start().await;
    mount_tokio(&server, 1).await;
    let completer = completer_for(&server);
    let position = cursor_after_last_quote(MANIFEST, 6);

    let mut results = Vec::new();
    for _ in 0..3 {
        let items = get_completions(
            &completer,
            &Config::default(),
            MANIFEST,
            position,
            Path::new("/work/app"),
        )
        .await
        .unwrap();
        results.push(labels(&items).join(","));
    }

    assert!(results.iter().all(|r| r == &results[0]));
    assert!(completer.remote().cache().contains("tokio@1.35"));
    // MockServer verifies `.expect(1)` on drop
}

/// Table form with single quotes and a caret requirement
#[tokio::test]
async fn test_table_dependency_against_registry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crates/serde"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "versions": [
                { "num": "1.0.210", "features": { "std": [], "alloc": [], "derive": ["serde_derive"] } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let completer = completer_for(&server);

    let position = cursor_after_last_quote(MANIFEST, 12);
    let context = completion_context(MANIFEST, position, Path::new("/work/app")).unwrap();
    assert_eq!(context.dependency.crate_name, "serde");
    assert_eq!(context.dependency.version.as_deref(), Some("^1.0"));

    let suggestions = completer.suggest(&context).await;
    let names: Vec<&str> = suggestions
        .iter()
        .map(|s| s.feature.name.as_str())
        .collect();
    assert_eq!(names, vec!["alloc", "derive", "std"]);
    assert!(completer.remote().cache().contains("serde@1.0"));
}

/// Path dependencies are read from disk and never reach the registry
#[tokio::test]
async fn test_path_dependency_reads_sibling_manifest() {
    let workspace = tempfile::tempdir().unwrap();
    let app = workspace.path().join("app");
    let helpers = workspace.path().join("helpers");
    std::fs::create_dir_all(&app).unwrap();
    std::fs::create_dir_all(&helpers).unwrap();
    std::fs::write(
        helpers.join("Cargo.toml"),
        r#"[package]
name = "helpers"
version = "0.1.0"

[features]
default = ["fs"]
fs = []
net = [
    "dep:reqwest",   # http
    "fs",
]
_test-only = []

[dependencies]
reqwest = { version = "0.13", optional = true }
"#,
    )
    .unwrap();

    let server = MockServer::start().await;
    let completer = completer_for(&server);

    let position = cursor_after_last_quote(MANIFEST, 7);
    let items = get_completions(&completer, &Config::default(), MANIFEST, position, &app)
        .await
        .unwrap();

    assert_eq!(labels(&items), vec!["default", "fs", "net"]);
    assert_eq!(items[0].detail.as_deref(), Some("local helpers"));
    let net = &items[2];
    assert_eq!(
        net.label_details
            .as_ref()
            .and_then(|d| d.description.as_deref()),
        Some("enables dep:reqwest, fs")
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

/// A missing local manifest or a failing registry just yields nothing
#[tokio::test]
async fn test_unavailable_sources_yield_empty_lists() {
    let workspace = tempfile::tempdir().unwrap();
    let app = workspace.path().join("app");
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crates/tokio"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;
    let completer = completer_for(&server);
    let config = Config::default();

    // Neither app/ nor helpers/ exist under the temp dir
    let position = cursor_after_last_quote(MANIFEST, 7);
    let items = get_completions(&completer, &config, MANIFEST, position, &app)
        .await
        .unwrap();
    assert!(items.is_empty());

    // Failures are not cached, so the second request asks again
    let position = cursor_after_last_quote(MANIFEST, 6);
    for _ in 0..2 {
        let items = get_completions(&completer, &config, MANIFEST, position, &app)
            .await
            .unwrap();
        assert!(items.is_empty());
    }
    assert!(completer.remote().cache().is_empty());
}

/// Positions that are not right after an opening quote in a feature list
#[tokio::test]
async fn test_no_completion_outside_feature_lists() {
    let server = MockServer::start().await;
    let completer = completer_for(&server);
    let dir = Path::new("/work/app");

    let positions = [
        // [package] name value
        Position {
            line: 1,
            character: 8,
        },
        // dev-dependency plain version string
        Position {
            line: 15,
            character: 13,
        },
        // between `[` and the first quote of the tokio list
        Position {
            line: 6,
            character: 40,
        },
    ];

    for position in positions {
        let items =
            get_completions(&completer, &Config::default(), MANIFEST, position, dir).await;
        assert!(items.is_none(), "unexpected items at {position:?}");
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}
