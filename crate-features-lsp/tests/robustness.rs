//! Malformed manifests and odd cursor positions must never panic

use std::panic::AssertUnwindSafe;
use std::path::Path;

use tower_lsp::lsp_types::Position;

use crate_features_lsp::parsers::context::resolve_dependency;
use crate_features_lsp::parsers::existing::existing_features;
use crate_features_lsp::parsers::manifest::parse_features_section;
use crate_features_lsp::parsers::trigger::is_feature_trigger;
use crate_features_lsp::providers::completion::completion_context;

const INPUTS: &[&str] = &[
    "",
    "\n\n\n",
    "[",
    "]",
    "[[",
    "[dependencies",
    "[dependencies.]",
    "[.serde]",
    "[dependencies.serde",
    "= { features = [\"",
    "serde = {",
    "serde = { features = [",
    "serde = { features = [\"",
    "serde = { features = ['",
    "serde = { features = [\"\\\"",
    "serde = { path = \"",
    "serde = { path = \"\", features = [\"",
    "serde = { path = \"../../../../../../..\", features = [\"",
    "features = [\"a\", \"b\"\"",
    "features = [\"a\"]]]\"",
    "features=[\"",
    "features = [\"é😀\", \"",
    "日本語 = { features = [\"",
    "[dependencies.日本語]\nfeatures = [\"",
    "[features]\nfull = [\n",
    "[features]\nfull = [\"a\",\n\"b\"",
    "[features]\n= []\n",
    "[features]\n[features]\na = [\"b\"]]",
    "[features]\na = [\"b\" # ]\n]\n",
    "\u{feff}[dependencies]\nserde = { features = [\"",
    "\r\n[dependencies]\r\nserde = { version = \"1\", features = [\"\r\n",
];

fn assert_no_panic(name: &str, input: &str, f: impl FnOnce()) {
    let result = std::panic::catch_unwind(AssertUnwindSafe(f));
    assert!(result.is_ok(), "{name} panicked on {input:?}");
}

#[test]
fn test_line_helpers_never_panic() {
    for input in INPUTS {
        for line in input.lines() {
            assert_no_panic("is_feature_trigger", line, || {
                is_feature_trigger(line);
            });
            assert_no_panic("existing_features", line, || {
                existing_features(line);
            });
            // Every char-boundary prefix, as typed
            for (idx, _) in line.char_indices() {
                let prefix = &line[..idx];
                assert_no_panic("is_feature_trigger", prefix, || {
                    is_feature_trigger(prefix);
                });
            }
        }
    }
}

#[test]
fn test_resolver_never_panics() {
    let dir = Path::new("/work/app");
    for input in INPUTS {
        let line_count = input.lines().count();
        for line in 0..line_count + 2 {
            assert_no_panic("resolve_dependency", input, || {
                resolve_dependency(input, line, dir);
            });
        }
    }
}

#[test]
fn test_features_section_never_panics() {
    for input in INPUTS {
        assert_no_panic("parse_features_section", input, || {
            parse_features_section(input);
        });
    }
}

#[test]
fn test_completion_context_any_position() {
    let dir = Path::new("/work/app");
    for input in INPUTS {
        for line in 0..4u32 {
            // Includes columns inside surrogate pairs and past the line end
            for character in 0..64u32 {
                let position = Position { line, character };
                assert_no_panic("completion_context", input, || {
                    completion_context(input, position, dir);
                });
            }
        }
    }
}

#[cfg(unix)]
#[test]
fn test_resolved_path_stays_absolute() {
    let dir = Path::new("/work/app");
    let content = "serde = { path = \"../../../../../../..\", features = [\"";
    let dependency = resolve_dependency(content, 0, dir).unwrap();
    assert_eq!(dependency.path.as_deref(), Some(Path::new("/")));
}
