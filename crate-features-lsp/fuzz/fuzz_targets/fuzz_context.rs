#![no_main]

use crate_features_lsp::parsers::context::resolve_dependency;
use crate_features_lsp::parsers::existing::existing_features;
use crate_features_lsp::parsers::trigger::is_feature_trigger;
use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let dir = Path::new("/fuzz/app");

        for (idx, line) in content.lines().enumerate() {
            let listed = existing_features(line);
            assert!(
                listed.len() <= line.len() / 2,
                "each listed name needs two quotes"
            );

            if is_feature_trigger(line)
                && let Some(dependency) = resolve_dependency(content, idx, dir)
            {
                assert!(
                    !dependency.crate_name.is_empty(),
                    "crate name must not be empty"
                );
                if let Some(path) = &dependency.path {
                    assert!(path.is_absolute(), "resolved path must be absolute");
                }
            }
        }
    }
});
