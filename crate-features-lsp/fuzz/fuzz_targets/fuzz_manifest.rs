#![no_main]

use crate_features_lsp::parsers::manifest::parse_features_section;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        for feature in parse_features_section(content) {
            assert!(!feature.name.starts_with('_'), "private feature leaked");
            assert!(
                feature.enables.iter().all(|name| !name.is_empty()),
                "empty enable entry"
            );
        }
    }
});
