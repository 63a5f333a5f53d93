//! Reads the `[features]` table of a dependency's own Cargo.toml

use crate::features::{FeatureInfo, is_private_feature};

use super::{LineKind, classify_line};

/// Parse the `[features]` section of `content`, in file order.
///
/// Each `name = [ ... ]` line yields the names it enables. A bare
/// `name = ...` yields an empty enable list. Arrays spanning several lines
/// are joined until their closing bracket. Names starting with `_` are
/// dropped.
pub fn parse_features_section(content: &str) -> Vec<FeatureInfo> {
    let mut features = Vec::new();
    let mut in_features = false;
    let mut pending: Option<(String, String)> = None;

    for line in content.lines() {
        if let Some((name, mut buffer)) = pending.take() {
            let body = strip_comment(line);
            match body.find(']') {
                Some(end) => {
                    buffer.push_str(&body[..end]);
                    push_feature(&mut features, name, &buffer);
                }
                None => {
                    buffer.push_str(body);
                    buffer.push(',');
                    pending = Some((name, buffer));
                }
            }
            continue;
        }

        match classify_line(line) {
            LineKind::Header(header) => {
                in_features = header.inner == "features" && !line.trim_start().starts_with("[[");
            }
            _ if !in_features => {}
            LineKind::KeyValue { key, value } => {
                let Some(list) = value.strip_prefix('[') else {
                    push_feature(&mut features, key.to_string(), "");
                    continue;
                };
                let list = strip_comment(list);
                match list.find(']') {
                    Some(end) => push_feature(&mut features, key.to_string(), &list[..end]),
                    None => {
                        let mut buffer = list.to_string();
                        buffer.push(',');
                        pending = Some((key.to_string(), buffer));
                    }
                }
            }
            LineKind::Blank | LineKind::Comment | LineKind::Other => {}
        }
    }

    // Unterminated array at end of file: keep what was read
    if let Some((name, buffer)) = pending {
        push_feature(&mut features, name, &buffer);
    }

    features
}

fn push_feature(features: &mut Vec<FeatureInfo>, name: String, list: &str) {
    if is_private_feature(&name) {
        return;
    }
    features.push(FeatureInfo {
        name,
        enables: split_enable_list(list),
    });
}

/// Split the inside of an enable list: commas, then whitespace and quotes
/// trimmed, empties discarded
pub fn split_enable_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|entry| entry.trim().trim_matches(['"', '\'']).trim())
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drop a trailing `# comment` that is not inside a string
fn strip_comment(text: &str) -> &str {
    let mut quote: Option<char> = None;
    for (idx, c) in text.char_indices() {
        match (quote, c) {
            (None, '#') => return &text[..idx],
            (None, '"' | '\'') => quote = Some(c),
            (Some(open), _) if open == c => quote = None,
            _ => {}
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(features: &[FeatureInfo]) -> Vec<&str> {
        features.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_parse_features_section() {
        let content = r#"[package]
name = "foo"
version = "0.1.0"

[features]
default = ["std"]
std = ["alloc", "serde?/std"]
alloc = []
# the big one
full = [ "std" , 'derive', ]
derive = ["dep:foo-derive"]

[dependencies]
serde = { version = "1", optional = true }
"#;
        let features = parse_features_section(content);
        assert_eq!(names(&features), vec!["default", "std", "alloc", "full", "derive"]);
        assert_eq!(features[0].enables, vec!["std"]);
        assert_eq!(features[1].enables, vec!["alloc", "serde?/std"]);
        assert!(features[2].enables.is_empty());
        assert_eq!(features[3].enables, vec!["std", "derive"]);
        assert_eq!(features[4].enables, vec!["dep:foo-derive"]);
    }

    #[test]
    fn test_private_features_are_dropped() {
        let content = r#"[features]
_internal = []
public = ["_internal"]
"#;
        let features = parse_features_section(content);
        assert_eq!(names(&features), vec!["public"]);
        assert_eq!(features[0].enables, vec!["_internal"]);
    }

    #[test]
    fn test_multiline_array() {
        let content = r#"[features]
full = [
    "std",  # standard library
    "derive",
]
std = []
"#;
        let features = parse_features_section(content);
        assert_eq!(names(&features), vec!["full", "std"]);
        assert_eq!(features[0].enables, vec!["std", "derive"]);
    }

    #[test]
    fn test_bare_value() {
        let content = "[features]\nweird = true\n";
        let features = parse_features_section(content);
        assert_eq!(names(&features), vec!["weird"]);
        assert!(features[0].enables.is_empty());
    }

    #[test]
    fn test_quoted_feature_keys() {
        let content = r#"[features]
"foo-bar" = ["std"]
'tls.rustls' = [
    "dep:rustls",
]
"_hidden" = []
std = []
"#;
        let features = parse_features_section(content);
        assert_eq!(names(&features), vec!["foo-bar", "tls.rustls", "std"]);
        assert_eq!(features[0].enables, vec!["std"]);
        assert_eq!(features[1].enables, vec!["dep:rustls"]);
    }

    #[test]
    fn test_no_features_section() {
        let content = r#"[package]
name = "foo"

[dependencies]
serde = "1"
"#;
        assert!(parse_features_section(content).is_empty());
    }

    #[test]
    fn test_only_exact_features_header() {
        let content = r#"[package.metadata.docs.rs]
features = ["full"]

[target.'cfg(unix)'.features]
x = []
"#;
        assert!(parse_features_section(content).is_empty());
    }

    #[test]
    fn test_unterminated_array_at_eof() {
        let content = "[features]\nfull = [\"std\",\n\"alloc\"";
        let features = parse_features_section(content);
        assert_eq!(features[0].enables, vec!["std", "alloc"]);
    }

    #[test]
    fn test_split_enable_list() {
        assert_eq!(split_enable_list(r#" "a", 'b' ,, c "#), vec!["a", "b", "c"]);
        assert!(split_enable_list("").is_empty());
    }
}
