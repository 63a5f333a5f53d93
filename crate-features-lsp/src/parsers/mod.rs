//! Line-oriented extraction from Cargo.toml text
//!
//! Nothing here is a TOML parser. Each helper looks at one line at a time
//! and either recognises a shape (section header, `key = value`, a
//! `features = [` list) or gives up. Malformed input simply fails to match.

use std::path::PathBuf;

pub mod context;
pub mod existing;
pub mod manifest;
pub mod trigger;

/// The dependency a feature list belongs to, as declared in the manifest
/// being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyReference {
    /// Dependency key as written (e.g. `serde`)
    pub crate_name: String,
    /// Absolute path of a path dependency, resolved against the manifest directory
    pub path: Option<PathBuf>,
    /// Raw version requirement (e.g. `^1.2`)
    pub version: Option<String>,
}

/// Classification of a single manifest line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Comment,
    Header(SectionHeader<'a>),
    KeyValue { key: &'a str, value: &'a str },
    Other,
}

/// A `[...]` or `[[...]]` header, with the text between the brackets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader<'a> {
    pub inner: &'a str,
}

impl<'a> SectionHeader<'a> {
    /// Dependency name for `[<segment>.<identifier>]` headers.
    ///
    /// `segment` must be a lowercase/hyphen word such as `dependencies` or
    /// `dev-dependencies`.
    pub fn dependency_name(&self) -> Option<&'a str> {
        let (segment, name) = self.inner.split_once('.')?;
        let segment_ok = !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '-');
        (segment_ok && is_identifier(name)).then_some(name)
    }

    /// Whether this header belongs to a dependencies table of any kind
    pub fn is_dependency_table(&self) -> bool {
        self.inner.contains("dependencies")
    }
}

/// Classify a line without looking at its neighbours
pub fn classify_line(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with('#') {
        return LineKind::Comment;
    }
    if let Some(header) = parse_section_header(trimmed) {
        return LineKind::Header(header);
    }
    match parse_key_value(trimmed) {
        Some((key, value)) => LineKind::KeyValue { key, value },
        None => LineKind::Other,
    }
}

/// Parse a trimmed line starting with `[` into a header.
///
/// Trailing comments after the closing bracket are tolerated.
pub fn parse_section_header(trimmed: &str) -> Option<SectionHeader<'_>> {
    let rest = trimmed.strip_prefix('[')?;
    let rest = rest.strip_prefix('[').unwrap_or(rest);
    let end = rest.find(']')?;
    Some(SectionHeader {
        inner: rest[..end].trim(),
    })
}

/// Split `key = value` where `key` is a bare identifier or a quoted key
/// such as `"foo-bar"` (returned without its quotes).
///
/// The returned value is trimmed but otherwise raw (quotes, brackets and
/// braces are kept).
pub fn parse_key_value(trimmed: &str) -> Option<(&str, &str)> {
    if let Some(quote) = trimmed.chars().next().filter(|c| is_quote(*c)) {
        let inner = &trimmed[1..];
        let end = inner.find(quote)?;
        let value = inner[end + 1..].trim_start().strip_prefix('=')?;
        let key = &inner[..end];
        return (!key.is_empty()).then(|| (key, value.trim()));
    }

    let (key, value) = trimmed.split_once('=')?;
    let key = key.trim();
    if !is_identifier(key) {
        return None;
    }
    Some((key, value.trim()))
}

/// Contents of a quoted value such as `"1.0"` or `'../foo'`.
///
/// Anything after the closing quote (a trailing comment, say) is ignored.
pub fn quoted_value(value: &str) -> Option<&str> {
    let quote = value.chars().next().filter(|c| is_quote(*c))?;
    let inner = &value[1..];
    let end = inner.find(quote)?;
    Some(&inner[..end])
}

/// Find `key = "value"` inside an inline table such as
/// `foo = { version = "1.0", path = "../foo" }`.
///
/// The key must start the table or follow a `,`/whitespace, so `version`
/// does not match inside `"version"` or `my-version`.
pub fn find_inline_value<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    for (idx, _) in text.match_indices(key) {
        let boundary = text[..idx]
            .chars()
            .next_back()
            .is_none_or(|c| c == '{' || c == ',' || c.is_whitespace());
        if !boundary {
            continue;
        }
        let after = text[idx + key.len()..].trim_start();
        let Some(after_eq) = after.strip_prefix('=') else {
            continue;
        };
        if let Some(value) = quoted_value(after_eq.trim_start()) {
            return Some(value);
        }
    }
    None
}

/// Byte offset just after the `[` of a `features = [` list, if the text
/// contains one.
pub fn features_list_start(text: &str) -> Option<usize> {
    const KEY: &str = "features";

    for (idx, _) in text.match_indices(KEY) {
        let boundary = text[..idx]
            .chars()
            .next_back()
            .is_none_or(|c| !is_identifier_char(c));
        if !boundary {
            continue;
        }
        let after_key = &text[idx + KEY.len()..];
        let after_key_trimmed = after_key.trim_start();
        let Some(after_eq) = after_key_trimmed.strip_prefix('=') else {
            continue;
        };
        let after_eq_trimmed = after_eq.trim_start();
        if after_eq_trimmed.starts_with('[') {
            return Some(text.len() - after_eq_trimmed.len() + 1);
        }
    }
    None
}

/// Tracks which quote (if any) is open while walking list content
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct QuoteState {
    open: Option<(char, usize)>,
}

impl QuoteState {
    /// Advance over `c` at byte `idx`. Returns the byte range of the string
    /// contents when `c` closes a string.
    pub(crate) fn step(&mut self, idx: usize, c: char) -> Option<(usize, usize)> {
        if !is_quote(c) {
            return None;
        }
        match self.open {
            None => {
                self.open = Some((c, idx + c.len_utf8()));
                None
            }
            Some((quote, start)) if quote == c => {
                self.open = None;
                Some((start, idx))
            }
            Some(_) => None,
        }
    }

    pub(crate) fn open_quote(&self) -> Option<char> {
        self.open.map(|(quote, _)| quote)
    }

    pub(crate) fn is_open(&self) -> bool {
        self.open.is_some()
    }
}

pub(crate) fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Bare TOML key made of ASCII alphanumerics, `-` and `_`
pub fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_identifier_char)
}
