//! Finds the dependency a `features` list belongs to
//!
//! Two declaration shapes are recognised:
//!
//! - **Inline table**: `serde = { version = "1.0", features = ["` on the
//!   cursor line. Only that line is consulted.
//! - **Section header**: a `[dependencies.serde]` header some lines above the
//!   cursor, followed by `version = "..."` / `path = "..."` lines.
//!
//! For the header form the search walks upward to the nearest
//! `[<segment>.<name>]` header, giving up when it meets a header that is not
//! part of a dependencies table. The keys of the found table are then read
//! by [`TableScanner`], which stops at the next header or after
//! [`TABLE_LOOKAHEAD_LINES`] lines, whichever comes first.

use std::path::{Component, Path, PathBuf};

use super::{
    DependencyReference, LineKind, classify_line, find_inline_value, is_identifier, quoted_value,
};

/// Number of lines after a dependency header that are searched for its keys
pub const TABLE_LOOKAHEAD_LINES: usize = 15;

/// Resolve the dependency owning the feature list on line `line` of
/// `content`.
///
/// Relative `path` values are resolved against `manifest_dir`, the
/// directory holding the manifest being edited.
pub fn resolve_dependency(
    content: &str,
    line: usize,
    manifest_dir: &Path,
) -> Option<DependencyReference> {
    let lines: Vec<&str> = content.lines().collect();
    let current = lines.get(line)?;

    if let Some(dependency) = inline_dependency(current, manifest_dir) {
        tracing::debug!("Inline dependency `{}` on line {}", dependency.crate_name, line);
        return Some(dependency);
    }

    let (header_line, crate_name) = find_table_header(&lines, line)?;

    let mut scanner = TableScanner::new();
    for text in &lines[header_line + 1..] {
        if !scanner.is_scanning() {
            break;
        }
        scanner.step(text);
    }

    tracing::debug!(
        "Table dependency `{}` declared on line {}",
        crate_name,
        header_line
    );

    Some(DependencyReference {
        crate_name: crate_name.to_string(),
        path: scanner
            .path
            .map(|raw| resolve_manifest_path(manifest_dir, raw)),
        version: scanner.version.map(str::to_string),
    })
}

/// Match `<identifier> = { ...` and read `path`/`version` from the same line
fn inline_dependency(line: &str, manifest_dir: &Path) -> Option<DependencyReference> {
    let (key, value) = line.split_once('=')?;
    let name = key.trim();
    if !is_identifier(name) || !value.trim_start().starts_with('{') {
        return None;
    }

    Some(DependencyReference {
        crate_name: name.to_string(),
        path: find_inline_value(value, "path").map(|raw| resolve_manifest_path(manifest_dir, raw)),
        version: find_inline_value(value, "version").map(str::to_string),
    })
}

/// Walk upward from the line above `line` to the nearest dependency header.
///
/// Returns the header's line index and the dependency name, or `None` when
/// a non-dependency header (e.g. `[package]`) is reached first.
fn find_table_header<'a>(lines: &[&'a str], line: usize) -> Option<(usize, &'a str)> {
    for idx in (0..line).rev() {
        let LineKind::Header(header) = classify_line(lines[idx]) else {
            continue;
        };
        if let Some(name) = header.dependency_name() {
            return Some((idx, name));
        }
        if !header.is_dependency_table() {
            tracing::debug!("Left dependency tables at line {}: [{}]", idx, header.inner);
            return None;
        }
    }
    None
}

/// Position of a [`TableScanner`] relative to the target dependency table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Lookahead exhausted before the table ended
    OutsideTable,
    /// Reading the target table; `remaining` lines may still be read
    InsideTargetTable { remaining: usize },
    /// Another header was reached, the target table is over
    InsideOtherTable,
}

/// Reads `path` and `version` keys from the lines following a dependency
/// header.
///
/// The first occurrence of each key wins.
#[derive(Debug, Clone)]
pub struct TableScanner<'a> {
    state: ScanState,
    pub path: Option<&'a str>,
    pub version: Option<&'a str>,
}

impl Default for TableScanner<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TableScanner<'a> {
    /// Scanner positioned just after the target header
    pub fn new() -> Self {
        Self {
            state: ScanState::InsideTargetTable {
                remaining: TABLE_LOOKAHEAD_LINES,
            },
            path: None,
            version: None,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_scanning(&self) -> bool {
        matches!(self.state, ScanState::InsideTargetTable { remaining } if remaining > 0)
    }

    /// Feed the next line of the document
    pub fn step(&mut self, line: &'a str) {
        let ScanState::InsideTargetTable { remaining } = self.state else {
            return;
        };
        if remaining == 0 {
            self.state = ScanState::OutsideTable;
            return;
        }

        match classify_line(line) {
            LineKind::Header(_) => {
                self.state = ScanState::InsideOtherTable;
                return;
            }
            LineKind::KeyValue { key, value } => match key {
                "path" if self.path.is_none() => self.path = quoted_value(value),
                "version" if self.version.is_none() => self.version = quoted_value(value),
                _ => {}
            },
            LineKind::Blank | LineKind::Comment | LineKind::Other => {}
        }

        self.state = if remaining == 1 {
            ScanState::OutsideTable
        } else {
            ScanState::InsideTargetTable {
                remaining: remaining - 1,
            }
        };
    }
}

/// Resolve a manifest `path` value into an absolute, lexically normalised
/// path. The target does not need to exist.
pub fn resolve_manifest_path(manifest_dir: &Path, raw: &str) -> PathBuf {
    normalize_path(&manifest_dir.join(raw))
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
