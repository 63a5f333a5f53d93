//! Picking the published version a manifest requirement refers to
//!
//! This is deliberately not semver resolution. A requirement is reduced to
//! a bare version string and matched textually against the registry's
//! version list, which is ordered newest first.

use super::RemoteVersionRecord;

/// Strip leading `^`, `~`, `=` operators and surrounding whitespace.
///
/// ```
/// use crate_features_lsp::registries::version_utils::normalize_requirement;
///
/// assert_eq!(normalize_requirement(" ^1.2 "), "1.2");
/// assert_eq!(normalize_requirement("= 0.3.1"), "0.3.1");
/// ```
pub fn normalize_requirement(requirement: &str) -> &str {
    requirement
        .trim()
        .trim_start_matches(['^', '~', '='])
        .trim()
}

/// Select the version matching `requirement`.
///
/// Without a requirement the newest version is used. Otherwise, in order:
/// an exact match, the newest version starting with the requirement text
/// (so `1.2` may pick `1.20.0`), and finally the newest version. Returns
/// `None` only when `versions` is empty.
pub fn select_version<'a>(
    versions: &'a [RemoteVersionRecord],
    requirement: Option<&str>,
) -> Option<&'a RemoteVersionRecord> {
    let newest = versions.first()?;

    let bare = match requirement.map(normalize_requirement) {
        Some(bare) if !bare.is_empty() => bare,
        _ => return Some(newest),
    };

    let selected = versions
        .iter()
        .find(|v| v.num == bare)
        .or_else(|| versions.iter().find(|v| v.num.starts_with(bare)));

    match selected {
        Some(version) => Some(version),
        None => {
            tracing::debug!(
                "No published version matches {}, using newest {}",
                bare,
                newest.num
            );
            Some(newest)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(nums: &[&str]) -> Vec<RemoteVersionRecord> {
        nums.iter().map(|n| RemoteVersionRecord::new(*n)).collect()
    }

    fn pick<'a>(list: &'a [RemoteVersionRecord], requirement: Option<&str>) -> &'a str {
        select_version(list, requirement).unwrap().num.as_str()
    }

    #[test]
    fn test_normalize_requirement() {
        assert_eq!(normalize_requirement("1.0.0"), "1.0.0");
        assert_eq!(normalize_requirement("^1.0"), "1.0");
        assert_eq!(normalize_requirement("~1.0.1"), "1.0.1");
        assert_eq!(normalize_requirement("=1.0.1"), "1.0.1");
        assert_eq!(normalize_requirement("  ^ 2 "), "2");
        assert_eq!(normalize_requirement(""), "");
    }

    #[test]
    fn test_selection_rules() {
        let list = versions(&["2.0.1", "1.5.0", "1.2.3"]);
        assert_eq!(pick(&list, Some("^1.2")), "1.2.3");
        assert_eq!(pick(&list, Some("1.5.0")), "1.5.0");
        assert_eq!(pick(&list, None), "2.0.1");
        assert_eq!(pick(&list, Some("9.9")), "2.0.1");
    }

    #[test]
    fn test_exact_match_beats_prefix() {
        let list = versions(&["1.2.10", "1.2.1", "1.2.0"]);
        assert_eq!(pick(&list, Some("=1.2.1")), "1.2.1");
    }

    #[test]
    fn test_prefix_is_textual_newest_first() {
        let list = versions(&["1.20.0", "1.2.5", "1.2.4"]);
        assert_eq!(pick(&list, Some("^1.2")), "1.20.0");
        assert_eq!(pick(&list, Some("1")), "1.20.0");
        assert_eq!(pick(&list, Some("1.2.")), "1.2.5");
    }

    #[test]
    fn test_prefix_skips_newer_non_matching() {
        let list = versions(&["2.0.0", "1.20.0"]);
        assert_eq!(pick(&list, Some("1.2")), "1.20.0");
    }

    #[test]
    fn test_prerelease_prefix() {
        let list = versions(&["1.0.0", "1.0.0-rc.1"]);
        assert_eq!(pick(&list, Some("1.0.0-rc")), "1.0.0-rc.1");
    }

    #[test]
    fn test_blank_requirement_uses_newest() {
        let list = versions(&["0.3.0", "0.2.0"]);
        assert_eq!(pick(&list, Some("  ")), "0.3.0");
        assert_eq!(pick(&list, Some("^")), "0.3.0");
    }

    #[test]
    fn test_empty_list() {
        assert!(select_version(&[], None).is_none());
        assert!(select_version(&[], Some("1.0")).is_none());
    }
}
