//! Decides whether the cursor sits at the start of a new feature name

use super::{QuoteState, features_list_start};

/// Returns `true` when `prefix` (the current line up to the cursor) ends
/// with an opening quote inside an unterminated `features = [` list.
///
/// ```
/// use crate_features_lsp::parsers::trigger::is_feature_trigger;
///
/// assert!(is_feature_trigger(r#"serde = { version = "1", features = ["derive", ""#));
/// assert!(!is_feature_trigger(r#"features = ["derive"] # ""#));
/// ```
pub fn is_feature_trigger(prefix: &str) -> bool {
    let Some(start) = features_list_start(prefix) else {
        return false;
    };
    let content = &prefix[start..];

    let Some(last) = content.chars().next_back() else {
        return false;
    };

    let mut quotes = QuoteState::default();
    for (idx, c) in content.char_indices() {
        if c == ']' && !quotes.is_open() {
            return false;
        }
        quotes.step(idx, c);
    }

    // The trailing quote must be the one left open, otherwise the cursor is
    // just after a finished entry such as `"std"`.
    quotes.open_quote() == Some(last)
}
