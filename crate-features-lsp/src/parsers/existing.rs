//! Feature names already written in the list being edited

use std::collections::HashSet;

use super::{QuoteState, features_list_start};

/// Collect the quoted entries of the `features = [...]` list on `line`.
///
/// The list is read up to its closing `]`. When the list is not closed on
/// this line, everything up to the end of the line is read instead. Only
/// complete strings count, so the entry still being typed is ignored.
pub fn existing_features(line: &str) -> HashSet<String> {
    let mut found = HashSet::new();
    let Some(start) = features_list_start(line) else {
        return found;
    };

    let mut quotes = QuoteState::default();
    for (idx, c) in line[start..].char_indices() {
        if c == ']' && !quotes.is_open() {
            break;
        }
        if let Some((from, to)) = quotes.step(idx, c) {
            found.insert(line[start + from..start + to].to_string());
        }
    }
    found
}
