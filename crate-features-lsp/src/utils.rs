//! Small string helpers shared by the providers

/// Shorten `s` to at most `max_chars` characters, ending in `...` when
/// anything was cut. Counts chars, not bytes.
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        return s.to_string();
    }

    let keep_chars = max_chars.saturating_sub(3);
    let truncated: String = s.chars().take(keep_chars).collect();
    format!("{}...", truncated)
}

/// Byte offset in `line` of an LSP position `character`, which counts
/// UTF-16 code units. Positions past the end clamp to the line length.
pub fn utf16_to_byte_offset(line: &str, character: u32) -> usize {
    let mut units = 0u32;
    for (idx, ch) in line.char_indices() {
        if units >= character {
            return idx;
        }
        units += ch.len_utf16() as u32;
    }
    line.len()
}
