/// Length of a string in Unicode scalar values.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Returns the first `max_chars` characters of `s`, never splitting a
/// character.
pub fn clip_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}
