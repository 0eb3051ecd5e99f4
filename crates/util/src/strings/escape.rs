use std::fmt::Write;

/// Escape a string for use inside a JSON string literal.
///
/// Only `"`, `\` and control characters are escaped; non-ASCII text is
/// kept verbatim.
///
/// # Examples
///
/// ```
/// use patchguard_util::strings::escape;
///
/// assert_eq!(escape("hello"), "hello");
/// assert_eq!(escape("say \"hi\""), "say \\\"hi\\\"");
/// assert_eq!(escape("line1\nline2"), "line1\\nline2");
/// ```
pub fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\u{0008}' => result.push_str("\\b"),
            '\u{000C}' => result.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let _ = write!(result, "\\u{:04x}", c as u32);
            }
            c => result.push(c),
        }
    }
    result
}
