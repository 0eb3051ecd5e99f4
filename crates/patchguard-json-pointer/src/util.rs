use serde::{Deserialize, Serialize};

use crate::{JsonPointerError, Path};

/// Unescapes a JSON Pointer path component.
///
/// `~1` is decoded before `~0`, so `~01` yields `~1` and not `/`.
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a JSON Pointer path component.
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Parse a JSON Pointer string into path components.
///
/// Both `""` and `"/"` address the document root. Any other pointer must
/// start with `/`.
///
/// # Errors
///
/// Returns [`JsonPointerError::MissingLeadingSlash`] for relative pointers.
pub fn parse_json_pointer(pointer: &str) -> Result<Path, JsonPointerError> {
    if pointer.is_empty() || pointer == "/" {
        return Ok(Vec::new());
    }
    if !pointer.starts_with('/') {
        return Err(JsonPointerError::MissingLeadingSlash(pointer.to_string()));
    }
    Ok(pointer[1..].split('/').map(unescape_component).collect())
}

/// Options for [`parse_json_pointer_lenient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParseOptions {
    /// Percent-decode each token after `~` unescaping (`%2F` becomes `/`).
    pub url_decode: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { url_decode: true }
    }
}

/// Parse a pointer that may be missing its leading `/`.
///
/// Never fails: a relative pointer is treated as if it were absolute.
pub fn parse_json_pointer_lenient(pointer: &str, options: &ParseOptions) -> Path {
    if pointer.is_empty() || pointer == "/" {
        return Vec::new();
    }
    let body = pointer.strip_prefix('/').unwrap_or(pointer);
    body.split('/')
        .map(|token| {
            let token = unescape_component(token);
            if options.url_decode && token.contains('%') {
                percent_decode(&token)
            } else {
                token
            }
        })
        .collect()
}

/// Decodes `%XX` sequences as UTF-8; malformed escapes are kept literally.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Format path components into a JSON Pointer string.
///
/// Returns an empty string for the root path.
pub fn format_json_pointer(path: &[String]) -> String {
    let mut out = String::new();
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}

/// Appends one unescaped token to an already formatted pointer.
pub fn append_token(pointer: &str, token: &str) -> String {
    let base = if pointer == "/" { "" } else { pointer };
    format!("{base}/{}", escape_component(token))
}

/// Check if `parent` path contains the `child` path.
pub fn is_child(parent: &[String], child: &[String]) -> bool {
    parent.len() < child.len() && child.starts_with(parent)
}

/// Parses an array index token.
///
/// The token must be a non-empty run of ASCII digits. Leading zeros are
/// accepted and `-` is not an index.
pub fn parse_array_index(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Whether a token looks like an array position: a digit run or `-`.
pub fn is_array_token(token: &str) -> bool {
    token == "-" || parse_array_index(token).is_some()
}
