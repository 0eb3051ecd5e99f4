//! Read-only views of a document for a caller that is about to patch it.
//!
//! All three tools accept hand-typed pointers: a missing leading `/` is
//! tolerated and none of them fails on a path that does not resolve.

pub mod inspect_keys;
pub mod read_value;
pub mod search_pointer;

pub use inspect_keys::{inspect_keys, InspectOptions, Inspection};
pub use read_value::{read_value, ReadError, ReadOptions, ValueRead};
pub use search_pointer::{search_pointer, SearchKind, SearchMatch, SearchOptions, SearchResult};

/// An array index in canonical form: `0` or digits without a leading zero.
pub(crate) fn canonical_index(token: &str) -> Option<usize> {
    let canonical = token == "0" || (!token.starts_with('0') && !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()));
    if canonical {
        token.parse().ok()
    } else {
        None
    }
}
