//! String utilities.

mod clip;
mod escape;
mod levenshtein;

pub use clip::{char_len, clip_chars};
pub use escape::escape;
pub use levenshtein::levenshtein;
