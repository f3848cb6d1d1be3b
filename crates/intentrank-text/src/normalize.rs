use once_cell::sync::Lazy;
use regex::Regex;

static CAMEL_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z])([A-Z])").expect("camel regex"));
static NON_ALNUM_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]+").expect("non-alnum regex"));

/// Case-fold and split identifiers into plain words.
///
/// `userName`, `user_name` and `user-name` all become `user name`. Every run
/// of non-alphanumeric characters collapses to one space. Idempotent.
pub fn normalize(s: &str) -> String {
    let s = s.replace(['_', '-'], " ");
    let s = CAMEL_BOUNDARY.replace_all(&s, "$1 $2");
    let s = NON_ALNUM_RUN.replace_all(&s, " ");
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize and drop every token found in `stop`.
pub fn normalize_without(s: &str, stop: &[&str]) -> String {
    normalize(s)
        .split(' ')
        .filter(|t| !t.is_empty() && !stop.contains(t))
        .collect::<Vec<_>>()
        .join(" ")
}
