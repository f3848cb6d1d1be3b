use once_cell::sync::Lazy;
use regex::Regex;

static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).expect("quoted regex"));
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z][\w-]*").expect("word regex"));
static AT_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"@(\w+)\s*=\s*['"]([^'"]+)['"]"#).expect("@attribute regex"));
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(\w+)\s*=\s*['"]([^'"]+)['"]"#).expect("attribute regex"));
static CSS_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"#([\w-]+)").expect("css id regex"));
static CSS_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.([\w-]+)").expect("css class regex"));

/// Pull every meaningful token out of a free-form locator hint.
///
/// Quoted strings, identifier-like words, `attr="value"` / `@attr="value"`
/// pairs (name and value both) and CSS `#id` / `.class` fragments, in that
/// order, lowercased and space-joined. Duplicates are kept on purpose: a
/// token found by several patterns weighs more downstream.
pub fn extract_tokens(hint: &str) -> String {
    if hint.is_empty() {
        return String::new();
    }
    let mut tokens: Vec<&str> = Vec::new();
    tokens.extend(QUOTED.captures_iter(hint).filter_map(|c| c.get(1)).map(|m| m.as_str()));
    tokens.extend(WORD.find_iter(hint).map(|m| m.as_str()));
    for pairs in [&*AT_ATTRIBUTE, &*ATTRIBUTE] {
        for caps in pairs.captures_iter(hint) {
            tokens.extend([caps.get(1), caps.get(2)].into_iter().flatten().map(|m| m.as_str()));
        }
    }
    for fragment in [&*CSS_ID, &*CSS_CLASS] {
        tokens.extend(fragment.captures_iter(hint).filter_map(|c| c.get(1)).map(|m| m.as_str()));
    }
    tokens.iter().map(|t| t.to_lowercase()).collect::<Vec<_>>().join(" ")
}
