use scraper::{ElementRef, Html, Selector};
use std::fs;
use std::path::Path;
use tracing::debug;

use intentrank_core::error::Result;
use intentrank_core::traits::LocatorResolver;
use intentrank_core::types::{Candidate, Signature};

use crate::selector;
use crate::xpath::PathQuery;

/// Elements whose text never renders.
const NON_VISIBLE: &[&str] = &["script", "style", "template"];

/// A parsed markup page and its flat candidate list.
///
/// `candidates[i]` and `outer_html[i]` describe the same element; the list
/// holds every element in document order, `html`/`head`/`body` included.
pub struct MarkupDocument {
    html: Html,
    candidates: Vec<Candidate>,
    outer_html: Vec<String>,
}

impl MarkupDocument {
    pub fn parse(markup: &str) -> Self {
        let html = Html::parse_document(markup);
        let (candidates, outer_html): (Vec<Candidate>, Vec<String>) = match Selector::parse("*") {
            Ok(all) => html.select(&all).map(|el| (candidate_from_element(el), el.html())).unzip(),
            Err(_) => (Vec::new(), Vec::new()),
        };
        debug!(elements = candidates.len(), "parsed markup document");
        Self { html, candidates, outer_html }
    }

    /// Parse markup given either inline or as a path to a file; see [`read_markup`].
    pub fn load(html_or_path: &str) -> Result<Self> {
        Ok(Self::parse(&read_markup(html_or_path)?))
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn outer_html(&self, index: usize) -> Option<&str> {
        self.outer_html.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl LocatorResolver for MarkupDocument {
    fn resolve_path(&self, query: &str) -> Result<Vec<Signature>> {
        let query = PathQuery::parse(query)?;
        Ok(query.select(&self.html).into_iter().map(signature_of).collect())
    }

    fn resolve_selector(&self, selector: &str) -> Result<Vec<Signature>> {
        Ok(selector::select(&self.html, selector)?.into_iter().map(signature_of).collect())
    }
}

/// Resolve the markup behind an `html_or_path` argument.
///
/// A string containing both `<` and `</` is markup. Otherwise, if it names
/// an existing file, the file is read (invalid UTF-8 replaced). Anything
/// else is treated as markup as-is.
pub fn read_markup(html_or_path: &str) -> Result<String> {
    if html_or_path.contains('<') && html_or_path.contains("</") {
        return Ok(html_or_path.to_string());
    }
    let path = Path::new(html_or_path);
    if !html_or_path.is_empty() && path.is_file() {
        let bytes = fs::read(path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "read markup from file");
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }
    Ok(html_or_path.to_string())
}

pub fn candidate_from_element(el: ElementRef<'_>) -> Candidate {
    with_attributes(el).with_text(visible_text(el))
}

/// Tag and attributes only. Resolver signatures come from here too, so a
/// hit always compares equal to the ranked candidate it names.
fn with_attributes(el: ElementRef<'_>) -> Candidate {
    let mut candidate = Candidate::element(el.value().name());
    for (name, value) in el.value().attrs() {
        let value = if name.eq_ignore_ascii_case("class") {
            value.split_whitespace().collect::<Vec<_>>().join(" ")
        } else {
            value.to_string()
        };
        candidate = candidate.with_attribute(name, value);
    }
    candidate
}

fn signature_of(el: ElementRef<'_>) -> Signature {
    with_attributes(el).signature()
}

/// Trimmed, non-empty text nodes under `el` joined by single spaces.
pub fn visible_text(el: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    collect_text(el, &mut parts);
    parts.join(" ")
}

fn collect_text(el: ElementRef<'_>, parts: &mut Vec<String>) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed.to_string());
            }
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if !NON_VISIBLE.contains(&child_el.value().name()) {
                collect_text(child_el, parts);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN: &str = r#"<html><head><title>Sign in</title><style>.x{}</style></head><body>
        <form id="login-form" class="card  auth">
          <input id="user-name" name="user-name" placeholder="Username" type="text">
          <button id="login-button" class="btn" type="submit">Login <b>now</b></button>
        </form></body></html>"#;

    #[test]
    fn every_element_becomes_a_candidate_in_order() {
        let doc = MarkupDocument::parse(LOGIN);
        let kinds: Vec<&str> = doc.candidates().iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(kinds, vec!["html", "head", "title", "style", "body", "form", "input", "button", "b"]);
        assert_eq!(doc.len(), doc.candidates().len());
    }

    #[test]
    fn candidate_fields_follow_attributes() {
        let doc = MarkupDocument::parse(LOGIN);
        let form = &doc.candidates()[5];
        assert_eq!(form.identifier, "login-form");
        assert_eq!(form.classes, vec!["card", "auth"]);
        assert_eq!(form.attribute("class"), Some("card auth"));
        let input = &doc.candidates()[6];
        assert_eq!(input.secondary_id, "user-name");
        assert_eq!(input.attribute("placeholder"), Some("Username"));
    }

    #[test]
    fn visible_text_skips_styles_and_joins_nodes() {
        let doc = MarkupDocument::parse(LOGIN);
        assert_eq!(doc.candidates()[7].text, "Login now");
        assert_eq!(doc.candidates()[1].text, "Sign in");
    }

    #[test]
    fn outer_html_matches_candidate() {
        let doc = MarkupDocument::parse(LOGIN);
        let outer = doc.outer_html(7).unwrap();
        assert!(outer.starts_with("<button"));
        assert!(outer.contains("<b>now</b>"));
        assert!(doc.outer_html(99).is_none());
    }

    #[test]
    fn resolver_signatures_match_candidate_signatures() {
        let doc = MarkupDocument::parse(LOGIN);
        let by_selector = doc.resolve_selector("form .btn").unwrap();
        let by_path = doc.resolve_path("//button[@id='login-button']").unwrap();
        assert_eq!(by_selector, vec![doc.candidates()[7].signature()]);
        assert_eq!(by_path, by_selector);
    }

    #[test]
    fn repeated_class_tokens_survive_resolution() {
        let doc = MarkupDocument::parse(r#"<button id="go" class="btn btn">Go</button><button id="stop" class="btn">Stop</button>"#);
        let go = doc.candidates().iter().find(|c| c.identifier == "go").unwrap();
        assert_eq!(go.classes, vec!["btn", "btn"]);
        assert_eq!(doc.resolve_selector("#go").unwrap(), vec![go.signature()]);
        assert_eq!(doc.resolve_path("//button[@id='go']").unwrap(), vec![go.signature()]);
    }
}
