//! Domain types shared by the corpus adapters and the ranking engine.

use serde::{Deserialize, Serialize};

/// Order-independent structural fingerprint of a candidate.
///
/// Only ever compared for set membership (locator hits vs. ranked
/// candidates); never used to order results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub kind: String,
    pub identifier: String,
    pub secondary_id: String,
    pub classes: Vec<String>,
}

impl Signature {
    pub fn new<S: AsRef<str>>(kind: &str, identifier: &str, secondary_id: &str, classes: &[S]) -> Self {
        let mut classes: Vec<String> = classes.iter().map(|c| c.as_ref().to_lowercase()).collect();
        classes.sort();
        Self {
            kind: kind.to_lowercase(),
            identifier: identifier.to_lowercase(),
            secondary_id: secondary_id.to_lowercase(),
            classes,
        }
    }
}

/// One scoreable item: a markup element or a labelled document chunk.
///
/// - `kind`: element tag or chunk type
/// - `identifier`: `id` attribute or chunk label
/// - `secondary_id`: `name` attribute, empty for chunks
/// - `classes`: class tokens, empty for chunks
/// - `attributes`: every attribute in source order, empty for chunks
/// - `text`: flattened visible text or chunk body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub kind: String,
    pub identifier: String,
    pub secondary_id: String,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
    pub text: String,
}

impl Candidate {
    /// An element candidate with no attributes yet.
    pub fn element(kind: impl Into<String>) -> Self {
        Self { kind: kind.into(), ..Self::default() }
    }

    /// A document chunk candidate. Chunks carry no attributes.
    pub fn chunk(kind: impl Into<String>, label: impl Into<String>, body: impl Into<String>) -> Self {
        Self { kind: kind.into(), identifier: label.into(), text: body.into(), ..Self::default() }
    }

    /// Appends an attribute, keeping `identifier`, `secondary_id` and
    /// `classes` in sync with `id`, `name` and `class`.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match name.to_ascii_lowercase().as_str() {
            "id" => self.identifier = value.clone(),
            "name" => self.secondary_id = value.clone(),
            "class" => self.classes = value.split_whitespace().map(str::to_string).collect(),
            _ => {}
        }
        self.attributes.push((name, value));
        self
    }

    pub fn with_id(self, id: impl Into<String>) -> Self { self.with_attribute("id", id) }

    pub fn with_name(self, name: impl Into<String>) -> Self { self.with_attribute("name", name) }

    pub fn with_classes(self, classes: &[&str]) -> Self { self.with_attribute("class", classes.join(" ")) }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// First attribute value whose name matches case-insensitively.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn signature(&self) -> Signature {
        Signature::new(&self.kind, &self.identifier, &self.secondary_id, &self.classes)
    }
}

/// A candidate paired with its final score. `index` is the position in the
/// corpus the candidate was ranked from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub index: usize,
    pub candidate: &'a Candidate,
    pub score: f64,
}

/// The sole unit of work for one ranking call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankRequest {
    pub intent: String,
    pub locator_hint: String,
    pub top_k: usize,
    pub min_score: f64,
}

impl RankRequest {
    pub fn new(intent: impl Into<String>) -> Self {
        Self { intent: intent.into(), locator_hint: String::new(), top_k: 5, min_score: 0.0 }
    }

    pub fn with_locator(mut self, hint: impl Into<String>) -> Self {
        self.locator_hint = hint.into();
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }
}

/// Threshold schedule for the backoff search: `start`, `start - step`, ...
/// down to `floor`. `step` is always used by absolute value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackoffPlan {
    pub start: f64,
    pub floor: f64,
    pub step: f64,
}

impl Default for BackoffPlan {
    fn default() -> Self {
        Self { start: 0.5, floor: 0.0, step: 0.05 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_ignores_class_order_and_case() {
        let a = Candidate::element("BUTTON").with_id("Go").with_classes(&["b", "A"]);
        let b = Candidate::element("button").with_id("go").with_classes(&["a", "B"]);
        assert_eq!(a.signature(), b.signature());
        assert_eq!(a.signature().classes, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn attribute_helpers_keep_fields_in_sync() {
        let c = Candidate::element("input")
            .with_attribute("ID", "user-name")
            .with_attribute("placeholder", "Username")
            .with_name("user");
        assert_eq!(c.identifier, "user-name");
        assert_eq!(c.secondary_id, "user");
        assert_eq!(c.attribute("PLACEHOLDER"), Some("Username"));
        assert_eq!(c.attributes.len(), 3);
    }

    #[test]
    fn chunk_has_no_attributes() {
        let c = Candidate::chunk("query", "SELECT 1", "SELECT 1 FROM dual");
        assert!(c.attributes.is_empty());
        assert_eq!(c.signature().identifier, "select 1");
    }
}
