use std::collections::HashSet;

use intentrank_core::types::{Candidate, Signature};

pub const LOCATOR_MATCH_BOOST: f64 = 0.1;
pub const INTENT_TOKEN_BOOST: f64 = 0.05;
pub const LOCATOR_TOKEN_BOOST: f64 = 0.02;
pub const KEYWORD_ATTRIBUTE_BOOST: f64 = 0.1;

/// When `keyword` occurs in the normalized intent, each `(attribute, needle)`
/// whose lowercased attribute value contains `needle` earns
/// [`KEYWORD_ATTRIBUTE_BOOST`].
struct KeywordRule {
    keyword: &'static str,
    checks: &'static [(&'static str, &'static str)],
}

static KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        keyword: "username",
        checks: &[("id", "user-name"), ("name", "username"), ("placeholder", "username")],
    },
    KeywordRule {
        keyword: "password",
        checks: &[("id", "password"), ("name", "password"), ("placeholder", "password")],
    },
    KeywordRule {
        keyword: "login",
        checks: &[("id", "login"), ("name", "login"), ("value", "login")],
    },
];

/// Rule-based score additions for one ranking call.
pub struct Booster<'a> {
    matched: &'a HashSet<Signature>,
    intent_norm: &'a str,
    locator_tokens: &'a str,
}

impl<'a> Booster<'a> {
    pub fn new(matched: &'a HashSet<Signature>, intent_norm: &'a str, locator_tokens: &'a str) -> Self {
        Self { matched, intent_norm, locator_tokens }
    }

    pub fn signature_boost(&self, signature: &Signature) -> f64 {
        if self.matched.contains(signature) {
            LOCATOR_MATCH_BOOST
        } else {
            0.0
        }
    }

    /// Substring hits of intent and locator tokens in the projected `text`,
    /// plus the credential keyword bonuses. Repeated tokens count repeatedly.
    pub fn content_boost(&self, text: &str, candidate: &Candidate) -> f64 {
        let mut boost = 0.0;
        for word in self.intent_norm.split_whitespace() {
            if text.contains(word) {
                boost += INTENT_TOKEN_BOOST;
            }
        }
        for token in self.locator_tokens.split_whitespace() {
            if text.contains(token) {
                boost += LOCATOR_TOKEN_BOOST;
            }
        }
        for rule in KEYWORD_RULES.iter().filter(|r| self.intent_norm.contains(r.keyword)) {
            for (attribute, needle) in rule.checks {
                let hit = candidate
                    .attribute(attribute)
                    .is_some_and(|value| value.to_lowercase().contains(needle));
                if hit {
                    boost += KEYWORD_ATTRIBUTE_BOOST;
                }
            }
        }
        boost
    }

    /// Total boost, always `>= 0`.
    pub fn boost(&self, text: &str, signature: &Signature, candidate: &Candidate) -> f64 {
        self.signature_boost(signature) + self.content_boost(text, candidate)
    }
}
