use serde::{Deserialize, Serialize};
use tracing::info;

use intentrank_core::error::Result;
use intentrank_core::types::{BackoffPlan, RankRequest, ScoredCandidate};
use intentrank_markup::MarkupDocument;

use crate::project::Flavor;
use crate::rank::RankingEngine;
use crate::round6;

/// One ranked markup element as reported to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedElement {
    pub score: f64,
    pub tag: String,
    pub id: Option<String>,
    pub classes: Option<Vec<String>>,
    pub text: String,
    #[serde(rename = "outerHTML")]
    pub outer_html: String,
}

/// Finds the elements of a page that best match a natural-language intent.
///
/// Every method takes `html_or_path`: inline markup or a path to a markup
/// file (see [`intentrank_markup::read_markup`]). The only error is failing
/// to read that file.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentLocator;

impl IntentLocator {
    pub fn new() -> Self {
        Self
    }

    /// Outer markup of the best matches, best first.
    pub fn find_outer_html(&self, html_or_path: &str, request: &RankRequest) -> Result<Vec<String>> {
        self.run(html_or_path, |engine, doc| {
            let hits = engine.rank(doc.candidates(), request);
            outer_html_of(doc, &hits)
        })
    }

    pub fn rank_elements(&self, html_or_path: &str, request: &RankRequest) -> Result<Vec<RankedElement>> {
        self.run(html_or_path, |engine, doc| {
            let hits = engine.rank(doc.candidates(), request);
            ranked_elements_of(doc, &hits)
        })
    }

    /// [`find_outer_html`](Self::find_outer_html) retried at falling
    /// thresholds until something matches; `request.min_score` is unused.
    pub fn find_outer_html_with_backoff(
        &self,
        html_or_path: &str,
        request: &RankRequest,
        plan: &BackoffPlan,
    ) -> Result<Vec<String>> {
        self.run(html_or_path, |engine, doc| {
            let hits = engine.rank_with_backoff(doc.candidates(), request, plan);
            outer_html_of(doc, &hits)
        })
    }

    pub fn rank_elements_with_backoff(
        &self,
        html_or_path: &str,
        request: &RankRequest,
        plan: &BackoffPlan,
    ) -> Result<Vec<RankedElement>> {
        self.run(html_or_path, |engine, doc| {
            let hits = engine.rank_with_backoff(doc.candidates(), request, plan);
            ranked_elements_of(doc, &hits)
        })
    }

    fn run<T, F>(&self, html_or_path: &str, f: F) -> Result<Vec<T>>
    where
        F: FnOnce(&RankingEngine<'_>, &MarkupDocument) -> Vec<T>,
    {
        let doc = MarkupDocument::load(html_or_path)?;
        let engine = RankingEngine::new(Flavor::Markup).with_resolver(&doc);
        let out = f(&engine, &doc);
        info!(elements = doc.len(), results = out.len(), "located elements");
        Ok(out)
    }
}

fn outer_html_of(doc: &MarkupDocument, hits: &[ScoredCandidate<'_>]) -> Vec<String> {
    hits.iter()
        .filter_map(|hit| doc.outer_html(hit.index))
        .map(str::to_string)
        .collect()
}

fn ranked_elements_of(doc: &MarkupDocument, hits: &[ScoredCandidate<'_>]) -> Vec<RankedElement> {
    hits.iter()
        .map(|hit| {
            let c = hit.candidate;
            RankedElement {
                score: round6(hit.score),
                tag: c.kind.clone(),
                id: c.attribute("id").map(str::to_string),
                classes: c.attribute("class").map(|_| c.classes.clone()),
                text: c.text.clone(),
                outer_html: doc.outer_html(hit.index).unwrap_or_default().to_string(),
            }
        })
        .collect()
}
