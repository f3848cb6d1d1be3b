use tracing::{debug, info};

use intentrank_core::traits::LocatorResolver;
use intentrank_core::types::{BackoffPlan, Candidate, RankRequest, ScoredCandidate, Signature};
use intentrank_knowledge::chunk_query;
use intentrank_text::{extract_tokens, normalize};

use crate::backoff::backoff;
use crate::boost::Booster;
use crate::locator::match_locator;
use crate::project::{project, Flavor};

/// Scores a corpus against one request at a time.
///
/// Holds no state between calls; the vectorizer is refitted over
/// `corpus + query` on every call.
pub struct RankingEngine<'r> {
    flavor: Flavor,
    resolver: Option<&'r dyn LocatorResolver>,
}

impl<'r> RankingEngine<'r> {
    pub fn new(flavor: Flavor) -> Self {
        Self { flavor, resolver: None }
    }

    /// Resolve locator hints against `resolver`. Only markup ranking
    /// consults it.
    pub fn with_resolver(mut self, resolver: &'r dyn LocatorResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Every candidate with its final score, in corpus order.
    pub fn score<'a>(&self, corpus: &'a [Candidate], request: &RankRequest) -> Vec<ScoredCandidate<'a>> {
        if corpus.is_empty() {
            return Vec::new();
        }
        let (texts, signatures): (Vec<String>, Vec<Signature>) = corpus
            .iter()
            .map(|c| {
                let p = project(c, self.flavor);
                (p.text, p.signature)
            })
            .unzip();

        let scores: Vec<f64> = match self.flavor {
            Flavor::Markup => {
                let locator = match_locator(self.resolver, &request.locator_hint);
                let intent_norm = normalize(&request.intent);
                let locator_tokens = extract_tokens(&request.locator_hint);
                let query = markup_query(&intent_norm, &locator_tokens);
                debug!(query = %query, "weighted query");
                let sims = self.flavor.vectorizer().similarities(&texts, &query);
                let booster = Booster::new(&locator.signatures, &intent_norm, &locator_tokens);
                sims.iter()
                    .zip(corpus.iter().zip(texts.iter().zip(&signatures)))
                    .map(|(sim, (candidate, (text, signature)))| {
                        sim + booster.signature_boost(signature) + booster.content_boost(text, candidate)
                    })
                    .collect()
            }
            Flavor::Knowledge => {
                let query = chunk_query(&request.intent);
                debug!(query = %query, "chunk query");
                self.flavor.vectorizer().similarities(&texts, &query)
            }
        };

        corpus
            .iter()
            .zip(scores)
            .enumerate()
            .map(|(index, (candidate, score))| ScoredCandidate { index, candidate, score })
            .collect()
    }

    /// Best `top_k` candidates scoring at least `min_score`, best first.
    pub fn rank<'a>(&self, corpus: &'a [Candidate], request: &RankRequest) -> Vec<ScoredCandidate<'a>> {
        if request.top_k == 0 {
            return Vec::new();
        }
        let ranked = select(self.score(corpus, request), request.top_k, request.min_score);
        log_ranked(&ranked, request.min_score);
        ranked
    }

    /// [`rank`](Self::rank) under a relaxing `min_score` schedule; the
    /// request's own `min_score` is ignored. Scores are computed once.
    pub fn rank_with_backoff<'a>(
        &self,
        corpus: &'a [Candidate],
        request: &RankRequest,
        plan: &BackoffPlan,
    ) -> Vec<ScoredCandidate<'a>> {
        if request.top_k == 0 {
            return Vec::new();
        }
        let scored = self.score(corpus, request);
        backoff(plan, |threshold| {
            let ranked = select(scored.clone(), request.top_k, threshold);
            log_ranked(&ranked, threshold);
            ranked
        })
    }
}

/// The intent outweighs locator tokens by repetition: three copies of the
/// normalized intent, then the token bag once.
pub fn markup_query(intent_norm: &str, locator_tokens: &str) -> String {
    format!("{0} {0} {0} {1}", intent_norm, locator_tokens).trim().to_string()
}

/// Stable sort by descending score, keep `top_k`, then drop scores below
/// `min_score`.
pub fn select(mut scored: Vec<ScoredCandidate<'_>>, top_k: usize, min_score: f64) -> Vec<ScoredCandidate<'_>> {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_k);
    scored.retain(|s| s.score >= min_score);
    scored
}

fn log_ranked(ranked: &[ScoredCandidate<'_>], min_score: f64) {
    for hit in ranked {
        debug!(index = hit.index, kind = %hit.candidate.kind, score = hit.score, "ranked candidate");
    }
    info!(results = ranked.len(), min_score, "ranking complete");
}
