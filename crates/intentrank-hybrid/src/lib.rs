//! intentrank-hybrid
//!
//! The ranking engine proper. Candidates are projected to text, scored by
//! lexical similarity plus rule-based boosts, cut to top-k and filtered by a
//! minimum score, optionally under a relaxing threshold schedule. The two
//! facades wire it to markup pages (`IntentLocator`) and knowledge documents
//! (`IntentQueries`).
pub mod action;
pub mod backoff;
pub mod boost;
pub mod locate;
pub mod locator;
pub mod project;
pub mod queries;
pub mod rank;

pub use action::ActionHint;
pub use locate::{IntentLocator, RankedElement};
pub use project::Flavor;
pub use queries::{IntentQueries, KnowledgeMatches, RankedChunk};
pub use rank::RankingEngine;

/// Round a score to six decimals for reporting.
pub fn round6(score: f64) -> f64 {
    (score * 1e6).round() / 1e6
}
