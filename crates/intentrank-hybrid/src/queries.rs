use serde::{Deserialize, Serialize};

use intentrank_core::types::{Candidate, RankRequest};
use intentrank_knowledge::{extract_queries, extract_relationships, extract_schemas, Chunk, ChunkKind};

use crate::project::Flavor;
use crate::rank::RankingEngine;
use crate::round6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedChunk {
    #[serde(rename = "type")]
    pub kind: ChunkKind,
    pub label: String,
    pub text: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeMatches {
    pub queries: Vec<RankedChunk>,
    pub schemas: Vec<RankedChunk>,
    pub relationships: Vec<RankedChunk>,
}

/// Ranks the chunks of a knowledge document (table schemas, reference
/// queries, relationship notes) against an intent.
///
/// Chunk ranking ignores `request.locator_hint` and applies no boosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentQueries;

impl IntentQueries {
    pub fn new() -> Self {
        Self
    }

    pub fn rank_schemas(&self, content: &str, request: &RankRequest) -> Vec<RankedChunk> {
        self.rank_chunks(&extract_schemas(content), request)
    }

    pub fn rank_queries(&self, content: &str, request: &RankRequest) -> Vec<RankedChunk> {
        self.rank_chunks(&extract_queries(content), request)
    }

    pub fn rank_relationships(&self, content: &str, request: &RankRequest) -> Vec<RankedChunk> {
        self.rank_chunks(&extract_relationships(content), request)
    }

    /// All three chunk types ranked independently; `request.top_k` applies
    /// to each.
    pub fn rank_all(&self, content: &str, request: &RankRequest) -> KnowledgeMatches {
        KnowledgeMatches {
            queries: self.rank_queries(content, request),
            schemas: self.rank_schemas(content, request),
            relationships: self.rank_relationships(content, request),
        }
    }

    pub fn rank_chunks(&self, chunks: &[Chunk], request: &RankRequest) -> Vec<RankedChunk> {
        let corpus: Vec<Candidate> = chunks.iter().map(Chunk::to_candidate).collect();
        RankingEngine::new(Flavor::Knowledge)
            .rank(&corpus, request)
            .into_iter()
            .map(|hit| {
                let chunk = &chunks[hit.index];
                RankedChunk {
                    kind: chunk.kind,
                    label: chunk.label.clone(),
                    text: chunk.text.clone(),
                    score: round6(hit.score),
                }
            })
            .collect()
    }
}
