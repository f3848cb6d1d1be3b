//! intentrank-knowledge
//!
//! Chunking of semi-structured knowledge documents (table schemas, reference
//! queries, relationship notes) into rankable candidates, plus the fixed
//! synonym table used to widen chunk queries.
pub mod chunks;
pub mod sections;
pub mod synonyms;

pub use chunks::{extract_queries, extract_relationships, extract_schemas, Chunk, ChunkKind};
pub use synonyms::chunk_query;
