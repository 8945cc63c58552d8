//! LexForge Retrieval
//!
//! The retrieval half of the pipeline:
//! - Legal term detection (data-driven lexicon)
//! - Query enrichment with research framing
//! - Hybrid ranking (vector similarity + metadata signals)
//! - Context budgeting under a hard character limit
//! - Vector store abstraction with metadata filters

pub mod budget;
pub mod enrich;
pub mod ranker;
pub mod search;
pub mod terms;

pub use budget::build_context;
pub use enrich::QueryEnricher;
pub use ranker::{HybridRanker, RankingWeights};
pub use search::{
    ChromaSearch, CollectionStats, FilterOptions, MemorySearch, SearchBackend, SearchFilters,
};
pub use terms::LegalTermLexicon;
