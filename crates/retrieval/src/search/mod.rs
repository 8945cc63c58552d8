//! Vector store abstraction
//!
//! The document store is an external service behind a narrow trait so the
//! pipeline can run against the real HTTP store in production and an
//! in-memory backend in tests.

mod chroma;
mod memory;

pub use chroma::ChromaSearch;
pub use memory::MemorySearch;

use async_trait::async_trait;
use lexforge_common::errors::Result;
use lexforge_common::models::RetrievedChunk;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata filters for a search. `None` and the UI sentinel `"All"` mean
/// "no constraint" and are omitted from the backend where-clause.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    pub jurisdiction: Option<String>,
    pub court_type: Option<String>,
    pub document_type: Option<String>,
}

impl SearchFilters {
    pub fn none() -> Self {
        Self::default()
    }

    /// Exact-match where-clause with unset/"All" keys omitted
    pub fn to_where_clause(&self) -> Map<String, Value> {
        let mut clause = Map::new();

        for (key, value) in [
            ("jurisdiction", &self.jurisdiction),
            ("court_type", &self.court_type),
            ("document_type", &self.document_type),
        ] {
            if let Some(v) = value {
                if !v.is_empty() && v != "All" {
                    clause.insert(key.to_string(), Value::String(v.clone()));
                }
            }
        }

        clause
    }

    pub fn is_unconstrained(&self) -> bool {
        self.to_where_clause().is_empty()
    }
}

/// Distinct metadata values available for filtering, sorted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    pub jurisdictions: Vec<String>,
    pub court_types: Vec<String>,
    pub document_types: Vec<String>,
    pub years: Vec<i64>,
}

/// Read-only collection statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStats {
    pub total_chunks: usize,
    pub collection_name: String,
}

/// Trait for the external document search service
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Similarity search with optional metadata filters
    async fn search(
        &self,
        query: &str,
        n_results: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<RetrievedChunk>>;

    /// Distinct filter values present in the collection
    async fn available_filters(&self) -> Result<FilterOptions>;

    /// Collection statistics
    async fn stats(&self) -> Result<CollectionStats>;

    /// Backend name for logs and metrics
    fn name(&self) -> &str;
}

/// Aggregate filter options from a stream of chunk metadata.
///
/// Malformed years are skipped, matching the ranker's tolerance.
pub(crate) fn collect_filter_options<'a, I>(metadatas: I) -> FilterOptions
where
    I: Iterator<Item = &'a lexforge_common::models::ChunkMetadata>,
{
    use std::collections::BTreeSet;

    let mut jurisdictions = BTreeSet::new();
    let mut court_types = BTreeSet::new();
    let mut document_types = BTreeSet::new();
    let mut years = BTreeSet::new();

    for metadata in metadatas {
        if let Some(v) = metadata.jurisdiction() {
            jurisdictions.insert(v.to_string());
        }
        if let Some(v) = metadata.court_type() {
            court_types.insert(v.to_string());
        }
        if let Some(v) = metadata.document_type() {
            document_types.insert(v.to_string());
        }
        if let Some(v) = metadata.year() {
            years.insert(v);
        }
    }

    FilterOptions {
        jurisdictions: jurisdictions.into_iter().collect(),
        court_types: court_types.into_iter().collect(),
        document_types: document_types.into_iter().collect(),
        years: years.into_iter().collect(),
    }
}
