//! In-memory search backend
//!
//! Deterministic stand-in for the HTTP store: filters are exact metadata
//! matches and results come back ordered by stored distance. Used by the
//! pipeline tests and for local development without a running store.

use super::{
    collect_filter_options, CollectionStats, FilterOptions, SearchBackend, SearchFilters,
};
use async_trait::async_trait;
use lexforge_common::errors::Result;
use lexforge_common::models::RetrievedChunk;
use serde_json::Value;

/// In-memory collection of chunks
pub struct MemorySearch {
    chunks: Vec<RetrievedChunk>,
    collection_name: String,
}

impl MemorySearch {
    pub fn new(chunks: Vec<RetrievedChunk>) -> Self {
        Self {
            chunks,
            collection_name: "memory".to_string(),
        }
    }

    pub fn with_collection_name(mut self, name: &str) -> Self {
        self.collection_name = name.to_string();
        self
    }

    fn matches(chunk: &RetrievedChunk, clause: &serde_json::Map<String, Value>) -> bool {
        clause.iter().all(|(key, expected)| {
            chunk
                .metadata
                .fields()
                .get(key)
                .map(|actual| actual == expected)
                .unwrap_or(false)
        })
    }
}

#[async_trait]
impl SearchBackend for MemorySearch {
    async fn search(
        &self,
        _query: &str,
        n_results: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<RetrievedChunk>> {
        let clause = filters.to_where_clause();

        let mut matched: Vec<RetrievedChunk> = self
            .chunks
            .iter()
            .filter(|chunk| Self::matches(chunk, &clause))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matched.truncate(n_results);

        Ok(matched)
    }

    async fn available_filters(&self) -> Result<FilterOptions> {
        Ok(collect_filter_options(
            self.chunks.iter().map(|chunk| &chunk.metadata),
        ))
    }

    async fn stats(&self) -> Result<CollectionStats> {
        Ok(CollectionStats {
            total_chunks: self.chunks.len(),
            collection_name: self.collection_name.clone(),
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexforge_common::models::ChunkMetadata;

    fn chunk(document_id: &str, jurisdiction: &str, distance: f32) -> RetrievedChunk {
        RetrievedChunk {
            content: format!("content of {}", document_id),
            metadata: ChunkMetadata::new()
                .with("document_id", document_id)
                .with("chunk_index", 0)
                .with("jurisdiction", jurisdiction)
                .with("year", 2015),
            distance,
        }
    }

    #[tokio::test]
    async fn test_search_orders_by_distance() {
        let backend = MemorySearch::new(vec![
            chunk("far", "New York", 0.8),
            chunk("near", "New York", 0.1),
        ]);

        let hits = backend
            .search("anything", 10, &SearchFilters::none())
            .await
            .unwrap();

        assert_eq!(hits[0].metadata.document_id(), Some("near"));
        assert_eq!(hits[1].metadata.document_id(), Some("far"));
    }

    #[tokio::test]
    async fn test_search_applies_filters() {
        let backend = MemorySearch::new(vec![
            chunk("ny_case", "New York", 0.2),
            chunk("tx_case", "Texas", 0.1),
        ]);

        let filters = SearchFilters {
            jurisdiction: Some("New York".to_string()),
            ..Default::default()
        };

        let hits = backend.search("anything", 10, &filters).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metadata.document_id(), Some("ny_case"));
    }

    #[tokio::test]
    async fn test_available_filters_sorted_unique() {
        let backend = MemorySearch::new(vec![
            chunk("a", "Texas", 0.1),
            chunk("b", "New York", 0.2),
            chunk("c", "Texas", 0.3),
        ]);

        let options = backend.available_filters().await.unwrap();
        assert_eq!(options.jurisdictions, vec!["New York", "Texas"]);
        assert_eq!(options.years, vec![2015]);
    }

    #[tokio::test]
    async fn test_stats() {
        let backend = MemorySearch::new(vec![chunk("a", "Texas", 0.1)]);
        let stats = backend.stats().await.unwrap();
        assert_eq!(stats.total_chunks, 1);
        assert_eq!(stats.collection_name, "memory");
    }
}
