//! Chroma vector store client
//!
//! Talks to a Chroma-compatible HTTP API: the query is embedded via the
//! configured [`Embedder`], then sent to the collection's query endpoint
//! with an exact-match where-clause. Collection id resolution is cached
//! for the lifetime of the client.

use super::{
    collect_filter_options, CollectionStats, FilterOptions, SearchBackend, SearchFilters,
};
use async_trait::async_trait;
use lexforge_common::config::StoreConfig;
use lexforge_common::embeddings::Embedder;
use lexforge_common::errors::{AppError, Result};
use lexforge_common::metrics;
use lexforge_common::models::{ChunkMetadata, RetrievedChunk};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;

/// Chroma-compatible search backend
pub struct ChromaSearch {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    collection_id: OnceCell<String>,
    embedder: Arc<dyn Embedder>,
}

#[derive(Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Vec<Vec<String>>,
    #[serde(default)]
    metadatas: Vec<Vec<Map<String, Value>>>,
    #[serde(default)]
    distances: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct GetResponse {
    #[serde(default)]
    metadatas: Vec<Map<String, Value>>,
}

impl ChromaSearch {
    /// Create a client from store configuration
    pub fn new(config: &StoreConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            collection_id: OnceCell::new(),
            embedder,
        })
    }

    /// Resolve and cache the collection id
    async fn collection_id(&self) -> Result<&str> {
        let id = self
            .collection_id
            .get_or_try_init(|| async {
                let url = format!("{}/api/v1/collections/{}", self.base_url, self.collection);

                let response = self.client.get(&url).send().await.map_err(|e| {
                    AppError::SearchError {
                        message: format!("Collection lookup failed: {}", e),
                    }
                })?;

                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    return Err(AppError::CollectionNotFound {
                        name: self.collection.clone(),
                    });
                }

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::SearchError {
                        message: format!("Collection lookup error {}: {}", status, body),
                    });
                }

                let info: CollectionInfo =
                    response.json().await.map_err(|e| AppError::SearchError {
                        message: format!("Failed to parse collection info: {}", e),
                    })?;

                Ok::<String, AppError>(info.id)
            })
            .await?;

        Ok(id)
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::SearchError {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::SearchError {
                message: format!("Store error {}: {}", status, body),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl SearchBackend for ChromaSearch {
    async fn search(
        &self,
        query: &str,
        n_results: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<RetrievedChunk>> {
        let start = Instant::now();

        let embedding = self.embedder.embed(query).await?;
        let collection_id = self.collection_id().await?;

        let mut body = json!({
            "query_embeddings": [embedding],
            "n_results": n_results,
            "include": ["documents", "metadatas", "distances"],
        });

        let where_clause = filters.to_where_clause();
        if !where_clause.is_empty() {
            body["where"] = Value::Object(where_clause);
        }

        let url = format!(
            "{}/api/v1/collections/{}/query",
            self.base_url, collection_id
        );
        let response = self.post_json(&url, &body).await?;

        let parsed: QueryResponse = response.json().await.map_err(|e| AppError::SearchError {
            message: format!("Failed to parse query response: {}", e),
        })?;

        // Chroma nests results per query embedding; we always send one
        let documents = parsed.documents.into_iter().next().unwrap_or_default();
        let metadatas = parsed.metadatas.into_iter().next().unwrap_or_default();
        let distances = parsed.distances.into_iter().next().unwrap_or_default();

        let chunks: Vec<RetrievedChunk> = documents
            .into_iter()
            .zip(metadatas)
            .zip(distances)
            .map(|((content, metadata), distance)| RetrievedChunk {
                content,
                metadata: ChunkMetadata::from(metadata),
                distance,
            })
            .collect();

        metrics::record_search(start.elapsed().as_secs_f64(), self.name(), chunks.len());

        Ok(chunks)
    }

    async fn available_filters(&self) -> Result<FilterOptions> {
        let collection_id = self.collection_id().await?;

        let url = format!("{}/api/v1/collections/{}/get", self.base_url, collection_id);
        let body = json!({ "include": ["metadatas"] });
        let response = self.post_json(&url, &body).await?;

        let parsed: GetResponse = response.json().await.map_err(|e| AppError::SearchError {
            message: format!("Failed to parse get response: {}", e),
        })?;

        let metadatas: Vec<ChunkMetadata> = parsed
            .metadatas
            .into_iter()
            .map(ChunkMetadata::from)
            .collect();

        Ok(collect_filter_options(metadatas.iter()))
    }

    async fn stats(&self) -> Result<CollectionStats> {
        let collection_id = self.collection_id().await?;

        let url = format!(
            "{}/api/v1/collections/{}/count",
            self.base_url, collection_id
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::SearchError {
                message: format!("Count request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::SearchError {
                message: format!("Store error {}: {}", status, body),
            });
        }

        let total_chunks: usize = response.json().await.map_err(|e| AppError::SearchError {
            message: format!("Failed to parse count: {}", e),
        })?;

        Ok(CollectionStats {
            total_chunks,
            collection_name: self.collection.clone(),
        })
    }

    fn name(&self) -> &str {
        "chroma"
    }
}
