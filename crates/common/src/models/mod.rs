//! Core data model shared across the LexForge pipeline
//!
//! Chunks come back from the vector store, gain a relevance score in the
//! ranker, and are referenced by citations parsed out of generated answers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form metadata attached to a chunk by the ingestion pipeline.
///
/// Values are strings, numbers, or booleans depending on what the store
/// returns; the typed accessors below tolerate both encodings for numeric
/// keys. `document_id` + `chunk_index` form the chunk's natural key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ChunkMetadata {
    fields: Map<String, Value>,
}

impl ChunkMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a metadata field, replacing any previous value
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Builder-style insert for test and ingestion code
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Raw access to the underlying map
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// String value for a key, if present and a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Integer value for a key, tolerating string-encoded numbers.
    /// Malformed values yield `None`, never an error.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.fields.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    pub fn document_id(&self) -> Option<&str> {
        self.get_str("document_id")
    }

    pub fn chunk_index(&self) -> Option<i64> {
        self.get_i64("chunk_index")
    }

    pub fn jurisdiction(&self) -> Option<&str> {
        self.get_str("jurisdiction")
    }

    pub fn court_type(&self) -> Option<&str> {
        self.get_str("court_type")
    }

    pub fn document_type(&self) -> Option<&str> {
        self.get_str("document_type")
    }

    pub fn year(&self) -> Option<i64> {
        self.get_i64("year")
    }

    pub fn precedential_status(&self) -> Option<&str> {
        self.get_str("precedential_status")
    }

    pub fn filename(&self) -> Option<&str> {
        self.get_str("filename")
    }
}

impl From<Map<String, Value>> for ChunkMetadata {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Chunk returned by the vector store for a query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Chunk text
    pub content: String,

    /// Metadata preserved from ingestion
    pub metadata: ChunkMetadata,

    /// Vector-space distance from the query (lower = more similar)
    pub distance: f32,
}

/// Chunk with its composite relevance score from the hybrid ranker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    #[serde(flatten)]
    pub chunk: RetrievedChunk,

    /// Composite relevance score (0.0 - 1.0)
    pub relevance_score: f32,
}

impl ScoredChunk {
    pub fn content(&self) -> &str {
        &self.chunk.content
    }

    pub fn metadata(&self) -> &ChunkMetadata {
        &self.chunk.metadata
    }
}

/// Citation marker parsed out of a generated answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Referenced document id
    pub document_id: String,

    /// Referenced chunk index within the document
    pub chunk_index: i64,

    /// The literal bracketed marker as it appeared in the answer
    pub raw_text: String,

    /// Byte offset of the marker in the answer text
    pub position: usize,

    /// Whether the marker resolved to a chunk actually supplied as context
    pub validated: bool,

    /// Content of the matching chunk (validated citations only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_content: Option<String>,

    /// Metadata of the matching chunk (validated citations only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_metadata: Option<ChunkMetadata>,
}

/// Aggregate citation counts for one answer
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct CitationStats {
    pub total: usize,
    pub valid: usize,

    /// valid / total, 0.0 when there are no citations
    pub ratio: f32,
}

impl CitationStats {
    pub fn new(total: usize, valid: usize) -> Self {
        let ratio = if total > 0 {
            valid as f32 / total as f32
        } else {
            0.0
        };
        Self {
            total,
            valid,
            ratio,
        }
    }
}

/// Final outcome of one analyzed question.
///
/// Produced once per question and never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Generated answer text
    pub analysis: String,

    /// Citations in order of appearance in the answer
    pub citations: Vec<Citation>,

    /// Aggregate citation validity
    pub citation_stats: CitationStats,

    /// Quality issue tags, in rule evaluation order
    pub quality_issues: Vec<String>,

    /// Whether a human should look at this answer
    pub requires_review: bool,

    pub timestamp: DateTime<Utc>,
}
