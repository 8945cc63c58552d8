//! LexForge Common Library
//!
//! Shared code for the LexForge services including:
//! - Core data model (chunks, citations, analysis results)
//! - Embedding client abstraction
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod embeddings;
pub mod errors;
pub mod metrics;
pub mod models;

// Re-export commonly used types
pub use config::AppConfig;
pub use embeddings::Embedder;
pub use errors::{AppError, Result};
pub use models::{AnalysisResult, Citation, CitationStats, RetrievedChunk, ScoredChunk};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Default number of results fetched per question
pub const DEFAULT_RESULT_LIMIT: usize = 10;

/// Default character budget for assembled context
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 4000;
