//! Hybrid ranking
//!
//! Raw similarity hits are re-scored with a weighted blend of the vector
//! distance and four metadata-driven signals, then ordered descending.
//! Ranking is deterministic: ties keep input order (stable sort) and the
//! recency reference year is fixed at construction.

use crate::terms::LegalTermLexicon;
use chrono::Datelike;
use lexforge_common::models::{RetrievedChunk, ScoredChunk};

/// Weights for the five component signals. They sum to 1.0 and each
/// component is clamped to [0,1], so composite scores stay in [0,1].
#[derive(Debug, Clone, Copy)]
pub struct RankingWeights {
    pub semantic: f32,
    pub keyword: f32,
    pub legal_term: f32,
    pub recency: f32,
    pub precedential: f32,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            semantic: 0.4,
            keyword: 0.2,
            legal_term: 0.2,
            recency: 0.1,
            precedential: 0.1,
        }
    }
}

/// Hybrid ranker combining semantic similarity with legal metadata signals
pub struct HybridRanker {
    weights: RankingWeights,
    lexicon: LegalTermLexicon,
    reference_year: i64,
}

impl HybridRanker {
    pub fn new() -> Self {
        Self::with_weights(RankingWeights::default())
    }

    pub fn with_weights(weights: RankingWeights) -> Self {
        Self {
            weights,
            lexicon: LegalTermLexicon::new(),
            reference_year: chrono::Utc::now().year() as i64,
        }
    }

    /// Pin the recency reference year (tests)
    pub fn with_reference_year(mut self, year: i64) -> Self {
        self.reference_year = year;
        self
    }

    pub fn with_lexicon(mut self, lexicon: LegalTermLexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    /// Score and order hits by composite relevance, descending.
    pub fn rank(&self, hits: Vec<RetrievedChunk>, query: &str) -> Vec<ScoredChunk> {
        let query_terms = self.lexicon.detect(query);

        let mut scored: Vec<ScoredChunk> = hits
            .into_iter()
            .map(|chunk| {
                let relevance_score = self.score(&chunk, query, &query_terms);
                ScoredChunk {
                    chunk,
                    relevance_score,
                }
            })
            .collect();

        // Stable sort: equal scores keep input order
        scored.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        scored
    }

    /// Composite relevance for one chunk
    fn score(&self, chunk: &RetrievedChunk, query: &str, query_terms: &[String]) -> f32 {
        let content = chunk.content.to_lowercase();

        let semantic = semantic_score(chunk.distance);
        let keyword = keyword_score(&content, query);
        let legal = legal_term_score(&content, query_terms);
        let recency = self.recency_score(chunk);
        let precedential = precedential_score(chunk);

        let total = self.weights.semantic * semantic
            + self.weights.keyword * keyword
            + self.weights.legal_term * legal
            + self.weights.recency * recency
            + self.weights.precedential * precedential;

        total.clamp(0.0, 1.0)
    }

    /// Newer documents score higher; absent or malformed years are neutral.
    fn recency_score(&self, chunk: &RetrievedChunk) -> f32 {
        match chunk.metadata.year() {
            Some(year) => {
                let span = (self.reference_year - 1900) as f32;
                if span <= 0.0 {
                    return 0.5;
                }
                (((year - 1900) as f32) / span).clamp(0.0, 1.0)
            }
            None => 0.5,
        }
    }
}

impl Default for HybridRanker {
    fn default() -> Self {
        Self::new()
    }
}

/// Inverted vector distance, clamped to [0,1]
fn semantic_score(distance: f32) -> f32 {
    (1.0 - distance).clamp(0.0, 1.0)
}

/// Fraction of query tokens found as substrings of the chunk content
fn keyword_score(content_lower: &str, query: &str) -> f32 {
    let query_lower = query.to_lowercase();
    let tokens: Vec<&str> = query_lower.split_whitespace().collect();

    if tokens.is_empty() {
        return 0.0;
    }

    let matches = tokens
        .iter()
        .filter(|token| content_lower.contains(**token))
        .count();

    (matches as f32 / tokens.len() as f32).min(1.0)
}

/// Fraction of the query's detected legal terms found in the content
fn legal_term_score(content_lower: &str, query_terms: &[String]) -> f32 {
    let matches = query_terms
        .iter()
        .filter(|term| content_lower.contains(&term.to_lowercase()))
        .count();

    (matches as f32 / query_terms.len().max(1) as f32).min(1.0)
}

/// Authority weight derived from `precedential_status` metadata
fn precedential_score(chunk: &RetrievedChunk) -> f32 {
    match chunk.metadata.precedential_status() {
        Some(status) => {
            let status = status.to_lowercase();
            if status.contains("binding") || status.contains("precedential") {
                1.0
            } else if status.contains("persuasive") {
                0.8
            } else if status.contains("non-precedential") {
                0.3
            } else {
                0.5
            }
        }
        None => 0.5,
    }
}
