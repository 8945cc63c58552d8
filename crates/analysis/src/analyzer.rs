//! The end-to-end analysis pipeline
//!
//! One question flows enrich → search → rank → budget → generate →
//! validate → assess and always comes back as a well-formed
//! [`AnalysisResult`]: search failures degrade to an empty context and
//! generation failures are converted into a reviewed error result.

use crate::citations::{citation_stats, extract_citations, validate_citations};
use crate::generate::{Generator, SYSTEM_PROMPT};
use crate::quality::{assess, TAG_GENERATION_ERROR};
use chrono::Utc;
use lexforge_common::metrics;
use lexforge_common::models::{AnalysisResult, CitationStats, ScoredChunk};
use lexforge_retrieval::budget::build_context;
use lexforge_retrieval::enrich::QueryEnricher;
use lexforge_retrieval::ranker::HybridRanker;
use lexforge_retrieval::search::{SearchBackend, SearchFilters};
use std::sync::Arc;
use std::time::Instant;

/// Per-question knobs for the pipeline
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Results fetched from the store
    pub n_results: usize,

    /// Character budget for the assembled context
    pub max_context_chars: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            n_results: lexforge_common::DEFAULT_RESULT_LIMIT,
            max_context_chars: lexforge_common::DEFAULT_MAX_CONTEXT_CHARS,
        }
    }
}

/// Session-scoped analyzer owning the pipeline collaborators.
///
/// Created once per session and shared behind `Arc`; all state is
/// immutable, so concurrent questions never interact.
pub struct LegalAnalyzer {
    search: Arc<dyn SearchBackend>,
    generator: Arc<dyn Generator>,
    enricher: QueryEnricher,
    ranker: HybridRanker,
}

impl LegalAnalyzer {
    pub fn new(search: Arc<dyn SearchBackend>, generator: Arc<dyn Generator>) -> Self {
        Self {
            search,
            generator,
            enricher: QueryEnricher::new(),
            ranker: HybridRanker::new(),
        }
    }

    /// Replace the ranker (tests pin the recency reference year)
    pub fn with_ranker(mut self, ranker: HybridRanker) -> Self {
        self.ranker = ranker;
        self
    }

    /// Retrieve, rank, and budget context for a question.
    ///
    /// Search failures are recovered to an empty-context outcome; callers
    /// cannot distinguish "store down" from "nothing relevant" here.
    pub async fn context_for_question(
        &self,
        question: &str,
        filters: &SearchFilters,
        n_results: usize,
        max_context_chars: usize,
    ) -> (String, Vec<ScoredChunk>) {
        let enriched = self.enricher.enrich(question);

        let hits = match self.search.search(&enriched, n_results, filters).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    backend = self.search.name(),
                    "Search failed, continuing with empty context"
                );
                Vec::new()
            }
        };

        // Ranking scores against the original question, not the enriched one
        let ranked = self.ranker.rank(hits, question);

        build_context(&ranked, max_context_chars)
    }

    /// Analyze a question end to end. Never returns an error: every
    /// failure mode is folded into the returned result.
    pub async fn analyze(
        &self,
        question: &str,
        filters: &SearchFilters,
        options: &AnalyzeOptions,
    ) -> AnalysisResult {
        let start = Instant::now();

        let (context, used_chunks) = self
            .context_for_question(
                question,
                filters,
                options.n_results,
                options.max_context_chars,
            )
            .await;

        let generation_start = Instant::now();
        let generated = self
            .generator
            .generate(SYSTEM_PROMPT, question, &context)
            .await;
        metrics::record_generation(
            generation_start.elapsed().as_secs_f64(),
            self.generator.model_name(),
            generated.is_ok(),
        );

        let result = match generated {
            Ok(analysis) => {
                let citations = validate_citations(extract_citations(&analysis), &used_chunks);
                let stats = citation_stats(&citations);
                let quality_issues = assess(&analysis, &stats);
                let requires_review = !quality_issues.is_empty();

                AnalysisResult {
                    analysis,
                    citations,
                    citation_stats: stats,
                    quality_issues,
                    requires_review,
                    timestamp: Utc::now(),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Generation failed");

                AnalysisResult {
                    analysis: format!("Error generating analysis: {}", e),
                    citations: Vec::new(),
                    citation_stats: CitationStats::default(),
                    quality_issues: vec![TAG_GENERATION_ERROR.to_string()],
                    requires_review: true,
                    timestamp: Utc::now(),
                }
            }
        };

        let latency_ms = start.elapsed().as_millis() as u64;

        metrics::record_analysis(
            start.elapsed().as_secs_f64(),
            result.citation_stats.total,
            result.citation_stats.valid,
            result.requires_review,
        );

        tracing::info!(
            context_chars = context.len(),
            chunks_used = used_chunks.len(),
            citations_total = result.citation_stats.total,
            citations_valid = result.citation_stats.valid,
            requires_review = result.requires_review,
            latency_ms = latency_ms,
            "Analysis completed"
        );

        result
    }
}

/// Format an analysis for reviewer display, appending the citation audit
/// trail with per-citation validity marks.
pub fn format_analysis_for_display(result: &AnalysisResult) -> String {
    let mut display = result.analysis.clone();

    if !result.citations.is_empty() {
        display.push_str("\n\n--- CITATIONS ---\n");

        for (i, citation) in result.citations.iter().enumerate() {
            let mark = if citation.validated { "✓" } else { "✗" };
            display.push_str(&format!("{}. {} {}", i + 1, mark, citation.raw_text));

            if citation.validated {
                if let Some(metadata) = &citation.source_metadata {
                    let filename = metadata.filename().unwrap_or("Unknown");
                    let jurisdiction = metadata.jurisdiction().unwrap_or("Unknown");
                    display.push_str(&format!(" ({}, {})", filename, jurisdiction));
                }
            }

            display.push('\n');
        }
    }

    display
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lexforge_common::errors::{AppError, Result};
    use lexforge_common::models::{ChunkMetadata, RetrievedChunk};
    use lexforge_retrieval::search::MemorySearch;

    /// Generator failing every call, for the recovery path
    struct FailingGenerator;

    #[async_trait]
    impl Generator for FailingGenerator {
        async fn generate(&self, _s: &str, _q: &str, _c: &str) -> Result<String> {
            Err(AppError::GenerationError {
                message: "model unavailable".to_string(),
            })
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    /// Search backend failing every call
    struct FailingSearch;

    #[async_trait]
    impl SearchBackend for FailingSearch {
        async fn search(
            &self,
            _query: &str,
            _n: usize,
            _filters: &SearchFilters,
        ) -> Result<Vec<RetrievedChunk>> {
            Err(AppError::SearchError {
                message: "store down".to_string(),
            })
        }

        async fn available_filters(
            &self,
        ) -> Result<lexforge_retrieval::search::FilterOptions> {
            Err(AppError::SearchError {
                message: "store down".to_string(),
            })
        }

        async fn stats(&self) -> Result<lexforge_retrieval::search::CollectionStats> {
            Err(AppError::SearchError {
                message: "store down".to_string(),
            })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn negligence_corpus() -> Vec<RetrievedChunk> {
        vec![
            RetrievedChunk {
                content: "Negligence requires duty, breach, causation, and damages.".to_string(),
                metadata: ChunkMetadata::new()
                    .with("document_id", "case_1")
                    .with("chunk_index", 0)
                    .with("jurisdiction", "New York")
                    .with("year", 2020)
                    .with("filename", "palsgraf_v_lirr.pdf"),
                distance: 0.1,
            },
            RetrievedChunk {
                content: "Contributory fault may reduce recovery.".to_string(),
                metadata: ChunkMetadata::new()
                    .with("document_id", "case_2")
                    .with("chunk_index", 3)
                    .with("year", 1990),
                distance: 0.4,
            },
        ]
    }

    fn analyzer_with(
        search: Arc<dyn SearchBackend>,
        generator: Arc<dyn Generator>,
    ) -> LegalAnalyzer {
        LegalAnalyzer::new(search, generator)
            .with_ranker(HybridRanker::new().with_reference_year(2026))
    }

    #[tokio::test]
    async fn test_end_to_end_negligence_scenario() {
        let answer = "Negligence in New York requires a duty of care, a breach of that duty, \
                      causation, and damages [case_1:0]. The precedent on duty is well settled.";
        let analyzer = analyzer_with(
            Arc::new(MemorySearch::new(negligence_corpus())),
            Arc::new(crate::generate::CannedGenerator::new(answer)),
        );

        let (context, used) = analyzer
            .context_for_question(
                "What is the precedent for negligence in New York tort law?",
                &SearchFilters::none(),
                10,
                10_000,
            )
            .await;

        // case_1 outranks case_2 (closer, newer) and both fit the budget
        assert_eq!(used.len(), 2);
        assert_eq!(used[0].metadata().document_id(), Some("case_1"));
        assert_eq!(used[1].metadata().document_id(), Some("case_2"));
        assert!(context.starts_with("[case_1:p0] "));
        assert!(context.contains("\n\n[case_2:p3] "));

        let result = analyzer
            .analyze(
                "What is the precedent for negligence in New York tort law?",
                &SearchFilters::none(),
                &AnalyzeOptions {
                    n_results: 10,
                    max_context_chars: 10_000,
                },
            )
            .await;

        assert_eq!(result.citation_stats.total, 1);
        assert_eq!(result.citation_stats.valid, 1);
        assert_eq!(result.citation_stats.ratio, 1.0);
        assert!(result.citations[0].validated);
        assert_eq!(result.citations[0].document_id, "case_1");
        assert!(result.quality_issues.is_empty());
        assert!(!result.requires_review);
    }

    #[tokio::test]
    async fn test_insufficient_context_answer_is_flagged() {
        let analyzer = analyzer_with(
            Arc::new(MemorySearch::new(negligence_corpus())),
            Arc::new(crate::generate::CannedGenerator::new(
                "Insufficient context to answer.",
            )),
        );

        let result = analyzer
            .analyze(
                "What is the precedent for adverse possession?",
                &SearchFilters::none(),
                &AnalyzeOptions::default(),
            )
            .await;

        assert_eq!(result.citation_stats.total, 0);
        assert!(result
            .quality_issues
            .contains(&"Insufficient context identified".to_string()));
        assert!(result
            .quality_issues
            .contains(&"Response too brief".to_string()));
        assert!(result.requires_review);
    }

    #[tokio::test]
    async fn test_generation_failure_yields_recovered_result() {
        let analyzer = analyzer_with(
            Arc::new(MemorySearch::new(negligence_corpus())),
            Arc::new(FailingGenerator),
        );

        let result = analyzer
            .analyze(
                "What is negligence?",
                &SearchFilters::none(),
                &AnalyzeOptions::default(),
            )
            .await;

        assert!(result.analysis.starts_with("Error generating analysis:"));
        assert!(result.citations.is_empty());
        assert_eq!(result.citation_stats, CitationStats::default());
        assert_eq!(result.quality_issues, vec!["Generation error".to_string()]);
        assert!(result.requires_review);
    }

    #[tokio::test]
    async fn test_search_failure_recovers_to_empty_context() {
        let analyzer = analyzer_with(Arc::new(FailingSearch), Arc::new(FailingGenerator));

        let (context, used) = analyzer
            .context_for_question("What is negligence?", &SearchFilters::none(), 10, 4000)
            .await;

        assert_eq!(context, "");
        assert!(used.is_empty());
    }

    #[tokio::test]
    async fn test_filters_narrow_retrieval() {
        let answer = "Only New York authority was considered in this analysis [case_1:0], and \
                      it establishes the familiar four-element negligence framework.";
        let analyzer = analyzer_with(
            Arc::new(MemorySearch::new(negligence_corpus())),
            Arc::new(crate::generate::CannedGenerator::new(answer)),
        );

        let filters = SearchFilters {
            jurisdiction: Some("New York".to_string()),
            ..Default::default()
        };

        let (_, used) = analyzer
            .context_for_question("What is negligence?", &filters, 10, 10_000)
            .await;

        assert_eq!(used.len(), 1);
        assert_eq!(used[0].metadata().document_id(), Some("case_1"));
    }

    #[tokio::test]
    async fn test_display_formatting_marks_validity() {
        let answer = "Duty was established [case_1:0] though one claim lacks support [ghost:9]. \
                      The remaining analysis tracks the settled framework for negligence claims.";
        let analyzer = analyzer_with(
            Arc::new(MemorySearch::new(negligence_corpus())),
            Arc::new(crate::generate::CannedGenerator::new(answer)),
        );

        let result = analyzer
            .analyze(
                "What is negligence?",
                &SearchFilters::none(),
                &AnalyzeOptions::default(),
            )
            .await;

        let display = format_analysis_for_display(&result);
        assert!(display.contains("--- CITATIONS ---"));
        assert!(display.contains("1. ✓ [case_1:0] (palsgraf_v_lirr.pdf, New York)"));
        assert!(display.contains("2. ✗ [ghost:9]"));
    }
}
