//! Quality assessment
//!
//! Derives pass/fail quality signals from citation statistics and the
//! answer text itself. Rules run in a fixed order and all applicable tags
//! are appended; an answer with any tag requires human review.

use lexforge_common::models::{AnalysisResult, CitationStats};
use serde::{Deserialize, Serialize};

pub const TAG_LOW_CITATION_VALIDITY: &str = "Low citation validity";
pub const TAG_INSUFFICIENT_CONTEXT: &str = "Insufficient context identified";
pub const TAG_RESPONSE_TOO_BRIEF: &str = "Response too brief";
pub const TAG_GENERATION_ERROR: &str = "Generation error";

/// Minimum share of citations that must validate
pub const MIN_CITATION_RATIO: f32 = 0.8;

/// Minimum answer length in bytes
pub const MIN_ANALYSIS_LEN: usize = 100;

/// Evaluate quality rules against an answer. Pure and total.
pub fn assess(analysis_text: &str, stats: &CitationStats) -> Vec<String> {
    let mut issues = Vec::new();

    if stats.total > 0 && stats.ratio < MIN_CITATION_RATIO {
        issues.push(TAG_LOW_CITATION_VALIDITY.to_string());
    }

    if analysis_text
        .to_lowercase()
        .contains("insufficient context")
    {
        issues.push(TAG_INSUFFICIENT_CONTEXT.to_string());
    }

    if analysis_text.len() < MIN_ANALYSIS_LEN {
        issues.push(TAG_RESPONSE_TOO_BRIEF.to_string());
    }

    issues
}

/// Summary report over a finished analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub summary: QualitySummary,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualitySummary {
    pub total_citations: usize,
    pub valid_citations: usize,
    pub citation_accuracy: String,
    pub quality_issues: usize,
    pub requires_human_review: bool,
}

/// Build the reviewer-facing summary with recommendations keyed off the
/// detected issues.
pub fn summary_report(result: &AnalysisResult) -> QualityReport {
    let stats = &result.citation_stats;
    let issues = &result.quality_issues;

    let mut recommendations = Vec::new();

    if stats.ratio < MIN_CITATION_RATIO {
        recommendations.push(
            "Consider adding more specific legal context or refining the search query"
                .to_string(),
        );
    }

    if issues.iter().any(|i| i == TAG_INSUFFICIENT_CONTEXT) {
        recommendations.push(
            "Upload more relevant legal documents or expand the search criteria".to_string(),
        );
    }

    if issues.iter().any(|i| i == TAG_RESPONSE_TOO_BRIEF) {
        recommendations
            .push("The analysis may be incomplete - consider providing more context".to_string());
    }

    if issues.is_empty() {
        recommendations.push("Analysis meets quality standards and is ready for use".to_string());
    }

    QualityReport {
        summary: QualitySummary {
            total_citations: stats.total,
            valid_citations: stats.valid,
            citation_accuracy: format!("{:.1}%", stats.ratio * 100.0),
            quality_issues: issues.len(),
            requires_human_review: result.requires_review,
        },
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_brief_text_without_citations_yields_only_brevity_tag() {
        // 50 bytes, no citations, no "insufficient context" phrase
        let text = "a".repeat(50);
        let stats = CitationStats::new(0, 0);

        let issues = assess(&text, &stats);
        assert_eq!(issues, vec![TAG_RESPONSE_TOO_BRIEF.to_string()]);
    }

    #[test]
    fn test_low_validity_requires_citations_present() {
        let text = "x".repeat(200);

        // ratio 0 with no citations at all: rule 1 must not fire
        assert!(assess(&text, &CitationStats::new(0, 0)).is_empty());

        // one invalid citation out of one: rule 1 fires
        let issues = assess(&text, &CitationStats::new(1, 0));
        assert_eq!(issues, vec![TAG_LOW_CITATION_VALIDITY.to_string()]);
    }

    #[test]
    fn test_insufficient_context_phrase_case_insensitive() {
        let text = format!("{} INSUFFICIENT CONTEXT to answer this question fully.", "pad ".repeat(30));
        let issues = assess(&text, &CitationStats::new(0, 0));
        assert_eq!(issues, vec![TAG_INSUFFICIENT_CONTEXT.to_string()]);
    }

    #[test]
    fn test_tags_accumulate_in_rule_order() {
        let text = "Insufficient context to answer.";
        let issues = assess(text, &CitationStats::new(2, 1));

        assert_eq!(
            issues,
            vec![
                TAG_LOW_CITATION_VALIDITY.to_string(),
                TAG_INSUFFICIENT_CONTEXT.to_string(),
                TAG_RESPONSE_TOO_BRIEF.to_string(),
            ]
        );
    }

    #[test]
    fn test_summary_report_clean_result() {
        let result = AnalysisResult {
            analysis: "y".repeat(150),
            citations: Vec::new(),
            citation_stats: CitationStats::new(2, 2),
            quality_issues: Vec::new(),
            requires_review: false,
            timestamp: Utc::now(),
        };

        let report = summary_report(&result);
        assert_eq!(report.summary.citation_accuracy, "100.0%");
        assert!(!report.summary.requires_human_review);
        assert_eq!(
            report.recommendations,
            vec!["Analysis meets quality standards and is ready for use".to_string()]
        );
    }
}
