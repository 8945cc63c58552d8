//! Analysis handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use validator::Validate;

use crate::AppState;
use lexforge_analysis::{format_analysis_for_display, summary_report, AnalyzeOptions, QualityReport};
use lexforge_common::{
    errors::{AppError, Result},
    models::AnalysisResult,
};
use lexforge_retrieval::search::SearchFilters;

/// Upper bound on results fetched per question
const MAX_N_RESULTS: usize = 50;

/// Analysis request
#[derive(Debug, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question: String,

    /// Optional metadata filters ("All" means unconstrained)
    pub jurisdiction: Option<String>,
    pub court_type: Option<String>,
    pub document_type: Option<String>,

    #[serde(default)]
    pub options: AnalyzeRequestOptions,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequestOptions {
    /// Results fetched from the store
    #[serde(default = "default_n_results")]
    pub n_results: usize,

    /// Character budget for assembled context
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,

    /// Include the reviewer-facing display rendering
    #[serde(default)]
    pub include_display: bool,
}

impl Default for AnalyzeRequestOptions {
    fn default() -> Self {
        Self {
            n_results: default_n_results(),
            max_context_chars: default_max_context_chars(),
            include_display: false,
        }
    }
}

fn default_n_results() -> usize {
    lexforge_common::DEFAULT_RESULT_LIMIT
}

fn default_max_context_chars() -> usize {
    lexforge_common::DEFAULT_MAX_CONTEXT_CHARS
}

/// Analysis response
#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub question: String,

    #[serde(flatten)]
    pub result: AnalysisResult,

    /// Quality summary with recommendations
    pub report: QualityReport,

    /// Reviewer-facing rendering (if requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    pub processing_time_ms: u64,
}

/// Analyze a legal question against the document collection
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>> {
    let start = Instant::now();

    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    if request.options.n_results == 0 || request.options.n_results > MAX_N_RESULTS {
        return Err(AppError::Validation {
            message: format!("n_results must be between 1 and {}", MAX_N_RESULTS),
            field: Some("options.n_results".to_string()),
        });
    }

    let filters = SearchFilters {
        jurisdiction: request.jurisdiction.clone(),
        court_type: request.court_type.clone(),
        document_type: request.document_type.clone(),
    };

    let options = AnalyzeOptions {
        n_results: request.options.n_results,
        max_context_chars: request.options.max_context_chars,
    };

    let result = state
        .analyzer
        .analyze(&request.question, &filters, &options)
        .await;

    let report = summary_report(&result);
    let display = request
        .options
        .include_display
        .then(|| format_analysis_for_display(&result));

    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        question_chars = request.question.len(),
        citations_total = result.citation_stats.total,
        citations_valid = result.citation_stats.valid,
        requires_review = result.requires_review,
        latency_ms = processing_time_ms,
        "Analyze request completed"
    );

    Ok(Json(AnalyzeResponse {
        question: request.question,
        result,
        report,
        display,
        processing_time_ms,
    }))
}
