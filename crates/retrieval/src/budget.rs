//! Context budgeting
//!
//! Packs ranked chunks into a citation-tagged context string under a hard
//! character budget. Greedy prefix fill: chunks are taken in ranked order
//! and assembly stops at the first chunk that does not fit. Which chunks
//! land in the context determines which citations can validate downstream,
//! so the fill order must stay exact.

use lexforge_common::models::ScoredChunk;

/// Separator between context segments. Counts toward the budget.
pub const SEGMENT_SEPARATOR: &str = "\n\n";

/// Format one chunk as a citation-tagged context segment.
///
/// Missing identity metadata degrades to the `unknown`/`0` placeholders
/// rather than failing; such segments can never validate a citation.
pub fn format_segment(chunk: &ScoredChunk) -> String {
    let document_id = chunk.metadata().document_id().unwrap_or("unknown");
    let chunk_index = chunk.metadata().chunk_index().unwrap_or(0);
    format!("[{}:p{}] {}", document_id, chunk_index, chunk.content())
}

/// Assemble a context string from ranked chunks under `max_chars`.
///
/// Returns the joined context and the chunks that made it in, in ranked
/// order. Returns an empty pair when nothing fits.
pub fn build_context(ranked: &[ScoredChunk], max_chars: usize) -> (String, Vec<ScoredChunk>) {
    let mut segments: Vec<String> = Vec::new();
    let mut used: Vec<ScoredChunk> = Vec::new();
    let mut total_len = 0usize;

    for chunk in ranked {
        let segment = format_segment(chunk);

        let candidate_len = if segments.is_empty() {
            segment.len()
        } else {
            total_len + SEGMENT_SEPARATOR.len() + segment.len()
        };

        if candidate_len > max_chars {
            // First rejection ends the fill; no skip-ahead to smaller chunks
            break;
        }

        total_len = candidate_len;
        segments.push(segment);
        used.push(chunk.clone());
    }

    (segments.join(SEGMENT_SEPARATOR), used)
}
