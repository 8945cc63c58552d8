//! Citation extraction and validation
//!
//! Generated answers embed markers of the form `[document_id:chunk_index]`.
//! Extraction finds them left-to-right; validation cross-references each
//! against the chunks actually supplied as context. Markers are never
//! deduplicated: a claim repeated in the draft counts each time.

use lexforge_common::models::{Citation, CitationStats, ScoredChunk};
use regex_lite::Regex;

/// Parse citation markers out of answer text, in order of appearance.
///
/// `document_id` is any run of non-colon, non-bracket characters and the
/// index is decimal digits. Fragments that do not parse are simply not
/// extracted.
pub fn extract_citations(text: &str) -> Vec<Citation> {
    let pattern = Regex::new(r"\[([^:\[\]]+):([0-9]+)\]").unwrap();

    let mut citations = Vec::new();

    for cap in pattern.captures_iter(text) {
        if let (Some(full), Some(document_id), Some(index)) =
            (cap.get(0), cap.get(1), cap.get(2))
        {
            // Digit runs too long for i64 are treated as unparseable
            if let Ok(chunk_index) = index.as_str().parse::<i64>() {
                citations.push(Citation {
                    document_id: document_id.as_str().to_string(),
                    chunk_index,
                    raw_text: full.as_str().to_string(),
                    position: full.start(),
                    validated: false,
                    source_content: None,
                    source_metadata: None,
                });
            }
        }
    }

    citations
}

/// Mark each citation validated iff a used chunk carries the exact
/// `(document_id, chunk_index)` pair, copying the source fields on match.
pub fn validate_citations(
    mut citations: Vec<Citation>,
    used_chunks: &[ScoredChunk],
) -> Vec<Citation> {
    for citation in &mut citations {
        let matched = used_chunks.iter().find(|chunk| {
            chunk.metadata().document_id() == Some(citation.document_id.as_str())
                && chunk.metadata().chunk_index() == Some(citation.chunk_index)
        });

        if let Some(chunk) = matched {
            citation.validated = true;
            citation.source_content = Some(chunk.content().to_string());
            citation.source_metadata = Some(chunk.metadata().clone());
        }
    }

    citations
}

/// Aggregate validity counts over validated citations
pub fn citation_stats(citations: &[Citation]) -> CitationStats {
    let total = citations.len();
    let valid = citations.iter().filter(|c| c.validated).count();
    CitationStats::new(total, valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexforge_common::models::{ChunkMetadata, RetrievedChunk};

    fn used_chunk(document_id: &str, chunk_index: i64) -> ScoredChunk {
        ScoredChunk {
            chunk: RetrievedChunk {
                content: format!("content of {}:{}", document_id, chunk_index),
                metadata: ChunkMetadata::new()
                    .with("document_id", document_id)
                    .with("chunk_index", chunk_index)
                    .with("jurisdiction", "New York"),
                distance: 0.1,
            },
            relevance_score: 0.9,
        }
    }

    #[test]
    fn test_round_trip_extraction_with_positions() {
        let text = "Duty was established [case_1:0]. Damages follow [case_2:3].";
        let citations = extract_citations(text);

        assert_eq!(citations.len(), 2);

        assert_eq!(citations[0].document_id, "case_1");
        assert_eq!(citations[0].chunk_index, 0);
        assert_eq!(citations[0].raw_text, "[case_1:0]");
        assert_eq!(citations[0].position, text.find("[case_1:0]").unwrap());

        assert_eq!(citations[1].document_id, "case_2");
        assert_eq!(citations[1].chunk_index, 3);
        assert_eq!(citations[1].position, text.find("[case_2:3]").unwrap());
    }

    #[test]
    fn test_duplicates_yield_separate_entries() {
        let text = "Claim one [case_1:0]. Claim two [case_1:0].";
        let citations = extract_citations(text);

        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].document_id, citations[1].document_id);
        assert!(citations[0].position < citations[1].position);
    }

    #[test]
    fn test_malformed_fragments_not_extracted() {
        let text = "Bad markers: [case_1] [case_2:] [:3] [case_4:abc] [unclosed:9 ok [case_5:7]";
        let citations = extract_citations(text);

        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].document_id, "case_5");
        assert_eq!(citations[0].chunk_index, 7);
    }

    #[test]
    fn test_oversized_index_skipped() {
        let text = "Huge [doc:99999999999999999999999999] fine [doc:1]";
        let citations = extract_citations(text);

        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].chunk_index, 1);
    }

    #[test]
    fn test_validation_soundness() {
        let used = vec![used_chunk("case_1", 0), used_chunk("case_2", 3)];

        let citations = extract_citations("See [case_1:0], [case_2:4], and [case_3:0].");
        let validated = validate_citations(citations, &used);

        assert!(validated[0].validated);
        assert_eq!(
            validated[0].source_content.as_deref(),
            Some("content of case_1:0")
        );
        assert_eq!(
            validated[0]
                .source_metadata
                .as_ref()
                .and_then(|m| m.jurisdiction()),
            Some("New York")
        );

        // Right document, wrong chunk index
        assert!(!validated[1].validated);
        assert!(validated[1].source_content.is_none());

        // Unknown document
        assert!(!validated[2].validated);
    }

    #[test]
    fn test_index_compared_as_integer() {
        // Store metadata carries the index as a string
        let chunk = ScoredChunk {
            chunk: RetrievedChunk {
                content: "stringly indexed".to_string(),
                metadata: ChunkMetadata::new()
                    .with("document_id", "case_1")
                    .with("chunk_index", "2"),
                distance: 0.1,
            },
            relevance_score: 0.9,
        };

        let validated = validate_citations(extract_citations("[case_1:2]"), &[chunk]);
        assert!(validated[0].validated);
    }

    #[test]
    fn test_stats() {
        let used = vec![used_chunk("case_1", 0)];
        let citations = validate_citations(
            extract_citations("[case_1:0] and [case_9:9] and [case_1:0]"),
            &used,
        );

        let stats = citation_stats(&citations);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.valid, 2);
        assert!((stats.ratio - 2.0 / 3.0).abs() < 1e-6);
    }
}
