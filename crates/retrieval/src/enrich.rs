//! Query enrichment
//!
//! Raw questions are augmented with detected legal terminology and a fixed
//! research framing before they are embedded and searched. Pure string
//! transform, no failure modes.

use crate::terms::LegalTermLexicon;

/// Fixed framing appended to every enriched query
pub const RESEARCH_FRAMING: &str =
    " This is a legal research query seeking relevant case law, statutes, or legal precedents.";

/// Enriches questions with legal context before search
pub struct QueryEnricher {
    lexicon: LegalTermLexicon,
}

impl QueryEnricher {
    pub fn new() -> Self {
        Self {
            lexicon: LegalTermLexicon::new(),
        }
    }

    pub fn with_lexicon(lexicon: LegalTermLexicon) -> Self {
        Self { lexicon }
    }

    /// Append detected legal terms (verbatim, comma-joined) and the
    /// research framing sentence to the question.
    pub fn enrich(&self, question: &str) -> String {
        let terms = self.lexicon.detect(question);

        let mut enriched = question.to_string();

        if !terms.is_empty() {
            enriched.push_str(&format!(" Legal terms: {}.", terms.join(", ")));
        }

        enriched.push_str(RESEARCH_FRAMING);

        enriched
    }

    pub fn lexicon(&self) -> &LegalTermLexicon {
        &self.lexicon
    }
}

impl Default for QueryEnricher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrich_appends_terms_and_framing() {
        let enricher = QueryEnricher::new();
        let enriched = enricher.enrich("What damages apply for breach of contract?");

        assert!(enriched.starts_with("What damages apply for breach of contract?"));
        assert!(enriched.contains(" Legal terms: "));
        assert!(enriched.contains("damages"));
        assert!(enriched.contains("breach"));
        assert!(enriched.contains("contract"));
        assert!(enriched.ends_with(RESEARCH_FRAMING));
    }

    #[test]
    fn test_enrich_without_terms_only_adds_framing() {
        let enricher = QueryEnricher::new();
        let enriched = enricher.enrich("Tell me about zoning maps.");

        assert_eq!(
            enriched,
            format!("Tell me about zoning maps.{}", RESEARCH_FRAMING)
        );
    }

    #[test]
    fn test_enrich_is_deterministic() {
        let enricher = QueryEnricher::new();
        let q = "Does the defendant owe damages under tort law?";
        assert_eq!(enricher.enrich(q), enricher.enrich(q));
    }
}
