//! Legal term lexicon
//!
//! Detection is driven by a table of (category, pattern) pairs so the
//! recognized vocabulary can grow without touching ranking or validation
//! code. Patterns are case-insensitive and whole-word anchored.

use regex_lite::Regex;
use std::collections::HashSet;

/// Default term categories recognized in questions and chunk content
pub const DEFAULT_TERM_CATEGORIES: &[(&str, &str)] = &[
    (
        "substantive",
        r"(?i)\b(negligence|tort|contract|breach|liability|damages|precedent|statute|regulation)\b",
    ),
    (
        "body_of_law",
        r"(?i)\b(case law|common law|civil law|criminal law|constitutional law)\b",
    ),
    (
        "party_role",
        r"(?i)\b(plaintiff|defendant|appellant|respondent|petitioner)\b",
    ),
    (
        "ruling",
        r"(?i)\b(judgment|ruling|opinion|holding|dicta)\b",
    ),
    (
        "procedure",
        r"(?i)\b(appeal|motion|discovery|deposition|trial)\b",
    ),
];

/// Compiled lexicon of legal terminology patterns
pub struct LegalTermLexicon {
    patterns: Vec<(String, Regex)>,
}

impl LegalTermLexicon {
    /// Lexicon with the default category table
    pub fn new() -> Self {
        Self::with_categories(DEFAULT_TERM_CATEGORIES)
    }

    /// Lexicon with a custom category table. Malformed patterns are
    /// skipped with a warning rather than failing construction.
    pub fn with_categories(categories: &[(&str, &str)]) -> Self {
        let patterns = categories
            .iter()
            .filter_map(|(category, pattern)| match Regex::new(pattern) {
                Ok(re) => Some((category.to_string(), re)),
                Err(e) => {
                    tracing::warn!(
                        category = category,
                        error = %e,
                        "Skipping malformed term pattern"
                    );
                    None
                }
            })
            .collect();

        Self { patterns }
    }

    /// Detect legal terms in the text.
    ///
    /// Returns matched terms as written in the text, deduplicated
    /// case-insensitively, in first-seen order.
    pub fn detect(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut terms = Vec::new();

        for (_, pattern) in &self.patterns {
            for m in pattern.find_iter(text) {
                let term = m.as_str();
                if seen.insert(term.to_lowercase()) {
                    terms.push(term.to_string());
                }
            }
        }

        terms
    }

    /// Categories with at least one match in the text
    pub fn matched_categories(&self, text: &str) -> Vec<&str> {
        self.patterns
            .iter()
            .filter(|(_, pattern)| pattern.is_match(text))
            .map(|(category, _)| category.as_str())
            .collect()
    }
}

impl Default for LegalTermLexicon {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_substantive_terms() {
        let lexicon = LegalTermLexicon::new();
        let terms = lexicon.detect("What is the precedent for negligence in New York tort law?");
        assert!(terms.iter().any(|t| t.eq_ignore_ascii_case("precedent")));
        assert!(terms.iter().any(|t| t.eq_ignore_ascii_case("negligence")));
        assert!(terms.iter().any(|t| t.eq_ignore_ascii_case("tort")));
    }

    #[test]
    fn test_whole_word_matching() {
        let lexicon = LegalTermLexicon::new();
        // "contractor" must not match "contract"
        let terms = lexicon.detect("The contractor was hired last year.");
        assert!(terms.is_empty());
    }

    #[test]
    fn test_case_insensitive_dedup() {
        let lexicon = LegalTermLexicon::new();
        let terms = lexicon.detect("Negligence claims require proof of negligence.");
        assert_eq!(terms.len(), 1);
    }

    #[test]
    fn test_multiword_terms() {
        let lexicon = LegalTermLexicon::new();
        let terms = lexicon.detect("Is there relevant case law on this point?");
        assert!(terms.iter().any(|t| t.eq_ignore_ascii_case("case law")));
    }

    #[test]
    fn test_no_terms_in_plain_text() {
        let lexicon = LegalTermLexicon::new();
        assert!(lexicon.detect("What is the weather today?").is_empty());
    }

    #[test]
    fn test_custom_categories() {
        let lexicon =
            LegalTermLexicon::with_categories(&[("maritime", r"(?i)\b(admiralty|salvage)\b")]);
        let terms = lexicon.detect("An admiralty claim over salvage rights.");
        assert_eq!(terms.len(), 2);
    }

    #[test]
    fn test_malformed_pattern_skipped() {
        let lexicon = LegalTermLexicon::with_categories(&[
            ("broken", r"(unclosed"),
            ("ok", r"(?i)\b(statute)\b"),
        ]);
        let terms = lexicon.detect("The statute applies.");
        assert_eq!(terms, vec!["statute".to_string()]);
    }
}
