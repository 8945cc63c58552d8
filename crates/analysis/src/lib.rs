//! LexForge Analysis
//!
//! The generation half of the pipeline:
//! - Citation extraction and validation against supplied context
//! - Quality assessment with human-review flags
//! - Generation service abstraction
//! - The end-to-end `analyze` pipeline

pub mod analyzer;
pub mod citations;
pub mod generate;
pub mod quality;

pub use analyzer::{format_analysis_for_display, AnalyzeOptions, LegalAnalyzer};
pub use citations::{citation_stats, extract_citations, validate_citations};
pub use generate::{create_generator, CannedGenerator, Generator, OpenAiGenerator, SYSTEM_PROMPT};
pub use quality::{assess, summary_report, QualityReport};
