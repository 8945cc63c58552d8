//! Generation service abstraction
//!
//! The language model is an opaque collaborator behind the [`Generator`]
//! trait. The citation marker syntax in the system prompt is a wire
//! contract: the generator is instructed to emit `[document_id:chunk_index]`
//! and the validator parses exactly that shape back out.

use async_trait::async_trait;
use lexforge_common::config::LlmConfig;
use lexforge_common::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// System prompt given to the generation service for every question
pub const SYSTEM_PROMPT: &str = "You are a specialized legal research assistant. Your role is to:

1. ACCURATELY analyze and summarize legal documents
2. PROVIDE SPECIFIC CITATIONS for every claim you make
3. MAINTAIN PROFESSIONAL LEGAL STANDARDS
4. IDENTIFY JURISDICTIONAL CONTEXT when relevant
5. HIGHLIGHT KEY LEGAL PRINCIPLES and precedents

CRITICAL REQUIREMENTS:
- Every factual claim MUST include a citation in format [document_id:chunk_index]
- If you cannot find sufficient evidence, state \"Insufficient context to answer\"
- Focus on legal precedents, statutes, and case law
- Maintain objectivity and avoid speculation
- Use proper legal terminology and formatting
- ALWAYS use the correct jurisdiction name from the source documents
- Pay attention to the jurisdiction metadata in the source documents

CITATION FORMAT: [document_id:chunk_index] for each claim
RESPONSE STRUCTURE: Answer, then list all citations used";

/// Build the user-turn prompt from the question and assembled context
pub fn build_user_prompt(question: &str, context: &str) -> String {
    format!(
        "Legal Question: {}\n\nContext Documents:\n{}\n\nPlease provide a comprehensive legal analysis with proper citations. If the context is insufficient, clearly state this limitation.",
        question, context
    )
}

/// Trait for the text generation service
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce an answer for the question grounded in the context.
    /// Failures propagate; the caller decides how to recover.
    async fn generate(&self, system_prompt: &str, question: &str, context: &str)
        -> Result<String>;

    /// Model name for logs and metrics
    fn model_name(&self) -> &str;
}

/// OpenAI-style chat completions client
pub struct OpenAiGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl OpenAiGenerator {
    /// Create a generator from configuration
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AppError::Configuration {
                message: "llm.api_key required for the chat completions generator".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        question: &str,
        context: &str,
    ) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_user_prompt(question, context),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::GenerationError {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GenerationError {
                message: format!("API error {}: {}", status, body),
            });
        }

        let chat_response: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| AppError::GenerationError {
                    message: format!("Failed to parse response: {}", e),
                })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::GenerationError {
                message: "Empty response".to_string(),
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Generator returning a fixed response, for tests and keyless local runs
pub struct CannedGenerator {
    response: String,
}

impl CannedGenerator {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl Generator for CannedGenerator {
    async fn generate(
        &self,
        _system_prompt: &str,
        _question: &str,
        _context: &str,
    ) -> Result<String> {
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "canned"
    }
}

/// Create a generator based on configuration. Without an API key the
/// canned offline generator is used so local runs still complete.
pub fn create_generator(config: &LlmConfig) -> Result<Arc<dyn Generator>> {
    match &config.api_key {
        Some(key) if !key.is_empty() => Ok(Arc::new(OpenAiGenerator::new(config)?)),
        _ => {
            tracing::warn!("llm.api_key not set, using the canned offline generator");
            Ok(Arc::new(CannedGenerator::new(
                "Insufficient context to answer. [Offline generator - LLM API key not configured]",
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_carries_question_and_context() {
        let prompt = build_user_prompt("What is negligence?", "[case_1:p0] Duty of care.");
        assert!(prompt.contains("Legal Question: What is negligence?"));
        assert!(prompt.contains("[case_1:p0] Duty of care."));
    }

    #[test]
    fn test_system_prompt_states_citation_contract() {
        assert!(SYSTEM_PROMPT.contains("[document_id:chunk_index]"));
        assert!(SYSTEM_PROMPT.contains("Insufficient context to answer"));
    }

    #[tokio::test]
    async fn test_canned_generator() {
        let generator = CannedGenerator::new("fixed answer");
        let answer = generator.generate(SYSTEM_PROMPT, "q", "ctx").await.unwrap();
        assert_eq!(answer, "fixed answer");
    }

    #[test]
    fn test_keyless_config_selects_canned() {
        let config = LlmConfig {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            max_tokens: 2000,
            temperature: 0.1,
            timeout_secs: 60,
        };

        let generator = create_generator(&config).unwrap();
        assert_eq!(generator.model_name(), "canned");
    }
}
