//! AI content generation for flashcards.
//!
//! The model handle is owned by the generator instance and passed in at
//! construction, so tests and alternative providers can swap it freely.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GeminiConfig;
use crate::models::NewCard;

/// Longest slice of source text sent to the model.
pub const MAX_SOURCE_CHARS: usize = 10_000;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("content generation is not configured")]
    Disabled,

    #[error("network error: {0}")]
    Network(String),

    #[error("provider error: {status} - {message}")]
    Provider { status: u16, message: String },

    #[error("malformed model output: {0}")]
    Malformed(String),
}

/// Producer of raw flashcard content. Implementations do not retry.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate_flashcards(&self, text: &str, count: u32) -> Result<Vec<NewCard>, GenerationError>;
}

/// Generator used when no provider is configured. Always fails.
pub struct DisabledGenerator;

#[async_trait]
impl ContentGenerator for DisabledGenerator {
    async fn generate_flashcards(&self, _text: &str, _count: u32) -> Result<Vec<NewCard>, GenerationError> {
        Err(GenerationError::Disabled)
    }
}

// === Gemini API Types ===

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Google Gemini `generateContent` client.
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiGenerator {
    pub fn new(client: Client, config: &GeminiConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ContentGenerator for GeminiGenerator {
    async fn generate_flashcards(&self, text: &str, count: u32) -> Result<Vec<NewCard>, GenerationError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: flashcard_prompt(text, count),
                }],
            }],
        };

        let resp = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Provider { status, message });
        }

        let body: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;

        let output: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .ok_or_else(|| GenerationError::Malformed("response has no candidates".to_string()))?;

        let cards = parse_flashcards(&output)?;
        tracing::debug!("Model returned {} flashcards ({} requested)", cards.len(), count);
        Ok(cards)
    }
}

/// Build the flashcard prompt for `count` cards.
pub fn flashcard_prompt(text: &str, count: u32) -> String {
    format!(
        r#"Generate {count} flashcards based on the following text.
Return the result ONLY as a valid JSON array of objects with this structure:
[
    {{
        "front": "Question or term",
        "back": "Answer or definition",
        "tags": ["Tag1", "Tag2"]
    }}
]

Text:
{}"#,
        truncate_chars(text, MAX_SOURCE_CHARS)
    )
}

/// Parse model output into cards, tolerating a markdown code fence.
pub fn parse_flashcards(output: &str) -> Result<Vec<NewCard>, GenerationError> {
    serde_json::from_str(strip_code_fence(output)).map_err(|e| GenerationError::Malformed(e.to_string()))
}

fn strip_code_fence(output: &str) -> &str {
    let trimmed = output.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line.
    let body = rest.strip_prefix("json").unwrap_or(rest);
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
