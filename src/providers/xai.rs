use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use reqwest::{Client, StatusCode};
use log::{debug, warn};

use crate::app_config::TranslationConfig;
use crate::errors::{ErrorKind, ProviderError};
use crate::translation::cancel::CancelSignal;
use super::{BatchOutcome, BatchTranslate};

/// Delimiter between translated segments in a response
pub const SEGMENT_DELIMITER: &str = "\n\n";

/// xAI chat completions client
pub struct XaiClient {
    /// HTTP client for API requests
    client: Client,
    /// Bearer token
    api_key: String,
    /// Full chat completions URL
    endpoint: String,
    /// Model name
    model: String,
    /// Completion token ceiling
    max_tokens: u32,
    /// Sampling temperature
    temperature: f32,
    /// Request timeout in seconds
    timeout_secs: u64,
}

impl std::fmt::Debug for XaiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XaiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

/// Chat completions request
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// The model to use
    pub model: String,

    /// The messages for the conversation
    pub messages: Vec<ChatMessage>,

    /// Maximum number of tokens to generate
    pub max_tokens: u32,

    /// Temperature for generation
    pub temperature: f32,
}

/// Chat message format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Chat completions response
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Completion choices; only the first is used
    pub choices: Vec<ChatChoice>,
}

/// Individual choice in a response
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

impl ChatRequest {
    /// Create a new request with no messages
    pub fn new(model: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            max_tokens,
            temperature,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }
}

/// System instruction sent before the texts
pub fn system_prompt(target_language: &str) -> String {
    format!("Translate to {}. Only translation, no explanations.", target_language)
}

/// Split a response body into exactly `expected` trimmed segments.
///
/// Empty segments are dropped, a short response is padded with empty
/// strings and extra segments are discarded.
pub fn split_segments(content: &str, expected: usize) -> Vec<String> {
    let mut segments: Vec<String> = content
        .trim()
        .split(SEGMENT_DELIMITER)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();
    segments.resize(expected, String::new());
    segments
}

impl XaiClient {
    /// Create a new client bound to `api_key`
    pub fn new(api_key: impl Into<String>, config: &TranslationConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
        })
    }

    /// Build the request for one batch: the system instruction, then one user message per text
    pub fn build_request(&self, texts: &[String], target_language: &str) -> ChatRequest {
        texts.iter().fold(
            ChatRequest::new(&self.model, self.max_tokens, self.temperature)
                .add_message("system", system_prompt(target_language)),
            |request, text| request.add_message("user", text.as_str()),
        )
    }

    /// Send a request and return the first choice's content
    pub async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let response = self.client.post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => {
                return Err(ProviderError::AuthenticationError("Invalid API key".to_string()));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(ProviderError::RateLimitExceeded("Too many requests".to_string()));
            }
            StatusCode::PAYMENT_REQUIRED => {
                return Err(ProviderError::QuotaExhausted("No credits".to_string()));
            }
            _ => {}
        }

        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let chat_response = response.json::<ChatResponse>().await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout_secs)
                } else {
                    ProviderError::ParseError(e.to_string())
                }
            })?;

        chat_response.choices.into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::ParseError("Response contained no choices".to_string()))
    }

    fn classify_transport_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout(self.timeout_secs)
        } else {
            ProviderError::RequestFailed(error.to_string())
        }
    }
}

#[async_trait]
impl BatchTranslate for XaiClient {
    async fn translate_batch(
        &self,
        texts: &[String],
        target_language: &str,
        cancel: &CancelSignal,
    ) -> BatchOutcome {
        if cancel.is_canceled() {
            return BatchOutcome::failure(ErrorKind::Canceled);
        }
        if texts.is_empty() {
            return BatchOutcome::success(Vec::new());
        }

        let request = self.build_request(texts, target_language);
        debug!("Sending {} texts to {}", texts.len(), self.endpoint);
        let result = self.complete(&request).await;

        // The call itself is never interrupted; a cancel that arrived
        // while it was in flight wins over its result.
        if cancel.is_canceled() {
            return BatchOutcome::failure(ErrorKind::Canceled);
        }

        match result {
            Ok(content) => BatchOutcome::success(split_segments(&content, texts.len())),
            Err(e) => {
                let kind = e.kind();
                warn!("Batch request failed: {}", e);
                BatchOutcome::failure(kind)
            }
        }
    }
}
