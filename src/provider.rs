//! Generation Provider
//!
//! The boundary to the remote text-generation service. Everything above this module
//! depends only on [`GenerationClient`]: one prompt plus a sampling configuration in,
//! generated text (or an error) out, under a fixed per-call timeout.

use crate::config::ProviderSettings;
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub mod mock;
pub mod response;

pub use response::extract_code_block;

/// Sampling configuration sent with every generation call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl SamplingConfig {
    pub const fn new(temperature: f32, top_p: f32, top_k: u32) -> Self {
        Self {
            temperature,
            top_p,
            top_k,
            max_output_tokens: None,
        }
    }

    /// Middle-of-the-road sampling used for single-variant runs and analysis
    pub const fn balanced() -> Self {
        Self::new(0.5, 0.9, 60)
    }

    /// Low-temperature sampling favouring consistent output
    pub const fn strict() -> Self {
        Self::new(0.2, 0.8, 40)
    }

    /// High-temperature sampling favouring varied output
    pub const fn creative() -> Self {
        Self::new(0.9, 0.95, 100)
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self::balanced()
    }
}

/// One outbound generation call
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub sampling: SamplingConfig,
}

impl GenerationRequest {
    pub fn new(
        model: impl Into<String>,
        prompt: impl Into<String>,
        sampling: SamplingConfig,
    ) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            sampling,
        }
    }
}

/// Remote generation service client
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Run one generation call; exactly one request is made, no retries
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ApiError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;
}

/// Instruction block prepended to every code-generation prompt
pub const SYSTEM_PREAMBLE: &str = "You are an expert programmer. Follow these principles when generating code:\n\
1. Self-contained: one file implements one complete feature.\n\
2. Minimal external dependencies: use only the framework's standard library.\n\
3. Duplication is acceptable when it keeps each file independently readable.\n\
4. Keep all state inside the file; no custom hooks or shared helpers.\n\
5. Use TypeScript.\n\n\
Output only the code, without explanations.";

// Gemini generateContent request/response structures
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: WireGenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

impl From<&SamplingConfig> for WireGenerationConfig {
    fn from(sampling: &SamplingConfig) -> Self {
        Self {
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            top_k: sampling.top_k,
            max_output_tokens: sampling.max_output_tokens,
        }
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ServiceError,
}

#[derive(Deserialize)]
struct ServiceError {
    message: String,
    #[serde(default)]
    code: u16,
}

// Helper function to map transport errors to ApiError.
// The request URL is stripped so error text never carries endpoint details.
fn map_http_error(error: reqwest::Error) -> ApiError {
    let error = error.without_url();
    if error.is_timeout() {
        ApiError::ProviderRequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::ProviderRequestFailed(format!("Connection error: {}", error))
    } else {
        ApiError::ProviderError(format!("HTTP error: {}", error))
    }
}

fn map_status_error(status: u16, body: &str) -> ApiError {
    let detail = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => format!("{} (code: {})", envelope.error.message, envelope.error.code),
        Err(_) => format!("status {}", status),
    };
    match status {
        401 | 403 => ApiError::ProviderAuthFailed(detail),
        404 => ApiError::ProviderModelNotFound(detail),
        429 => ApiError::ProviderRateLimit(detail),
        _ => ApiError::ProviderRequestFailed(detail),
    }
}

fn build_provider_http_client(settings: &ProviderSettings) -> Result<Client, ApiError> {
    Client::builder()
        .no_proxy()
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()
        .map_err(|e| ApiError::ProviderError(format!("Failed to create HTTP client: {}", e)))
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
    preamble: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: String, settings: &ProviderSettings) -> Result<Self, ApiError> {
        if api_key.trim().is_empty() {
            return Err(ApiError::CredentialMissing);
        }
        let client = build_provider_http_client(settings)?;
        Ok(Self {
            client,
            api_key,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            preamble: Some(SYSTEM_PREAMBLE.to_string()),
        })
    }

    /// Replace (or drop, with `None`) the instruction block prepended to prompts
    pub fn with_preamble(mut self, preamble: Option<String>) -> Self {
        self.preamble = preamble;
        self
    }

    fn full_prompt(&self, prompt: &str) -> String {
        match &self.preamble {
            Some(preamble) => format!("{}\n\n{}", preamble, prompt),
            None => prompt.to_string(),
        }
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ApiError> {
        let prompt = self.full_prompt(&request.prompt);
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: WireGenerationConfig::from(&request.sampling),
        };

        let url = format!("{}/models/{}:generateContent", self.endpoint, request.model);
        debug!(model = %request.model, prompt_chars = prompt.len(), "Sending generation request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.as_str())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| {
                let e = e.without_url();
                if e.is_timeout() {
                    ApiError::ProviderRequestFailed(format!("Request timeout: {}", e))
                } else {
                    ApiError::ProviderError(format!("Failed to read response: {}", e))
                }
            })?;

        if !status.is_success() {
            return Err(map_status_error(status.as_u16(), &text));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::ProviderError(format!("Failed to parse response: {}", e)))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| ApiError::GenerationFailed("Empty generation result".to_string()))
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}
