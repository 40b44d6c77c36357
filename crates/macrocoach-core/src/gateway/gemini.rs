//! Generative-content provider (Gemini REST wire format).

use std::time::Duration;

use async_trait::async_trait;
use macrocoach_model::{ProviderConfig, ProviderId};
use serde::{Deserialize, Serialize};

use super::trait_def::CompletionProvider;
use super::types::{CompletionRequest, CompletionResult, GatewayError};

const ID: ProviderId = ProviderId::Gemini;

/// Fixed sampling; request-level nucleus/top-k/penalty values are ignored.
const TOP_P: f32 = 0.8;
const TOP_K: u32 = 40;

const MIN_KEY_LEN: usize = 30;
const KEY_PREFIX: &str = "AIza";

/// POSTs `{base_url}/models/{model}:generateContent` and returns the text
/// of the first candidate.
#[derive(Clone)]
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

/// Trim `raw` and check it looks like a Google API key.
pub fn validate_api_key(raw: &str) -> Result<String, GatewayError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(GatewayError::MissingCredential {
            provider: ID,
            var: ProviderConfig::api_key_var(ID),
        });
    }
    if key.len() < MIN_KEY_LEN {
        return Err(GatewayError::InvalidCredential {
            provider: ID,
            reason: "key is too short",
        });
    }
    if !key.starts_with(KEY_PREFIX) {
        return Err(GatewayError::InvalidCredential {
            provider: ID,
            reason: "key must start with \"AIza\"",
        });
    }
    Ok(key.to_owned())
}

impl GeminiProvider {
    pub fn new(
        api_key: &str,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let api_key = validate_api_key(api_key)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::transport(ID, e))?;
        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client,
        })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, GatewayError> {
        Self::new(&config.api_key, config.base_url_trimmed(), config.timeout)
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url)
    }
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn generate_request(request: &CompletionRequest) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part {
                text: &request.prompt,
            }],
        }],
        generation_config: GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_output_units,
            top_p: TOP_P,
            top_k: TOP_K,
        },
    }
}

/// Concatenated text parts of the first candidate.
fn extract_text(response: GenerateResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    (!text.trim().is_empty()).then_some(text)
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    fn id(&self) -> ProviderId {
        ID
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResult, GatewayError> {
        tracing::debug!(provider = %ID, model = %request.model, "sending generateContent");

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&generate_request(request))
            .send()
            .await
            .map_err(|e| GatewayError::transport(ID, e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                provider: ID,
                status,
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::transport(ID, e))?;

        extract_text(parsed)
            .map(CompletionResult::new)
            .ok_or(GatewayError::EmptyResponse { provider: ID })
    }
}
