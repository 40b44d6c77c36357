//! Chat-completion provider (Together-style, OpenAI-compatible wire format).

use std::time::Duration;

use async_trait::async_trait;
use macrocoach_model::{ProviderConfig, ProviderId};
use serde::{Deserialize, Serialize};

use super::trait_def::CompletionProvider;
use super::types::{CompletionRequest, CompletionResult, GatewayError};

const ID: ProviderId = ProviderId::Together;

// Defaults for sampling fields a request leaves unset.
const DEFAULT_TOP_P: f32 = 0.7;
const DEFAULT_TOP_K: u32 = 50;
const DEFAULT_REPETITION_PENALTY: f32 = 1.0;

/// POSTs `{base_url}/chat/completions` with bearer auth and returns the
/// first choice's message content.
#[derive(Clone)]
pub struct TogetherProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl TogetherProvider {
    /// Fails with [`GatewayError::MissingCredential`] when the trimmed key
    /// is empty.
    pub fn new(
        api_key: &str,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(GatewayError::MissingCredential {
                provider: ID,
                var: ProviderConfig::api_key_var(ID),
            });
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::transport(ID, e))?;
        Ok(Self {
            api_key: api_key.to_owned(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client,
        })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, GatewayError> {
        Self::new(&config.api_key, config.base_url_trimmed(), config.timeout)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl std::fmt::Debug for TogetherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TogetherProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    repetition_penalty: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Instruction-tuned chat models expect the prompt inside `[INST]` markers.
fn frame_prompt(prompt: &str) -> String {
    format!("[INST] {prompt} [/INST]")
}

fn chat_request(request: &CompletionRequest) -> ChatRequest<'_> {
    let sampling = &request.sampling;
    ChatRequest {
        model: &request.model,
        messages: vec![ChatMessage {
            role: "user",
            content: frame_prompt(&request.prompt),
        }],
        max_tokens: request.max_output_units,
        temperature: request.temperature,
        top_p: sampling.top_p.unwrap_or(DEFAULT_TOP_P),
        top_k: sampling.top_k.unwrap_or(DEFAULT_TOP_K),
        repetition_penalty: sampling
            .repetition_penalty
            .unwrap_or(DEFAULT_REPETITION_PENALTY),
    }
}

fn extract_text(response: ChatResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|text| !text.trim().is_empty())
}

#[async_trait]
impl CompletionProvider for TogetherProvider {
    fn id(&self) -> ProviderId {
        ID
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResult, GatewayError> {
        tracing::debug!(provider = %ID, model = %request.model, "sending chat completion");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&chat_request(request))
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

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::transport(ID, e))?;

        extract_text(parsed)
            .map(CompletionResult::new)
            .ok_or(GatewayError::EmptyResponse { provider: ID })
    }
}
