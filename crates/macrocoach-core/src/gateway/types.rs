//! Request, result, and error types shared by every completion provider.

use macrocoach_model::ProviderId;

/// Errors from a single gateway call.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request could not be sent, timed out, or the body could not be
    /// read or decoded.
    #[error("{provider} transport error: {message}")]
    Transport { provider: ProviderId, message: String },

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: ProviderId,
        status: u16,
        body: String,
    },

    /// The provider answered successfully but with no extractable text.
    #[error("{provider} returned no text")]
    EmptyResponse { provider: ProviderId },

    #[error("no {provider} API key configured (set {var})")]
    MissingCredential {
        provider: ProviderId,
        var: &'static str,
    },

    #[error("invalid {provider} API key: {reason}")]
    InvalidCredential {
        provider: ProviderId,
        reason: &'static str,
    },

    #[error("provider {0} is not registered with the gateway")]
    UnknownProvider(ProviderId),
}

impl GatewayError {
    pub fn transport(provider: ProviderId, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            provider,
            message: err.to_string(),
        }
    }
}

/// Optional sampling controls. A provider that does not support one of
/// these simply never reads it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SamplingParams {
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub repetition_penalty: Option<f32>,
}

/// One completion call. Built fresh per attempt and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_output_units: u32,
    pub temperature: f32,
    pub sampling: SamplingParams,
}

impl CompletionRequest {
    pub const DEFAULT_MAX_OUTPUT_UNITS: u32 = 8192;
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// A request with the default output budget and sampling.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            max_output_units: Self::DEFAULT_MAX_OUTPUT_UNITS,
            temperature: Self::DEFAULT_TEMPERATURE,
            sampling: SamplingParams {
                top_p: Some(0.7),
                top_k: Some(50),
                repetition_penalty: Some(1.0),
            },
        }
    }
}

/// Raw generated text, opaque until sanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    pub text: String,
}

impl CompletionResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults() {
        let request = CompletionRequest::new("m", "p");
        assert_eq!(request.max_output_units, 8192);
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.sampling.top_k, Some(50));
        assert_eq!(request.sampling.repetition_penalty, Some(1.0));
    }

    #[test]
    fn error_messages_name_the_provider() {
        let err = GatewayError::MissingCredential {
            provider: ProviderId::Together,
            var: "TOGETHER_API_KEY",
        };
        assert_eq!(
            err.to_string(),
            "no together API key configured (set TOGETHER_API_KEY)"
        );
        let err = GatewayError::transport(ProviderId::Gemini, "connection refused");
        assert_eq!(err.to_string(), "gemini transport error: connection refused");
    }
}
